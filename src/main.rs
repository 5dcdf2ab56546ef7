#![warn(clippy::pedantic)]

mod error;
mod extract;
mod openapi;
mod policy;
mod ratelimit;
mod route;
mod session;
mod trace;

use std::sync::Arc;

use aide::{axum::ApiRouter, openapi::OpenApi};
use argon2::Argon2;
use axum::{extract::Request, Extension, Router, ServiceExt};
use tower::Layer;
use tower_governor::GovernorLayer;
use tower_http::{
	compression::CompressionLayer,
	cors::CorsLayer,
	normalize_path::NormalizePathLayer,
	request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
	trace::TraceLayer,
};

pub type Database = sqlx::Pool<sqlx::Postgres>;
pub type AppState = State;

/// The shared application state.
///
/// This should contain all shared dependencies that handlers need to access,
/// such as the database connection pool and the password hash configuration.
#[derive(Clone, axum::extract::FromRef)]
pub struct State {
	pub database: Database,
	pub hasher: Argon2<'static>,
}

/// Assembles the full router. Everything that tests need goes through here;
/// rate limiting and path normalization are wired around it in [`main`]
/// only.
fn app(state: State) -> Router {
	let mut api = OpenApi::default();

	ApiRouter::new()
		.nest("/auth", route::auth::routes())
		.nest("/posts", route::post::routes())
		.nest("/posts/:post_id/comments", route::comment::routes())
		.nest("/groups", route::group::routes())
		.nest("/follows", route::follow::routes())
		.nest_api_service("/docs", route::docs::routes())
		.finish_api_with(&mut api, openapi::docs)
		.layer(Extension(Arc::new(api)))
		.layer(TraceLayer::new_for_http())
		.layer(CompressionLayer::new())
		.layer(CorsLayer::permissive())
		.layer(PropagateRequestIdLayer::x_request_id())
		.layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
		.with_state(state)
}

#[tokio::main]
async fn main() {
	dotenvy::dotenv().ok();

	let _guard = trace::init_tracing_subscriber();

	let state = State {
		database: Database::connect(
			&std::env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
		)
		.await
		.expect("failed to connect to database"),
		hasher: Argon2::default(),
	};

	let governor = ratelimit::default();
	ratelimit::cleanup_old_limits(&[&governor]);

	let app = app(state).layer(GovernorLayer { config: governor });
	let app = NormalizePathLayer::trim_trailing_slash().layer(app);

	let port = std::env::var("PORT").map_or_else(
		|_| 3000,
		|port| port.parse().expect("PORT must be a number"),
	);

	let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
		.await
		.expect("failed to bind to port");

	tracing::info!("listening on port {}", port);

	axum::serve(
		listener,
		ServiceExt::<Request>::into_make_service_with_connect_info::<std::net::SocketAddr>(app),
	)
	.await
	.unwrap();
}

#[cfg(test)]
pub mod test {
	pub use crate::Database;
	pub use serde_json::json;

	use axum_test::TestServer;

	/// Builds an in-process server over the pool. Each server keeps its own
	/// cookie jar, so use one per identity.
	pub fn app(pool: Database) -> TestServer {
		let mut server = TestServer::new(super::app(crate::State {
			database: pool,
			hasher: argon2::Argon2::default(),
		}))
		.expect("failed to start test server");

		server.do_save_cookies();
		server
	}

	/// Registers a user and leaves its session cookie on the server.
	pub async fn register(server: &TestServer, username: &str) {
		let response = server
			.post("/auth/register")
			.json(&json!({
				"email": format!("{username}@example.com"),
				"username": username,
				"password": "hunter2hunter",
			}))
			.await;

		assert_eq!(response.status_code(), 200);
	}
}
