use aide::axum::{routing::get_with, ApiRouter};
use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use crate::{error, AppState};

pub mod model;
pub mod route;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("unknown_group")]
	UnknownGroup(Uuid),
}

pub type RouteError = error::RouteError<Error>;

/// Groups expose no mutation routes; anything but a read fails with 405.
pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route("/", get_with(get_groups, get_groups_docs))
		.api_route("/:id", get_with(get_group, get_group_docs))
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::UnknownGroup(..) => StatusCode::NOT_FOUND,
		}
	}

	fn into_errors(self) -> Vec<error::Message<'static>> {
		match self {
			Self::UnknownGroup(group) => error::Message::new("unknown_group")
				.detail("group", json!(group))
				.into_vec(),
		}
	}
}

#[cfg(test)]
mod test {
	use serde_json::Value;

	use crate::test::*;

	async fn seed_group(pool: &Database, title: &str, slug: &str) -> uuid::Uuid {
		sqlx::query_scalar!(
			r#"
				INSERT INTO "group" (title, slug, description) VALUES ($1, $2, $3)
				RETURNING id
			"#,
			title,
			slug,
			format!("all about {title}"),
		)
		.fetch_one(pool)
		.await
		.unwrap()
	}

	#[sqlx::test]
	async fn test_groups_are_listed_and_fetched(pool: Database) {
		let zig = seed_group(&pool, "Zig", "zig").await;
		seed_group(&pool, "Rust", "rust").await;

		let server = app(pool);

		let groups = server.get("/groups").await.json::<Vec<Value>>();
		let slugs = groups
			.iter()
			.map(|group| group["slug"].as_str().unwrap())
			.collect::<Vec<_>>();

		assert_eq!(slugs, ["rust", "zig"]);

		let response = server.get(&format!("/groups/{zig}")).await;

		assert_eq!(response.status_code(), 200);
		assert_eq!(response.json::<Value>()["title"], "Zig");

		let response = server.get(&format!("/groups/{}", uuid::Uuid::new_v4())).await;

		assert_eq!(response.status_code(), 404);
	}

	#[sqlx::test]
	async fn test_groups_have_no_mutation_surface(pool: Database) {
		let server = app(pool.clone());
		register(&server, "alice").await;

		let response = server
			.post("/groups")
			.json(&json!({ "title": "New", "slug": "new" }))
			.await;

		assert_eq!(response.status_code(), 405);

		let group = seed_group(&pool, "Rust", "rust").await;

		let response = server.delete(&format!("/groups/{group}")).await;

		assert_eq!(response.status_code(), 405);
	}
}
