use aide::axum::{routing::get_with, ApiRouter};
use axum::http::StatusCode;
use serde_json::json;

use crate::{error, AppState};

pub mod model;
pub mod route;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("unknown_user")]
	UnknownUser(String),
	#[error("self_follow")]
	SelfFollow,
	#[error("duplicate_follow")]
	DuplicateFollow(String),
}

pub type RouteError = error::RouteError<Error>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new().api_route(
		"/",
		get_with(get_follows, get_follows_docs).post_with(create_follow, create_follow_docs),
	)
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::UnknownUser(..) => StatusCode::NOT_FOUND,
			Self::SelfFollow | Self::DuplicateFollow(..) => StatusCode::BAD_REQUEST,
		}
	}

	fn into_errors(self) -> Vec<error::Message<'static>> {
		match self {
			Self::UnknownUser(username) => error::Message::new("unknown_user")
				.detail("username", json!(username))
				.into_vec(),
			Self::SelfFollow => error::Message::new("self_follow").into_vec(),
			Self::DuplicateFollow(username) => error::Message::new("duplicate_follow")
				.detail("following", json!(username))
				.into_vec(),
		}
	}
}

#[cfg(test)]
mod test {
	use serde_json::Value;

	use crate::test::*;

	#[sqlx::test]
	async fn test_follow_creation_and_validation(pool: Database) {
		let alice = app(pool.clone());
		register(&alice, "alice").await;

		let bob = app(pool);
		register(&bob, "bob").await;

		let response = alice
			.post("/follows")
			.json(&json!({ "following": "bob" }))
			.await;

		assert_eq!(response.status_code(), 201);

		let edge = response.json::<Value>();

		assert_eq!(edge["follower"], "alice");
		assert_eq!(edge["following"], "bob");

		// The same edge twice is a validation error, not a conflict 500.
		let response = alice
			.post("/follows")
			.json(&json!({ "following": "bob" }))
			.await;

		assert_eq!(response.status_code(), 400);
		assert_eq!(
			response.json::<Value>()["errors"][0]["content"],
			"duplicate_follow"
		);

		// The self-loop is rejected even though no such edge exists.
		let response = alice
			.post("/follows")
			.json(&json!({ "following": "alice" }))
			.await;

		assert_eq!(response.status_code(), 400);
		assert_eq!(
			response.json::<Value>()["errors"][0]["content"],
			"self_follow"
		);

		let response = alice
			.post("/follows")
			.json(&json!({ "following": "nobody" }))
			.await;

		assert_eq!(response.status_code(), 404);
		assert_eq!(
			response.json::<Value>()["errors"][0]["content"],
			"unknown_user"
		);
	}

	#[sqlx::test]
	async fn test_follow_listing_is_scoped_to_the_caller(pool: Database) {
		let alice = app(pool.clone());
		register(&alice, "alice").await;

		let bob = app(pool.clone());
		register(&bob, "bob").await;

		let carol = app(pool.clone());
		register(&carol, "carol").await;

		for username in ["bob", "carol"] {
			let response = alice
				.post("/follows")
				.json(&json!({ "following": username }))
				.await;

			assert_eq!(response.status_code(), 201);
		}

		bob.post("/follows")
			.json(&json!({ "following": "carol" }))
			.await;

		let edges = alice.get("/follows").await.json::<Vec<Value>>();

		assert_eq!(edges.len(), 2);
		assert!(edges.iter().all(|edge| edge["follower"] == "alice"));

		// Substring search over the followed username.
		let edges = alice
			.get("/follows")
			.add_query_param("search", "aro")
			.await
			.json::<Vec<Value>>();

		assert_eq!(edges.len(), 1);
		assert_eq!(edges[0]["following"], "carol");

		// Anonymous callers cannot list follows at all.
		let anon = app(pool);
		let response = anon.get("/follows").await;

		assert_eq!(response.status_code(), 401);
	}

	#[sqlx::test]
	async fn test_concurrent_duplicate_follows_keep_one_edge(pool: Database) {
		let alice = app(pool.clone());
		register(&alice, "alice").await;

		let bob = app(pool.clone());
		register(&bob, "bob").await;

		let (first, second) = tokio::join!(
			alice.post("/follows").json(&json!({ "following": "bob" })),
			alice.post("/follows").json(&json!({ "following": "bob" })),
		);

		let mut statuses = [first.status_code().as_u16(), second.status_code().as_u16()];
		statuses.sort_unstable();

		// One write wins; the loser sees the validation error whether it
		// lost to the pre-check or to the unique constraint.
		assert_eq!(statuses, [201, 400]);

		let count = sqlx::query_scalar!(r#"SELECT COUNT(*) AS "count!" FROM follow"#)
			.fetch_one(&pool)
			.await
			.unwrap();

		assert_eq!(count, 1);
	}
}
