use aide::axum::{routing::get_with, ApiRouter};
use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use crate::{
	error::{self, ErrorShape},
	policy, AppState,
};

pub mod model;
pub mod route;

/// A missing parent post and a missing comment are distinct failures, even
/// though both surface as 404.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("unknown_post")]
	UnknownPost(Uuid),
	#[error("unknown_comment")]
	UnknownComment(Uuid),
	#[error(transparent)]
	Denied(#[from] policy::Deny),
}

pub type RouteError = error::RouteError<Error>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route(
			"/",
			get_with(get_comments, get_comments_docs)
				.post_with(create_comment, create_comment_docs),
		)
		.api_route(
			"/:id",
			get_with(get_comment, get_comment_docs)
				.put_with(update_comment, update_comment_docs)
				.patch_with(update_comment, update_comment_docs)
				.delete_with(delete_comment, delete_comment_docs),
		)
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::UnknownPost(..) | Self::UnknownComment(..) => StatusCode::NOT_FOUND,
			Self::Denied(deny) => deny.status(),
		}
	}

	fn into_errors(self) -> Vec<error::Message<'static>> {
		match self {
			Self::UnknownPost(post) => error::Message::new("unknown_post")
				.detail("post", json!(post))
				.into_vec(),
			Self::UnknownComment(comment) => error::Message::new("unknown_comment")
				.detail("comment", json!(comment))
				.into_vec(),
			Self::Denied(deny) => deny.into_errors(),
		}
	}
}

#[cfg(test)]
mod test {
	use serde_json::Value;

	use crate::test::*;

	async fn create_post(server: &axum_test::TestServer, text: &str) -> String {
		let response = server.post("/posts").json(&json!({ "text": text })).await;

		assert_eq!(response.status_code(), 201);

		response.json::<Value>()["id"].as_str().unwrap().to_owned()
	}

	#[sqlx::test]
	async fn test_comment_lifecycle(pool: Database) {
		let alice = app(pool);
		register(&alice, "alice").await;

		let post = create_post(&alice, "a post").await;

		let response = alice
			.post(&format!("/posts/{post}/comments"))
			.json(&json!({ "text": "a comment" }))
			.await;

		assert_eq!(response.status_code(), 201);

		let comment = response.json::<Value>();
		let id = comment["id"].as_str().unwrap().to_owned();

		assert_eq!(comment["post_id"].as_str().unwrap(), post);

		let response = alice
			.patch(&format!("/posts/{post}/comments/{id}"))
			.json(&json!({ "text": "edited" }))
			.await;

		assert_eq!(response.status_code(), 200);
		assert_eq!(response.json::<Value>()["text"], "edited");

		let comments = alice
			.get(&format!("/posts/{post}/comments"))
			.await
			.json::<Vec<Value>>();

		assert_eq!(comments.len(), 1);

		let response = alice.delete(&format!("/posts/{post}/comments/{id}")).await;

		assert_eq!(response.status_code(), 204);

		let response = alice.get(&format!("/posts/{post}/comments/{id}")).await;

		assert_eq!(response.status_code(), 404);
	}

	#[sqlx::test]
	async fn test_comments_are_scoped_to_their_post(pool: Database) {
		let alice = app(pool);
		register(&alice, "alice").await;

		let first = create_post(&alice, "first").await;
		let second = create_post(&alice, "second").await;

		let response = alice
			.post(&format!("/posts/{first}/comments"))
			.json(&json!({ "text": "on the first post" }))
			.await;
		let comment = response.json::<Value>()["id"].as_str().unwrap().to_owned();

		// The comment exists, but not beneath the second post.
		let response = alice
			.get(&format!("/posts/{second}/comments/{comment}"))
			.await;

		assert_eq!(response.status_code(), 404);
		assert_eq!(
			response.json::<Value>()["errors"][0]["content"],
			"unknown_comment"
		);

		let response = alice.get(&format!("/posts/{first}/comments/{comment}")).await;

		assert_eq!(response.status_code(), 200);
	}

	#[sqlx::test]
	async fn test_missing_parent_is_distinct_from_missing_comment(pool: Database) {
		let alice = app(pool);
		register(&alice, "alice").await;

		let post = create_post(&alice, "a post").await;
		let ghost = uuid::Uuid::new_v4();

		// Unknown parent post, regardless of the comment id.
		let response = alice.get(&format!("/posts/{ghost}/comments/{ghost}")).await;

		assert_eq!(response.status_code(), 404);
		assert_eq!(
			response.json::<Value>()["errors"][0]["content"],
			"unknown_post"
		);

		// Known parent, unknown comment.
		let response = alice.get(&format!("/posts/{post}/comments/{ghost}")).await;

		assert_eq!(response.status_code(), 404);
		assert_eq!(
			response.json::<Value>()["errors"][0]["content"],
			"unknown_comment"
		);

		// Listing beneath an unknown parent fails the same way.
		let response = alice.get(&format!("/posts/{ghost}/comments")).await;

		assert_eq!(response.status_code(), 404);
	}

	#[sqlx::test]
	async fn test_comment_ownership(pool: Database) {
		let alice = app(pool.clone());
		register(&alice, "alice").await;

		let post = create_post(&alice, "a post").await;

		let response = alice
			.post(&format!("/posts/{post}/comments"))
			.json(&json!({ "text": "alice's comment" }))
			.await;
		let comment = response.json::<Value>()["id"].as_str().unwrap().to_owned();

		let anon = app(pool.clone());

		let response = anon
			.post(&format!("/posts/{post}/comments"))
			.json(&json!({ "text": "drive-by" }))
			.await;

		assert_eq!(response.status_code(), 401);

		let bob = app(pool);
		register(&bob, "bob").await;

		let response = bob
			.patch(&format!("/posts/{post}/comments/{comment}"))
			.json(&json!({ "text": "bob's now" }))
			.await;

		assert_eq!(response.status_code(), 403);

		let response = bob.delete(&format!("/posts/{post}/comments/{comment}")).await;

		assert_eq!(response.status_code(), 403);

		// Reading stays open to everyone.
		let response = anon.get(&format!("/posts/{post}/comments/{comment}")).await;

		assert_eq!(response.status_code(), 200);
	}

	#[sqlx::test]
	async fn test_deleting_a_post_removes_its_comments(pool: Database) {
		let alice = app(pool.clone());
		register(&alice, "alice").await;

		let post = create_post(&alice, "doomed").await;

		for text in ["one", "two"] {
			alice
				.post(&format!("/posts/{post}/comments"))
				.json(&json!({ "text": text }))
				.await;
		}

		let response = alice.delete(&format!("/posts/{post}")).await;

		assert_eq!(response.status_code(), 204);

		let count = sqlx::query_scalar!(r#"SELECT COUNT(*) AS "count!" FROM comment"#)
			.fetch_one(&pool)
			.await
			.unwrap();

		assert_eq!(count, 0);
	}
}
