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

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("unknown_post")]
	UnknownPost(Uuid),
	#[error("unknown_group")]
	UnknownGroup(Uuid),
	#[error(transparent)]
	Denied(#[from] policy::Deny),
}

pub type RouteError = error::RouteError<Error>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route(
			"/",
			get_with(get_posts, get_posts_docs).post_with(create_post, create_post_docs),
		)
		.api_route("/me", get_with(get_user_posts, get_user_posts_docs))
		.api_route(
			"/:post_id",
			get_with(get_post, get_post_docs)
				.put_with(update_post, update_post_docs)
				.patch_with(update_post, update_post_docs)
				.delete_with(delete_post, delete_post_docs),
		)
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::UnknownPost(..) => StatusCode::NOT_FOUND,
			Self::UnknownGroup(..) => StatusCode::BAD_REQUEST,
			Self::Denied(deny) => deny.status(),
		}
	}

	fn into_errors(self) -> Vec<error::Message<'static>> {
		match self {
			Self::UnknownPost(post) => error::Message::new("unknown_post")
				.detail("post", json!(post))
				.into_vec(),
			Self::UnknownGroup(group) => error::Message::new("unknown_group")
				.detail("group", json!(group))
				.into_vec(),
			Self::Denied(deny) => deny.into_errors(),
		}
	}
}

#[cfg(test)]
mod test {
	use serde_json::Value;

	use crate::test::*;

	#[sqlx::test]
	async fn test_post_lifecycle(pool: Database) {
		let alice = app(pool);
		register(&alice, "alice").await;

		let response = alice.post("/posts").json(&json!({ "text": "first" })).await;

		assert_eq!(response.status_code(), 201);

		let post = response.json::<Value>();
		let id = post["id"].as_str().unwrap().to_owned();

		let me = alice.get("/auth/me").await.json::<Value>();

		assert_eq!(post["user_id"], me["id"]);

		let response = alice
			.patch(&format!("/posts/{id}"))
			.json(&json!({ "text": "edited" }))
			.await;

		assert_eq!(response.status_code(), 200);
		assert_eq!(response.json::<Value>()["text"], "edited");

		let response = alice.delete(&format!("/posts/{id}")).await;

		assert_eq!(response.status_code(), 204);

		let response = alice.get(&format!("/posts/{id}")).await;

		assert_eq!(response.status_code(), 404);
		assert_eq!(
			response.json::<Value>()["errors"][0]["content"],
			"unknown_post"
		);
	}

	#[sqlx::test]
	async fn test_author_comes_from_the_session(pool: Database) {
		let alice = app(pool);
		register(&alice, "alice").await;

		// The body-supplied author is ignored.
		let response = alice
			.post("/posts")
			.json(&json!({
				"text": "mine",
				"user_id": "00000000-0000-0000-0000-000000000000",
			}))
			.await;

		assert_eq!(response.status_code(), 201);

		let me = alice.get("/auth/me").await.json::<Value>();

		assert_eq!(response.json::<Value>()["user_id"], me["id"]);
	}

	#[sqlx::test]
	async fn test_anonymous_callers_never_write(pool: Database) {
		let alice = app(pool.clone());
		register(&alice, "alice").await;

		let response = alice.post("/posts").json(&json!({ "text": "target" })).await;
		let id = response.json::<Value>()["id"].as_str().unwrap().to_owned();

		let anon = app(pool);

		let response = anon.post("/posts").json(&json!({ "text": "nope" })).await;

		assert_eq!(response.status_code(), 401);

		let response = anon
			.patch(&format!("/posts/{id}"))
			.json(&json!({ "text": "nope" }))
			.await;

		assert_eq!(response.status_code(), 401);

		let response = anon.delete(&format!("/posts/{id}")).await;

		assert_eq!(response.status_code(), 401);

		// Reads stay open to anonymous callers.
		assert_eq!(anon.get("/posts").await.status_code(), 200);
		assert_eq!(anon.get(&format!("/posts/{id}")).await.status_code(), 200);
	}

	#[sqlx::test]
	async fn test_non_owner_is_forbidden_not_hidden(pool: Database) {
		let alice = app(pool.clone());
		register(&alice, "alice").await;

		let response = alice.post("/posts").json(&json!({ "text": "target" })).await;
		let id = response.json::<Value>()["id"].as_str().unwrap().to_owned();

		let bob = app(pool);
		register(&bob, "bob").await;

		let response = bob
			.patch(&format!("/posts/{id}"))
			.json(&json!({ "text": "mine now" }))
			.await;

		assert_eq!(response.status_code(), 403);
		assert_eq!(response.json::<Value>()["errors"][0]["content"], "forbidden");

		let response = bob.delete(&format!("/posts/{id}")).await;

		assert_eq!(response.status_code(), 403);

		// The post is untouched.
		let response = bob.get(&format!("/posts/{id}")).await;

		assert_eq!(response.status_code(), 200);
		assert_eq!(response.json::<Value>()["text"], "target");
	}

	#[sqlx::test]
	async fn test_pagination_window(pool: Database) {
		let alice = app(pool);
		register(&alice, "alice").await;

		for text in ["one", "two", "three", "four", "five"] {
			let response = alice.post("/posts").json(&json!({ "text": text })).await;

			assert_eq!(response.status_code(), 201);
		}

		let response = alice
			.get("/posts")
			.add_query_param("limit", 2)
			.add_query_param("offset", 1)
			.await;

		assert_eq!(response.status_code(), 200);

		let posts = response.json::<Vec<Value>>();
		let texts = posts
			.iter()
			.map(|post| post["text"].as_str().unwrap())
			.collect::<Vec<_>>();

		assert_eq!(texts, ["two", "three"]);
	}

	#[sqlx::test]
	async fn test_own_posts_listing(pool: Database) {
		let alice = app(pool.clone());
		register(&alice, "alice").await;

		for text in ["a1", "a2"] {
			alice.post("/posts").json(&json!({ "text": text })).await;
		}

		let bob = app(pool);
		register(&bob, "bob").await;

		bob.post("/posts").json(&json!({ "text": "b1" })).await;

		let mine = bob.get("/posts/me").await.json::<Vec<Value>>();
		let texts = mine
			.iter()
			.map(|post| post["text"].as_str().unwrap())
			.collect::<Vec<_>>();

		assert_eq!(texts, ["b1"]);
	}

	#[sqlx::test]
	async fn test_group_delete_clears_the_reference(pool: Database) {
		let group_id = sqlx::query_scalar!(
			r#"
				INSERT INTO "group" (title, slug) VALUES ('Rustaceans', 'rustaceans')
				RETURNING id
			"#
		)
		.fetch_one(&pool)
		.await
		.unwrap();

		let alice = app(pool.clone());
		register(&alice, "alice").await;

		let response = alice
			.post("/posts")
			.json(&json!({ "text": "in a group", "group_id": group_id }))
			.await;

		assert_eq!(response.status_code(), 201);

		let post = response.json::<Value>();

		assert_eq!(post["group_id"], json!(group_id));

		sqlx::query!(r#"DELETE FROM "group" WHERE id = $1"#, group_id)
			.execute(&pool)
			.await
			.unwrap();

		// The post survives with its group reference cleared.
		let response = alice
			.get(&format!("/posts/{}", post["id"].as_str().unwrap()))
			.await;

		assert_eq!(response.status_code(), 200);
		assert_eq!(response.json::<Value>()["group_id"], Value::Null);
	}

	#[sqlx::test]
	async fn test_unknown_group_is_a_validation_error(pool: Database) {
		let alice = app(pool);
		register(&alice, "alice").await;

		let response = alice
			.post("/posts")
			.json(&json!({ "text": "lost", "group_id": uuid::Uuid::new_v4() }))
			.await;

		assert_eq!(response.status_code(), 400);
		assert_eq!(
			response.json::<Value>()["errors"][0]["content"],
			"unknown_group"
		);
	}
}
