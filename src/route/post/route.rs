use aide::axum::IntoApiResponse;
use axum::{extract::State, http::StatusCode, response::IntoResponse};
use macros::route;
use uuid::Uuid;

use crate::{
	extract::{Json, Path, Query, Session},
	openapi::tag,
	policy, Database,
};

use super::{model, Error, RouteError};

/// Resolves a post id to its row, or `unknown_post`.
pub async fn resolve_post(database: &Database, post_id: Uuid) -> Result<model::Post, RouteError> {
	let post = sqlx::query_as!(
		model::Post,
		r#"
			SELECT * FROM post
			WHERE id = $1
		"#,
		post_id,
	)
	.fetch_optional(database)
	.await?;

	post.ok_or_else(|| Error::UnknownPost(post_id).into())
}

/// List posts
/// Returns posts in creation order, optionally windowed by `limit` and `offset`.
#[route(tag = tag::POST)]
pub async fn get_posts(
	State(database): State<Database>,
	Query(paginate): Query<model::Paginate>,
) -> Result<Json<Vec<model::Post>>, RouteError> {
	let posts = sqlx::query_as!(
		model::Post,
		r#"
			SELECT * FROM post
			ORDER BY created_at, id
			LIMIT $1 OFFSET $2
		"#,
		paginate.limit,
		paginate.offset,
	)
	.fetch_all(&database)
	.await?;

	Ok(Json(posts))
}

/// Get own posts
/// Returns the authenticated user's posts, newest first.
#[route(tag = tag::POST)]
pub async fn get_user_posts(
	State(database): State<Database>,
	session: Session,
	Query(paginate): Query<model::Paginate>,
) -> Result<Json<Vec<model::Post>>, RouteError> {
	let posts = sqlx::query_as!(
		model::Post,
		r#"
			SELECT * FROM post
			WHERE user_id = $1
			ORDER BY created_at DESC
			LIMIT $2 OFFSET $3
		"#,
		session.user.id,
		paginate.limit,
		paginate.offset,
	)
	.fetch_all(&database)
	.await?;

	Ok(Json(posts))
}

/// Get single post
/// Returns a single post by its unique id.
#[route(tag = tag::POST)]
pub async fn get_post(
	State(database): State<Database>,
	Path(path): Path<model::PostPath>,
) -> Result<Json<model::Post>, RouteError> {
	resolve_post(&database, path.post_id).await.map(Json)
}

/// Create post
/// Creates a new post. The author is always the authenticated caller, never a body field.
#[route(tag = tag::POST, response(status = 201, description = "The created post.", shape = "Json<model::Post>"))]
pub async fn create_post(
	State(database): State<Database>,
	session: Session,
	Json(input): Json<model::CreatePostInput>,
) -> Result<impl IntoApiResponse, RouteError> {
	policy::decide(
		policy::Caller::User(session.user.id),
		policy::Action::Create,
		None,
	)
	.map_err(Error::from)?;

	let group_id = input.group_id;
	let post = sqlx::query_as!(
		model::Post,
		r#"
			INSERT INTO post (id, user_id, group_id, text, image)
			VALUES (DEFAULT, $1, $2, $3, $4)
			RETURNING *
		"#,
		session.user.id,
		input.group_id,
		input.text,
		input.image,
	)
	.fetch_one(&database)
	.await
	.map_err(|e| match e {
		sqlx::Error::Database(ref d) => match (d.constraint(), group_id) {
			(Some("post_group_id_fkey"), Some(group)) => Error::UnknownGroup(group).into(),
			_ => RouteError::from(e),
		},
		e => RouteError::from(e),
	})?;

	Ok((StatusCode::CREATED, Json(post)).into_response())
}

/// Update post
/// Applies a partial update to a post owned by the caller.
#[route(tag = tag::POST)]
pub async fn update_post(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<model::PostPath>,
	Json(input): Json<model::UpdatePostInput>,
) -> Result<Json<model::Post>, RouteError> {
	let post = resolve_post(&database, path.post_id).await?;

	policy::decide(
		policy::Caller::User(session.user.id),
		policy::Action::Modify,
		Some(&post),
	)
	.map_err(Error::from)?;

	let group_id = input.group_id;
	let post = sqlx::query_as!(
		model::Post,
		r#"
			UPDATE post
			SET text = COALESCE($1, text),
				image = COALESCE($2, image),
				group_id = COALESCE($3, group_id)
			WHERE id = $4
			RETURNING *
		"#,
		input.text,
		input.image,
		input.group_id,
		post.id,
	)
	.fetch_optional(&database)
	.await
	.map_err(|e| match e {
		sqlx::Error::Database(ref d) => match (d.constraint(), group_id) {
			(Some("post_group_id_fkey"), Some(group)) => Error::UnknownGroup(group).into(),
			_ => RouteError::from(e),
		},
		e => RouteError::from(e),
	})?;

	Ok(Json(post.ok_or(Error::UnknownPost(path.post_id))?))
}

/// Delete post
/// Deletes a post owned by the caller, removing its comments with it.
#[route(tag = tag::POST)]
pub async fn delete_post(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<model::PostPath>,
) -> Result<impl IntoApiResponse, RouteError> {
	let post = resolve_post(&database, path.post_id).await?;

	policy::decide(
		policy::Caller::User(session.user.id),
		policy::Action::Delete,
		Some(&post),
	)
	.map_err(Error::from)?;

	sqlx::query!(
		r#"
			DELETE FROM post
			WHERE id = $1
		"#,
		post.id,
	)
	.execute(&database)
	.await?;

	Ok(StatusCode::NO_CONTENT.into_response())
}
