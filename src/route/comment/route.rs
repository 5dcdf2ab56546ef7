use aide::axum::IntoApiResponse;
use axum::{extract::State, http::StatusCode, response::IntoResponse};
use macros::route;
use uuid::Uuid;

use crate::{
	extract::{Json, Path, Session},
	openapi::tag,
	policy,
	route::post,
	Database,
};

use super::{model, Error, RouteError};

/// Resolves the parent post of a nested comment route. A missing parent is
/// reported as the post, never as the comment.
pub async fn resolve_parent(
	database: &Database,
	post_id: Uuid,
) -> Result<post::model::Post, RouteError> {
	let post = sqlx::query_as!(
		post::model::Post,
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

/// Resolves a comment strictly inside its parent post. A comment stored
/// under a different post is treated as absent.
pub async fn resolve_comment(
	database: &Database,
	post_id: Uuid,
	comment_id: Uuid,
) -> Result<model::Comment, RouteError> {
	let post = resolve_parent(database, post_id).await?;

	let comment = sqlx::query_as!(
		model::Comment,
		r#"
			SELECT * FROM comment
			WHERE id = $1 AND post_id = $2
		"#,
		comment_id,
		post.id,
	)
	.fetch_optional(database)
	.await?;

	comment.ok_or_else(|| Error::UnknownComment(comment_id).into())
}

/// List comments
/// Returns the comments beneath a post, oldest first.
#[route(tag = tag::COMMENT)]
pub async fn get_comments(
	State(database): State<Database>,
	Path(path): Path<model::PostPath>,
) -> Result<Json<Vec<model::Comment>>, RouteError> {
	let post = resolve_parent(&database, path.post_id).await?;

	let comments = sqlx::query_as!(
		model::Comment,
		r#"
			SELECT * FROM comment
			WHERE post_id = $1
			ORDER BY created_at, id
		"#,
		post.id,
	)
	.fetch_all(&database)
	.await?;

	Ok(Json(comments))
}

/// Get single comment
/// Returns a single comment beneath a post by its unique id.
#[route(tag = tag::COMMENT)]
pub async fn get_comment(
	State(database): State<Database>,
	Path(path): Path<model::CommentPath>,
) -> Result<Json<model::Comment>, RouteError> {
	resolve_comment(&database, path.post_id, path.id)
		.await
		.map(Json)
}

/// Create comment
/// Adds a comment beneath a post. The author and the parent post are always server-assigned.
#[route(tag = tag::COMMENT, response(status = 201, description = "The created comment.", shape = "Json<model::Comment>"))]
pub async fn create_comment(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<model::PostPath>,
	Json(input): Json<model::CreateCommentInput>,
) -> Result<impl IntoApiResponse, RouteError> {
	let post = resolve_parent(&database, path.post_id).await?;

	policy::decide(
		policy::Caller::User(session.user.id),
		policy::Action::Create,
		None,
	)
	.map_err(Error::from)?;

	let comment = sqlx::query_as!(
		model::Comment,
		r#"
			INSERT INTO comment (id, user_id, post_id, text)
			VALUES (DEFAULT, $1, $2, $3)
			RETURNING *
		"#,
		session.user.id,
		post.id,
		input.text,
	)
	.fetch_one(&database)
	.await?;

	Ok((StatusCode::CREATED, Json(comment)).into_response())
}

/// Update comment
/// Applies a partial update to a comment owned by the caller.
#[route(tag = tag::COMMENT)]
pub async fn update_comment(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<model::CommentPath>,
	Json(input): Json<model::UpdateCommentInput>,
) -> Result<Json<model::Comment>, RouteError> {
	let comment = resolve_comment(&database, path.post_id, path.id).await?;

	policy::decide(
		policy::Caller::User(session.user.id),
		policy::Action::Modify,
		Some(&comment),
	)
	.map_err(Error::from)?;

	let comment = sqlx::query_as!(
		model::Comment,
		r#"
			UPDATE comment
			SET text = COALESCE($1, text)
			WHERE id = $2
			RETURNING *
		"#,
		input.text,
		comment.id,
	)
	.fetch_optional(&database)
	.await?;

	Ok(Json(comment.ok_or(Error::UnknownComment(path.id))?))
}

/// Delete comment
/// Deletes a comment owned by the caller.
#[route(tag = tag::COMMENT)]
pub async fn delete_comment(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<model::CommentPath>,
) -> Result<impl IntoApiResponse, RouteError> {
	let comment = resolve_comment(&database, path.post_id, path.id).await?;

	policy::decide(
		policy::Caller::User(session.user.id),
		policy::Action::Delete,
		Some(&comment),
	)
	.map_err(Error::from)?;

	sqlx::query!(
		r#"
			DELETE FROM comment
			WHERE id = $1
		"#,
		comment.id,
	)
	.execute(&database)
	.await?;

	Ok(StatusCode::NO_CONTENT.into_response())
}
