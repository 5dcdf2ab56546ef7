use aide::axum::IntoApiResponse;
use axum::{extract::State, http::StatusCode, response::IntoResponse};
use macros::route;

use crate::{
	extract::{Json, Query, Session},
	openapi::tag,
	route::auth,
	Database,
};

use super::{model, Error, RouteError};

/// Validates a new follow edge for `follower`.
///
/// The order of the checks is fixed: the username must resolve, a self-loop
/// is rejected next since it is invalid regardless of what is stored, and
/// only then is the edge checked against the existing set. The pre-check is
/// an optimistic fast path; the storage constraints re-verify the last two
/// at commit time.
pub async fn validate_follow(
	database: &Database,
	follower: &auth::model::User,
	following: &str,
) -> Result<auth::model::User, RouteError> {
	let following = sqlx::query_as!(
		auth::model::User,
		r#"
			SELECT * FROM "user"
			WHERE username = $1
		"#,
		following,
	)
	.fetch_optional(database)
	.await?
	.ok_or_else(|| Error::UnknownUser(following.to_owned()))?;

	if following.id == follower.id {
		return Err(Error::SelfFollow.into());
	}

	let exists = sqlx::query_scalar!(
		r#"
			SELECT EXISTS(
				SELECT 1 FROM follow
				WHERE follower_id = $1 AND following_id = $2
			) AS "exists!"
		"#,
		follower.id,
		following.id,
	)
	.fetch_one(database)
	.await?;

	if exists {
		return Err(Error::DuplicateFollow(following.username).into());
	}

	Ok(following)
}

/// List follows
/// Returns the caller's outgoing follow edges, newest first, optionally filtered by a substring of the followed username.
#[route(tag = tag::FOLLOW)]
pub async fn get_follows(
	State(database): State<Database>,
	session: Session,
	Query(filter): Query<model::SearchInput>,
) -> Result<Json<Vec<model::Follow>>, RouteError> {
	let follows = sqlx::query_as!(
		model::Follow,
		r#"
			SELECT
				f.id,
				follower.username AS "follower!",
				following.username AS "following!",
				f.created_at
			FROM follow f
			INNER JOIN "user" follower ON follower.id = f.follower_id
			INNER JOIN "user" following ON following.id = f.following_id
			WHERE f.follower_id = $1
				AND ($2::text IS NULL OR following.username ILIKE '%' || $2 || '%')
			ORDER BY f.created_at DESC
		"#,
		session.user.id,
		filter.search.as_deref(),
	)
	.fetch_all(&database)
	.await?;

	Ok(Json(follows))
}

/// Create follow
/// Subscribes the caller to another user. The follower side of the edge is always the caller.
#[route(tag = tag::FOLLOW, response(status = 201, description = "The created follow edge.", shape = "Json<model::Follow>"))]
pub async fn create_follow(
	State(database): State<Database>,
	session: Session,
	Json(input): Json<model::CreateFollowInput>,
) -> Result<impl IntoApiResponse, RouteError> {
	let following = validate_follow(&database, &session.user, &input.following).await?;

	// A concurrent duplicate that slips past the pre-check trips the named
	// constraints here and maps back to the same client errors.
	let edge = sqlx::query!(
		r#"
			INSERT INTO follow (id, follower_id, following_id)
			VALUES (DEFAULT, $1, $2)
			RETURNING id, created_at
		"#,
		session.user.id,
		following.id,
	)
	.fetch_one(&database)
	.await
	.map_err(|e| match e {
		sqlx::Error::Database(ref d) => match d.constraint() {
			Some("follow_edge_key") => Error::DuplicateFollow(following.username.clone()).into(),
			Some("follow_no_self_check") => Error::SelfFollow.into(),
			_ => RouteError::from(e),
		},
		e => RouteError::from(e),
	})?;

	Ok((
		StatusCode::CREATED,
		Json(model::Follow {
			id: edge.id,
			follower: session.user.username,
			following: following.username,
			created_at: edge.created_at,
		}),
	)
		.into_response())
}
