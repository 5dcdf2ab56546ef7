use axum::extract::State;
use macros::route;

use crate::{
	extract::{Json, Path},
	openapi::tag,
	Database,
};

use super::{model, Error, RouteError};

/// List groups
/// Returns every group, ordered by slug.
#[route(tag = tag::GROUP)]
pub async fn get_groups(
	State(database): State<Database>,
) -> Result<Json<Vec<model::Group>>, RouteError> {
	let groups = sqlx::query_as!(
		model::Group,
		r#"
			SELECT * FROM "group"
			ORDER BY slug
		"#,
	)
	.fetch_all(&database)
	.await?;

	Ok(Json(groups))
}

/// Get single group
/// Returns a single group by its unique id.
#[route(tag = tag::GROUP)]
pub async fn get_group(
	State(database): State<Database>,
	Path(path): Path<model::IdInput>,
) -> Result<Json<model::Group>, RouteError> {
	let group = sqlx::query_as!(
		model::Group,
		r#"
			SELECT * FROM "group"
			WHERE id = $1
		"#,
		path.id,
	)
	.fetch_optional(&database)
	.await?;

	Ok(Json(group.ok_or(Error::UnknownGroup(path.id))?))
}
