use schemars::JsonSchema;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// A limit/offset window over a listing, in the listing's stable order.
#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct Paginate {
	/// The maximum number of items to return. Unbounded when absent.
	#[validate(range(min = 1, max = 100))]
	pub limit: Option<i64>,
	/// The number of items to skip from the start.
	#[validate(range(min = 0))]
	#[serde(default)]
	pub offset: i64,
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct IdInput {
	pub id: Uuid,
}

/// Path parameters of `/posts/:post_id` and everything nested below it.
#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct PostPath {
	pub post_id: Uuid,
}

/// Path parameters of `/posts/:post_id/comments/:id`.
#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct CommentPath {
	pub post_id: Uuid,
	pub id: Uuid,
}
