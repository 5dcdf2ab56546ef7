use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A directed follow edge, reported by username on both ends.
#[derive(Debug, Serialize, JsonSchema)]
pub struct Follow {
	/// The unique identifier of the edge.
	pub id: Uuid,
	/// The user the edge points from; always the authenticated caller.
	pub follower: String,
	/// The user the edge points to.
	pub following: String,
	/// The creation time of the edge.
	pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct CreateFollowInput {
	/// The username of the account to follow.
	#[validate(length(min = 1, max = 150))]
	pub following: String,
}

/// Optional filter over the caller's follow listing.
#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct SearchInput {
	/// Case-insensitive substring match on the followed username.
	#[validate(length(min = 1, max = 150))]
	pub search: Option<String>,
}
