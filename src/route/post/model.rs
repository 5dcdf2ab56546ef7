pub use crate::route::model::{Paginate, PostPath};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::policy;

/// A single post, written by a user and optionally published into a group.
#[derive(Debug, Deserialize, Serialize, JsonSchema, Validate)]
pub struct Post {
	/// The unique identifier of the post.
	#[serde(skip_deserializing)]
	pub id: Uuid,
	/// The user that wrote the post.
	#[serde(skip_deserializing)]
	pub user_id: Uuid,
	/// The group the post was published into, if any. Cleared when the
	/// group is deleted.
	pub group_id: Option<Uuid>,
	/// The text of the post.
	#[validate(length(min = 1, max = 4096))]
	pub text: String,
	/// An opaque reference to an uploaded image.
	pub image: Option<String>,
	/// The creation time of the post.
	#[serde(skip_deserializing)]
	pub created_at: chrono::DateTime<chrono::Utc>,
}

impl policy::Authored for Post {
	fn author_id(&self) -> Uuid {
		self.user_id
	}
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct CreatePostInput {
	#[validate(length(min = 1, max = 4096))]
	pub text: String,
	/// An opaque reference to an uploaded image.
	#[validate(length(max = 512))]
	pub image: Option<String>,
	/// The group to publish into.
	pub group_id: Option<Uuid>,
}

/// A partial update; absent fields are left unchanged.
#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct UpdatePostInput {
	#[validate(length(min = 1, max = 4096))]
	pub text: Option<String>,
	#[validate(length(max = 512))]
	pub image: Option<String>,
	pub group_id: Option<Uuid>,
}
