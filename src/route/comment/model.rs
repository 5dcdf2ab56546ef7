pub use crate::route::model::{CommentPath, PostPath};

use macros::model;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::policy;

/// A single comment beneath a post.
#[model]
#[derive(Debug, Deserialize, Serialize, JsonSchema, Validate)]
pub struct Comment {
	/// The unique identifier of the comment.
	#[serde(skip_deserializing)]
	pub id: Uuid,
	/// The user that wrote the comment.
	#[serde(skip_deserializing)]
	pub user_id: Uuid,
	/// The post the comment belongs to, fixed at creation.
	#[serde(skip_deserializing)]
	pub post_id: Uuid,
	/// The text of the comment.
	#[validate(length(min = 1, max = 2048))]
	pub text: String,
	/// The creation time of the comment.
	#[serde(skip_deserializing)]
	pub created_at: chrono::DateTime<chrono::Utc>,
}

impl policy::Authored for Comment {
	fn author_id(&self) -> Uuid {
		self.user_id
	}
}
