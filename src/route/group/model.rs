pub use crate::route::model::IdInput;

use schemars::JsonSchema;
use serde::Serialize;
use uuid::Uuid;

/// A community that posts can be published into. Groups are provisioned
/// out of band; the API only reads them.
#[derive(Debug, Serialize, JsonSchema)]
pub struct Group {
	/// The unique identifier of the group.
	pub id: Uuid,
	/// The display name of the group.
	pub title: String,
	/// The unique url-safe handle of the group.
	pub slug: String,
	/// A free-text description.
	pub description: String,
}
