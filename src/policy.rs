use axum::http::StatusCode;
use uuid::Uuid;

use crate::error::{ErrorShape, Message};

/// The identity a request acts under, threaded explicitly into every
/// decision. There is no ambient "current user".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Caller {
	Anonymous,
	User(Uuid),
}

/// What the request wants to do with a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
	Read,
	Create,
	Modify,
	Delete,
}

/// Content with a single owning author. Implementing this is all a
/// resource type needs to participate in the ownership rule.
pub trait Authored {
	fn author_id(&self) -> Uuid;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Deny {
	#[error("authentication_required")]
	AuthenticationRequired,
	#[error("forbidden")]
	Forbidden,
}

impl ErrorShape for Deny {
	fn status(&self) -> StatusCode {
		match self {
			Self::AuthenticationRequired => StatusCode::UNAUTHORIZED,
			Self::Forbidden => StatusCode::FORBIDDEN,
		}
	}

	fn into_errors(self) -> Vec<Message<'static>> {
		Message::new(self.to_string()).into_vec()
	}
}

/// Decides whether `caller` may perform `action` on `resource`.
///
/// Reads are always allowed, anonymous callers included. Any write needs an
/// authenticated caller; modifying or deleting an existing resource
/// additionally needs the caller to be its author. The same rule applies to
/// every resource type. The authentication check runs first, so an
/// anonymous caller is told to authenticate rather than that it is not the
/// owner.
pub fn decide(caller: Caller, action: Action, resource: Option<&dyn Authored>) -> Result<(), Deny> {
	let user = match (caller, action) {
		(_, Action::Read) => return Ok(()),
		(Caller::Anonymous, _) => return Err(Deny::AuthenticationRequired),
		(Caller::User(id), _) => id,
	};

	match (action, resource) {
		(Action::Modify | Action::Delete, Some(resource)) if resource.author_id() != user => {
			Err(Deny::Forbidden)
		}
		_ => Ok(()),
	}
}
