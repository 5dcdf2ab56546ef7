use std::borrow::Cow;

use aide::OperationIo;
use axum::{
	http::StatusCode,
	response::{IntoResponse, Response},
	Json,
};
use axum_jsonschema::JsonSchemaRejection;
use schemars::JsonSchema;
use serde::Serialize;

pub type Map = serde_json::Map<String, serde_json::Value>;

/// A single error presented to the client.
///
/// `content` is a stable machine-checkable code; human-oriented or
/// structured context goes into `details`. The Display impl of the error
/// it was built from is never sent verbatim when it could leak internals.
#[derive(Debug, Serialize, JsonSchema)]
pub struct Message<'e> {
	pub content: Cow<'e, str>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub field: Option<Cow<'e, str>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<Cow<'e, Map>>,
}

impl<'e> Message<'e> {
	pub fn new(content: impl Into<Cow<'e, str>>) -> Self {
		Self {
			content: content.into(),
			field: None,
			details: None,
		}
	}

	#[must_use]
	pub fn field(mut self, field: impl Into<Cow<'e, str>>) -> Self {
		self.field = Some(field.into());
		self
	}

	#[must_use]
	pub fn detail(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
		self.details
			.get_or_insert_with(|| Cow::Owned(Map::new()))
			.to_mut()
			.insert(key.into(), value);
		self
	}

	pub fn into_vec(self) -> Vec<Self> {
		vec![self]
	}
}

/// The wire shape of every non-2xx response.
#[derive(Debug, Serialize, JsonSchema)]
pub struct ErrorResponse<'e> {
	pub errors: Vec<Message<'e>>,
}

/// Implemented by per-module error enums so the router boundary can turn
/// them into a status code and a message list.
pub trait ErrorShape: Sized {
	fn status(&self) -> StatusCode;
	fn into_errors(self) -> Vec<Message<'static>>;
}

fn respond<E: ErrorShape>(error: E) -> Response {
	(
		error.status(),
		Json(ErrorResponse {
			errors: error.into_errors(),
		}),
	)
		.into_response()
}

/// Failures that can occur in any route: malformed input, validation,
/// rate limiting, database errors.
#[derive(Debug, thiserror::Error, OperationIo)]
pub enum AppError {
	#[error("json error")]
	Json(JsonSchemaRejection),
	#[error("query error: {0}")]
	Query(#[from] axum::extract::rejection::QueryRejection),
	#[error("path error: {0}")]
	Path(#[from] axum::extract::rejection::PathRejection),
	#[error("validation error: {0}")]
	Validation(#[from] validator::ValidationErrors),
	#[error("rate limited: {0}")]
	RateLimit(#[from] tower_governor::GovernorError),
	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),
}

impl From<JsonSchemaRejection> for AppError {
	fn from(rejection: JsonSchemaRejection) -> Self {
		Self::Json(rejection)
	}
}

impl ErrorShape for AppError {
	fn status(&self) -> StatusCode {
		match self {
			Self::Json(..) | Self::Query(..) | Self::Path(..) | Self::Validation(..) => {
				StatusCode::BAD_REQUEST
			}
			Self::RateLimit(tower_governor::GovernorError::TooManyRequests { .. }) => {
				StatusCode::TOO_MANY_REQUESTS
			}
			Self::RateLimit(..) | Self::Database(..) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	fn into_errors(self) -> Vec<Message<'static>> {
		match self {
			Self::Json(rejection) => match rejection {
				JsonSchemaRejection::Json(error) => Message::new("malformed_json")
					.detail("reason", error.body_text().into())
					.into_vec(),
				JsonSchemaRejection::Serde(error) => Message::new("malformed_json")
					.detail("path", error.path().to_string().into())
					.into_vec(),
				JsonSchemaRejection::Schema(errors) => Message::new("schema_mismatch")
					.detail(
						"errors",
						serde_json::to_value(&errors).unwrap_or_default(),
					)
					.into_vec(),
			},
			Self::Query(error) => Message::new("invalid_query")
				.detail("reason", error.body_text().into())
				.into_vec(),
			Self::Path(error) => Message::new("invalid_path")
				.detail("reason", error.body_text().into())
				.into_vec(),
			Self::Validation(errors) => errors
				.field_errors()
				.into_iter()
				.flat_map(|(field, errors)| {
					errors
						.iter()
						.map(move |error| Message::new(error.code.clone()).field(field))
				})
				.collect(),
			Self::RateLimit(tower_governor::GovernorError::TooManyRequests {
				wait_time, ..
			}) => Message::new("too_many_requests")
				.detail("retry_after", wait_time.into())
				.into_vec(),
			// Internal failures are logged, never described to the client.
			Self::RateLimit(..) | Self::Database(..) => Message::new("internal_error").into_vec(),
		}
	}
}

impl IntoResponse for AppError {
	fn into_response(self) -> Response {
		if let Self::Database(ref error) = self {
			tracing::error!(%error, "database error");
		}

		respond(self)
	}
}

/// Either a route-specific failure or an application-wide one.
#[derive(Debug, thiserror::Error, OperationIo)]
pub enum RouteError<E> {
	#[error(transparent)]
	Route(E),
	#[error(transparent)]
	App(AppError),
}

impl<E: ErrorShape> From<E> for RouteError<E> {
	fn from(error: E) -> Self {
		Self::Route(error)
	}
}

impl<E: ErrorShape> From<sqlx::Error> for RouteError<E> {
	fn from(error: sqlx::Error) -> Self {
		Self::App(AppError::Database(error))
	}
}

impl<E: ErrorShape> IntoResponse for RouteError<E> {
	fn into_response(self) -> Response {
		match self {
			Self::Route(error) => respond(error),
			Self::App(error) => error.into_response(),
		}
	}
}
