use aide::OperationInput;
use axum::{
	extract::{FromRef, FromRequestParts},
	http::{header, request},
};
use uuid::Uuid;

use crate::{
	error::RouteError,
	openapi::{SECURITY_SCHEME_BEARER, SECURITY_SCHEME_SESSION},
	route::auth,
	session, Database,
};

pub const AUTHORIZATION_PREFIX: &str = "Bearer ";

/// The authenticated session and its user, extracted from the request.
///
/// The session id is read from the `session` cookie or from an
/// `Authorization: Bearer <session-id>` header. Endpoints that take this
/// extractor reject unauthenticated requests with 401 before any handler
/// logic runs.
///
/// ```rust
/// async fn route(session: Session) {
///   println!("{:?}", session.user);
/// }
/// ```
#[derive(Debug)]
pub struct Session {
	pub id: Uuid,
	pub user: auth::model::User,
}

async fn session_user(
	database: &Database,
	session_id: Uuid,
) -> Result<Option<auth::model::User>, sqlx::Error> {
	sqlx::query_as!(
		auth::model::User,
		r#"
			SELECT * FROM "user" WHERE id = (
				SELECT user_id FROM session WHERE id = $1
			)
		"#,
		session_id
	)
	.fetch_optional(database)
	.await
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Session
where
	Database: FromRef<S>,
	S: Sync + Send,
{
	type Rejection = RouteError<auth::Error>;

	/// Extracts the session from the bearer header or the session cookie.
	async fn from_request_parts(
		parts: &mut request::Parts,
		state: &S,
	) -> Result<Self, Self::Rejection> {
		let session_id = if let Some(header) = parts.headers.get(header::AUTHORIZATION) {
			let token = header
				.to_str()
				.ok()
				.and_then(|value| value.strip_prefix(AUTHORIZATION_PREFIX))
				.ok_or(auth::Error::InvalidBearerToken)?;

			Uuid::parse_str(token).map_err(|_| auth::Error::InvalidBearerToken)?
		} else {
			let cookies = parts
				.headers
				.get_all(header::COOKIE)
				.into_iter()
				.filter_map(|value| value.to_str().ok());

			let session_cookie = cookies
				.flat_map(cookie::Cookie::split_parse)
				.filter_map(Result::ok)
				.find(|cookie| cookie.name() == session::COOKIE_NAME)
				.ok_or(auth::Error::NoCredentials)?;

			Uuid::parse_str(session_cookie.value())
				.map_err(|_| auth::Error::InvalidSessionCookie)?
		};

		let database = Database::from_ref(state);
		let user = session_user(&database, session_id)
			.await?
			.ok_or(auth::Error::UnknownSession)?;

		Ok(Session {
			id: session_id,
			user,
		})
	}
}

impl OperationInput for Session {
	/// Adds the session cookie and bearer token requirements to the
	/// `OpenAPI` operation.
	fn operation_input(_ctx: &mut aide::gen::GenContext, operation: &mut aide::openapi::Operation) {
		operation.security.extend([
			[(SECURITY_SCHEME_SESSION.to_string(), Vec::new())]
				.into_iter()
				.collect(),
			[(SECURITY_SCHEME_BEARER.to_string(), Vec::new())]
				.into_iter()
				.collect(),
		]);
	}
}
