use aide::axum::{
	routing::{get_with, post_with},
	ApiRouter,
};
use axum::http::StatusCode;

use crate::{error, AppState};

pub mod model;
pub mod route;

/// An error that can occur during authentication.
///
/// The Display strings are stable machine codes presented to the client;
/// they must not contain sensitive information.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("invalid_credentials")]
	InvalidUsernameOrPassword,
	#[error("password_hash_error")]
	Argon(#[from] argon2::Error),
	#[error("missing_credentials")]
	NoCredentials,
	#[error("invalid_bearer_token")]
	InvalidBearerToken,
	#[error("invalid_session_cookie")]
	InvalidSessionCookie,
	#[error("unknown_session")]
	UnknownSession,
	#[error("username_taken")]
	UsernameTaken,
	#[error("email_taken")]
	EmailTaken,
}

pub type RouteError = error::RouteError<Error>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route("/login", post_with(login, login_docs))
		.api_route("/logout", get_with(logout, logout_docs))
		.api_route("/register", post_with(register, register_docs))
		.api_route("/me", get_with(get_me, get_me_docs))
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::InvalidUsernameOrPassword
			| Self::NoCredentials
			| Self::InvalidBearerToken
			| Self::InvalidSessionCookie
			| Self::UnknownSession => StatusCode::UNAUTHORIZED,
			Self::Argon(..) => StatusCode::INTERNAL_SERVER_ERROR,
			Self::UsernameTaken | Self::EmailTaken => StatusCode::CONFLICT,
		}
	}

	fn into_errors(self) -> Vec<error::Message<'static>> {
		error::Message::new(self.to_string()).into_vec()
	}
}
