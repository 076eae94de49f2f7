//! Failures of the query service client.

use serde::Deserialize;
use thiserror::Error;

/// The error type for query service calls.
///
/// The display text of every variant is the message shown to the user; query state
/// keeps nothing but that string.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApiError {
	/// The request could not complete.
	#[error("{0}")]
	Transport(String),

	/// The service answered with a non-success status.
	#[error("{message}")]
	Response {
		/// HTTP status code.
		status: u16,
		/// Service-provided message, or a generic one naming the status.
		message: String,
	},

	/// A success response whose body could not be decoded.
	#[error("unexpected response: {0}")]
	Decode(String),

	/// The request URL could not be built.
	#[error("invalid request url: {0}")]
	Url(String),
}

#[derive(Deserialize)]
struct ErrorBody {
	#[serde(default)]
	error: Option<String>,
}

impl ApiError {
	/// Builds the error for a non-success response from its status and raw body.
	///
	/// A JSON body with a non-empty string `error` field supplies the message; anything
	/// else, including malformed bodies, falls back to the generic status message.
	pub fn from_response(status: u16, body: &str) -> Self {
		let message = serde_json::from_str::<ErrorBody>(body)
			.ok()
			.and_then(|b| b.error)
			.filter(|m| !m.trim().is_empty())
			.unwrap_or_else(|| format!("request failed with status {status}"));
		Self::Response { status, message }
	}

	/// Status code of a response failure.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Response { status, .. } => Some(*status),
			_ => None,
		}
	}
}

impl From<gloo_net::Error> for ApiError {
	fn from(err: gloo_net::Error) -> Self {
		match err {
			gloo_net::Error::SerdeError(e) => Self::Decode(e.to_string()),
			other => Self::Transport(other.to_string()),
		}
	}
}

impl From<url::ParseError> for ApiError {
	fn from(err: url::ParseError) -> Self {
		Self::Url(err.to_string())
	}
}

/// A specialized Result type for query service calls.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;

	#[test]
	fn structured_error_message_is_used() {
		let err = ApiError::from_response(404, r#"{"error":"function not found"}"#);
		assert_eq!(err.to_string(), "function not found");
		assert_eq!(err.status(), Some(404));
	}

	#[rstest]
	#[case::not_json("<html>bad gateway</html>")]
	#[case::empty("")]
	#[case::no_error_field(r#"{"detail":"x"}"#)]
	#[case::blank_error(r#"{"error":"  "}"#)]
	#[case::wrong_type(r#"{"error":42}"#)]
	fn malformed_bodies_fall_back_to_generic_message(#[case] body: &str) {
		let err = ApiError::from_response(502, body);
		assert_eq!(err.to_string(), "request failed with status 502");
	}

	#[test]
	fn transport_message_passes_through() {
		let err = ApiError::Transport("network unreachable".into());
		assert_eq!(err.to_string(), "network unreachable");
		assert_eq!(err.status(), None);
	}
}
