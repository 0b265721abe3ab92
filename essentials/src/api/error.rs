// Copyright 2023 Parity Technologies (UK) Ltd.
// This file is part of dexcourt-client.
//
// dexcourt-client is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// dexcourt-client is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with dexcourt-client.  If not, see <http://www.gnu.org/licenses/>.
//

use serde::Deserialize;
use thiserror::Error;

/// Validation codes the API puts in 4xx bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiErrorCode {
	MissingData,
	InvalidData,
	Forbidden,
	InvalidStatus,
	NotFound,
	Unauthorized,
	Other(String),
}

impl From<&str> for ApiErrorCode {
	fn from(value: &str) -> Self {
		match value {
			"MissingData" => ApiErrorCode::MissingData,
			"InvalidData" => ApiErrorCode::InvalidData,
			"Forbidden" => ApiErrorCode::Forbidden,
			"InvalidStatus" => ApiErrorCode::InvalidStatus,
			"NotFound" => ApiErrorCode::NotFound,
			"Unauthorized" => ApiErrorCode::Unauthorized,
			other => ApiErrorCode::Other(other.to_owned()),
		}
	}
}

#[derive(Debug, Error)]
pub enum ApiError {
	#[error("network error: {0}")]
	Network(#[source] reqwest::Error),
	#[error("request timed out")]
	Timeout,
	#[error("HTTP {status}: {message}")]
	Http { status: u16, code: Option<ApiErrorCode>, message: String },
	#[error("request rejected: {0}")]
	Rejected(String),
	#[error("cannot decode response: {0}")]
	Decode(#[from] serde_json::Error),
	#[error("invalid url: {0}")]
	Url(#[from] url::ParseError),
	#[error("cannot encode query: {0}")]
	Query(String),
	#[error("cannot read upload {path}: {source}")]
	Upload { path: String, source: std::io::Error },
}

#[derive(Deserialize, Default)]
struct ErrorBody {
	#[serde(alias = "code")]
	error: Option<String>,
	message: Option<String>,
}

impl From<reqwest::Error> for ApiError {
	fn from(err: reqwest::Error) -> Self {
		if err.is_timeout() {
			return ApiError::Timeout
		}
		match err.status() {
			Some(status) => ApiError::Http { status: status.as_u16(), code: None, message: err.to_string() },
			None => ApiError::Network(err),
		}
	}
}

impl ApiError {
	/// Builds an error from a non-successful response body.
	pub fn from_response(status: u16, body: &[u8]) -> Self {
		let parsed: ErrorBody = serde_json::from_slice(body).unwrap_or_default();
		let message = parsed
			.message
			.or_else(|| std::str::from_utf8(body).ok().map(|s| s.trim().to_owned()))
			.unwrap_or_default();

		ApiError::Http { status, code: parsed.error.as_deref().map(ApiErrorCode::from), message }
	}

	pub fn status(&self) -> Option<u16> {
		match self {
			ApiError::Http { status, .. } => Some(*status),
			_ => None,
		}
	}

	/// Fixed message shown to the user for this error.
	pub fn user_message(&self) -> &'static str {
		match self {
			ApiError::Network(_) => "Network error. Please check your connection.",
			ApiError::Timeout => "The request timed out. Please try again.",
			ApiError::Http { status: 413, .. } => "Uploaded files are too large.",
			ApiError::Http { status, .. } if *status >= 500 => "Server error. Please try again later.",
			ApiError::Http { code: Some(code), .. } => match code {
				ApiErrorCode::MissingData => "Please fill in all required fields.",
				ApiErrorCode::InvalidData => "Some of the provided data is invalid.",
				ApiErrorCode::Forbidden => "You are not allowed to perform this action.",
				ApiErrorCode::InvalidStatus => "This action is not available in the current status.",
				ApiErrorCode::NotFound => "The requested item was not found.",
				ApiErrorCode::Unauthorized => "Your session has expired. Please log in again.",
				ApiErrorCode::Other(_) => GENERIC_MESSAGE,
			},
			ApiError::Http { status: 401, .. } => "Your session has expired. Please log in again.",
			ApiError::Upload { .. } => "Cannot read one of the selected files.",
			ApiError::Rejected(_) => "The server could not complete the request.",
			_ => GENERIC_MESSAGE,
		}
	}
}

const GENERIC_MESSAGE: &str = "Something went wrong. Please try again.";

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn maps_validation_codes() {
		let err = ApiError::from_response(400, br#"{"error":"MissingData","message":"title is required"}"#);
		assert_eq!(err.user_message(), "Please fill in all required fields.");
		assert_eq!(err.to_string(), "HTTP 400: title is required");

		let err = ApiError::from_response(409, br#"{"code":"InvalidStatus"}"#);
		assert_eq!(err.user_message(), "This action is not available in the current status.");
	}

	#[test]
	fn maps_status_categories() {
		assert_eq!(ApiError::from_response(413, b"").user_message(), "Uploaded files are too large.");
		assert_eq!(ApiError::from_response(500, b"oops").user_message(), "Server error. Please try again later.");
		assert_eq!(ApiError::Timeout.user_message(), "The request timed out. Please try again.");
		assert_eq!(ApiError::Rejected("nope".into()).user_message(), "The server could not complete the request.");
	}

	#[test]
	fn falls_back_to_generic_message() {
		let err = ApiError::from_response(418, br#"{"error":"Teapot"}"#);
		assert_eq!(err.user_message(), GENERIC_MESSAGE);
		assert_eq!(err.status(), Some(418));
	}

	#[test]
	fn keeps_plain_text_bodies() {
		match ApiError::from_response(400, b" bad request \n") {
			ApiError::Http { code, message, .. } => {
				assert!(code.is_none());
				assert_eq!(message, "bad request");
			},
			e => panic!("unexpected error {e:?}"),
		}
	}
}
