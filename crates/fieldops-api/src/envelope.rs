//! Interpretation of FieldOps backend responses.
//!
//! Every endpoint answers with a JSON envelope carrying `success` and an
//! optional `message`. A handful of well-known messages signal session or
//! version problems regardless of the HTTP status; those are lifted into typed
//! [`ApiError`] variants here so callers never string-match on them.

use std::sync::LazyLock;

use regex::Regex;
use reqwest::StatusCode;
use serde_json::Value;

use crate::error::ApiError;

const INVALID_TOKEN: &str = "Unauthorized: Invalid token";
const INVALID_SESSION: &str = "Unauthorized: Invalid session";
const UPDATE_REQUIRED_PREFIX: &str = "Please update your app to version";

static UPDATE_VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)version\s+(\S+)\s+to continue").expect("valid update version regex")
});

/// Parses a response body and maps it to either a JSON payload or a typed error.
///
/// - An empty body yields `Value::Null`.
/// - Session and update messages become [`ApiError::SessionRevoked`],
///   [`ApiError::SessionExpired`] and [`ApiError::AppUpdateRequired`].
/// - A non-2xx status whose body says `"success": false` is passed through so
///   the caller can surface the backend's message as a normal failure.
/// - Any other non-2xx status becomes [`ApiError::UnexpectedStatus`].
///
/// # Errors
///
/// See above; additionally [`ApiError::Deserialize`] when the body is not JSON.
pub fn interpret(status: StatusCode, body: &str, context: &str) -> Result<Value, ApiError> {
    let data = if body.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str::<Value>(body).map_err(|e| ApiError::Deserialize {
            context: context.to_owned(),
            source: e,
        })?
    };

    let message = data.get("message").and_then(Value::as_str);

    match message {
        Some(INVALID_TOKEN) => return Err(ApiError::SessionRevoked),
        Some(INVALID_SESSION) => return Err(ApiError::SessionExpired),
        Some(m) if m.starts_with(UPDATE_REQUIRED_PREFIX) => {
            return Err(ApiError::AppUpdateRequired {
                version: parse_update_version(m),
            });
        }
        _ => {}
    }

    if !status.is_success() {
        if data.get("success").and_then(Value::as_bool) == Some(false) {
            return Ok(data);
        }
        return Err(ApiError::UnexpectedStatus {
            status: status.as_u16(),
            message: message.unwrap_or("Something went wrong").to_owned(),
        });
    }

    Ok(data)
}

/// Extracts `X` from `"... version X to continue"`.
fn parse_update_version(message: &str) -> Option<String> {
    UPDATE_VERSION_RE
        .captures(message)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_owned())
}
