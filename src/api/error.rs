//! Error taxonomy for the admin API data layer.
//!
//! Every failure surfaced to a caller is one of these variants. The CLI
//! decides how each renders: field errors inline, everything else as a
//! single generic line.

use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;

/// Field name -> list of human-readable messages for that field.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// 401 from the API. Logged and surfaced; the session is NOT cleared
    /// and no re-login is forced.
    #[error("unauthorized: {message}")]
    Auth { message: String },

    /// The API rejected the payload with a per-field error map.
    #[error("{message}")]
    Validation {
        message: String,
        field_errors: FieldErrors,
    },

    /// Network failure or a non-2xx status without a field error map.
    #[error("request failed: {0}")]
    Transport(String),

    /// The response body did not match the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(String),

    /// One or more files in an upload batch failed; nothing was applied.
    #[error("image upload failed: {0}")]
    Upload(String),
}

/// Error body shape used by the API on rejected requests:
/// `{ success, message, error: { fieldErrors: { field: [msgs] } } }`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorDetail {
    field_errors: Option<FieldErrors>,
}

impl ApiError {
    /// Classify a non-success HTTP response into a taxonomy variant.
    ///
    /// 401 -> `Auth`, a body carrying `error.fieldErrors` -> `Validation`,
    /// anything else -> `Transport` with the status and server message.
    pub fn classify(status: u16, body: &serde_json::Value) -> Self {
        let parsed: Option<ErrorBody> = serde_json::from_value(body.clone()).ok();
        let message = parsed
            .as_ref()
            .and_then(|b| b.message.clone())
            .unwrap_or_else(|| format!("HTTP {}", status));

        if status == 401 {
            return ApiError::Auth { message };
        }

        if let Some(field_errors) = parsed
            .and_then(|b| b.error)
            .and_then(|d| d.field_errors)
            .filter(|m| !m.is_empty())
        {
            return ApiError::Validation {
                message,
                field_errors,
            };
        }

        ApiError::Transport(format!("{} ({})", message, status))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}
