//! Response envelope interpretation.
//!
//! # Responsibilities
//! - Decide success from the HTTP status AND the business marker
//! - Map every failure onto the error taxonomy
//!
//! 401 is classified here; the session side effects belong to the transport.

use serde_json::Value;

use crate::error::{Error, Result};

pub const REQUEST_FAILED: &str = "Request failed";
pub const UPLOAD_FAILED: &str = "Upload failed";
pub const SESSION_EXPIRED: &str = "Session expired, please sign in again";

/// The structured reply of the backend.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Envelope {
    pub code: Option<i64>,
    pub success: Option<bool>,
    /// Nested payload; an explicit JSON null is treated as absent.
    pub data: Option<Value>,
    pub message: Option<String>,
    pub error: Option<String>,
}

impl Envelope {
    /// Read envelope fields out of a JSON object. Non-objects yield `None`.
    ///
    /// Fields of an unexpected type are treated as absent.
    pub fn from_value(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        Some(Self {
            code: map.get("code").and_then(Value::as_i64),
            success: map.get("success").and_then(Value::as_bool),
            data: map.get("data").filter(|d| !d.is_null()).cloned(),
            message: map.get("message").and_then(Value::as_str).map(str::to_string),
            error: map.get("error").and_then(Value::as_str).map(str::to_string),
        })
    }

    /// Business-success marker: `code == 0` or `success == true`.
    pub fn is_success(&self) -> bool {
        self.code == Some(0) || self.success == Some(true)
    }

    /// Server-supplied message, `message` first then `error`.
    pub fn server_message(&self) -> Option<&str> {
        self.message
            .as_deref()
            .or(self.error.as_deref())
            .filter(|m| !m.trim().is_empty())
    }
}

fn parse(body: &[u8]) -> Option<Value> {
    if body.is_empty() {
        return None;
    }
    serde_json::from_slice(body).ok()
}

fn server_message(parsed: Option<&Value>) -> Option<String> {
    parsed
        .and_then(Envelope::from_value)
        .and_then(|e| e.server_message().map(str::to_string))
}

/// Interpret a JSON API response.
pub fn interpret(status: u16, body: &[u8]) -> Result<Value> {
    let parsed = parse(body);

    match status {
        200..=299 => {
            let value = parsed
                .ok_or_else(|| Error::Other("response body is not valid JSON".to_string()))?;
            let envelope = Envelope::from_value(&value)
                .ok_or_else(|| Error::Other("response body is not a JSON object".to_string()))?;

            if envelope.is_success() {
                return Ok(envelope.data.unwrap_or(value));
            }
            Err(Error::Business {
                code: envelope.code.unwrap_or_default(),
                message: envelope
                    .server_message()
                    .unwrap_or(REQUEST_FAILED)
                    .to_string(),
                data: envelope.data,
            })
        }
        401 => Err(Error::Unauthorized {
            message: SESSION_EXPIRED.to_string(),
        }),
        _ => Err(Error::Http {
            status,
            message: server_message(parsed.as_ref()).unwrap_or_else(|| REQUEST_FAILED.to_string()),
            body: parsed,
        }),
    }
}

/// Interpret the response of a file upload to the API.
///
/// A 2xx response must also carry a result: a top-level `url`, or a
/// success envelope with a non-null `data`.
pub fn interpret_upload(status: u16, body: &[u8]) -> Result<Value> {
    let parsed = parse(body);

    if status == 401 {
        return Err(Error::Unauthorized {
            message: SESSION_EXPIRED.to_string(),
        });
    }
    if !(200..300).contains(&status) {
        let message = server_message(parsed.as_ref()).unwrap_or_else(|| UPLOAD_FAILED.to_string());
        return Err(Error::upload(Some(status), message));
    }

    let Some(value) = parsed else {
        return Err(Error::upload(Some(status), "upload response is not valid JSON"));
    };
    let Some(envelope) = Envelope::from_value(&value) else {
        return Err(Error::upload(Some(status), "upload response is not a JSON object"));
    };

    let has_url = value
        .get("url")
        .and_then(Value::as_str)
        .is_some_and(|u| !u.is_empty());
    if has_url {
        return Ok(value);
    }

    match envelope.data {
        Some(data) if envelope.is_success() => Ok(data),
        _ => {
            let message = envelope.server_message().unwrap_or(UPLOAD_FAILED).to_string();
            Err(Error::upload(Some(status), message))
        }
    }
}
