//! User-facing messages per error kind and HTTP status.

use crate::error::Error;

const GENERIC_FAILURE: &str = "Operation failed";

/// Render the message shown to a user for `error`.
///
/// Statuses 400, 409 and 422 prefer the server-supplied detail when one was sent.
pub fn user_message(error: &Error) -> String {
    match error {
        Error::Unauthorized { .. } => "Please sign in".to_string(),
        Error::Http { status, message, .. } => status_message(*status, Some(message)),
        Error::Upload { status: Some(status), message } if *status >= 400 => {
            status_message(*status, Some(message))
        }
        Error::Network { .. } => "Network connection failed, please check your network".to_string(),
        other => non_empty(other.message()).unwrap_or(GENERIC_FAILURE).to_string(),
    }
}

/// Fixed message for an HTTP status.
pub fn status_message(status: u16, detail: Option<&str>) -> String {
    let detail = detail.and_then(non_empty);
    let message = match status {
        400 => detail.unwrap_or("Invalid request parameters"),
        401 => "Please sign in",
        403 => "You do not have permission to perform this action",
        404 => "The requested resource does not exist",
        409 => detail.unwrap_or("Operation conflict, please refresh and retry"),
        422 => detail.unwrap_or("Data validation failed"),
        429 => "Too many requests, please try again later",
        500 => "Server error, please try again later",
        502 | 503 | 504 => "Service temporarily unavailable, please try again later",
        _ => detail.unwrap_or(GENERIC_FAILURE),
    };
    message.to_string()
}

fn non_empty(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http(status: u16, message: &str) -> Error {
        Error::Http { status, message: message.into(), body: None }
    }

    #[test]
    fn test_fixed_status_messages() {
        assert_eq!(user_message(&http(403, "nope")), "You do not have permission to perform this action");
        assert_eq!(user_message(&http(404, "")), "The requested resource does not exist");
        assert_eq!(user_message(&http(429, "slow down")), "Too many requests, please try again later");
        assert_eq!(user_message(&http(500, "panic")), "Server error, please try again later");
        for status in [502, 503, 504] {
            assert_eq!(
                user_message(&http(status, "")),
                "Service temporarily unavailable, please try again later"
            );
        }
    }

    #[test]
    fn test_detail_preferred_for_client_errors() {
        assert_eq!(user_message(&http(400, "phone is required")), "phone is required");
        assert_eq!(user_message(&http(400, "  ")), "Invalid request parameters");
        assert_eq!(user_message(&http(409, "")), "Operation conflict, please refresh and retry");
        assert_eq!(user_message(&http(422, "")), "Data validation failed");
        assert_eq!(user_message(&http(418, "teapot")), "teapot");
    }

    #[test]
    fn test_non_http_kinds() {
        assert_eq!(user_message(&Error::Unauthorized { message: "expired".into() }), "Please sign in");
        assert_eq!(
            user_message(&Error::network("connection refused")),
            "Network connection failed, please check your network"
        );
        assert_eq!(user_message(&Error::Validation("File exceeds 10MB".into())), "File exceeds 10MB");
        assert_eq!(user_message(&Error::Other(String::new())), "Operation failed");
        assert_eq!(user_message(&Error::upload(Some(503), "")), "Service temporarily unavailable, please try again later");
    }
}
