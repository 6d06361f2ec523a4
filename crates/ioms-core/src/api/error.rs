use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Unauthorized - token may be expired")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rejected request: {0}")]
    BadRequest(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Error body shape the backend uses for user-facing failures
#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            400 => ApiError::BadRequest(truncated),
            401 => ApiError::Unauthorized,
            403 => ApiError::AccessDenied(truncated),
            404 => ApiError::NotFound(truncated),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError(truncated),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, truncated)),
        }
    }

    /// The `message` field of a JSON error body, if the server sent one
    pub fn server_message(&self) -> Option<String> {
        let body = match self {
            ApiError::BadRequest(body)
            | ApiError::AccessDenied(body)
            | ApiError::NotFound(body)
            | ApiError::ServerError(body) => body,
            _ => return None,
        };
        serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.trim().is_empty())
    }

    /// Message suitable for showing on the sign-in screen
    pub fn login_message(&self) -> String {
        if let Some(message) = self.server_message() {
            return message;
        }
        match self {
            ApiError::Unauthorized | ApiError::BadRequest(_) => {
                "Login failed. Please check your credentials.".to_string()
            }
            ApiError::NetworkError(e) if e.is_timeout() => {
                "Connection timed out. Please try again.".to_string()
            }
            ApiError::NetworkError(_) => {
                "Unable to connect to server. Check your internet connection.".to_string()
            }
            other => format!("Login failed: {}", other),
        }
    }

    /// Message suitable for showing on the sign-up screen
    pub fn signup_message(&self) -> String {
        match (self.server_message(), self) {
            (Some(message), _) => message,
            (None, ApiError::NetworkError(_)) => {
                "Unable to connect to server. Check your internet connection.".to_string()
            }
            (None, _) => "Registration failed. Please try again.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status() {
        assert!(matches!(
            ApiError::from_status(StatusCode::UNAUTHORIZED, ""),
            ApiError::Unauthorized
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_REQUEST, "{}"),
            ApiError::BadRequest(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_GATEWAY, "upstream"),
            ApiError::ServerError(body) if body == "upstream"
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::IM_A_TEAPOT, ""),
            ApiError::InvalidResponse(_)
        ));
    }

    #[test]
    fn test_truncate_body() {
        let long = "x".repeat(600);
        let truncated = ApiError::truncate_body(&long);
        assert!(truncated.starts_with(&"x".repeat(500)));
        assert!(truncated.ends_with("(truncated, 600 total bytes)"));

        // Never splits a multi-byte character
        let accents = "é".repeat(400);
        assert!(ApiError::truncate_body(&accents).contains("truncated"));
    }

    #[test]
    fn test_login_message() {
        assert_eq!(
            ApiError::Unauthorized.login_message(),
            "Login failed. Please check your credentials."
        );
        assert_eq!(
            ApiError::ServerError("boom".to_string()).login_message(),
            "Login failed: Server error: boom"
        );
    }

    #[test]
    fn test_server_message_takes_precedence() {
        let err = ApiError::from_status(
            reqwest::StatusCode::BAD_REQUEST,
            r#"{"message": "No active account found"}"#,
        );
        assert_eq!(err.server_message().as_deref(), Some("No active account found"));
        assert_eq!(err.login_message(), "No active account found");
        assert_eq!(err.signup_message(), "No active account found");
    }

    #[test]
    fn test_unstructured_body_falls_back() {
        let err = ApiError::from_status(reqwest::StatusCode::BAD_REQUEST, r#"{"email": ["taken"]}"#);
        assert!(err.server_message().is_none());
        assert_eq!(err.login_message(), "Login failed. Please check your credentials.");
        assert_eq!(err.signup_message(), "Registration failed. Please try again.");

        let err = ApiError::from_status(reqwest::StatusCode::BAD_REQUEST, "<html>bad</html>");
        assert!(err.server_message().is_none());
        assert!(ApiError::Unauthorized.server_message().is_none());
    }
}
