use thiserror::Error;

/// Message shown when a submission fails without a server-provided detail.
pub const GENERIC_SUBMIT_FAILURE: &str = "Failed to submit responses. Please try again.";

/// Message shown when a submission contains no answered questions.
pub const EMPTY_SUBMISSION: &str = "Please answer at least one question before submitting.";

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Submission error: {0}")]
    Submit(#[from] SubmitError),

    #[error("Answer error: {0}")]
    Edit(#[from] EditError),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Errors raised by the assessment backend client
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not authenticated: {message}")]
    Unauthorized { message: String },

    #[error("API error: {status} - {}", .detail.as_deref().unwrap_or("no detail"))]
    Api { status: u16, detail: Option<String> },

    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("Invalid request URL: {message}")]
    InvalidUrl { message: String },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl ApiError {
    /// Whether the failure should be retried on the next poll interval.
    ///
    /// Everything except an authentication failure is transient.
    pub fn is_transient(&self) -> bool {
        !matches!(self, ApiError::Unauthorized { .. })
    }

    /// Text suitable for showing to the person filling in the assessment.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Api {
                detail: Some(detail),
                ..
            } if !detail.trim().is_empty() => detail.clone(),
            ApiError::Unauthorized { .. } => {
                "Your session has expired. Please log in again.".to_string()
            }
            _ => GENERIC_SUBMIT_FAILURE.to_string(),
        }
    }
}

/// Submission errors
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("{}", EMPTY_SUBMISSION)]
    Empty,

    #[error("No active session")]
    NoSession,

    #[error("A submission is already in progress")]
    InFlight,

    #[error("{0}")]
    Api(#[from] ApiError),
}

impl SubmitError {
    /// Text suitable for inline display next to the submit button.
    pub fn user_message(&self) -> String {
        match self {
            SubmitError::Api(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}

/// Errors from applying a user edit to the local answer map
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EditError {
    #[error("Unknown question: {question_id}")]
    UnknownQuestion { question_id: String },

    #[error("Option '{option}' is not offered by question {question_id}")]
    InvalidOption { question_id: String, option: String },

    #[error("Question {question_id} does not accept this kind of answer: {reason}")]
    WrongVariant { question_id: String, reason: String },
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Result type alias for submissions
pub type SubmitResult<T> = Result<T, SubmitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::Config {
            message: "missing key".to_string(),
        };
        assert_eq!(err.to_string(), "Configuration error: missing key");

        let err = AppError::Internal {
            message: "unexpected".to_string(),
        };
        assert_eq!(err.to_string(), "Internal error: unexpected");
    }

    #[test]
    fn test_api_error_display() {
        let err = ApiError::Api {
            status: 422,
            detail: Some("invalid session".to_string()),
        };
        assert_eq!(err.to_string(), "API error: 422 - invalid session");

        let err = ApiError::Api {
            status: 500,
            detail: None,
        };
        assert_eq!(err.to_string(), "API error: 500 - no detail");

        let err = ApiError::Timeout { timeout_ms: 5000 };
        assert_eq!(err.to_string(), "Request timeout after 5000ms");

        let err = ApiError::Unauthorized {
            message: "token expired".to_string(),
        };
        assert_eq!(err.to_string(), "Not authenticated: token expired");
    }

    #[test]
    fn test_api_error_transience() {
        assert!(ApiError::Api {
            status: 503,
            detail: None
        }
        .is_transient());
        assert!(ApiError::InvalidResponse {
            message: "bad json".to_string()
        }
        .is_transient());
        assert!(!ApiError::Unauthorized {
            message: "expired".to_string()
        }
        .is_transient());
    }

    #[test]
    fn test_user_message_prefers_server_detail() {
        let err = ApiError::Api {
            status: 400,
            detail: Some("Session already completed".to_string()),
        };
        assert_eq!(err.user_message(), "Session already completed");

        let err = ApiError::Api {
            status: 400,
            detail: Some("   ".to_string()),
        };
        assert_eq!(err.user_message(), GENERIC_SUBMIT_FAILURE);

        let err = ApiError::InvalidResponse {
            message: "oops".to_string(),
        };
        assert_eq!(err.user_message(), GENERIC_SUBMIT_FAILURE);
    }

    #[test]
    fn test_submit_error_messages() {
        assert_eq!(SubmitError::Empty.user_message(), EMPTY_SUBMISSION);
        assert_eq!(SubmitError::NoSession.to_string(), "No active session");

        let err: SubmitError = ApiError::Api {
            status: 500,
            detail: Some("database unavailable".to_string()),
        }
        .into();
        assert_eq!(err.user_message(), "database unavailable");
    }

    #[test]
    fn test_edit_error_display() {
        let err = EditError::InvalidOption {
            question_id: "q1".to_string(),
            option: "Z".to_string(),
        };
        assert_eq!(err.to_string(), "Option 'Z' is not offered by question q1");
    }

    #[test]
    fn test_error_conversions_to_app_error() {
        let app_err: AppError = ApiError::Timeout { timeout_ms: 1000 }.into();
        assert!(matches!(app_err, AppError::Api(_)));

        let app_err: AppError = SubmitError::Empty.into();
        assert!(matches!(app_err, AppError::Submit(_)));

        let app_err: AppError = EditError::UnknownQuestion {
            question_id: "q9".to_string(),
        }
        .into();
        assert!(matches!(app_err, AppError::Edit(_)));
    }
}
