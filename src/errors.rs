//! Error kinds shared by the server and the browser, and the mapping from any
//! failure to a short generic message that never leaks backend detail.
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const AUTH_FAILED: &str = "Authentication failed. Please try again.";
pub const VALIDATION_FAILED: &str = "Please check your input and try again.";
pub const NETWORK_ERROR: &str = "Network error. Please check your connection.";
pub const SERVER_ERROR: &str = "An unexpected error occurred. Please try again later.";
pub const RATE_LIMITED: &str = "Too many requests. Please wait before trying again.";
pub const UNAUTHORIZED: &str = "You are not authorized to perform this action.";
pub const NOT_FOUND: &str = "The requested resource was not found.";
pub const ACCOUNT_EXISTS: &str = "An account with this email already exists.";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Authentication,
    Validation,
    Network,
    Server,
    RateLimit,
    Authorization,
    NotFound,
}

impl ErrorKind {
    pub fn generic_message(&self) -> &'static str {
        match self {
            ErrorKind::Authentication => AUTH_FAILED,
            ErrorKind::Validation => VALIDATION_FAILED,
            ErrorKind::Network => NETWORK_ERROR,
            ErrorKind::Server => SERVER_ERROR,
            ErrorKind::RateLimit => RATE_LIMITED,
            ErrorKind::Authorization => UNAUTHORIZED,
            ErrorKind::NotFound => NOT_FOUND,
        }
    }

    /// Security-relevant failures are logged separately.
    pub fn is_security_event(&self) -> bool {
        matches!(
            self,
            ErrorKind::Authentication | ErrorKind::Authorization | ErrorKind::RateLimit
        )
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("authentication required")]
    Unauthenticated,

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("rate limit exceeded for {0}")]
    RateLimited(String),

    #[error("plan limit reached: {0}")]
    PlanLimit(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("upstream error: {0}")]
    Upstream(String),

    #[cfg(feature = "ssr")]
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Unauthenticated => ErrorKind::Authentication,
            AppError::Validation(_) => ErrorKind::Validation,
            AppError::RateLimited(_) => ErrorKind::RateLimit,
            AppError::PlanLimit(_) => ErrorKind::Authorization,
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::Upstream(_) => ErrorKind::Network,
            #[cfg(feature = "ssr")]
            AppError::Database(rusqlite::Error::QueryReturnedNoRows) => ErrorKind::NotFound,
            #[cfg(feature = "ssr")]
            AppError::Database(_) => ErrorKind::Server,
            AppError::Internal(_) => ErrorKind::Server,
        }
    }

    /// The only text a user ever sees for this error.
    pub fn user_message(&self) -> &'static str {
        self.kind().generic_message()
    }
}

/// Body returned by the API for every failed request.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ErrorBody {
    pub error: bool,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: ErrorKind,
}

impl From<&AppError> for ErrorBody {
    fn from(err: &AppError) -> Self {
        Self {
            error: true,
            message: err.user_message().to_string(),
            kind: err.kind(),
        }
    }
}

/// Classifies a free-text failure (typically from an upstream service) into
/// one of the generic messages.
pub fn sanitize_error_message(raw: &str) -> &'static str {
    let message = raw.to_lowercase();
    let has = |needles: &[&str]| needles.iter().any(|n| message.contains(n));

    if has(&["invalid login credentials", "invalid email or password"]) {
        AUTH_FAILED
    } else if has(&["user already registered", "email already exists"]) {
        ACCOUNT_EXISTS
    } else if has(&["rate limit", "too many requests"]) {
        RATE_LIMITED
    } else if has(&["unauthorized", "not authenticated"]) {
        UNAUTHORIZED
    } else if has(&["validation", "invalid"]) {
        VALIDATION_FAILED
    } else if has(&["network", "fetch"]) {
        NETWORK_ERROR
    } else if has(&["not found"]) {
        NOT_FOUND
    } else {
        SERVER_ERROR
    }
}

#[cfg(feature = "ssr")]
mod http {
    use super::{AppError, ErrorBody, ErrorKind};
    use actix_web::{http::StatusCode, HttpResponse, ResponseError};
    use leptos::logging::{error, warn};

    impl ResponseError for AppError {
        fn status_code(&self) -> StatusCode {
            match self.kind() {
                ErrorKind::Authentication => StatusCode::UNAUTHORIZED,
                ErrorKind::Validation => StatusCode::BAD_REQUEST,
                ErrorKind::RateLimit => StatusCode::TOO_MANY_REQUESTS,
                ErrorKind::Authorization => StatusCode::FORBIDDEN,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::Network => StatusCode::BAD_GATEWAY,
                ErrorKind::Server => StatusCode::INTERNAL_SERVER_ERROR,
            }
        }

        fn error_response(&self) -> HttpResponse {
            if self.kind().is_security_event() {
                warn!("[SECURITY] {}", self);
            } else {
                error!("[API] {}", self);
            }
            HttpResponse::build(self.status_code()).json(ErrorBody::from(self))
        }
    }
}
