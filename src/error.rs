use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")] Database(#[from] sea_orm::DbErr),

    #[error("Timed out: {0}")] Timeout(String),

    #[error("External service error: {0}")] External(String),

    #[error("Invalid input: {0}")] InvalidInput(String),

    #[error("Product not found")]
    ProductNotFound,

    #[error("Tracking not found")]
    TrackingNotFound,

    #[error("Already tracking this product")]
    AlreadyTracking,

    #[error("Tracking is suspended")]
    TrackingSuspended,

    #[error("Configuration error: {0}")] Config(String),

    #[error("Internal error: {0}")] Internal(String),
}

/// Coarse failure classes. Cycle code retries `TransientIo` on the next run,
/// skips `NotFound` items, and surfaces `Conflict` to the caller as a rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    TransientIo,
    NotFound,
    Conflict,
    Invalid,
    Fatal,
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(serde::Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Database(_) | AppError::Timeout(_) | AppError::External(_) => {
                ErrorKind::TransientIo
            }
            AppError::ProductNotFound | AppError::TrackingNotFound => ErrorKind::NotFound,
            AppError::AlreadyTracking | AppError::TrackingSuspended => ErrorKind::Conflict,
            AppError::InvalidInput(_) => ErrorKind::Invalid,
            AppError::Config(_) | AppError::Internal(_) => ErrorKind::Fatal,
        }
    }

    pub fn is_transient(&self) -> bool {
        self.kind() == ErrorKind::TransientIo
    }

    /// A concurrent writer already inserted the same unique key.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            AppError::Database(e) =>
                matches!(e.sql_err(), Some(sea_orm::SqlErr::UniqueConstraintViolation(_))),
            _ => false,
        }
    }

    pub fn to_error_response(&self) -> ErrorResponse {
        let (code, message) = match self {
            AppError::Database(_) | AppError::Timeout(_) | AppError::External(_) =>
                ("SERVICE_UNAVAILABLE", "Please try again later".to_string()),
            AppError::InvalidInput(msg) => ("INVALID_INPUT", msg.clone()),
            AppError::ProductNotFound => ("PRODUCT_NOT_FOUND", "Product not found!".to_string()),
            AppError::TrackingNotFound => ("TRACKING_NOT_FOUND", "Tracking not found!".to_string()),
            AppError::AlreadyTracking =>
                ("TRACKING_EXIST", "You are tracking this product!".to_string()),
            AppError::TrackingSuspended =>
                ("TRACKING_FAIL", "Tracking product fail!".to_string()),
            AppError::Config(msg) => ("CONFIG_ERROR", msg.clone()),
            AppError::Internal(msg) => ("INTERNAL_ERROR", msg.clone()),
        };

        ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::ProductNotFound | AppError::TrackingNotFound => {
                axum::http::StatusCode::NOT_FOUND
            }
            AppError::AlreadyTracking => axum::http::StatusCode::CONFLICT,
            AppError::TrackingSuspended | AppError::InvalidInput(_) => {
                axum::http::StatusCode::BAD_REQUEST
            }
            AppError::Database(_) | AppError::Timeout(_) | AppError::External(_) => {
                axum::http::StatusCode::SERVICE_UNAVAILABLE
            }
            _ => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::warn!(error = %self, "request failed");
        }

        let response = self.to_error_response();
        (status, axum::Json(response)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
