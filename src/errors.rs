use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Db(sqlx::Error),
    /// Store unreachable or timed out outside of sqlx (e.g. an offline backend).
    Unavailable(String),
    /// Stored data could not be decoded into a domain value.
    Malformed(String),
    Validation(Vec<String>),
    NotFound(String),
    PermissionDenied(String),
    Cache(String),
}

/// API error body.
#[derive(Serialize, Debug)]
pub struct ApiErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(vec![msg.into()])
    }

    /// I/O-class failures: the read paths degrade on these instead of
    /// surfacing them.
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            AppError::Db(_) | AppError::Unavailable(_) | AppError::Malformed(_)
        )
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Db(e) => write!(f, "Database error: {e}"),
            AppError::Unavailable(e) => write!(f, "Store unavailable: {e}"),
            AppError::Malformed(e) => write!(f, "Malformed data: {e}"),
            AppError::Validation(errs) => write!(f, "Validation failed: {}", errs.join("; ")),
            AppError::NotFound(what) => write!(f, "Not found: {what}"),
            AppError::PermissionDenied(e) => write!(f, "Permission denied: {e}"),
            AppError::Cache(e) => write!(f, "Cache error: {e}"),
        }
    }
}

impl std::error::Error for AppError {}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            AppError::Db(_) | AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Malformed(_) | AppError::Cache(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::Validation(errs) => ApiErrorResponse {
                error: "Validation failed".to_string(),
                details: Some(errs.join("; ")),
            },
            AppError::NotFound(what) => ApiErrorResponse {
                error: "Not found".to_string(),
                details: Some(what.clone()),
            },
            AppError::PermissionDenied(e) => ApiErrorResponse {
                error: "Permission denied".to_string(),
                details: Some(e.clone()),
            },
            _ => {
                log::error!("{self}");
                ApiErrorResponse {
                    error: "Service unavailable".to_string(),
                    details: None,
                }
            }
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                AppError::Malformed(e.to_string())
            }
            other => AppError::Db(other),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Cache(e.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Cache(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_classification() {
        assert!(AppError::Unavailable("down".into()).is_io());
        assert!(AppError::Malformed("bad phase".into()).is_io());
        assert!(AppError::Db(sqlx::Error::PoolTimedOut).is_io());
        assert!(!AppError::validation("bad date").is_io());
        assert!(!AppError::NotFound("profile 1".into()).is_io());
    }

    #[test]
    fn status_codes() {
        assert_eq!(AppError::validation("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::PermissionDenied("x".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::Unavailable("x".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
