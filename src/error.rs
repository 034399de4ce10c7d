use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Forbidden")]
    Forbidden,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    /// Message shown to the caller. Store and internal failures stay in the log.
    fn public_message(&self) -> String {
        match self {
            AppError::Database(msg) => {
                tracing::error!("Database error: {}", msg);
                "Database error occurred".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
            AppError::Unauthorized => "Please sign in to continue".to_string(),
            AppError::InvalidCredentials => "Invalid email or password".to_string(),
            AppError::Forbidden => "Admin access required".to_string(),
            AppError::NotFound(msg)
            | AppError::BadRequest(msg)
            | AppError::Conflict(msg)
            | AppError::Validation(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.public_message(),
        }));

        (self.status_code(), body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".to_string()),
            other => AppError::Database(other.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        // One line per failing field, using the message from the derive when present
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(message) => message.to_string(),
                    None => format!("{} is invalid", field),
                })
            })
            .collect();
        messages.sort();

        AppError::Validation(messages.join("; "))
    }
}

/// True when a sqlx error is a UNIQUE constraint violation.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|db_err| db_err.is_unique_violation())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Form {
        #[validate(length(min = 1, message = "Name is required"))]
        name: String,
        #[validate(range(min = 1))]
        count: i32,
    }

    #[test]
    fn validation_errors_become_readable_422() {
        let errors = Form { name: String::new(), count: 0 }.validate().unwrap_err();
        let err = AppError::from(errors);

        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        match err {
            AppError::Validation(msg) => {
                assert!(msg.contains("Name is required"));
                assert!(msg.contains("count is invalid"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn row_not_found_maps_to_404() {
        assert_eq!(
            AppError::from(sqlx::Error::RowNotFound).status_code(),
            StatusCode::NOT_FOUND
        );
    }
}
