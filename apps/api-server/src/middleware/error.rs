//! Error handling - every failure renders as `{"error": ..., "details"?: ...}`.

use actix_web::dev::ServiceResponse;
use actix_web::middleware::ErrorHandlerResponse;
use actix_web::{HttpResponse, ResponseError, http::StatusCode, web};

use cattery_core::error::{DomainError, RepoError};
use cattery_core::ports::AuthError;
use cattery_shared::ErrorBody;

use crate::middleware::auth::AuthenticationError;
use crate::state::AppState;

const INTERNAL_MESSAGE: &str = "Internal server error";

/// Application-level error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::BadRequest(message.into())
    }

    pub fn body(&self) -> ErrorBody {
        match self {
            AppError::BadRequest(msg)
            | AppError::Unauthorized(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg) => ErrorBody::new(msg.clone()),
            AppError::Internal(_) => ErrorBody::new(INTERNAL_MESSAGE),
        }
    }

    /// Underlying cause of an internal error.
    pub fn internal_detail(&self) -> Option<&str> {
        match self {
            AppError::Internal(detail) => Some(detail),
            _ => None,
        }
    }
}

/// Error handler for 500 responses.
///
/// Error bodies never carry the cause on their own; this re-renders the
/// response with `details` when the app's configuration exposes them.
pub fn attach_internal_details<B>(
    res: ServiceResponse<B>,
) -> actix_web::Result<ErrorHandlerResponse<B>> {
    let expose = res
        .request()
        .app_data::<web::Data<AppState>>()
        .is_some_and(|state| state.config.expose_error_details);

    let detail = if expose {
        res.response().error().and_then(|err| {
            err.as_error::<AppError>()
                .or_else(|| err.as_error::<AuthenticationError>().map(AuthenticationError::app_error))
                .and_then(AppError::internal_detail)
                .map(str::to_owned)
        })
    } else {
        None
    };

    let Some(detail) = detail else {
        return Ok(ErrorHandlerResponse::Response(res.map_into_left_body()));
    };

    let (req, _) = res.into_parts();
    let response = HttpResponse::InternalServerError()
        .json(ErrorBody::new(INTERNAL_MESSAGE).with_details(detail));
    Ok(ErrorHandlerResponse::Response(
        ServiceResponse::new(req, response).map_into_right_body(),
    ))
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let AppError::Internal(detail) = self {
            tracing::error!("Internal error: {}", detail);
        }

        HttpResponse::build(self.status_code()).json(self.body())
    }
}

// Conversion from domain errors
impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { entity_type, .. } => {
                AppError::NotFound(format!("{} not found", entity_type))
            }
            DomainError::Validation(msg) => AppError::BadRequest(msg),
            DomainError::Duplicate(msg) => AppError::Conflict(msg),
            DomainError::Unauthorized => AppError::Unauthorized("Invalid credentials".to_string()),
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => AppError::NotFound("Resource not found".to_string()),
            RepoError::Constraint(msg) => AppError::Conflict(msg),
            RepoError::Connection(msg) => {
                tracing::error!("Database connection error: {}", msg);
                AppError::Internal(format!("Database connection failed: {}", msg))
            }
            RepoError::Query(msg) => {
                tracing::error!("Database query error: {}", msg);
                AppError::Internal(format!("Database query failed: {}", msg))
            }
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingAuth => AppError::Unauthorized("Authentication required".to_string()),
            AuthError::SessionExpired => AppError::Unauthorized("Session expired".to_string()),
            AuthError::TokenExpired => AppError::Unauthorized("Token expired".to_string()),
            AuthError::InvalidCredentials | AuthError::InvalidToken(_) => {
                AppError::Unauthorized("Invalid or expired credentials".to_string())
            }
            AuthError::HashingError(msg) | AuthError::Storage(msg) => AppError::Internal(msg),
        }
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;
