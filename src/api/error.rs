use axum::extract::rejection::JsonRejection;
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use crate::auth::models::AuthError;
use crate::errors::InnkeepError;

/// Response envelope shared by every endpoint. Success responses carry
/// `data`, failures carry `error`, never both.
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Envelope { ok: true, data: Some(data), error: None }
    }
}

/// Shorthand for the common `{ ok: true, data }` success body.
pub fn ok<T: Serialize>(data: T) -> Json<Envelope<T>> {
    Json(Envelope::ok(data))
}

/// Success body with no payload, serialized as `{ "ok": true }`.
pub fn ok_empty() -> Json<Envelope<()>> {
    Json(Envelope { ok: true, data: None, error: None })
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Internal(String),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn bad_request<S: Into<String>>(msg: S) -> Self {
        ApiError::BadRequest(msg.into())
    }

    pub fn unauthorized<S: Into<String>>(msg: S) -> Self {
        ApiError::Unauthorized(msg.into())
    }

    pub fn forbidden<S: Into<String>>(msg: S) -> Self {
        ApiError::Forbidden(msg.into())
    }

    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        ApiError::NotFound(msg.into())
    }

    pub fn internal<S: Into<String>>(msg: S) -> Self {
        ApiError::Internal(msg.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let message = match self {
            // Internal detail stays in the logs; the client gets a
            // generic line.
            ApiError::Internal(detail) => {
                tracing::error!(error = %detail, "Internal server error");
                "Internal server error".to_string()
            }
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg) => msg,
        };

        let body = Envelope::<()> { ok: false, data: None, error: Some(message) };
        (status, Json(body)).into_response()
    }
}

impl From<InnkeepError> for ApiError {
    fn from(err: InnkeepError) -> Self {
        match err {
            InnkeepError::Validation { message } => ApiError::BadRequest(message),
            InnkeepError::NotFound { resource_type, id } => {
                ApiError::NotFound(format!("{} not found: {}", resource_type, id))
            }
            InnkeepError::Database { source, context } => {
                ApiError::Internal(format!("{}: {}", context, source))
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::NoSession | AuthError::SessionExpired | AuthError::InvalidCredentials => {
                ApiError::Unauthorized(err.to_string())
            }
            AuthError::NoOrganizationsAssigned
            | AuthError::OrganizationNotAllowed
            | AuthError::WrongOrganization
            | AuthError::NoMembership
            | AuthError::InsufficientRole => ApiError::Forbidden(err.to_string()),
            AuthError::InvalidInvitation | AuthError::MissingContext | AuthError::MissingOrgId => {
                ApiError::BadRequest(err.to_string())
            }
            AuthError::Persistence(inner) => ApiError::from(inner),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// `axum::Json` with the rejection folded into the response envelope, so a
/// malformed body comes back as `400 { ok: false, error }` like every other
/// client error.
#[derive(Debug, axum::extract::FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
