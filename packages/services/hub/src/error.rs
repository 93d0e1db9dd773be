//! Hub 에러 타입

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Hub 에러
#[derive(Debug, thiserror::Error)]
pub enum HubError {
    #[error("bad request: {message}")]
    BadRequest { message: String },

    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("forbidden: {message}")]
    Forbidden { message: String },

    #[error("not found: {message}")]
    NotFound { message: String },

    #[error("core error: {0}")]
    Core(#[from] lk_core::Error),
}

/// 에러 응답 JSON
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(rename = "requestId", skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl IntoResponse for HubError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            HubError::BadRequest { message } => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", message.clone())
            }
            HubError::Unauthorized { message } => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message.clone())
            }
            HubError::Forbidden { message } => {
                (StatusCode::FORBIDDEN, "FORBIDDEN", message.clone())
            }
            HubError::NotFound { message } => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", message.clone())
            }
            HubError::Core(e) if e.is_authentication() => (
                StatusCode::UNAUTHORIZED,
                e.code(),
                "authentication failed".to_string(),
            ),
            HubError::Core(e) => {
                let status = StatusCode::from_u16(e.status_code())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                if status.is_server_error() {
                    tracing::error!("Internal error: {:?}", e);
                    (status, e.code(), "internal server error".to_string())
                } else {
                    (status, e.code(), e.to_string())
                }
            }
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
                request_id: crate::middleware::current_request_id(),
            },
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, HubError>;

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_authentication_errors_are_opaque() {
        for err in [
            lk_core::Error::AccountNotFound,
            lk_core::Error::BadPassword,
        ] {
            let response = HubError::from(err).into_response();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

            let body = body_json(response).await;
            assert_eq!(body["error"]["code"], "AUTHENTICATION_FAILED");
            assert_eq!(body["error"]["message"], "authentication failed");
        }
    }

    #[tokio::test]
    async fn test_store_errors_hide_detail() {
        let err = lk_core::Error::StoreUnavailable {
            message: "database is locked".to_string(),
        };
        let response = HubError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "STORE_UNAVAILABLE");
        assert!(!body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("locked"));
    }
}
