//! Hub 미들웨어
//!
//! 요청 ID 부여와 계정 관리 API 인가를 담당합니다.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{header, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use lk_core::auth::bearer_token;
use uuid::Uuid;

use crate::error::HubError;
use crate::state::AppState;

tokio::task_local! {
    static REQUEST_ID: String;
}

pub fn current_request_id() -> Option<String> {
    REQUEST_ID.try_with(|id| id.clone()).ok()
}

pub async fn request_id(req: Request, next: Next) -> Response {
    let id = Uuid::new_v4().to_string();
    let mut resp = REQUEST_ID.scope(id.clone(), async move { next.run(req).await }).await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        resp.headers_mut().insert("x-request-id", value);
    }
    resp
}

/// 계정 관리 API 인가
///
/// `Authorization: Bearer <access 크레덴셜>`이 관리 grant를 가져야 합니다.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    let Some(token) = bearer_token(header) else {
        return HubError::Unauthorized {
            message: "bearer access credential required".to_string(),
        }
        .into_response();
    };

    let subject = match state.verifier().verify_access(token, state.now()) {
        Ok(subject) => subject,
        Err(e) => {
            tracing::warn!(code = e.code(), "Access credential rejected: {}", e);
            return HubError::Unauthorized {
                message: e.to_string(),
            }
            .into_response();
        }
    };

    let required = &state.issuer.policy().admin_grant;
    if !subject.has_permission(required) {
        tracing::warn!(account_id = %subject.id, "Account API denied: {} not granted", required);
        return HubError::Forbidden {
            message: format!("{} not granted", required),
        }
        .into_response();
    }

    next.run(req).await
}
