//! Refresh 교환 및 공개키 배포

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::response::IntoResponse;
use axum::Json;
use lk_core::auth::{cookie_value, TOKEN_COOKIE};
use serde::Serialize;

use crate::error::{HubError, Result};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub token: String,
}

/// POST /token/refresh
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<RefreshResponse>> {
    let token = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|v| cookie_value(Some(v), TOKEN_COOKIE))
        .ok_or_else(|| HubError::BadRequest {
            message: format!("'{}' cookie required", TOKEN_COOKIE),
        })?;

    let credential = state.issuer.refresh(token, state.now()).await?;
    Ok(Json(RefreshResponse {
        token: credential.token,
    }))
}

/// GET /token/public-key
pub async fn public_key(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse> {
    let pem = state.issuer.public_key_pem()?;
    Ok(([(header::CONTENT_TYPE, "application/x-pem-file")], pem))
}
