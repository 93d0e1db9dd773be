//! 계정 관리 API
//!
//! 모든 경로는 `require_admin` 미들웨어 뒤에 있습니다.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use lk_core::account::{Account, AccountId};
use lk_core::permissions::Permission;
use serde::Deserialize;

use crate::error::{HubError, Result};
use crate::state::AppState;

/// 계정 생성/변경 요청
#[derive(Debug, Default, Deserialize)]
pub struct AccountRequest {
    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,

    #[serde(default)]
    pub permissions: Vec<Permission>,
}

/// GET /user
pub async fn list(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Account>>> {
    Ok(Json(state.accounts.list().await?))
}

/// POST /user
pub async fn create(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<AccountRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AccountId>)> {
    let req = body(payload)?;
    let account = state
        .accounts
        .create(&req.username, &req.password, req.permissions)
        .await?;
    Ok((StatusCode::CREATED, Json(account.id)))
}

/// GET /user/{id}
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Account>> {
    let account = state.accounts.get(parse_id(&id)?).await.map_err(not_found)?;
    Ok(Json(account))
}

/// DELETE /user/{id}
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state
        .accounts
        .delete(parse_id(&id)?)
        .await
        .map_err(not_found)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /user/{id}/credential
///
/// 빈 필드는 변경하지 않습니다. `permissions`는 무시됩니다.
pub async fn update_credentials(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<AccountRequest>, JsonRejection>,
) -> Result<Json<Account>> {
    let id = parse_id(&id)?;
    let req = body(payload)?;
    let account = state
        .accounts
        .update_credentials(id, Some(&req.username), Some(&req.password))
        .await
        .map_err(not_found)?;
    Ok(Json(account))
}

/// POST /user/{id}/permissions
pub async fn update_permissions(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<Vec<Permission>>, JsonRejection>,
) -> Result<Json<Account>> {
    let id = parse_id(&id)?;
    let permissions = body(payload)?;
    let account = state
        .accounts
        .update_permissions(id, permissions)
        .await
        .map_err(not_found)?;
    Ok(Json(account))
}

fn body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| HubError::BadRequest {
            message: rejection.body_text(),
        })
}

fn parse_id(raw: &str) -> Result<AccountId> {
    AccountId::parse(raw).ok_or_else(|| HubError::BadRequest {
        message: format!("invalid account id '{}'", raw),
    })
}

fn not_found(err: lk_core::Error) -> HubError {
    match err {
        lk_core::Error::AccountNotFound => HubError::NotFound {
            message: "account not found".to_string(),
        },
        other => HubError::Core(other),
    }
}
