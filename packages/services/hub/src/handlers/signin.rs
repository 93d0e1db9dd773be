//! 로그인
//!
//! Refresh 크레덴셜을 발급하는 유일한 경로입니다. 응답은 항상 redirect이며,
//! 성공 시에만 HttpOnly 쿠키로 refresh 크레덴셜을 심습니다.
//!
//! 폼은 `application/x-www-form-urlencoded`와 `multipart/form-data` 모두 받습니다.

use std::sync::Arc;

use axum::extract::{Form, FromRequest, Multipart, Request, State};
use axum::http::header;
use axum::response::{AppendHeaders, IntoResponse, Redirect, Response};
use lk_core::auth::TOKEN_COOKIE;
use serde::Deserialize;

use crate::state::AppState;

/// 로그인 폼
#[derive(Debug, Default, Deserialize)]
pub struct SignInForm {
    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,

    #[serde(default)]
    pub redirect: Option<String>,
}

/// POST /signin
pub async fn sign_in(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Response {
    let failure = || Redirect::temporary(&state.config.signin_page).into_response();

    let Some(form) = read_form(request, &state).await else {
        return failure();
    };

    let now = state.now();
    match state
        .issuer
        .sign_in(&form.username, &form.password, form.redirect.as_deref(), now)
        .await
    {
        Ok(outcome) => {
            let cookie = session_cookie(&outcome.credential.token, outcome.credential.max_age(now));
            (
                AppendHeaders([(header::SET_COOKIE, cookie)]),
                Redirect::temporary(&outcome.redirect),
            )
                .into_response()
        }
        Err(e) => {
            if !e.is_authentication() {
                tracing::error!(code = e.code(), "Sign-in failed: {}", e);
            }
            failure()
        }
    }
}

async fn read_form(request: Request, state: &Arc<AppState>) -> Option<SignInForm> {
    let is_multipart = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"));

    if !is_multipart {
        let Form(form) = Form::<SignInForm>::from_request(request, state).await.ok()?;
        return Some(form);
    }

    let mut multipart = Multipart::from_request(request, state).await.ok()?;
    let mut form = SignInForm::default();
    while let Some(field) = multipart.next_field().await.ok()? {
        let name = field.name().unwrap_or_default().to_string();
        let value = field.text().await.ok()?;
        match name.as_str() {
            "username" => form.username = value,
            "password" => form.password = value,
            "redirect" => form.redirect = Some(value),
            _ => {}
        }
    }
    Some(form)
}

fn session_cookie(token: &str, max_age: i64) -> String {
    format!(
        "{}={}; Path=/; Max-Age={}; HttpOnly; Secure",
        TOKEN_COOKIE, token, max_age
    )
}
