//! 토큰 명령어

use lk_core::auth::TOKEN_COOKIE;
use serde::Deserialize;

use super::http;
use crate::config::CliConfig;

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    token: String,
}

/// Hub에서 refresh 크레덴셜을 access 크레덴셜로 교환
pub async fn refresh(config: &CliConfig, token: &str) -> anyhow::Result<()> {
    let hub = config.hub_url()?;
    let req = http::client()
        .post(format!("{}/token/refresh", hub))
        .header(reqwest::header::COOKIE, format!("{}={}", TOKEN_COOKIE, token.trim()));
    let resp: RefreshResponse = http::send_json(req).await?;

    if config.json_output() {
        println!("{}", serde_json::json!({ "token": resp.token }));
    } else {
        println!("{}", resp.token);
    }
    Ok(())
}
