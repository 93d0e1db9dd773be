//! Relying party 검증
//!
//! Hub와 같은 2단계 검증(서명 → 시간/스코프)을 공개키만으로 수행합니다.

use std::path::Path;

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use lk_core::auth::{is_refresh_scope, ClaimSet, CredentialKind, IssuerPolicy, Verifier};
use lk_core::clock::{Clock, SystemClock};
use lk_core::permissions::Permission;
use serde::Serialize;

use super::http;
use crate::config::CliConfig;

/// 검증 결과 출력
#[derive(Debug, Serialize)]
struct Report {
    kind: &'static str,
    issuer: String,
    #[serde(rename = "expiresAt")]
    expires_at: DateTime<Utc>,
    #[serde(rename = "remainingSecs")]
    remaining_secs: i64,
    subject: lk_core::account::AccountSnapshot,
}

pub async fn verify(
    config: &CliConfig,
    token: &str,
    public_key: Option<&Path>,
    require: Option<&str>,
) -> anyhow::Result<()> {
    let pem = match public_key {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let hub = config.hub_url()?;
            http::send_text(http::client().get(format!("{}/token/public-key", hub))).await?
        }
    };

    let verifier = Verifier::from_pem(&pem, IssuerPolicy::default().refresh_grant)?;
    let required = require.map(Permission::parse).transpose()?;
    let now = SystemClock.now();
    let claims = check(&verifier, token, required.as_ref(), now)?;

    let kind = if is_refresh_scope(&claims, verifier.refresh_grant()) {
        CredentialKind::Refresh
    } else {
        CredentialKind::Access
    };
    let report = Report {
        kind: kind.as_str(),
        issuer: claims.iss.clone(),
        expires_at: claims.exp,
        remaining_secs: claims.remaining_ttl(now),
        subject: claims.usr,
    };

    if config.json_output() {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Valid {} credential", report.kind);
        println!("  Issuer:      {}", report.issuer);
        println!("  Subject:     {} ({})", report.subject.username, report.subject.id);
        println!("  Expires at:  {} ({}s left)", report.expires_at, report.remaining_secs);
        let grants: Vec<String> = report
            .subject
            .permissions
            .iter()
            .map(ToString::to_string)
            .collect();
        println!("  Permissions: {}", grants.join(", "));
    }
    Ok(())
}

/// 검증 (권한 요구 시 access 크레덴셜만 허용)
fn check(
    verifier: &Verifier,
    token: &str,
    required: Option<&Permission>,
    now: DateTime<Utc>,
) -> lk_core::Result<ClaimSet> {
    let claims = verifier.verify(token, now)?;
    if let Some(required) = required {
        verifier.authorize(token, required, now)?;
    }
    Ok(claims)
}
