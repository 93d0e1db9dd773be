//! 발급된 크레덴셜 및 HTTP 헤더 추출 유틸리티

use chrono::{DateTime, Utc};

/// Refresh 크레덴셜 쿠키 이름
pub const TOKEN_COOKIE: &str = "token";

/// 크레덴셜 종류
///
/// 와이어 포맷에는 종류 필드가 없으며, grant 집합으로만 구분됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKind {
    /// 장기 refresh 크레덴셜 (refresh sentinel grant만 보유)
    Refresh,

    /// 단기 access 크레덴셜 (계정의 실제 grant 보유)
    Access,
}

impl CredentialKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialKind::Refresh => "refresh",
            CredentialKind::Access => "access",
        }
    }
}

/// 서명된 크레덴셜
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    /// 종류
    pub kind: CredentialKind,

    /// compact JWS 문자열
    pub token: String,

    /// 만료 시각
    pub expires_at: DateTime<Utc>,
}

impl Credential {
    /// 남은 TTL (초)
    pub fn max_age(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at.timestamp() - now.timestamp()).max(0)
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("kind", &self.kind)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

/// `Authorization: Bearer ...` 헤더에서 토큰 추출
pub fn bearer_token(auth_header: Option<&str>) -> Option<&str> {
    auth_header?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// `Cookie` 헤더에서 특정 쿠키 값 추출
pub fn cookie_value<'a>(cookie_header: Option<&'a str>, name: &str) -> Option<&'a str> {
    cookie_header?
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"'))
}
