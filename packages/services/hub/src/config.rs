//! Hub 설정

use std::env;
use std::path::PathBuf;

use chrono::Duration;
use lk_core::auth::{IssuerPolicy, DEFAULT_ISSUER};
use lk_core::password::HashParams;

/// 크레덴셜 수명 상한 (초, 10년)
const MAX_TTL_SECS: i64 = 10 * 365 * 24 * 60 * 60;

/// Hub 설정
#[derive(Debug, Clone)]
pub struct Config {
    /// 서버 포트
    pub port: u16,

    /// Credential Store DB URL
    pub db_url: String,

    /// 서명용 개인키 PEM 경로 (없으면 임시 키 생성)
    pub signing_key_path: Option<PathBuf>,

    /// 발급자 이름
    pub issuer: String,

    /// Refresh 크레덴셜 수명 (초)
    pub refresh_ttl_secs: i64,

    /// Access 크레덴셜 수명 (초)
    pub access_ttl_secs: i64,

    /// scrypt log2(N)
    pub scrypt_log_n: u8,

    /// 로그인 실패 시 이동할 페이지
    pub signin_page: String,

    /// redirect 미지정 시 이동할 경로
    pub default_redirect: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            db_url: "sqlite://latchkey.db".to_string(),
            signing_key_path: None,
            issuer: DEFAULT_ISSUER.to_string(),
            refresh_ttl_secs: 7 * 24 * 60 * 60,
            access_ttl_secs: 15 * 60,
            scrypt_log_n: HashParams::default().log_n,
            signin_page: "/signin".to_string(),
            default_redirect: "/".to_string(),
        }
    }
}

impl Config {
    /// 환경변수에서 설정 로드
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        let config = Self {
            port: env::var("LK_HUB_PORT")
                .unwrap_or_else(|_| defaults.port.to_string())
                .parse()?,

            db_url: env::var("LK_DB_URL").unwrap_or(defaults.db_url),

            signing_key_path: env::var("LK_SIGNING_KEY")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),

            issuer: env::var("LK_ISSUER").unwrap_or(defaults.issuer),

            refresh_ttl_secs: env::var("LK_REFRESH_TTL_SECS")
                .unwrap_or_else(|_| defaults.refresh_ttl_secs.to_string())
                .parse()?,

            access_ttl_secs: env::var("LK_ACCESS_TTL_SECS")
                .unwrap_or_else(|_| defaults.access_ttl_secs.to_string())
                .parse()?,

            scrypt_log_n: env::var("LK_SCRYPT_LOG_N")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.scrypt_log_n),

            signin_page: env::var("LK_SIGNIN_PAGE").unwrap_or(defaults.signin_page),

            default_redirect: env::var("LK_DEFAULT_REDIRECT").unwrap_or(defaults.default_redirect),
        };

        config.validate()?;
        Ok(config)
    }

    /// 값 범위 검사
    pub fn validate(&self) -> anyhow::Result<()> {
        for (name, secs) in [
            ("LK_REFRESH_TTL_SECS", self.refresh_ttl_secs),
            ("LK_ACCESS_TTL_SECS", self.access_ttl_secs),
        ] {
            if !(1..=MAX_TTL_SECS).contains(&secs) {
                anyhow::bail!(
                    "{} must be between 1 and {} seconds, got {}",
                    name,
                    MAX_TTL_SECS,
                    secs
                );
            }
        }
        Ok(())
    }

    /// 발급 정책
    pub fn issuer_policy(&self) -> IssuerPolicy {
        IssuerPolicy {
            issuer: self.issuer.clone(),
            refresh_ttl: Duration::seconds(self.refresh_ttl_secs),
            access_ttl: Duration::seconds(self.access_ttl_secs),
            default_redirect: self.default_redirect.clone(),
            ..IssuerPolicy::default()
        }
    }

    /// scrypt 파라미터
    pub fn hash_params(&self) -> HashParams {
        HashParams::with_log_n(self.scrypt_log_n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_from_config() {
        let config = Config {
            refresh_ttl_secs: 60,
            access_ttl_secs: 5,
            default_redirect: "/home".to_string(),
            ..Config::default()
        };
        let policy = config.issuer_policy();

        assert_eq!(policy.refresh_ttl, Duration::seconds(60));
        assert_eq!(policy.access_ttl, Duration::seconds(5));
        assert_eq!(policy.default_redirect, "/home");
        assert_eq!(policy.refresh_grant.to_string(), "+:latchkey:token:refresh");
    }

    #[test]
    fn test_validate_rejects_out_of_range_ttl() {
        assert!(Config::default().validate().is_ok());

        for (refresh, access) in [(0, 60), (-5, 60), (60, 0), (60, i64::MAX), (i64::MAX, 60)] {
            let config = Config {
                refresh_ttl_secs: refresh,
                access_ttl_secs: access,
                ..Config::default()
            };
            assert!(config.validate().is_err(), "{} / {}", refresh, access);
        }
    }
}
