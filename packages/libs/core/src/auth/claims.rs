//! 토큰 Claims
//!
//! Refresh/Access 크레덴셜 공통 페이로드입니다. 두 종류는 별도 필드가 아니라
//! 담고 있는 grant 집합으로만 구분됩니다.

use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::account::AccountSnapshot;

/// 기본 발급자 이름
pub const DEFAULT_ISSUER: &str = "latchkey";

/// Claim Set
///
/// 서명 후에는 변경되지 않습니다. 시각은 Unix 초 단위로 인코딩됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimSet {
    /// 발급자
    pub iss: String,

    /// 발급 시각
    #[serde(with = "chrono::serde::ts_seconds")]
    pub iat: DateTime<Utc>,

    /// 유효 시작 시각
    #[serde(with = "chrono::serde::ts_seconds")]
    pub nbf: DateTime<Utc>,

    /// 만료 시각
    #[serde(with = "chrono::serde::ts_seconds")]
    pub exp: DateTime<Utc>,

    /// 계정 스냅샷 (다이제스트 제외)
    pub usr: AccountSnapshot,
}

impl ClaimSet {
    /// 새 claims 생성
    ///
    /// `iat = nbf = now`, `exp = now + lifetime` (초 단위로 절삭).
    pub fn mint(
        issuer: impl Into<String>,
        subject: AccountSnapshot,
        now: DateTime<Utc>,
        lifetime: Duration,
    ) -> Self {
        let now = now.trunc_subsecs(0);
        let lifetime = lifetime.max(Duration::zero());
        Self {
            iss: issuer.into(),
            iat: now,
            nbf: now,
            exp: now + Duration::seconds(lifetime.num_seconds()),
            usr: subject,
        }
    }

    /// 남은 TTL (초)
    pub fn remaining_ttl(&self, now: DateTime<Utc>) -> i64 {
        (self.exp.timestamp() - now.timestamp()).max(0)
    }
}
