//! 크레덴셜 검증
//!
//! Claim Codec의 암호학적 검증 위에 시간/구조 검증을 얹습니다.
//! 공개키만 가진 relying party도 같은 2단계 검증을 그대로 수행할 수 있습니다.

use std::fmt;

use chrono::{DateTime, Utc};
use p256::ecdsa::VerifyingKey;

use super::claims::ClaimSet;
use super::codec::{decode_and_verify, public_key_from_pem, public_key_to_pem};
use crate::account::AccountSnapshot;
use crate::error::{Error, Result};
use crate::permissions::Permission;

/// 시간 조건 위반
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemporalViolation {
    /// `now >= exp`
    Expired,

    /// `now < iat`
    IssuedInFuture,

    /// `now < nbf`
    NotYetValid,
}

impl TemporalViolation {
    pub fn code(&self) -> &'static str {
        match self {
            TemporalViolation::Expired => "CREDENTIAL_EXPIRED",
            TemporalViolation::IssuedInFuture => "CREDENTIAL_ISSUED_IN_FUTURE",
            TemporalViolation::NotYetValid => "CREDENTIAL_NOT_YET_VALID",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            TemporalViolation::Expired => "credential is expired",
            TemporalViolation::IssuedInFuture => "credential used before issued",
            TemporalViolation::NotYetValid => "credential is not valid yet",
        }
    }
}

/// 검증 실패 (위반된 조건 전체)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    violations: Vec<TemporalViolation>,
}

impl ValidationFailure {
    /// 위반 목록
    pub fn violations(&self) -> &[TemporalViolation] {
        &self.violations
    }

    /// 특정 위반 포함 여부
    pub fn contains(&self, violation: TemporalViolation) -> bool {
        self.violations.contains(&violation)
    }

    /// 에러 코드 (위반이 여러 개면 복합 코드)
    pub fn code(&self) -> &'static str {
        match self.violations.as_slice() {
            [single] => single.code(),
            _ => "CREDENTIAL_INVALID_CLAIMS",
        }
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.violations.iter().map(|v| v.message()).collect();
        f.write_str(&messages.join("; "))
    }
}

/// 검증 결과
pub type ValidationResult = std::result::Result<(), ValidationFailure>;

/// 시간 조건 검증
///
/// 세 조건을 모두 평가해 실패한 조건을 한 번에 보고합니다. 초 단위 비교이며 허용 오차는 0입니다.
pub fn validate(claims: &ClaimSet, now: DateTime<Utc>) -> ValidationResult {
    let now = now.timestamp();
    let mut violations = Vec::new();

    if now >= claims.exp.timestamp() {
        violations.push(TemporalViolation::Expired);
    }
    if now < claims.iat.timestamp() {
        violations.push(TemporalViolation::IssuedInFuture);
    }
    if now < claims.nbf.timestamp() {
        violations.push(TemporalViolation::NotYetValid);
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationFailure { violations })
    }
}

/// Refresh 스코프 여부
///
/// grant가 정확히 하나이고 sentinel과 완전히 같아야 합니다(포함 관계가 아니라 동등 비교).
/// 이후 sentinel이 그 grant 집합에 의해 실제로 부여되는지도 확인합니다.
pub fn is_refresh_scope(claims: &ClaimSet, refresh_grant: &Permission) -> bool {
    let grants = &claims.usr.permissions;
    if grants.len() != 1 || &grants[0] != refresh_grant {
        return false;
    }

    refresh_grant.is_granted_by(grants)
}

/// 크레덴셜 검증기
///
/// 공개키와 refresh sentinel만으로 구성됩니다.
#[derive(Debug, Clone)]
pub struct Verifier {
    public_key: VerifyingKey,
    refresh_grant: Permission,
}

impl Verifier {
    /// 새 검증기 생성
    pub fn new(public_key: VerifyingKey, refresh_grant: Permission) -> Self {
        Self {
            public_key,
            refresh_grant,
        }
    }

    /// PEM 공개키로 생성
    pub fn from_pem(pem: &str, refresh_grant: Permission) -> Result<Self> {
        Ok(Self::new(public_key_from_pem(pem)?, refresh_grant))
    }

    pub fn public_key(&self) -> &VerifyingKey {
        &self.public_key
    }

    pub fn public_key_pem(&self) -> Result<String> {
        public_key_to_pem(&self.public_key)
    }

    pub fn refresh_grant(&self) -> &Permission {
        &self.refresh_grant
    }

    /// 서명 + 시간 검증
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<ClaimSet> {
        let claims = decode_and_verify(token, &self.public_key)?;
        validate(&claims, now).map_err(Error::InvalidClaims)?;
        Ok(claims)
    }

    /// Refresh 크레덴셜 검증
    pub fn verify_refresh(&self, token: &str, now: DateTime<Utc>) -> Result<ClaimSet> {
        let claims = self.verify(token, now)?;
        if !is_refresh_scope(&claims, &self.refresh_grant) {
            return Err(Error::ScopeMismatch {
                expected: "refresh",
            });
        }
        Ok(claims)
    }

    /// Access 크레덴셜 검증
    ///
    /// Refresh 크레덴셜은 relying party에서 사용할 수 없습니다.
    pub fn verify_access(&self, token: &str, now: DateTime<Utc>) -> Result<AccountSnapshot> {
        let claims = self.verify(token, now)?;
        if is_refresh_scope(&claims, &self.refresh_grant) {
            return Err(Error::ScopeMismatch { expected: "access" });
        }
        Ok(claims.usr)
    }

    /// Access 크레덴셜 검증 + 권한 확인
    pub fn authorize(
        &self,
        token: &str,
        required: &Permission,
        now: DateTime<Utc>,
    ) -> Result<AccountSnapshot> {
        let subject = self.verify_access(token, now)?;
        if !subject.has_permission(required) {
            return Err(Error::PermissionDenied {
                required: required.to_string(),
            });
        }
        Ok(subject)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::account::AccountId;
    use crate::auth::codec::TokenSigner;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    fn sentinel() -> Permission {
        Permission::parse("+:latchkey:token:refresh").unwrap()
    }

    fn claims_with(permissions: &[&str], now: DateTime<Utc>, ttl: i64) -> ClaimSet {
        ClaimSet::mint(
            "latchkey",
            AccountSnapshot {
                id: AccountId::new(),
                username: "hello".to_string(),
                permissions: permissions
                    .iter()
                    .map(|p| Permission::parse(p).unwrap())
                    .collect(),
            },
            now,
            Duration::seconds(ttl),
        )
    }

    #[test]
    fn test_expiry_boundary() {
        let claims = claims_with(&["+:latchkey"], at(1_000), 10);

        assert!(validate(&claims, at(1_000)).is_ok());
        assert!(validate(&claims, at(1_009)).is_ok());

        let failure = validate(&claims, at(1_010)).unwrap_err();
        assert_eq!(failure.violations(), &[TemporalViolation::Expired]);
        assert_eq!(failure.code(), "CREDENTIAL_EXPIRED");
    }

    #[test]
    fn test_future_credential_reports_all_violations() {
        let claims = claims_with(&["+:latchkey"], at(1_000), 10);

        let failure = validate(&claims, at(999)).unwrap_err();
        assert!(failure.contains(TemporalViolation::IssuedInFuture));
        assert!(failure.contains(TemporalViolation::NotYetValid));
        assert!(!failure.contains(TemporalViolation::Expired));
        assert_eq!(failure.code(), "CREDENTIAL_INVALID_CLAIMS");
        assert_eq!(
            failure.to_string(),
            "credential used before issued; credential is not valid yet"
        );
    }

    #[test]
    fn test_zero_lifetime_is_expired_and_current() {
        let claims = claims_with(&["+:latchkey"], at(1_000), 0);
        let failure = validate(&claims, at(1_000)).unwrap_err();
        assert_eq!(failure.violations(), &[TemporalViolation::Expired]);
    }

    #[test]
    fn test_refresh_scope_requires_exact_sentinel() {
        let now = at(1_000);
        let sentinel = sentinel();

        let refresh = claims_with(&["+:latchkey:token:refresh"], now, 10);
        assert!(is_refresh_scope(&refresh, &sentinel));

        for grants in [
            vec![],
            vec!["+:latchkey"],
            vec!["+:latchkey:*"],
            vec!["+:latchkey:token:*"],
            vec!["-:latchkey:token:refresh"],
            vec!["+:latchkey:token:refresh", "+:latchkey"],
            vec!["+:latchkey:token:refresh", "+:latchkey:token:refresh"],
        ] {
            let claims = claims_with(&grants, now, 10);
            assert!(!is_refresh_scope(&claims, &sentinel), "{:?}", grants);
        }
    }

    #[test]
    fn test_verifier_scope_separation() {
        let signer = TokenSigner::generate();
        let verifier = Verifier::new(signer.verifying_key(), sentinel());
        let now = at(1_000);

        let refresh = signer
            .encode_and_sign(&claims_with(&["+:latchkey:token:refresh"], now, 60))
            .unwrap();
        let access = signer
            .encode_and_sign(&claims_with(&["+:latchkey"], now, 60))
            .unwrap();

        assert!(verifier.verify_refresh(&refresh, now).is_ok());
        assert!(matches!(
            verifier.verify_refresh(&access, now),
            Err(Error::ScopeMismatch { expected: "refresh" })
        ));

        assert_eq!(verifier.verify_access(&access, now).unwrap().username, "hello");
        assert!(matches!(
            verifier.verify_access(&refresh, now),
            Err(Error::ScopeMismatch { expected: "access" })
        ));
    }

    #[test]
    fn test_verifier_temporal_failure() {
        let signer = TokenSigner::generate();
        let verifier = Verifier::new(signer.verifying_key(), sentinel());
        let token = signer
            .encode_and_sign(&claims_with(&["+:latchkey"], at(1_000), 60))
            .unwrap();

        match verifier.verify(&token, at(1_060)) {
            Err(Error::InvalidClaims(failure)) => {
                assert!(failure.contains(TemporalViolation::Expired))
            }
            other => panic!("expected expiry, got {:?}", other),
        }
    }

    #[test]
    fn test_authorize() {
        let signer = TokenSigner::generate();
        let verifier = Verifier::from_pem(&signer.public_key_pem().unwrap(), sentinel()).unwrap();
        let now = at(1_000);
        let token = signer
            .encode_and_sign(&claims_with(&["+:latchkey", "-:latchkey:user"], now, 60))
            .unwrap();

        let audit = Permission::parse("+:latchkey:audit").unwrap();
        let user_admin = Permission::parse("+:latchkey:user").unwrap();

        assert!(verifier.authorize(&token, &audit, now).is_ok());
        assert!(matches!(
            verifier.authorize(&token, &user_admin, now),
            Err(Error::PermissionDenied { .. })
        ));
    }
}
