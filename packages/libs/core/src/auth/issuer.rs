//! Session Issuer
//!
//! 개인 서명키를 보유하는 유일한 컴포넌트입니다.
//! 로그인 → Refresh 크레덴셜, Refresh 크레덴셜 → Access 크레덴셜 교환을 담당합니다.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use super::claims::{ClaimSet, DEFAULT_ISSUER};
use super::codec::TokenSigner;
use super::token::{Credential, CredentialKind};
use super::verifier::Verifier;
use crate::account::{Account, AccountId, AccountSnapshot};
use crate::error::{Error, Result};
use crate::password::{PasswordDigest, SecretHasher};
use crate::permissions::Permission;
use crate::store::AccountStore;

/// 발급 정책
///
/// 전역 상수 대신 생성 시점에 명시적으로 주입합니다.
#[derive(Debug, Clone)]
pub struct IssuerPolicy {
    /// 발급자 이름 (`iss`)
    pub issuer: String,

    /// Refresh 크레덴셜 수명
    pub refresh_ttl: Duration,

    /// Access 크레덴셜 수명
    pub access_ttl: Duration,

    /// Refresh sentinel grant
    pub refresh_grant: Permission,

    /// 빈 저장소에서 최초 로그인한 계정에 부여되는 grant
    pub bootstrap_grants: Vec<Permission>,

    /// 계정 관리 API에 필요한 grant
    pub admin_grant: Permission,

    /// redirect 미지정 시 이동할 경로
    pub default_redirect: String,
}

impl Default for IssuerPolicy {
    fn default() -> Self {
        Self {
            issuer: DEFAULT_ISSUER.to_string(),
            refresh_ttl: Duration::days(7),
            access_ttl: Duration::minutes(15),
            // +:latchkey:token:refresh
            refresh_grant: Permission::allow([DEFAULT_ISSUER, "token", "refresh"]),
            // +:latchkey
            bootstrap_grants: vec![Permission::allow([DEFAULT_ISSUER])],
            // +:latchkey:user
            admin_grant: Permission::allow([DEFAULT_ISSUER, "user"]),
            default_redirect: "/".to_string(),
        }
    }
}

/// 로그인 결과
#[derive(Debug, Clone)]
pub struct SignInOutcome {
    /// Refresh 크레덴셜
    pub credential: Credential,

    /// 이동할 경로
    pub redirect: String,
}

/// Session Issuer
pub struct SessionIssuer {
    signer: TokenSigner,
    verifier: Verifier,
    store: Arc<dyn AccountStore>,
    hasher: SecretHasher,
    policy: IssuerPolicy,
}

impl SessionIssuer {
    /// 새 발급기 생성
    pub fn new(
        signer: TokenSigner,
        store: Arc<dyn AccountStore>,
        hasher: SecretHasher,
        policy: IssuerPolicy,
    ) -> Self {
        let verifier = Verifier::new(signer.verifying_key(), policy.refresh_grant.clone());
        Self {
            signer,
            verifier,
            store,
            hasher,
            policy,
        }
    }

    /// 같은 공개키를 쓰는 검증기
    pub fn verifier(&self) -> &Verifier {
        &self.verifier
    }

    pub fn policy(&self) -> &IssuerPolicy {
        &self.policy
    }

    pub fn public_key_pem(&self) -> Result<String> {
        self.verifier.public_key_pem()
    }

    /// 로그인
    ///
    /// 저장소가 비어 있으면 주어진 로그인 정보로 bootstrap 계정을 원자적으로 생성합니다.
    /// 알 수 없는 로그인 이름과 틀린 비밀번호는 서로 다른 에러로 반환되지만
    /// 둘 다 `Error::is_authentication()`에 해당하며, 외부에는 구분되지 않아야 합니다.
    pub async fn sign_in(
        &self,
        username: &str,
        password: &str,
        redirect: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<SignInOutcome> {
        if username.is_empty() || password.is_empty() {
            return Err(Error::AuthenticationFailed);
        }

        if self.store.count().await? == 0 {
            self.bootstrap(username, password).await?;
        }

        let Some(account) = self.store.get_by_username(username).await? else {
            if let Err(e) = self.verify_blocking(password, None).await {
                warn!("Dummy password verification failed: {}", e);
            }
            warn!(username = %username, "Sign-in rejected: unknown login");
            return Err(Error::AccountNotFound);
        };

        if !self
            .verify_blocking(password, Some(account.password.clone()))
            .await?
        {
            warn!(account_id = %account.id, "Sign-in rejected: wrong password");
            return Err(Error::BadPassword);
        }

        let subject = AccountSnapshot {
            id: account.id,
            username: account.username.clone(),
            permissions: vec![self.policy.refresh_grant.clone()],
        };
        let credential = self.mint(CredentialKind::Refresh, subject, now)?;
        let redirect = match redirect.filter(|r| !r.is_empty()) {
            Some(target) if is_redirect_target(target) => target.to_string(),
            Some(_) => {
                warn!(account_id = %account.id, "Ignoring invalid redirect target");
                self.policy.default_redirect.clone()
            }
            None => self.policy.default_redirect.clone(),
        };

        debug!(account_id = %account.id, "Refresh credential issued");
        Ok(SignInOutcome {
            credential,
            redirect,
        })
    }

    /// Refresh 크레덴셜 → Access 크레덴셜
    ///
    /// 계정을 다시 조회하므로 발급 이후의 권한 변경이 반영됩니다.
    pub async fn refresh(&self, token: &str, now: DateTime<Utc>) -> Result<Credential> {
        let claims = self.verifier.verify_refresh(token, now).map_err(|e| {
            warn!(code = e.code(), "Refresh credential rejected: {}", e);
            e
        })?;

        let id = claims.usr.id;
        let Some(account) = self.store.get_by_id(id).await? else {
            warn!(account_id = %id, "Refresh rejected: subject no longer exists");
            return Err(Error::UnknownSubject { id: id.to_string() });
        };

        // 실제 grant가 sentinel 하나뿐이면 access 크레덴셜이 refresh로 오인됨
        if account.permissions.len() == 1 && account.permissions[0] == self.policy.refresh_grant {
            warn!(account_id = %id, "Refresh rejected: account grants equal refresh sentinel");
            return Err(Error::ScopeMismatch { expected: "access" });
        }

        let credential = self.mint(CredentialKind::Access, account.snapshot(), now)?;
        debug!(account_id = %id, "Access credential issued");
        Ok(credential)
    }

    fn mint(
        &self,
        kind: CredentialKind,
        subject: AccountSnapshot,
        now: DateTime<Utc>,
    ) -> Result<Credential> {
        let lifetime = match kind {
            CredentialKind::Refresh => self.policy.refresh_ttl,
            CredentialKind::Access => self.policy.access_ttl,
        };
        let claims = ClaimSet::mint(self.policy.issuer.clone(), subject, now, lifetime);
        let token = self.signer.encode_and_sign(&claims)?;
        Ok(Credential {
            kind,
            token,
            expires_at: claims.exp,
        })
    }

    async fn bootstrap(&self, username: &str, password: &str) -> Result<Option<AccountId>> {
        let digest = self.hash_blocking(password).await?;
        let account = Account::new(username, digest, self.policy.bootstrap_grants.clone());

        if self.store.insert_if_empty(&account).await? {
            info!(account_id = %account.id, username = %username, "Bootstrap account created");
            Ok(Some(account.id))
        } else {
            debug!("Bootstrap skipped: store already populated");
            Ok(None)
        }
    }

    async fn hash_blocking(&self, password: &str) -> Result<PasswordDigest> {
        let hasher = self.hasher.clone();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| Error::Hash {
                message: e.to_string(),
            })?
    }

    /// `digest`가 없으면 더미 다이제스트로 같은 비용의 검증을 수행
    async fn verify_blocking(
        &self,
        password: &str,
        digest: Option<PasswordDigest>,
    ) -> Result<bool> {
        let hasher = self.hasher.clone();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || match digest {
            Some(digest) => hasher.verify(&password, &digest),
            None => {
                hasher.verify_dummy(&password);
                false
            }
        })
        .await
        .map_err(|e| Error::Hash {
            message: e.to_string(),
        })
    }
}

/// `Location` 헤더에 그대로 실을 수 있는 값인지 (제어 문자 불가)
fn is_redirect_target(target: &str) -> bool {
    !target.chars().any(char::is_control)
}

impl std::fmt::Debug for SessionIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionIssuer")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TemporalViolation;
    use crate::password::HashParams;
    use crate::store::MemoryStore;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    fn issuer_with(store: Arc<MemoryStore>) -> SessionIssuer {
        SessionIssuer::new(
            TokenSigner::generate(),
            store,
            SecretHasher::new(HashParams::with_log_n(4)).unwrap(),
            IssuerPolicy {
                refresh_ttl: Duration::seconds(100),
                access_ttl: Duration::seconds(10),
                ..IssuerPolicy::default()
            },
        )
    }

    fn issuer() -> (SessionIssuer, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (issuer_with(store.clone()), store)
    }

    #[tokio::test]
    async fn test_bootstrap_and_refresh_scenario() {
        let (issuer, store) = issuer();
        let now = at(1_000);

        let outcome = issuer.sign_in("hello", "world", None, now).await.unwrap();
        assert_eq!(outcome.redirect, "/");
        assert_eq!(outcome.credential.kind, CredentialKind::Refresh);
        assert_eq!(outcome.credential.expires_at, at(1_100));
        assert_eq!(store.count().await.unwrap(), 1);

        let refresh = outcome.credential.token;
        let access = issuer.refresh(&refresh, now).await.unwrap();
        let subject = issuer.verifier().verify_access(&access.token, now).unwrap();
        assert_eq!(subject.username, "hello");
        assert_eq!(subject.permissions, vec![Permission::parse("+:latchkey").unwrap()]);
        assert_eq!(access.expires_at, at(1_010));

        // access 크레덴셜은 refresh로 사용할 수 없음
        assert!(matches!(
            issuer.refresh(&access.token, now).await,
            Err(Error::ScopeMismatch { expected: "refresh" })
        ));

        assert!(matches!(
            issuer.refresh(&format!("{}1", refresh), now).await,
            Err(Error::BadSignature)
        ));

        match issuer.refresh(&refresh, at(1_100)).await {
            Err(Error::InvalidClaims(failure)) => {
                assert!(failure.contains(TemporalViolation::Expired))
            }
            other => panic!("expected expiry, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_sign_in_failures_are_authentication_errors() {
        let (issuer, _) = issuer();
        let now = at(1_000);
        issuer.sign_in("hello", "world", None, now).await.unwrap();

        let unknown = issuer.sign_in("nobody", "world", None, now).await.unwrap_err();
        assert!(matches!(unknown, Error::AccountNotFound));
        let wrong = issuer.sign_in("hello", "wrong", None, now).await.unwrap_err();
        assert!(matches!(wrong, Error::BadPassword));
        let empty = issuer.sign_in("", "", None, now).await.unwrap_err();

        for err in [unknown, wrong, empty] {
            assert!(err.is_authentication());
            assert_eq!(err.code(), "AUTHENTICATION_FAILED");
        }
    }

    #[tokio::test]
    async fn test_sign_in_redirect() {
        let (issuer, _) = issuer();
        let outcome = issuer
            .sign_in("hello", "world", Some("/dashboard"), at(1_000))
            .await
            .unwrap();
        assert_eq!(outcome.redirect, "/dashboard");

        for target in ["/ok\r\nX-Evil: 1", "/tab\there", "/nul\0"] {
            let outcome = issuer
                .sign_in("hello", "world", Some(target), at(1_000))
                .await
                .unwrap();
            assert_eq!(outcome.redirect, "/", "{:?}", target);
        }
    }

    #[tokio::test]
    async fn test_wildcard_refresh_grant_is_not_refresh_scope() {
        let (issuer, _) = issuer();
        let now = at(1_000);
        let outcome = issuer.sign_in("hello", "world", None, now).await.unwrap();
        let claims = issuer
            .verifier()
            .verify(&outcome.credential.token, now)
            .unwrap();

        // 같은 키로 서명되었지만 sentinel 대신 와일드카드 grant를 가진 크레덴셜
        let mut forged = claims.usr.clone();
        forged.permissions = vec![Permission::parse("+:latchkey:token:*").unwrap()];
        let forged = issuer.mint(CredentialKind::Refresh, forged, now).unwrap();

        assert!(matches!(
            issuer.refresh(&forged.token, now).await,
            Err(Error::ScopeMismatch { expected: "refresh" })
        ));
    }

    #[tokio::test]
    async fn test_refresh_honors_permission_changes() {
        let (issuer, store) = issuer();
        let now = at(1_000);
        let refresh = issuer
            .sign_in("hello", "world", None, now)
            .await
            .unwrap()
            .credential
            .token;

        let mut account = store.get_by_username("hello").await.unwrap().unwrap();
        account.permissions = vec![Permission::parse("+:app:read").unwrap()];
        store.update(&account).await.unwrap();

        let access = issuer.refresh(&refresh, now).await.unwrap();
        let subject = issuer.verifier().verify_access(&access.token, now).unwrap();
        assert_eq!(subject.permissions, account.permissions);
    }

    #[tokio::test]
    async fn test_refresh_for_deleted_account() {
        let (issuer, store) = issuer();
        let now = at(1_000);
        let refresh = issuer
            .sign_in("hello", "world", None, now)
            .await
            .unwrap()
            .credential
            .token;

        let account = store.get_by_username("hello").await.unwrap().unwrap();
        store.delete(account.id).await.unwrap();

        assert!(matches!(
            issuer.refresh(&refresh, now).await,
            Err(Error::UnknownSubject { .. })
        ));
    }

    #[tokio::test]
    async fn test_account_holding_only_sentinel_gets_no_access() {
        let (issuer, store) = issuer();
        let now = at(1_000);
        let refresh = issuer
            .sign_in("hello", "world", None, now)
            .await
            .unwrap()
            .credential
            .token;

        let mut account = store.get_by_username("hello").await.unwrap().unwrap();
        account.permissions = vec![issuer.policy().refresh_grant.clone()];
        store.update(&account).await.unwrap();

        assert!(matches!(
            issuer.refresh(&refresh, now).await,
            Err(Error::ScopeMismatch { expected: "access" })
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_bootstrap_creates_one_account() {
        let store = Arc::new(MemoryStore::new());
        let issuer = Arc::new(issuer_with(store.clone()));
        let now = at(1_000);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let issuer = issuer.clone();
                tokio::spawn(async move { issuer.sign_in("hello", "world", None, now).await })
            })
            .collect();

        let mut subjects = Vec::new();
        for handle in handles {
            let outcome = handle.await.unwrap().unwrap();
            let claims = issuer
                .verifier()
                .verify_refresh(&outcome.credential.token, now)
                .unwrap();
            subjects.push(claims.usr.id);
        }

        assert_eq!(store.count().await.unwrap(), 1);
        subjects.dedup();
        assert_eq!(subjects.len(), 1);
    }
}
