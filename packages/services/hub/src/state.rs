//! Hub 앱 상태

use std::sync::Arc;

use chrono::{DateTime, Utc};
use lk_core::auth::{SessionIssuer, TokenSigner, Verifier};
use lk_core::clock::{Clock, SystemClock};
use lk_core::manager::AccountManager;
use lk_core::password::SecretHasher;
use lk_core::store::AccountStore;

use crate::config::Config;
use crate::crypto::load_signing_key;
use crate::db::SqliteStore;

/// 앱 상태
///
/// 모든 핸들러에서 공유하는 상태입니다.
pub struct AppState {
    /// 설정
    pub config: Config,

    /// 로그인/refresh 발급기
    pub issuer: SessionIssuer,

    /// 계정 관리
    pub accounts: AccountManager,

    /// 시간 소스
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// 설정으로부터 새 상태 생성 (DB 연결, 서명키 로드)
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let store = SqliteStore::connect(&config.db_url).await?;
        let signer = load_signing_key(config.signing_key_path.as_deref())?;
        Self::from_parts(config, Arc::new(store), signer, Arc::new(SystemClock))
    }

    /// 구성 요소를 직접 주입해 생성
    pub fn from_parts(
        config: &Config,
        store: Arc<dyn AccountStore>,
        signer: TokenSigner,
        clock: Arc<dyn Clock>,
    ) -> anyhow::Result<Self> {
        let hasher = SecretHasher::new(config.hash_params())?;
        let accounts = AccountManager::new(store.clone(), hasher.clone());
        let issuer = SessionIssuer::new(signer, store, hasher, config.issuer_policy());

        Ok(Self {
            config: config.clone(),
            issuer,
            accounts,
            clock,
        })
    }

    pub fn verifier(&self) -> &Verifier {
        self.issuer.verifier()
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}
