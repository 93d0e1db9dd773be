//! 계정 관리
//!
//! 관리자 API가 사용하는 계정 CRUD입니다. 모든 저장은 Credential Store에 위임하고,
//! 비밀번호는 항상 Secret Hasher를 거쳐 저장됩니다.

use std::sync::Arc;

use tracing::info;

use crate::account::{Account, AccountId};
use crate::error::{Error, Result};
use crate::password::{PasswordDigest, SecretHasher};
use crate::permissions::Permission;
use crate::store::AccountStore;

/// 계정 관리자
#[derive(Clone)]
pub struct AccountManager {
    store: Arc<dyn AccountStore>,
    hasher: SecretHasher,
}

impl AccountManager {
    pub fn new(store: Arc<dyn AccountStore>, hasher: SecretHasher) -> Self {
        Self { store, hasher }
    }

    /// 계정 생성
    pub async fn create(
        &self,
        username: &str,
        password: &str,
        permissions: Vec<Permission>,
    ) -> Result<Account> {
        if username.is_empty() {
            return Err(invalid("username must not be empty"));
        }
        if password.is_empty() {
            return Err(invalid("password must not be empty"));
        }

        let account = Account::new(username, self.hash(password).await?, permissions);
        if !self.store.insert_if_absent(&account).await? {
            return Err(Error::Conflict {
                message: format!("username '{}' already exists", username),
            });
        }

        info!(account_id = %account.id, username = %username, "Account created");
        Ok(account)
    }

    /// 계정 조회
    pub async fn get(&self, id: AccountId) -> Result<Account> {
        self.store
            .get_by_id(id)
            .await?
            .ok_or(Error::AccountNotFound)
    }

    /// 전체 계정 조회
    pub async fn list(&self) -> Result<Vec<Account>> {
        self.store.list().await
    }

    /// 계정 삭제
    ///
    /// 이미 발급된 크레덴셜은 만료될 때까지 유효하지만, 이후 refresh는 실패합니다.
    pub async fn delete(&self, id: AccountId) -> Result<()> {
        self.store.delete(id).await?;
        info!(account_id = %id, "Account deleted");
        Ok(())
    }

    /// 로그인 이름/비밀번호 변경
    ///
    /// 빈 문자열은 "변경 없음"으로 취급합니다.
    pub async fn update_credentials(
        &self,
        id: AccountId,
        username: Option<&str>,
        password: Option<&str>,
    ) -> Result<Account> {
        let mut account = self.get(id).await?;

        if let Some(username) = username.filter(|u| !u.is_empty()) {
            account.username = username.to_string();
        }
        if let Some(password) = password.filter(|p| !p.is_empty()) {
            account.password = self.hash(password).await?;
        }

        self.store.update(&account).await?;
        info!(account_id = %id, "Account credentials updated");
        Ok(account)
    }

    /// 권한 교체
    pub async fn update_permissions(
        &self,
        id: AccountId,
        permissions: Vec<Permission>,
    ) -> Result<Account> {
        let mut account = self.get(id).await?;
        account.permissions = permissions;

        self.store.update(&account).await?;
        info!(account_id = %id, grants = account.permissions.len(), "Account permissions updated");
        Ok(account)
    }

    async fn hash(&self, password: &str) -> Result<PasswordDigest> {
        let hasher = self.hasher.clone();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| Error::Hash {
                message: e.to_string(),
            })?
    }
}

impl std::fmt::Debug for AccountManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountManager").finish_non_exhaustive()
    }
}

fn invalid(message: &str) -> Error {
    Error::InvalidRequest {
        message: message.to_string(),
    }
}
