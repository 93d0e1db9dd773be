//! 메모리 계정 저장소

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::AccountStore;
use crate::account::{Account, AccountId};
use crate::error::{Error, Result};

/// 프로세스 메모리에 계정을 보관하는 저장소
#[derive(Debug, Default)]
pub struct MemoryStore {
    accounts: RwLock<HashMap<AccountId, Account>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn username_taken(
    accounts: &HashMap<AccountId, Account>,
    username: &str,
    except: Option<AccountId>,
) -> bool {
    accounts
        .values()
        .any(|a| a.username == username && Some(a.id) != except)
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn count(&self) -> Result<u64> {
        Ok(self.accounts.read().await.len() as u64)
    }

    async fn insert_if_absent(&self, account: &Account) -> Result<bool> {
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&account.id)
            || username_taken(&accounts, &account.username, None)
        {
            return Ok(false);
        }
        accounts.insert(account.id, account.clone());
        Ok(true)
    }

    async fn insert_if_empty(&self, account: &Account) -> Result<bool> {
        let mut accounts = self.accounts.write().await;
        if !accounts.is_empty() {
            return Ok(false);
        }
        accounts.insert(account.id, account.clone());
        Ok(true)
    }

    async fn update(&self, account: &Account) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        if !accounts.contains_key(&account.id) {
            return Err(Error::AccountNotFound);
        }
        if username_taken(&accounts, &account.username, Some(account.id)) {
            return Err(Error::Conflict {
                message: format!("username '{}' already exists", account.username),
            });
        }
        accounts.insert(account.id, account.clone());
        Ok(())
    }

    async fn delete(&self, id: AccountId) -> Result<()> {
        match self.accounts.write().await.remove(&id) {
            Some(_) => Ok(()),
            None => Err(Error::AccountNotFound),
        }
    }

    async fn get_by_id(&self, id: AccountId) -> Result<Option<Account>> {
        Ok(self.accounts.read().await.get(&id).cloned())
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<Account>> {
        Ok(self
            .accounts
            .read()
            .await
            .values()
            .find(|a| a.username == username)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<Account>> {
        let mut accounts: Vec<Account> =
            self.accounts.read().await.values().cloned().collect();
        accounts.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(accounts)
    }
}
