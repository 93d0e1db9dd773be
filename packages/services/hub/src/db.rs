//! SQLite Credential Store

use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use lk_core::account::{Account, AccountId};
use lk_core::password::PasswordDigest;
use lk_core::permissions::Permission;
use lk_core::store::AccountStore;
use lk_core::{Error, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};

/// sqlx 기반 계정 저장소
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// DB URL로 연결하고 스키마 생성
    pub async fn connect(db_url: &str) -> anyhow::Result<Self> {
        let options = if db_url == "sqlite::memory:" {
            SqliteConnectOptions::from_str(db_url)?
        } else if let Some(path) = db_url.strip_prefix("sqlite://") {
            if let Some(parent) = Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
        } else {
            SqliteConnectOptions::from_str(db_url)?.create_if_missing(true)
        };

        // 메모리 DB는 연결마다 별도 DB가 되므로 단일 연결을 계속 유지
        let pool = if db_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        }
        .connect_with(options)
        .await?;

        let store = Self { pool };
        store.init().await?;
        Ok(store)
    }

    /// 메모리 DB
    pub async fn in_memory() -> anyhow::Result<Self> {
        Self::connect("sqlite::memory:").await
    }

    async fn init(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS accounts (
                id TEXT PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL,
                permissions TEXT NOT NULL
            );"#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl AccountStore for SqliteStore {
    async fn count(&self) -> Result<u64> {
        let row = sqlx::query(r#"SELECT COUNT(*) AS n FROM accounts"#)
            .fetch_one(&self.pool)
            .await
            .map_err(store_error)?;
        let n: i64 = row.try_get("n").map_err(store_error)?;
        Ok(n as u64)
    }

    async fn insert_if_absent(&self, account: &Account) -> Result<bool> {
        let row = AccountRow::from_account(account)?;
        let result = sqlx::query(
            r#"INSERT INTO accounts (id, username, password, permissions)
               VALUES (?1, ?2, ?3, ?4)
               ON CONFLICT DO NOTHING"#,
        )
        .bind(&row.id)
        .bind(&row.username)
        .bind(&row.password)
        .bind(&row.permissions)
        .execute(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(result.rows_affected() == 1)
    }

    async fn insert_if_empty(&self, account: &Account) -> Result<bool> {
        let row = AccountRow::from_account(account)?;
        // 비어 있는지 확인과 삽입을 하나의 문장으로 처리
        let result = sqlx::query(
            r#"INSERT INTO accounts (id, username, password, permissions)
               SELECT ?1, ?2, ?3, ?4
               WHERE NOT EXISTS (SELECT 1 FROM accounts)"#,
        )
        .bind(&row.id)
        .bind(&row.username)
        .bind(&row.password)
        .bind(&row.permissions)
        .execute(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(result.rows_affected() == 1)
    }

    async fn update(&self, account: &Account) -> Result<()> {
        let row = AccountRow::from_account(account)?;
        let result = sqlx::query(
            r#"UPDATE accounts SET username = ?2, password = ?3, permissions = ?4
               WHERE id = ?1"#,
        )
        .bind(&row.id)
        .bind(&row.username)
        .bind(&row.password)
        .bind(&row.permissions)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                Error::Conflict {
                    message: format!("username '{}' already exists", account.username),
                }
            } else {
                store_error(e)
            }
        })?;

        if result.rows_affected() == 0 {
            return Err(Error::AccountNotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: AccountId) -> Result<()> {
        let result = sqlx::query(r#"DELETE FROM accounts WHERE id = ?1"#)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(store_error)?;

        if result.rows_affected() == 0 {
            return Err(Error::AccountNotFound);
        }
        Ok(())
    }

    async fn get_by_id(&self, id: AccountId) -> Result<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"SELECT id, username, password, permissions FROM accounts WHERE id = ?1"#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        row.map(AccountRow::into_account).transpose()
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"SELECT id, username, password, permissions FROM accounts WHERE username = ?1"#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        row.map(AccountRow::into_account).transpose()
    }

    async fn list(&self) -> Result<Vec<Account>> {
        let rows = sqlx::query_as::<_, AccountRow>(
            r#"SELECT id, username, password, permissions FROM accounts ORDER BY username ASC"#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        rows.into_iter().map(AccountRow::into_account).collect()
    }
}

/// `accounts` 테이블 행
#[derive(Debug, Clone, sqlx::FromRow)]
struct AccountRow {
    id: String,
    username: String,
    password: String,
    permissions: String,
}

impl AccountRow {
    fn from_account(account: &Account) -> Result<Self> {
        Ok(Self {
            id: account.id.to_string(),
            username: account.username.clone(),
            password: account.password.as_str().to_string(),
            permissions: serde_json::to_string(&account.permissions)?,
        })
    }

    fn into_account(self) -> Result<Account> {
        let id = AccountId::parse(&self.id).ok_or_else(|| Error::StoreUnavailable {
            message: format!("corrupt account id '{}'", self.id),
        })?;
        let permissions: Vec<Permission> = serde_json::from_str(&self.permissions)?;

        Ok(Account {
            id,
            username: self.username,
            password: PasswordDigest::parse(&self.password)?,
            permissions,
        })
    }
}

fn store_error(err: sqlx::Error) -> Error {
    tracing::error!("Credential store error: {:?}", err);
    Error::StoreUnavailable {
        message: err.to_string(),
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.is_unique_violation(),
        _ => false,
    }
}
