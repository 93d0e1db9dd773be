//! Credential Store
//!
//! 계정 ID와 로그인 이름 모두에 유일성을 보장하는 계정 저장소 인터페이스입니다.
//! 저장소 실패는 재시도하지 않고 `Error::StoreUnavailable`로 그대로 전달합니다.

mod memory;

use async_trait::async_trait;

use crate::account::{Account, AccountId};
use crate::error::Result;

pub use memory::MemoryStore;

/// 계정 저장소
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// 저장된 계정 수
    async fn count(&self) -> Result<u64>;

    /// ID/로그인 이름이 모두 비어 있을 때만 삽입
    ///
    /// 삽입되었으면 `true`, 충돌로 건너뛰었으면 `false`.
    async fn insert_if_absent(&self, account: &Account) -> Result<bool>;

    /// 저장소가 비어 있을 때만 삽입 (원자적)
    ///
    /// bootstrap 계정 생성 전용입니다. "비어 있는지 확인 → 삽입"이 하나의 트랜잭션이어야 합니다.
    async fn insert_if_empty(&self, account: &Account) -> Result<bool>;

    /// 계정 갱신
    ///
    /// 없으면 `Error::AccountNotFound`, 로그인 이름 충돌이면 `Error::Conflict`.
    async fn update(&self, account: &Account) -> Result<()>;

    /// 계정 삭제
    async fn delete(&self, id: AccountId) -> Result<()>;

    /// ID로 조회
    async fn get_by_id(&self, id: AccountId) -> Result<Option<Account>>;

    /// 로그인 이름으로 조회
    async fn get_by_username(&self, username: &str) -> Result<Option<Account>>;

    /// 전체 조회
    async fn list(&self) -> Result<Vec<Account>>;
}
