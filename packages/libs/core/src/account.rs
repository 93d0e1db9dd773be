//! 계정 타입
//!
//! Credential Store에 저장되는 계정 레코드와 클레임에 들어가는 스냅샷입니다.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::password::PasswordDigest;
use crate::permissions::Permission;

/// 계정 ID
///
/// 생성 시 한 번 할당되며 재사용되지 않는 128비트 식별자입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub Uuid);

impl AccountId {
    /// 새 ID 생성 (UUID v4)
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// 문자열에서 파싱
    pub fn parse(value: &str) -> Option<Self> {
        Uuid::parse_str(value).ok().map(Self)
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 계정
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Account {
    /// 계정 ID
    pub id: AccountId,

    /// 로그인 이름 (전체 계정에서 유일)
    pub username: String,

    /// 비밀번호 다이제스트 (외부로 직렬화하지 않음)
    #[serde(skip)]
    pub password: PasswordDigest,

    /// 권한 grant 목록
    pub permissions: Vec<Permission>,
}

impl Account {
    /// 새 계정 생성
    pub fn new(
        username: impl Into<String>,
        password: PasswordDigest,
        permissions: Vec<Permission>,
    ) -> Self {
        Self {
            id: AccountId::new(),
            username: username.into(),
            password,
            permissions,
        }
    }

    /// 클레임용 스냅샷 (다이제스트 제외)
    pub fn snapshot(&self) -> AccountSnapshot {
        AccountSnapshot {
            id: self.id,
            username: self.username.clone(),
            permissions: self.permissions.clone(),
        }
    }
}

/// 클레임에 포함되는 계정 스냅샷
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    /// 계정 ID
    pub id: AccountId,

    /// 로그인 이름
    pub username: String,

    /// 권한 grant 목록
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

impl AccountSnapshot {
    /// 특정 권한 보유 확인
    pub fn has_permission(&self, required: &Permission) -> bool {
        required.is_granted_by(&self.permissions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::password::{HashParams, SecretHasher};

    #[test]
    fn test_account_json_hides_digest() {
        let hasher = SecretHasher::new(HashParams::with_log_n(4)).unwrap();
        let account = Account::new(
            "hello",
            hasher.hash("world").unwrap(),
            vec![Permission::parse("+:latchkey").unwrap()],
        );

        let json = serde_json::to_value(&account).unwrap();
        assert_eq!(json["username"], "hello");
        assert_eq!(json["permissions"][0], "+:latchkey");
        assert!(json.get("password").is_none());
    }

    #[test]
    fn test_snapshot_permission_check() {
        let snapshot = AccountSnapshot {
            id: AccountId::new(),
            username: "hello".to_string(),
            permissions: vec![Permission::parse("+:latchkey").unwrap()],
        };

        assert!(snapshot.has_permission(&Permission::parse("+:latchkey:user").unwrap()));
        assert!(!snapshot.has_permission(&Permission::parse("+:other").unwrap()));
    }

    #[test]
    fn test_account_id_parse() {
        let id = AccountId::new();
        assert_eq!(AccountId::parse(&id.to_string()), Some(id));
        assert_eq!(AccountId::parse("not-a-uuid"), None);
    }
}
