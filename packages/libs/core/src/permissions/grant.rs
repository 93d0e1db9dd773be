//! 권한 grant 정의
//!
//! `+:latchkey:token:refresh` 처럼 효과(`+` 허용 / `-` 거부)와 콜론으로 구분된
//! 경로 세그먼트로 이루어진 capability 토큰입니다.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// 와일드카드 세그먼트
pub const WILDCARD: &str = "*";

/// Grant 효과
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Effect {
    /// 허용
    Allow,

    /// 거부
    Deny,
}

impl Effect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Effect::Allow => "+",
            Effect::Deny => "-",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "+" => Some(Effect::Allow),
            "-" => Some(Effect::Deny),
            _ => None,
        }
    }
}

/// 권한 grant
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Permission {
    /// 허용/거부
    pub effect: Effect,

    /// 경로 세그먼트 (최소 1개)
    pub path: Vec<String>,
}

impl Permission {
    /// 새 grant 생성
    pub fn new(effect: Effect, path: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            effect,
            path: path.into_iter().map(Into::into).collect(),
        }
    }

    /// 허용 grant 생성
    pub fn allow(path: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::new(Effect::Allow, path)
    }

    /// 거부 grant 생성
    pub fn deny(path: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::new(Effect::Deny, path)
    }

    /// 문자열에서 파싱
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let mut parts = trimmed.split(':');

        let effect = parts
            .next()
            .and_then(Effect::from_str)
            .ok_or_else(|| Error::PermissionParse {
                message: format!("'{}' must start with '+:' or '-:'", trimmed),
            })?;

        let path: Vec<String> = parts.map(str::to_string).collect();
        if path.is_empty() || path.iter().any(|segment| segment.is_empty()) {
            return Err(Error::PermissionParse {
                message: format!("'{}' has an empty path segment", trimmed),
            });
        }

        Ok(Self { effect, path })
    }

    /// 경로 매칭
    ///
    /// grant 경로는 대상 경로의 prefix여야 하며, `*` 세그먼트는 임의의 한 세그먼트와 일치합니다.
    pub fn matches(&self, target: &[String]) -> bool {
        if self.path.len() > target.len() {
            return false;
        }

        self.path
            .iter()
            .zip(target)
            .all(|(own, other)| own == WILDCARD || own == other)
    }

    /// 다른 grant를 포함하는지 (같은 효과 + 경로 매칭)
    pub fn implies(&self, other: &Permission) -> bool {
        self.effect == other.effect && self.matches(&other.path)
    }

    /// 주어진 grant 집합이 이 권한을 부여하는지 확인
    pub fn is_granted_by(&self, grants: &[Permission]) -> bool {
        super::evaluator::is_granted(self, grants)
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.effect.as_str(), self.path.join(":"))
    }
}

impl FromStr for Permission {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Permission::parse(s)
    }
}

impl Serialize for Permission {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Permission {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Permission::parse(&value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let perm = Permission::parse("+:latchkey:token:refresh").unwrap();
        assert_eq!(perm.effect, Effect::Allow);
        assert_eq!(perm.path, vec!["latchkey", "token", "refresh"]);
        assert_eq!(perm.to_string(), "+:latchkey:token:refresh");

        let deny: Permission = "-:latchkey:user".parse().unwrap();
        assert_eq!(deny.effect, Effect::Deny);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(Permission::parse("latchkey").is_err());
        assert!(Permission::parse("+").is_err());
        assert!(Permission::parse("+:").is_err());
        assert!(Permission::parse("+:a::b").is_err());
        assert!(Permission::parse("*:a").is_err());
    }

    #[test]
    fn test_implies_prefix_and_wildcard() {
        let root = Permission::parse("+:latchkey").unwrap();
        let any_token = Permission::parse("+:latchkey:*:refresh").unwrap();
        let refresh = Permission::parse("+:latchkey:token:refresh").unwrap();

        assert!(root.implies(&refresh));
        assert!(any_token.implies(&refresh));
        assert!(refresh.implies(&refresh));
        assert!(!refresh.implies(&root));

        let denied = Permission::parse("-:latchkey").unwrap();
        assert!(!denied.implies(&refresh));
    }

    #[test]
    fn test_serde_as_string() {
        let perm = Permission::allow(["latchkey", "user"]);
        let json = serde_json::to_string(&perm).unwrap();
        assert_eq!(json, "\"+:latchkey:user\"");

        let back: Permission = serde_json::from_str(&json).unwrap();
        assert_eq!(back, perm);

        assert!(serde_json::from_str::<Permission>("\"nope\"").is_err());
    }
}
