//! 권한 평가기
//!
//! 요청된 권한이 grant 집합에 의해 부여되는지 평가합니다.

use super::grant::{Effect, Permission};

/// 권한 평가 (Most Specific Grant Wins)
///
/// 대상 경로와 매칭되는 grant 중 경로가 가장 긴 것이 결정하며,
/// 같은 길이에서는 거부가 우선합니다. 매칭되는 grant가 없으면 부여되지 않습니다.
pub fn is_granted(requested: &Permission, grants: &[Permission]) -> bool {
    let mut winner: Option<&Permission> = None;

    for grant in grants.iter().filter(|g| g.matches(&requested.path)) {
        winner = match winner {
            None => Some(grant),
            Some(current) if grant.path.len() > current.path.len() => Some(grant),
            Some(current)
                if grant.path.len() == current.path.len()
                    && grant.effect == Effect::Deny
                    && current.effect == Effect::Allow =>
            {
                Some(grant)
            }
            Some(current) => Some(current),
        };
    }

    match (requested.effect, winner) {
        (Effect::Allow, Some(grant)) => grant.effect == Effect::Allow,
        (Effect::Deny, Some(grant)) => grant.effect == Effect::Deny,
        (_, None) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn perms(values: &[&str]) -> Vec<Permission> {
        values.iter().map(|v| Permission::parse(v).unwrap()).collect()
    }

    #[test]
    fn test_root_grant_covers_children() {
        let grants = perms(&["+:latchkey"]);
        let user_admin = Permission::parse("+:latchkey:user").unwrap();
        assert!(is_granted(&user_admin, &grants));
    }

    #[test]
    fn test_more_specific_deny_wins() {
        let grants = perms(&["+:latchkey", "-:latchkey:user"]);
        let user_admin = Permission::parse("+:latchkey:user").unwrap();
        let refresh = Permission::parse("+:latchkey:token:refresh").unwrap();

        assert!(!is_granted(&user_admin, &grants));
        assert!(is_granted(&refresh, &grants));
    }

    #[test]
    fn test_tie_prefers_deny() {
        let grants = perms(&["+:latchkey:user", "-:latchkey:*"]);
        let user_admin = Permission::parse("+:latchkey:user").unwrap();
        assert!(!is_granted(&user_admin, &grants));
    }

    #[test]
    fn test_no_matching_grant() {
        let grants = perms(&["+:other"]);
        let user_admin = Permission::parse("+:latchkey:user").unwrap();
        assert!(!is_granted(&user_admin, &grants));
        assert!(!is_granted(&user_admin, &[]));
    }

    #[test]
    fn test_sentinel_grants_itself() {
        let sentinel = Permission::parse("+:latchkey:token:refresh").unwrap();
        assert!(sentinel.is_granted_by(std::slice::from_ref(&sentinel)));
    }
}
