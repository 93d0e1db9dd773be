//! 권한 grant 및 평가
//!
//! # 개요
//!
//! 계정에는 `{허용/거부, 경로 세그먼트}` 형태의 grant 집합이 붙습니다.
//! grant는 prefix/와일드카드 매칭으로 다른 grant를 포함(`implies`)할 수 있습니다.
//!
//! # 모듈 구조
//!
//! - `grant`: grant 파싱/직렬화 및 포함 관계
//! - `evaluator`: grant 집합에 대한 권한 평가

mod evaluator;
mod grant;

pub use evaluator::is_granted;
pub use grant::{Effect, Permission, WILDCARD};
