//! lk-core: Latchkey 공통 핵심 라이브러리
//!
//! 이 크레이트는 Hub와 CLI가 공유하는 크레덴셜 수명주기 로직을 제공합니다.
//!
//! # 모듈 구조
//!
//! - `auth`: 크레덴셜 인코딩/서명, 검증, 발급
//! - `permissions`: grant 구조 및 평가
//! - `account`: 계정 및 클레임 스냅샷
//! - `manager`: 계정 관리 (CRUD)
//! - `password`: scrypt 비밀번호 해싱
//! - `store`: Credential Store 인터페이스 및 메모리 구현
//! - `clock`: 시간 소스
//! - `error`: 공통 에러 타입

pub mod account;
pub mod auth;
pub mod clock;
pub mod error;
pub mod manager;
pub mod password;
pub mod permissions;
pub mod store;

pub use error::{Error, Result};
