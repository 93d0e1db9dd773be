//! CLI 명령어 구현

pub mod http;
pub mod keys;
pub mod token;
pub mod verify;
