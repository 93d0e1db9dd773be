//! HTTP 핸들러

pub mod health;
pub mod signin;
pub mod token;
pub mod user;
