//! 공통 에러 타입
//!
//! Latchkey 전체에서 사용되는 에러 타입을 정의합니다.

use thiserror::Error;

use crate::auth::ValidationFailure;

pub type Result<T> = std::result::Result<T, Error>;

/// Latchkey 공통 에러
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────────────────────
    // Credential (cryptographic) Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("malformed credential: {reason}")]
    MalformedCredential { reason: String },

    #[error("credential signature does not match")]
    BadSignature,

    #[error("unsupported signing algorithm: {alg}")]
    UnsupportedAlgorithm { alg: String },

    // ─────────────────────────────────────────────────────────────────────────────
    // Temporal / Scope Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("invalid claims: {0}")]
    InvalidClaims(ValidationFailure),

    #[error("scope mismatch: {expected} credential required")]
    ScopeMismatch { expected: &'static str },

    #[error("credential subject {id} no longer exists")]
    UnknownSubject { id: String },

    #[error("permission denied: {required} not granted")]
    PermissionDenied { required: String },

    // ─────────────────────────────────────────────────────────────────────────────
    // Account Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("account not found")]
    AccountNotFound,

    #[error("password does not match")]
    BadPassword,

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("conflict: {message}")]
    Conflict { message: String },

    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("permission parse error: {message}")]
    PermissionParse { message: String },

    // ─────────────────────────────────────────────────────────────────────────────
    // Infrastructure Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("invalid signing key: {message}")]
    InvalidKey { message: String },

    #[error("credential store unavailable: {message}")]
    StoreUnavailable { message: String },

    #[error("password hashing failed: {message}")]
    Hash { message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// HTTP 상태 코드로 변환
    pub fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request
            Error::InvalidRequest { .. } | Error::PermissionParse { .. } | Error::Json(_) => 400,

            // 401 Unauthorized
            Error::AccountNotFound | Error::BadPassword | Error::AuthenticationFailed => 401,

            // 403 Forbidden
            Error::MalformedCredential { .. }
            | Error::BadSignature
            | Error::UnsupportedAlgorithm { .. }
            | Error::InvalidClaims(_)
            | Error::ScopeMismatch { .. }
            | Error::UnknownSubject { .. }
            | Error::PermissionDenied { .. } => 403,

            // 409 Conflict
            Error::Conflict { .. } => 409,

            // 500 Internal Server Error
            Error::InvalidKey { .. } | Error::StoreUnavailable { .. } | Error::Hash { .. } => 500,
        }
    }

    /// 에러 코드 (클라이언트용)
    pub fn code(&self) -> &'static str {
        match self {
            Error::MalformedCredential { .. } => "MALFORMED_CREDENTIAL",
            Error::BadSignature => "BAD_SIGNATURE",
            Error::UnsupportedAlgorithm { .. } => "UNSUPPORTED_ALGORITHM",
            Error::InvalidClaims(failure) => failure.code(),
            Error::ScopeMismatch { .. } => "SCOPE_MISMATCH",
            Error::UnknownSubject { .. } => "UNKNOWN_SUBJECT",
            Error::PermissionDenied { .. } => "PERMISSION_DENIED",
            Error::AccountNotFound | Error::BadPassword | Error::AuthenticationFailed => {
                "AUTHENTICATION_FAILED"
            }
            Error::Conflict { .. } => "CONFLICT",
            Error::InvalidRequest { .. } => "INVALID_REQUEST",
            Error::PermissionParse { .. } => "PERMISSION_PARSE_ERROR",
            Error::InvalidKey { .. } => "INVALID_KEY",
            Error::StoreUnavailable { .. } => "STORE_UNAVAILABLE",
            Error::Hash { .. } => "HASH_ERROR",
            Error::Json(_) => "JSON_ERROR",
        }
    }

    /// 로그인 이름/비밀번호 관련 실패 여부
    ///
    /// 외부에는 어떤 하위 검사가 실패했는지 드러내지 않아야 합니다.
    pub fn is_authentication(&self) -> bool {
        matches!(
            self,
            Error::AccountNotFound | Error::BadPassword | Error::AuthenticationFailed
        )
    }

    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Error::MalformedCredential {
            reason: reason.into(),
        }
    }

    pub(crate) fn store(err: impl std::fmt::Display) -> Self {
        Error::StoreUnavailable {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authentication_errors_share_code() {
        for err in [Error::AccountNotFound, Error::BadPassword, Error::AuthenticationFailed] {
            assert!(err.is_authentication());
            assert_eq!(err.code(), "AUTHENTICATION_FAILED");
            assert_eq!(err.status_code(), 401);
        }
    }

    #[test]
    fn test_credential_rejections_are_forbidden() {
        let errs = [
            Error::malformed("bad"),
            Error::BadSignature,
            Error::UnsupportedAlgorithm {
                alg: "HS256".to_string(),
            },
            Error::ScopeMismatch { expected: "refresh" },
        ];
        for err in errs {
            assert!(!err.is_authentication());
            assert_eq!(err.status_code(), 403);
        }
    }

    #[test]
    fn test_store_error_is_internal() {
        let err = Error::store("disk full");
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.code(), "STORE_UNAVAILABLE");
        assert!(!err.is_authentication());
    }
}
