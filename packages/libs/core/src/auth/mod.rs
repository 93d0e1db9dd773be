//! 인증 관련 타입 및 로직
//!
//! # 개요
//!
//! Latchkey는 두 종류의 서명된 크레덴셜을 발급합니다:
//!
//! - **Refresh 크레덴셜**: 로그인 성공 시 발급되는 장기 토큰. grant는 refresh sentinel 하나뿐입니다.
//! - **Access 크레덴셜**: Refresh 크레덴셜과 교환하는 단기 토큰. 계정의 실제 grant를 담습니다.
//!
//! 두 종류는 같은 [`ClaimSet`] 구조를 쓰며, grant 집합으로만 구분됩니다.
//!
//! # 구성
//!
//! - `codec`: compact JWS(ES256) 인코딩/서명/검증
//! - `verifier`: 시간/스코프 검증. 공개키만 있으면 relying party도 그대로 사용 가능
//! - `issuer`: 로그인과 refresh 교환 (개인키 보유)

mod claims;
mod codec;
mod issuer;
mod token;
mod verifier;

pub use claims::{ClaimSet, DEFAULT_ISSUER};
pub use codec::{decode_and_verify, public_key_from_pem, public_key_to_pem, TokenSigner, ALGORITHM};
pub use issuer::{IssuerPolicy, SessionIssuer, SignInOutcome};
pub use token::{bearer_token, cookie_value, Credential, CredentialKind, TOKEN_COOKIE};
pub use verifier::{
    is_refresh_scope, validate, TemporalViolation, ValidationFailure, ValidationResult, Verifier,
};
