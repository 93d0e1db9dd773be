//! Claim Codec
//!
//! Claim Set을 compact JWS(`header.payload.signature`, base64url)로 인코딩하고
//! ES256(ECDSA P-256 + SHA-256)으로 서명/검증합니다. JWS 처리는 `jsonwebtoken`에
//! 맡기고, `p256`은 키 생성과 PEM 입출력에만 사용합니다.
//!
//! 헤더가 ES256 이외의 알고리즘을 선언하면 협상하지 않고 거부합니다.
//! 시간 검증은 여기서 하지 않습니다 (`verifier::validate` 담당).

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use p256::ecdsa::{SigningKey, VerifyingKey};
use p256::pkcs8::{
    DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding,
};
use p256::SecretKey;

use super::claims::ClaimSet;
use crate::error::{Error, Result};

/// 유일하게 허용되는 서명 알고리즘
pub const ALGORITHM: Algorithm = Algorithm::ES256;

/// 서명기
///
/// 개인키를 보유하는 유일한 타입입니다.
pub struct TokenSigner {
    key: SigningKey,
}

impl TokenSigner {
    /// 개인키로 생성
    pub fn new(key: SigningKey) -> Self {
        Self { key }
    }

    /// 새 P-256 키 생성
    pub fn generate() -> Self {
        Self::new(SigningKey::random(&mut rand::rngs::OsRng))
    }

    /// PEM 개인키에서 로드 (PKCS#8 `PRIVATE KEY` 또는 SEC1 `EC PRIVATE KEY`)
    pub fn from_pem(pem: &str) -> Result<Self> {
        let secret = if pem.contains("BEGIN EC PRIVATE KEY") {
            SecretKey::from_sec1_pem(pem).map_err(|e| Error::InvalidKey {
                message: e.to_string(),
            })?
        } else {
            SecretKey::from_pkcs8_pem(pem).map_err(|e| Error::InvalidKey {
                message: e.to_string(),
            })?
        };
        Ok(Self::new(SigningKey::from(secret)))
    }

    /// PKCS#8 PEM으로 내보내기
    pub fn to_pkcs8_pem(&self) -> Result<String> {
        let secret = SecretKey::from_bytes(&self.key.to_bytes()).map_err(|e| Error::InvalidKey {
            message: e.to_string(),
        })?;
        let pem = secret
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| Error::InvalidKey {
                message: e.to_string(),
            })?;
        Ok(pem.to_string())
    }

    /// 대응하는 공개키
    pub fn verifying_key(&self) -> VerifyingKey {
        self.key.verifying_key().clone()
    }

    /// 공개키 PEM (SubjectPublicKeyInfo)
    pub fn public_key_pem(&self) -> Result<String> {
        public_key_to_pem(&self.verifying_key())
    }

    /// Claim Set 인코딩 및 서명
    pub fn encode_and_sign(&self, claims: &ClaimSet) -> Result<String> {
        let pem = self.to_pkcs8_pem()?;
        let key = EncodingKey::from_ec_pem(pem.as_bytes()).map_err(|e| Error::InvalidKey {
            message: e.to_string(),
        })?;

        jsonwebtoken::encode(&Header::new(ALGORITHM), claims, &key).map_err(|e| {
            Error::InvalidKey {
                message: format!("failed to sign credential: {}", e),
            }
        })
    }
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner").finish_non_exhaustive()
    }
}

/// 크레덴셜 디코딩 및 서명 검증
///
/// # 실패
/// - 헤더/구조/인코딩 오류 → `MalformedCredential`
/// - ES256 이외의 알고리즘 → `UnsupportedAlgorithm`
/// - 서명 불일치 또는 서명 세그먼트 손상 → `BadSignature`
///
/// 서명은 페이로드를 해석하기 전에 검증합니다.
pub fn decode_and_verify(token: &str, key: &VerifyingKey) -> Result<ClaimSet> {
    let token = token.trim();

    // 헤더 단계의 실패와 서명 단계의 실패를 구분하기 위해 먼저 헤더만 해석
    let header = jsonwebtoken::decode_header(token)
        .map_err(|e| Error::malformed(format!("header: {}", e)))?;

    // SEC1 비압축 점
    let decoding_key = DecodingKey::from_ec_der(key.to_encoded_point(false).as_bytes());

    let mut validation = Validation::new(ALGORITHM);
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.leeway = 0;
    validation.required_spec_claims.clear();

    jsonwebtoken::decode::<ClaimSet>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::InvalidAlgorithm => Error::UnsupportedAlgorithm {
                alg: format!("{:?}", header.alg),
            },
            // 헤더는 이미 해석됐으므로 서명 세그먼트의 base64 오류
            ErrorKind::InvalidSignature | ErrorKind::Base64(_) | ErrorKind::Crypto(_) => {
                Error::BadSignature
            }
            _ => Error::malformed(e.to_string()),
        })
}

/// 공개키를 PEM으로 인코딩
pub fn public_key_to_pem(key: &VerifyingKey) -> Result<String> {
    key.to_public_key_pem(LineEnding::LF)
        .map_err(|e| Error::InvalidKey {
            message: e.to_string(),
        })
}

/// PEM에서 공개키 로드
pub fn public_key_from_pem(pem: &str) -> Result<VerifyingKey> {
    VerifyingKey::from_public_key_pem(pem.trim()).map_err(|e| Error::InvalidKey {
        message: e.to_string(),
    })
}
