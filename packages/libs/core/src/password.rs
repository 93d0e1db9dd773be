//! 비밀번호 해싱
//!
//! scrypt 기반 단방향 해시입니다. 호출마다 32바이트 랜덤 salt를 사용하고,
//! 검증은 `password-hash`의 PHC 흐름(상수 시간 비교 포함)을 따릅니다.
//!
//! # 저장 형식
//!
//! PHC 문자열: `$scrypt$ln=<log_n>,r=<r>,p=<p>$<salt>$<hash>`

use std::fmt;

use rand::RngCore;
use scrypt::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use scrypt::Scrypt;

use crate::error::{Error, Result};

const SALT_LEN: usize = 32;
const HASH_LEN: usize = 32;

/// scrypt 파라미터
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashParams {
    /// log2(N)
    pub log_n: u8,
    pub r: u32,
    pub p: u32,
}

impl Default for HashParams {
    /// N = 32768, r = 8, p = 1
    fn default() -> Self {
        Self {
            log_n: 15,
            r: 8,
            p: 1,
        }
    }
}

impl HashParams {
    pub fn with_log_n(log_n: u8) -> Self {
        Self {
            log_n,
            ..Self::default()
        }
    }

    fn to_scrypt(self) -> Result<scrypt::Params> {
        scrypt::Params::new(self.log_n, self.r, self.p, HASH_LEN).map_err(|e| Error::Hash {
            message: e.to_string(),
        })
    }
}

/// 비밀번호 다이제스트 (PHC 문자열)
///
/// 파라미터와 salt를 함께 담고 있어 해셔 설정이 바뀌어도 검증할 수 있습니다.
/// `Debug` 출력은 가려집니다.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    /// 저장된 PHC 문자열에서 로드
    pub fn parse(phc: &str) -> Result<Self> {
        let hash = PasswordHash::new(phc).map_err(|e| Error::Hash {
            message: format!("unrecognised password digest: {}", e),
        })?;
        if hash.algorithm != scrypt::ALG_ID {
            return Err(Error::Hash {
                message: format!("unsupported password digest algorithm: {}", hash.algorithm),
            });
        }
        Ok(Self(phc.to_string()))
    }

    /// 저장용 PHC 문자열
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PasswordDigest").field(&"<redacted>").finish()
    }
}

/// 비밀번호 해셔
#[derive(Debug, Clone)]
pub struct SecretHasher {
    params: HashParams,
    dummy: PasswordDigest,
}

impl SecretHasher {
    /// 새 해셔 생성
    pub fn new(params: HashParams) -> Result<Self> {
        let dummy = derive(b"latchkey-dummy-password", params)?;
        Ok(Self { params, dummy })
    }

    /// 새 해시 생성 (랜덤 salt)
    pub fn hash(&self, password: &str) -> Result<PasswordDigest> {
        derive(password.as_bytes(), self.params)
    }

    /// 비밀번호 검증 (다이제스트에 기록된 파라미터 사용)
    pub fn verify(&self, password: &str, digest: &PasswordDigest) -> bool {
        match PasswordHash::new(digest.as_str()) {
            Ok(hash) => Scrypt.verify_password(password.as_bytes(), &hash).is_ok(),
            Err(_) => false,
        }
    }

    /// 존재하지 않는 계정에 대해 동일한 비용으로 검증을 수행
    pub fn verify_dummy(&self, password: &str) {
        let _ = self.verify(password, &self.dummy);
    }
}

fn derive(password: &[u8], params: HashParams) -> Result<PasswordDigest> {
    let mut bytes = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut bytes);
    let salt = SaltString::encode_b64(&bytes).map_err(|e| Error::Hash {
        message: e.to_string(),
    })?;

    let hash = Scrypt
        .hash_password_customized(password, None, None, params.to_scrypt()?, &salt)
        .map_err(|e| Error::Hash {
            message: e.to_string(),
        })?;
    Ok(PasswordDigest(hash.to_string()))
}
