//! 서명키 로드

use std::path::Path;

use anyhow::Context;
use lk_core::auth::TokenSigner;

/// PEM 파일에서 서명키를 읽거나, 경로가 없으면 임시 키를 생성
pub fn load_signing_key(path: Option<&Path>) -> anyhow::Result<TokenSigner> {
    let Some(path) = path else {
        tracing::warn!(
            "LK_SIGNING_KEY not set; generated an ephemeral signing key. \
             Issued credentials will not survive a restart"
        );
        return Ok(TokenSigner::generate());
    };

    let pem = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read signing key {}", path.display()))?;
    let signer = TokenSigner::from_pem(&pem)
        .with_context(|| format!("invalid signing key {}", path.display()))?;

    tracing::info!("Loaded signing key from {}", path.display());
    Ok(signer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_file() {
        let signer = TokenSigner::generate();
        let path = std::env::temp_dir().join(format!("lk-hub-key-{}.pem", uuid::Uuid::new_v4()));
        std::fs::write(&path, signer.to_pkcs8_pem().unwrap()).unwrap();

        let loaded = load_signing_key(Some(&path)).unwrap();
        assert_eq!(loaded.verifying_key(), signer.verifying_key());

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_file_fails() {
        let path = std::env::temp_dir().join("lk-hub-missing-key.pem");
        assert!(load_signing_key(Some(&path)).is_err());
    }

    #[test]
    fn test_ephemeral_key() {
        assert!(load_signing_key(None).is_ok());
    }
}
