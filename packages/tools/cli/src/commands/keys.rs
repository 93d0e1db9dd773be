//! 서명키 명령어

use std::io::Write as _;
use std::path::Path;

use anyhow::Context as _;
use lk_core::auth::TokenSigner;

pub fn keygen(out: &Path, force: bool) -> anyhow::Result<()> {
    if out.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", out.display());
    }

    let signer = TokenSigner::generate();
    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    write_private(out, &signer.to_pkcs8_pem()?)
        .with_context(|| format!("failed to write {}", out.display()))?;

    println!("Wrote signing key to {}", out.display());
    println!("Start the hub with LK_SIGNING_KEY={}", out.display());
    Ok(())
}

pub fn public_key(key: &Path) -> anyhow::Result<()> {
    print!("{}", load_public_key_pem(key)?);
    Ok(())
}

pub fn load_signer(key: &Path) -> anyhow::Result<TokenSigner> {
    let pem = std::fs::read_to_string(key)
        .with_context(|| format!("failed to read {}", key.display()))?;
    Ok(TokenSigner::from_pem(&pem)?)
}

/// 소유자만 읽을 수 있도록 기록 (unix: 0600)
fn write_private(path: &Path, contents: &str) -> std::io::Result<()> {
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    // --force로 기존 파일을 덮어쓸 때는 생성 모드가 적용되지 않음
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(contents.as_bytes())
}

fn load_public_key_pem(key: &Path) -> anyhow::Result<String> {
    Ok(load_signer(key)?.public_key_pem()?)
}
