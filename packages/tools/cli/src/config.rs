//! CLI 설정

use crate::OutputFormat;

/// CLI 설정
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Hub URL (`--hub` 또는 `LK_HUB_URL`)
    pub hub: Option<String>,

    /// 출력 형식
    pub format: OutputFormat,
}

impl CliConfig {
    pub fn new(hub: Option<String>, format: OutputFormat) -> Self {
        Self { hub, format }
    }

    /// Hub URL 결정 (끝의 `/` 제거)
    pub fn hub_url(&self) -> anyhow::Result<String> {
        self.hub
            .as_deref()
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .ok_or_else(|| {
                anyhow::anyhow!("Hub URL not configured. Use '--hub <url>' or set LK_HUB_URL")
            })
    }

    pub fn json_output(&self) -> bool {
        self.format == OutputFormat::Json
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hub_url() {
        let config = CliConfig::new(Some("http://localhost:8080/".to_string()), OutputFormat::Text);
        assert_eq!(config.hub_url().unwrap(), "http://localhost:8080");

        assert!(CliConfig::default().hub_url().is_err());
        assert!(CliConfig::new(Some(String::new()), OutputFormat::Text)
            .hub_url()
            .is_err());
    }
}
