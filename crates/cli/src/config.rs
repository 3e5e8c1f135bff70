use anyhow::{anyhow, Context as AnyhowContext, Result};
use attrwire_annotation::AnnotatorConfig;
use attrwire_scanner::ScanOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings file: `[annotator]` and `[scan]` tables, TOML or JSON
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    pub annotator: AnnotatorConfig,
    pub scan: ScanOptions,
}

impl CliConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = Self::parse(&bytes)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Accept JSON first, then TOML
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let value: serde_json::Value = match serde_json::from_slice(bytes) {
            Ok(value) => value,
            Err(json_err) => {
                let utf8 = std::str::from_utf8(bytes).map_err(|err| anyhow!("{json_err}; {err}"))?;
                let toml_value: toml::Value = toml::from_str(utf8).map_err(|toml_err| {
                    anyhow!("Config is not valid JSON or TOML ({json_err}); TOML parse error: {toml_err}")
                })?;
                serde_json::to_value(toml_value)
                    .map_err(|err| anyhow!("Failed to convert TOML config to JSON: {err}"))?
            }
        };
        serde_json::from_value(value).map_err(|err| anyhow!("Config parse error: {err}"))
    }

    pub fn validate(&self) -> Result<()> {
        self.annotator
            .validate()
            .map_err(|err| anyhow!("[annotator] {err}"))?;
        self.scan.validate().map_err(|err| anyhow!("[scan] {err}"))?;
        Ok(())
    }
}
