use serde::{Deserialize, Serialize};

/// Options controlling how a directory tree is mapped onto entities
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanOptions {
    /// Package manifest declaring namespace to directory mappings
    pub manifest_file: String,

    /// Directory names never descended into when no manifest is present
    pub excluded_dirs: Vec<String>,

    /// Extension (without the dot) of files that declare entities
    pub source_extension: String,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            manifest_file: "composer.json".to_string(),
            excluded_dirs: vec!["vendor".to_string()],
            source_extension: "rs".to_string(),
        }
    }
}

impl ScanOptions {
    #[must_use]
    pub fn is_excluded(&self, dir_name: &str) -> bool {
        self.excluded_dirs.iter().any(|excluded| excluded == dir_name)
    }

    /// Validate options
    pub fn validate(&self) -> Result<(), String> {
        if self.manifest_file.trim().is_empty() {
            return Err("manifest_file must not be empty".to_string());
        }

        if self.source_extension.is_empty() || self.source_extension.starts_with('.') {
            return Err(format!(
                "source_extension ({}) must be a bare extension like \"rs\"",
                self.source_extension
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_valid() {
        let options = ScanOptions::default();
        assert!(options.validate().is_ok());
        assert!(options.is_excluded("vendor"));
        assert!(!options.is_excluded("src"));
    }

    #[test]
    fn test_invalid_extension() {
        let options = ScanOptions {
            source_extension: ".rs".to_string(),
            ..Default::default()
        };
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_partial_deserialize() {
        let options: ScanOptions = serde_json::from_str(r#"{"source_extension": "php"}"#).unwrap();
        assert_eq!(options.source_extension, "php");
        assert_eq!(options.manifest_file, "composer.json");
    }
}
