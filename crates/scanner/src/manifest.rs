use attrwire_annotation::NAMESPACE_SEPARATOR;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Namespace mappings read from a package manifest
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    /// Namespace (without trailing separator) → directories relative to the manifest
    pub namespaces: BTreeMap<String, Vec<String>>,
}

#[derive(Deserialize)]
struct RawManifest {
    #[serde(default)]
    autoload: Option<RawAutoload>,
}

#[derive(Deserialize)]
struct RawAutoload {
    #[serde(default, rename = "psr-4")]
    psr4: BTreeMap<String, Dirs>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Dirs {
    One(String),
    Many(Vec<String>),
}

impl Manifest {
    /// Read the manifest at `path`.
    ///
    /// Returns `None` when the file is missing; unreadable or malformed manifests
    /// are logged and treated as missing.
    pub fn read(path: &Path) -> Option<Self> {
        if !path.is_file() {
            return None;
        }

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                log::warn!("Failed to read manifest {}: {e}", path.display());
                return None;
            }
        };

        match Self::parse(&content) {
            Ok(manifest) => Some(manifest),
            Err(e) => {
                log::warn!("Ignoring malformed manifest {}: {e}", path.display());
                None
            }
        }
    }

    pub fn parse(content: &str) -> serde_json::Result<Self> {
        let raw: RawManifest = serde_json::from_str(content)?;
        let namespaces = raw
            .autoload
            .map(|autoload| autoload.psr4)
            .unwrap_or_default()
            .into_iter()
            .map(|(namespace, dirs)| {
                let dirs = match dirs {
                    Dirs::One(dir) => vec![dir],
                    Dirs::Many(dirs) => dirs,
                };
                (
                    namespace.trim_end_matches(NAMESPACE_SEPARATOR).to_string(),
                    dirs,
                )
            })
            .collect();
        Ok(Self { namespaces })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn test_single_and_multiple_dirs() {
        let manifest = Manifest::parse(
            r#"{
                "name": "acme/shop",
                "autoload": {
                    "psr-4": {
                        "App\\": "src/",
                        "Lib\\": ["lib/", "extra/"]
                    }
                }
            }"#,
        )
        .unwrap();

        assert_eq!(manifest.namespaces.get("App"), Some(&vec!["src/".to_string()]));
        assert_eq!(
            manifest.namespaces.get("Lib"),
            Some(&vec!["lib/".to_string(), "extra/".to_string()])
        );
    }

    #[test]
    fn test_no_psr4() {
        let manifest = Manifest::parse(r#"{"name": "acme/empty", "autoload": {"files": ["x.rs"]}}"#).unwrap();
        assert!(manifest.namespaces.is_empty());
        assert!(Manifest::parse("{}").unwrap().namespaces.is_empty());
    }

    #[test]
    fn test_malformed_is_ignored() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("composer.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(Manifest::read(&path), None);
        assert_eq!(Manifest::read(&dir.path().join("missing.json")), None);
    }
}
