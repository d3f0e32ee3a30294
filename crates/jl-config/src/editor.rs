use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::heuristics::HeuristicsConfig;
use crate::history::HistoryConfig;
use crate::logging::LoggingConfig;
use crate::storage::StorageConfig;
use crate::validate;

// ---------------------------------------------------------------------------
// Raw TOML structure (intermediate representation)
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EditorConfigRaw {
    history: HistoryConfig,
    storage: StorageConfig,
    heuristics: HeuristicsConfig,
    logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// EditorConfig (resolved, validated)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default)]
pub struct EditorConfig {
    pub history: HistoryConfig,
    pub storage: StorageConfig,
    pub heuristics: HeuristicsConfig,
    pub logging: LoggingConfig,
}

impl EditorConfig {
    /// Read and parse an `editor.toml` file. A relative `storage.dir` is
    /// resolved against the file's parent directory.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
        let mut config: EditorConfig = content
            .parse()
            .map_err(|e| anyhow::anyhow!("{}: {e}", path.display()))?;
        if let Some(base_dir) = path.parent() {
            config.storage.resolve_dir(base_dir);
        }
        Ok(config)
    }
}

impl FromStr for EditorConfig {
    type Err = anyhow::Error;

    /// Parse a TOML string into a resolved, validated [`EditorConfig`].
    fn from_str(toml_str: &str) -> anyhow::Result<Self> {
        let raw: EditorConfigRaw = toml::from_str(toml_str)?;

        let config = EditorConfig {
            history: raw.history,
            storage: raw.storage,
            heuristics: raw.heuristics,
            logging: raw.logging,
        };

        validate::validate(&config)?;

        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use jl_lang::Scalar;

    use super::*;
    use crate::logging::LogFormat;
    use crate::types::{ByteSize, SettleMode, StorageBackend};

    const FULL_TOML: &str = r#"
[history]
capacity = 50
shrink_ratio = 0.5
storage_key = "rules-history"
settle = "10ms"

[storage]
backend = "file"
dir = ".session"
quota = "64KB"

[heuristics]
numeric_keywords = ["amount", "count"]

[[heuristics.context]]
keywords = ["age"]
value = 21

[[heuristics.context]]
keywords = ["email"]
value = "nobody@example.org"

[logging]
level = "warn"
format = "json"
file = "logs/editor.log"

[logging.modules]
"jl_core::history" = "debug"
"#;

    #[test]
    fn load_full_toml() {
        let cfg: EditorConfig = FULL_TOML.parse().unwrap();

        assert_eq!(cfg.history.capacity, 50);
        assert_eq!(cfg.history.shrink_ratio, 0.5);
        assert_eq!(cfg.history.storage_key, "rules-history");
        assert_eq!(
            cfg.history.settle,
            SettleMode::Delay(Duration::from_millis(10).into())
        );

        assert_eq!(cfg.storage.backend, StorageBackend::File);
        assert_eq!(cfg.storage.dir, Some(PathBuf::from(".session")));
        assert_eq!(cfg.storage.quota, Some(ByteSize::from(64 * 1024)));

        assert_eq!(cfg.heuristics.numeric_keywords, vec!["amount", "count"]);
        assert_eq!(cfg.heuristics.context.len(), 2);
        assert_eq!(cfg.heuristics.context[0].value, Scalar::int(21));
        assert_eq!(
            cfg.heuristics.context_value("person.email"),
            Some(&Scalar::from("nobody@example.org"))
        );

        assert_eq!(cfg.logging.level, "warn");
        assert_eq!(cfg.logging.format, LogFormat::Json);
        assert_eq!(cfg.logging.file, Some(PathBuf::from("logs/editor.log")));
        assert_eq!(
            cfg.logging.modules.get("jl_core::history").map(String::as_str),
            Some("debug")
        );
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let cfg: EditorConfig = "".parse().unwrap();
        assert_eq!(cfg, EditorConfig::default());
        assert_eq!(cfg.history.capacity, 100);
        assert_eq!(cfg.history.storage_key, "jsonlogic-editor-history");
        assert_eq!(cfg.history.settle, SettleMode::Explicit);
        assert_eq!(cfg.storage.backend, StorageBackend::Memory);
        assert_eq!(cfg.heuristics.context.len(), 4);
    }

    #[test]
    fn reject_invalid_history() {
        let err = "[history]\ncapacity = 0".parse::<EditorConfig>().unwrap_err();
        assert!(err.to_string().contains("capacity"), "{err}");

        let err = "[history]\nshrink_ratio = 1.5".parse::<EditorConfig>().unwrap_err();
        assert!(err.to_string().contains("shrink_ratio"), "{err}");

        let err = "[history]\nstorage_key = \"  \"".parse::<EditorConfig>().unwrap_err();
        assert!(err.to_string().contains("storage_key"), "{err}");

        assert!("[history]\nsettle = \"later\"".parse::<EditorConfig>().is_err());
    }

    #[test]
    fn file_backend_needs_dir() {
        let err = "[storage]\nbackend = \"file\"".parse::<EditorConfig>().unwrap_err();
        assert!(err.to_string().contains("storage.dir"), "{err}");
    }

    #[test]
    fn context_rule_needs_keywords() {
        let toml = r#"
[[heuristics.context]]
keywords = []
value = 1
"#;
        let err = toml.parse::<EditorConfig>().unwrap_err();
        assert!(err.to_string().contains("heuristics.context[0]"), "{err}");
    }

    #[test]
    fn load_resolves_storage_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("editor.toml");
        std::fs::write(&path, "[storage]\nbackend = \"file\"\ndir = \"sess\"\n").unwrap();

        let cfg = EditorConfig::load(&path).unwrap();
        assert_eq!(cfg.storage.dir, Some(dir.path().join("sess")));
    }

    #[test]
    fn load_missing_file_names_path() {
        let err = EditorConfig::load("/nonexistent/editor.toml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/editor.toml"));
    }
}
