use crate::editor::EditorConfig;
use crate::types::StorageBackend;

/// Internal validation, called automatically during `EditorConfig::from_str` / `load`.
pub(crate) fn validate(config: &EditorConfig) -> anyhow::Result<()> {
    let history = &config.history;
    if history.capacity == 0 {
        anyhow::bail!("history.capacity must be > 0");
    }
    if !(history.shrink_ratio > 0.0 && history.shrink_ratio <= 1.0) {
        anyhow::bail!(
            "history.shrink_ratio must be in (0, 1], got {}",
            history.shrink_ratio,
        );
    }
    if history.storage_key.trim().is_empty() {
        anyhow::bail!("history.storage_key must not be empty");
    }

    if config.storage.backend == StorageBackend::File && config.storage.dir.is_none() {
        anyhow::bail!("storage.dir is required when storage.backend = \"file\"");
    }

    for (i, rule) in config.heuristics.context.iter().enumerate() {
        if rule.keywords.is_empty() {
            anyhow::bail!("heuristics.context[{i}]: at least one keyword is required");
        }
        if rule.keywords.iter().any(|k| k.is_empty()) {
            anyhow::bail!("heuristics.context[{i}]: keywords must not be empty strings");
        }
    }
    if config.heuristics.numeric_keywords.iter().any(|k| k.is_empty()) {
        anyhow::bail!("heuristics.numeric_keywords must not contain empty strings");
    }

    Ok(())
}
