//! Engine configuration sourced from defaults, a JSON file, or the environment.
//!
//! # Design
//! - Every setting has a default, so an empty environment yields a usable engine.
//! - Environment parsing takes a lookup function so tests never touch the
//!   process environment.

use std::path::{Path, PathBuf};

use livery_tokens::{CssOptions, MAX_REFERENCE_DEPTH};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Identifier of the style node the engine writes into.
pub const DEFAULT_STYLE_NODE_ID: &str = "livery-theme";
/// Storage key for the serialized document of the applied theme.
pub const DOCUMENT_STORAGE_KEY: &str = "livery.theme.document";
/// Storage key for the name of the applied theme.
pub const NAME_STORAGE_KEY: &str = "livery.theme.name";

const ENV_STYLE_NODE_ID: &str = "LIVERY_STYLE_NODE_ID";
const ENV_THEME_ATTRIBUTE: &str = "LIVERY_THEME_ATTRIBUTE";
const ENV_CSS_PREFIX: &str = "LIVERY_CSS_PREFIX";
const ENV_MAX_REFERENCE_DEPTH: &str = "LIVERY_MAX_REFERENCE_DEPTH";
const ENV_THEME_ROOT: &str = "LIVERY_THEME_ROOT";

/// Keys under which the applied theme is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageKeys {
    /// Key holding the serialized document.
    pub document: String,
    /// Key holding the theme name.
    pub name: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            document: DOCUMENT_STORAGE_KEY.to_string(),
            name: NAME_STORAGE_KEY.to_string(),
        }
    }
}

/// Runtime settings for a [`crate::ThemeEngine`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Style node replaced on every apply.
    pub style_node_id: String,
    /// Selector and naming options for emitted CSS.
    pub css: CssOptions,
    /// Reference hop limit used while flattening.
    pub max_reference_depth: usize,
    /// Directory holding `<name>.json` theme documents.
    pub theme_root: Option<PathBuf>,
    /// Persistence keys.
    pub storage_keys: StorageKeys,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            style_node_id: DEFAULT_STYLE_NODE_ID.to_string(),
            css: CssOptions::default(),
            max_reference_depth: MAX_REFERENCE_DEPTH,
            theme_root: None,
            storage_keys: StorageKeys::default(),
        }
    }
}

impl EngineConfig {
    /// Build configuration from `LIVERY_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Config`] when a variable is set to an unusable value.
    pub fn from_env() -> EngineResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Config`] when a variable is set to an unusable value.
    pub fn from_lookup<F>(lookup: F) -> EngineResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(node) = non_blank(lookup(ENV_STYLE_NODE_ID)) {
            config.style_node_id = node;
        }
        if let Some(attribute) = non_blank(lookup(ENV_THEME_ATTRIBUTE)) {
            config.css.attribute = attribute;
        }
        if let Some(prefix) = lookup(ENV_CSS_PREFIX) {
            config.css.prefix = prefix.trim().to_string();
        }
        if let Some(raw) = non_blank(lookup(ENV_MAX_REFERENCE_DEPTH)) {
            config.max_reference_depth = raw.trim().parse().map_err(|_| {
                EngineError::config(
                    "max_reference_depth",
                    "must be a positive integer",
                    Some(raw.clone()),
                )
            })?;
        }
        if let Some(root) = non_blank(lookup(ENV_THEME_ROOT)) {
            config.theme_root = Some(PathBuf::from(root));
        }
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file; absent keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Config`] when the file cannot be read or parsed,
    /// or when a setting is unusable.
    pub fn from_file(path: &Path) -> EngineResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|_| {
            EngineError::config(
                "config_file",
                "could not be read",
                Some(path.display().to_string()),
            )
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|err| {
            EngineError::config(
                "config_file",
                "is not valid configuration json",
                Some(err.to_string()),
            )
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check settings that serde alone cannot enforce.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Config`] for the first unusable setting.
    pub fn validate(&self) -> EngineResult<()> {
        if self.style_node_id.trim().is_empty() {
            return Err(EngineError::config("style_node_id", "must not be empty", None));
        }
        if self.css.attribute.trim().is_empty() {
            return Err(EngineError::config("css.attribute", "must not be empty", None));
        }
        if self.max_reference_depth == 0 {
            return Err(EngineError::config(
                "max_reference_depth",
                "must be a positive integer",
                Some("0".to_string()),
            ));
        }
        if self.storage_keys.document == self.storage_keys.name {
            return Err(EngineError::config(
                "storage_keys",
                "document and name keys must differ",
                Some(self.storage_keys.name.clone()),
            ));
        }
        Ok(())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|raw| !raw.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn empty_environment_uses_defaults() -> EngineResult<()> {
        let config = EngineConfig::from_lookup(lookup_from(&[]))?;
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.style_node_id, "livery-theme");
        assert_eq!(config.css.attribute, "data-theme");
        Ok(())
    }

    #[test]
    fn environment_overrides_apply() -> EngineResult<()> {
        let config = EngineConfig::from_lookup(lookup_from(&[
            ("LIVERY_STYLE_NODE_ID", "brand-style"),
            ("LIVERY_THEME_ATTRIBUTE", "data-brand"),
            ("LIVERY_CSS_PREFIX", "lv"),
            ("LIVERY_MAX_REFERENCE_DEPTH", " 8 "),
            ("LIVERY_THEME_ROOT", "/srv/themes"),
        ]))?;
        assert_eq!(config.style_node_id, "brand-style");
        assert_eq!(config.css.attribute, "data-brand");
        assert_eq!(config.css.prefix, "lv");
        assert_eq!(config.max_reference_depth, 8);
        assert_eq!(config.theme_root, Some(PathBuf::from("/srv/themes")));
        Ok(())
    }

    #[test]
    fn invalid_depth_is_rejected() {
        for raw in ["zero", "0", "-1"] {
            let err = EngineConfig::from_lookup(lookup_from(&[("LIVERY_MAX_REFERENCE_DEPTH", raw)]))
                .unwrap_err();
            assert!(
                matches!(err, EngineError::Config { field: "max_reference_depth", .. }),
                "{raw} accepted"
            );
        }
    }

    #[test]
    fn file_config_fills_missing_keys_with_defaults() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("livery.json");
        std::fs::write(&path, r#"{ "style_node_id": "nested", "css": { "prefix": "x" } }"#)?;
        let config = EngineConfig::from_file(&path)?;
        assert_eq!(config.style_node_id, "nested");
        assert_eq!(config.css.prefix, "x");
        assert_eq!(config.css.attribute, "data-theme");
        assert_eq!(config.storage_keys, StorageKeys::default());

        assert!(EngineConfig::from_file(&dir.path().join("missing.json")).is_err());
        Ok(())
    }
}
