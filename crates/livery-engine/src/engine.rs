//! Theme orchestrator composing merge, flatten, emit, inject and persist.
//!
//! # Design
//! - Validation and every fallible surface write happen before any state
//!   changes, so a failed apply leaves the engine untouched.
//! - Persistence is best effort: storage failures are logged and the
//!   in-memory application stands.
//! - Restore re-applies the persisted merged document without merging again.

use livery_tokens::{
    FlatTokenMap, LegacyColorMap, OverrideDocument, TokenDocument, from_legacy, merge,
    parse_document, parse_overrides,
};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult, StorageError};
use crate::source::{DirectorySource, ThemeSource};
use crate::storage::{MemoryStorage, ThemeStorage};
use crate::store::{CompiledTheme, EngineState, ThemeStore};
use crate::surface::{MemorySurface, StyleSurface};

/// Owns the active theme and the side effects of applying it.
pub struct ThemeEngine {
    config: EngineConfig,
    storage: Box<dyn ThemeStorage>,
    surface: Box<dyn StyleSurface>,
    source: Option<Box<dyn ThemeSource>>,
    store: ThemeStore,
}

impl std::fmt::Debug for ThemeEngine {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ThemeEngine")
            .field("config", &self.config)
            .field("state", &self.store.state())
            .field("current", &self.store.current().map(CompiledTheme::name))
            .finish_non_exhaustive()
    }
}

impl ThemeEngine {
    /// Build an engine over the given storage and style surface.
    ///
    /// A [`DirectorySource`] is installed when `config.theme_root` is set.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Config`] when the configuration is unusable.
    pub fn new(
        config: EngineConfig,
        storage: Box<dyn ThemeStorage>,
        surface: Box<dyn StyleSurface>,
    ) -> EngineResult<Self> {
        config.validate()?;
        let source = config
            .theme_root
            .clone()
            .map(|root| Box::new(DirectorySource::new(root)) as Box<dyn ThemeSource>);
        Ok(Self {
            config,
            storage,
            surface,
            source,
            store: ThemeStore::default(),
        })
    }

    /// Engine with default configuration and in-memory storage and surface.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            config: EngineConfig::default(),
            storage: Box::new(MemoryStorage::new()),
            surface: Box::new(MemorySurface::new()),
            source: None,
            store: ThemeStore::default(),
        }
    }

    /// Replace the transport used by [`Self::load_theme`].
    #[must_use]
    pub fn with_source(mut self, source: Box<dyn ThemeSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Fetch, validate and cache the document for `name`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Config`] when no source is configured,
    /// [`EngineError::Source`] when retrieval fails, and
    /// [`EngineError::Structural`] when the document is invalid.
    pub async fn load_theme(&mut self, name: &str) -> EngineResult<TokenDocument> {
        let source = self.source.as_ref().ok_or_else(|| {
            EngineError::config("theme_root", "no theme source configured", None)
        })?;
        let payload = source.fetch(name).await?;
        let document = parse_document(payload)?;
        if document.name != name {
            debug!(
                requested = name,
                declared = %document.name,
                "theme file declares a different name"
            );
        }
        Ok(self.remember(document))
    }

    /// Validate and cache a document supplied as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Structural`] when the document is invalid.
    pub fn load_json(&mut self, payload: Value) -> EngineResult<TokenDocument> {
        let document = parse_document(payload)?;
        Ok(self.remember(document))
    }

    /// Migrate and cache a legacy color map.
    pub fn load_legacy(&mut self, legacy: &LegacyColorMap) -> TokenDocument {
        let document = from_legacy(legacy);
        info!(theme = %document.name, keys = legacy.len(), "migrated legacy color map");
        self.remember(document)
    }

    /// Loaded (not necessarily applied) document by name.
    #[must_use]
    pub fn loaded(&self, name: &str) -> Option<&TokenDocument> {
        self.store.loaded(name)
    }

    /// Merge, flatten, emit, inject and persist `document`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Surface`] when the style node cannot be
    /// written; the engine state is unchanged in that case.
    pub fn apply_theme(
        &mut self,
        document: &TokenDocument,
        overrides: Option<&OverrideDocument>,
    ) -> EngineResult<&CompiledTheme> {
        let merged = overrides.map_or_else(|| document.clone(), |patch| merge(document, patch));
        let compiled = self.compile(merged);
        self.surface
            .replace_style(&self.config.style_node_id, &compiled.css)?;
        self.persist(&compiled);
        info!(
            theme = %compiled.name(),
            tokens = compiled.flat.len(),
            unresolved = compiled.unresolved.len(),
            "theme applied"
        );
        Ok(self.store.record_applied(compiled))
    }

    /// Validate raw JSON inputs, then apply them.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Structural`] before touching any state when
    /// either payload is invalid, otherwise as [`Self::apply_theme`].
    pub fn apply_json(
        &mut self,
        document: Value,
        overrides: Option<Value>,
    ) -> EngineResult<&CompiledTheme> {
        let document = parse_document(document)?;
        let overrides = overrides.map(parse_overrides).transpose()?;
        self.apply_theme(&document, overrides.as_ref())
    }

    /// Re-apply the persisted theme, if any.
    ///
    /// Returns `Ok(None)` when nothing usable is persisted; unreadable or
    /// invalid persisted data is logged and treated as absent.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Surface`] when the style node cannot be written.
    pub fn restore_theme(&mut self) -> EngineResult<Option<&CompiledTheme>> {
        let Some(document) = self.read_persisted() else {
            return Ok(None);
        };
        let compiled = self.compile(document);
        self.surface
            .replace_style(&self.config.style_node_id, &compiled.css)?;
        info!(theme = %compiled.name(), "theme restored from storage");
        Ok(Some(self.store.record_applied(compiled)))
    }

    /// Lifecycle position.
    #[must_use]
    pub fn state(&self) -> EngineState {
        self.store.state()
    }

    /// Merged document of the active theme.
    #[must_use]
    pub fn current(&self) -> Option<&TokenDocument> {
        self.store.current().map(|compiled| &compiled.document)
    }

    /// Cached compilation for `name`.
    #[must_use]
    pub fn compiled(&self, name: &str) -> Option<&CompiledTheme> {
        self.store.compiled(name)
    }

    /// CSS text of the active theme.
    #[must_use]
    pub fn last_css(&self) -> Option<&str> {
        self.store.current().map(|compiled| compiled.css.as_str())
    }

    /// Flat token map of the active theme.
    #[must_use]
    pub fn last_flat_map(&self) -> Option<&FlatTokenMap> {
        self.store.current().map(|compiled| &compiled.flat)
    }

    /// Copy the active theme's CSS into another surface.
    ///
    /// Returns `false` when no theme is active.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Surface`] when the target cannot be written.
    pub fn mirror_into(&self, surface: &mut dyn StyleSurface) -> EngineResult<bool> {
        let Some(css) = self.last_css() else {
            return Ok(false);
        };
        surface.replace_style(&self.config.style_node_id, css)?;
        Ok(true)
    }

    /// Text currently held by the engine's own style node.
    #[must_use]
    pub fn style_node(&self) -> Option<String> {
        self.surface.style(&self.config.style_node_id)
    }

    /// Drop the persisted theme.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Storage`] when the backend rejects the removal.
    pub fn clear_persisted(&mut self) -> EngineResult<()> {
        let keys = &self.config.storage_keys;
        self.storage
            .remove(&keys.document)
            .and_then(|()| self.storage.remove(&keys.name))
            .map_err(|err| EngineError::storage("storage.clear", err))
    }

    fn remember(&mut self, document: TokenDocument) -> TokenDocument {
        debug!(theme = %document.name, "theme document loaded");
        self.store.insert_loaded(document.clone());
        document
    }

    fn compile(&self, document: TokenDocument) -> CompiledTheme {
        CompiledTheme::compile(
            document,
            &self.config.css,
            self.config.max_reference_depth,
        )
    }

    fn persist(&mut self, compiled: &CompiledTheme) {
        if let Err(err) = self.write_persisted(compiled) {
            warn!(
                theme = %compiled.name(),
                error = %err,
                detail = ?err,
                "failed to persist applied theme"
            );
        }
    }

    fn write_persisted(&mut self, compiled: &CompiledTheme) -> Result<(), StorageError> {
        let keys = &self.config.storage_keys;
        let body = serde_json::to_string(&compiled.document).map_err(|source| {
            StorageError::Serialize {
                key: keys.document.clone(),
                source,
            }
        })?;
        self.storage.write(&keys.document, &body)?;
        self.storage.write(&keys.name, compiled.name())
    }

    fn read_persisted(&self) -> Option<TokenDocument> {
        let keys = &self.config.storage_keys;
        let body = match self.storage.read(&keys.document) {
            Ok(Some(body)) => body,
            Ok(None) => return None,
            Err(err) => {
                warn!(error = %err, detail = ?err, "theme storage unreadable; nothing restored");
                return None;
            }
        };
        let document = match TokenDocument::from_json_str(&body) {
            Ok(document) => document,
            Err(err) => {
                warn!(error = %err.detail(), "persisted theme is invalid; nothing restored");
                return None;
            }
        };
        match self.storage.read(&keys.name) {
            Ok(Some(name)) if name != document.name => {
                warn!(
                    stored = %name,
                    document = %document.name,
                    "persisted theme name disagrees with document"
                );
            }
            Ok(_) => {}
            Err(err) => debug!(error = %err, "persisted theme name unreadable"),
        }
        Some(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use livery_test_support::fixtures::{dark_theme, light_theme, minimal_theme};
    use serde_json::json;

    #[test]
    fn apply_injects_css_and_records_current() -> EngineResult<()> {
        let mut engine = ThemeEngine::in_memory();
        assert_eq!(engine.state(), EngineState::Unloaded);
        let compiled = engine.apply_json(minimal_theme("t1"), None)?;
        assert_eq!(compiled.flat.get_str("button-bg"), Some("#3498db"));
        assert_eq!(engine.state(), EngineState::Applied);
        assert_eq!(engine.current().map(|doc| doc.name.as_str()), Some("t1"));
        assert_eq!(engine.style_node().as_deref(), engine.last_css());
        Ok(())
    }

    #[test]
    fn overrides_are_merged_before_flattening() -> EngineResult<()> {
        let mut engine = ThemeEngine::in_memory();
        engine.apply_json(
            light_theme(),
            Some(json!({ "semantic": { "primary": "#ff0000" } })),
        )?;
        let flat = engine
            .last_flat_map()
            .ok_or(EngineError::config("current", "missing", None))?;
        assert_eq!(flat.get_str("button-bg"), Some("#ff0000"));
        assert_eq!(flat.get_str("header-bg"), Some("#ff0000"));
        Ok(())
    }

    #[test]
    fn structural_failures_mutate_nothing() -> EngineResult<()> {
        let mut engine = ThemeEngine::in_memory();
        engine.apply_json(light_theme(), None)?;
        let before = engine.last_css().map(str::to_string);

        let mut broken = dark_theme();
        if let Some(map) = broken.as_object_mut() {
            map.remove("semantic");
        }
        let err = engine.apply_json(broken, None).unwrap_err();
        assert!(err.is_structural());

        let err = engine
            .apply_json(dark_theme(), Some(json!({ "palette": "red" })))
            .unwrap_err();
        assert!(err.is_structural());

        assert_eq!(engine.last_css().map(str::to_string), before);
        assert_eq!(engine.current().map(|doc| doc.name.as_str()), Some("light"));
        Ok(())
    }

    #[test]
    fn storage_failures_do_not_block_apply() -> EngineResult<()> {
        let mut engine = ThemeEngine::new(
            EngineConfig::default(),
            Box::new(MemoryStorage::unavailable()),
            Box::new(MemorySurface::new()),
        )?;
        engine.apply_json(minimal_theme("t1"), None)?;
        assert_eq!(engine.state(), EngineState::Applied);
        assert!(engine.restore_theme()?.is_none());
        assert!(engine.clear_persisted().is_err());
        Ok(())
    }

    #[test]
    fn mirror_copies_active_css() -> EngineResult<()> {
        let mut engine = ThemeEngine::in_memory();
        let mut nested = MemorySurface::new();
        assert!(!engine.mirror_into(&mut nested)?);
        engine.apply_json(minimal_theme("t1"), None)?;
        assert!(engine.mirror_into(&mut nested)?);
        assert_eq!(nested.style("livery-theme").as_deref(), engine.last_css());
        Ok(())
    }

    #[tokio::test]
    async fn load_without_source_is_a_config_error() {
        let mut engine = ThemeEngine::in_memory();
        let err = engine.load_theme("t1").await.unwrap_err();
        assert!(matches!(err, EngineError::Config { field: "theme_root", .. }));
    }

    #[test]
    fn load_json_moves_engine_to_loaded() -> EngineResult<()> {
        let mut engine = ThemeEngine::in_memory();
        let document = engine.load_json(dark_theme())?;
        assert_eq!(engine.state(), EngineState::Loaded);
        assert!(engine.loaded("dark").is_some());
        engine.apply_theme(&document, None)?;
        assert_eq!(engine.state(), EngineState::Applied);
        Ok(())
    }
}
