//! In-memory bookkeeping for loaded and applied themes.
//!
//! # Design
//! - Owned exclusively by the engine; callers only ever see shared borrows.
//! - Cache entries are keyed by theme name, so re-applying a name replaces
//!   its entry.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use chrono::{DateTime, Utc};
use livery_tokens::{
    CssOptions, FlatTokenMap, FlatUnresolved, TokenDocument, emit_css_with, flatten_with_depth,
};
use serde::Serialize;

/// Lifecycle position of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineState {
    /// Nothing loaded or applied yet.
    Unloaded,
    /// At least one document is loaded; none applied.
    Loaded,
    /// A theme is active.
    Applied,
}

/// Everything derived from one applied document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledTheme {
    /// Merged document that was applied.
    pub document: TokenDocument,
    /// Flattened tokens.
    pub flat: FlatTokenMap,
    /// Emitted rule block.
    pub css: String,
    /// References left unresolved while flattening.
    pub unresolved: Vec<FlatUnresolved>,
    /// When the theme was compiled.
    pub applied_at: DateTime<Utc>,
}

impl CompiledTheme {
    /// Flatten and emit `document`.
    #[must_use]
    pub fn compile(document: TokenDocument, css: &CssOptions, max_depth: usize) -> Self {
        let report = flatten_with_depth(&document, max_depth);
        let css = emit_css_with(&document.name, &report.tokens, css);
        Self {
            document,
            flat: report.tokens,
            css,
            unresolved: report.unresolved,
            applied_at: Utc::now(),
        }
    }

    /// Theme name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.document.name
    }
}

#[derive(Debug, Default)]
pub(crate) struct ThemeStore {
    loaded: BTreeMap<String, TokenDocument>,
    compiled: BTreeMap<String, CompiledTheme>,
    current: Option<String>,
}

impl ThemeStore {
    pub(crate) fn insert_loaded(&mut self, document: TokenDocument) {
        self.loaded.insert(document.name.clone(), document);
    }

    pub(crate) fn loaded(&self, name: &str) -> Option<&TokenDocument> {
        self.loaded.get(name)
    }

    pub(crate) fn record_applied(&mut self, compiled: CompiledTheme) -> &CompiledTheme {
        let name = compiled.name().to_string();
        self.current = Some(name.clone());
        match self.compiled.entry(name) {
            Entry::Occupied(mut slot) => {
                slot.insert(compiled);
                slot.into_mut()
            }
            Entry::Vacant(slot) => slot.insert(compiled),
        }
    }

    pub(crate) fn current(&self) -> Option<&CompiledTheme> {
        self.current
            .as_deref()
            .and_then(|name| self.compiled.get(name))
    }

    pub(crate) fn compiled(&self, name: &str) -> Option<&CompiledTheme> {
        self.compiled.get(name)
    }

    pub(crate) fn state(&self) -> EngineState {
        if self.current.is_some() {
            EngineState::Applied
        } else if self.loaded.is_empty() {
            EngineState::Unloaded
        } else {
            EngineState::Loaded
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use livery_test_support::fixtures::minimal_theme;
    use livery_tokens::{MAX_REFERENCE_DEPTH, parse_document};

    fn compiled(name: &str) -> CompiledTheme {
        let document = parse_document(minimal_theme(name)).expect("valid fixture");
        CompiledTheme::compile(document, &CssOptions::default(), MAX_REFERENCE_DEPTH)
    }

    #[test]
    fn compile_produces_flat_map_and_css() {
        let theme = compiled("t1");
        assert_eq!(theme.flat.get_str("button-bg"), Some("#3498db"));
        assert!(theme.css.starts_with("[data-theme=\"t1\"]"));
        assert!(theme.unresolved.is_empty());
    }

    #[test]
    fn state_tracks_lifecycle() {
        let mut store = ThemeStore::default();
        assert_eq!(store.state(), EngineState::Unloaded);
        store.insert_loaded(compiled("t1").document);
        assert_eq!(store.state(), EngineState::Loaded);
        assert!(store.loaded("t1").is_some());
        store.record_applied(compiled("t1"));
        assert_eq!(store.state(), EngineState::Applied);
    }

    #[test]
    fn reapplying_a_name_replaces_its_entry() {
        let mut store = ThemeStore::default();
        let first = compiled("t1");
        let mut second = compiled("t1");
        second.css = "replaced".to_string();
        store.record_applied(first);
        store.record_applied(compiled("t2"));
        store.record_applied(second);
        assert_eq!(store.current().map(CompiledTheme::name), Some("t1"));
        assert_eq!(store.compiled("t1").map(|theme| theme.css.as_str()), Some("replaced"));
        assert!(store.compiled("t2").is_some());
    }
}
