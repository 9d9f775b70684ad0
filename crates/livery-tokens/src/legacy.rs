//! Conversion between token documents and the flat legacy color map.
//!
//! # Design
//! - A single static table drives both directions.
//! - Canonical paths are pairwise distinct, so a map carrying exactly the
//!   table's key set survives `from_legacy` then `to_legacy` unchanged.
//! - Fallback paths only apply when exporting.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::defaults::CURRENT_SCHEMA_VERSION;
use crate::model::{TokenDocument, TokenGroup, TokenNode, TokenPath};
use crate::reference::Resolver;

/// Default theme name for legacy maps that carry none.
pub const DEFAULT_LEGACY_NAME: &str = "legacy";
/// Value recorded under `meta.migrated_from` for migrated documents.
pub const MIGRATED_FROM_LEGACY: &str = "legacy";

/// One legacy key and the token paths it maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegacyEntry {
    /// Legacy color key.
    pub key: &'static str,
    /// Canonical token path written on import and read first on export.
    pub path: &'static str,
    /// Paths consulted in order on export when the canonical path is absent.
    pub fallbacks: &'static [&'static str],
}

const fn entry(
    key: &'static str,
    path: &'static str,
    fallbacks: &'static [&'static str],
) -> LegacyEntry {
    LegacyEntry {
        key,
        path,
        fallbacks,
    }
}

/// Mapping between legacy color keys and token paths.
pub const LEGACY_TABLE: &[LegacyEntry] = &[
    entry("color_app_bg", "semantic.bg", &[]),
    entry("color_text", "semantic.text", &[]),
    entry("color_text_muted", "semantic.text-muted", &["semantic.text"]),
    entry("color_border", "semantic.border", &[]),
    entry("color_link", "semantic.link", &["semantic.primary"]),
    entry("color_primary", "semantic.primary", &[]),
    entry("color_secondary", "semantic.secondary", &[]),
    entry("color_danger", "semantic.danger", &[]),
    entry("color_success", "semantic.success", &[]),
    entry("color_warning", "semantic.warning", &[]),
    entry("color_button", "components.button.bg", &["semantic.primary"]),
    entry("color_button_text", "components.button.text", &[]),
    entry(
        "color_button_hover",
        "components.button.hover-bg",
        &["components.button.bg", "semantic.primary"],
    ),
    entry("color_grid_bg", "components.table.bg", &["semantic.bg"]),
    entry("color_grid_text", "components.table.text", &["semantic.text"]),
    entry("color_grid_header", "components.table.header-bg", &["semantic.primary"]),
    entry("color_grid_header_text", "components.table.header-text", &[]),
    entry("color_grid_border", "components.table.border", &["semantic.border"]),
    entry("color_grid_row_hover", "components.table.row-hover-bg", &[]),
    entry("color_input_bg", "components.input.bg", &["semantic.bg"]),
    entry("color_input_text", "components.input.text", &["semantic.text"]),
    entry("color_input_border", "components.input.border", &["semantic.border"]),
    entry("color_modal_bg", "components.modal.bg", &["semantic.bg"]),
    entry("color_modal_text", "components.modal.text", &["semantic.text"]),
    entry("color_modal_header", "components.modal.header-bg", &["components.header.bg"]),
    entry("color_header_bg", "components.header.bg", &["semantic.primary"]),
    entry("color_header_text", "components.header.text", &[]),
    entry("color_menu_bg", "components.menu.bg", &[]),
    entry("color_menu_text", "components.menu.text", &[]),
    entry("color_menu_active", "components.menu.active-bg", &["semantic.primary"]),
    entry("color_menu_hover", "components.menu.hover-bg", &[]),
];

/// Legacy metadata keys and the legacy spellings consulted for each.
const META_FALLBACKS: &[(&str, &[&str])] = &[
    ("description", &["descripcion", "description"]),
    ("icon", &["icon", "icono"]),
    ("dark", &["dark", "modo_oscuro"]),
];

const NAME_FALLBACKS: &[&str] = &["nombre", "name", "id"];

/// Flat legacy color map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LegacyColorMap(pub BTreeMap<String, Value>);

impl LegacyColorMap {
    /// Value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Keys that belong to the color table.
    pub fn color_keys(&self) -> impl Iterator<Item = &str> {
        self.0
            .keys()
            .map(String::as_str)
            .filter(|key| table_entry(key).is_some())
    }
}

impl From<Map<String, Value>> for LegacyColorMap {
    fn from(map: Map<String, Value>) -> Self {
        Self(map.into_iter().collect())
    }
}

impl From<LegacyColorMap> for Value {
    fn from(map: LegacyColorMap) -> Self {
        Self::Object(map.0.into_iter().collect())
    }
}

/// Find the table entry for a legacy key.
#[must_use]
pub fn table_entry(key: &str) -> Option<&'static LegacyEntry> {
    LEGACY_TABLE.iter().find(|entry| entry.key == key)
}

/// Export `document` as a legacy color map.
///
/// Each entry reads its canonical path, then its fallbacks, resolving
/// references; entries whose paths are all absent are omitted.
#[must_use]
pub fn to_legacy(document: &TokenDocument) -> LegacyColorMap {
    let resolver = Resolver::new(document);
    let mut colors = BTreeMap::new();
    for entry in LEGACY_TABLE {
        let found = std::iter::once(entry.path)
            .chain(entry.fallbacks.iter().copied())
            .find_map(|dotted| leaf_at(document, dotted));
        match found {
            Some(raw) => {
                colors.insert(entry.key.to_string(), resolver.resolve(raw).value);
            }
            None => debug!(key = entry.key, "no token for legacy key"),
        }
    }
    LegacyColorMap(colors)
}

/// Migrate a legacy color map into a new token document.
#[must_use]
pub fn from_legacy(legacy: &LegacyColorMap) -> TokenDocument {
    let name = NAME_FALLBACKS
        .iter()
        .find_map(|key| legacy.get(key).and_then(Value::as_str))
        .filter(|name| !name.trim().is_empty())
        .unwrap_or(DEFAULT_LEGACY_NAME)
        .to_string();

    let mut meta = Map::new();
    for (target, sources) in META_FALLBACKS {
        if let Some(value) = sources.iter().find_map(|key| legacy.get(key)) {
            meta.insert((*target).to_string(), value.clone());
        }
    }
    meta.insert(
        "migrated_from".to_string(),
        Value::String(MIGRATED_FROM_LEGACY.to_string()),
    );

    let mut document = TokenDocument {
        name,
        version: CURRENT_SCHEMA_VERSION,
        meta,
        palette: TokenGroup::new(),
        semantic: TokenGroup::new(),
        components: TokenGroup::new(),
    };

    for entry in LEGACY_TABLE {
        let Some(value) = legacy.get(entry.key) else {
            continue;
        };
        if value.is_object() {
            warn!(key = entry.key, "ignoring object legacy color value");
            continue;
        }
        match TokenPath::parse(entry.path) {
            Ok(path) => document.set_value(&path, value.clone()),
            Err(segment) => {
                warn!(key = entry.key, segment = %segment, "invalid legacy table path");
            }
        }
    }
    document
}

fn leaf_at<'a>(document: &'a TokenDocument, dotted: &str) -> Option<&'a Value> {
    let path = TokenPath::parse(dotted).ok()?;
    match document.lookup(&path)? {
        TokenNode::Value(value) => Some(value),
        TokenNode::Group(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeSet;

    fn full_map() -> LegacyColorMap {
        LegacyColorMap(
            LEGACY_TABLE
                .iter()
                .enumerate()
                .map(|(index, entry)| (entry.key.to_string(), json!(format!("#{index:06x}"))))
                .collect(),
        )
    }

    #[test]
    fn canonical_paths_are_distinct_and_never_nested() {
        let paths: BTreeSet<&str> = LEGACY_TABLE.iter().map(|entry| entry.path).collect();
        assert_eq!(paths.len(), LEGACY_TABLE.len());
        for outer in &paths {
            for inner in &paths {
                if outer != inner {
                    assert!(
                        !inner.starts_with(&format!("{outer}.")),
                        "{outer} is a prefix of {inner}"
                    );
                }
            }
        }
        for entry in LEGACY_TABLE {
            assert!(TokenPath::parse(entry.path).is_ok(), "{}", entry.path);
        }
    }

    #[test]
    fn full_key_set_round_trips_exactly() {
        let original = full_map();
        let document = from_legacy(&original);
        assert_eq!(to_legacy(&document), original);
    }

    #[test]
    fn full_key_set_with_mixed_literals_round_trips() {
        let original = LegacyColorMap(
            LEGACY_TABLE
                .iter()
                .enumerate()
                .map(|(index, entry)| {
                    let value = match index % 4 {
                        0 => json!(7),
                        1 => json!(index % 2 == 0),
                        2 => json!(format!("#{index:06x}")),
                        _ => json!(["Inter", "sans-serif"]),
                    };
                    (entry.key.to_string(), value)
                })
                .collect(),
        );
        let exported = to_legacy(&from_legacy(&original));
        assert_eq!(exported.len(), LEGACY_TABLE.len());
        assert_eq!(exported, original);
        assert_eq!(exported.color_keys().count(), LEGACY_TABLE.len());
    }

    #[test]
    fn partial_maps_survive_for_their_keys() {
        let original = LegacyColorMap(
            [
                ("color_button".to_string(), json!("#3498db")),
                ("color_button_text".to_string(), json!("#ffffff")),
            ]
            .into_iter()
            .collect(),
        );
        let exported = to_legacy(&from_legacy(&original));
        assert_eq!(exported.get("color_button"), Some(&json!("#3498db")));
        assert_eq!(exported.get("color_button_text"), Some(&json!("#ffffff")));
        assert_eq!(exported.get("color_button_hover"), Some(&json!("#3498db")));
    }

    #[test]
    fn metadata_fallbacks_apply() {
        let legacy = LegacyColorMap::from(
            json!({
                "nombre": "Oscuro",
                "descripcion": "Tema oscuro",
                "icono": "moon",
                "modo_oscuro": true,
                "color_text": "#eeeeee"
            })
            .as_object()
            .cloned()
            .unwrap_or_default(),
        );
        let document = from_legacy(&legacy);
        assert_eq!(document.name, "Oscuro");
        assert_eq!(document.meta["description"], json!("Tema oscuro"));
        assert_eq!(document.meta["icon"], json!("moon"));
        assert_eq!(document.meta["migrated_from"], json!("legacy"));
        assert!(document.is_dark());
        assert!(document.palette.is_empty());
        assert_eq!(document.version, CURRENT_SCHEMA_VERSION);
    }

    #[test]
    fn unnamed_maps_get_default_name_and_objects_are_dropped() {
        let legacy = LegacyColorMap(
            [
                ("color_text".to_string(), json!({ "base": "#000000" })),
                ("color_border".to_string(), json!(42)),
                ("color_app_bg".to_string(), json!("#ffffff")),
            ]
            .into_iter()
            .collect(),
        );
        let document = from_legacy(&legacy);
        assert_eq!(document.name, DEFAULT_LEGACY_NAME);
        assert!(!document.semantic.contains_key("text"));
        assert_eq!(document.semantic["border"], TokenNode::Value(json!(42)));
        assert_eq!(document.semantic["bg"], TokenNode::Value(json!("#ffffff")));
    }

    #[test]
    fn export_resolves_references() {
        let document = crate::validate::parse_document(json!({
            "name": "t1",
            "palette": { "blue": "#3498db" },
            "semantic": { "primary": "{palette.blue}" },
            "components": {}
        }))
        .expect("valid document");
        let exported = to_legacy(&document);
        assert_eq!(exported.get("color_primary"), Some(&json!("#3498db")));
        assert_eq!(exported.get("color_button"), Some(&json!("#3498db")));
        assert!(exported.get("color_text").is_none());
    }
}
