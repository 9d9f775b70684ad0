//! CSS custom-property emission for flattened themes.
//!
//! # Design
//! - Emits a single rule block scoped by an attribute selector.
//! - Output order follows the flat map, so emission is deterministic.
//! - Values that could escape their declaration are dropped, never escaped.
//!   Balanced `{...}` groups are kept so unresolved references still emit.
//! - Keys that normalize to the same property collapse to one declaration;
//!   the last key in flat-map order wins.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::defaults::DEFAULT_THEME_ATTRIBUTE;
use crate::flatten::FlatTokenMap;

/// Selector and naming options for emitted CSS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CssOptions {
    /// Attribute matched by the rule selector.
    pub attribute: String,
    /// Prefix inserted after `--` on every property name.
    pub prefix: String,
}

impl Default for CssOptions {
    fn default() -> Self {
        Self {
            attribute: DEFAULT_THEME_ATTRIBUTE.to_string(),
            prefix: String::new(),
        }
    }
}

/// Emit the rule block for `theme_name` with default options.
#[must_use]
pub fn emit_css(theme_name: &str, tokens: &FlatTokenMap) -> String {
    emit_css_with(theme_name, tokens, &CssOptions::default())
}

/// Emit the rule block for `theme_name` using `options`.
#[must_use]
pub fn emit_css_with(theme_name: &str, tokens: &FlatTokenMap, options: &CssOptions) -> String {
    let mut css = format!(
        "[{}=\"{}\"] {{\n",
        property_name("", &options.attribute),
        escape_selector_value(theme_name)
    );
    let mut declarations: Vec<(String, String)> = Vec::new();
    let mut positions: BTreeMap<String, usize> = BTreeMap::new();
    for (key, value) in tokens {
        let Some(rendered) = render_value(value) else {
            continue;
        };
        if !is_safe_value(&rendered) {
            warn!(
                theme = theme_name,
                token = %key,
                "skipping css value that would break the declaration"
            );
            continue;
        }
        let property = property_name(&options.prefix, key);
        if let Some(&index) = positions.get(&property) {
            warn!(
                theme = theme_name,
                token = %key,
                property = %property,
                "css property collision; later token wins"
            );
            declarations[index].1 = rendered;
            continue;
        }
        positions.insert(property.clone(), declarations.len());
        declarations.push((property, rendered));
    }
    for (property, rendered) in &declarations {
        let _ = writeln!(css, "  --{property}: {rendered};");
    }
    css.push_str("}\n");
    css
}

/// Normalize a token key into a custom-property name (without `--`).
#[must_use]
pub fn property_name(prefix: &str, key: &str) -> String {
    let joined = if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}-{key}")
    };
    joined
        .chars()
        .map(|ch| {
            let ch = ch.to_ascii_lowercase();
            if ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-' {
                ch
            } else {
                '-'
            }
        })
        .collect()
}

fn render_value(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Object(_) => None,
        Value::String(text) => Some(text.clone()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Number(number) => Some(number.to_string()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(render_value)
                .collect::<Vec<_>>()
                .join(", "),
        ),
    }
}

fn is_safe_value(rendered: &str) -> bool {
    if rendered.contains([';', '\n', '\r']) {
        return false;
    }
    let mut depth = 0_usize;
    for ch in rendered.chars() {
        match ch {
            '{' => depth += 1,
            '}' => match depth.checked_sub(1) {
                Some(next) => depth = next,
                None => return false,
            },
            _ => {}
        }
    }
    depth == 0
}

fn escape_selector_value(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if ch.is_control() {
            let _ = write!(escaped, "\\{:x} ", u32::from(ch));
            continue;
        }
        if matches!(ch, '\\' | '"') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tokens() -> FlatTokenMap {
        [
            ("primary", json!("#3498db")),
            ("button-bg", json!("#3498db")),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn emits_scoped_rule_block() {
        let css = emit_css("t1", &tokens());
        assert_eq!(
            css,
            "[data-theme=\"t1\"] {\n  --button-bg: #3498db;\n  --primary: #3498db;\n}\n"
        );
    }

    #[test]
    fn emission_is_idempotent() {
        let flat = tokens();
        assert_eq!(emit_css("t1", &flat), emit_css("t1", &flat));
    }

    #[test]
    fn property_names_are_normalized() {
        assert_eq!(property_name("", "Button_BG.hover"), "button-bg-hover");
        assert_eq!(property_name("lv", "primary"), "lv-primary");
    }

    #[test]
    fn values_render_by_type() {
        let flat: FlatTokenMap = [
            ("gap", json!(8)),
            ("rounded", json!(true)),
            ("font", json!(["Inter", "sans-serif"])),
            ("unset", Value::Null),
        ]
        .into_iter()
        .collect();
        let css = emit_css("t1", &flat);
        assert!(css.contains("  --gap: 8;\n"));
        assert!(css.contains("  --rounded: true;\n"));
        assert!(css.contains("  --font: Inter, sans-serif;\n"));
        assert!(!css.contains("--unset"));
    }

    #[test]
    fn unsafe_values_are_skipped() {
        let flat: FlatTokenMap = [
            ("evil", json!("red; } body { color: blue")),
            ("ok", json!("red")),
        ]
        .into_iter()
        .collect();
        let css = emit_css("t1", &flat);
        assert!(!css.contains("--evil"));
        assert!(css.contains("--ok: red;"));
    }

    #[test]
    fn unbalanced_braces_are_skipped() {
        let flat: FlatTokenMap = [
            ("open", json!("{palette.blue")),
            ("close", json!("palette.blue}")),
            ("ok", json!("red")),
        ]
        .into_iter()
        .collect();
        let css = emit_css("t1", &flat);
        assert!(!css.contains("--open"));
        assert!(!css.contains("--close"));
        assert!(css.contains("--ok: red;"));
    }

    #[test]
    fn unresolved_references_keep_their_declaration() {
        let flat: FlatTokenMap = [
            ("primary", json!("#3498db")),
            ("ghost", json!("{palette.nope}")),
        ]
        .into_iter()
        .collect();
        let css = emit_css("t1", &flat);
        assert_eq!(css.matches(": ").count(), 2);
        assert!(css.contains("  --ghost: {palette.nope};\n"));
    }

    #[test]
    fn colliding_property_names_emit_once() {
        let flat: FlatTokenMap = [
            ("Primary", json!("#000000")),
            ("primary", json!("#ffffff")),
        ]
        .into_iter()
        .collect();
        let css = emit_css("t1", &flat);
        assert_eq!(css.matches("--primary:").count(), 1);
        assert!(css.contains("  --primary: #ffffff;\n"));
    }

    #[test]
    fn control_characters_in_theme_names_are_hex_escaped() {
        let css = emit_css("a\"]{}\nb", &tokens());
        let selector = css.lines().next().unwrap_or_default();
        assert_eq!(selector, "[data-theme=\"a\\\"]{}\\a b\"] {");
        assert_eq!(css.matches('\n').count(), 4);
    }

    #[test]
    fn custom_options_and_escaping() {
        let options = CssOptions {
            attribute: "data-brand".into(),
            prefix: "lv".into(),
        };
        let css = emit_css_with("a\"b", &tokens(), &options);
        assert!(css.starts_with("[data-brand=\"a\\\"b\"] {\n"));
        assert!(css.contains("--lv-primary: #3498db;"));
    }
}
