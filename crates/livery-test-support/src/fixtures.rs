//! Sample theme payloads and file helpers.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde_json::{Value, json};

/// The smallest useful document: one palette color bound through a role.
#[must_use]
pub fn minimal_theme(name: &str) -> Value {
    json!({
        "name": name,
        "palette": { "blue": "#3498db" },
        "semantic": { "primary": "{palette.blue}" },
        "components": { "button": { "bg": "{semantic.primary}" } }
    })
}

/// A light theme covering every audited component slot.
#[must_use]
pub fn light_theme() -> Value {
    json!({
        "name": "light",
        "version": 1,
        "meta": { "description": "Default light theme", "icon": "sun", "dark": false },
        "palette": {
            "white": "#ffffff",
            "ink": "#1f2933",
            "grey": { "100": "#f5f7fa", "300": "#cbd2d9", "600": "#52606d" },
            "blue": "#1d4ed8",
            "red": "#b91c1c",
            "green": "#15803d",
            "amber": "#b45309"
        },
        "semantic": {
            "bg": "{palette.white}",
            "text": "{palette.ink}",
            "text_muted": "{palette.grey.600}",
            "border": "{palette.grey.300}",
            "primary": "{palette.blue}",
            "danger": "{palette.red}",
            "success": "{palette.green}",
            "warning": "{palette.amber}"
        },
        "components": {
            "button": { "bg": "{semantic.primary}", "text": "{palette.white}" },
            "input": {
                "bg": "{semantic.bg}",
                "text": "{semantic.text}",
                "border": "{semantic.border}"
            },
            "table": {
                "bg": "{semantic.bg}",
                "text": "{semantic.text}",
                "header_bg": "{palette.grey.100}",
                "header_text": "{semantic.text}"
            },
            "modal": { "bg": "{semantic.bg}", "text": "{semantic.text}" },
            "header": { "bg": "{semantic.primary}", "text": "{palette.white}" },
            "menu": { "bg": "{palette.grey.100}", "text": "{semantic.text}" }
        }
    })
}

/// A dark theme with a deliberately weak menu pairing.
#[must_use]
pub fn dark_theme() -> Value {
    json!({
        "name": "dark",
        "meta": { "dark": true, "icon": "moon" },
        "palette": {
            "black": "#111111",
            "white": "#f0f0f0",
            "slate": "#333333",
            "blue": "#60a5fa"
        },
        "semantic": {
            "bg": "{palette.black}",
            "text": "{palette.white}",
            "primary": "{palette.blue}"
        },
        "components": {
            "button": { "bg": "{semantic.primary}", "text": "{palette.black}" },
            "menu": { "bg": "{palette.black}", "text": "{palette.slate}" }
        }
    })
}

/// A document whose semantic roles reference each other in a loop.
#[must_use]
pub fn cyclic_theme() -> Value {
    json!({
        "name": "loop",
        "palette": {},
        "semantic": { "a": "{semantic.b}", "b": "{semantic.a}", "ok": "#ffffff" },
        "components": {}
    })
}

/// A legacy color map in the old flat naming scheme.
#[must_use]
pub fn legacy_colors() -> Value {
    json!({
        "nombre": "Clasico",
        "descripcion": "Tema heredado",
        "icono": "star",
        "color_app_bg": "#fafafa",
        "color_text": "#222222",
        "color_button": "#3498db",
        "color_button_text": "#ffffff",
        "color_grid_header": "#2c3e50",
        "color_grid_header_text": "#ecf0f1"
    })
}

/// Write `value` as pretty JSON to `<dir>/<name>.json`.
///
/// # Errors
///
/// Returns an error when the file cannot be serialized or written.
pub fn write_theme(dir: &Path, name: &str, value: &Value) -> anyhow::Result<PathBuf> {
    let path = dir.join(format!("{name}.json"));
    let body = serde_json::to_string_pretty(value).context("failed to serialize fixture")?;
    fs::write(&path, body).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}
