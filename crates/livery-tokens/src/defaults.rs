//! Shared constants for token documents.
//!
//! # Design
//! - Centralize schema and resolution limits so every stage agrees on them.

/// Schema version written into new documents and assumed when absent.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;
/// Maximum number of reference hops followed before giving up.
pub const MAX_REFERENCE_DEPTH: usize = 32;
/// Joiner used for flattened token keys.
pub const FLAT_KEY_SEPARATOR: char = '-';
/// Attribute carrying the theme name in emitted CSS selectors.
pub const DEFAULT_THEME_ATTRIBUTE: &str = "data-theme";
/// Contrast threshold for normal-size text (WCAG AA).
pub const NORMAL_TEXT_MIN_CONTRAST: f64 = 4.5;
/// Contrast threshold for large text and headers (WCAG AA).
pub const LARGE_TEXT_MIN_CONTRAST: f64 = 3.0;
