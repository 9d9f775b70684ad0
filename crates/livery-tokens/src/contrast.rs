//! WCAG contrast checks for color pairs and flattened themes.
//!
//! # Design
//! - Only six-digit hex colors are accepted; anything else is a caller error.
//! - Ratios are rounded to two decimals before comparison so reports and
//!   verdicts always agree.
//! - Theme audits are advisory and never fail.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::defaults::{LARGE_TEXT_MIN_CONTRAST, NORMAL_TEXT_MIN_CONTRAST};
use crate::error::{TokenError, TokenResult};
use crate::flatten::FlatTokenMap;

/// An sRGB color parsed from `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HexColor {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl HexColor {
    /// WCAG relative luminance in `0.0..=1.0`.
    #[must_use]
    pub fn relative_luminance(self) -> f64 {
        fn channel(value: u8) -> f64 {
            let c = f64::from(value) / 255.0;
            if c <= 0.03928 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        0.2126 * channel(self.r) + 0.7152 * channel(self.g) + 0.0722 * channel(self.b)
    }
}

impl FromStr for HexColor {
    type Err = TokenError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let malformed = |reason| TokenError::MalformedColor {
            value: raw.to_string(),
            reason,
        };
        let digits = raw.trim().strip_prefix('#').unwrap_or_else(|| raw.trim());
        if digits.len() != 6 {
            return Err(malformed("expected six hex digits"));
        }
        if !digits.chars().all(|ch| ch.is_ascii_hexdigit()) {
            return Err(malformed("contains non-hex characters"));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .map_err(|_| malformed("contains non-hex characters"))
        };
        Ok(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }
}

impl Display for HexColor {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Text size bucket deciding the contrast threshold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeClass {
    /// Body text.
    #[default]
    Normal,
    /// Large text (18pt, or 14pt bold).
    Large,
    /// Headers.
    Header,
}

impl SizeClass {
    /// Minimum ratio required for this size.
    #[must_use]
    pub const fn threshold(self) -> f64 {
        match self {
            Self::Normal => NORMAL_TEXT_MIN_CONTRAST,
            Self::Large | Self::Header => LARGE_TEXT_MIN_CONTRAST,
        }
    }

    /// Parse a label; unknown labels fall back to `Normal`.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "large" => Self::Large,
            "header" => Self::Header,
            _ => Self::Normal,
        }
    }

    /// Stable label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Large => "large",
            Self::Header => "header",
        }
    }
}

impl Display for SizeClass {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Outcome of a single contrast check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContrastReport {
    /// Normalized foreground color.
    pub foreground: String,
    /// Normalized background color.
    pub background: String,
    /// Ratio rounded to two decimals.
    pub ratio: f64,
    /// Whether the ratio meets the threshold.
    pub passes: bool,
    /// Threshold applied.
    pub threshold: f64,
    /// Size bucket checked.
    pub size: SizeClass,
    /// Remediation hint for failing pairs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Raw contrast ratio between two colors, unrounded.
#[must_use]
pub fn contrast_ratio(foreground: HexColor, background: HexColor) -> f64 {
    let first = foreground.relative_luminance();
    let second = background.relative_luminance();
    let (lighter, darker) = if first >= second {
        (first, second)
    } else {
        (second, first)
    };
    (lighter + 0.05) / (darker + 0.05)
}

/// Check `foreground` on `background` for the given size bucket.
///
/// # Errors
///
/// Returns [`TokenError::MalformedColor`] when either color is not six hex
/// digits.
pub fn validate_contrast(
    foreground: &str,
    background: &str,
    size: SizeClass,
) -> TokenResult<ContrastReport> {
    let fg: HexColor = foreground.parse()?;
    let bg: HexColor = background.parse()?;
    let ratio = (contrast_ratio(fg, bg) * 100.0).round() / 100.0;
    let threshold = size.threshold();
    let passes = ratio >= threshold;
    let note = (!passes).then(|| {
        format!(
            "contrast {ratio:.2}:1 is below the {threshold:.1}:1 minimum for {size} text; \
             darken or lighten one of the colors"
        )
    });
    Ok(ContrastReport {
        foreground: fg.to_string(),
        background: bg.to_string(),
        ratio,
        passes,
        threshold,
        size,
        note,
    })
}

/// Foreground/background slot pair audited in a flattened theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContrastPair {
    /// Human label for the pair.
    pub label: &'static str,
    /// Flat key of the text color.
    pub foreground: &'static str,
    /// Flat key of the background color.
    pub background: &'static str,
    /// Size bucket applied.
    pub size: SizeClass,
}

const fn pair(
    label: &'static str,
    foreground: &'static str,
    background: &'static str,
    size: SizeClass,
) -> ContrastPair {
    ContrastPair {
        label,
        foreground,
        background,
        size,
    }
}

/// Slot pairs checked by [`audit_contrast`].
pub const CONTRAST_PAIRS: [ContrastPair; 8] = [
    pair("base text", "text", "bg", SizeClass::Normal),
    pair("button", "button-text", "button-bg", SizeClass::Normal),
    pair("input", "input-text", "input-bg", SizeClass::Normal),
    pair("table header", "table-header-text", "table-header-bg", SizeClass::Header),
    pair("table body", "table-text", "table-bg", SizeClass::Normal),
    pair("modal", "modal-text", "modal-bg", SizeClass::Normal),
    pair("header", "header-text", "header-bg", SizeClass::Header),
    pair("menu", "menu-text", "menu-bg", SizeClass::Normal),
];

/// One audited pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditEntry {
    /// Pair label.
    pub label: &'static str,
    /// Contrast outcome.
    #[serde(flatten)]
    pub report: ContrastReport,
}

/// Check every known slot pair present in `tokens`.
///
/// Pairs with a missing slot or a value that is not a hex color are skipped.
#[must_use]
pub fn audit_contrast(tokens: &FlatTokenMap) -> Vec<AuditEntry> {
    CONTRAST_PAIRS
        .iter()
        .filter_map(|pair| {
            let foreground = tokens.get_str(pair.foreground)?;
            let background = tokens.get_str(pair.background)?;
            match validate_contrast(foreground, background, pair.size) {
                Ok(report) => Some(AuditEntry {
                    label: pair.label,
                    report,
                }),
                Err(err) => {
                    debug!(pair = pair.label, error = %err.detail(), "skipping contrast pair");
                    None
                }
            }
        })
        .collect()
}
