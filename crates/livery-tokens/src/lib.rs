#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls
)]
#![warn(
    missing_docs,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]

//! Design-token model and the pure pipeline stages built on it.
//!
//! Layout: `model.rs` (typed documents and overrides), `validate.rs` (JSON
//! boundary), `reference.rs` (reference resolution), `flatten.rs`,
//! `merge.rs`, `css.rs`, `contrast.rs` and `legacy.rs` (legacy color maps).

pub mod contrast;
pub mod css;
pub mod defaults;
pub mod error;
pub mod flatten;
pub mod legacy;
pub mod merge;
pub mod model;
pub mod reference;
pub mod validate;

pub use contrast::{
    AuditEntry, CONTRAST_PAIRS, ContrastPair, ContrastReport, HexColor, SizeClass,
    audit_contrast, contrast_ratio, validate_contrast,
};
pub use css::{CssOptions, emit_css, emit_css_with, property_name};
pub use defaults::{CURRENT_SCHEMA_VERSION, MAX_REFERENCE_DEPTH};
pub use error::{TokenError, TokenResult};
pub use flatten::{
    FlatTokenMap, FlatUnresolved, FlattenReport, flat_key, flatten, flatten_with_depth,
    flatten_with_report,
};
pub use legacy::{LEGACY_TABLE, LegacyColorMap, LegacyEntry, from_legacy, to_legacy};
pub use merge::{merge, merge_groups, merge_json};
pub use model::{Layer, OverrideDocument, TokenDocument, TokenGroup, TokenNode, TokenPath};
pub use reference::{
    Resolution, Resolver, UnresolvedReason, UnresolvedReference, is_reference, resolve,
};
pub use validate::{ensure_required_fields, parse_document, parse_overrides};
