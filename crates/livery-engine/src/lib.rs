#![forbid(unsafe_code)]
#![deny(unused_must_use, rustdoc::broken_intra_doc_links, rustdoc::bare_urls)]
#![warn(missing_docs, unreachable_pub, clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

//! Theme orchestration: loading, applying, persisting and restoring themes.
//!
//! Layout: `engine.rs` (`ThemeEngine`), `store.rs` (compiled cache and
//! lifecycle state), `storage.rs` and `surface.rs` (side-effect seams),
//! `source.rs` (theme retrieval), `config.rs` (engine settings).

pub mod config;
pub mod engine;
pub mod error;
pub mod source;
pub mod storage;
pub mod store;
pub mod surface;

pub use config::{
    DEFAULT_STYLE_NODE_ID, DOCUMENT_STORAGE_KEY, EngineConfig, NAME_STORAGE_KEY, StorageKeys,
};
pub use engine::ThemeEngine;
pub use error::{EngineError, EngineResult, StorageError, StorageResult};
pub use source::{DirectorySource, MemorySource, ThemeSource};
pub use storage::{FileStorage, MemoryStorage, ThemeStorage};
pub use store::{CompiledTheme, EngineState};
pub use surface::{FileSurface, MemorySurface, StyleSurface};
