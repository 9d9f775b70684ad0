#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    unreachable_pub,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls
)]
#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::redundant_pub_crate)]

//! Command-line front end for the Livery theme engine.
//!
//! Layout:
//! - `cli.rs`: argument parsing, logging setup and command dispatch
//! - `commands/`: command handlers grouped by concern
//! - `error.rs`: CLI error type and exit codes
//! - `output.rs`: renderers and formatting helpers
//! - `main.rs`: thin entrypoint delegating to `run()`

pub(crate) mod cli;
pub(crate) mod commands;
pub(crate) mod error;
pub(crate) mod output;

pub use cli::run;
