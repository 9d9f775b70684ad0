#![forbid(unsafe_code)]
#![deny(unused_must_use, rustdoc::broken_intra_doc_links, rustdoc::bare_urls)]
#![warn(missing_docs, unreachable_pub, clippy::all, clippy::pedantic, clippy::nursery)]

//! Shared test helpers used across integration suites.
//! Layout: fixtures.rs (sample theme payloads and file helpers).

pub mod fixtures;
