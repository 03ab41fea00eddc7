//! Core types and trait definitions for the Likeness photo library.
//!
//! This crate is deliberately free of database and image-decoding
//! dependencies. Storage backends implement [`store::LibraryStore`]; face
//! detection and metadata extraction are supplied by the caller through the
//! traits in [`ingest`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod capture;
pub mod embedding;
pub mod error;
pub mod face;
pub mod fingerprint;
pub mod ingest;
pub mod person;
pub mod photo;
pub mod resolve;
pub mod store;

pub use error::{Error, Result};
