//! Client facade for S3-compatible object stores.
//!
//! This crate wraps a wire-level [`backend::StorageBackend`] in a typed,
//! ergonomic surface: validated names, tolerant deletes, lazily paged
//! listing streams, multi-call orchestrations (bucket upsert, recursive
//! delete, prefix purge, tag reconciliation), and a three-layer scope
//! cascade that threads regions, headers, and query parameters from
//! client defaults down to individual calls.
//!
//! # Architecture
//!
//! ```text
//! SiloClient (scope defaults, bucket lifecycle)
//!        |
//!        v
//!   Bucket / Object handles (per-resource scope layer)
//!        |
//!        v
//!   ops (multi-call flows: upsert, purge, tag reconcile)
//!        |
//!        v
//!   StorageBackend (one wire call per method)
//! ```

pub mod backend;
pub mod bucket;
pub mod client;
pub mod config;
pub mod error;
pub mod object;
mod ops;
pub mod resolve;

pub use bucket::Bucket;
pub use client::SiloClient;
pub use config::{ClientConfig, Credentials};
pub use error::{SiloError, SiloResult};
pub use object::Object;
