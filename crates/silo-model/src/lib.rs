//! Data model for the silo object-store facade.
//!
//! This crate carries the vocabulary shared by the facade and its backend
//! collaborators: validated resource names, tag sets, per-scope request
//! configuration, listing rows, and the wire-level error types. It has no
//! I/O of its own; the mechanisms that act on these types live in
//! `silo-core`.

pub mod entry;
pub mod error;
pub mod name;
pub mod request;
pub mod scope;
pub mod tags;

pub use entry::{
    BucketInfo, DEFAULT_PAGE_SIZE, DeleteFailure, ListSpec, ObjectDownload, ObjectEntry,
    ObjectMeta, ObjectPage, PutOptions,
};
pub use error::{BackendError, ErrorResponse, WireCode};
pub use name::{BucketName, NameError, ObjectKey, PATH_DELIMITER};
pub use scope::{ParamMap, ResolvedScope, ScopeConfig};
pub use tags::{MAX_TAGS, TagError, TagSet};
