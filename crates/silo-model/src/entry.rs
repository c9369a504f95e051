//! Metadata and listing rows exchanged with backend primitives.

use std::collections::BTreeMap;
use std::fmt;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use typed_builder::TypedBuilder;

use crate::error::WireCode;
use crate::name::{BucketName, ObjectKey, PATH_DELIMITER};
use crate::tags::TagSet;

/// Default listing page size and the multi-object delete batch ceiling.
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// A bucket as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketInfo {
    /// The bucket's name.
    pub name: BucketName,
    /// The region the bucket lives in, when the backend reports one.
    pub region: Option<String>,
    /// Creation timestamp, when the backend reports one.
    pub created_at: Option<DateTime<Utc>>,
}

/// Metadata for a stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectMeta {
    /// The bucket holding the object.
    pub bucket: BucketName,
    /// The object's key.
    pub key: ObjectKey,
    /// Payload size in bytes.
    pub size: u64,
    /// Entity tag assigned by the store.
    pub etag: String,
    /// Last modification timestamp.
    pub last_modified: DateTime<Utc>,
    /// MIME type recorded at upload, if any.
    pub content_type: Option<String>,
    /// User-defined metadata recorded at upload.
    pub user_meta: BTreeMap<String, String>,
}

/// A downloaded object: its metadata plus the full payload.
#[derive(Debug, Clone)]
pub struct ObjectDownload {
    /// Metadata describing the object.
    pub meta: ObjectMeta,
    /// The payload.
    pub body: Bytes,
}

/// Upload parameters for a single object.
#[derive(Debug, Clone, Default, PartialEq, Eq, TypedBuilder)]
pub struct PutOptions {
    /// MIME type to record with the object.
    #[builder(default, setter(strip_option, into))]
    pub content_type: Option<String>,
    /// Tags to attach atomically with the upload.
    #[builder(default)]
    pub tags: TagSet,
    /// User-defined metadata to record with the object.
    #[builder(default)]
    pub user_meta: BTreeMap<String, String>,
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// One row of an object listing.
///
/// Delimiter listings interleave common-prefix rows (`is_prefix`) with
/// object rows; versioned stores may also surface delete-marker rows
/// (`is_delete_marker`). Exactly the rows with [`ObjectEntry::is_live`]
/// describe objects that can be fetched or deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectEntry {
    /// The object key, or the common prefix for prefix rows.
    pub key: ObjectKey,
    /// Payload size in bytes; zero for prefix and delete-marker rows.
    pub size: u64,
    /// Entity tag; absent for prefix and delete-marker rows.
    pub etag: Option<String>,
    /// Last modification timestamp; absent for prefix rows.
    pub last_modified: Option<DateTime<Utc>>,
    /// Whether this row is a delete marker rather than a live object.
    pub is_delete_marker: bool,
    /// Whether this row is a common prefix produced by a delimiter listing.
    pub is_prefix: bool,
}

impl ObjectEntry {
    /// A row describing a live object.
    #[must_use]
    pub fn object(
        key: ObjectKey,
        size: u64,
        etag: impl Into<String>,
        last_modified: DateTime<Utc>,
    ) -> Self {
        Self {
            key,
            size,
            etag: Some(etag.into()),
            last_modified: Some(last_modified),
            is_delete_marker: false,
            is_prefix: false,
        }
    }

    /// A common-prefix row from a delimiter listing.
    #[must_use]
    pub fn prefix(key: ObjectKey) -> Self {
        Self {
            key,
            size: 0,
            etag: None,
            last_modified: None,
            is_delete_marker: false,
            is_prefix: true,
        }
    }

    /// A delete-marker row.
    #[must_use]
    pub fn delete_marker(key: ObjectKey, last_modified: DateTime<Utc>) -> Self {
        Self {
            key,
            size: 0,
            etag: None,
            last_modified: Some(last_modified),
            is_delete_marker: true,
            is_prefix: false,
        }
    }

    /// Whether this row describes a live object.
    #[must_use]
    pub fn is_live(&self) -> bool {
        !self.is_delete_marker && !self.is_prefix
    }
}

/// One page of an object listing.
#[derive(Debug, Clone, Default)]
pub struct ObjectPage {
    /// The rows on this page, in key order.
    pub entries: Vec<ObjectEntry>,
    /// Whether further pages exist.
    pub is_truncated: bool,
    /// Start-after marker for the next page when truncated.
    pub next_start_after: Option<String>,
}

/// Parameters for one object listing request.
#[derive(Debug, Clone, PartialEq, Eq, TypedBuilder)]
pub struct ListSpec {
    /// Only keys starting with this prefix are returned.
    #[builder(default, setter(strip_option, into))]
    pub prefix: Option<String>,
    /// Grouping delimiter; `None` lists recursively.
    #[builder(default, setter(strip_option, into))]
    pub delimiter: Option<String>,
    /// Keys at or before this marker are skipped.
    #[builder(default, setter(strip_option, into))]
    pub start_after: Option<String>,
    /// Maximum rows per page.
    #[builder(default = DEFAULT_PAGE_SIZE)]
    pub page_size: usize,
    /// Whether delete-marker rows are included.
    #[builder(default)]
    pub include_delete_markers: bool,
}

impl Default for ListSpec {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ListSpec {
    /// A recursive listing under a prefix (no delimiter grouping).
    #[must_use]
    pub fn recursive(prefix: impl Into<String>) -> Self {
        Self::builder().prefix(prefix).build()
    }

    /// A single-level listing under a prefix, grouped by the path
    /// delimiter.
    #[must_use]
    pub fn shallow(prefix: impl Into<String>) -> Self {
        Self::builder()
            .prefix(prefix)
            .delimiter(PATH_DELIMITER.to_string())
            .build()
    }
}

// ---------------------------------------------------------------------------
// Bulk delete
// ---------------------------------------------------------------------------

/// A single key that a bulk delete failed to remove.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteFailure {
    /// The key that could not be deleted.
    pub key: ObjectKey,
    /// The wire code the backend reported for this key.
    pub code: WireCode,
    /// The backend's message for this key.
    pub message: String,
}

impl fmt::Display for DeleteFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.key, self.code.as_str(), self.message)
    }
}
