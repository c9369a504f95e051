//! Per-operation request structs for the facade surface.
//!
//! Every request carries an optional call-scope [`ScopeConfig`] that
//! participates in the configuration cascade. Requests whose only required
//! field is a name or key also build from a plain string, so the common
//! path stays a one-liner:
//!
//! ```
//! use silo_model::request::GetBucketRequest;
//!
//! let simple: GetBucketRequest = "photos".into();
//! let scoped = GetBucketRequest::builder()
//!     .name("photos")
//!     .scope(silo_model::scope::ScopeConfig::builder().region("eu-west-1").build())
//!     .build();
//! assert_eq!(simple.name, scoped.name);
//! ```

use bytes::Bytes;
use typed_builder::TypedBuilder;

use crate::entry::{DEFAULT_PAGE_SIZE, PutOptions};
use crate::scope::ScopeConfig;
use crate::tags::TagSet;

/// Generate `From<&str>` / `From<String>` for requests whose only required
/// field is a single string.
macro_rules! impl_from_str {
    ($request:ty, $field:ident) => {
        impl From<&str> for $request {
            fn from(value: &str) -> Self {
                Self::builder().$field(value).build()
            }
        }

        impl From<String> for $request {
            fn from(value: String) -> Self {
                Self::builder().$field(value).build()
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Bucket requests
// ---------------------------------------------------------------------------

/// Create a bucket, optionally tagging it in the same operation.
#[derive(Debug, Clone, TypedBuilder)]
pub struct CreateBucketRequest {
    /// Name of the bucket to create.
    #[builder(setter(into))]
    pub name: String,
    /// Tags applied right after creation; empty means no tagging call.
    #[builder(default)]
    pub tags: TagSet,
    /// Call-scope configuration.
    #[builder(default)]
    pub scope: ScopeConfig,
}

impl_from_str!(CreateBucketRequest, name);

/// Create a bucket if it does not exist, otherwise adopt the existing one.
#[derive(Debug, Clone, TypedBuilder)]
pub struct UpsertBucketRequest {
    /// Name of the bucket to create or adopt.
    #[builder(setter(into))]
    pub name: String,
    /// Tags applied after a fresh create (and after a collision when
    /// `tag_on_collision` is set).
    #[builder(default)]
    pub tags: TagSet,
    /// Also apply `tags` when the bucket already existed.
    #[builder(default)]
    pub tag_on_collision: bool,
    /// Call-scope configuration.
    #[builder(default)]
    pub scope: ScopeConfig,
}

impl_from_str!(UpsertBucketRequest, name);

/// Look up a bucket's record.
#[derive(Debug, Clone, TypedBuilder)]
pub struct GetBucketRequest {
    /// Name of the bucket to look up.
    #[builder(setter(into))]
    pub name: String,
    /// Call-scope configuration.
    #[builder(default)]
    pub scope: ScopeConfig,
}

impl_from_str!(GetBucketRequest, name);

/// Check whether a bucket exists.
#[derive(Debug, Clone, TypedBuilder)]
pub struct BucketExistsRequest {
    /// Name of the bucket to check.
    #[builder(setter(into))]
    pub name: String,
    /// Call-scope configuration.
    #[builder(default)]
    pub scope: ScopeConfig,
}

impl_from_str!(BucketExistsRequest, name);

/// Delete an empty bucket, tolerating one that is already gone.
#[derive(Debug, Clone, TypedBuilder)]
pub struct DeleteBucketRequest {
    /// Name of the bucket to delete.
    #[builder(setter(into))]
    pub name: String,
    /// Call-scope configuration.
    #[builder(default)]
    pub scope: ScopeConfig,
}

impl_from_str!(DeleteBucketRequest, name);

/// Empty a bucket and then delete it.
#[derive(Debug, Clone, TypedBuilder)]
pub struct RecursiveBucketDeleteRequest {
    /// Name of the bucket to remove.
    #[builder(setter(into))]
    pub name: String,
    /// Listing page size and multi-delete batch size.
    #[builder(default = DEFAULT_PAGE_SIZE)]
    pub page_size: usize,
    /// Call-scope configuration.
    #[builder(default)]
    pub scope: ScopeConfig,
}

impl_from_str!(RecursiveBucketDeleteRequest, name);

/// List all buckets visible to the caller.
#[derive(Debug, Clone, Default, TypedBuilder)]
pub struct ListBucketsRequest {
    /// Call-scope configuration.
    #[builder(default)]
    pub scope: ScopeConfig,
}

// ---------------------------------------------------------------------------
// Object requests
// ---------------------------------------------------------------------------

/// Upload an object.
#[derive(Debug, Clone, TypedBuilder)]
pub struct PutObjectRequest {
    /// Key to store the object under.
    #[builder(setter(into))]
    pub key: String,
    /// The payload.
    #[builder(setter(into))]
    pub body: Bytes,
    /// Content type, tags, and user metadata for the upload.
    #[builder(default)]
    pub options: PutOptions,
    /// Call-scope configuration.
    #[builder(default)]
    pub scope: ScopeConfig,
}

/// Download an object's payload and metadata.
#[derive(Debug, Clone, TypedBuilder)]
pub struct GetObjectRequest {
    /// Key of the object to fetch.
    #[builder(setter(into))]
    pub key: String,
    /// Call-scope configuration.
    #[builder(default)]
    pub scope: ScopeConfig,
}

impl_from_str!(GetObjectRequest, key);

/// Fetch an object's metadata without its payload.
#[derive(Debug, Clone, TypedBuilder)]
pub struct StatObjectRequest {
    /// Key of the object to stat.
    #[builder(setter(into))]
    pub key: String,
    /// Call-scope configuration.
    #[builder(default)]
    pub scope: ScopeConfig,
}

impl_from_str!(StatObjectRequest, key);

/// Delete one object, tolerating one that is already gone.
#[derive(Debug, Clone, TypedBuilder)]
pub struct DeleteObjectRequest {
    /// Key of the object to delete.
    #[builder(setter(into))]
    pub key: String,
    /// Call-scope configuration.
    #[builder(default)]
    pub scope: ScopeConfig,
}

impl_from_str!(DeleteObjectRequest, key);

/// Delete an explicit set of objects in batches.
#[derive(Debug, Clone, TypedBuilder)]
pub struct DeleteObjectsRequest {
    /// Keys to delete.
    pub keys: Vec<String>,
    /// Multi-delete batch size.
    #[builder(default = DEFAULT_PAGE_SIZE)]
    pub page_size: usize,
    /// Call-scope configuration.
    #[builder(default)]
    pub scope: ScopeConfig,
}

/// Ensure a zero-byte object exists at a key.
#[derive(Debug, Clone, TypedBuilder)]
pub struct TouchObjectRequest {
    /// Key of the object to touch.
    #[builder(setter(into))]
    pub key: String,
    /// Replace the object with a fresh zero-byte one even if it exists.
    #[builder(default)]
    pub overwrite: bool,
    /// Call-scope configuration.
    #[builder(default)]
    pub scope: ScopeConfig,
}

impl_from_str!(TouchObjectRequest, key);

/// Stream all objects under a prefix, recursively.
#[derive(Debug, Clone, TypedBuilder)]
pub struct ListObjectsRequest {
    /// Only keys starting with this prefix are returned.
    #[builder(default, setter(strip_option, into))]
    pub prefix: Option<String>,
    /// Listing page size.
    #[builder(default = DEFAULT_PAGE_SIZE)]
    pub page_size: usize,
    /// Include delete-marker rows in the stream.
    #[builder(default)]
    pub include_delete_markers: bool,
    /// Call-scope configuration.
    #[builder(default)]
    pub scope: ScopeConfig,
}

impl Default for ListObjectsRequest {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// List one directory level under a prefix, grouping children by the path
/// delimiter.
#[derive(Debug, Clone, TypedBuilder)]
pub struct ListDirRequest {
    /// Directory prefix to list under; empty lists the bucket root.
    #[builder(default, setter(strip_option, into))]
    pub prefix: Option<String>,
    /// Listing page size.
    #[builder(default = DEFAULT_PAGE_SIZE)]
    pub page_size: usize,
    /// Call-scope configuration.
    #[builder(default)]
    pub scope: ScopeConfig,
}

impl Default for ListDirRequest {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Delete every object under a prefix.
#[derive(Debug, Clone, TypedBuilder)]
pub struct PurgePrefixRequest {
    /// Prefix whose objects are removed; empty purges the whole bucket.
    #[builder(default, setter(into))]
    pub prefix: String,
    /// Listing page size and multi-delete batch size.
    #[builder(default = DEFAULT_PAGE_SIZE)]
    pub page_size: usize,
    /// Call-scope configuration.
    #[builder(default)]
    pub scope: ScopeConfig,
}

impl_from_str!(PurgePrefixRequest, prefix);

/// Delete a directory: its marker object and, when `recursive`, everything
/// underneath it.
#[derive(Debug, Clone, TypedBuilder)]
pub struct DeleteDirRequest {
    /// The directory path; a trailing delimiter is implied.
    #[builder(setter(into))]
    pub path: String,
    /// Also remove every object under the directory.
    #[builder(default)]
    pub recursive: bool,
    /// Listing page size and multi-delete batch size.
    #[builder(default = DEFAULT_PAGE_SIZE)]
    pub page_size: usize,
    /// Call-scope configuration.
    #[builder(default)]
    pub scope: ScopeConfig,
}

impl_from_str!(DeleteDirRequest, path);

// ---------------------------------------------------------------------------
// Tag requests
// ---------------------------------------------------------------------------

/// Fetch the full tag set of a bucket or object.
#[derive(Debug, Clone, Default, TypedBuilder)]
pub struct GetTagsRequest {
    /// Call-scope configuration.
    #[builder(default)]
    pub scope: ScopeConfig,
}

/// Attach tags to a bucket or object.
#[derive(Debug, Clone, TypedBuilder)]
pub struct PutTagsRequest {
    /// The tags to attach; an empty set makes the operation a no-op.
    pub tags: TagSet,
    /// Call-scope configuration.
    #[builder(default)]
    pub scope: ScopeConfig,
}

impl From<TagSet> for PutTagsRequest {
    fn from(tags: TagSet) -> Self {
        Self::builder().tags(tags).build()
    }
}

/// Delete only the named tag keys, keeping the rest.
#[derive(Debug, Clone, TypedBuilder)]
pub struct DeleteTagsRequest {
    /// Keys to remove; keys not present on the resource are ignored.
    pub keys: Vec<String>,
    /// Call-scope configuration.
    #[builder(default)]
    pub scope: ScopeConfig,
}

impl<K: Into<String>> FromIterator<K> for DeleteTagsRequest {
    fn from_iter<T: IntoIterator<Item = K>>(iter: T) -> Self {
        Self::builder()
            .keys(iter.into_iter().map(Into::into).collect())
            .build()
    }
}

/// Delete every tag on a bucket or object.
#[derive(Debug, Clone, Default, TypedBuilder)]
pub struct DeleteAllTagsRequest {
    /// Call-scope configuration.
    #[builder(default)]
    pub scope: ScopeConfig,
}
