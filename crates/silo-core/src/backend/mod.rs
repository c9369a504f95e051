//! The backend collaborator boundary.
//!
//! Everything wire-shaped lives behind [`StorageBackend`]: signing,
//! transport, and envelope handling are the implementor's problem, and the
//! facade never sees them. Implementations decode store failures into
//! [`BackendError`](silo_model::BackendError) responses where a wire code
//! was present, and wrap everything else as transport errors.
//!
//! The crate ships one implementation, [`memory::InMemoryBackend`], used by
//! the test-suite and for offline development.

use async_trait::async_trait;
use bytes::Bytes;

use silo_model::{
    BackendError, BucketInfo, BucketName, DeleteFailure, ListSpec, ObjectDownload, ObjectKey,
    ObjectMeta, ObjectPage, PutOptions, ResolvedScope, TagSet,
};

pub mod memory;

/// Result alias for backend primitives.
pub type BackendResult<T> = Result<T, BackendError>;

/// Largest key batch one [`StorageBackend::delete_objects`] call accepts.
pub const MAX_DELETE_BATCH: usize = 1000;

/// The primitive operations the facade composes.
///
/// Every method receives the already-resolved per-call configuration; the
/// cascade has happened before the backend is involved. Implementations
/// apply `scope.region` to endpoint selection and attach `scope.headers` /
/// `scope.query` to the outgoing request.
#[async_trait]
pub trait StorageBackend: Send + Sync + std::fmt::Debug {
    /// Create a bucket.
    async fn create_bucket(&self, bucket: &BucketName, scope: &ResolvedScope) -> BackendResult<()>;

    /// Delete an empty bucket.
    async fn delete_bucket(&self, bucket: &BucketName, scope: &ResolvedScope) -> BackendResult<()>;

    /// Whether a bucket exists.
    async fn bucket_exists(
        &self,
        bucket: &BucketName,
        scope: &ResolvedScope,
    ) -> BackendResult<bool>;

    /// List all buckets visible to the caller, sorted by name.
    async fn list_buckets(&self, scope: &ResolvedScope) -> BackendResult<Vec<BucketInfo>>;

    /// List one page of objects in a bucket.
    async fn list_objects(
        &self,
        bucket: &BucketName,
        spec: &ListSpec,
        scope: &ResolvedScope,
    ) -> BackendResult<ObjectPage>;

    /// Store an object and return its metadata.
    async fn put_object(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        body: Bytes,
        options: &PutOptions,
        scope: &ResolvedScope,
    ) -> BackendResult<ObjectMeta>;

    /// Fetch an object's payload and metadata.
    async fn get_object(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        scope: &ResolvedScope,
    ) -> BackendResult<ObjectDownload>;

    /// Fetch an object's metadata without its payload.
    async fn stat_object(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        scope: &ResolvedScope,
    ) -> BackendResult<ObjectMeta>;

    /// Delete one object. Reports `NoSuchKey` when the key is absent, so
    /// tolerant callers can tell a removal from a no-op.
    async fn delete_object(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        scope: &ResolvedScope,
    ) -> BackendResult<()>;

    /// Delete a batch of at most [`MAX_DELETE_BATCH`] objects in one
    /// request, returning one failure entry per key that could not be
    /// removed.
    async fn delete_objects(
        &self,
        bucket: &BucketName,
        keys: &[ObjectKey],
        scope: &ResolvedScope,
    ) -> BackendResult<Vec<DeleteFailure>>;

    /// Fetch a bucket's tag set; empty when the bucket has never been
    /// tagged.
    async fn get_bucket_tags(
        &self,
        bucket: &BucketName,
        scope: &ResolvedScope,
    ) -> BackendResult<TagSet>;

    /// Replace a bucket's tag set.
    async fn put_bucket_tags(
        &self,
        bucket: &BucketName,
        tags: &TagSet,
        scope: &ResolvedScope,
    ) -> BackendResult<()>;

    /// Remove every tag from a bucket.
    async fn delete_bucket_tags(
        &self,
        bucket: &BucketName,
        scope: &ResolvedScope,
    ) -> BackendResult<()>;

    /// Fetch an object's tag set; empty when the object has never been
    /// tagged.
    async fn get_object_tags(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        scope: &ResolvedScope,
    ) -> BackendResult<TagSet>;

    /// Replace an object's tag set.
    async fn put_object_tags(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        tags: &TagSet,
        scope: &ResolvedScope,
    ) -> BackendResult<()>;

    /// Remove every tag from an object.
    async fn delete_object_tags(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        scope: &ResolvedScope,
    ) -> BackendResult<()>;
}
