//! Tag reconciliation.
//!
//! The backend only speaks full-replace tagging: get all, set all, delete
//! all. Targeted deletion of specific tag keys is rebuilt on top of those
//! three primitives by fetching the current set, clearing it, and storing
//! back whatever was not targeted. [`TagStore`] abstracts over bucket and
//! object tagging so one flow serves both.

use std::collections::BTreeSet;

use async_trait::async_trait;
use tracing::debug;

use silo_model::{BackendError, BucketName, ObjectKey, ResolvedScope, TagSet};

use crate::backend::StorageBackend;
use crate::error::{Resource, SiloError, SiloResult, TagDeletePhase};

/// The three tagging primitives of one taggable resource.
#[async_trait]
pub(crate) trait TagStore: Send + Sync {
    /// The resource identity attached to failures.
    fn resource(&self) -> Resource;

    /// Current full tag set; empty when the resource was never tagged.
    async fn fetch(&self, scope: &ResolvedScope) -> Result<TagSet, BackendError>;

    /// Remove every tag.
    async fn clear(&self, scope: &ResolvedScope) -> Result<(), BackendError>;

    /// Replace the full tag set.
    async fn store(&self, tags: &TagSet, scope: &ResolvedScope) -> Result<(), BackendError>;
}

/// Bucket-scoped [`TagStore`].
pub(crate) struct BucketTags<'a> {
    pub backend: &'a dyn StorageBackend,
    pub bucket: &'a BucketName,
}

#[async_trait]
impl TagStore for BucketTags<'_> {
    fn resource(&self) -> Resource {
        Resource::bucket(self.bucket)
    }

    async fn fetch(&self, scope: &ResolvedScope) -> Result<TagSet, BackendError> {
        self.backend.get_bucket_tags(self.bucket, scope).await
    }

    async fn clear(&self, scope: &ResolvedScope) -> Result<(), BackendError> {
        self.backend.delete_bucket_tags(self.bucket, scope).await
    }

    async fn store(&self, tags: &TagSet, scope: &ResolvedScope) -> Result<(), BackendError> {
        self.backend.put_bucket_tags(self.bucket, tags, scope).await
    }
}

/// Object-scoped [`TagStore`].
pub(crate) struct ObjectTags<'a> {
    pub backend: &'a dyn StorageBackend,
    pub bucket: &'a BucketName,
    pub key: &'a ObjectKey,
}

#[async_trait]
impl TagStore for ObjectTags<'_> {
    fn resource(&self) -> Resource {
        Resource::object(self.bucket, self.key)
    }

    async fn fetch(&self, scope: &ResolvedScope) -> Result<TagSet, BackendError> {
        self.backend
            .get_object_tags(self.bucket, self.key, scope)
            .await
    }

    async fn clear(&self, scope: &ResolvedScope) -> Result<(), BackendError> {
        self.backend
            .delete_object_tags(self.bucket, self.key, scope)
            .await
    }

    async fn store(&self, tags: &TagSet, scope: &ResolvedScope) -> Result<(), BackendError> {
        self.backend
            .put_object_tags(self.bucket, self.key, tags, scope)
            .await
    }
}

fn phase_failure<S: TagStore + ?Sized>(
    store: &S,
    phase: TagDeletePhase,
    err: BackendError,
) -> SiloError {
    SiloError::TagDeleteFailed {
        phase,
        resource: store.resource(),
        source: Box::new(SiloError::from_backend(err)),
    }
}

/// Delete the tags named in `keys`, returning the tags actually removed.
///
/// Runs at most three backend calls: fetch, clear, restore. Nothing is
/// mutated when `keys` is empty, when the resource has no tags, or when
/// none of the requested keys are present. The restore call is skipped
/// when no tags survive the deletion.
pub(crate) async fn delete_tag_keys<S: TagStore + ?Sized>(
    store: &S,
    keys: &BTreeSet<String>,
    scope: &ResolvedScope,
) -> SiloResult<TagSet> {
    if keys.is_empty() {
        return Ok(TagSet::new());
    }

    let current = store
        .fetch(scope)
        .await
        .map_err(|e| phase_failure(store, TagDeletePhase::Fetch, e))?;
    if current.is_empty() {
        return Ok(TagSet::new());
    }

    let (doomed_pairs, kept_pairs): (Vec<_>, Vec<_>) = current
        .iter()
        .partition(|(key, _)| keys.contains(*key));
    let removed = TagSet::try_from_pairs(doomed_pairs)?;
    let survivors = TagSet::try_from_pairs(kept_pairs)?;

    if removed.is_empty() {
        return Ok(TagSet::new());
    }

    store
        .clear(scope)
        .await
        .map_err(|e| phase_failure(store, TagDeletePhase::Clear, e))?;

    if !survivors.is_empty() {
        store
            .store(&survivors, scope)
            .await
            .map_err(|e| phase_failure(store, TagDeletePhase::Restore, e))?;
    }

    debug!(
        resource = %store.resource(),
        removed = removed.len(),
        survived = survivors.len(),
        "reconciled tag deletion"
    );
    Ok(removed)
}

/// Delete every tag, returning the set that was present.
///
/// Fetches first so the removed tags can be reported, and skips the clear
/// call entirely when the resource has no tags.
pub(crate) async fn delete_all_tags<S: TagStore + ?Sized>(
    store: &S,
    scope: &ResolvedScope,
) -> SiloResult<TagSet> {
    let current = store
        .fetch(scope)
        .await
        .map_err(|e| phase_failure(store, TagDeletePhase::Fetch, e))?;
    if current.is_empty() {
        return Ok(TagSet::new());
    }

    store
        .clear(scope)
        .await
        .map_err(|e| phase_failure(store, TagDeletePhase::Clear, e))?;

    debug!(
        resource = %store.resource(),
        removed = current.len(),
        "cleared all tags"
    );
    Ok(current)
}
