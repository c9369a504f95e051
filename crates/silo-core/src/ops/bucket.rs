//! Bucket orchestration flows.
//!
//! Implements create-with-tags, create-or-get ("upsert"), bucket lookup,
//! and recursive bucket deletion. Each flow is a fixed phase sequence over
//! backend primitives; a failure is reported with the phase it happened in
//! and leaves earlier phases' effects in place, so re-invoking the same
//! flow is the recovery path.

use std::sync::Arc;

use tracing::debug;

use silo_model::{BucketInfo, BucketName, ResolvedScope, TagSet};

use crate::backend::StorageBackend;
use crate::error::{BucketPutPhase, RecursiveDeletePhase, Resource, SiloError, SiloResult};
use crate::ops::purge::{self, PurgeFailure};

fn put_failure(phase: BucketPutPhase, name: &BucketName, source: SiloError) -> SiloError {
    SiloError::BucketPutFailed {
        phase,
        resource: Resource::bucket(name),
        source: Box::new(source),
    }
}

fn recursive_failure(
    phase: RecursiveDeletePhase,
    name: &BucketName,
    source: SiloError,
) -> SiloError {
    SiloError::RecursiveDeleteFailed {
        phase,
        resource: Resource::bucket(name),
        source: Box::new(source),
    }
}

/// Look a bucket up by name via the bucket listing.
///
/// The backend has no single-bucket fetch that returns creation metadata,
/// so the listing is filtered instead.
pub(crate) async fn find_bucket(
    backend: &dyn StorageBackend,
    name: &BucketName,
    scope: &ResolvedScope,
) -> SiloResult<Option<BucketInfo>> {
    let buckets = backend
        .list_buckets(scope)
        .await
        .map_err(SiloError::from_backend)?;
    Ok(buckets.into_iter().find(|info| info.name == *name))
}

/// Shared tail of the create and upsert flows: apply tags, then fetch the
/// resulting bucket.
async fn finish_put(
    backend: &dyn StorageBackend,
    name: &BucketName,
    tags: &TagSet,
    apply_tags: bool,
    scope: &ResolvedScope,
) -> SiloResult<BucketInfo> {
    if apply_tags && !tags.is_empty() {
        backend
            .put_bucket_tags(name, tags, scope)
            .await
            .map_err(|e| {
                put_failure(
                    BucketPutPhase::PutTags,
                    name,
                    SiloError::from_backend_bucket(e, name),
                )
            })?;
    }

    match find_bucket(backend, name, scope).await {
        Ok(Some(info)) => Ok(info),
        Ok(None) => Err(put_failure(
            BucketPutPhase::FetchBucket,
            name,
            SiloError::BucketNotFound {
                bucket: name.to_string(),
            },
        )),
        Err(err) => Err(put_failure(BucketPutPhase::FetchBucket, name, err)),
    }
}

/// Create a bucket, apply its initial tags, and fetch the result.
///
/// A name collision surfaces directly as
/// [`SiloError::BucketAlreadyExists`] or
/// [`SiloError::BucketAlreadyOwnedByYou`] so callers can match on it; any
/// other failure carries the phase it happened in. A failure after the
/// create phase means the bucket now exists, possibly untagged.
pub(crate) async fn create_bucket(
    backend: &dyn StorageBackend,
    name: &BucketName,
    tags: &TagSet,
    scope: &ResolvedScope,
) -> SiloResult<BucketInfo> {
    match backend.create_bucket(name, scope).await {
        Ok(()) => {}
        Err(err) if err.is_bucket_collision() => {
            return Err(SiloError::from_backend_bucket(err, name));
        }
        Err(err) => {
            return Err(put_failure(
                BucketPutPhase::CreateBucket,
                name,
                SiloError::from_backend_bucket(err, name),
            ));
        }
    }
    debug!(bucket = %name, "bucket created");
    finish_put(backend, name, tags, true, scope).await
}

/// Create a bucket if absent, otherwise adopt the existing one.
///
/// Both collision codes count as "already there". Tags are applied to a
/// bucket this call created, and to a pre-existing one only when
/// `tag_on_collision` is set. The resulting bucket is always re-fetched,
/// so the caller gets the store's view of it either way.
pub(crate) async fn upsert_bucket(
    backend: &dyn StorageBackend,
    name: &BucketName,
    tags: &TagSet,
    tag_on_collision: bool,
    scope: &ResolvedScope,
) -> SiloResult<BucketInfo> {
    let created = match backend.create_bucket(name, scope).await {
        Ok(()) => true,
        Err(err) if err.is_bucket_collision() => false,
        Err(err) => {
            return Err(put_failure(
                BucketPutPhase::CreateBucket,
                name,
                SiloError::from_backend_bucket(err, name),
            ));
        }
    };
    debug!(bucket = %name, created, "upsert resolved");
    finish_put(backend, name, tags, created || tag_on_collision, scope).await
}

/// Empty a bucket, then delete it.
///
/// Returns whether the bucket existed. A bucket that is already gone at
/// the start, or that a concurrent caller deletes after the purge, still
/// counts as success: the end state is the one asked for.
pub(crate) async fn delete_bucket_recursive(
    backend: Arc<dyn StorageBackend>,
    name: &BucketName,
    page_size: usize,
    scope: &ResolvedScope,
) -> SiloResult<bool> {
    let purged = match purge::purge(backend.clone(), name, None, page_size, scope).await {
        Ok(purged) => purged,
        Err(PurgeFailure::List(err)) if err.is_not_found() => {
            debug!(bucket = %name, "bucket already gone before recursive delete");
            return Ok(false);
        }
        Err(PurgeFailure::List(err)) => {
            return Err(recursive_failure(
                RecursiveDeletePhase::ListObjects,
                name,
                err,
            ));
        }
        Err(PurgeFailure::Delete(err)) => {
            return Err(recursive_failure(
                RecursiveDeletePhase::DeleteObjects,
                name,
                err,
            ));
        }
    };

    match backend.delete_bucket(name, scope).await {
        Ok(()) => {}
        // Deleted out from under us after the purge; the goal is met.
        Err(err) if err.is_no_such_bucket() => {}
        Err(err) => {
            return Err(recursive_failure(
                RecursiveDeletePhase::DeleteBucket,
                name,
                SiloError::from_backend_bucket(err, name),
            ));
        }
    }
    debug!(bucket = %name, purged, "recursive delete completed");
    Ok(true)
}
