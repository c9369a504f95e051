//! Bulk object purging.
//!
//! Deletes every live object under a bucket or key prefix. Keys are
//! streamed from the pager and submitted in bounded batches, never
//! materialized in full. A key that is already gone by the time its batch
//! runs counts as purged; the listing and the deletes are not atomic with
//! respect to concurrent writers, and the goal state is the same either
//! way. Any other per-key failure is collected and raised as one
//! aggregate error once the run completes.

use std::sync::Arc;

use futures::TryStreamExt;
use tracing::debug;

use silo_model::{BucketName, DeleteFailure, ListSpec, ObjectKey, ResolvedScope};

use crate::backend::{MAX_DELETE_BATCH, StorageBackend};
use crate::error::{SiloError, SiloResult};
use crate::ops::list::entry_stream;

/// A purge failure, split by which half of the flow it came from.
///
/// Compound orchestrators report the failing phase to their callers;
/// plain purges flatten this back into the inner error.
pub(crate) enum PurgeFailure {
    /// The object listing failed.
    List(SiloError),
    /// A bulk-delete call failed outright, or left objects behind.
    Delete(SiloError),
}

impl PurgeFailure {
    pub(crate) fn into_error(self) -> SiloError {
        match self {
            Self::List(err) | Self::Delete(err) => err,
        }
    }
}

/// Delete every live object under `prefix` (the whole bucket when `None`).
///
/// Returns the number of keys purged. Delete-marker and common-prefix rows
/// are never submitted for deletion. Keys whose deletion reports
/// `NoSuchKey` count as purged; all other per-key failures aggregate into
/// [`SiloError::MultiObjectDeleteFailed`].
pub(crate) async fn purge(
    backend: Arc<dyn StorageBackend>,
    bucket: &BucketName,
    prefix: Option<&str>,
    page_size: usize,
    scope: &ResolvedScope,
) -> Result<u64, PurgeFailure> {
    let spec = ListSpec {
        prefix: prefix.map(str::to_owned),
        delimiter: None,
        start_after: None,
        page_size,
        include_delete_markers: false,
    };
    let batch_size = page_size.clamp(1, MAX_DELETE_BATCH);

    let stream = entry_stream(backend.clone(), bucket.clone(), spec, scope.clone());
    futures::pin_mut!(stream);

    let mut batch: Vec<ObjectKey> = Vec::new();
    let mut purged: u64 = 0;
    let mut failures: Vec<DeleteFailure> = Vec::new();

    loop {
        let entry = stream
            .try_next()
            .await
            .map_err(|e| PurgeFailure::List(SiloError::from_backend_bucket(e, bucket)))?;
        match entry {
            Some(entry) => {
                if !entry.is_live() {
                    continue;
                }
                batch.push(entry.key);
                if batch.len() >= batch_size {
                    purged +=
                        flush_batch(&*backend, bucket, &mut batch, &mut failures, scope).await?;
                }
            }
            None => break,
        }
    }
    purged += flush_batch(&*backend, bucket, &mut batch, &mut failures, scope).await?;

    if failures.is_empty() {
        debug!(bucket = %bucket, prefix = ?prefix, purged, "purge completed");
        Ok(purged)
    } else {
        Err(PurgeFailure::Delete(SiloError::MultiObjectDeleteFailed {
            bucket: bucket.to_string(),
            failures,
        }))
    }
}

/// Delete an explicit key set in bounded batches.
///
/// Same failure policy as [`purge`]: `NoSuchKey` counts as done, anything
/// else aggregates. Returns the number of keys deleted or already gone.
pub(crate) async fn delete_keys(
    backend: &dyn StorageBackend,
    bucket: &BucketName,
    keys: Vec<ObjectKey>,
    batch_size: usize,
    scope: &ResolvedScope,
) -> SiloResult<u64> {
    let batch_size = batch_size.clamp(1, MAX_DELETE_BATCH);
    let mut batch: Vec<ObjectKey> = Vec::new();
    let mut purged: u64 = 0;
    let mut failures: Vec<DeleteFailure> = Vec::new();

    for key in keys {
        batch.push(key);
        if batch.len() >= batch_size {
            purged += flush_batch(backend, bucket, &mut batch, &mut failures, scope)
                .await
                .map_err(PurgeFailure::into_error)?;
        }
    }
    purged += flush_batch(backend, bucket, &mut batch, &mut failures, scope)
        .await
        .map_err(PurgeFailure::into_error)?;

    if failures.is_empty() {
        Ok(purged)
    } else {
        Err(SiloError::MultiObjectDeleteFailed {
            bucket: bucket.to_string(),
            failures,
        })
    }
}

/// Submit one batch, keeping only the failures that matter.
async fn flush_batch(
    backend: &dyn StorageBackend,
    bucket: &BucketName,
    batch: &mut Vec<ObjectKey>,
    failures: &mut Vec<DeleteFailure>,
    scope: &ResolvedScope,
) -> Result<u64, PurgeFailure> {
    if batch.is_empty() {
        return Ok(0);
    }
    let keys = std::mem::take(batch);
    let submitted = keys.len() as u64;

    let batch_failures = backend
        .delete_objects(bucket, &keys, scope)
        .await
        .map_err(|e| PurgeFailure::Delete(SiloError::from_backend_bucket(e, bucket)))?;

    let mut failed = 0u64;
    for failure in batch_failures {
        // A key that is already gone satisfies the purge.
        if failure.code.is_no_such_key() {
            continue;
        }
        failed += 1;
        failures.push(failure);
    }
    Ok(submitted - failed)
}
