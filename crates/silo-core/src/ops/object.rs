//! Object orchestration flows.
//!
//! Implements touch (ensure a key exists) and directory deletion over the
//! backend primitives. Directory semantics are a convention, not a store
//! feature: a "directory" is a zero-byte marker object whose key ends in
//! the path delimiter, plus whatever keys share that prefix.

use std::sync::Arc;

use bytes::Bytes;
use tracing::debug;

use silo_model::{BucketName, ListSpec, ObjectKey, ObjectMeta, PutOptions, ResolvedScope};

use crate::backend::StorageBackend;
use crate::error::{Resource, SiloError, SiloResult, TouchPhase};
use crate::ops::purge::{self, PurgeFailure};

fn touch_failure(
    phase: TouchPhase,
    bucket: &BucketName,
    key: &ObjectKey,
    source: SiloError,
) -> SiloError {
    SiloError::ObjectTouchFailed {
        phase,
        resource: Resource::object(bucket, key),
        source: Box::new(source),
    }
}

/// Ensure an object exists at `key`, creating it zero-byte if absent.
///
/// When the object already exists and `overwrite` is not set, its current
/// metadata is returned and nothing is written. With `overwrite` the key
/// is replaced by a fresh zero-byte object either way.
pub(crate) async fn touch_object(
    backend: &dyn StorageBackend,
    bucket: &BucketName,
    key: &ObjectKey,
    overwrite: bool,
    scope: &ResolvedScope,
) -> SiloResult<ObjectMeta> {
    match backend.stat_object(bucket, key, scope).await {
        Ok(existing) if !overwrite => {
            debug!(bucket = %bucket, key = %key, "touch found existing object");
            return Ok(existing);
        }
        Ok(_) => {}
        Err(err) if err.is_no_such_key() => {}
        Err(err) => {
            return Err(touch_failure(
                TouchPhase::Stat,
                bucket,
                key,
                SiloError::from_backend_object(err, bucket, key),
            ));
        }
    }

    let meta = backend
        .put_object(bucket, key, Bytes::new(), &PutOptions::default(), scope)
        .await
        .map_err(|e| {
            touch_failure(
                TouchPhase::Put,
                bucket,
                key,
                SiloError::from_backend_object(e, bucket, key),
            )
        })?;
    debug!(bucket = %bucket, key = %key, "touched object");
    Ok(meta)
}

/// Delete a directory, returning whether anything existed to delete.
///
/// The path is normalized to its marker form (trailing delimiter). In
/// non-recursive mode the call refuses with
/// [`SiloError::DirectoryNotEmpty`] when any key besides the marker
/// itself lives under the prefix. In recursive mode everything under the
/// prefix is purged first and the marker is removed last.
pub(crate) async fn delete_dir(
    backend: Arc<dyn StorageBackend>,
    bucket: &BucketName,
    path: &ObjectKey,
    recursive: bool,
    page_size: usize,
    scope: &ResolvedScope,
) -> SiloResult<bool> {
    let dir = path.to_dir_key();

    if recursive {
        let purged = purge::purge(backend.clone(), bucket, Some(dir.as_str()), page_size, scope)
            .await
            .map_err(PurgeFailure::into_error)?;
        // The marker shares the prefix, so the purge usually took it too;
        // this covers one appearing between the purge and now.
        let marker_removed = delete_marker(&*backend, bucket, &dir, scope).await?;
        debug!(bucket = %bucket, dir = %dir, purged, "recursive directory delete completed");
        return Ok(purged > 0 || marker_removed);
    }

    let spec = ListSpec {
        prefix: Some(dir.to_string()),
        delimiter: None,
        start_after: None,
        page_size,
        include_delete_markers: false,
    };
    let page = backend
        .list_objects(bucket, &spec, scope)
        .await
        .map_err(|e| SiloError::from_backend_bucket(e, bucket))?;

    let has_children = page.is_truncated
        || page
            .entries
            .iter()
            .any(|entry| entry.key.as_str() != dir.as_str());
    if has_children {
        return Err(SiloError::DirectoryNotEmpty {
            bucket: bucket.to_string(),
            path: dir.to_string(),
        });
    }

    delete_marker(&*backend, bucket, &dir, scope).await
}

/// Remove the directory marker object, tolerating its absence.
async fn delete_marker(
    backend: &dyn StorageBackend,
    bucket: &BucketName,
    dir: &ObjectKey,
    scope: &ResolvedScope,
) -> SiloResult<bool> {
    match backend.delete_object(bucket, dir, scope).await {
        Ok(()) => Ok(true),
        Err(err) if err.is_no_such_key() => Ok(false),
        Err(err) => Err(SiloError::from_backend_object(err, bucket, dir)),
    }
}
