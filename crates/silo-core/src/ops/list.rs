//! Streaming object listings.
//!
//! Turns the backend's paged `list_objects` primitive into a flat entry
//! stream. Pages are fetched lazily as the consumer advances, so listing a
//! large bucket never materializes more than one page at a time, and each
//! page request carries the start-after marker of the previous one.

use std::collections::VecDeque;
use std::sync::Arc;

use futures::Stream;
use tracing::debug;

use silo_model::{BackendError, BucketName, ListSpec, ObjectEntry, ResolvedScope};

use crate::backend::StorageBackend;

struct PagerState {
    backend: Arc<dyn StorageBackend>,
    bucket: BucketName,
    spec: ListSpec,
    scope: ResolvedScope,
    buffered: VecDeque<ObjectEntry>,
    done: bool,
}

/// Stream every entry the backend lists for `spec`, across page boundaries.
///
/// The stream is finite. It ends either when a page comes back untruncated
/// or when a truncated page carries no continuation marker.
pub(crate) fn entry_stream(
    backend: Arc<dyn StorageBackend>,
    bucket: BucketName,
    spec: ListSpec,
    scope: ResolvedScope,
) -> impl Stream<Item = Result<ObjectEntry, BackendError>> + Send {
    let state = PagerState {
        backend,
        bucket,
        spec,
        scope,
        buffered: VecDeque::new(),
        done: false,
    };

    futures::stream::try_unfold(state, |mut state| async move {
        loop {
            if let Some(entry) = state.buffered.pop_front() {
                return Ok(Some((entry, state)));
            }
            if state.done {
                return Ok(None);
            }

            let page = state
                .backend
                .list_objects(&state.bucket, &state.spec, &state.scope)
                .await?;
            debug!(
                bucket = %state.bucket,
                entries = page.entries.len(),
                truncated = page.is_truncated,
                "fetched listing page"
            );

            match (page.is_truncated, page.next_start_after) {
                (true, Some(marker)) => state.spec.start_after = Some(marker),
                _ => state.done = true,
            }
            state.buffered = page.entries.into();
        }
    })
}
