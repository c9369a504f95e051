//! In-memory reference backend.
//!
//! A complete, thread-safe [`StorageBackend`] over process memory, used by
//! the test-suite and for offline development. Beyond plain storage it
//! records per-operation call counts and the scope each operation last
//! received, and lets tests plan failures for upcoming calls, so facade
//! behavior can be asserted without a network.

use std::collections::BTreeMap;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use md5::{Digest, Md5};
use parking_lot::{Mutex, RwLock};
use tracing::debug;

use silo_model::error::ErrorResponse;
use silo_model::{
    BackendError, BucketInfo, BucketName, DeleteFailure, ListSpec, ObjectDownload, ObjectEntry,
    ObjectKey, ObjectMeta, ObjectPage, PutOptions, ResolvedScope, TagSet, WireCode,
};

use super::{BackendResult, MAX_DELETE_BATCH, StorageBackend};

/// Owner identity used for buckets created through this backend.
const DEFAULT_OWNER: &str = "silo-dev";

// ---------------------------------------------------------------------------
// Stored state
// ---------------------------------------------------------------------------

/// One stored object.
#[derive(Debug, Clone)]
struct MemObject {
    body: Bytes,
    etag: String,
    last_modified: DateTime<Utc>,
    content_type: Option<String>,
    user_meta: BTreeMap<String, String>,
    tags: TagSet,
    /// Synthetic delete marker: hidden from plain reads and listings.
    is_delete_marker: bool,
}

impl MemObject {
    fn meta(&self, bucket: &BucketName, key: &ObjectKey) -> ObjectMeta {
        ObjectMeta {
            bucket: bucket.clone(),
            key: key.clone(),
            size: self.body.len() as u64,
            etag: self.etag.clone(),
            last_modified: self.last_modified,
            content_type: self.content_type.clone(),
            user_meta: self.user_meta.clone(),
        }
    }
}

/// One stored bucket.
struct MemBucket {
    owner: String,
    region: Option<String>,
    created_at: DateTime<Utc>,
    tags: RwLock<TagSet>,
    /// Sorted map of key to object, so listings come out in key order.
    objects: RwLock<BTreeMap<String, MemObject>>,
}

impl MemBucket {
    fn new(owner: impl Into<String>, region: Option<String>) -> Self {
        Self {
            owner: owner.into(),
            region,
            created_at: Utc::now(),
            tags: RwLock::new(TagSet::new()),
            objects: RwLock::new(BTreeMap::new()),
        }
    }

    fn info(&self, name: &BucketName) -> BucketInfo {
        BucketInfo {
            name: name.clone(),
            region: self.region.clone(),
            created_at: Some(self.created_at),
        }
    }

    fn live_object_count(&self) -> usize {
        self.objects
            .read()
            .values()
            .filter(|o| !o.is_delete_marker)
            .count()
    }
}

impl std::fmt::Debug for MemBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemBucket")
            .field("owner", &self.owner)
            .field("region", &self.region)
            .field("objects", &self.objects.read().len())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Planned failures
// ---------------------------------------------------------------------------

/// How a planned failure presents.
#[derive(Debug, Clone)]
enum FaultKind {
    /// An S3-style error response with the given code.
    Response(WireCode),
    /// A transport failure with the given message.
    Transport(String),
}

#[derive(Debug, Clone)]
struct Fault {
    op: &'static str,
    kind: FaultKind,
}

// ---------------------------------------------------------------------------
// InMemoryBackend
// ---------------------------------------------------------------------------

/// Thread-safe in-memory object store.
///
/// # Examples
///
/// ```
/// use bytes::Bytes;
/// use silo_core::backend::StorageBackend;
/// use silo_core::backend::memory::InMemoryBackend;
/// use silo_model::{BucketName, ObjectKey, PutOptions, ResolvedScope};
///
/// # tokio_test::block_on(async {
/// let backend = InMemoryBackend::new();
/// let bucket = BucketName::new("demo").unwrap();
/// let scope = ResolvedScope::default();
///
/// backend.create_bucket(&bucket, &scope).await.unwrap();
/// let meta = backend
///     .put_object(
///         &bucket,
///         &ObjectKey::new("hello.txt").unwrap(),
///         Bytes::from("hello"),
///         &PutOptions::default(),
///         &scope,
///     )
///     .await
///     .unwrap();
/// assert_eq!(meta.size, 5);
/// # });
/// ```
pub struct InMemoryBackend {
    buckets: DashMap<String, MemBucket>,
    /// Bucket name to owner, covering buckets seeded as foreign-owned.
    owners: DashMap<String, String>,
    /// The identity this backend creates buckets under.
    owner: String,
    faults: Mutex<Vec<Fault>>,
    key_faults: DashMap<String, WireCode>,
    calls: DashMap<&'static str, u64>,
    last_scopes: DashMap<&'static str, ResolvedScope>,
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBackend")
            .field("owner", &self.owner)
            .field("buckets", &self.buckets.len())
            .finish_non_exhaustive()
    }
}

impl InMemoryBackend {
    /// Create an empty backend.
    #[must_use]
    pub fn new() -> Self {
        debug!("creating InMemoryBackend");
        Self {
            buckets: DashMap::new(),
            owners: DashMap::new(),
            owner: DEFAULT_OWNER.to_owned(),
            faults: Mutex::new(Vec::new()),
            key_faults: DashMap::new(),
            calls: DashMap::new(),
            last_scopes: DashMap::new(),
        }
    }

    /// Drop all buckets, planned failures, and recorded calls.
    pub fn reset(&self) {
        self.buckets.clear();
        self.owners.clear();
        self.faults.lock().clear();
        self.key_faults.clear();
        self.calls.clear();
        self.last_scopes.clear();
    }

    /// Zero the call counters and recorded scopes, keeping stored data.
    pub fn reset_counts(&self) {
        self.calls.clear();
        self.last_scopes.clear();
    }

    // -- test support -------------------------------------------------------

    /// How many times an operation has been called since the last reset.
    #[must_use]
    pub fn call_count(&self, op: &str) -> u64 {
        self.calls.get(op).map_or(0, |count| *count)
    }

    /// The scope an operation last received, if it has been called.
    #[must_use]
    pub fn last_scope(&self, op: &str) -> Option<ResolvedScope> {
        self.last_scopes.get(op).map(|scope| scope.clone())
    }

    /// Plan an S3-style error response for the next call to `op`.
    pub fn fail_next(&self, op: &'static str, code: WireCode) {
        self.faults.lock().push(Fault {
            op,
            kind: FaultKind::Response(code),
        });
    }

    /// Plan a transport failure for the next call to `op`.
    pub fn fail_next_transport(&self, op: &'static str, message: impl Into<String>) {
        self.faults.lock().push(Fault {
            op,
            kind: FaultKind::Transport(message.into()),
        });
    }

    /// Make every bulk or single delete of `key` report the given code
    /// instead of removing the object.
    pub fn fail_key(&self, key: impl Into<String>, code: WireCode) {
        self.key_faults.insert(key.into(), code);
    }

    /// Seed a bucket owned by someone else, so the next create collides
    /// with `BucketAlreadyExists` rather than `BucketAlreadyOwnedByYou`.
    pub fn seed_foreign_bucket(&self, name: &BucketName) {
        self.owners
            .insert(name.to_string(), "someone-else".to_owned());
        self.buckets
            .insert(name.to_string(), MemBucket::new("someone-else", None));
    }

    /// Plant a synthetic delete marker at `key`, hidden from plain reads
    /// and from listings unless they ask for markers.
    pub fn seed_delete_marker(&self, bucket: &BucketName, key: &ObjectKey) {
        if let Some(entry) = self.buckets.get(bucket.as_str()) {
            entry.objects.write().insert(
                key.to_string(),
                MemObject {
                    body: Bytes::new(),
                    etag: String::new(),
                    last_modified: Utc::now(),
                    content_type: None,
                    user_meta: BTreeMap::new(),
                    tags: TagSet::new(),
                    is_delete_marker: true,
                },
            );
        }
    }

    // -- internals ----------------------------------------------------------

    fn record(&self, op: &'static str, scope: &ResolvedScope) -> BackendResult<()> {
        *self.calls.entry(op).or_insert(0) += 1;
        self.last_scopes.insert(op, scope.clone());

        let planned = {
            let mut faults = self.faults.lock();
            faults
                .iter()
                .position(|fault| fault.op == op)
                .map(|idx| faults.remove(idx))
        };
        match planned {
            None => Ok(()),
            Some(Fault {
                kind: FaultKind::Response(code),
                ..
            }) => Err(BackendError::Response(ErrorResponse::from_code(code))),
            Some(Fault {
                kind: FaultKind::Transport(message),
                ..
            }) => Err(BackendError::Transport(anyhow::anyhow!(message))),
        }
    }

    fn bucket(
        &self,
        name: &BucketName,
    ) -> BackendResult<dashmap::mapref::one::Ref<'_, String, MemBucket>> {
        self.buckets
            .get(name.as_str())
            .ok_or_else(|| BackendError::no_such_bucket(name.as_str()))
    }
}

/// Quoted MD5 hex of the payload, the etag convention S3 uses for plain
/// uploads.
fn compute_etag(body: &[u8]) -> String {
    let digest = Md5::digest(body);
    format!("\"{}\"", hex::encode(digest))
}

/// Build one listing page from a sorted key/object map.
fn list_page(objects: &BTreeMap<String, MemObject>, spec: &ListSpec) -> ObjectPage {
    let prefix = spec.prefix.as_deref().unwrap_or("");
    let start_after = spec.start_after.as_deref().unwrap_or("");
    let delimiter = spec.delimiter.as_deref().unwrap_or("");
    let use_delim = !delimiter.is_empty();

    let mut entries: Vec<ObjectEntry> = Vec::new();
    let mut seen_prefixes = std::collections::HashSet::new();
    let mut count = 0usize;
    let mut is_truncated = false;
    let mut last_key: Option<String> = None;

    for (key, object) in objects {
        if object.is_delete_marker && !spec.include_delete_markers {
            continue;
        }
        if !start_after.is_empty() && key.as_str() <= start_after {
            continue;
        }
        if !prefix.is_empty() && !key.starts_with(prefix) {
            continue;
        }

        // Delimiter-based grouping into common-prefix rows. A group takes
        // one page slot like an object row, and every key rolled into it
        // advances the marker so the next page resumes past the group.
        if use_delim {
            let after_prefix = &key[prefix.len()..];
            if let Some(pos) = after_prefix.find(delimiter) {
                let common = format!("{}{}{}", prefix, &after_prefix[..pos], delimiter);
                if !seen_prefixes.contains(common.as_str()) {
                    if count >= spec.page_size {
                        is_truncated = true;
                        break;
                    }
                    let Ok(common_key) = ObjectKey::new(common.clone()) else {
                        continue;
                    };
                    seen_prefixes.insert(common);
                    entries.push(ObjectEntry::prefix(common_key));
                    count += 1;
                }
                last_key = Some(key.clone());
                continue;
            }
        }

        if count >= spec.page_size {
            is_truncated = true;
            break;
        }

        let Ok(entry_key) = ObjectKey::new(key.clone()) else {
            continue;
        };
        last_key = Some(key.clone());
        if object.is_delete_marker {
            entries.push(ObjectEntry::delete_marker(entry_key, object.last_modified));
        } else {
            entries.push(ObjectEntry::object(
                entry_key,
                object.body.len() as u64,
                object.etag.clone(),
                object.last_modified,
            ));
        }
        count += 1;
    }

    ObjectPage {
        entries,
        is_truncated,
        next_start_after: if is_truncated { last_key } else { None },
    }
}

#[async_trait]
impl StorageBackend for InMemoryBackend {
    async fn create_bucket(&self, bucket: &BucketName, scope: &ResolvedScope) -> BackendResult<()> {
        self.record("create_bucket", scope)?;

        if let Some(owner) = self.owners.get(bucket.as_str()) {
            if *owner == self.owner {
                return Err(BackendError::bucket_already_owned_by_you(bucket.as_str()));
            }
            return Err(BackendError::bucket_already_exists(bucket.as_str()));
        }
        if self.buckets.contains_key(bucket.as_str()) {
            return Err(BackendError::bucket_already_owned_by_you(bucket.as_str()));
        }

        self.owners
            .insert(bucket.to_string(), self.owner.clone());
        self.buckets.insert(
            bucket.to_string(),
            MemBucket::new(self.owner.clone(), scope.region.clone()),
        );
        debug!(bucket = %bucket, region = ?scope.region, "created bucket");
        Ok(())
    }

    async fn delete_bucket(&self, bucket: &BucketName, scope: &ResolvedScope) -> BackendResult<()> {
        self.record("delete_bucket", scope)?;

        let entry = self.bucket(bucket)?;
        if entry.live_object_count() > 0 {
            return Err(BackendError::bucket_not_empty(bucket.as_str()));
        }
        drop(entry);

        self.buckets.remove(bucket.as_str());
        self.owners.remove(bucket.as_str());
        debug!(bucket = %bucket, "deleted bucket");
        Ok(())
    }

    async fn bucket_exists(
        &self,
        bucket: &BucketName,
        scope: &ResolvedScope,
    ) -> BackendResult<bool> {
        self.record("bucket_exists", scope)?;
        Ok(self.buckets.contains_key(bucket.as_str()))
    }

    async fn list_buckets(&self, scope: &ResolvedScope) -> BackendResult<Vec<BucketInfo>> {
        self.record("list_buckets", scope)?;

        let mut infos: Vec<BucketInfo> = self
            .buckets
            .iter()
            .filter_map(|entry| {
                let name = BucketName::new(entry.key().clone()).ok()?;
                Some(entry.value().info(&name))
            })
            .collect();
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(infos)
    }

    async fn list_objects(
        &self,
        bucket: &BucketName,
        spec: &ListSpec,
        scope: &ResolvedScope,
    ) -> BackendResult<ObjectPage> {
        self.record("list_objects", scope)?;

        let entry = self.bucket(bucket)?;
        let objects = entry.objects.read();
        Ok(list_page(&objects, spec))
    }

    async fn put_object(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        body: Bytes,
        options: &PutOptions,
        scope: &ResolvedScope,
    ) -> BackendResult<ObjectMeta> {
        self.record("put_object", scope)?;

        let entry = self.bucket(bucket)?;
        let object = MemObject {
            etag: compute_etag(&body),
            last_modified: Utc::now(),
            content_type: options.content_type.clone(),
            user_meta: options.user_meta.clone(),
            tags: options.tags.clone(),
            is_delete_marker: false,
            body,
        };
        let meta = object.meta(bucket, key);
        entry.objects.write().insert(key.to_string(), object);
        debug!(bucket = %bucket, key = %key, size = meta.size, "stored object");
        Ok(meta)
    }

    async fn get_object(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        scope: &ResolvedScope,
    ) -> BackendResult<ObjectDownload> {
        self.record("get_object", scope)?;

        let entry = self.bucket(bucket)?;
        let objects = entry.objects.read();
        let object = objects
            .get(key.as_str())
            .filter(|o| !o.is_delete_marker)
            .ok_or_else(|| BackendError::no_such_key(bucket.as_str(), key.as_str()))?;
        Ok(ObjectDownload {
            meta: object.meta(bucket, key),
            body: object.body.clone(),
        })
    }

    async fn stat_object(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        scope: &ResolvedScope,
    ) -> BackendResult<ObjectMeta> {
        self.record("stat_object", scope)?;

        let entry = self.bucket(bucket)?;
        let objects = entry.objects.read();
        objects
            .get(key.as_str())
            .filter(|o| !o.is_delete_marker)
            .map(|o| o.meta(bucket, key))
            .ok_or_else(|| BackendError::no_such_key(bucket.as_str(), key.as_str()))
    }

    async fn delete_object(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        scope: &ResolvedScope,
    ) -> BackendResult<()> {
        self.record("delete_object", scope)?;

        if let Some(code) = self.key_faults.get(key.as_str()) {
            return Err(BackendError::Response(
                ErrorResponse::from_code(code.clone())
                    .with_bucket(bucket.as_str())
                    .with_key(key.as_str()),
            ));
        }

        let entry = self.bucket(bucket)?;
        let mut objects = entry.objects.write();
        // Delete markers are invisible to plain deletes, same as reads.
        let live = objects
            .get(key.as_str())
            .is_some_and(|o| !o.is_delete_marker);
        if !live {
            return Err(BackendError::no_such_key(bucket.as_str(), key.as_str()));
        }
        objects.remove(key.as_str());
        debug!(bucket = %bucket, key = %key, "deleted object");
        Ok(())
    }

    async fn delete_objects(
        &self,
        bucket: &BucketName,
        keys: &[ObjectKey],
        scope: &ResolvedScope,
    ) -> BackendResult<Vec<DeleteFailure>> {
        self.record("delete_objects", scope)?;

        if keys.len() > MAX_DELETE_BATCH {
            return Err(BackendError::Response(
                ErrorResponse::new(
                    WireCode::InvalidArgument,
                    format!(
                        "delete batch holds {} keys, limit is {MAX_DELETE_BATCH}",
                        keys.len()
                    ),
                )
                .with_bucket(bucket.as_str()),
            ));
        }

        let entry = self.bucket(bucket)?;
        let mut objects = entry.objects.write();
        let mut failures = Vec::new();
        for key in keys {
            if let Some(code) = self.key_faults.get(key.as_str()) {
                failures.push(DeleteFailure {
                    key: key.clone(),
                    code: code.clone(),
                    message: code.default_message().to_owned(),
                });
                continue;
            }
            let live = objects
                .get(key.as_str())
                .is_some_and(|o| !o.is_delete_marker);
            if live {
                objects.remove(key.as_str());
            } else {
                failures.push(DeleteFailure {
                    key: key.clone(),
                    code: WireCode::NoSuchKey,
                    message: WireCode::NoSuchKey.default_message().to_owned(),
                });
            }
        }
        debug!(
            bucket = %bucket,
            requested = keys.len(),
            failed = failures.len(),
            "bulk delete completed"
        );
        Ok(failures)
    }

    async fn get_bucket_tags(
        &self,
        bucket: &BucketName,
        scope: &ResolvedScope,
    ) -> BackendResult<TagSet> {
        self.record("get_bucket_tags", scope)?;
        let entry = self.bucket(bucket)?;
        let tags = entry.tags.read().clone();
        Ok(tags)
    }

    async fn put_bucket_tags(
        &self,
        bucket: &BucketName,
        tags: &TagSet,
        scope: &ResolvedScope,
    ) -> BackendResult<()> {
        self.record("put_bucket_tags", scope)?;
        let entry = self.bucket(bucket)?;
        *entry.tags.write() = tags.clone();
        debug!(bucket = %bucket, count = tags.len(), "replaced bucket tags");
        Ok(())
    }

    async fn delete_bucket_tags(
        &self,
        bucket: &BucketName,
        scope: &ResolvedScope,
    ) -> BackendResult<()> {
        self.record("delete_bucket_tags", scope)?;
        let entry = self.bucket(bucket)?;
        *entry.tags.write() = TagSet::new();
        debug!(bucket = %bucket, "cleared bucket tags");
        Ok(())
    }

    async fn get_object_tags(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        scope: &ResolvedScope,
    ) -> BackendResult<TagSet> {
        self.record("get_object_tags", scope)?;
        let entry = self.bucket(bucket)?;
        let objects = entry.objects.read();
        objects
            .get(key.as_str())
            .filter(|o| !o.is_delete_marker)
            .map(|o| o.tags.clone())
            .ok_or_else(|| BackendError::no_such_key(bucket.as_str(), key.as_str()))
    }

    async fn put_object_tags(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        tags: &TagSet,
        scope: &ResolvedScope,
    ) -> BackendResult<()> {
        self.record("put_object_tags", scope)?;
        let entry = self.bucket(bucket)?;
        let mut objects = entry.objects.write();
        let object = objects
            .get_mut(key.as_str())
            .filter(|o| !o.is_delete_marker)
            .ok_or_else(|| BackendError::no_such_key(bucket.as_str(), key.as_str()))?;
        object.tags = tags.clone();
        debug!(bucket = %bucket, key = %key, count = tags.len(), "replaced object tags");
        Ok(())
    }

    async fn delete_object_tags(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        scope: &ResolvedScope,
    ) -> BackendResult<()> {
        self.record("delete_object_tags", scope)?;
        let entry = self.bucket(bucket)?;
        let mut objects = entry.objects.write();
        let object = objects
            .get_mut(key.as_str())
            .filter(|o| !o.is_delete_marker)
            .ok_or_else(|| BackendError::no_such_key(bucket.as_str(), key.as_str()))?;
        object.tags = TagSet::new();
        debug!(bucket = %bucket, key = %key, "cleared object tags");
        Ok(())
    }
}
