//! The bucket handle.
//!
//! [`Bucket`] carries the middle layer of the scope cascade: whatever
//! scope the handle holds (by default the bucket's own region) sits
//! between the client defaults and each call's overrides. All object
//! operations live here; [`crate::object::Object`] narrows this surface
//! to a single key.

use std::collections::BTreeSet;

use futures::stream::BoxStream;
use futures::{StreamExt, TryStreamExt};
use tracing::debug;

use silo_model::request::{
    DeleteAllTagsRequest, DeleteDirRequest, DeleteObjectRequest, DeleteObjectsRequest,
    DeleteTagsRequest, GetObjectRequest, GetTagsRequest, ListDirRequest, ListObjectsRequest,
    PurgePrefixRequest, PutObjectRequest, PutTagsRequest, StatObjectRequest, TouchObjectRequest,
};
use silo_model::{
    BucketInfo, BucketName, ListSpec, ObjectDownload, ObjectEntry, ObjectKey, ObjectMeta,
    PATH_DELIMITER, ResolvedScope, ScopeConfig, TagSet,
};

use crate::client::SiloClient;
use crate::error::{SiloError, SiloResult};
use crate::object::Object;
use crate::ops;
use crate::ops::tags::BucketTags;
use crate::resolve;

/// Handle to one bucket.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use silo_core::SiloClient;
/// use silo_core::backend::memory::InMemoryBackend;
/// use silo_core::config::ClientConfig;
/// use silo_model::request::{GetObjectRequest, PutObjectRequest};
///
/// # tokio_test::block_on(async {
/// let client = SiloClient::new(Arc::new(InMemoryBackend::new()), ClientConfig::default());
/// let bucket = client.create_bucket("media".into()).await.unwrap();
///
/// bucket
///     .put_object(PutObjectRequest::builder().key("a.txt").body("hi").build())
///     .await
///     .unwrap();
/// let download = bucket.get_object("a.txt".into()).await.unwrap().unwrap();
/// assert_eq!(download.body.as_ref(), b"hi");
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct Bucket {
    pub(crate) client: SiloClient,
    pub(crate) info: BucketInfo,
    /// Resource-level scope layer applied between client and call.
    pub(crate) scope: ScopeConfig,
}

impl Bucket {
    /// Build a handle around fetched bucket metadata. The bucket's region,
    /// when known, becomes the handle's resource-level scope.
    pub(crate) fn from_info(client: SiloClient, info: BucketInfo) -> Self {
        let scope = match &info.region {
            Some(region) => ScopeConfig::builder().region(region.clone()).build(),
            None => ScopeConfig::default(),
        };
        Self {
            client,
            info,
            scope,
        }
    }

    /// The bucket's name.
    #[must_use]
    pub fn name(&self) -> &BucketName {
        &self.info.name
    }

    /// The bucket metadata this handle was built from.
    #[must_use]
    pub fn info(&self) -> &BucketInfo {
        &self.info
    }

    /// Replace the handle's resource-level scope.
    #[must_use]
    pub fn with_scope(mut self, scope: ScopeConfig) -> Self {
        self.scope = scope;
        self
    }

    /// A handle to one object under this bucket; no backend call is made.
    ///
    /// # Errors
    ///
    /// Fails when the key is not a valid object key.
    pub fn object(&self, key: impl AsRef<str>) -> SiloResult<Object> {
        let key = ObjectKey::new(key.as_ref())?;
        Ok(Object::new(self.clone(), key))
    }

    pub(crate) fn resolve(&self, call: &ScopeConfig) -> ResolvedScope {
        resolve::resolve(call, &self.scope, &self.client.config.scope)
    }

    // -----------------------------------------------------------------------
    // Bucket lifecycle
    // -----------------------------------------------------------------------

    /// Whether this bucket currently exists.
    ///
    /// # Errors
    ///
    /// Fails when the existence check itself fails; a failed check is
    /// never coerced to `false`.
    pub async fn exists(&self) -> SiloResult<bool> {
        let scope = self.resolve(&ScopeConfig::default());
        self.client
            .backend
            .bucket_exists(&self.info.name, &scope)
            .await
            .map_err(|e| SiloError::from_backend_bucket(e, &self.info.name))
    }

    /// Delete this bucket if empty, tolerating its absence.
    ///
    /// Returns whether the bucket existed.
    ///
    /// # Errors
    ///
    /// Fails with [`SiloError::BucketNotEmpty`] when objects remain.
    pub async fn delete(&self) -> SiloResult<bool> {
        let scope = self.resolve(&ScopeConfig::default());
        match self.client.backend.delete_bucket(&self.info.name, &scope).await {
            Ok(()) => Ok(true),
            Err(err) if err.is_no_such_bucket() => Ok(false),
            Err(err) => Err(SiloError::from_backend_bucket(err, &self.info.name)),
        }
    }

    /// Empty this bucket, then delete it. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Fails with a phase-tagged [`SiloError::RecursiveDeleteFailed`].
    pub async fn delete_recursive(&self) -> SiloResult<bool> {
        let scope = self.resolve(&ScopeConfig::default());
        ops::bucket::delete_bucket_recursive(
            self.client.backend.clone(),
            &self.info.name,
            silo_model::DEFAULT_PAGE_SIZE,
            &scope,
        )
        .await
    }

    // -----------------------------------------------------------------------
    // Objects
    // -----------------------------------------------------------------------

    /// Store an object.
    ///
    /// # Errors
    ///
    /// Fails when the key is invalid or the upload fails.
    pub async fn put_object(&self, request: PutObjectRequest) -> SiloResult<ObjectMeta> {
        let key = ObjectKey::new(&request.key)?;
        let scope = self.resolve(&request.scope);
        self.client
            .backend
            .put_object(&self.info.name, &key, request.body, &request.options, &scope)
            .await
            .map_err(|e| SiloError::from_backend_object(e, &self.info.name, &key))
    }

    /// Fetch an object's payload and metadata, or `None` when the key
    /// does not exist.
    ///
    /// # Errors
    ///
    /// Fails when the bucket is missing or the fetch fails for any reason
    /// other than the key being absent.
    pub async fn get_object(
        &self,
        request: GetObjectRequest,
    ) -> SiloResult<Option<ObjectDownload>> {
        let key = ObjectKey::new(&request.key)?;
        let scope = self.resolve(&request.scope);
        match self
            .client
            .backend
            .get_object(&self.info.name, &key, &scope)
            .await
        {
            Ok(download) => Ok(Some(download)),
            Err(err) if err.is_no_such_key() => Ok(None),
            Err(err) => Err(SiloError::from_backend_object(err, &self.info.name, &key)),
        }
    }

    /// Fetch an object's metadata, or `None` when the key does not exist.
    ///
    /// # Errors
    ///
    /// Same policy as [`Bucket::get_object`].
    pub async fn stat_object(&self, request: StatObjectRequest) -> SiloResult<Option<ObjectMeta>> {
        let key = ObjectKey::new(&request.key)?;
        let scope = self.resolve(&request.scope);
        match self
            .client
            .backend
            .stat_object(&self.info.name, &key, &scope)
            .await
        {
            Ok(meta) => Ok(Some(meta)),
            Err(err) if err.is_no_such_key() => Ok(None),
            Err(err) => Err(SiloError::from_backend_object(err, &self.info.name, &key)),
        }
    }

    /// Whether an object exists at the request's key.
    ///
    /// # Errors
    ///
    /// Same policy as [`Bucket::stat_object`].
    pub async fn object_exists(&self, request: StatObjectRequest) -> SiloResult<bool> {
        Ok(self.stat_object(request).await?.is_some())
    }

    /// Delete one object, tolerating its absence. Returns whether the key
    /// existed.
    ///
    /// # Errors
    ///
    /// Fails when the delete fails for any reason other than the key
    /// already being gone.
    pub async fn delete_object(&self, request: DeleteObjectRequest) -> SiloResult<bool> {
        let key = ObjectKey::new(&request.key)?;
        let scope = self.resolve(&request.scope);
        match self
            .client
            .backend
            .delete_object(&self.info.name, &key, &scope)
            .await
        {
            Ok(()) => Ok(true),
            Err(err) if err.is_no_such_key() => Ok(false),
            Err(err) => Err(SiloError::from_backend_object(err, &self.info.name, &key)),
        }
    }

    /// Delete an explicit set of keys in bounded batches.
    ///
    /// Returns the number of keys deleted or already gone.
    ///
    /// # Errors
    ///
    /// Fails with [`SiloError::MultiObjectDeleteFailed`] listing every key
    /// that could not be removed for a reason other than already being
    /// absent.
    pub async fn delete_objects(&self, request: DeleteObjectsRequest) -> SiloResult<u64> {
        let keys = request
            .keys
            .iter()
            .map(|key| ObjectKey::new(key))
            .collect::<Result<Vec<_>, _>>()?;
        let scope = self.resolve(&request.scope);
        ops::purge::delete_keys(
            &*self.client.backend,
            &self.info.name,
            keys,
            request.page_size,
            &scope,
        )
        .await
    }

    /// Ensure an object exists at the key, creating it zero-byte if
    /// absent. See [`crate::ops::object::touch_object`] semantics: with
    /// `overwrite` unset an existing object is returned untouched.
    ///
    /// # Errors
    ///
    /// Fails with a phase-tagged [`SiloError::ObjectTouchFailed`].
    pub async fn touch_object(&self, request: TouchObjectRequest) -> SiloResult<ObjectMeta> {
        let key = ObjectKey::new(&request.key)?;
        let scope = self.resolve(&request.scope);
        ops::object::touch_object(
            &*self.client.backend,
            &self.info.name,
            &key,
            request.overwrite,
            &scope,
        )
        .await
    }

    // -----------------------------------------------------------------------
    // Listing
    // -----------------------------------------------------------------------

    /// Stream every object under the bucket (or under the request's
    /// prefix), recursively, fetching pages lazily.
    #[must_use]
    pub fn list(&self, request: ListObjectsRequest) -> BoxStream<'static, SiloResult<ObjectEntry>> {
        let scope = self.resolve(&request.scope);
        let spec = ListSpec {
            prefix: request.prefix,
            delimiter: None,
            start_after: None,
            page_size: request.page_size,
            include_delete_markers: request.include_delete_markers,
        };
        self.entry_stream(spec, scope)
    }

    /// Stream one directory level: objects directly under the prefix plus
    /// one common-prefix row per subdirectory.
    #[must_use]
    pub fn list_dir(&self, request: ListDirRequest) -> BoxStream<'static, SiloResult<ObjectEntry>> {
        let scope = self.resolve(&request.scope);
        let prefix = request.prefix.map(|p| {
            if p.ends_with(PATH_DELIMITER) {
                p
            } else {
                format!("{p}{PATH_DELIMITER}")
            }
        });
        let spec = ListSpec {
            prefix,
            delimiter: Some(PATH_DELIMITER.to_string()),
            start_after: None,
            page_size: request.page_size,
            include_delete_markers: false,
        };
        self.entry_stream(spec, scope)
    }

    /// Count the immediate subdirectories under the request's prefix.
    ///
    /// Drives a delimiter listing and counts its common-prefix rows;
    /// objects directly under the prefix are not counted.
    ///
    /// # Errors
    ///
    /// Fails when any listing page fails.
    pub async fn count_dirs(&self, request: ListDirRequest) -> SiloResult<u64> {
        let mut entries = self.list_dir(request);
        let mut dirs = 0u64;
        while let Some(entry) = entries.try_next().await? {
            if entry.is_prefix {
                dirs += 1;
            }
        }
        Ok(dirs)
    }

    fn entry_stream(
        &self,
        spec: ListSpec,
        scope: ResolvedScope,
    ) -> BoxStream<'static, SiloResult<ObjectEntry>> {
        let name = self.info.name.clone();
        let err_name = name.clone();
        ops::list::entry_stream(self.client.backend.clone(), name, spec, scope)
            .map_err(move |e| SiloError::from_backend_bucket(e, &err_name))
            .boxed()
    }

    // -----------------------------------------------------------------------
    // Purging
    // -----------------------------------------------------------------------

    /// Delete every live object under the request's prefix (the whole
    /// bucket when the prefix is empty). Returns the number purged.
    ///
    /// # Errors
    ///
    /// Fails with [`SiloError::MultiObjectDeleteFailed`] when keys are
    /// left behind.
    pub async fn purge_prefix(&self, request: PurgePrefixRequest) -> SiloResult<u64> {
        let scope = self.resolve(&request.scope);
        let prefix = if request.prefix.is_empty() {
            None
        } else {
            Some(request.prefix.as_str())
        };
        ops::purge::purge(
            self.client.backend.clone(),
            &self.info.name,
            prefix,
            request.page_size,
            &scope,
        )
        .await
        .map_err(ops::purge::PurgeFailure::into_error)
    }

    /// Delete a directory. Returns whether anything existed to delete.
    ///
    /// # Errors
    ///
    /// Fails with [`SiloError::DirectoryNotEmpty`] in non-recursive mode
    /// when keys besides the marker live under the prefix.
    pub async fn delete_dir(&self, request: DeleteDirRequest) -> SiloResult<bool> {
        let path = ObjectKey::new(&request.path)?;
        let scope = self.resolve(&request.scope);
        ops::object::delete_dir(
            self.client.backend.clone(),
            &self.info.name,
            &path,
            request.recursive,
            request.page_size,
            &scope,
        )
        .await
    }

    // -----------------------------------------------------------------------
    // Tags
    // -----------------------------------------------------------------------

    /// The bucket's full tag set; empty when it was never tagged.
    ///
    /// # Errors
    ///
    /// Fails when the bucket is missing or the fetch fails.
    pub async fn tags(&self, request: GetTagsRequest) -> SiloResult<TagSet> {
        let scope = self.resolve(&request.scope);
        self.client
            .backend
            .get_bucket_tags(&self.info.name, &scope)
            .await
            .map_err(|e| SiloError::from_backend_bucket(e, &self.info.name))
    }

    /// The value of one tag, if present.
    ///
    /// # Errors
    ///
    /// Same policy as [`Bucket::tags`].
    pub async fn tag_value(&self, key: impl AsRef<str>) -> SiloResult<Option<String>> {
        let tags = self.tags(GetTagsRequest::default()).await?;
        Ok(tags.get(key.as_ref()).map(str::to_owned))
    }

    /// Whether the bucket carries a tag under `key`.
    ///
    /// # Errors
    ///
    /// Same policy as [`Bucket::tags`].
    pub async fn has_tag(&self, key: impl AsRef<str>) -> SiloResult<bool> {
        let tags = self.tags(GetTagsRequest::default()).await?;
        Ok(tags.contains(key.as_ref()))
    }

    /// The number of tags on the bucket.
    ///
    /// # Errors
    ///
    /// Same policy as [`Bucket::tags`].
    pub async fn tag_count(&self) -> SiloResult<usize> {
        let tags = self.tags(GetTagsRequest::default()).await?;
        Ok(tags.len())
    }

    /// Replace the bucket's tag set. An empty set is a no-op rather than
    /// a clear; use [`Bucket::delete_all_tags`] to clear.
    ///
    /// # Errors
    ///
    /// Fails when the bucket is missing or the store call fails.
    pub async fn put_tags(&self, request: PutTagsRequest) -> SiloResult<()> {
        if request.tags.is_empty() {
            debug!(bucket = %self.info.name, "skipping empty tag replacement");
            return Ok(());
        }
        let scope = self.resolve(&request.scope);
        self.client
            .backend
            .put_bucket_tags(&self.info.name, &request.tags, &scope)
            .await
            .map_err(|e| SiloError::from_backend_bucket(e, &self.info.name))
    }

    /// Delete the tags named in the request, returning the tags actually
    /// removed. Untargeted tags survive.
    ///
    /// # Errors
    ///
    /// Fails with a phase-tagged [`SiloError::TagDeleteFailed`].
    pub async fn delete_tags(&self, request: DeleteTagsRequest) -> SiloResult<TagSet> {
        let keys: BTreeSet<String> = request.keys.into_iter().collect();
        let scope = self.resolve(&request.scope);
        let store = BucketTags {
            backend: &*self.client.backend,
            bucket: &self.info.name,
        };
        ops::tags::delete_tag_keys(&store, &keys, &scope).await
    }

    /// Delete every tag, returning the set that was present.
    ///
    /// # Errors
    ///
    /// Fails with a phase-tagged [`SiloError::TagDeleteFailed`].
    pub async fn delete_all_tags(&self, request: DeleteAllTagsRequest) -> SiloResult<TagSet> {
        let scope = self.resolve(&request.scope);
        let store = BucketTags {
            backend: &*self.client.backend,
            bucket: &self.info.name,
        };
        ops::tags::delete_all_tags(&store, &scope).await
    }
}
