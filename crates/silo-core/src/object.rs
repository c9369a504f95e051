//! The single-object handle.

use std::collections::BTreeSet;

use bytes::Bytes;
use tracing::debug;

use silo_model::request::{GetObjectRequest, StatObjectRequest, TouchObjectRequest};
use silo_model::{
    ObjectDownload, ObjectKey, ObjectMeta, PutOptions, ScopeConfig, TagSet,
};

use crate::bucket::Bucket;
use crate::error::{SiloError, SiloResult};
use crate::ops;
use crate::ops::tags::ObjectTags;

/// Handle to one key in one bucket.
///
/// Built by [`Bucket::object`]; operations resolve their scope through
/// the owning bucket handle, so a call-level override belongs on the
/// bucket (see [`Bucket::with_scope`]).
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use silo_core::SiloClient;
/// use silo_core::backend::memory::InMemoryBackend;
/// use silo_core::config::ClientConfig;
///
/// # tokio_test::block_on(async {
/// let client = SiloClient::new(Arc::new(InMemoryBackend::new()), ClientConfig::default());
/// let bucket = client.create_bucket("logs".into()).await.unwrap();
///
/// let object = bucket.object("2024/app.log").unwrap();
/// object.upload("line one\n").await.unwrap();
/// assert!(object.exists().await.unwrap());
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct Object {
    bucket: Bucket,
    key: ObjectKey,
}

impl Object {
    pub(crate) fn new(bucket: Bucket, key: ObjectKey) -> Self {
        Self { bucket, key }
    }

    /// The object's key.
    #[must_use]
    pub fn key(&self) -> &ObjectKey {
        &self.key
    }

    /// The bucket this handle points into.
    #[must_use]
    pub fn bucket(&self) -> &Bucket {
        &self.bucket
    }

    // -----------------------------------------------------------------------
    // Payload
    // -----------------------------------------------------------------------

    /// Upload a payload under this key with default options.
    ///
    /// # Errors
    ///
    /// Fails when the upload fails.
    pub async fn upload(&self, body: impl Into<Bytes>) -> SiloResult<ObjectMeta> {
        self.upload_with(body, PutOptions::default()).await
    }

    /// Upload a payload with explicit content type, tags, or metadata.
    ///
    /// # Errors
    ///
    /// Fails when the upload fails.
    pub async fn upload_with(
        &self,
        body: impl Into<Bytes>,
        options: PutOptions,
    ) -> SiloResult<ObjectMeta> {
        let scope = self.bucket.resolve(&ScopeConfig::default());
        self.bucket
            .client
            .backend
            .put_object(self.bucket.name(), &self.key, body.into(), &options, &scope)
            .await
            .map_err(|e| SiloError::from_backend_object(e, self.bucket.name(), &self.key))
    }

    /// Fetch the payload and metadata, or `None` when the key is absent.
    ///
    /// # Errors
    ///
    /// Fails when the bucket is missing or the fetch fails for any
    /// reason other than the key being absent.
    pub async fn download(&self) -> SiloResult<Option<ObjectDownload>> {
        self.bucket
            .get_object(GetObjectRequest::from(self.key.as_str()))
            .await
    }

    /// Fetch the metadata, or `None` when the key is absent.
    ///
    /// # Errors
    ///
    /// Same policy as [`Object::download`].
    pub async fn stat(&self) -> SiloResult<Option<ObjectMeta>> {
        self.bucket
            .stat_object(StatObjectRequest::from(self.key.as_str()))
            .await
    }

    /// Whether an object currently exists at this key.
    ///
    /// # Errors
    ///
    /// Fails when the check itself fails; a failed check is never
    /// coerced to `false`.
    pub async fn exists(&self) -> SiloResult<bool> {
        Ok(self.stat().await?.is_some())
    }

    /// Delete the object, tolerating its absence. Returns whether it
    /// existed.
    pub async fn delete(&self) -> SiloResult<bool> {
        self.bucket
            .delete_object(self.key.as_str().into())
            .await
    }

    /// Ensure an object exists here, creating it zero-byte if absent.
    /// An existing object is returned untouched.
    ///
    /// # Errors
    ///
    /// Fails with a phase-tagged [`SiloError::ObjectTouchFailed`].
    pub async fn touch(&self) -> SiloResult<ObjectMeta> {
        self.bucket
            .touch_object(TouchObjectRequest::from(self.key.as_str()))
            .await
    }

    // -----------------------------------------------------------------------
    // Tags
    // -----------------------------------------------------------------------

    /// The object's full tag set; empty when it was never tagged.
    ///
    /// # Errors
    ///
    /// Fails when the object is missing or the fetch fails.
    pub async fn tags(&self) -> SiloResult<TagSet> {
        let scope = self.bucket.resolve(&ScopeConfig::default());
        self.bucket
            .client
            .backend
            .get_object_tags(self.bucket.name(), &self.key, &scope)
            .await
            .map_err(|e| SiloError::from_backend_object(e, self.bucket.name(), &self.key))
    }

    /// The value of one tag, if present.
    ///
    /// # Errors
    ///
    /// Same policy as [`Object::tags`].
    pub async fn tag_value(&self, key: impl AsRef<str>) -> SiloResult<Option<String>> {
        let tags = self.tags().await?;
        Ok(tags.get(key.as_ref()).map(str::to_owned))
    }

    /// Whether the object carries a tag under `key`.
    ///
    /// # Errors
    ///
    /// Same policy as [`Object::tags`].
    pub async fn has_tag(&self, key: impl AsRef<str>) -> SiloResult<bool> {
        let tags = self.tags().await?;
        Ok(tags.contains(key.as_ref()))
    }

    /// The number of tags on the object.
    ///
    /// # Errors
    ///
    /// Same policy as [`Object::tags`].
    pub async fn tag_count(&self) -> SiloResult<usize> {
        let tags = self.tags().await?;
        Ok(tags.len())
    }

    /// Replace the object's tag set. An empty set is a no-op rather than
    /// a clear; use [`Object::delete_all_tags`] to clear.
    ///
    /// # Errors
    ///
    /// Fails when the object is missing or the store call fails.
    pub async fn put_tags(&self, tags: TagSet) -> SiloResult<()> {
        if tags.is_empty() {
            debug!(
                bucket = %self.bucket.name(),
                key = %self.key,
                "skipping empty tag replacement"
            );
            return Ok(());
        }
        let scope = self.bucket.resolve(&ScopeConfig::default());
        self.bucket
            .client
            .backend
            .put_object_tags(self.bucket.name(), &self.key, &tags, &scope)
            .await
            .map_err(|e| SiloError::from_backend_object(e, self.bucket.name(), &self.key))
    }

    /// Delete the named tag keys, returning the tags actually removed.
    /// Untargeted tags survive.
    ///
    /// # Errors
    ///
    /// Fails with a phase-tagged [`SiloError::TagDeleteFailed`].
    pub async fn delete_tags<I, K>(&self, keys: I) -> SiloResult<TagSet>
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let keys: BTreeSet<String> = keys.into_iter().map(Into::into).collect();
        let scope = self.bucket.resolve(&ScopeConfig::default());
        let store = ObjectTags {
            backend: &*self.bucket.client.backend,
            bucket: self.bucket.name(),
            key: &self.key,
        };
        ops::tags::delete_tag_keys(&store, &keys, &scope).await
    }

    /// Delete every tag, returning the set that was present.
    ///
    /// # Errors
    ///
    /// Fails with a phase-tagged [`SiloError::TagDeleteFailed`].
    pub async fn delete_all_tags(&self) -> SiloResult<TagSet> {
        let scope = self.bucket.resolve(&ScopeConfig::default());
        let store = ObjectTags {
            backend: &*self.bucket.client.backend,
            bucket: self.bucket.name(),
            key: &self.key,
        };
        ops::tags::delete_all_tags(&store, &scope).await
    }
}
