//! The client facade.
//!
//! [`SiloClient`] is the entry point: it owns the backend and the
//! client-level scope defaults, and hands out [`Bucket`] handles for
//! anything object-shaped. Client methods validate names, resolve the
//! scope cascade, and delegate; the multi-call flows live in
//! [`crate::ops`].

use std::sync::Arc;

use tracing::debug;

use silo_model::request::{
    BucketExistsRequest, CreateBucketRequest, DeleteBucketRequest, GetBucketRequest,
    ListBucketsRequest, RecursiveBucketDeleteRequest, UpsertBucketRequest,
};
use silo_model::{BucketInfo, BucketName, ResolvedScope, ScopeConfig};

use crate::backend::StorageBackend;
use crate::bucket::Bucket;
use crate::config::ClientConfig;
use crate::error::{SiloError, SiloResult};
use crate::ops;
use crate::resolve;

/// Handle to an S3-compatible store.
///
/// Cheap to clone; the backend and configuration are shared. Operations
/// taking a request struct accept a call-level [`ScopeConfig`] that
/// overrides the client-level defaults key by key.
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
///
/// let bucket = client.create_bucket("reports".into()).await.unwrap();
/// assert_eq!(bucket.name().as_str(), "reports");
/// assert!(client.bucket_exists("reports".into()).await.unwrap());
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct SiloClient {
    /// The wire collaborator everything is delegated to.
    pub(crate) backend: Arc<dyn StorageBackend>,
    /// Client configuration, including the outermost scope layer.
    pub(crate) config: Arc<ClientConfig>,
}

impl SiloClient {
    /// Create a client over the given backend.
    #[must_use]
    pub fn new(backend: Arc<dyn StorageBackend>, config: ClientConfig) -> Self {
        debug!(endpoint = %config.endpoint, "creating client");
        Self {
            backend,
            config: Arc::new(config),
        }
    }

    /// Returns a reference to the client configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Resolve a call-level scope against the client defaults, with no
    /// resource layer in between.
    pub(crate) fn resolve(&self, call: &ScopeConfig) -> ResolvedScope {
        resolve::resolve(call, &ScopeConfig::default(), &self.config.scope)
    }

    /// A local [`Bucket`] handle; no backend call is made.
    ///
    /// # Errors
    ///
    /// Fails when the name is not a valid bucket name.
    pub fn bucket(&self, name: impl AsRef<str>) -> SiloResult<Bucket> {
        let name = BucketName::new(name.as_ref())?;
        Ok(Bucket::from_info(
            self.clone(),
            BucketInfo {
                name,
                region: None,
                created_at: None,
            },
        ))
    }

    /// List every bucket visible to the caller, sorted by name.
    ///
    /// # Errors
    ///
    /// Fails when the backend listing fails.
    pub async fn list_buckets(&self, request: ListBucketsRequest) -> SiloResult<Vec<BucketInfo>> {
        let scope = self.resolve(&request.scope);
        self.backend
            .list_buckets(&scope)
            .await
            .map_err(SiloError::from_backend)
    }

    /// Whether a bucket exists.
    ///
    /// # Errors
    ///
    /// Fails when the name is invalid or the existence check itself fails;
    /// a failed check is never coerced to `false`.
    pub async fn bucket_exists(&self, request: BucketExistsRequest) -> SiloResult<bool> {
        let name = BucketName::new(&request.name)?;
        let scope = self.resolve(&request.scope);
        self.backend
            .bucket_exists(&name, &scope)
            .await
            .map_err(|e| SiloError::from_backend_bucket(e, &name))
    }

    /// Create a bucket, apply its initial tags, and return a handle to it.
    ///
    /// # Errors
    ///
    /// Fails with [`SiloError::BucketAlreadyExists`] or
    /// [`SiloError::BucketAlreadyOwnedByYou`] on a name collision, and
    /// with a phase-tagged [`SiloError::BucketPutFailed`] when a later
    /// step of the flow fails.
    pub async fn create_bucket(&self, request: CreateBucketRequest) -> SiloResult<Bucket> {
        let name = BucketName::new(&request.name)?;
        let scope = self.resolve(&request.scope);
        let info = ops::bucket::create_bucket(&*self.backend, &name, &request.tags, &scope).await?;
        Ok(Bucket::from_info(self.clone(), info))
    }

    /// Create a bucket if absent, otherwise adopt the existing one.
    ///
    /// Idempotent: calling it twice yields the same bucket with at most
    /// one underlying create succeeding. Tags apply to a freshly created
    /// bucket, and to an existing one only when the request sets
    /// `tag_on_collision`.
    ///
    /// # Errors
    ///
    /// Fails with a phase-tagged [`SiloError::BucketPutFailed`] when any
    /// step other than the tolerated collision fails.
    pub async fn upsert_bucket(&self, request: UpsertBucketRequest) -> SiloResult<Bucket> {
        let name = BucketName::new(&request.name)?;
        let scope = self.resolve(&request.scope);
        let info = ops::bucket::upsert_bucket(
            &*self.backend,
            &name,
            &request.tags,
            request.tag_on_collision,
            &scope,
        )
        .await?;
        Ok(Bucket::from_info(self.clone(), info))
    }

    /// Fetch an existing bucket by name.
    ///
    /// # Errors
    ///
    /// Fails with [`SiloError::BucketNotFound`] when no such bucket is
    /// visible to the caller.
    pub async fn get_bucket(&self, request: GetBucketRequest) -> SiloResult<Bucket> {
        let name = BucketName::new(&request.name)?;
        let scope = self.resolve(&request.scope);
        match ops::bucket::find_bucket(&*self.backend, &name, &scope).await? {
            Some(info) => Ok(Bucket::from_info(self.clone(), info)),
            None => Err(SiloError::BucketNotFound {
                bucket: name.to_string(),
            }),
        }
    }

    /// Delete an empty bucket, tolerating its absence.
    ///
    /// Returns whether the bucket existed.
    ///
    /// # Errors
    ///
    /// Fails with [`SiloError::BucketNotEmpty`] when objects remain, or
    /// when the backend call fails for any reason other than the bucket
    /// already being gone.
    pub async fn delete_bucket(&self, request: DeleteBucketRequest) -> SiloResult<bool> {
        let name = BucketName::new(&request.name)?;
        let scope = self.resolve(&request.scope);
        match self.backend.delete_bucket(&name, &scope).await {
            Ok(()) => Ok(true),
            Err(err) if err.is_no_such_bucket() => Ok(false),
            Err(err) => Err(SiloError::from_backend_bucket(err, &name)),
        }
    }

    /// Empty a bucket, then delete it.
    ///
    /// Returns whether the bucket existed. A bucket already gone at the
    /// start, or deleted concurrently after the purge, still counts as
    /// success.
    ///
    /// # Errors
    ///
    /// Fails with a phase-tagged [`SiloError::RecursiveDeleteFailed`]
    /// when listing, purging, or the final delete fails.
    pub async fn delete_bucket_recursive(
        &self,
        request: RecursiveBucketDeleteRequest,
    ) -> SiloResult<bool> {
        let name = BucketName::new(&request.name)?;
        let scope = self.resolve(&request.scope);
        ops::bucket::delete_bucket_recursive(
            self.backend.clone(),
            &name,
            request.page_size,
            &scope,
        )
        .await
    }
}
