//! Domain error taxonomy and wire-error translation.
//!
//! Backend primitives fail with [`BackendError`]; this module maps decoded
//! wire responses onto typed domain errors exactly once, at the backend
//! boundary. Transport and local failures are never translated: they pass
//! through [`SiloError::Backend`] with their source chain intact, so a
//! connection refusal can never masquerade as `BucketNotFound`.

use std::fmt;

use silo_model::error::{BackendError, WireCode};
use silo_model::name::NameError;
use silo_model::tags::TagError;
use silo_model::{BucketName, DeleteFailure, ObjectKey};

/// Result alias for facade operations.
pub type SiloResult<T> = Result<T, SiloError>;

// ---------------------------------------------------------------------------
// Phases
// ---------------------------------------------------------------------------

/// Steps of a targeted tag delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagDeletePhase {
    /// Reading the current tag set.
    Fetch,
    /// Clearing all tags.
    Clear,
    /// Re-appending the surviving tags.
    Restore,
}

impl fmt::Display for TagDeletePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Fetch => "Fetch",
            Self::Clear => "Clear",
            Self::Restore => "Restore",
        })
    }
}

/// Steps of a recursive bucket delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecursiveDeletePhase {
    /// Listing the bucket's objects.
    ListObjects,
    /// Bulk-deleting the listed objects.
    DeleteObjects,
    /// Deleting the emptied bucket.
    DeleteBucket,
}

impl fmt::Display for RecursiveDeletePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ListObjects => "ListObjects",
            Self::DeleteObjects => "DeleteObjects",
            Self::DeleteBucket => "DeleteBucket",
        })
    }
}

/// Steps of a bucket create or upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketPutPhase {
    /// Creating the bucket.
    CreateBucket,
    /// Applying the requested tags.
    PutTags,
    /// Re-fetching the bucket record.
    FetchBucket,
}

impl fmt::Display for BucketPutPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::CreateBucket => "CreateBucket",
            Self::PutTags => "PutTags",
            Self::FetchBucket => "FetchBucket",
        })
    }
}

/// Steps of an object touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    /// Checking whether the object already exists.
    Stat,
    /// Writing the zero-byte object.
    Put,
}

impl fmt::Display for TouchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Stat => "Stat",
            Self::Put => "Put",
        })
    }
}

// ---------------------------------------------------------------------------
// Resource
// ---------------------------------------------------------------------------

/// The resource a failed operation was acting on, for error messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    /// The bucket involved.
    pub bucket: String,
    /// The object key, when the operation targeted an object.
    pub key: Option<String>,
}

impl Resource {
    /// A bucket-level resource.
    #[must_use]
    pub fn bucket(name: &BucketName) -> Self {
        Self {
            bucket: name.to_string(),
            key: None,
        }
    }

    /// An object-level resource.
    #[must_use]
    pub fn object(bucket: &BucketName, key: &ObjectKey) -> Self {
        Self {
            bucket: bucket.to_string(),
            key: Some(key.to_string()),
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            Some(key) => write!(f, "object '{}/{}'", self.bucket, key),
            None => write!(f, "bucket '{}'", self.bucket),
        }
    }
}

// ---------------------------------------------------------------------------
// SiloError
// ---------------------------------------------------------------------------

/// Errors surfaced by facade operations.
#[derive(Debug, thiserror::Error)]
pub enum SiloError {
    /// The bucket does not exist.
    #[error("bucket not found: {bucket}")]
    BucketNotFound {
        /// The missing bucket.
        bucket: String,
    },

    /// The object does not exist.
    #[error("object not found: {bucket}/{key}")]
    ObjectNotFound {
        /// The bucket that was searched.
        bucket: String,
        /// The missing key.
        key: String,
    },

    /// The bucket name is taken by another owner.
    #[error("bucket already exists: {bucket}")]
    BucketAlreadyExists {
        /// The contested bucket name.
        bucket: String,
    },

    /// The bucket already exists and the caller owns it.
    #[error("bucket already owned by you: {bucket}")]
    BucketAlreadyOwnedByYou {
        /// The existing bucket.
        bucket: String,
    },

    /// The bucket still holds objects.
    #[error("bucket not empty: {bucket}")]
    BucketNotEmpty {
        /// The non-empty bucket.
        bucket: String,
    },

    /// A non-recursive directory delete found children under the prefix.
    #[error("directory not empty: {bucket}/{path}")]
    DirectoryNotEmpty {
        /// The bucket holding the directory.
        bucket: String,
        /// The directory path.
        path: String,
    },

    /// A bulk delete could not remove every requested object.
    #[error("bulk delete left {} object(s) behind in bucket {bucket}", failures.len())]
    MultiObjectDeleteFailed {
        /// The bucket the delete ran against.
        bucket: String,
        /// One entry per object that could not be removed.
        failures: Vec<DeleteFailure>,
    },

    /// A targeted tag delete failed part-way.
    #[error("tag delete failed during {phase} phase on {resource}")]
    TagDeleteFailed {
        /// The step that failed.
        phase: TagDeletePhase,
        /// The resource whose tags were being edited.
        resource: Resource,
        /// The underlying failure.
        #[source]
        source: Box<SiloError>,
    },

    /// A recursive bucket delete failed part-way.
    #[error("recursive delete failed during {phase} phase on {resource}")]
    RecursiveDeleteFailed {
        /// The step that failed.
        phase: RecursiveDeletePhase,
        /// The bucket being removed.
        resource: Resource,
        /// The underlying failure.
        #[source]
        source: Box<SiloError>,
    },

    /// A bucket create or upsert failed part-way.
    #[error("bucket put failed during {phase} phase on {resource}")]
    BucketPutFailed {
        /// The step that failed.
        phase: BucketPutPhase,
        /// The bucket being created.
        resource: Resource,
        /// The underlying failure.
        #[source]
        source: Box<SiloError>,
    },

    /// An object touch failed part-way.
    #[error("object touch failed during {phase} phase on {resource}")]
    ObjectTouchFailed {
        /// The step that failed.
        phase: TouchPhase,
        /// The object being touched.
        resource: Resource,
        /// The underlying failure.
        #[source]
        source: Box<SiloError>,
    },

    /// A bucket name failed validation.
    #[error("invalid bucket name {name:?}: {reason}")]
    InvalidBucketName {
        /// The offending name.
        name: String,
        /// Which rule was violated.
        reason: String,
    },

    /// An object key failed validation.
    #[error("invalid object key {key:?}: {reason}")]
    InvalidObjectKey {
        /// The offending key.
        key: String,
        /// Which rule was violated.
        reason: String,
    },

    /// A tag or tag set violates the tagging limits.
    #[error("invalid tag: {message}")]
    InvalidTag {
        /// Which limit was violated.
        message: String,
    },

    /// The store answered with a wire code outside the recognized set.
    #[error("unrecognized store error: {message}")]
    Generic {
        /// The formatted wire response.
        message: String,
        /// The original response, untouched.
        #[source]
        source: BackendError,
    },

    /// A transport or local failure that never produced a wire response.
    #[error(transparent)]
    Backend(anyhow::Error),
}

impl SiloError {
    /// Translate a backend failure using only the context carried in the
    /// response itself.
    #[must_use]
    pub fn from_backend(err: BackendError) -> Self {
        Self::translate(err, None, None)
    }

    /// Translate a backend failure from a bucket-level call.
    #[must_use]
    pub fn from_backend_bucket(err: BackendError, bucket: &BucketName) -> Self {
        Self::translate(err, Some(bucket.as_str()), None)
    }

    /// Translate a backend failure from an object-level call.
    #[must_use]
    pub fn from_backend_object(err: BackendError, bucket: &BucketName, key: &ObjectKey) -> Self {
        Self::translate(err, Some(bucket.as_str()), Some(key.as_str()))
    }

    /// Whether this error reports a missing bucket or object.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::BucketNotFound { .. } | Self::ObjectNotFound { .. }
        )
    }

    /// The wire-to-domain mapping. Response context wins over call-site
    /// context when both are present.
    fn translate(err: BackendError, ctx_bucket: Option<&str>, ctx_key: Option<&str>) -> Self {
        let resp = match err {
            BackendError::Transport(e) => return Self::Backend(e),
            BackendError::Response(resp) => resp,
        };

        let bucket = resp
            .bucket
            .clone()
            .or_else(|| ctx_bucket.map(str::to_owned))
            .unwrap_or_default();
        let key = resp
            .key
            .clone()
            .or_else(|| ctx_key.map(str::to_owned))
            .unwrap_or_default();

        match &resp.code {
            WireCode::NoSuchBucket => Self::BucketNotFound { bucket },
            code if code.is_no_such_key() => Self::ObjectNotFound { bucket, key },
            WireCode::BucketAlreadyExists => Self::BucketAlreadyExists { bucket },
            WireCode::BucketAlreadyOwnedByYou => Self::BucketAlreadyOwnedByYou { bucket },
            WireCode::BucketNotEmpty => Self::BucketNotEmpty { bucket },
            _ => Self::Generic {
                message: resp.to_string(),
                source: BackendError::Response(resp),
            },
        }
    }
}

impl From<NameError> for SiloError {
    fn from(err: NameError) -> Self {
        match err {
            NameError::InvalidBucketName { name, reason } => {
                Self::InvalidBucketName { name, reason }
            }
            NameError::InvalidObjectKey { key, reason } => Self::InvalidObjectKey { key, reason },
        }
    }
}

impl From<TagError> for SiloError {
    fn from(err: TagError) -> Self {
        Self::InvalidTag {
            message: err.message,
        }
    }
}
