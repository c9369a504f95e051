//! Wire-level error types.
//!
//! Backend primitives fail with [`BackendError`]: either an S3-style error
//! response carrying a [`WireCode`], or a transport/local failure with no
//! wire response at all. The domain-level taxonomy and the translation from
//! wire codes live in `silo-core`; this module only models what comes off
//! the wire.

use std::fmt;

/// S3 error code strings this facade recognizes.
///
/// Codes outside this set are preserved verbatim in [`WireCode::Other`]
/// so nothing is lost before translation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum WireCode {
    /// Access denied.
    AccessDenied,
    /// The requested bucket name is already in use by another owner.
    BucketAlreadyExists,
    /// The bucket already exists and is owned by the caller.
    BucketAlreadyOwnedByYou,
    /// The bucket still contains objects.
    BucketNotEmpty,
    /// The store hit an internal error.
    InternalError,
    /// A request argument was invalid.
    InvalidArgument,
    /// The specified bucket does not exist.
    NoSuchBucket,
    /// The specified key does not exist.
    NoSuchKey,
    /// The specified object does not exist (legacy alias for `NoSuchKey`).
    NoSuchObject,
    /// The resource carries no tag set.
    NoSuchTagSet,
    /// The store asked the client to slow down.
    SlowDown,
    /// Any code not otherwise recognized, preserved verbatim.
    Other(String),
}

impl WireCode {
    /// Map a wire code string onto the recognized set.
    #[must_use]
    pub fn parse(code: &str) -> Self {
        match code {
            "AccessDenied" => Self::AccessDenied,
            "BucketAlreadyExists" => Self::BucketAlreadyExists,
            "BucketAlreadyOwnedByYou" => Self::BucketAlreadyOwnedByYou,
            "BucketNotEmpty" => Self::BucketNotEmpty,
            "InternalError" => Self::InternalError,
            "InvalidArgument" => Self::InvalidArgument,
            "NoSuchBucket" => Self::NoSuchBucket,
            "NoSuchKey" => Self::NoSuchKey,
            "NoSuchObject" => Self::NoSuchObject,
            "NoSuchTagSet" => Self::NoSuchTagSet,
            "SlowDown" => Self::SlowDown,
            other => Self::Other(other.to_owned()),
        }
    }

    /// The wire representation of this code.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::AccessDenied => "AccessDenied",
            Self::BucketAlreadyExists => "BucketAlreadyExists",
            Self::BucketAlreadyOwnedByYou => "BucketAlreadyOwnedByYou",
            Self::BucketNotEmpty => "BucketNotEmpty",
            Self::InternalError => "InternalError",
            Self::InvalidArgument => "InvalidArgument",
            Self::NoSuchBucket => "NoSuchBucket",
            Self::NoSuchKey => "NoSuchKey",
            Self::NoSuchObject => "NoSuchObject",
            Self::NoSuchTagSet => "NoSuchTagSet",
            Self::SlowDown => "SlowDown",
            Self::Other(code) => code,
        }
    }

    /// The default human-readable message for this code.
    #[must_use]
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::AccessDenied => "Access Denied",
            Self::BucketAlreadyExists => {
                "The requested bucket name is not available. The bucket namespace is shared by all users of the system."
            }
            Self::BucketAlreadyOwnedByYou => {
                "The bucket you tried to create already exists, and you own it."
            }
            Self::BucketNotEmpty => "The bucket you tried to delete is not empty.",
            Self::InternalError => "We encountered an internal error. Please try again.",
            Self::InvalidArgument => "Invalid Argument",
            Self::NoSuchBucket => "The specified bucket does not exist.",
            Self::NoSuchKey | Self::NoSuchObject => "The specified key does not exist.",
            Self::NoSuchTagSet => "The TagSet does not exist.",
            Self::SlowDown => "Please reduce your request rate.",
            Self::Other(_) => "Unknown error",
        }
    }

    /// Whether this code means "object not found".
    #[must_use]
    pub fn is_no_such_key(&self) -> bool {
        matches!(self, Self::NoSuchKey | Self::NoSuchObject)
    }

    /// Whether this code reports a create-bucket name collision, regardless
    /// of owner.
    #[must_use]
    pub fn is_bucket_collision(&self) -> bool {
        matches!(self, Self::BucketAlreadyExists | Self::BucketAlreadyOwnedByYou)
    }
}

impl fmt::Display for WireCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// An S3-style error response as decoded by the backend.
#[derive(Debug, Clone)]
pub struct ErrorResponse {
    /// The wire error code.
    pub code: WireCode,
    /// The message carried with the response.
    pub message: String,
    /// The bucket the request concerned, when known.
    pub bucket: Option<String>,
    /// The object key the request concerned, when known.
    pub key: Option<String>,
    /// The request id assigned by the store, when known.
    pub request_id: Option<String>,
    /// The HTTP status the response arrived with, when known.
    pub status_code: Option<u16>,
}

impl ErrorResponse {
    /// Create a response with a code and message.
    #[must_use]
    pub fn new(code: WireCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            bucket: None,
            key: None,
            request_id: None,
            status_code: None,
        }
    }

    /// Create a response with the code's default message.
    #[must_use]
    pub fn from_code(code: WireCode) -> Self {
        let message = code.default_message().to_owned();
        Self::new(code, message)
    }

    /// Attach the bucket the request concerned.
    #[must_use]
    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = Some(bucket.into());
        self
    }

    /// Attach the object key the request concerned.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Attach the store-assigned request id.
    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Attach the HTTP status the response arrived with.
    #[must_use]
    pub fn with_status_code(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.as_str(), self.message)?;
        if let Some(bucket) = &self.bucket {
            write!(f, " (bucket: {bucket}")?;
            if let Some(key) = &self.key {
                write!(f, ", key: {key}")?;
            }
            write!(f, ")")?;
        } else if let Some(key) = &self.key {
            write!(f, " (key: {key})")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Backend error
// ---------------------------------------------------------------------------

/// What a backend primitive raises on failure.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The store answered with an S3-style error response.
    #[error("{0}")]
    Response(ErrorResponse),
    /// Transport or local failure that never produced a wire response.
    /// Never translated into a domain error; the source chain is preserved.
    #[error(transparent)]
    Transport(#[from] anyhow::Error),
}

impl BackendError {
    /// A `NoSuchBucket` response for a bucket.
    #[must_use]
    pub fn no_such_bucket(bucket: impl Into<String>) -> Self {
        Self::Response(ErrorResponse::from_code(WireCode::NoSuchBucket).with_bucket(bucket))
    }

    /// A `NoSuchKey` response for a key.
    #[must_use]
    pub fn no_such_key(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self::Response(
            ErrorResponse::from_code(WireCode::NoSuchKey)
                .with_bucket(bucket)
                .with_key(key),
        )
    }

    /// A `BucketAlreadyExists` response for a bucket.
    #[must_use]
    pub fn bucket_already_exists(bucket: impl Into<String>) -> Self {
        Self::Response(ErrorResponse::from_code(WireCode::BucketAlreadyExists).with_bucket(bucket))
    }

    /// A `BucketAlreadyOwnedByYou` response for a bucket.
    #[must_use]
    pub fn bucket_already_owned_by_you(bucket: impl Into<String>) -> Self {
        Self::Response(
            ErrorResponse::from_code(WireCode::BucketAlreadyOwnedByYou).with_bucket(bucket),
        )
    }

    /// A `BucketNotEmpty` response for a bucket.
    #[must_use]
    pub fn bucket_not_empty(bucket: impl Into<String>) -> Self {
        Self::Response(ErrorResponse::from_code(WireCode::BucketNotEmpty).with_bucket(bucket))
    }

    /// The wire code, when this error is a decoded response.
    #[must_use]
    pub fn wire_code(&self) -> Option<&WireCode> {
        match self {
            Self::Response(resp) => Some(&resp.code),
            Self::Transport(_) => None,
        }
    }

    /// Whether this is a `NoSuchBucket` response.
    #[must_use]
    pub fn is_no_such_bucket(&self) -> bool {
        matches!(self.wire_code(), Some(WireCode::NoSuchBucket))
    }

    /// Whether this is a `NoSuchKey`/`NoSuchObject` response.
    #[must_use]
    pub fn is_no_such_key(&self) -> bool {
        self.wire_code().is_some_and(WireCode::is_no_such_key)
    }

    /// Whether this is a create-bucket name collision, regardless of owner.
    #[must_use]
    pub fn is_bucket_collision(&self) -> bool {
        self.wire_code().is_some_and(WireCode::is_bucket_collision)
    }
}
