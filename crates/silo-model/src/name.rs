//! Validated resource names.
//!
//! Bucket names follow the rules defined in the
//! [Amazon S3 documentation](https://docs.aws.amazon.com/AmazonS3/latest/userguide/bucketnamingrules.html);
//! object keys are limited to 1 KiB of UTF-8. Both are validated once at
//! construction so the rest of the facade can pass them around without
//! re-checking.

use std::fmt;
use std::net::Ipv4Addr;

/// Key delimiter that separates "directory" levels inside an object key.
pub const PATH_DELIMITER: char = '/';

/// Minimum bucket name length.
const MIN_BUCKET_NAME_LEN: usize = 3;

/// Maximum bucket name length.
const MAX_BUCKET_NAME_LEN: usize = 63;

/// Maximum object key length in bytes.
const MAX_KEY_BYTES: usize = 1024;

/// Error raised when a resource name fails validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    /// The bucket name violates one of the S3 naming rules.
    #[error("invalid bucket name {name:?}: {reason}")]
    InvalidBucketName {
        /// The offending name.
        name: String,
        /// Which rule was violated.
        reason: String,
    },
    /// The object key is empty or too long.
    #[error("invalid object key {key:?}: {reason}")]
    InvalidObjectKey {
        /// The offending key.
        key: String,
        /// Which rule was violated.
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// BucketName
// ---------------------------------------------------------------------------

/// A validated S3 bucket name.
///
/// Construction enforces the full AWS rule set, so holding a `BucketName`
/// is proof the name is well-formed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BucketName(String);

impl BucketName {
    /// Validate and wrap a bucket name.
    ///
    /// Rules (per AWS documentation):
    /// - 3-63 characters long
    /// - Only lowercase letters, numbers, hyphens, and dots
    /// - Must start and end with a letter or number
    /// - No consecutive dots (`..`)
    /// - Not formatted as an IPv4 address (e.g. `192.168.0.1`)
    /// - Must not start with `xn--` or `sthree-`
    /// - Must not end with `-s3alias`
    ///
    /// # Errors
    ///
    /// Returns [`NameError::InvalidBucketName`] naming the violated rule.
    pub fn new(name: impl Into<String>) -> Result<Self, NameError> {
        let name = name.into();
        validate_bucket_name(&name)?;
        Ok(Self(name))
    }

    /// The name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the wrapper and return the owned string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for BucketName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for BucketName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for BucketName {
    type Error = NameError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<String> for BucketName {
    type Error = NameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

fn validate_bucket_name(name: &str) -> Result<(), NameError> {
    let invalid = |reason: String| NameError::InvalidBucketName {
        name: name.to_owned(),
        reason,
    };

    let len = name.len();
    if !(MIN_BUCKET_NAME_LEN..=MAX_BUCKET_NAME_LEN).contains(&len) {
        return Err(invalid(format!(
            "must be between {MIN_BUCKET_NAME_LEN} and {MAX_BUCKET_NAME_LEN} characters long"
        )));
    }

    if !name
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'.')
    {
        return Err(invalid(
            "must only contain lowercase letters, numbers, hyphens, and dots".to_owned(),
        ));
    }

    let first = name.as_bytes()[0];
    let last = name.as_bytes()[len - 1];
    if !(first.is_ascii_lowercase() || first.is_ascii_digit())
        || !(last.is_ascii_lowercase() || last.is_ascii_digit())
    {
        return Err(invalid(
            "must start and end with a letter or number".to_owned(),
        ));
    }

    if name.contains("..") {
        return Err(invalid("must not contain consecutive dots".to_owned()));
    }

    if name.parse::<Ipv4Addr>().is_ok() {
        return Err(invalid("must not be formatted as an IP address".to_owned()));
    }

    if name.starts_with("xn--") {
        return Err(invalid("must not start with 'xn--'".to_owned()));
    }

    if name.ends_with("-s3alias") {
        return Err(invalid("must not end with '-s3alias'".to_owned()));
    }

    if name.starts_with("sthree-") {
        return Err(invalid("must not start with 'sthree-'".to_owned()));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// ObjectKey
// ---------------------------------------------------------------------------

/// A validated S3 object key.
///
/// Keys ending in [`PATH_DELIMITER`] denote directory markers.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectKey(String);

impl ObjectKey {
    /// Validate and wrap an object key.
    ///
    /// Rules:
    /// - 1-1024 bytes in length
    /// - Must be valid UTF-8 (enforced by the `String` type)
    ///
    /// # Errors
    ///
    /// Returns [`NameError::InvalidObjectKey`] if the key is empty or too
    /// long.
    pub fn new(key: impl Into<String>) -> Result<Self, NameError> {
        let key = key.into();
        if key.is_empty() {
            return Err(NameError::InvalidObjectKey {
                key,
                reason: "must not be empty".to_owned(),
            });
        }
        if key.len() > MAX_KEY_BYTES {
            return Err(NameError::InvalidObjectKey {
                key,
                reason: format!("must not exceed {MAX_KEY_BYTES} bytes"),
            });
        }
        Ok(Self(key))
    }

    /// The key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the wrapper and return the owned string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }

    /// Whether this key denotes a directory marker (ends with `/`).
    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.0.ends_with(PATH_DELIMITER)
    }

    /// This key with a trailing delimiter ensured, for use as a directory
    /// marker or listing prefix.
    #[must_use]
    pub fn to_dir_key(&self) -> Self {
        if self.is_dir() {
            self.clone()
        } else {
            Self(format!("{}{}", self.0, PATH_DELIMITER))
        }
    }

    /// The final path segment of the key, ignoring a trailing delimiter.
    #[must_use]
    pub fn file_name(&self) -> &str {
        let trimmed = self.0.trim_end_matches(PATH_DELIMITER);
        trimmed
            .rsplit(PATH_DELIMITER)
            .next()
            .unwrap_or(trimmed)
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ObjectKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for ObjectKey {
    type Error = NameError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<String> for ObjectKey {
    type Error = NameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
