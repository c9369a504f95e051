//! Resource tags.
//!
//! Buckets and objects carry up to ten key/value tags. Keys are unique and
//! unordered; equality is plain key/value equality. Limits follow the AWS
//! tagging rules and are enforced on insertion, so a constructed [`TagSet`]
//! is always within bounds.

use std::collections::BTreeMap;

/// Maximum number of tags allowed on a single bucket or object.
pub const MAX_TAGS: usize = 10;

/// Maximum length of a tag key in characters.
const MAX_TAG_KEY_LEN: usize = 128;

/// Maximum length of a tag value in characters.
const MAX_TAG_VALUE_LEN: usize = 256;

/// Error raised when a tag or tag set violates the AWS tagging limits.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid tag: {message}")]
pub struct TagError {
    /// Which limit was violated.
    pub message: String,
}

impl TagError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A validated set of resource tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    tags: BTreeMap<String, String>,
}

impl TagSet {
    /// Create an empty tag set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tag set from key/value pairs, validating each.
    ///
    /// # Errors
    ///
    /// Returns [`TagError`] if any pair violates the tagging limits or the
    /// set would exceed [`MAX_TAGS`] distinct keys.
    pub fn try_from_pairs<K, V, I>(pairs: I) -> Result<Self, TagError>
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut set = Self::new();
        for (key, value) in pairs {
            set.insert(key, value)?;
        }
        Ok(set)
    }

    /// Insert or replace a tag. Returns the previous value for the key.
    ///
    /// # Errors
    ///
    /// Returns [`TagError`] if the key is empty or longer than 128
    /// characters, the value is longer than 256 characters, or the set
    /// already holds [`MAX_TAGS`] other keys.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Option<String>, TagError> {
        let key = key.into();
        let value = value.into();
        validate_tag_key(&key)?;
        validate_tag_value(&value)?;
        if !self.tags.contains_key(&key) && self.tags.len() >= MAX_TAGS {
            return Err(TagError::new(format!(
                "tag count cannot be greater than {MAX_TAGS}"
            )));
        }
        Ok(self.tags.insert(key, value))
    }

    /// Remove a tag by key. Returns the removed value if the key existed.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.tags.remove(key)
    }

    /// The value for a key, if present.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    /// Whether the set holds a value for a key.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.tags.contains_key(key)
    }

    /// Number of tags in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Whether the set holds no tags.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Iterate over `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tags.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Iterate over tag keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.tags.keys().map(String::as_str)
    }
}

fn validate_tag_key(key: &str) -> Result<(), TagError> {
    if key.is_empty() {
        return Err(TagError::new("tag key must not be empty"));
    }
    let chars = key.chars().count();
    if chars > MAX_TAG_KEY_LEN {
        return Err(TagError::new(format!(
            "tag key must not exceed {MAX_TAG_KEY_LEN} characters, got {chars}"
        )));
    }
    Ok(())
}

fn validate_tag_value(value: &str) -> Result<(), TagError> {
    let chars = value.chars().count();
    if chars > MAX_TAG_VALUE_LEN {
        return Err(TagError::new(format!(
            "tag value must not exceed {MAX_TAG_VALUE_LEN} characters, got {chars}"
        )));
    }
    Ok(())
}
