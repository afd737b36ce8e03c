//! SessionId - Cheap-to-clone recording-session identifier
//!
//! Uses Arc<str> internally for O(1) clone operations.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

/// Recording-session identifier with cheap cloning.
///
/// Internally uses `Arc<str>` so cloning only increments a reference count
/// instead of allocating new memory. Session labels are created once when a
/// pose log is loaded and then cloned into every sample, window, and clip
/// that belongs to the session.
///
/// # Examples
/// ```
/// use contracts::SessionId;
///
/// let id: SessionId = "take_03".into();
/// let id2 = id.clone();  // O(1) - just increments ref count
/// assert_eq!(id, id2);
/// assert_eq!(id.as_str(), "take_03");
/// ```
#[derive(Clone, Default)]
pub struct SessionId(Arc<str>);

impl SessionId {
    /// Create a new SessionId from a string slice.
    #[inline]
    pub fn new(s: &str) -> Self {
        Self(Arc::from(s))
    }

    /// Get the underlying string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Label for the n-th run of this session when a gap splits it.
    ///
    /// Run 1 keeps the plain label; later runs get a numeric suffix so
    /// window and clip names stay unique.
    pub fn run_label(&self, run: usize) -> Self {
        if run <= 1 {
            self.clone()
        } else {
            Self::from(format!("{}-{run}", self.0))
        }
    }
}

// Deref to &str for easy string operations
impl Deref for SessionId {
    type Target = str;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for SessionId {
    #[inline]
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for SessionId {
    #[inline]
    fn borrow(&self) -> &str {
        &self.0
    }
}

// Conversions
impl From<&str> for SessionId {
    #[inline]
    fn from(s: &str) -> Self {
        Self(Arc::from(s))
    }
}

impl From<String> for SessionId {
    #[inline]
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

impl From<Arc<str>> for SessionId {
    #[inline]
    fn from(s: Arc<str>) -> Self {
        Self(s)
    }
}

// Display and Debug
impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionId({:?})", self.0)
    }
}

// Equality - can compare with &str, String, etc.
impl PartialEq for SessionId {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        // Fast path: same Arc pointer
        Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl Eq for SessionId {}

impl PartialEq<str> for SessionId {
    #[inline]
    fn eq(&self, other: &str) -> bool {
        self.0.as_ref() == other
    }
}

impl PartialEq<&str> for SessionId {
    #[inline]
    fn eq(&self, other: &&str) -> bool {
        self.0.as_ref() == *other
    }
}

impl PartialEq<String> for SessionId {
    #[inline]
    fn eq(&self, other: &String) -> bool {
        self.0.as_ref() == other
    }
}

// Hash - same as str hash for HashMap compatibility
impl Hash for SessionId {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state)
    }
}

// Serde support
impl Serialize for SessionId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SessionId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_clone_is_cheap() {
        let id1: SessionId = "morning_take".into();
        let id2 = id1.clone();

        // Both should point to same underlying data (Arc clone is O(1))
        assert_eq!(id1.as_str().as_ptr(), id2.as_str().as_ptr());
    }

    #[test]
    fn test_equality() {
        let id: SessionId = "take_01".into();
        assert_eq!(id, "take_01");
        assert_eq!(id, String::from("take_01"));
        assert_eq!(id, SessionId::from("take_01"));
    }

    #[test]
    fn test_hashmap_key() {
        let mut map: HashMap<SessionId, i32> = HashMap::new();
        map.insert("take_01".into(), 1);
        map.insert("take_02".into(), 2);

        // Can lookup with &str
        assert_eq!(map.get("take_01"), Some(&1));
        assert_eq!(map.get("take_02"), Some(&2));
    }

    #[test]
    fn test_run_label() {
        let id: SessionId = "take_01".into();
        assert_eq!(id.run_label(1), "take_01");
        assert_eq!(id.run_label(2), "take_01-2");
        assert_eq!(id.run_label(3), "take_01-3");
    }

    #[test]
    fn test_serde() {
        let id: SessionId = "take".into();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"take\"");

        let parsed: SessionId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }
}
