//! Domain newtypes with validation
//!
//! Strongly-typed wrappers for run identifiers and item path keys.
//! Each newtype ensures data validity at construction time.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::DomainError;

// ============================================================================
// RunId
// ============================================================================

/// Identifier for one synchronization run
///
/// The estimator is rebuilt for every run; the id only travels with
/// broadcast events and log fields so observers can tell runs apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(Uuid);

impl RunId {
    /// Create a new random RunId
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for RunId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RunId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| DomainError::InvalidId(format!("Invalid RunId: {e}")))
    }
}

// ============================================================================
// ItemPath
// ============================================================================

/// Path of an item relative to the synchronized folder, e.g. `"docs/a.txt"`
///
/// Used as the unique key for an item during a run. Paths are relative,
/// use `/` as separator, and never contain empty or `..` components.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemPath(String);

impl ItemPath {
    /// Create a new ItemPath
    ///
    /// # Errors
    /// Returns `DomainError::InvalidPath` if the path is empty, absolute,
    /// contains `//`, or has a `..` component
    pub fn new(path: impl Into<String>) -> Result<Self, DomainError> {
        let path = path.into();

        if path.is_empty() {
            return Err(DomainError::InvalidPath("Path must not be empty".into()));
        }

        if path.starts_with('/') {
            return Err(DomainError::InvalidPath(format!(
                "Path must be relative to the sync folder: {path}"
            )));
        }

        if path.contains("//") {
            return Err(DomainError::InvalidPath(format!(
                "Path contains invalid double slashes: {path}"
            )));
        }

        if path.split('/').any(|component| component == "..") {
            return Err(DomainError::InvalidPath(format!(
                "Path contains invalid traversal: {path}"
            )));
        }

        Ok(Self(path))
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

}

impl Display for ItemPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ItemPath {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ItemPath {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ItemPath> for String {
    fn from(path: ItemPath) -> Self {
        path.0
    }
}

impl AsRef<str> for ItemPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
