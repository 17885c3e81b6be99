//! Resource identifiers.
//!
//! A [`ResourceId`] is an absolute URL naming a document or a container.
//! Containers are the identifiers whose path ends in `/`. Every identifier
//! except the root (`scheme://authority/`) has a parent container.

use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::error::{CoreError, CoreResult};

/// An absolute identifier for a document or container.
///
/// Query strings and fragments are stripped on construction, so two
/// identifiers compare equal exactly when they name the same stored resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(Url);

impl ResourceId {
    /// Parses an absolute URL into a resource identifier.
    ///
    /// ## Errors
    /// Returns `InvalidResourceId` if the input is not an absolute,
    /// hierarchical URL.
    pub fn parse(input: &str) -> CoreResult<Self> {
        let url = Url::parse(input)
            .map_err(|e| CoreError::InvalidResourceId(format!("{input}: {e}")))?;
        Self::from_url(url)
    }

    /// Wraps a URL, dropping its query and fragment.
    ///
    /// ## Errors
    /// Returns `InvalidResourceId` for URLs that cannot carry a path
    /// hierarchy (e.g. `mailto:`).
    pub fn from_url(mut url: Url) -> CoreResult<Self> {
        if url.cannot_be_a_base() {
            return Err(CoreError::InvalidResourceId(format!(
                "{url}: not a hierarchical URL"
            )));
        }
        url.set_query(None);
        url.set_fragment(None);
        Ok(Self(url))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    #[must_use]
    pub const fn as_url(&self) -> &Url {
        &self.0
    }

    /// Returns the path component (always starts with `/`).
    #[must_use]
    pub fn path(&self) -> &str {
        self.0.path()
    }

    /// Returns the origin (`scheme://host[:port]`) serialized as a string.
    #[must_use]
    pub fn origin(&self) -> String {
        self.0.origin().ascii_serialization()
    }

    #[must_use]
    pub fn is_container(&self) -> bool {
        self.path().ends_with('/')
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.path() == "/"
    }

    /// Returns the last path segment (empty for the root).
    #[must_use]
    pub fn name(&self) -> &str {
        let path = self.path();
        let trimmed = path.strip_suffix('/').unwrap_or(path);
        trimmed.rsplit('/').next().unwrap_or_default()
    }

    /// Returns the container holding this resource, or `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        let path = self.path();
        let trimmed = path.strip_suffix('/').unwrap_or(path);
        let cut = trimmed.rfind('/')?;
        let mut url = self.0.clone();
        url.set_path(&trimmed[..=cut]);
        Some(Self(url))
    }

    /// Iterates over the ancestor containers, nearest first, ending at the root.
    #[must_use]
    pub fn ancestors(&self) -> Ancestors {
        Ancestors {
            next: self.parent(),
        }
    }

    /// Returns `true` if `self` is a strict ancestor container of `other`.
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        self.is_container()
            && self.0.origin() == other.0.origin()
            && other.path().len() > self.path().len()
            && other.path().starts_with(self.path())
    }

    /// Returns the container form of this identifier (trailing `/` added).
    #[must_use]
    pub fn as_container(&self) -> Self {
        if self.is_container() {
            return self.clone();
        }
        let mut url = self.0.clone();
        let path = format!("{}/", self.path());
        url.set_path(&path);
        Self(url)
    }

    /// Returns the identifier with `suffix` appended to its path.
    #[must_use]
    pub fn with_suffix(&self, suffix: &str) -> Self {
        let mut url = self.0.clone();
        let path = format!("{}{suffix}", self.path());
        url.set_path(&path);
        Self(url)
    }

    /// Removes `suffix` from the end of the path, if present and if something
    /// other than the bare separator remains.
    #[must_use]
    pub fn strip_suffix(&self, suffix: &str) -> Option<Self> {
        let stripped = self.path().strip_suffix(suffix)?;
        if stripped.is_empty() {
            return None;
        }
        let mut url = self.0.clone();
        url.set_path(stripped);
        Some(Self(url))
    }

    /// Resolves a relative reference against this identifier.
    ///
    /// ## Errors
    /// Returns `InvalidResourceId` if the reference cannot be resolved.
    pub fn join(&self, reference: &str) -> CoreResult<Self> {
        let url = self
            .0
            .join(reference)
            .map_err(|e| CoreError::InvalidResourceId(format!("{reference}: {e}")))?;
        Self::from_url(url)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for ResourceId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl From<ResourceId> for Url {
    fn from(id: ResourceId) -> Self {
        id.0
    }
}

/// Iterator over the ancestor containers of a [`ResourceId`].
#[derive(Debug, Clone)]
pub struct Ancestors {
    next: Option<ResourceId>,
}

impl Iterator for Ancestors {
    type Item = ResourceId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.next = current.parent();
        Some(current)
    }
}
