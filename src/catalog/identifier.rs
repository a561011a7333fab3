//! Record identifiers and their derived renderings.

use std::fmt;

/// Opaque identifier naming one remote record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(String);

impl Identifier {
    /// Wraps a raw identifier string.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the identifier exactly as the catalog reported it.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the filesystem-safe form used as file name and document id.
    #[must_use]
    pub fn formatted(&self) -> String {
        format_identifier(&self.0)
    }

    /// Returns the identifier escaped for use as a single URL path segment.
    #[must_use]
    pub fn path_escaped(&self) -> String {
        urlencoding::encode(&self.0).into_owned()
    }

    /// Returns true for `.` and `..`, which URL parsing resolves away
    /// whether or not the dots are percent-encoded.
    #[must_use]
    pub fn is_dot_segment(&self) -> bool {
        matches!(self.0.as_str(), "." | "..")
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identifier {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// Replaces every backslash with an underscore.
#[must_use]
pub fn format_identifier(raw: &str) -> String {
    raw.replace('\\', "_")
}
