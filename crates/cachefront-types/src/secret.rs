use serde::{Deserialize, Serialize};

use std::fmt;

/// A wrapper that redacts secret values in Debug and Display output.
///
/// Use this to wrap any `String` that might contain credential material.
/// The actual value is accessible via `.expose()`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redacted(String);

impl Redacted {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Access the underlying secret value.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Whether the wrapped value is the empty string.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Show masked representation: last 4 chars visible.
    ///
    /// Values of 4 chars or fewer are fully masked. Indexing is by char, so
    /// multibyte values never split a boundary.
    pub fn masked(&self) -> String {
        match self.0.char_indices().rev().nth(3) {
            Some((idx, _)) if idx > 0 => format!("****{}", &self.0[idx..]),
            _ => "****".to_string(),
        }
    }
}

impl fmt::Debug for Redacted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Redacted(\"***\")")
    }
}

impl fmt::Display for Redacted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***")
    }
}

/// A basic-auth credential pair.
///
/// A `Credentials` value exists only when BOTH username and password are
/// present and non-empty. A lone username or lone password disables
/// authentication entirely -- there is no partial-auth mode -- so
/// [`Credentials::from_parts`] collapses those cases to `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: Redacted,
    pub password: Redacted,
}

impl Credentials {
    /// Normalize two optional secrets into an optional credential pair.
    ///
    /// Returns `Some` only when both values are present and non-empty.
    /// Empty strings count as absent: shipping empty-string authentication
    /// material is never valid.
    pub fn from_parts(username: Option<String>, password: Option<String>) -> Option<Self> {
        match (username, password) {
            (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => Some(Self {
                username: Redacted::new(u),
                password: Redacted::new(p),
            }),
            _ => None,
        }
    }
}
