//! Redacting wrapper for credentials read from the environment.

use std::fmt;

use reqwest::header::HeaderValue;

use crate::error::ProbeFailure;

const REDACTED: &str = "<REDACTED>";

/// A credential whose value never appears in `Debug` or `Display` output.
///
/// # Example
///
/// ```
/// use pulsecheck::config::SecretString;
///
/// let key = SecretString::new("anon-key");
/// assert_eq!(format!("{key:?}"), "<REDACTED>");
/// assert_eq!(key.expose(), "anon-key");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct SecretString(String);

impl SecretString {
    /// Wrap a credential.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw credential. Only call this at the point of use.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns true if the credential is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Build an HTTP header value flagged as sensitive, so HTTP-level
    /// tracing does not print it either.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeFailure::Error`] if the credential contains bytes that
    /// are not valid in a header.
    pub fn header_value(&self) -> Result<HeaderValue, ProbeFailure> {
        let mut value = HeaderValue::from_str(&self.0)
            .map_err(|_| ProbeFailure::error("credential is not a valid header value"))?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl From<String> for SecretString {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SecretString {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
