//! Sentinel markers that separate the message from the diff.
//!
//! A [`Marker`] is a non-empty byte string. A line is a marker line when the
//! marker occurs anywhere inside it, including the line terminator.
//!
//! # Examples
//!
//! ```
//! use patchsplit::marker::Marker;
//!
//! let marker = Marker::cut_here();
//! assert!(marker.matches(b"-------- >8 cut here >8 --------\n"));
//! assert!(!marker.matches(b"Signed-off-by: A U Thor\n"));
//! ```

use error_set::error_set;
use nom::Parser;
use nom::bytes::complete::take_until;
use std::fmt;

/// Marker used by plain `cut here` submissions.
pub const CUT_HERE: &str = "cut here";

/// Marker used by submissions that carry a `VERSION.orig` context diff.
pub const VERSION_ORIG: &str = "*** VERSION.orig";

error_set! {
    /// Errors from building a marker
    ConfigError := {
        /// The marker text was empty, so every line would match
        #[display("Marker text cannot be empty")]
        EmptyMarker,
    }
}

/// A substring whose presence in a line marks the start of the diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker(Vec<u8>);

impl Marker {
    /// Build a marker from arbitrary text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyMarker`] for an empty string.
    pub fn new(text: impl Into<Vec<u8>>) -> Result<Self, ConfigError> {
        let bytes = text.into();
        if bytes.is_empty() {
            return Err(ConfigError::EmptyMarker);
        }
        Ok(Self(bytes))
    }

    /// The default `cut here` marker.
    pub fn cut_here() -> Self {
        Self(CUT_HERE.as_bytes().to_vec())
    }

    /// The `*** VERSION.orig` marker.
    pub fn version_orig() -> Self {
        Self(VERSION_ORIG.as_bytes().to_vec())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Check whether `line` contains this marker.
    pub fn matches(&self, line: &[u8]) -> bool {
        take_until::<_, _, nom::error::Error<&[u8]>>(self.0.as_slice())
            .parse(line)
            .is_ok()
    }
}

impl Default for Marker {
    fn default() -> Self {
        Self::cut_here()
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}
