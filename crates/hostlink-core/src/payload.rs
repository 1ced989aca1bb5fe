//! Structured payloads embedded in free-text event descriptions.
//!
//! The backend annotates some events with a machine-readable JSON object
//! buried inside an otherwise human-oriented description line, e.g.
//!
//! ```text
//! 0000019CF1ADB980 Event: broadcaster = 0000019CE845EEE8 (backend.broadcaster),
//! type = 0x00000020 (file-update), data = {{
//!   "file" : "/usr/local/lib/libfoo.so",
//!   "method" : 1,
//!   "size" : 1045
//! }}
//! ```
//!
//! Most events carry no payload at all, and descriptions may be
//! hard-wrapped, so extraction has to be forgiving: anything that does not
//! match the envelope, or whose body fails to decode, yields `None` with a
//! diagnostic log. One malformed payload must never interrupt the
//! surrounding event pipeline.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, trace};

/// Textual marker preceding the brace-delimited payload body.
pub const FILE_UPDATE_MARKER: &str = ", type = 0x00000020 (file-update), data = ";

/// What the backend is currently doing to the file being transferred.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "u8")]
pub enum FileProcessingMethod
{
    /// The file is being opened or read.
    #[default]
    Read,
    /// The transfer finished and the file was closed.
    Close,
}

impl TryFrom<u8> for FileProcessingMethod
{
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error>
    {
        match value {
            0 => Ok(Self::Read),
            1 => Ok(Self::Close),
            other => Err(format!("unknown file processing method: {other}")),
        }
    }
}

/// Progress update for one remote file transfer during attach.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct FileProcessingUpdate
{
    /// Read/close phase, encoded as a small integer on the wire.
    #[serde(default)]
    pub method: FileProcessingMethod,
    /// Path of the file being processed.
    #[serde(default)]
    pub file: String,
    /// File size in bytes.
    #[serde(default)]
    pub size: u64,
}

/// Extracts and decodes the embedded payload from an event description.
///
/// Stateless apart from the fixed envelope; safe to share freely between
/// threads.
#[derive(Debug, Default, Clone, Copy)]
pub struct EventDescriptionParser;

impl EventDescriptionParser
{
    #[must_use]
    pub fn new() -> Self
    {
        Self
    }

    /// Parse the payload embedded in `description` into `T`.
    ///
    /// Returns `None` when the envelope is absent or malformed, or when
    /// the body fails to decode; decoding is all-or-nothing. Never fails
    /// loudly.
    #[must_use]
    pub fn parse<T: DeserializeOwned>(&self, description: &str) -> Option<T>
    {
        // The envelope is defined over a single logical line; the backend
        // hard-wraps long descriptions.
        let normalized: String = description.chars().filter(|c| *c != '\r' && *c != '\n').collect();

        let fragment = extract_body(&normalized)?;
        match serde_json::from_str(fragment) {
            Ok(value) => Some(value),
            Err(err) => {
                debug!(%err, fragment, "embedded payload failed to decode");
                None
            }
        }
    }
}

/// Capture the brace-delimited body following the file-update marker.
///
/// The body spans from the brace right after the marker to the last
/// closing brace in the text. The backend prints its structured-data
/// dictionary with doubled braces; one layer is unwrapped so the fragment
/// is plain JSON.
fn extract_body(text: &str) -> Option<&str>
{
    let Some(marker_at) = text.find(FILE_UPDATE_MARKER) else {
        trace!("no embedded payload marker in event description");
        return None;
    };
    let rest = &text[marker_at + FILE_UPDATE_MARKER.len()..];

    if !rest.starts_with('{') {
        debug!("payload marker present but body is not brace-delimited");
        return None;
    }
    let Some(close_at) = rest.rfind('}') else {
        debug!("payload body has no closing brace");
        return None;
    };
    let body = &rest[..=close_at];

    if body.len() >= 4 && body.starts_with("{{") && body.ends_with("}}") {
        Some(&body[1..body.len() - 1])
    } else {
        Some(body)
    }
}
