use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{Error, Result};

/// How raw bytes are packaged for blob creation on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentEncoding {
    /// Standard base64; safe for any content.
    #[default]
    Base64,
    /// Send the bytes as-is; only valid for UTF-8 text.
    Utf8,
}

impl ContentEncoding {
    /// The encoding name the blob endpoint expects.
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::Base64 => "base64",
            Self::Utf8 => "utf-8",
        }
    }

    /// Encode `data` for the blob creation request body.
    ///
    /// # Errors
    /// Returns [`Error::Decode`] when `Utf8` is asked to carry non-UTF-8
    /// bytes.
    pub fn encode(self, data: &[u8]) -> Result<String> {
        match self {
            Self::Base64 => Ok(STANDARD.encode(data)),
            Self::Utf8 => std::str::from_utf8(data)
                .map(str::to_owned)
                .map_err(|e| Error::decode(format!("content is not valid utf-8: {}", e))),
        }
    }
}

/// Decode base64 file content from a read response.
///
/// The contents endpoint wraps base64 at 60 columns, so whitespace is
/// stripped before decoding.
pub fn decode_base64(content: &str) -> Result<Vec<u8>> {
    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| Error::decode(format!("invalid base64 content: {}", e)))
}
