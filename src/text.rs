//! Charset conversion.
//!
//! String codecs treat text conversion as a black box behind [`TextCodec`].
//! The registry is resolved when a frame is built, so an unknown charset
//! name fails construction rather than surfacing mid-decode.

use std::sync::Arc;

use crate::error::FrameError;

/// A named bytes ↔ text conversion.
pub trait TextCodec: Send + Sync {
    fn name(&self) -> &'static str;
    fn decode(&self, bytes: &[u8]) -> Result<String, FrameError>;
    fn encode(&self, text: &str) -> Result<Vec<u8>, FrameError>;
}

impl std::fmt::Debug for dyn TextCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextCodec").field("name", &self.name()).finish()
    }
}

/// Looks a charset up by registry name (common aliases included).
pub fn charset(name: &str) -> Result<Arc<dyn TextCodec>, FrameError> {
    match name.to_ascii_lowercase().as_str() {
        "utf-8" | "utf8" => Ok(Arc::new(Utf8)),
        "ascii" | "us-ascii" => Ok(Arc::new(Ascii)),
        "iso-8859-1" | "latin-1" | "latin1" => Ok(Arc::new(Latin1)),
        _ => Err(FrameError::UnsupportedCharset(name.into())),
    }
}

struct Utf8;

impl TextCodec for Utf8 {
    fn name(&self) -> &'static str {
        "utf-8"
    }

    fn decode(&self, bytes: &[u8]) -> Result<String, FrameError> {
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| FrameError::Charset {
                charset: "utf-8",
                message: "invalid UTF-8 sequence",
            })
    }

    fn encode(&self, text: &str) -> Result<Vec<u8>, FrameError> {
        Ok(text.as_bytes().to_vec())
    }
}

struct Ascii;

impl TextCodec for Ascii {
    fn name(&self) -> &'static str {
        "ascii"
    }

    fn decode(&self, bytes: &[u8]) -> Result<String, FrameError> {
        if bytes.is_ascii() {
            Ok(bytes.iter().map(|&b| b as char).collect())
        } else {
            Err(FrameError::Charset {
                charset: "ascii",
                message: "byte outside the 7-bit range",
            })
        }
    }

    fn encode(&self, text: &str) -> Result<Vec<u8>, FrameError> {
        if text.is_ascii() {
            Ok(text.as_bytes().to_vec())
        } else {
            Err(FrameError::Charset {
                charset: "ascii",
                message: "character outside the 7-bit range",
            })
        }
    }
}

struct Latin1;

impl TextCodec for Latin1 {
    fn name(&self) -> &'static str {
        "iso-8859-1"
    }

    fn decode(&self, bytes: &[u8]) -> Result<String, FrameError> {
        // Every byte maps to the code point of the same value.
        Ok(bytes.iter().map(|&b| b as char).collect())
    }

    fn encode(&self, text: &str) -> Result<Vec<u8>, FrameError> {
        text.chars()
            .map(|c| {
                u8::try_from(u32::from(c)).map_err(|_| FrameError::Charset {
                    charset: "iso-8859-1",
                    message: "character outside the 8-bit range",
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::charset;

    #[test]
    fn lookup_aliases() {
        assert_eq!(charset("UTF-8").unwrap().name(), "utf-8");
        assert_eq!(charset("latin1").unwrap().name(), "iso-8859-1");
        charset("ebcdic").unwrap_err();
    }

    #[test]
    fn utf8_round_trip() {
        let codec = charset("utf-8").unwrap();
        let bytes = codec.encode("héllo").unwrap();
        assert_eq!(codec.decode(&bytes).unwrap(), "héllo");
    }

    #[test]
    fn ascii_rejects_high_bytes() {
        let codec = charset("ascii").unwrap();
        codec.decode(&[0x80]).unwrap_err();
        codec.encode("é").unwrap_err();
    }

    #[test]
    fn latin1_maps_all_bytes() {
        let codec = charset("iso-8859-1").unwrap();
        assert_eq!(codec.decode(&[0xE9]).unwrap(), "é");
        assert_eq!(codec.encode("é").unwrap(), vec![0xE9]);
    }
}
