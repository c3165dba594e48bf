use std::sync::Arc;

use bytes::{Bytes, BytesMut};

use crate::codecs::delimited::DelimiterSet;
use crate::codecs::finite::read_exact;
use crate::error::FrameError;
use crate::text::{charset, TextCodec};
use crate::value::Val;
use crate::{BufSeq, Codec, Framing, Progress};

/// Text in the named charset, spanning its whole region.
///
/// Consumes everything it is given, so it belongs inside a delimited or
/// finite wrapper (or at the top of a complete input), never at the top of
/// an unbounded stream.
pub fn string(charset_name: &str) -> Result<Codec, FrameError> {
    Ok(Codec::new(StringCodec {
        text: charset(charset_name)?,
    }))
}

/// Text occupying exactly `len` bytes.
pub fn string_len(charset_name: &str, len: usize) -> Result<Codec, FrameError> {
    Ok(Codec::new(StringLen {
        text: charset(charset_name)?,
        len,
    }))
}

/// Text terminated by any of `delimiters`; the delimiter is stripped on
/// decode and the first of the set appended on encode.
pub fn string_delimited<B: Into<Bytes>>(
    charset_name: &str,
    delimiters: impl IntoIterator<Item = B>,
) -> Result<Codec, FrameError> {
    Ok(Codec::new(StringDelimited {
        text: charset(charset_name)?,
        set: DelimiterSet::new(delimiters),
    }))
}

struct StringCodec {
    text: Arc<dyn TextCodec>,
}

impl Framing for StringCodec {
    fn read(&self, buf: BufSeq) -> Result<Progress, FrameError> {
        let text = self.text.decode(&buf.contiguous())?;
        Ok(Progress::Done(Val::Str(text), BufSeq::new()))
    }

    fn write(&self, val: &Val, out: &mut BytesMut) -> Result<(), FrameError> {
        out.extend_from_slice(&self.text.encode(val.as_str()?)?);
        Ok(())
    }
}

struct StringLen {
    text: Arc<dyn TextCodec>,
    len: usize,
}

impl Framing for StringLen {
    fn read(&self, buf: BufSeq) -> Result<Progress, FrameError> {
        let text = self.text.clone();
        read_exact(self.len, BufSeq::new(), buf, move |region, rest| {
            Ok(Progress::Done(
                Val::Str(text.decode(&region.contiguous())?),
                rest,
            ))
        })
    }

    fn write(&self, val: &Val, out: &mut BytesMut) -> Result<(), FrameError> {
        let bytes = self.text.encode(val.as_str()?)?;
        if bytes.len() != self.len {
            return Err(FrameError::ShapeMismatch {
                expected: self.len,
                found: bytes.len(),
            });
        }
        out.extend_from_slice(&bytes);
        Ok(())
    }

    fn size(&self) -> Option<usize> {
        Some(self.len)
    }
}

struct StringDelimited {
    text: Arc<dyn TextCodec>,
    set: DelimiterSet,
}

impl Framing for StringDelimited {
    fn read(&self, buf: BufSeq) -> Result<Progress, FrameError> {
        let text = self.text.clone();
        self.set.read_region(false, buf, move |body, rest| {
            Ok(Progress::Done(
                Val::Str(text.decode(&body.contiguous())?),
                rest,
            ))
        })
    }

    fn write(&self, val: &Val, out: &mut BytesMut) -> Result<(), FrameError> {
        out.extend_from_slice(&self.text.encode(val.as_str()?)?);
        out.extend_from_slice(self.set.first());
        Ok(())
    }
}

#[derive(Clone, Copy)]
enum Numeric {
    Integer,
    Float,
}

impl Numeric {
    fn parse(&self, text: &str) -> Result<Val, FrameError> {
        let parsed = match self {
            Numeric::Integer => text.parse::<i64>().ok().map(Val::Int),
            Numeric::Float => text.parse::<f64>().ok().map(Val::Float),
        };
        parsed.ok_or(FrameError::TypeMismatch {
            expected: "numeric text",
            found: Val::Str(text.to_owned()),
        })
    }

    fn format(&self, val: &Val) -> Result<String, FrameError> {
        let formatted = match self {
            Numeric::Integer => val.to_i64().map(|n| n.to_string()),
            Numeric::Float => val.to_f64().map(|x| x.to_string()),
        };
        formatted.ok_or(FrameError::TypeMismatch {
            expected: "number",
            found: val.clone(),
        })
    }
}

/// An integer written as text, spanning its whole region.
pub fn string_integer(charset_name: &str) -> Result<Codec, FrameError> {
    Ok(Codec::new(StringNumber {
        text: charset(charset_name)?,
        numeric: Numeric::Integer,
        set: None,
    }))
}

/// An integer written as text and terminated by a delimiter.
pub fn string_integer_delimited<B: Into<Bytes>>(
    charset_name: &str,
    delimiters: impl IntoIterator<Item = B>,
) -> Result<Codec, FrameError> {
    Ok(Codec::new(StringNumber {
        text: charset(charset_name)?,
        numeric: Numeric::Integer,
        set: Some(DelimiterSet::new(delimiters)),
    }))
}

/// A float written as text, spanning its whole region.
pub fn string_float(charset_name: &str) -> Result<Codec, FrameError> {
    Ok(Codec::new(StringNumber {
        text: charset(charset_name)?,
        numeric: Numeric::Float,
        set: None,
    }))
}

/// A float written as text and terminated by a delimiter.
pub fn string_float_delimited<B: Into<Bytes>>(
    charset_name: &str,
    delimiters: impl IntoIterator<Item = B>,
) -> Result<Codec, FrameError> {
    Ok(Codec::new(StringNumber {
        text: charset(charset_name)?,
        numeric: Numeric::Float,
        set: Some(DelimiterSet::new(delimiters)),
    }))
}

struct StringNumber {
    text: Arc<dyn TextCodec>,
    numeric: Numeric,
    set: Option<DelimiterSet>,
}

impl Framing for StringNumber {
    fn read(&self, buf: BufSeq) -> Result<Progress, FrameError> {
        match &self.set {
            None => {
                let text = self.text.decode(&buf.contiguous())?;
                Ok(Progress::Done(self.numeric.parse(&text)?, BufSeq::new()))
            }
            Some(set) => {
                let text = self.text.clone();
                let numeric = self.numeric;
                set.read_region(false, buf, move |body, rest| {
                    let decoded = text.decode(&body.contiguous())?;
                    Ok(Progress::Done(numeric.parse(&decoded)?, rest))
                })
            }
        }
    }

    fn write(&self, val: &Val, out: &mut BytesMut) -> Result<(), FrameError> {
        out.extend_from_slice(&self.text.encode(&self.numeric.format(val)?)?);
        if let Some(set) = &self.set {
            out.extend_from_slice(set.first());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{decode, encode, StreamDecoder};

    #[test]
    fn unknown_charset_fails_at_build() {
        string("ebcdic").unwrap_err();
        string_delimited("ebcdic", ["\n"]).unwrap_err();
    }

    #[test]
    fn whole_region() {
        let codec = string("utf-8").unwrap();
        assert_eq!(decode(&codec, b"hello").unwrap(), Val::Str("hello".into()));
    }

    #[test]
    fn fixed_length() {
        let codec = string_len("utf-8", 5).unwrap();
        let val = Val::Str("hello".into());
        let bytes = encode(&codec, &val).unwrap();
        assert_eq!(bytes.contiguous().as_ref(), b"hello");
        assert_eq!(decode(&codec, bytes).unwrap(), val);
        encode(&codec, &Val::Str("hi".into())).unwrap_err();
    }

    #[test]
    fn delimited_round_trip() {
        let codec = string_delimited("utf-8", ["\n"]).unwrap();
        let val = Val::Str("hello".into());
        let bytes = encode(&codec, &val).unwrap();
        assert_eq!(bytes.contiguous().as_ref(), b"hello\n");
        assert_eq!(decode(&codec, bytes).unwrap(), val);
    }

    #[test]
    fn multibyte_utf8_straddles_chunks() {
        let codec = string_delimited("utf-8", ["\n"]).unwrap();
        let encoded = "héllo\n".as_bytes();
        // split inside the two-byte é
        let mut stream = StreamDecoder::new(codec);
        assert_eq!(stream.push(Bytes::copy_from_slice(&encoded[..2])).unwrap(), vec![]);
        let vals = stream.push(Bytes::copy_from_slice(&encoded[2..])).unwrap();
        assert_eq!(vals, vec![Val::Str("héllo".into())]);
        stream.finish().unwrap();
    }

    #[test]
    fn charset_violation_is_fatal() {
        let codec = string_len("ascii", 2).unwrap();
        let err = decode(&codec, &[0x80, 0x81][..]).unwrap_err();
        assert!(matches!(err, FrameError::Charset { .. }));
    }

    #[test]
    fn integer_text() {
        let codec = string_integer_delimited("ascii", ["x"]).unwrap();
        let bytes = encode(&codec, &Val::Int(456)).unwrap();
        assert_eq!(bytes.contiguous().as_ref(), b"456x");
        assert_eq!(decode(&codec, bytes).unwrap(), Val::Int(456));
    }

    #[test]
    fn float_text() {
        let codec = string_float("ascii").unwrap();
        assert_eq!(decode(&codec, b"2.5").unwrap(), Val::Float(2.5));
        let bytes = encode(&codec, &Val::Float(2.5)).unwrap();
        assert_eq!(bytes.contiguous().as_ref(), b"2.5");
    }

    #[test]
    fn garbage_number_is_fatal() {
        let codec = string_integer("ascii").unwrap();
        decode(&codec, b"12a").unwrap_err();
    }
}
