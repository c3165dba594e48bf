use std::sync::Arc;

use bytes::BytesMut;

use crate::error::FrameError;
use crate::primitive::Primitive;
use crate::value::Val;
use crate::{BufSeq, Codec, Frame, Framing, Progress};

type ToBody = Arc<dyn Fn(&Val) -> Result<Codec, FrameError> + Send + Sync>;
type FromBody = Arc<dyn Fn(&Val) -> Result<Val, FrameError> + Send + Sync>;

/// A header whose decoded value selects the codec for what follows.
///
/// `to_body` maps the decoded header value to the body codec; `from_body`
/// recovers the header value from the body value on encode. The codec's
/// value is the body value; the header is derived, not stored.
pub fn header(
    head: impl Into<Frame>,
    to_body: impl Fn(&Val) -> Result<Codec, FrameError> + Send + Sync + 'static,
    from_body: impl Fn(&Val) -> Result<Val, FrameError> + Send + Sync + 'static,
) -> Codec {
    Codec::new(HeaderCodec {
        head: crate::compile(head),
        to_body: Arc::new(to_body),
        from_body: Arc::new(from_body),
    })
}

struct HeaderCodec {
    head: Codec,
    to_body: ToBody,
    from_body: FromBody,
}

impl Framing for HeaderCodec {
    fn read(&self, buf: BufSeq) -> Result<Progress, FrameError> {
        let to_body = self.to_body.clone();
        self.head
            .read_then(buf, move |head_val, rest| to_body(&head_val)?.read(rest))
    }

    fn write(&self, val: &Val, out: &mut BytesMut) -> Result<(), FrameError> {
        let head_val = (self.from_body)(val)?;
        let body = (self.to_body)(&head_val)?;
        if let (Some(head), Some(body_size)) = (self.head.size(), body.size()) {
            out.reserve(head + body_size);
        }
        self.head.write(&head_val, out)?;
        body.write(val, out)
    }
}

/// A header whose body is a byte or element count: a frame plus the two
/// conversions between its value and a plain length.
///
/// Lengths come in three shapes: a compiled frame with custom conversions
/// ([`prefix`]), a bare primitive with identity conversions
/// (`Prefix::from(Primitive::Int32)`), and a zero-byte constant
/// (`Prefix::from(4usize)`).
#[derive(Clone)]
pub struct Prefix(Repr);

#[derive(Clone)]
enum Repr {
    Constant(usize),
    Framed {
        codec: Codec,
        to_len: Arc<dyn Fn(&Val) -> Result<usize, FrameError> + Send + Sync>,
        from_len: Arc<dyn Fn(usize) -> Result<Val, FrameError> + Send + Sync>,
    },
}

/// Builds a prefix from a frame and conversions to and from a length.
pub fn prefix(
    frame: impl Into<Frame>,
    to_len: impl Fn(&Val) -> Result<usize, FrameError> + Send + Sync + 'static,
    from_len: impl Fn(usize) -> Result<Val, FrameError> + Send + Sync + 'static,
) -> Prefix {
    Prefix(Repr::Framed {
        codec: crate::compile(frame),
        to_len: Arc::new(to_len),
        from_len: Arc::new(from_len),
    })
}

impl Prefix {
    /// A fixed length occupying no bytes on the wire.
    pub fn constant(len: usize) -> Prefix {
        Prefix(Repr::Constant(len))
    }

    /// Decodes the length and hands it to `then` with the remaining input.
    pub(crate) fn read_len<F>(&self, buf: BufSeq, then: F) -> Result<Progress, FrameError>
    where
        F: FnOnce(usize, BufSeq) -> Result<Progress, FrameError> + Send + 'static,
    {
        match &self.0 {
            Repr::Constant(len) => then(*len, buf),
            Repr::Framed { codec, to_len, .. } => {
                let to_len = to_len.clone();
                codec.read_then(buf, move |val, rest| then(to_len(&val)?, rest))
            }
        }
    }

    pub(crate) fn write_len(&self, len: usize, out: &mut BytesMut) -> Result<(), FrameError> {
        match &self.0 {
            Repr::Constant(expected) => {
                if *expected == len {
                    Ok(())
                } else {
                    Err(FrameError::ShapeMismatch {
                        expected: *expected,
                        found: len,
                    })
                }
            }
            Repr::Framed { codec, from_len, .. } => codec.write(&from_len(len)?, out),
        }
    }

    /// Encoded width of the prefix itself.
    pub(crate) fn size(&self) -> Option<usize> {
        match &self.0 {
            Repr::Constant(_) => Some(0),
            Repr::Framed { codec, .. } => codec.size(),
        }
    }

    /// The bounded length, when it is a compile-time constant.
    pub(crate) fn constant_len(&self) -> Option<usize> {
        match &self.0 {
            Repr::Constant(len) => Some(*len),
            Repr::Framed { .. } => None,
        }
    }
}

/// A bare primitive as its own length: identity conversions.
impl From<Primitive> for Prefix {
    fn from(prim: Primitive) -> Prefix {
        prefix(
            prim,
            |val| val.to_len(),
            |len| Ok(Val::UInt(len as u64)),
        )
    }
}

impl From<usize> for Prefix {
    fn from(len: usize) -> Prefix {
        Prefix::constant(len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{decode, encode, frame, string_delimited};

    fn tagged() -> Codec {
        // 1 -> [:a int16], 2 -> [:b float32], 3 -> [:c string \0-terminated]
        let arm_a = crate::compile(frame![Frame::sym("a"), Primitive::Int16]);
        let arm_b = crate::compile(frame![Frame::sym("b"), Primitive::Float32]);
        let arm_c = crate::compile(frame![
            Frame::sym("c"),
            Frame::from(string_delimited("utf-8", ["\0"]).unwrap())
        ]);
        header(
            Primitive::Byte,
            move |head| match head.to_i64() {
                Some(1) => Ok(arm_a.clone()),
                Some(2) => Ok(arm_b.clone()),
                Some(3) => Ok(arm_c.clone()),
                _ => Err(FrameError::TypeMismatch {
                    expected: "tag in 1..=3",
                    found: head.clone(),
                }),
            },
            |body| {
                let tag = body.as_list()?[0].as_sym()?.to_owned();
                match tag.as_str() {
                    "a" => Ok(Val::Int(1)),
                    "b" => Ok(Val::Int(2)),
                    "c" => Ok(Val::Int(3)),
                    _ => Err(FrameError::UnknownEnumTag(tag)),
                }
            },
        )
    }

    #[test]
    fn body_selected_by_header() {
        let codec = tagged();
        let val = Val::List(vec![Val::sym("a"), Val::Int(258)]);
        let bytes = encode(&codec, &val).unwrap();
        assert_eq!(bytes.contiguous().as_ref(), b"\x01\x01\x02");
        assert_eq!(decode(&codec, bytes).unwrap(), val);
    }

    #[test]
    fn string_arm() {
        let codec = tagged();
        let val = Val::List(vec![Val::sym("c"), Val::Str("abc".into())]);
        let bytes = encode(&codec, &val).unwrap();
        assert_eq!(bytes.contiguous().as_ref(), b"\x03abc\0");
        assert_eq!(decode(&codec, bytes).unwrap(), val);
    }

    #[test]
    fn unknown_header_value_is_fatal() {
        let codec = tagged();
        decode(&codec, b"\x09").unwrap_err();
    }

    #[test]
    fn constant_prefix_writes_nothing() {
        let prefix = Prefix::constant(4);
        let mut out = BytesMut::new();
        prefix.write_len(4, &mut out).unwrap();
        assert!(out.is_empty());
        prefix.write_len(5, &mut out).unwrap_err();
    }
}
