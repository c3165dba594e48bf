use bytes::{Bytes, BytesMut};

use crate::codecs::delimited::DelimiterSet;
use crate::codecs::finite::decode_region_list;
use crate::codecs::header::Prefix;
use crate::error::FrameError;
use crate::primitive::Primitive;
use crate::value::Val;
use crate::{BufSeq, Codec, Frame, Framing, Progress, Resume};

/// A count-prefixed repetition with the default `int32` big-endian prefix.
pub fn repeated(frame: impl Into<Frame>) -> Codec {
    repeated_with_prefix(Primitive::Int32, frame)
}

/// A repetition whose element count comes from `prefix`.
pub fn repeated_with_prefix(prefix: impl Into<Prefix>, frame: impl Into<Frame>) -> Codec {
    Codec::new(RepeatedCodec {
        prefix: prefix.into(),
        elem: crate::compile(frame),
    })
}

struct RepeatedCodec {
    prefix: Prefix,
    elem: Codec,
}

impl Framing for RepeatedCodec {
    fn read(&self, buf: BufSeq) -> Result<Progress, FrameError> {
        let elem = self.elem.clone();
        self.prefix.read_len(buf, move |count, rest| {
            let acc = Vec::with_capacity(count.min(4096));
            read_elements(elem, count, acc, rest)
        })
    }

    fn write(&self, val: &Val, out: &mut BytesMut) -> Result<(), FrameError> {
        let items = val.as_list()?;
        if let (Some(prefix), Some(elem)) = (self.prefix.size(), self.elem.size()) {
            out.reserve(prefix + elem * items.len());
        }
        self.prefix.write_len(items.len(), out)?;
        for item in items {
            self.elem.write(item, out)?;
        }
        Ok(())
    }
}

fn read_elements(
    elem: Codec,
    mut remaining: usize,
    mut acc: Vec<Val>,
    mut buf: BufSeq,
) -> Result<Progress, FrameError> {
    loop {
        if remaining == 0 {
            return Ok(Progress::Done(Val::List(acc), buf));
        }
        // Known element width: one availability check instead of one
        // suspension per element.
        if let Some(size) = elem.size() {
            if buf.len() < size.saturating_mul(remaining) {
                return Ok(Progress::Incomplete(
                    Resume::new(move |buf| read_elements(elem, remaining, acc, buf)),
                    buf,
                ));
            }
        }
        match elem.read(buf)? {
            Progress::Done(val, rest) => {
                acc.push(val);
                remaining -= 1;
                buf = rest;
            }
            Progress::Incomplete(resume, rest) => {
                return Ok(Progress::Incomplete(
                    resume.and_then(move |val, rest| {
                        let mut acc = acc;
                        acc.push(val);
                        read_elements(elem, remaining - 1, acc, rest)
                    }),
                    rest,
                ));
            }
        }
    }
}

/// Elements terminated by a delimiter: the region up to the first delimiter
/// is decoded as a back-to-back run of elements.
pub fn repeated_delimited<B: Into<Bytes>>(
    delimiters: impl IntoIterator<Item = B>,
    frame: impl Into<Frame>,
) -> Codec {
    Codec::new(RepeatedDelimited {
        set: DelimiterSet::new(delimiters),
        elem: crate::compile(frame),
    })
}

struct RepeatedDelimited {
    set: DelimiterSet,
    elem: Codec,
}

impl Framing for RepeatedDelimited {
    fn read(&self, buf: BufSeq) -> Result<Progress, FrameError> {
        let elem = self.elem.clone();
        self.set.read_region(false, buf, move |body, rest| {
            Ok(Progress::Done(
                Val::List(decode_region_list(&elem, body)?),
                rest,
            ))
        })
    }

    fn write(&self, val: &Val, out: &mut BytesMut) -> Result<(), FrameError> {
        for item in val.as_list()? {
            self.elem.write(item, out)?;
        }
        out.extend_from_slice(self.set.first());
        Ok(())
    }
}

/// Elements until the input ends, with no count or terminator on the wire.
///
/// Only meaningful for a complete region (a whole input handed to
/// [`decode`](crate::decode), or the body of a delimited or finite wrapper)
/// since any element boundary is also a valid end of the sequence.
pub fn repeated_until_end(frame: impl Into<Frame>) -> Codec {
    Codec::new(RepeatedUntilEnd {
        elem: crate::compile(frame),
    })
}

struct RepeatedUntilEnd {
    elem: Codec,
}

impl Framing for RepeatedUntilEnd {
    fn read(&self, buf: BufSeq) -> Result<Progress, FrameError> {
        read_to_end(self.elem.clone(), Vec::new(), buf)
    }

    fn write(&self, val: &Val, out: &mut BytesMut) -> Result<(), FrameError> {
        for item in val.as_list()? {
            self.elem.write(item, out)?;
        }
        Ok(())
    }
}

fn read_to_end(elem: Codec, mut acc: Vec<Val>, mut buf: BufSeq) -> Result<Progress, FrameError> {
    loop {
        if buf.is_empty() {
            return Ok(Progress::Done(Val::List(acc), buf));
        }
        let before = buf.len();
        match elem.read(buf)? {
            Progress::Done(val, rest) => {
                if rest.len() == before {
                    return Err(FrameError::ResidualBytes { remaining: before });
                }
                acc.push(val);
                buf = rest;
            }
            Progress::Incomplete(resume, rest) => {
                return Ok(Progress::Incomplete(
                    resume.and_then(move |val, rest| {
                        let mut acc = acc;
                        acc.push(val);
                        read_to_end(elem, acc, rest)
                    }),
                    rest,
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{decode, encode, StreamDecoder};

    #[test]
    fn empty_count() {
        let codec = repeated(Primitive::Int32);
        let bytes = encode(&codec, &Val::List(vec![])).unwrap();
        assert_eq!(bytes.contiguous().as_ref(), [0, 0, 0, 0]);
        assert_eq!(decode(&codec, bytes).unwrap(), Val::List(vec![]));
    }

    #[test]
    fn counted_round_trip() {
        let codec = repeated(Primitive::Int32);
        let val = Val::List((0..10).map(Val::Int).collect());
        let bytes = encode(&codec, &val).unwrap();
        assert_eq!(bytes.len(), 4 + 40);
        assert_eq!(decode(&codec, bytes).unwrap(), val);
    }

    #[test]
    fn counted_split_mid_element() {
        let codec = repeated_with_prefix(Primitive::Byte, Primitive::Int16);
        let mut stream = StreamDecoder::new(codec);
        assert_eq!(stream.push(Bytes::from_static(b"\x02\x00")).unwrap(), vec![]);
        assert_eq!(stream.push(Bytes::from_static(b"\x01\x00")).unwrap(), vec![]);
        let vals = stream.push(Bytes::from_static(b"\x02")).unwrap();
        assert_eq!(vals, vec![Val::List(vec![Val::Int(1), Val::Int(2)])]);
        stream.finish().unwrap();
    }

    #[test]
    fn custom_prefix() {
        // '$' marker byte, then the count.
        let length = crate::prefix(
            crate::frame![Primitive::Byte, Primitive::Byte],
            |val| val.as_list()?[1].to_len(),
            |len| {
                Ok(Val::List(vec![
                    Val::Int(b'$'.into()),
                    Val::Int(len as i64),
                ]))
            },
        );
        let codec = repeated_with_prefix(length, Primitive::Int32);
        let val = Val::List(vec![Val::Int(1), Val::Int(2), Val::Int(3)]);
        let bytes = encode(&codec, &val).unwrap();
        assert_eq!(
            bytes.contiguous().as_ref(),
            b"$\x03\x00\x00\x00\x01\x00\x00\x00\x02\x00\x00\x00\x03"
        );
        assert_eq!(decode(&codec, bytes).unwrap(), val);
    }

    #[test]
    fn delimited_elements() {
        let codec = repeated_delimited(["\0"], Primitive::Int16);
        let val = Val::List(vec![Val::Int(258), Val::Int(515)]);
        let bytes = encode(&codec, &val).unwrap();
        assert_eq!(bytes.contiguous().as_ref(), b"\x01\x02\x02\x03\0");
        assert_eq!(decode(&codec, bytes).unwrap(), val);
    }

    #[test]
    fn delimited_truncated_element_is_fatal() {
        let codec = repeated_delimited(["\0"], Primitive::Int16);
        let err = decode(&codec, b"\x01\x02\x03\0").unwrap_err();
        assert!(matches!(err, FrameError::BodyOverrun { .. }));
    }

    #[test]
    fn until_end_reads_whole_input() {
        let codec = repeated_until_end(Primitive::Int16);
        let val = Val::List(vec![Val::Int(1), Val::Int(2), Val::Int(3)]);
        let bytes = encode(&codec, &val).unwrap();
        assert_eq!(bytes.len(), 6);
        assert_eq!(decode(&codec, bytes).unwrap(), val);
    }
}
