use std::sync::Arc;

use bytes::{Bytes, BytesMut};

use crate::codecs::finite::decode_exact;
use crate::error::FrameError;
use crate::value::Val;
use crate::{BufSeq, Codec, Frame, Framing, Progress, Resume};

/// An ordered set of delimiter byte strings.
///
/// A region ends at the earliest position where any delimiter matches in
/// full; when several match at the same position the first in the set wins.
#[derive(Clone)]
pub(crate) struct DelimiterSet {
    delimiters: Arc<[Bytes]>,
}

enum ScanHit {
    /// A delimiter matched in full at `pos`.
    Found { pos: usize, len: usize },
    /// Bytes before `pos` are clean; a delimiter starting at `pos` ran out
    /// of input mid-match and needs more bytes to resolve.
    Pending { pos: usize },
    /// Every position was fully checked; no delimiter starts anywhere.
    Clean,
}

enum DelimMatch {
    Complete,
    Partial,
    No,
}

fn match_at(chunks: &[&[u8]], mut chunk: usize, mut offset: usize, delim: &[u8]) -> DelimMatch {
    for &expected in delim {
        if chunk == chunks.len() {
            return DelimMatch::Partial;
        }
        if chunks[chunk][offset] != expected {
            return DelimMatch::No;
        }
        offset += 1;
        if offset == chunks[chunk].len() {
            chunk += 1;
            offset = 0;
        }
    }
    DelimMatch::Complete
}

impl DelimiterSet {
    pub(crate) fn new<B: Into<Bytes>>(delimiters: impl IntoIterator<Item = B>) -> Self {
        let delimiters: Arc<[Bytes]> = delimiters.into_iter().map(Into::into).collect();
        assert!(!delimiters.is_empty(), "delimiter set must not be empty");
        assert!(
            delimiters.iter().all(|d| !d.is_empty()),
            "delimiters must not be empty"
        );
        DelimiterSet { delimiters }
    }

    pub(crate) fn first(&self) -> &Bytes {
        &self.delimiters[0]
    }

    /// Walks `buf` position by position, trying each delimiter in set order.
    ///
    /// A partial match at the tail suspends the scan rather than committing
    /// to a later match: a lower-priority delimiter may not win a position
    /// that a higher-priority one could still claim once more bytes arrive.
    fn scan(&self, buf: &BufSeq) -> ScanHit {
        let chunks: Vec<&[u8]> = buf.chunks().collect();
        let mut chunk = 0;
        let mut offset = 0;
        let mut pos = 0;
        while chunk < chunks.len() {
            for delim in self.delimiters.iter() {
                match match_at(&chunks, chunk, offset, delim) {
                    DelimMatch::Complete => {
                        return ScanHit::Found {
                            pos,
                            len: delim.len(),
                        }
                    }
                    DelimMatch::Partial => return ScanHit::Pending { pos },
                    DelimMatch::No => {}
                }
            }
            pos += 1;
            offset += 1;
            if offset == chunks[chunk].len() {
                chunk += 1;
                offset = 0;
            }
        }
        ScanHit::Clean
    }

    /// Reads bytes up to the first delimiter, then hands the region and the
    /// input positioned after the delimiter to `then`.
    ///
    /// Bytes already ruled clean accumulate inside the suspension, so a
    /// resumed scan only revisits the few tail bytes a delimiter could
    /// still be straddling.
    pub(crate) fn read_region<F>(
        &self,
        include_delimiter: bool,
        buf: BufSeq,
        then: F,
    ) -> Result<Progress, FrameError>
    where
        F: FnOnce(BufSeq, BufSeq) -> Result<Progress, FrameError> + Send + 'static,
    {
        scan_region(self.clone(), include_delimiter, BufSeq::new(), buf, then)
    }
}

fn scan_region<F>(
    set: DelimiterSet,
    include_delimiter: bool,
    mut taken: BufSeq,
    mut buf: BufSeq,
    then: F,
) -> Result<Progress, FrameError>
where
    F: FnOnce(BufSeq, BufSeq) -> Result<Progress, FrameError> + Send + 'static,
{
    match set.scan(&buf) {
        ScanHit::Found { pos, len } => {
            taken.append(buf.split_to(pos));
            let delimiter = buf.split_to(len);
            if include_delimiter {
                taken.append(delimiter);
            }
            then(taken, buf)
        }
        ScanHit::Pending { pos } => {
            taken.append(buf.split_to(pos));
            Ok(Progress::Incomplete(
                Resume::new(move |buf| scan_region(set, include_delimiter, taken, buf, then)),
                buf,
            ))
        }
        ScanHit::Clean => {
            taken.append(buf);
            Ok(Progress::Incomplete(
                Resume::new(move |buf| scan_region(set, include_delimiter, taken, buf, then)),
                BufSeq::new(),
            ))
        }
    }
}

/// Raw bytes terminated by any of `delimiters`.
///
/// With `strip` the decoded value excludes the delimiter and encode appends
/// the first delimiter of the set; without it the delimiter stays part of
/// the value both ways.
pub fn delimited_block<B: Into<Bytes>>(
    delimiters: impl IntoIterator<Item = B>,
    strip: bool,
) -> Codec {
    Codec::new(DelimitedBlock {
        set: DelimiterSet::new(delimiters),
        strip,
    })
}

struct DelimitedBlock {
    set: DelimiterSet,
    strip: bool,
}

impl Framing for DelimitedBlock {
    fn read(&self, buf: BufSeq) -> Result<Progress, FrameError> {
        self.set.read_region(!self.strip, buf, |body, rest| {
            Ok(Progress::Done(Val::Bytes(body.contiguous()), rest))
        })
    }

    fn write(&self, val: &Val, out: &mut BytesMut) -> Result<(), FrameError> {
        let bytes = val.as_raw()?;
        out.reserve(bytes.len() + self.set.first().len());
        out.extend_from_slice(bytes);
        if self.strip {
            out.extend_from_slice(self.set.first());
        }
        Ok(())
    }
}

/// A frame whose encoding is terminated by a delimiter.
///
/// The inner codec must consume the delimited region exactly.
pub fn delimited_frame<B: Into<Bytes>>(
    delimiters: impl IntoIterator<Item = B>,
    frame: impl Into<Frame>,
) -> Codec {
    Codec::new(DelimitedFrame {
        set: DelimiterSet::new(delimiters),
        inner: crate::compile(frame),
    })
}

struct DelimitedFrame {
    set: DelimiterSet,
    inner: Codec,
}

impl Framing for DelimitedFrame {
    fn read(&self, buf: BufSeq) -> Result<Progress, FrameError> {
        let inner = self.inner.clone();
        self.set.read_region(false, buf, move |body, rest| {
            let val = decode_exact(&inner, body)?;
            Ok(Progress::Done(val, rest))
        })
    }

    fn write(&self, val: &Val, out: &mut BytesMut) -> Result<(), FrameError> {
        self.inner.write(val, out)?;
        out.extend_from_slice(self.set.first());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{decode, encode, Primitive, StreamDecoder};

    #[test]
    fn finds_first_delimiter() {
        let codec = delimited_block(["\n"], true);
        match codec.read(BufSeq::from(b"ab\ncd\n")).unwrap() {
            Progress::Done(val, rest) => {
                assert_eq!(val, Val::Bytes(Bytes::from_static(b"ab")));
                assert_eq!(rest, b"cd\n"[..]);
            }
            other => panic!("expected Done, got {:?}", other),
        }
    }

    #[test]
    fn keeps_delimiter_without_strip() {
        let codec = delimited_block(["\n"], false);
        match codec.read(BufSeq::from(b"ab\ncd")).unwrap() {
            Progress::Done(val, _) => assert_eq!(val, Val::Bytes(Bytes::from_static(b"ab\n"))),
            other => panic!("expected Done, got {:?}", other),
        }
    }

    #[test]
    fn earliest_position_wins() {
        let codec = delimited_block(["zz", "b"], true);
        match codec.read(BufSeq::from(b"abzz")).unwrap() {
            Progress::Done(val, rest) => {
                assert_eq!(val, Val::Bytes(Bytes::from_static(b"a")));
                assert_eq!(rest, b"zz"[..]);
            }
            other => panic!("expected Done, got {:?}", other),
        }
    }

    #[test]
    fn set_order_breaks_ties() {
        let codec = delimited_block(["ab", "a"], true);
        match codec.read(BufSeq::from(b"xab")).unwrap() {
            Progress::Done(val, rest) => {
                assert_eq!(val, Val::Bytes(Bytes::from_static(b"x")));
                assert!(rest.is_empty());
            }
            other => panic!("expected Done, got {:?}", other),
        }
    }

    #[test]
    fn delimiter_straddles_chunks() {
        let codec = delimited_block(["\r\n"], true);
        let mut stream = StreamDecoder::new(codec);
        assert_eq!(stream.push(Bytes::from_static(b"ab\r")).unwrap(), vec![]);
        let vals = stream.push(Bytes::from_static(b"\ncd\r\n")).unwrap();
        assert_eq!(
            vals,
            vec![
                Val::Bytes(Bytes::from_static(b"ab")),
                Val::Bytes(Bytes::from_static(b"cd")),
            ]
        );
        stream.finish().unwrap();
    }

    #[test]
    fn pending_match_defers_to_set_order() {
        // "ab" is first in the set; a trailing "a" must suspend rather than
        // let "b" claim a later position.
        let codec = delimited_block(["ab", "b"], true);
        let mut stream = StreamDecoder::new(codec);
        assert_eq!(stream.push(Bytes::from_static(b"xa")).unwrap(), vec![]);
        let vals = stream.push(Bytes::from_static(b"b")).unwrap();
        assert_eq!(vals, vec![Val::Bytes(Bytes::from_static(b"x"))]);
    }

    #[test]
    fn block_round_trip() {
        let codec = delimited_block(["\0"], true);
        let val = Val::Bytes(Bytes::from_static(b"payload"));
        let bytes = encode(&codec, &val).unwrap();
        assert_eq!(bytes.contiguous().as_ref(), b"payload\0");
        assert_eq!(decode(&codec, bytes).unwrap(), val);
    }

    #[test]
    fn frame_must_consume_region() {
        let codec = delimited_frame(["\0"], Primitive::Int16);
        assert_eq!(decode(&codec, b"\x01\x02\0").unwrap(), Val::Int(258));
        let err = decode(&codec, b"\x01\x02\x03\0").unwrap_err();
        assert!(matches!(err, FrameError::BodyOverrun { .. }));
    }
}
