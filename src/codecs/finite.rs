use bytes::BytesMut;

use crate::codecs::header::Prefix;
use crate::error::FrameError;
use crate::value::Val;
use crate::{BufSeq, Codec, Frame, Framing, Progress, Resume};

/// Accumulates exactly `n` bytes, suspending while fewer are available,
/// then hands the region and the remaining input to `then`.
pub(crate) fn read_exact<F>(
    n: usize,
    mut taken: BufSeq,
    mut buf: BufSeq,
    then: F,
) -> Result<Progress, FrameError>
where
    F: FnOnce(BufSeq, BufSeq) -> Result<Progress, FrameError> + Send + 'static,
{
    if taken.len() + buf.len() < n {
        taken.append(buf);
        return Ok(Progress::Incomplete(
            Resume::new(move |buf| read_exact(n, taken, buf, then)),
            BufSeq::new(),
        ));
    }
    let missing = n - taken.len();
    taken.append(buf.split_to(missing));
    then(taken, buf)
}

/// Decodes one value that must consume the bounded region exactly.
///
/// The region is complete by construction, so a codec suspending inside it
/// is as fatal as one stopping short of the end.
pub(crate) fn decode_exact(codec: &Codec, region: BufSeq) -> Result<Val, FrameError> {
    let size = region.len();
    match codec.read(region)? {
        Progress::Done(val, rest) if rest.is_empty() => Ok(val),
        _ => Err(FrameError::BodyOverrun { size }),
    }
}

/// Decodes values back to back until the bounded region is exhausted.
pub(crate) fn decode_region_list(codec: &Codec, region: BufSeq) -> Result<Vec<Val>, FrameError> {
    let size = region.len();
    let mut region = region;
    let mut vals = Vec::new();
    while !region.is_empty() {
        let before = region.len();
        match codec.read(region)? {
            Progress::Done(val, rest) => {
                if rest.len() == before {
                    return Err(FrameError::BodyOverrun { size });
                }
                vals.push(val);
                region = rest;
            }
            Progress::Incomplete(..) => return Err(FrameError::BodyOverrun { size }),
        }
    }
    Ok(vals)
}

/// A raw block of bytes whose length is a constant or a decoded prefix.
pub fn finite_block(length: impl Into<Prefix>) -> Codec {
    Codec::new(FiniteBlock {
        length: length.into(),
    })
}

struct FiniteBlock {
    length: Prefix,
}

impl Framing for FiniteBlock {
    fn read(&self, buf: BufSeq) -> Result<Progress, FrameError> {
        self.length.read_len(buf, |n, rest| {
            read_exact(n, BufSeq::new(), rest, |body, rest| {
                Ok(Progress::Done(Val::Bytes(body.contiguous()), rest))
            })
        })
    }

    fn write(&self, val: &Val, out: &mut BytesMut) -> Result<(), FrameError> {
        let bytes = val.as_raw()?;
        self.length.write_len(bytes.len(), out)?;
        out.extend_from_slice(bytes);
        Ok(())
    }

    fn size(&self) -> Option<usize> {
        self.length.constant_len()
    }
}

/// A frame wrapped in a byte-length bound: the prefix decodes to N, the
/// inner codec must consume exactly those N bytes.
pub fn finite_frame(length: impl Into<Prefix>, frame: impl Into<Frame>) -> Codec {
    Codec::new(FiniteFrame {
        length: length.into(),
        body: crate::compile(frame),
    })
}

struct FiniteFrame {
    length: Prefix,
    body: Codec,
}

impl Framing for FiniteFrame {
    fn read(&self, buf: BufSeq) -> Result<Progress, FrameError> {
        let body = self.body.clone();
        self.length.read_len(buf, move |n, rest| {
            read_exact(n, BufSeq::new(), rest, move |region, rest| {
                let val = decode_exact(&body, region)?;
                Ok(Progress::Done(val, rest))
            })
        })
    }

    fn write(&self, val: &Val, out: &mut BytesMut) -> Result<(), FrameError> {
        match self.body.size() {
            // Known body width: both parts go straight into one buffer.
            Some(size) => {
                if let Some(prefix) = self.length.size() {
                    out.reserve(prefix + size);
                }
                self.length.write_len(size, out)?;
                self.body.write(val, out)
            }
            None => {
                let mut body = BytesMut::new();
                self.body.write(val, &mut body)?;
                self.length.write_len(body.len(), out)?;
                out.extend_from_slice(&body);
                Ok(())
            }
        }
    }

    fn size(&self) -> Option<usize> {
        match (self.length.size(), self.body.size()) {
            (Some(prefix), Some(body)) => Some(prefix + body),
            _ => None,
        }
    }
}
