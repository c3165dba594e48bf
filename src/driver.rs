//! Convenience drivers over the read/write contract.

use std::fmt;
use std::io;
use std::mem;

use bytes::{Bytes, BytesMut};

use crate::error::FrameError;
use crate::logging::trace;
use crate::value::Val;
use crate::{BufSeq, Codec, Progress, Resume};

/// Encodes one value, returning the produced buffer sequence.
pub fn encode(codec: &Codec, val: &Val) -> Result<BufSeq, FrameError> {
    let mut out = match codec.size() {
        Some(size) => BytesMut::with_capacity(size),
        None => BytesMut::new(),
    };
    codec.write(val, &mut out)?;
    Ok(BufSeq::from(out))
}

/// Encodes each value in turn, concatenated.
pub fn encode_all<'a>(
    codec: &Codec,
    vals: impl IntoIterator<Item = &'a Val>,
) -> Result<BufSeq, FrameError> {
    let mut out = BytesMut::new();
    for val in vals {
        codec.write(val, &mut out)?;
    }
    Ok(BufSeq::from(out))
}

/// Decodes exactly one value from a complete input.
///
/// Leftover bytes are [`FrameError::ResidualBytes`]; an input that stops
/// mid-frame is [`FrameError::UnexpectedEof`].
pub fn decode(codec: &Codec, input: impl Into<BufSeq>) -> Result<Val, FrameError> {
    match codec.read(input.into())? {
        Progress::Done(val, rest) if rest.is_empty() => Ok(val),
        Progress::Done(_, rest) => Err(FrameError::ResidualBytes {
            remaining: rest.len(),
        }),
        Progress::Incomplete(..) => Err(FrameError::UnexpectedEof),
    }
}

/// Decodes values back to back until a complete input is exhausted.
///
/// A partial frame at the end is [`FrameError::UnexpectedEof`], distinct
/// from the leftover-bytes case, which cannot occur here.
pub fn decode_all(codec: &Codec, input: impl Into<BufSeq>) -> Result<Vec<Val>, FrameError> {
    let mut buf = input.into();
    let mut vals = Vec::new();
    while !buf.is_empty() {
        let before = buf.len();
        match codec.read(buf)? {
            Progress::Done(val, rest) => {
                if rest.len() == before {
                    return Err(FrameError::ResidualBytes { remaining: before });
                }
                vals.push(val);
                buf = rest;
            }
            Progress::Incomplete(..) => return Err(FrameError::UnexpectedEof),
        }
    }
    Ok(vals)
}

/// Collapses any buffer-sequence-like input into a single buffer.
pub fn contiguous(input: impl Into<BufSeq>) -> Bytes {
    input.into().contiguous()
}

/// Alias of [`contiguous`] for call sites that read better with it.
pub fn to_byte_buffer(input: impl Into<BufSeq>) -> Bytes {
    contiguous(input)
}

/// Converts any buffer-like input into a buffer sequence.
pub fn to_buf_seq(input: impl Into<BufSeq>) -> BufSeq {
    input.into()
}

/// An incremental decode session: feed chunks as they arrive, collect
/// completed values, and check at the end that no frame was left hanging.
///
/// This is the whole adapter surface a streaming channel needs; anything
/// that can hand over `Bytes` chunks can drive it.
pub struct StreamDecoder {
    codec: Codec,
    suspended: Option<Resume>,
    rest: BufSeq,
}

impl StreamDecoder {
    pub fn new(codec: Codec) -> StreamDecoder {
        StreamDecoder {
            codec,
            suspended: None,
            rest: BufSeq::new(),
        }
    }

    /// Feeds one chunk, returning every value completed by it.
    pub fn push(&mut self, chunk: impl Into<Bytes>) -> Result<Vec<Val>, FrameError> {
        let chunk = chunk.into();
        if chunk.is_empty() {
            return Ok(Vec::new());
        }
        self.rest.push(chunk);
        let mut vals = Vec::new();
        loop {
            let buf = mem::take(&mut self.rest);
            let progress = match self.suspended.take() {
                Some(resume) => resume.resume(buf)?,
                None => {
                    if buf.is_empty() {
                        break;
                    }
                    let before = buf.len();
                    match self.codec.read(buf)? {
                        Progress::Done(_, rest) if rest.len() == before => {
                            return Err(FrameError::ResidualBytes { remaining: before });
                        }
                        progress => progress,
                    }
                }
            };
            match progress {
                Progress::Done(val, rest) => {
                    vals.push(val);
                    self.rest = rest;
                }
                Progress::Incomplete(resume, rest) => {
                    self.suspended = Some(resume);
                    self.rest = rest;
                    break;
                }
            }
        }
        trace!(values = vals.len(), pending = self.rest.len(), "chunk consumed");
        Ok(vals)
    }

    /// Whether a frame is suspended mid-decode.
    pub fn mid_frame(&self) -> bool {
        self.suspended.is_some()
    }

    /// Ends the session: errors if the input stopped inside a frame or
    /// left undecodable bytes behind.
    pub fn finish(self) -> Result<(), FrameError> {
        if self.suspended.is_some() {
            Err(FrameError::UnexpectedEof)
        } else if !self.rest.is_empty() {
            Err(FrameError::ResidualBytes {
                remaining: self.rest.len(),
            })
        } else {
            Ok(())
        }
    }
}

impl fmt::Debug for StreamDecoder {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("StreamDecoder")
            .field("mid_frame", &self.mid_frame())
            .field("pending", &self.rest.len())
            .finish()
    }
}

/// Returned when either reading or decoding fails.
#[derive(Debug)]
pub enum ReadError {
    /// Reading from the reader failed.
    Read(io::Error),
    /// Decoding the bytes failed.
    Decode(FrameError),
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ReadError::Read(_) => write!(f, "reading failed"),
            ReadError::Decode(_) => write!(f, "decoding failed"),
        }
    }
}

impl std::error::Error for ReadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReadError::Read(error) => Some(error),
            ReadError::Decode(error) => Some(error),
        }
    }
}

impl From<FrameError> for ReadError {
    fn from(error: FrameError) -> ReadError {
        ReadError::Decode(error)
    }
}

/// Synchronously decodes values from the given reader until EOF.
pub fn decode_sync<R: io::BufRead + ?Sized>(
    codec: &Codec,
    reader: &mut R,
) -> Result<Vec<Val>, ReadError> {
    let mut session = StreamDecoder::new(codec.clone());
    let mut vals = Vec::new();
    loop {
        let buf = match reader.fill_buf() {
            Ok(buf) => buf,
            Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
            Err(error) => return Err(ReadError::Read(error)),
        };
        if buf.is_empty() {
            trace!(values = vals.len(), "reader drained");
            session.finish()?;
            return Ok(vals);
        }
        let len = buf.len();
        vals.extend(session.push(Bytes::copy_from_slice(buf))?);
        reader.consume(len);
    }
}
