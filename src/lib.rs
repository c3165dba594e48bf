//! # Declarative binary framing
//!
//! This crate builds bidirectional byte codecs from small declarative
//! descriptions. A [`Frame`] describes a binary layout (primitives, tuples,
//! keyed maps, repetitions, delimited and length-prefixed blocks, headers,
//! enumerations, strings) and [`compile`] turns it into a [`Codec`] that
//! encodes values to buffers and decodes (possibly incrementally arriving)
//! buffers back into values.
//!
//! The decode side is push-based: input is handed to the codec as it
//! arrives, and when the bytes run out mid-frame the codec suspends by
//! returning a [`Resume`], a value capturing everything decoded so far,
//! instead of holding a stack frame. Feeding the next chunk to the resume
//! continues exactly where the previous call stopped, without re-reading or
//! copying consumed input. This makes the same codec usable from blocking
//! readers, async adapters or hand-rolled loops with a few lines of driver
//! code; a synchronous [`BufRead`](std::io::BufRead) driver is provided.
//!
//! ```
//! use byteframe::{compile, decode, encode, frame, Primitive, Val};
//!
//! let point = compile(frame! { "x" => Primitive::Int32, "y" => Primitive::Int32 });
//! let val = Val::map([("x", Val::Int(3)), ("y", Val::Int(4))]);
//! let bytes = encode(&point, &val).unwrap();
//! assert_eq!(decode(&point, bytes).unwrap(), val);
//! ```
//!
//! # Features
//!
//! * `tracing` - emits trace events from the driver layer.

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod codecs;
pub mod error;
mod buf_seq;
mod driver;
mod frame;
mod logging;
mod macros;
mod primitive;
mod text;
mod value;

use std::fmt;
use std::sync::Arc;

use bytes::BytesMut;

pub use buf_seq::BufSeq;
pub use codecs::{
    delimited_block, delimited_frame, enumeration, enumeration_dense, finite_block, finite_frame,
    header, literal, prefix, repeated, repeated_delimited, repeated_until_end,
    repeated_with_prefix, string, string_delimited, string_float, string_float_delimited,
    string_integer, string_integer_delimited, string_len, Prefix,
};
pub use driver::{
    contiguous, decode, decode_all, decode_sync, encode, encode_all, to_buf_seq, to_byte_buffer,
    ReadError, StreamDecoder,
};
pub use error::FrameError;
pub use frame::{compile, Frame};
pub use primitive::Primitive;
pub use text::{charset, TextCodec};
pub use value::Val;

/// The three-capability codec contract.
///
/// Implementations are immutable: `read` threads all decode state through
/// its return value, so one compiled codec serves any number of concurrent
/// decodes. Per-decode state only ever lives in the [`Resume`] returned
/// inside [`Progress::Incomplete`].
pub trait Framing: Send + Sync {
    /// Decodes one value from the front of `buf`.
    ///
    /// Insufficient input is not an error: the codec returns
    /// [`Progress::Incomplete`] carrying a resume point, and the caller
    /// feeds it the returned remainder with more bytes appended.
    fn read(&self, buf: BufSeq) -> Result<Progress, FrameError>;

    /// Encodes `val` onto the end of `out`.
    fn write(&self, val: &Val, out: &mut BytesMut) -> Result<(), FrameError>;

    /// The exact byte length every encoding of this codec has, if that
    /// length is a constant.
    fn size(&self) -> Option<usize> {
        None
    }
}

/// A compiled frame: a cheaply cloneable, shareable handle to a codec tree.
#[derive(Clone)]
pub struct Codec(pub(crate) Arc<dyn Framing>);

impl Codec {
    pub fn new(framing: impl Framing + 'static) -> Codec {
        Codec(Arc::new(framing))
    }

    pub fn read(&self, buf: BufSeq) -> Result<Progress, FrameError> {
        self.0.read(buf)
    }

    pub fn write(&self, val: &Val, out: &mut BytesMut) -> Result<(), FrameError> {
        self.0.write(val, out)
    }

    pub fn size(&self) -> Option<usize> {
        self.0.size()
    }

    /// Reads a value and hands it to `then`, which continues the decode.
    ///
    /// On suspension the callback travels inside the resume, so it fires
    /// exactly once no matter how many chunks the value is spread over.
    /// Combinators thread their sequencing through this.
    pub fn read_then<F>(&self, buf: BufSeq, then: F) -> Result<Progress, FrameError>
    where
        F: FnOnce(Val, BufSeq) -> Result<Progress, FrameError> + Send + 'static,
    {
        match self.read(buf)? {
            Progress::Done(val, rest) => then(val, rest),
            Progress::Incomplete(resume, rest) => {
                Ok(Progress::Incomplete(resume.and_then(then), rest))
            }
        }
    }
}

impl fmt::Debug for Codec {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Codec").field("size", &self.size()).finish()
    }
}

/// The outcome of a read step.
pub enum Progress {
    /// A value was fully decoded; the remainder holds the unconsumed tail.
    Done(Val, BufSeq),
    /// The input ran out mid-frame. Append the next chunk to the remainder
    /// and feed it to the resume to continue.
    Incomplete(Resume, BufSeq),
}

impl fmt::Debug for Progress {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Progress::Done(val, rest) => f
                .debug_tuple("Done")
                .field(val)
                .field(&rest.len())
                .finish(),
            Progress::Incomplete(_, rest) => {
                f.debug_tuple("Incomplete").field(&rest.len()).finish()
            }
        }
    }
}

/// A suspended decode: a one-shot continuation owning all partial state.
///
/// Suspension is data, not a stack frame: a resume can be stored, moved
/// across threads or dropped to abandon the decode, releasing the buffer
/// views it holds.
pub struct Resume(Box<dyn FnOnce(BufSeq) -> Result<Progress, FrameError> + Send>);

impl Resume {
    pub fn new(f: impl FnOnce(BufSeq) -> Result<Progress, FrameError> + Send + 'static) -> Resume {
        Resume(Box::new(f))
    }

    /// Continues the decode with the previous remainder plus newly arrived
    /// bytes.
    pub fn resume(self, buf: BufSeq) -> Result<Progress, FrameError> {
        (self.0)(buf)
    }

    /// Attaches a callback to run once the suspended value completes,
    /// re-attaching itself across further suspensions.
    pub fn and_then<F>(self, then: F) -> Resume
    where
        F: FnOnce(Val, BufSeq) -> Result<Progress, FrameError> + Send + 'static,
    {
        Resume::new(move |buf| match self.resume(buf)? {
            Progress::Done(val, rest) => then(val, rest),
            Progress::Incomplete(resume, rest) => {
                Ok(Progress::Incomplete(resume.and_then(then), rest))
            }
        })
    }
}

impl fmt::Debug for Resume {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("Resume").finish()
    }
}
