use bytes::BytesMut;

use crate::error::FrameError;
use crate::value::Val;
use crate::{BufSeq, Codec, Framing, Progress};

/// A zero-byte constant: decodes as the value without consuming input,
/// encode asserts equality and emits nothing.
pub fn literal(value: impl Into<Val>) -> Codec {
    Codec::new(LiteralCodec {
        value: value.into(),
    })
}

struct LiteralCodec {
    value: Val,
}

impl Framing for LiteralCodec {
    fn read(&self, buf: BufSeq) -> Result<Progress, FrameError> {
        Ok(Progress::Done(self.value.clone(), buf))
    }

    fn write(&self, val: &Val, _out: &mut BytesMut) -> Result<(), FrameError> {
        if *val == self.value {
            Ok(())
        } else {
            Err(FrameError::LiteralMismatch {
                expected: self.value.clone(),
                found: val.clone(),
            })
        }
    }

    fn size(&self) -> Option<usize> {
        Some(0)
    }
}
