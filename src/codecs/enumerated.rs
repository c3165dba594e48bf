use std::sync::Arc;

use bytes::BytesMut;

use crate::error::FrameError;
use crate::primitive::Primitive;
use crate::value::Val;
use crate::{BufSeq, Codec, Framing, Progress};

/// A bijection between symbolic tags and small integers.
///
/// `storage` is the wire primitive, conventionally [`Primitive::Int16`],
/// but whatever the width, assignments must fit a signed 16-bit range.
/// Out-of-range and duplicate assignments fail at construction; unknown
/// wire values and unknown tags are fatal at decode and encode.
pub fn enumeration(
    storage: Primitive,
    entries: &[(&str, i32)],
) -> Result<Codec, FrameError> {
    let mut table: Vec<(String, i16)> = Vec::with_capacity(entries.len());
    for (tag, value) in entries {
        let value =
            i16::try_from(*value).map_err(|_| FrameError::EnumRange((*value).into()))?;
        if table.iter().any(|(t, _)| t == tag) {
            return Err(FrameError::DuplicateEnumTag((*tag).to_owned()));
        }
        if table.iter().any(|(_, v)| *v == value) {
            return Err(FrameError::DuplicateEnumValue(value));
        }
        table.push(((*tag).to_owned(), value));
    }
    Ok(Codec::new(EnumCodec {
        storage: Codec::new(storage),
        entries: table.into(),
    }))
}

/// An enumeration with the dense assignment `0..tags.len()`.
pub fn enumeration_dense(storage: Primitive, tags: &[&str]) -> Result<Codec, FrameError> {
    let entries: Vec<(&str, i32)> = tags
        .iter()
        .enumerate()
        .map(|(index, tag)| (*tag, index as i32))
        .collect();
    enumeration(storage, &entries)
}

struct EnumCodec {
    storage: Codec,
    entries: Arc<[(String, i16)]>,
}

impl Framing for EnumCodec {
    fn read(&self, buf: BufSeq) -> Result<Progress, FrameError> {
        let entries = self.entries.clone();
        self.storage.read_then(buf, move |val, rest| {
            // Wide unsigned storage can carry values no i64 holds, so the
            // lookup and the error both work in i128.
            let value: i128 = match &val {
                Val::Int(n) => (*n).into(),
                Val::UInt(n) => (*n).into(),
                other => {
                    return Err(FrameError::TypeMismatch {
                        expected: "enum storage integer",
                        found: other.clone(),
                    })
                }
            };
            let tag = entries
                .iter()
                .find(|(_, v)| i128::from(*v) == value)
                .map(|(tag, _)| tag.clone())
                .ok_or(FrameError::UnknownEnumValue(value))?;
            Ok(Progress::Done(Val::Sym(tag), rest))
        })
    }

    fn write(&self, val: &Val, out: &mut BytesMut) -> Result<(), FrameError> {
        let tag = val.as_sym()?;
        let value = self
            .entries
            .iter()
            .find(|(t, _)| t == tag)
            .map(|(_, v)| *v)
            .ok_or_else(|| FrameError::UnknownEnumTag(tag.to_owned()))?;
        self.storage.write(&Val::Int(value.into()), out)
    }

    fn size(&self) -> Option<usize> {
        self.storage.size()
    }
}
