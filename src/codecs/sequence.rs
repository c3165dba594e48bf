use std::sync::Arc;

use bytes::BytesMut;

use crate::error::FrameError;
use crate::value::Val;
use crate::{BufSeq, Codec, Framing, Progress};

/// Sums child sizes; any unknown child makes the total unknown.
fn sum_sizes<'a>(sizes: impl Iterator<Item = &'a Codec>) -> Option<usize> {
    let mut total = 0;
    for codec in sizes {
        total += codec.size()?;
    }
    Some(total)
}

/// A fixed-shape ordered sequence of child codecs.
pub(crate) struct TupleCodec {
    items: Arc<[Codec]>,
    size: Option<usize>,
}

impl TupleCodec {
    pub(crate) fn new(items: Vec<Codec>) -> Self {
        let size = sum_sizes(items.iter());
        TupleCodec {
            items: items.into(),
            size,
        }
    }
}

fn read_items(
    items: Arc<[Codec]>,
    mut index: usize,
    mut acc: Vec<Val>,
    mut buf: BufSeq,
) -> Result<Progress, FrameError> {
    loop {
        if index == items.len() {
            return Ok(Progress::Done(Val::List(acc), buf));
        }
        match items[index].read(buf)? {
            Progress::Done(val, rest) => {
                acc.push(val);
                buf = rest;
                index += 1;
            }
            Progress::Incomplete(resume, rest) => {
                let items = items.clone();
                return Ok(Progress::Incomplete(
                    resume.and_then(move |val, rest| {
                        let mut acc = acc;
                        acc.push(val);
                        read_items(items, index + 1, acc, rest)
                    }),
                    rest,
                ));
            }
        }
    }
}

impl Framing for TupleCodec {
    fn read(&self, buf: BufSeq) -> Result<Progress, FrameError> {
        read_items(
            self.items.clone(),
            0,
            Vec::with_capacity(self.items.len()),
            buf,
        )
    }

    fn write(&self, val: &Val, out: &mut BytesMut) -> Result<(), FrameError> {
        let items = val.as_list()?;
        if items.len() != self.items.len() {
            return Err(FrameError::ShapeMismatch {
                expected: self.items.len(),
                found: items.len(),
            });
        }
        if let Some(size) = self.size {
            out.reserve(size);
        }
        for (codec, item) in self.items.iter().zip(items) {
            codec.write(item, out)?;
        }
        Ok(())
    }

    fn size(&self) -> Option<usize> {
        self.size
    }
}

/// An ordered keyed map: decoded as a map with the declared keys, byte
/// order follows declaration order.
pub(crate) struct MapCodec {
    fields: Arc<[(String, Codec)]>,
    size: Option<usize>,
}

impl MapCodec {
    pub(crate) fn new(fields: Vec<(String, Codec)>) -> Self {
        let size = sum_sizes(fields.iter().map(|(_, codec)| codec));
        MapCodec {
            fields: fields.into(),
            size,
        }
    }
}

fn read_fields(
    fields: Arc<[(String, Codec)]>,
    mut index: usize,
    mut acc: Vec<(String, Val)>,
    mut buf: BufSeq,
) -> Result<Progress, FrameError> {
    loop {
        if index == fields.len() {
            return Ok(Progress::Done(Val::Map(acc), buf));
        }
        let (key, codec) = &fields[index];
        match codec.read(buf)? {
            Progress::Done(val, rest) => {
                acc.push((key.clone(), val));
                buf = rest;
                index += 1;
            }
            Progress::Incomplete(resume, rest) => {
                let key = key.clone();
                let fields = fields.clone();
                return Ok(Progress::Incomplete(
                    resume.and_then(move |val, rest| {
                        let mut acc = acc;
                        acc.push((key, val));
                        read_fields(fields, index + 1, acc, rest)
                    }),
                    rest,
                ));
            }
        }
    }
}

impl Framing for MapCodec {
    fn read(&self, buf: BufSeq) -> Result<Progress, FrameError> {
        read_fields(
            self.fields.clone(),
            0,
            Vec::with_capacity(self.fields.len()),
            buf,
        )
    }

    fn write(&self, val: &Val, out: &mut BytesMut) -> Result<(), FrameError> {
        let pairs = val.as_map()?;
        if let Some(size) = self.size {
            out.reserve(size);
        }
        // Fields are framed in declaration order regardless of the order
        // the value was assembled in. Undeclared keys are not framed.
        for (key, codec) in self.fields.iter() {
            let item = pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v)
                .ok_or(FrameError::ShapeMismatch {
                    expected: self.fields.len(),
                    found: pairs.len(),
                })?;
            codec.write(item, out)?;
        }
        Ok(())
    }

    fn size(&self) -> Option<usize> {
        self.size
    }
}
