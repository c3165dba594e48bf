use crate::codecs::{literal, MapCodec, TupleCodec};
use crate::primitive::Primitive;
use crate::value::Val;
use crate::Codec;

/// A declarative description of a binary layout.
///
/// Frames are plain data: primitives, ordered tuples, keyed maps, literal
/// constants and already-compiled codecs nest freely (sub-codecs may be
/// shared, so the tree is a DAG). [`compile`] reifies a frame into a codec.
#[derive(Debug, Clone)]
pub enum Frame {
    Prim(Primitive),
    /// Children decode in order; the value is a list of the same length.
    Tuple(Vec<Frame>),
    /// Keys are preserved; byte order follows declaration order.
    Map(Vec<(String, Frame)>),
    /// A zero-byte constant: reads as itself, write asserts equality.
    Lit(Val),
    Compiled(Codec),
}

impl Frame {
    /// A literal symbol, e.g. a tag marking one arm of a header.
    pub fn sym(tag: impl Into<String>) -> Frame {
        Frame::Lit(Val::Sym(tag.into()))
    }

    pub fn lit(value: impl Into<Val>) -> Frame {
        Frame::Lit(value.into())
    }

    /// An insertion-ordered map frame; the portable map constructor.
    pub fn map<K: Into<String>, F: Into<Frame>>(fields: impl IntoIterator<Item = (K, F)>) -> Frame {
        Frame::Map(
            fields
                .into_iter()
                .map(|(key, frame)| (key.into(), frame.into()))
                .collect(),
        )
    }
}

/// Reifies a frame into a codec.
///
/// Idempotent: compiling an already-compiled codec returns it unchanged.
pub fn compile(frame: impl Into<Frame>) -> Codec {
    match frame.into() {
        Frame::Compiled(codec) => codec,
        Frame::Prim(prim) => Codec::new(prim),
        Frame::Lit(value) => literal(value),
        Frame::Tuple(items) => {
            Codec::new(TupleCodec::new(items.into_iter().map(compile).collect()))
        }
        Frame::Map(fields) => Codec::new(MapCodec::new(
            fields
                .into_iter()
                .map(|(key, frame)| (key, compile(frame)))
                .collect(),
        )),
    }
}

impl From<Primitive> for Frame {
    fn from(prim: Primitive) -> Frame {
        Frame::Prim(prim)
    }
}

impl From<Codec> for Frame {
    fn from(codec: Codec) -> Frame {
        Frame::Compiled(codec)
    }
}

impl From<Val> for Frame {
    fn from(value: Val) -> Frame {
        Frame::Lit(value)
    }
}

impl From<Vec<Frame>> for Frame {
    fn from(items: Vec<Frame>) -> Frame {
        Frame::Tuple(items)
    }
}
