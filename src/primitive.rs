use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::FrameError;
use crate::value::Val;
use crate::{BufSeq, Framing, Progress, Resume};

/// A fixed-width wire primitive.
///
/// Multi-byte tags are big-endian; every tag has a `Le` twin. Integers decode
/// to [`Val::Int`] (signed) or [`Val::UInt`] (unsigned), floats to
/// [`Val::Float`]. On encode, any numeric [`Val`] is accepted as long as it
/// fits the wire type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Byte,
    UByte,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float32,
    Float64,
    Int16Le,
    UInt16Le,
    Int32Le,
    UInt32Le,
    Int64Le,
    UInt64Le,
    Float32Le,
    Float64Le,
}

impl Primitive {
    /// Encoded width in bytes.
    pub const fn width(self) -> usize {
        match self {
            Primitive::Byte | Primitive::UByte => 1,
            Primitive::Int16 | Primitive::UInt16 | Primitive::Int16Le | Primitive::UInt16Le => 2,
            Primitive::Int32
            | Primitive::UInt32
            | Primitive::Float32
            | Primitive::Int32Le
            | Primitive::UInt32Le
            | Primitive::Float32Le => 4,
            Primitive::Int64
            | Primitive::UInt64
            | Primitive::Float64
            | Primitive::Int64Le
            | Primitive::UInt64Le
            | Primitive::Float64Le => 8,
        }
    }

    /// Registry name, e.g. `"int32"` or `"uint16-le"`.
    pub const fn name(self) -> &'static str {
        match self {
            Primitive::Byte => "byte",
            Primitive::UByte => "ubyte",
            Primitive::Int16 => "int16",
            Primitive::UInt16 => "uint16",
            Primitive::Int32 => "int32",
            Primitive::UInt32 => "uint32",
            Primitive::Int64 => "int64",
            Primitive::UInt64 => "uint64",
            Primitive::Float32 => "float32",
            Primitive::Float64 => "float64",
            Primitive::Int16Le => "int16-le",
            Primitive::UInt16Le => "uint16-le",
            Primitive::Int32Le => "int32-le",
            Primitive::UInt32Le => "uint32-le",
            Primitive::Int64Le => "int64-le",
            Primitive::UInt64Le => "uint64-le",
            Primitive::Float32Le => "float32-le",
            Primitive::Float64Le => "float64-le",
        }
    }

    /// Looks a primitive up by registry name.
    pub fn named(name: &str) -> Option<Primitive> {
        const TABLE: [Primitive; 18] = [
            Primitive::Byte,
            Primitive::UByte,
            Primitive::Int16,
            Primitive::UInt16,
            Primitive::Int32,
            Primitive::UInt32,
            Primitive::Int64,
            Primitive::UInt64,
            Primitive::Float32,
            Primitive::Float64,
            Primitive::Int16Le,
            Primitive::UInt16Le,
            Primitive::Int32Le,
            Primitive::UInt32Le,
            Primitive::Int64Le,
            Primitive::UInt64Le,
            Primitive::Float32Le,
            Primitive::Float64Le,
        ];
        TABLE.into_iter().find(|prim| prim.name() == name)
    }

    fn get(self, mut bytes: Bytes) -> Val {
        match self {
            Primitive::Byte => Val::Int(bytes.get_i8().into()),
            Primitive::UByte => Val::UInt(bytes.get_u8().into()),
            Primitive::Int16 => Val::Int(bytes.get_i16().into()),
            Primitive::UInt16 => Val::UInt(bytes.get_u16().into()),
            Primitive::Int32 => Val::Int(bytes.get_i32().into()),
            Primitive::UInt32 => Val::UInt(bytes.get_u32().into()),
            Primitive::Int64 => Val::Int(bytes.get_i64()),
            Primitive::UInt64 => Val::UInt(bytes.get_u64()),
            Primitive::Float32 => Val::Float(bytes.get_f32().into()),
            Primitive::Float64 => Val::Float(bytes.get_f64()),
            Primitive::Int16Le => Val::Int(bytes.get_i16_le().into()),
            Primitive::UInt16Le => Val::UInt(bytes.get_u16_le().into()),
            Primitive::Int32Le => Val::Int(bytes.get_i32_le().into()),
            Primitive::UInt32Le => Val::UInt(bytes.get_u32_le().into()),
            Primitive::Int64Le => Val::Int(bytes.get_i64_le()),
            Primitive::UInt64Le => Val::UInt(bytes.get_u64_le()),
            Primitive::Float32Le => Val::Float(bytes.get_f32_le().into()),
            Primitive::Float64Le => Val::Float(bytes.get_f64_le()),
        }
    }

    fn put(self, val: &Val, out: &mut BytesMut) -> Result<(), FrameError> {
        let incompatible = || FrameError::TypeMismatch {
            expected: self.name(),
            found: val.clone(),
        };
        let signed = |val: &Val| val.to_i64().ok_or_else(incompatible);
        let unsigned = |val: &Val| val.to_u64().ok_or_else(incompatible);
        match self {
            Primitive::Byte => {
                out.put_i8(i8::try_from(signed(val)?).map_err(|_| incompatible())?)
            }
            Primitive::UByte => {
                out.put_u8(u8::try_from(unsigned(val)?).map_err(|_| incompatible())?)
            }
            Primitive::Int16 => {
                out.put_i16(i16::try_from(signed(val)?).map_err(|_| incompatible())?)
            }
            Primitive::UInt16 => {
                out.put_u16(u16::try_from(unsigned(val)?).map_err(|_| incompatible())?)
            }
            Primitive::Int32 => {
                out.put_i32(i32::try_from(signed(val)?).map_err(|_| incompatible())?)
            }
            Primitive::UInt32 => {
                out.put_u32(u32::try_from(unsigned(val)?).map_err(|_| incompatible())?)
            }
            Primitive::Int64 => out.put_i64(signed(val)?),
            Primitive::UInt64 => out.put_u64(unsigned(val)?),
            Primitive::Float32 => out.put_f32(val.to_f64().ok_or_else(incompatible)? as f32),
            Primitive::Float64 => out.put_f64(val.to_f64().ok_or_else(incompatible)?),
            Primitive::Int16Le => {
                out.put_i16_le(i16::try_from(signed(val)?).map_err(|_| incompatible())?)
            }
            Primitive::UInt16Le => {
                out.put_u16_le(u16::try_from(unsigned(val)?).map_err(|_| incompatible())?)
            }
            Primitive::Int32Le => {
                out.put_i32_le(i32::try_from(signed(val)?).map_err(|_| incompatible())?)
            }
            Primitive::UInt32Le => {
                out.put_u32_le(u32::try_from(unsigned(val)?).map_err(|_| incompatible())?)
            }
            Primitive::Int64Le => out.put_i64_le(signed(val)?),
            Primitive::UInt64Le => out.put_u64_le(unsigned(val)?),
            Primitive::Float32Le => out.put_f32_le(val.to_f64().ok_or_else(incompatible)? as f32),
            Primitive::Float64Le => out.put_f64_le(val.to_f64().ok_or_else(incompatible)?),
        }
        Ok(())
    }
}

impl Framing for Primitive {
    fn read(&self, mut buf: BufSeq) -> Result<Progress, FrameError> {
        let width = self.width();
        if buf.len() < width {
            let prim = *self;
            return Ok(Progress::Incomplete(
                Resume::new(move |buf| Framing::read(&prim, buf)),
                buf,
            ));
        }
        let bytes = buf.take_contiguous(width);
        Ok(Progress::Done(self.get(bytes), buf))
    }

    fn write(&self, val: &Val, out: &mut BytesMut) -> Result<(), FrameError> {
        self.put(val, out)
    }

    fn size(&self) -> Option<usize> {
        Some(self.width())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_done(prim: Primitive, bytes: &[u8]) -> Val {
        match Framing::read(&prim, BufSeq::from(bytes)).unwrap() {
            Progress::Done(val, rest) => {
                assert!(rest.is_empty());
                val
            }
            other => panic!("expected Done, got {:?}", other),
        }
    }

    fn write_out(prim: Primitive, val: &Val) -> Vec<u8> {
        let mut out = BytesMut::new();
        Framing::write(&prim, val, &mut out).unwrap();
        out.to_vec()
    }

    #[test]
    fn named_round_trip() {
        assert_eq!(Primitive::named("int32"), Some(Primitive::Int32));
        assert_eq!(Primitive::named("float64-le"), Some(Primitive::Float64Le));
        assert_eq!(Primitive::named("int128"), None);
    }

    #[test]
    fn big_endian() {
        assert_eq!(read_done(Primitive::Int32, &[0, 0, 1, 2]), Val::Int(258));
        assert_eq!(write_out(Primitive::Int32, &Val::Int(258)), [0, 0, 1, 2]);
    }

    #[test]
    fn little_endian() {
        assert_eq!(read_done(Primitive::Int32Le, &[2, 1, 0, 0]), Val::Int(258));
        assert_eq!(write_out(Primitive::Int32Le, &Val::Int(258)), [2, 1, 0, 0]);
    }

    #[test]
    fn extremes() {
        assert_eq!(
            read_done(Primitive::Int64, &i64::MIN.to_be_bytes()),
            Val::Int(i64::MIN)
        );
        assert_eq!(
            read_done(Primitive::UInt64, &u64::MAX.to_be_bytes()),
            Val::UInt(u64::MAX)
        );
        assert_eq!(
            write_out(Primitive::UInt64, &Val::UInt(u64::MAX)),
            u64::MAX.to_be_bytes()
        );
    }

    #[test]
    fn floats() {
        assert_eq!(
            read_done(Primitive::Float32, &1.0f32.to_be_bytes()),
            Val::Float(1.0)
        );
        assert_eq!(write_out(Primitive::Float64, &Val::Float(2.0)), 2.0f64.to_be_bytes());
    }

    #[test]
    fn straddles_chunks() {
        let mut buf = BufSeq::from(&[0u8, 0]);
        buf.push(bytes::Bytes::from_static(&[1, 2]));
        match Framing::read(&Primitive::Int32, buf).unwrap() {
            Progress::Done(val, _) => assert_eq!(val, Val::Int(258)),
            other => panic!("expected Done, got {:?}", other),
        }
    }

    #[test]
    fn suspends_then_finishes() {
        let buf = BufSeq::from(&[0u8, 0]);
        let (resume, mut rest) = match Framing::read(&Primitive::Int32, buf).unwrap() {
            Progress::Incomplete(resume, rest) => (resume, rest),
            other => panic!("expected Incomplete, got {:?}", other),
        };
        rest.push(bytes::Bytes::from_static(&[1, 2]));
        match resume.resume(rest).unwrap() {
            Progress::Done(val, _) => assert_eq!(val, Val::Int(258)),
            other => panic!("expected Done, got {:?}", other),
        }
    }

    #[test]
    fn range_checked_write() {
        Framing::write(&Primitive::Byte, &Val::Int(200), &mut BytesMut::new()).unwrap_err();
        Framing::write(&Primitive::UByte, &Val::Int(-1), &mut BytesMut::new()).unwrap_err();
    }
}
