use bytes::Bytes;

use crate::error::FrameError;

/// A decoded (or encodable) value.
///
/// Frames are heterogeneous, so everything a codec tree can produce lives in
/// one closed universe: symbolic tags (enum tags, literal markers), integers,
/// floats, text, raw bytes, lists and ordered maps.
#[derive(Debug, Clone)]
pub enum Val {
    /// A keyword-like symbolic tag.
    Sym(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    Bytes(Bytes),
    List(Vec<Val>),
    /// Insertion-ordered key/value pairs.
    Map(Vec<(String, Val)>),
}

impl Val {
    pub fn sym(tag: impl Into<String>) -> Val {
        Val::Sym(tag.into())
    }

    pub fn map<K: Into<String>>(pairs: impl IntoIterator<Item = (K, Val)>) -> Val {
        Val::Map(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Looks a key up in a map value.
    pub fn get(&self, key: &str) -> Option<&Val> {
        match self {
            Val::Map(pairs) => pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Val::Sym(_) => "symbol",
            Val::Int(_) => "integer",
            Val::UInt(_) => "unsigned integer",
            Val::Float(_) => "float",
            Val::Str(_) => "string",
            Val::Bytes(_) => "bytes",
            Val::List(_) => "list",
            Val::Map(_) => "map",
        }
    }

    pub fn as_list(&self) -> Result<&[Val], FrameError> {
        match self {
            Val::List(items) => Ok(items),
            other => Err(FrameError::TypeMismatch {
                expected: "list",
                found: other.clone(),
            }),
        }
    }

    pub fn as_map(&self) -> Result<&[(String, Val)], FrameError> {
        match self {
            Val::Map(pairs) => Ok(pairs),
            other => Err(FrameError::TypeMismatch {
                expected: "map",
                found: other.clone(),
            }),
        }
    }

    pub fn as_str(&self) -> Result<&str, FrameError> {
        match self {
            Val::Str(text) => Ok(text),
            other => Err(FrameError::TypeMismatch {
                expected: "string",
                found: other.clone(),
            }),
        }
    }

    pub fn as_sym(&self) -> Result<&str, FrameError> {
        match self {
            Val::Sym(tag) => Ok(tag),
            other => Err(FrameError::TypeMismatch {
                expected: "symbol",
                found: other.clone(),
            }),
        }
    }

    /// Raw bytes of a byte-carrying value; strings contribute their UTF-8.
    pub fn as_raw(&self) -> Result<&[u8], FrameError> {
        match self {
            Val::Bytes(bytes) => Ok(bytes),
            Val::Str(text) => Ok(text.as_bytes()),
            other => Err(FrameError::TypeMismatch {
                expected: "bytes",
                found: other.clone(),
            }),
        }
    }

    /// A non-negative length.
    pub fn to_len(&self) -> Result<usize, FrameError> {
        match self {
            Val::Int(n) if *n >= 0 => Ok(*n as usize),
            Val::UInt(n) => Ok(*n as usize),
            other => Err(FrameError::TypeMismatch {
                expected: "length",
                found: other.clone(),
            }),
        }
    }

    pub fn to_i64(&self) -> Option<i64> {
        match self {
            Val::Int(n) => Some(*n),
            Val::UInt(n) => i64::try_from(*n).ok(),
            _ => None,
        }
    }

    pub fn to_u64(&self) -> Option<u64> {
        match self {
            Val::UInt(n) => Some(*n),
            Val::Int(n) => u64::try_from(*n).ok(),
            _ => None,
        }
    }

    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Val::Float(x) => Some(*x),
            Val::Int(n) => Some(*n as f64),
            Val::UInt(n) => Some(*n as f64),
            _ => None,
        }
    }
}

/// Integers compare by numeric value regardless of signedness, so values
/// round-tripped through unsigned wire types stay equal to their source.
impl PartialEq for Val {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Val::Sym(a), Val::Sym(b)) => a == b,
            (Val::Str(a), Val::Str(b)) => a == b,
            (Val::Bytes(a), Val::Bytes(b)) => a == b,
            (Val::List(a), Val::List(b)) => a == b,
            (Val::Map(a), Val::Map(b)) => a == b,
            (Val::Int(a), Val::Int(b)) => a == b,
            (Val::UInt(a), Val::UInt(b)) => a == b,
            (Val::Float(a), Val::Float(b)) => a == b,
            (Val::Int(a), Val::UInt(b)) | (Val::UInt(b), Val::Int(a)) => {
                *a >= 0 && *a as u64 == *b
            }
            _ => false,
        }
    }
}

impl From<i64> for Val {
    fn from(n: i64) -> Val {
        Val::Int(n)
    }
}

impl From<i32> for Val {
    fn from(n: i32) -> Val {
        Val::Int(n.into())
    }
}

impl From<u64> for Val {
    fn from(n: u64) -> Val {
        Val::UInt(n)
    }
}

impl From<f64> for Val {
    fn from(x: f64) -> Val {
        Val::Float(x)
    }
}

impl From<&str> for Val {
    fn from(text: &str) -> Val {
        Val::Str(text.into())
    }
}

impl From<String> for Val {
    fn from(text: String) -> Val {
        Val::Str(text)
    }
}

impl From<Bytes> for Val {
    fn from(bytes: Bytes) -> Val {
        Val::Bytes(bytes)
    }
}

impl From<Vec<Val>> for Val {
    fn from(items: Vec<Val>) -> Val {
        Val::List(items)
    }
}

#[cfg(test)]
mod tests {
    use super::Val;

    #[test]
    fn mixed_sign_equality() {
        assert_eq!(Val::Int(3), Val::UInt(3));
        assert_eq!(Val::UInt(3), Val::Int(3));
        assert_ne!(Val::Int(-1), Val::UInt(u64::MAX));
        assert_ne!(Val::Int(3), Val::Float(3.0));
    }

    #[test]
    fn map_lookup() {
        let map = Val::map([("a", Val::Int(1)), ("b", Val::Int(2))]);
        assert_eq!(map.get("b"), Some(&Val::Int(2)));
        assert_eq!(map.get("c"), None);
    }

    #[test]
    fn length_coercion() {
        assert_eq!(Val::Int(4).to_len().unwrap(), 4);
        assert_eq!(Val::UInt(4).to_len().unwrap(), 4);
        Val::Int(-4).to_len().unwrap_err();
    }
}
