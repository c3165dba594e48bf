use crate::value::Val;

/// Fatal framing failure.
///
/// Running out of bytes is deliberately absent: an exhausted input is
/// reported through [`Progress::Incomplete`](crate::Progress) so the decode
/// can resume once more bytes arrive. Everything here aborts the current
/// encode or decode.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FrameError {
    /// A top-level decode finished with unconsumed input.
    #[error("{remaining} bytes left over after decoding")]
    ResidualBytes { remaining: usize },

    /// The input ended in the middle of a frame.
    #[error("input ended inside a frame")]
    UnexpectedEof,

    /// A literal frame decoded or was asked to encode a different value.
    #[error("literal mismatch: expected {expected:?}, found {found:?}")]
    LiteralMismatch { expected: Val, found: Val },

    /// The wire value has no tag in the enumeration.
    #[error("unknown enum value {0}")]
    UnknownEnumValue(i128),

    /// The tag has no wire value in the enumeration.
    #[error("unknown enum tag {0:?}")]
    UnknownEnumTag(String),

    /// An enumeration assigns the same tag twice. Raised when the
    /// enumeration is built, never mid-decode.
    #[error("duplicate enum tag {0:?}")]
    DuplicateEnumTag(String),

    /// An enumeration assigns the same value to two tags, which would make
    /// decoding ambiguous. Raised when the enumeration is built.
    #[error("duplicate enum value {0}")]
    DuplicateEnumValue(i16),

    /// A bounded body was not decoded to exactly its end.
    #[error("body of {size} bytes was not consumed exactly")]
    BodyOverrun { size: usize },

    /// Bytes or text not representable in the declared charset.
    #[error("{charset}: {message}")]
    Charset {
        charset: &'static str,
        message: &'static str,
    },

    /// The charset name is not in the registry. Raised when the frame is
    /// built, never mid-decode.
    #[error("unsupported charset {0:?}")]
    UnsupportedCharset(String),

    /// Enum assignments must fit a signed 16-bit range.
    #[error("enum value {0} does not fit a signed 16-bit range")]
    EnumRange(i64),

    /// Tuple/map cardinality differs from the codec's shape.
    #[error("shape mismatch: codec has {expected} items, value has {found}")]
    ShapeMismatch { expected: usize, found: usize },

    /// The value's kind is not what the codec frames.
    #[error("expected {expected}, found {found:?}")]
    TypeMismatch {
        expected: &'static str,
        found: Val,
    },
}
