//! The combinator layer: every codec beyond the fixed-width primitives.

mod delimited;
mod enumerated;
mod finite;
mod header;
mod literal;
mod repeated;
mod sequence;
mod string;

pub use delimited::{delimited_block, delimited_frame};
pub use enumerated::{enumeration, enumeration_dense};
pub use finite::{finite_block, finite_frame};
pub use header::{header, prefix, Prefix};
pub use literal::literal;
pub use repeated::{repeated, repeated_delimited, repeated_until_end, repeated_with_prefix};
pub use string::{
    string, string_delimited, string_float, string_float_delimited, string_integer,
    string_integer_delimited, string_len,
};

pub(crate) use sequence::{MapCodec, TupleCodec};
