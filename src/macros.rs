/// Builds a [`Frame`](crate::Frame) tree with a little syntax.
///
/// The list form makes a tuple frame, the `key => frame` form an ordered
/// map frame. Anything convertible into a frame works as an element:
/// primitives, literals, compiled codecs, nested invocations.
///
/// ```
/// use byteframe::{frame, Primitive};
///
/// let tuple = frame![Primitive::Int32, Primitive::Float64];
/// let map = frame! {
///     "id" => Primitive::UInt32,
///     "position" => tuple,
/// };
/// ```
#[macro_export]
macro_rules! frame {
    { $($key:literal => $value:expr),+ $(,)? } => {
        $crate::Frame::Map(vec![
            $(($key.into(), $crate::Frame::from($value))),+
        ])
    };
    [ $($item:expr),* $(,)? ] => {
        $crate::Frame::Tuple(vec![
            $($crate::Frame::from($item)),*
        ])
    };
}
