use std::collections::vec_deque;
use std::collections::VecDeque;
use std::fmt;

use bytes::{Bytes, BytesMut};

/// An immutable logical concatenation of buffer chunks.
///
/// `BufSeq` is the currency of the decode side: input arrives as refcounted
/// [`Bytes`] chunks and every split hands out views into the same underlying
/// memory. `split_to`, `advance` and `clone` never copy; [`contiguous`]
/// copies at most once, and not at all for empty or single-chunk sequences.
///
/// Position belongs to the `BufSeq`, never to the underlying buffers, so a
/// clone is an independent view: advancing one leaves the other untouched.
///
/// [`contiguous`]: BufSeq::contiguous
#[derive(Clone, Default)]
pub struct BufSeq {
    chunks: VecDeque<Bytes>,
    len: usize,
}

impl BufSeq {
    pub fn new() -> Self {
        BufSeq::default()
    }

    /// Total byte count across all chunks.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Appends a chunk. Empty chunks are dropped so that chunk iteration
    /// never sees one.
    pub fn push(&mut self, chunk: impl Into<Bytes>) {
        let chunk = chunk.into();
        if !chunk.is_empty() {
            self.len += chunk.len();
            self.chunks.push_back(chunk);
        }
    }

    /// Appends all chunks of `other`.
    pub fn append(&mut self, other: BufSeq) {
        self.len += other.len;
        self.chunks.extend(other.chunks);
    }

    /// Splits off the first `n` bytes as an independent sequence.
    ///
    /// Shares the underlying buffers with `self`.
    ///
    /// # Panics
    ///
    /// Panics if `n > self.len()`; callers check availability first.
    pub fn split_to(&mut self, n: usize) -> BufSeq {
        assert!(n <= self.len, "split_to out of range: {} > {}", n, self.len);
        let mut head = BufSeq::new();
        let mut remaining = n;
        while remaining > 0 {
            let front = self.chunks.front_mut().expect("length invariant");
            if front.len() <= remaining {
                remaining -= front.len();
                let chunk = self.chunks.pop_front().expect("length invariant");
                head.push(chunk);
            } else {
                head.push(front.split_to(remaining));
                remaining = 0;
            }
        }
        self.len -= n;
        head
    }

    /// Discards the first `n` bytes.
    ///
    /// # Panics
    ///
    /// Panics if `n > self.len()`.
    pub fn advance(&mut self, n: usize) {
        let _ = self.split_to(n);
    }

    /// Splits off the first `n` bytes collapsed into a single buffer.
    ///
    /// Copies only when the range straddles a chunk boundary.
    pub fn take_contiguous(&mut self, n: usize) -> Bytes {
        self.split_to(n).contiguous()
    }

    /// The whole sequence as a single buffer. Free for empty and
    /// single-chunk sequences; otherwise one copy.
    pub fn contiguous(&self) -> Bytes {
        match self.chunks.len() {
            0 => Bytes::new(),
            1 => self.chunks[0].clone(),
            _ => {
                let mut flat = BytesMut::with_capacity(self.len);
                for chunk in &self.chunks {
                    flat.extend_from_slice(chunk);
                }
                flat.freeze()
            }
        }
    }

    /// The chunk slices in order. None of them is empty.
    pub fn chunks(&self) -> impl Iterator<Item = &[u8]> {
        self.chunks.iter().map(|chunk| chunk.as_ref())
    }

    /// Iterates the bytes in logical order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            chunks: self.chunks.iter(),
            current: &[],
        }
    }
}

impl fmt::Debug for BufSeq {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("BufSeq")
            .field("len", &self.len)
            .field("chunks", &self.chunks.len())
            .finish()
    }
}

pub struct Iter<'a> {
    chunks: vec_deque::Iter<'a, Bytes>,
    current: &'a [u8],
}

impl<'a> Iterator for Iter<'a> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        loop {
            if let Some((&byte, rest)) = self.current.split_first() {
                self.current = rest;
                return Some(byte);
            }
            self.current = self.chunks.next()?.as_ref();
        }
    }
}

impl From<Bytes> for BufSeq {
    fn from(chunk: Bytes) -> BufSeq {
        let mut seq = BufSeq::new();
        seq.push(chunk);
        seq
    }
}

impl From<BytesMut> for BufSeq {
    fn from(chunk: BytesMut) -> BufSeq {
        BufSeq::from(chunk.freeze())
    }
}

impl From<Vec<u8>> for BufSeq {
    fn from(bytes: Vec<u8>) -> BufSeq {
        BufSeq::from(Bytes::from(bytes))
    }
}

impl From<&[u8]> for BufSeq {
    fn from(bytes: &[u8]) -> BufSeq {
        BufSeq::from(Bytes::copy_from_slice(bytes))
    }
}

impl<const N: usize> From<&[u8; N]> for BufSeq {
    fn from(bytes: &[u8; N]) -> BufSeq {
        BufSeq::from(&bytes[..])
    }
}

impl PartialEq for BufSeq {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl PartialEq<[u8]> for BufSeq {
    fn eq(&self, other: &[u8]) -> bool {
        self.len == other.len() && self.iter().eq(other.iter().copied())
    }
}
