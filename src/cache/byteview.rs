//! Byte View Module
//!
//! Immutable view over a cached value.

use std::fmt;

use bytes::Bytes;

// == Byte View ==
/// An immutable sequence of bytes held by the cache.
///
/// Cloning a view is cheap and shares the underlying allocation, which is
/// never mutated. Every accessor hands out a fresh copy, so callers can not
/// reach into cached state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ByteView {
    b: Bytes,
}

impl ByteView {
    // == Length ==
    /// Returns the number of bytes in the view.
    pub fn len(&self) -> usize {
        self.b.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.b.is_empty()
    }

    // == Byte Slice ==
    /// Returns a copy of the data.
    pub fn byte_slice(&self) -> Vec<u8> {
        self.b.to_vec()
    }

    // == String ==
    /// Returns the data as a string, replacing invalid UTF-8 sequences.
    pub fn as_string(&self) -> String {
        String::from_utf8_lossy(&self.b).into_owned()
    }
}

impl From<Vec<u8>> for ByteView {
    fn from(b: Vec<u8>) -> Self {
        Self { b: Bytes::from(b) }
    }
}

impl From<Bytes> for ByteView {
    fn from(b: Bytes) -> Self {
        Self { b }
    }
}

impl From<&str> for ByteView {
    fn from(s: &str) -> Self {
        Self {
            b: Bytes::copy_from_slice(s.as_bytes()),
        }
    }
}

impl fmt::Display for ByteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.b))
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byteview_len_and_string() {
        let view = ByteView::from("589");
        assert_eq!(view.len(), 3);
        assert!(!view.is_empty());
        assert_eq!(view.as_string(), "589");
        assert_eq!(view.to_string(), "589");
    }

    #[test]
    fn test_byte_slice_is_a_copy() {
        let view = ByteView::from(vec![1u8, 2, 3]);

        let mut copy = view.byte_slice();
        copy[0] = 42;

        assert_eq!(view.byte_slice(), vec![1, 2, 3]);
    }

    #[test]
    fn test_default_is_empty() {
        let view = ByteView::default();
        assert!(view.is_empty());
        assert_eq!(view.as_string(), "");
    }
}
