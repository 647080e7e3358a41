//! Byte View Module
//!
//! Immutable view over a cached value.

use std::fmt;

use bytes::Bytes;

// == Byte View ==
/// An immutable, cheaply clonable view over the bytes of a cached value.
///
/// The underlying buffer is never handed out mutably. Accessors that return
/// owned bytes always return a fresh copy, so callers cannot corrupt the
/// stored data through a returned buffer.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct ByteView {
    b: Bytes,
}

impl ByteView {
    // == Constructors ==
    /// Takes ownership of `bytes` without copying.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { b: Bytes::from(bytes) }
    }

    /// Copies `bytes` into a new view.
    pub fn copy_from_slice(bytes: &[u8]) -> Self {
        Self {
            b: Bytes::copy_from_slice(bytes),
        }
    }

    // == Length ==
    /// Returns the length of the view in bytes.
    pub fn len(&self) -> usize {
        self.b.len()
    }

    pub fn is_empty(&self) -> bool {
        self.b.is_empty()
    }

    // == Byte Slice ==
    /// Returns a copy of the data.
    pub fn byte_slice(&self) -> Vec<u8> {
        self.b.to_vec()
    }

    /// Returns the data as a shared `Bytes` handle.
    ///
    /// `Bytes` is read-only, so sharing it does not expose the stored value
    /// to mutation.
    pub fn to_bytes(&self) -> Bytes {
        self.b.clone()
    }

    /// Returns the data as a string, replacing invalid UTF-8 sequences.
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.b).into_owned()
    }
}

impl AsRef<[u8]> for ByteView {
    fn as_ref(&self) -> &[u8] {
        &self.b
    }
}

impl From<Vec<u8>> for ByteView {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl From<&str> for ByteView {
    fn from(s: &str) -> Self {
        Self::copy_from_slice(s.as_bytes())
    }
}

impl fmt::Display for ByteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.b))
    }
}

impl fmt::Debug for ByteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteView")
            .field("len", &self.b.len())
            .field("value", &String::from_utf8_lossy(&self.b))
            .finish()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_len_and_display() {
        let view = ByteView::from("630");
        assert_eq!(view.len(), 3);
        assert!(!view.is_empty());
        assert_eq!(view.to_string(), "630");
    }

    #[test]
    fn test_byte_slice_is_a_copy() {
        let view = ByteView::from("abc");

        let mut copy = view.byte_slice();
        copy[0] = b'z';

        assert_eq!(view.as_ref(), b"abc");
        assert_eq!(view.byte_slice(), b"abc".to_vec());
    }

    #[test]
    fn test_copy_from_slice_detaches_source() {
        let mut source = b"value".to_vec();
        let view = ByteView::copy_from_slice(&source);

        source[0] = b'V';

        assert_eq!(view.to_string(), "value");
    }

    #[test]
    fn test_lossy_string_for_binary_data() {
        let view = ByteView::new(vec![0x66, 0xff, 0x6f]);
        assert_eq!(view.to_string_lossy(), "f\u{fffd}o");
    }

    #[test]
    fn test_empty_view() {
        let view = ByteView::default();
        assert!(view.is_empty());
        assert_eq!(view.len(), 0);
    }
}
