//! Byte View Module
//!
//! Immutable view over a cached byte payload.

use std::fmt;

use bytes::Bytes;

use crate::cache::ByteSize;

// == Byte View ==
/// Read-only view of a cached value.
///
/// Cloning a view is cheap and shares the payload. The payload itself can
/// never be mutated through a view: `byte_slice` hands out a fresh copy.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ByteView {
    b: Bytes,
}

impl ByteView {
    /// Creates a view that takes ownership of `bytes`.
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self { b: bytes.into() }
    }

    /// Number of payload bytes.
    pub fn len(&self) -> usize {
        self.b.len()
    }

    pub fn is_empty(&self) -> bool {
        self.b.is_empty()
    }

    /// Returns a copy of the payload.
    pub fn byte_slice(&self) -> Vec<u8> {
        self.b.to_vec()
    }

    /// Returns a shared handle to the payload, suitable for response bodies.
    pub fn to_bytes(&self) -> Bytes {
        self.b.clone()
    }

    /// Lossy UTF-8 rendering of the payload.
    pub fn as_string(&self) -> String {
        String::from_utf8_lossy(&self.b).into_owned()
    }
}

impl ByteSize for ByteView {
    fn byte_len(&self) -> usize {
        self.len()
    }
}

impl From<Vec<u8>> for ByteView {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl From<&str> for ByteView {
    fn from(s: &str) -> Self {
        Self::new(Bytes::copy_from_slice(s.as_bytes()))
    }
}

impl fmt::Display for ByteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_string())
    }
}

impl fmt::Debug for ByteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteView").field("len", &self.len()).finish()
    }
}
