//! Shared, zero-copy windows over archive bytes.

use std::fmt;
use std::sync::Arc;

use crate::LaunchError;
use crate::Result;
use crate::types::ByteRange;

/// Opaque byte store backing one or more archive views.
///
/// Anything that can hand out a stable byte slice qualifies: a `Vec<u8>`
/// read from disk, a `'static` slice embedded in the binary, or a
/// caller-owned buffer.
pub trait Backing: AsRef<[u8]> + Send + Sync {}

impl<T: AsRef<[u8]> + Send + Sync> Backing for T {}

/// A cheaply clonable window into a shared [`Backing`].
///
/// Slicing a view never copies: nested archives hold a `ByteView` that points
/// into their parent's store and keeps it alive for as long as they exist.
///
/// # Examples
///
/// ```
/// use bootpack_core::data::ByteView;
/// use bootpack_core::types::ByteRange;
///
/// let view = ByteView::from_vec(b"hello world".to_vec());
/// let world = view.slice("greeting", ByteRange::new(6, 5)).unwrap();
/// assert_eq!(world.as_slice(), b"world");
/// assert!(world.shares_backing(&view));
/// ```
#[derive(Clone)]
pub struct ByteView {
    backing: Arc<dyn Backing>,
    offset: usize,
    len: usize,
}

impl ByteView {
    /// Wraps a whole backing store.
    pub fn new(backing: Arc<dyn Backing>) -> Self {
        let len = AsRef::<[u8]>::as_ref(&*backing).len();
        Self {
            backing,
            offset: 0,
            len,
        }
    }

    /// Wraps an owned buffer.
    #[must_use]
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        Self::new(Arc::new(bytes))
    }

    /// Wraps a static buffer, e.g. one produced by `include_bytes!`.
    #[must_use]
    pub fn from_static(bytes: &'static [u8]) -> Self {
        Self::new(Arc::new(bytes))
    }

    /// Returns the bytes of this view.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        let all = AsRef::<[u8]>::as_ref(&*self.backing);
        &all[self.offset..self.offset + self.len]
    }

    /// Number of bytes in this view.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the view is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Offset of this view from the start of the backing store.
    #[must_use]
    pub const fn absolute_offset(&self) -> usize {
        self.offset
    }

    /// Returns `true` if both views read from the same backing store.
    #[must_use]
    pub fn shares_backing(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.backing, &other.backing)
    }

    /// Returns a sub-view covering `range`, relative to this view.
    ///
    /// # Errors
    ///
    /// Returns [`LaunchError::CorruptEntry`] if the range does not fit in
    /// this view.
    pub fn slice(&self, name: &str, range: ByteRange) -> Result<Self> {
        let available = self.len as u64;
        if !range.fits_within(available) {
            return Err(LaunchError::CorruptEntry {
                name: name.to_string(),
                offset: range.offset,
                length: range.length,
                available,
            });
        }
        // fits_within bounds both values by self.len, which is a usize
        let start = usize::try_from(range.offset).unwrap_or(self.len);
        let len = usize::try_from(range.length).unwrap_or(0);
        Ok(Self {
            backing: Arc::clone(&self.backing),
            offset: self.offset + start,
            len,
        })
    }
}

impl AsRef<[u8]> for ByteView {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl fmt::Debug for ByteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteView")
            .field("offset", &self.offset)
            .field("len", &self.len)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_is_relative_to_view() {
        let view = ByteView::from_vec((0u8..100).collect());
        let outer = view.slice("outer", ByteRange::new(10, 50)).unwrap();
        let inner = outer.slice("inner", ByteRange::new(5, 5)).unwrap();

        assert_eq!(inner.absolute_offset(), 15);
        assert_eq!(inner.as_slice(), &[15, 16, 17, 18, 19]);
        assert!(inner.shares_backing(&view));
    }

    #[test]
    fn test_slice_out_of_bounds() {
        let view = ByteView::from_vec(vec![0; 16]);
        let err = view.slice("deps/a.jar", ByteRange::new(8, 9)).unwrap_err();
        assert!(matches!(
            err,
            LaunchError::CorruptEntry {
                offset: 8,
                length: 9,
                available: 16,
                ..
            }
        ));
    }

    #[test]
    fn test_slice_overflowing_range() {
        let view = ByteView::from_vec(vec![0; 16]);
        let result = view.slice("x", ByteRange::new(u64::MAX, 2));
        assert!(matches!(result, Err(LaunchError::CorruptEntry { .. })));
    }

    #[test]
    fn test_empty_slice_at_end() {
        let view = ByteView::from_static(b"abc");
        let empty = view.slice("x", ByteRange::new(3, 0)).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_distinct_backings() {
        let a = ByteView::from_vec(vec![1]);
        let b = ByteView::from_vec(vec![1]);
        assert!(!a.shares_backing(&b));
        assert!(a.shares_backing(&a.clone()));
    }
}
