//! Descriptors for items stored inside an archive.
//!
//! An [`Entry`] is produced once by decoding a container and never mutated
//! afterwards. Byte ranges are always relative to the view of the archive
//! that produced the entry, so the same descriptor stays valid whether that
//! archive is a file on disk or a window into a parent archive.

pub mod entry;

pub use entry::ByteRange;
pub use entry::Compression;
pub use entry::Entry;
pub use entry::EntryKind;
