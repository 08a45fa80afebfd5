//! Common trait for container decoders.

use std::fmt;

use crate::Result;
use crate::data::ByteView;
use crate::types::Entry;

/// Decodes the directory of a container into entry descriptors.
///
/// Implementations must be deterministic: decoding the same bytes twice
/// yields the same entries in the same order. Byte ranges in the returned
/// entries are relative to `data`.
pub trait ContainerDecoder: Send + Sync + fmt::Debug {
    /// Decodes `data`, labelled `name` in diagnostics.
    ///
    /// # Errors
    ///
    /// Returns [`LaunchError::NotAContainer`](crate::LaunchError::NotAContainer)
    /// if the bytes are not a container of this format,
    /// [`LaunchError::CorruptArchive`](crate::LaunchError::CorruptArchive) if
    /// the directory cannot be decoded, and
    /// [`LaunchError::CorruptEntry`](crate::LaunchError::CorruptEntry) if an
    /// entry points outside `data`.
    fn decode(&self, name: &str, data: &ByteView) -> Result<Vec<Entry>>;

    /// Returns the container format name.
    fn format_name(&self) -> &str;
}
