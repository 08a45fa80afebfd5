//! Error conversion utilities for CLI.
//!
//! Converts bootpack-core's typed errors (thiserror) into contextual errors
//! (anyhow) with a hint on what to check next.

use anyhow::anyhow;
use bootpack_core::LaunchError;
use std::path::Path;

/// Converts `LaunchError` to an anyhow error naming the archive.
pub fn convert_launch_error(err: LaunchError, archive: &Path) -> anyhow::Error {
    match err {
        LaunchError::Io(io_err) => {
            anyhow!(
                "I/O error while reading '{}': {}",
                archive.display(),
                io_err
            )
        }
        ref corrupt @ (LaunchError::NotAContainer { .. }
        | LaunchError::CorruptEntry { .. }
        | LaunchError::CorruptArchive { .. }) => {
            anyhow!(
                "Invalid archive '{}': {}\n\
                 HINT: Nested archives must be valid zip files stored without compression. \
                 The package may be truncated; rebuild it.",
                archive.display(),
                corrupt
            )
        }
        LaunchError::UnsupportedCompression { name, method } => {
            anyhow!(
                "Entry '{}' in '{}' uses unsupported compression method {}\n\
                 HINT: Only stored and deflated entries can be read.",
                name,
                archive.display(),
                method
            )
        }
        LaunchError::MissingMetadata(reason) => {
            anyhow!(
                "Missing launch metadata in '{}': {}\n\
                 HINT: META-INF/MANIFEST.MF must declare Start-Class or Main-Class.",
                archive.display(),
                reason
            )
        }
        LaunchError::ResolutionFailure { name } => {
            anyhow!(
                "'{}' is not on the search path of '{}'\n\
                 HINT: Run 'bootpack list' to see which archives are searched.",
                name,
                archive.display()
            )
        }
        _ => anyhow::Error::from(err)
            .context(format!("Error processing archive '{}'", archive.display())),
    }
}

/// Adds archive context to a core result.
pub fn add_archive_context<T>(
    result: Result<T, LaunchError>,
    archive: &Path,
) -> anyhow::Result<T> {
    result.map_err(|e| convert_launch_error(e, archive))
}
