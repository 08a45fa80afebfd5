//! Subcommand implementations.

pub mod completion;
pub mod list;
pub mod manifest;
pub mod resolve;
pub mod verify;

use crate::cli::LayoutArgs;
use crate::error::add_archive_context;
use anyhow::Result;
use bootpack_core::Archive;
use bootpack_core::Launcher;
use std::path::Path;

/// Opens `path` and selects its layout, honoring a `--layout` override.
pub fn open_launcher(path: &Path, layout: &LayoutArgs) -> Result<Launcher> {
    let root = add_archive_context(Archive::from_path(path), path)?;
    add_archive_context(Launcher::new(root, layout.config()), path)
}
