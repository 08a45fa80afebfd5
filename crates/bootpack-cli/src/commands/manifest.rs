//! Manifest command implementation

use crate::cli::ManifestArgs;
use crate::error::add_archive_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use bootpack_core::Archive;
use bootpack_core::Manifest;

pub fn execute(args: &ManifestArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let root = add_archive_context(Archive::from_path(&args.archive), &args.archive)?;
    let manifest = add_archive_context(Manifest::read(&root), &args.archive)?;
    formatter.format_manifest(root.name(), &manifest)
}
