//! Resolve command implementation

use crate::cli::ResolveArgs;
use crate::commands::open_launcher;
use crate::error::add_archive_context;
use crate::error::convert_launch_error;
use crate::output::OutputFormatter;
use crate::output::Resolution;
use anyhow::Result;
use bootpack_core::LaunchError;
use bootpack_core::loader::ResolvedFrom;
use bootpack_core::loader::module_path;
use std::io::Write;

pub fn execute(args: &ResolveArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let mut launcher = open_launcher(&args.archive, &args.layout)?;
    let loader = add_archive_context(launcher.build_loader(), &args.archive)?;

    let name = if args.module {
        module_path(&args.name)
    } else {
        args.name.clone()
    };
    let found = add_archive_context(loader.find(&name), &args.archive)?.ok_or_else(|| {
        convert_launch_error(
            LaunchError::ResolutionFailure {
                name: args.name.clone(),
            },
            &args.archive,
        )
    })?;

    if args.print {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(&found.bytes)?;
        stdout.flush()?;
        return Ok(());
    }

    let (origin, position) = match found.source {
        ResolvedFrom::ClassPath(position) => (
            loader
                .class_path()
                .get(position)
                .map_or_else(String::new, |element| element.origin()),
            Some(position),
        ),
        ResolvedFrom::Parent => ("parent".to_string(), None),
    };

    formatter.format_resolution(&Resolution {
        name,
        origin,
        position,
        size: found.bytes.len(),
    })
}
