//! List command implementation

use crate::cli::ListArgs;
use crate::commands::open_launcher;
use crate::error::add_archive_context;
use crate::output::ElementKind;
use crate::output::OutputFormatter;
use crate::output::SearchPathElement;
use crate::output::SearchPathListing;
use anyhow::Result;
use bootpack_core::manifest::MANIFEST_PATH;

pub fn execute(args: &ListArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let mut launcher = open_launcher(&args.archive, &args.layout)?;
    if !launcher.root().contains(MANIFEST_PATH) {
        formatter.format_warning(&format!(
            "{} has no {MANIFEST_PATH}; layout inferred from its contents",
            launcher.root().name()
        ));
    }

    let class_path = add_archive_context(launcher.class_path(), &args.archive)?;
    let root = launcher.root();
    let elements = class_path
        .iter()
        .enumerate()
        .map(|(position, element)| {
            if element.is_directory() {
                let entries = root
                    .entries()
                    .filter(|e| e.is_file() && e.name.starts_with(element.prefix()))
                    .count();
                SearchPathElement {
                    position,
                    origin: element.origin(),
                    kind: ElementKind::Directory,
                    entries,
                }
            } else {
                SearchPathElement {
                    position,
                    origin: element.origin(),
                    kind: ElementKind::Nested,
                    entries: element.archive().len(),
                }
            }
        })
        .collect();

    formatter.format_search_path(&SearchPathListing {
        archive: root.name().to_string(),
        layout: launcher.filter().name().to_string(),
        elements,
    })
}
