//! Verify command implementation

use crate::cli::VerifyArgs;
use crate::commands::open_launcher;
use crate::output::Issue;
use crate::output::OutputFormatter;
use crate::output::VerificationReport;
use anyhow::Result;
use anyhow::bail;
use bootpack_core::Archive;
use bootpack_core::Manifest;
use bootpack_core::NestedModuleLoader;
use bootpack_core::archive::NESTED_SEPARATOR;
use bootpack_core::loader::ClassPathEntry;
use bootpack_core::loader::NoParent;
use bootpack_core::manifest::MANIFEST_PATH;
use tracing::debug;

pub fn execute(args: &VerifyArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let launcher = open_launcher(&args.archive, &args.layout)?;
    let root = launcher.root();
    let filter = launcher.filter();

    let mut report = VerificationReport {
        archive: root.name().to_string(),
        layout: filter.name().to_string(),
        nested_checked: 0,
        entries_read: 0,
        entry_point: None,
        issues: Vec::new(),
    };

    // Unlike a launch, keep going after a bad element so every issue is listed
    let mut class_path = Vec::new();
    for entry in root.entries().filter(|e| filter.is_nested(e)) {
        if entry.is_directory() {
            class_path.push(ClassPathEntry::directory(root.clone(), &entry.name));
            continue;
        }
        match root.open(entry) {
            Ok(nested) => {
                debug!(archive = nested.name(), entries = nested.len(), "nested archive ok");
                report.nested_checked += 1;
                if args.deep {
                    report.entries_read += read_all(&nested, &mut report.issues);
                }
                class_path.push(ClassPathEntry::nested(nested));
            }
            Err(err) => report.issues.push(Issue {
                subject: entry.name.clone(),
                message: err.to_string(),
            }),
        }
    }

    match Manifest::read(root) {
        Ok(manifest) => {
            let loader = NestedModuleLoader::new(class_path, NoParent);
            if let Err(err) = loader.resolve_module(&manifest.entry_point) {
                report.issues.push(Issue {
                    subject: manifest.entry_point.clone(),
                    message: err.to_string(),
                });
            }
            report.entry_point = Some(manifest.entry_point);
        }
        Err(err) => report.issues.push(Issue {
            subject: MANIFEST_PATH.to_string(),
            message: err.to_string(),
        }),
    }

    formatter.format_verification(&report)?;

    if report.passed() {
        Ok(())
    } else {
        bail!("Archive verification failed")
    }
}

/// Reads every file entry of `archive`, recording failures. Returns the
/// number of entries read successfully.
fn read_all(archive: &Archive, issues: &mut Vec<Issue>) -> usize {
    let mut read = 0;
    for entry in archive.entries().filter(|e| e.is_file()) {
        match archive.read(entry) {
            Ok(_) => read += 1,
            Err(err) => issues.push(Issue {
                subject: format!("{}{NESTED_SEPARATOR}{}", archive.name(), entry.name),
                message: err.to_string(),
            }),
        }
    }
    read
}
