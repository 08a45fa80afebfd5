//! JSON output formatter for machine-readable results.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use super::formatter::Resolution;
use super::formatter::SearchPathListing;
use super::formatter::VerificationReport;
use anyhow::Result;
use bootpack_core::Manifest;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::io::{self};

pub struct JsonFormatter;

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_search_path(&self, listing: &SearchPathListing) -> Result<()> {
        Self::output(&JsonOutput::success("list", listing))
    }

    fn format_verification(&self, report: &VerificationReport) -> Result<()> {
        if report.passed() {
            Self::output(&JsonOutput::success("verify", report))
        } else {
            let error = format!("{} issue(s) found", report.issues.len());
            Self::output(&JsonOutput::failure("verify", report, error))
        }
    }

    fn format_resolution(&self, resolution: &Resolution) -> Result<()> {
        Self::output(&JsonOutput::success("resolve", resolution))
    }

    fn format_manifest(&self, archive: &str, manifest: &Manifest) -> Result<()> {
        #[derive(Serialize)]
        struct ManifestOutput<'a> {
            archive: &'a str,
            entry_point: &'a str,
            packaging: String,
            classpath_index: Option<&'a str>,
            attributes: BTreeMap<&'a str, &'a str>,
        }

        let data = ManifestOutput {
            archive,
            entry_point: &manifest.entry_point,
            packaging: manifest.packaging.to_string(),
            classpath_index: manifest.classpath_index.as_deref(),
            attributes: manifest.attributes.iter().collect(),
        };

        Self::output(&JsonOutput::success("manifest", data))
    }

    fn format_warning(&self, message: &str) {
        let output = serde_json::json!({
            "status": "warning",
            "message": message,
        });
        if let Ok(json) = serde_json::to_string(&output) {
            let _ = writeln!(io::stderr(), "{json}");
        }
    }
}
