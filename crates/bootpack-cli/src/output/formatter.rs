//! Output formatter trait for CLI results.

use anyhow::Result;
use bootpack_core::Manifest;
use serde::Serialize;

/// Common output formatter trait
pub trait OutputFormatter {
    /// Format the search path of a packaged archive
    fn format_search_path(&self, listing: &SearchPathListing) -> Result<()>;

    /// Format a verification report
    fn format_verification(&self, report: &VerificationReport) -> Result<()>;

    /// Format where a name was resolved
    fn format_resolution(&self, resolution: &Resolution) -> Result<()>;

    /// Format launch metadata
    fn format_manifest(&self, archive: &str, manifest: &Manifest) -> Result<()>;

    /// Format warning message
    fn format_warning(&self, message: &str);
}

/// One element of the search path.
#[derive(Debug, Serialize)]
pub struct SearchPathElement {
    pub position: usize,
    pub origin: String,
    pub kind: ElementKind,
    pub entries: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    /// The program's own module directory inside the root archive
    Directory,
    /// A nested archive
    Nested,
}

#[derive(Debug, Serialize)]
pub struct SearchPathListing {
    pub archive: String,
    pub layout: String,
    pub elements: Vec<SearchPathElement>,
}

/// A problem found by `verify`.
#[derive(Debug, Serialize)]
pub struct Issue {
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct VerificationReport {
    pub archive: String,
    pub layout: String,
    pub nested_checked: usize,
    pub entries_read: usize,
    pub entry_point: Option<String>,
    pub issues: Vec<Issue>,
}

impl VerificationReport {
    pub fn passed(&self) -> bool {
        self.issues.is_empty()
    }
}

#[derive(Debug, Serialize)]
pub struct Resolution {
    pub name: String,
    pub origin: String,
    /// Search-path position, or `None` when the parent resolver supplied it
    pub position: Option<usize>,
    pub size: usize,
}

/// Generic JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput<T> {
    pub operation: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn success(operation: impl Into<String>, data: T) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Success,
            data: Some(data),
            error: None,
        }
    }

    /// Output carrying data alongside a failure, e.g. a failed verification.
    pub fn failure(operation: impl Into<String>, data: T, error: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Error,
            data: Some(data),
            error: Some(error.into()),
        }
    }
}
