//! Launch configuration.

use crate::manifest::MANIFEST_PATH;
use crate::manifest::PackagingFormat;

/// Settings for one launch.
///
/// # Examples
///
/// ```
/// use bootpack_core::LaunchConfig;
/// use bootpack_core::manifest::PackagingFormat;
///
/// // Use the archive's own metadata
/// let config = LaunchConfig::default();
///
/// // Force the war layout and a different entry point
/// let custom = LaunchConfig {
///     layout: Some(PackagingFormat::War),
///     entry_point: Some("com.example.Admin".to_string()),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchConfig {
    /// Layout override. When set, nested archives are found by prefix and
    /// any classpath index in the metadata is ignored.
    pub layout: Option<PackagingFormat>,

    /// Entry point override, used instead of the manifest's.
    pub entry_point: Option<String>,

    /// Location of the manifest inside the root archive.
    pub manifest_path: String,

    /// Report a panicking entry point as a launch failure instead of
    /// unwinding through the caller.
    pub catch_panics: bool,

    /// Exit code used when the launch fails.
    pub failure_exit_code: i32,
}

impl Default for LaunchConfig {
    /// Default values:
    /// - `layout`: `None` (read from metadata)
    /// - `entry_point`: `None` (read from metadata)
    /// - `manifest_path`: `META-INF/MANIFEST.MF`
    /// - `catch_panics`: true
    /// - `failure_exit_code`: 1
    fn default() -> Self {
        Self {
            layout: None,
            entry_point: None,
            manifest_path: MANIFEST_PATH.to_string(),
            catch_panics: true,
            failure_exit_code: 1,
        }
    }
}

impl LaunchConfig {
    /// Sets the layout override.
    #[must_use]
    pub fn with_layout(mut self, layout: PackagingFormat) -> Self {
        self.layout = Some(layout);
        self
    }

    /// Sets the entry point override.
    #[must_use]
    pub fn with_entry_point(mut self, entry_point: impl Into<String>) -> Self {
        self.entry_point = Some(entry_point.into());
        self
    }
}
