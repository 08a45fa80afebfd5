//! Classification of archive entries into the program's search path.
//!
//! A launcher variant supplies exactly one [`ArchiveFilter`]. The filter only
//! decides membership; the order of the resulting search path is always the
//! enumeration order of the root archive.

use std::collections::HashSet;

use crate::types::Entry;

/// Application classes directory of the jar layout.
pub const JAR_CLASSES: &str = "BOOT-INF/classes/";
/// Dependency directory of the jar layout.
pub const JAR_LIB: &str = "BOOT-INF/lib/";
/// Application classes directory of the war layout.
pub const WAR_CLASSES: &str = "WEB-INF/classes/";
/// Dependency directory of the war layout.
pub const WAR_LIB: &str = "WEB-INF/lib/";
/// Container-provided dependency directory of the war layout.
pub const WAR_LIB_PROVIDED: &str = "WEB-INF/lib-provided/";

/// Pure predicate selecting the entries that make up the search path.
pub trait ArchiveFilter: Send + Sync {
    /// Returns `true` if `entry` belongs on the search path.
    fn is_nested(&self, entry: &Entry) -> bool;

    /// Short name of the layout, used in diagnostics.
    fn name(&self) -> &str;
}

/// Returns `true` if `entry` is the directory marker named exactly `root`.
///
/// # Examples
///
/// ```
/// use bootpack_core::filter::is_own_module_root;
/// use bootpack_core::types::Entry;
///
/// assert!(is_own_module_root(&Entry::directory("BOOT-INF/classes/"), "BOOT-INF/classes/"));
/// assert!(!is_own_module_root(&Entry::directory("BOOT-INF/classes/com/"), "BOOT-INF/classes/"));
/// ```
#[must_use]
pub fn is_own_module_root(entry: &Entry, root: &str) -> bool {
    entry.is_directory() && entry.name == root
}

/// Returns `true` if `entry` is a file whose name starts with `prefix`.
#[must_use]
pub fn is_dependency_module(entry: &Entry, prefix: &str) -> bool {
    entry.is_file() && entry.name.starts_with(prefix)
}

/// Executable jar layout: `BOOT-INF/classes/` plus every file under
/// `BOOT-INF/lib/`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JarLayout;

impl ArchiveFilter for JarLayout {
    fn is_nested(&self, entry: &Entry) -> bool {
        if entry.is_directory() {
            return is_own_module_root(entry, JAR_CLASSES);
        }
        is_dependency_module(entry, JAR_LIB)
    }

    fn name(&self) -> &str {
        "jar"
    }
}

/// Executable war layout: `WEB-INF/classes/` plus every file under
/// `WEB-INF/lib/` and `WEB-INF/lib-provided/`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WarLayout;

impl ArchiveFilter for WarLayout {
    fn is_nested(&self, entry: &Entry) -> bool {
        if entry.is_directory() {
            return is_own_module_root(entry, WAR_CLASSES);
        }
        is_dependency_module(entry, WAR_LIB) || is_dependency_module(entry, WAR_LIB_PROVIDED)
    }

    fn name(&self) -> &str {
        "war"
    }
}

/// Layout whose nested archives are listed explicitly in the launch
/// metadata instead of being found by prefix.
///
/// The own-module root is still matched by name.
#[derive(Debug, Clone)]
pub struct IndexedLayout {
    module_root: String,
    listed: HashSet<String>,
}

impl IndexedLayout {
    /// Creates a layout that accepts `module_root` and the listed entries.
    pub fn new<I, S>(module_root: impl Into<String>, listed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            module_root: module_root.into(),
            listed: listed.into_iter().map(Into::into).collect(),
        }
    }

    /// Parses a classpath index.
    ///
    /// Each non-blank line names one nested archive, optionally written as a
    /// YAML list item (`- "BOOT-INF/lib/x.jar"`).
    ///
    /// # Examples
    ///
    /// ```
    /// use bootpack_core::filter::IndexedLayout;
    ///
    /// let listed = IndexedLayout::parse_index("- \"BOOT-INF/lib/a.jar\"\n- \"BOOT-INF/lib/b.jar\"\n");
    /// assert_eq!(listed, ["BOOT-INF/lib/a.jar", "BOOT-INF/lib/b.jar"]);
    /// ```
    #[must_use]
    pub fn parse_index(index: &str) -> Vec<String> {
        index
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(|line| {
                let line = line.strip_prefix('-').map_or(line, str::trim_start);
                line.trim_matches('"').to_string()
            })
            .filter(|line| !line.is_empty())
            .collect()
    }

    /// Number of explicitly listed entries.
    #[must_use]
    pub fn listed_len(&self) -> usize {
        self.listed.len()
    }
}

impl ArchiveFilter for IndexedLayout {
    fn is_nested(&self, entry: &Entry) -> bool {
        if entry.is_directory() {
            return is_own_module_root(entry, &self.module_root);
        }
        self.listed.contains(&entry.name)
    }

    fn name(&self) -> &str {
        "indexed"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ByteRange;

    fn file(name: &str) -> Entry {
        Entry::file(name, ByteRange::new(0, 1))
    }

    #[test]
    fn test_jar_layout() {
        let layout = JarLayout;
        assert!(layout.is_nested(&Entry::directory("BOOT-INF/classes/")));
        assert!(layout.is_nested(&file("BOOT-INF/lib/spring-core.jar")));
        assert!(!layout.is_nested(&Entry::directory("BOOT-INF/lib/")));
        assert!(!layout.is_nested(&Entry::directory("BOOT-INF/classes/com/")));
        assert!(!layout.is_nested(&file("BOOT-INF/classes/com/App.class")));
        assert!(!layout.is_nested(&file("META-INF/MANIFEST.MF")));
        assert!(!layout.is_nested(&file("WEB-INF/lib/a.jar")));
    }

    #[test]
    fn test_war_layout() {
        let layout = WarLayout;
        assert!(layout.is_nested(&Entry::directory("WEB-INF/classes/")));
        assert!(layout.is_nested(&file("WEB-INF/lib/a.jar")));
        assert!(layout.is_nested(&file("WEB-INF/lib-provided/servlet.jar")));
        assert!(!layout.is_nested(&file("BOOT-INF/lib/a.jar")));
        assert!(!layout.is_nested(&file("index.html")));
    }

    #[test]
    fn test_prefix_requires_file() {
        assert!(!is_dependency_module(&Entry::directory("BOOT-INF/lib/sub/"), JAR_LIB));
        assert!(is_dependency_module(&file("BOOT-INF/lib/sub/a.jar"), JAR_LIB));
    }

    #[test]
    fn test_root_requires_directory() {
        let entry = Entry {
            kind: crate::types::EntryKind::File,
            ..Entry::directory("BOOT-INF/classes/")
        };
        assert!(!is_own_module_root(&entry, JAR_CLASSES));
    }

    #[test]
    fn test_indexed_layout() {
        let layout = IndexedLayout::new(JAR_CLASSES, ["BOOT-INF/lib/b.jar"]);
        assert!(layout.is_nested(&Entry::directory(JAR_CLASSES)));
        assert!(layout.is_nested(&file("BOOT-INF/lib/b.jar")));
        assert!(!layout.is_nested(&file("BOOT-INF/lib/a.jar")));
        assert_eq!(layout.listed_len(), 1);
        assert_eq!(layout.name(), "indexed");
    }

    #[test]
    fn test_parse_index_plain_lines() {
        let listed = IndexedLayout::parse_index("\n# comment\nBOOT-INF/lib/a.jar\r\n  \n");
        assert_eq!(listed, ["BOOT-INF/lib/a.jar"]);
    }
}
