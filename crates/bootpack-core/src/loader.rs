//! Module and resource resolution across nested archives.

use std::borrow::Cow;
use std::fmt;
use std::path::PathBuf;

use tracing::debug;
use tracing::trace;

use crate::Archive;
use crate::LaunchError;
use crate::Result;
use crate::archive::NESTED_SEPARATOR;
use crate::types::Entry;

/// File suffix of compiled modules.
pub const MODULE_SUFFIX: &str = ".class";

/// Fallback consulted when no nested archive holds a name.
///
/// This stands in for the platform's own module search mechanism, which is
/// what keeps the launcher itself resolvable while the program's modules
/// come from nested archives.
pub trait ParentResolver: Send + Sync {
    /// Returns the bytes for `name`, or `None` if the parent does not have
    /// it either.
    fn resolve(&self, name: &str) -> Option<Vec<u8>>;
}

impl<T: ParentResolver + ?Sized> ParentResolver for std::sync::Arc<T> {
    fn resolve(&self, name: &str) -> Option<Vec<u8>> {
        (**self).resolve(name)
    }
}

/// Parent that never resolves anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoParent;

impl ParentResolver for NoParent {
    fn resolve(&self, _name: &str) -> Option<Vec<u8>> {
        None
    }
}

/// Parent that reads names relative to a directory on disk.
#[derive(Debug, Clone)]
pub struct DirectoryResolver {
    root: PathBuf,
}

impl DirectoryResolver {
    /// Creates a resolver rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ParentResolver for DirectoryResolver {
    fn resolve(&self, name: &str) -> Option<Vec<u8>> {
        if name.split('/').any(|part| part == "..") {
            return None;
        }
        std::fs::read(self.root.join(name)).ok()
    }
}

/// Parent backed by a closure.
pub struct FnResolver<F>(F);

/// Wraps a closure as a [`ParentResolver`].
///
/// # Examples
///
/// ```
/// use bootpack_core::loader::{from_fn, ParentResolver};
///
/// let parent = from_fn(|name| (name == "bootstrap.class").then(|| vec![1, 2, 3]));
/// assert_eq!(parent.resolve("bootstrap.class"), Some(vec![1, 2, 3]));
/// assert_eq!(parent.resolve("other.class"), None);
/// ```
pub fn from_fn<F>(f: F) -> FnResolver<F>
where
    F: Fn(&str) -> Option<Vec<u8>> + Send + Sync,
{
    FnResolver(f)
}

impl<F> ParentResolver for FnResolver<F>
where
    F: Fn(&str) -> Option<Vec<u8>> + Send + Sync,
{
    fn resolve(&self, name: &str) -> Option<Vec<u8>> {
        (self.0)(name)
    }
}

/// One element of the search path.
///
/// Nested archives are searched from their root. The program's own module
/// directory is searched as a prefix of the root archive, so its children
/// are read in place without being treated as a container.
#[derive(Debug, Clone)]
pub struct ClassPathEntry {
    archive: Archive,
    prefix: String,
}

impl ClassPathEntry {
    /// A nested archive searched from its root.
    #[must_use]
    pub fn nested(archive: Archive) -> Self {
        Self {
            archive,
            prefix: String::new(),
        }
    }

    /// A directory of `archive` whose children are searched as if they were
    /// at the root. A trailing `/` is added to `prefix` when missing.
    pub fn directory(archive: Archive, prefix: impl Into<String>) -> Self {
        let mut prefix = prefix.into();
        if !prefix.is_empty() && !prefix.ends_with('/') {
            prefix.push('/');
        }
        Self { archive, prefix }
    }

    /// The archive this element reads from.
    #[must_use]
    pub fn archive(&self) -> &Archive {
        &self.archive
    }

    /// Directory prefix inside the archive; empty for nested archives.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns `true` if this element is a directory of its archive.
    #[must_use]
    pub fn is_directory(&self) -> bool {
        !self.prefix.is_empty()
    }

    /// Human-readable location, e.g. `app.jar!/BOOT-INF/lib/x.jar`.
    #[must_use]
    pub fn origin(&self) -> String {
        if self.prefix.is_empty() {
            self.archive.name().to_string()
        } else {
            format!("{}{NESTED_SEPARATOR}{}", self.archive.name(), self.prefix)
        }
    }

    /// Finds the file entry for `name` in this element.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&Entry> {
        let entry = if self.prefix.is_empty() {
            self.archive.entry(name)
        } else {
            self.archive.entry(&format!("{}{name}", self.prefix))
        };
        entry.filter(|entry| entry.is_file())
    }
}

impl fmt::Display for ClassPathEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.origin())
    }
}

/// Where a resolved name was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedFrom {
    /// Search-path element at this position.
    ClassPath(usize),
    /// The injected parent resolver.
    Parent,
}

/// Bytes of a resolved name and where they came from.
#[derive(Debug, Clone)]
pub struct Resolved<'a> {
    /// Where the bytes were found.
    pub source: ResolvedFrom,
    /// The bytes, borrowed from the archive when stored uncompressed.
    pub bytes: Cow<'a, [u8]>,
}

/// Resolver over an ordered, fixed set of nested archives.
///
/// Lookups consult the search path in construction order, first match wins,
/// then fall back to the parent resolver. The loader is immutable once built
/// and can be shared freely across threads.
///
/// # Examples
///
/// ```
/// use bootpack_core::Archive;
/// use bootpack_core::loader::{ClassPathEntry, NestedModuleLoader, NoParent};
/// use bootpack_core::test_utils::ZipTestBuilder;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let jar = Archive::from_bytes("x.jar", ZipTestBuilder::new().add_file("r.txt", b"hi").build())?;
/// let loader = NestedModuleLoader::new(vec![ClassPathEntry::nested(jar)], NoParent);
/// assert_eq!(&*loader.resolve("r.txt")?, b"hi");
/// assert!(loader.resolve("missing.txt").is_err());
/// # Ok(())
/// # }
/// ```
pub struct NestedModuleLoader {
    class_path: Vec<ClassPathEntry>,
    parent: Box<dyn ParentResolver>,
}

impl NestedModuleLoader {
    /// Creates a loader over `class_path`, in precedence order.
    pub fn new(class_path: Vec<ClassPathEntry>, parent: impl ParentResolver + 'static) -> Self {
        Self::with_boxed_parent(class_path, Box::new(parent))
    }

    /// Creates a loader with an already boxed parent.
    #[must_use]
    pub fn with_boxed_parent(
        class_path: Vec<ClassPathEntry>,
        parent: Box<dyn ParentResolver>,
    ) -> Self {
        Self { class_path, parent }
    }

    /// The search path, in precedence order.
    #[must_use]
    pub fn class_path(&self) -> &[ClassPathEntry] {
        &self.class_path
    }

    /// Finds `name` on the search path, then in the parent.
    ///
    /// A leading `/` is ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the name exists in a nested archive but its bytes
    /// cannot be read. A damaged entry is never skipped in favor of a later
    /// one.
    pub fn find(&self, name: &str) -> Result<Option<Resolved<'_>>> {
        let name = name.trim_start_matches('/');
        for (position, element) in self.class_path.iter().enumerate() {
            if let Some(entry) = element.lookup(name) {
                trace!(name, origin = %element, "resolved on nested search path");
                let bytes = element.archive().read(entry)?;
                return Ok(Some(Resolved {
                    source: ResolvedFrom::ClassPath(position),
                    bytes,
                }));
            }
        }

        debug!(name, "not on nested search path, delegating to parent");
        Ok(self.parent.resolve(name).map(|bytes| Resolved {
            source: ResolvedFrom::Parent,
            bytes: Cow::Owned(bytes),
        }))
    }

    /// Resolves `name` to its bytes.
    ///
    /// # Errors
    ///
    /// Returns [`LaunchError::ResolutionFailure`] if neither the search path
    /// nor the parent has the name.
    pub fn resolve(&self, name: &str) -> Result<Cow<'_, [u8]>> {
        self.find(name)?
            .map(|resolved| resolved.bytes)
            .ok_or_else(|| LaunchError::ResolutionFailure {
                name: name.to_string(),
            })
    }

    /// Resolves a dotted module identifier such as `com.example.App`.
    ///
    /// # Errors
    ///
    /// Returns [`LaunchError::ResolutionFailure`] naming the identifier if
    /// the module cannot be found.
    pub fn resolve_module(&self, module: &str) -> Result<Cow<'_, [u8]>> {
        self.find(&module_path(module))?
            .map(|resolved| resolved.bytes)
            .ok_or_else(|| LaunchError::ResolutionFailure {
                name: module.to_string(),
            })
    }

    /// Returns `true` if `name` is resolvable.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        let name = name.trim_start_matches('/');
        self.class_path.iter().any(|e| e.lookup(name).is_some())
            || self.parent.resolve(name).is_some()
    }
}

impl fmt::Debug for NestedModuleLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NestedModuleLoader")
            .field("class_path", &self.class_path)
            .finish_non_exhaustive()
    }
}

/// Maps a dotted module identifier to its entry name.
///
/// # Examples
///
/// ```
/// use bootpack_core::loader::module_path;
///
/// assert_eq!(module_path("com.example.App"), "com/example/App.class");
/// ```
#[must_use]
pub fn module_path(module: &str) -> String {
    format!("{}{MODULE_SUFFIX}", module.replace('.', "/"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::ZipTestBuilder;

    fn jar(name: &str, entries: &[(&str, &str)]) -> Archive {
        let data = entries
            .iter()
            .fold(ZipTestBuilder::new(), |b, (path, data)| {
                b.add_file(path, data.as_bytes())
            })
            .build();
        Archive::from_bytes(name, data).unwrap()
    }

    #[test]
    fn test_loader_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<NestedModuleLoader>();
    }

    #[test]
    fn test_first_match_wins() {
        let first = jar("a.jar", &[("r.txt", "from a")]);
        let second = jar("b.jar", &[("r.txt", "from b"), ("only-b.txt", "b")]);
        let loader = NestedModuleLoader::new(
            vec![ClassPathEntry::nested(first), ClassPathEntry::nested(second)],
            NoParent,
        );

        assert_eq!(&*loader.resolve("r.txt").unwrap(), b"from a");
        assert_eq!(&*loader.resolve("only-b.txt").unwrap(), b"b");
        let found = loader.find("only-b.txt").unwrap().unwrap();
        assert_eq!(found.source, ResolvedFrom::ClassPath(1));
    }

    #[test]
    fn test_directory_prefix() {
        let root = jar(
            "app.jar",
            &[
                ("BOOT-INF/classes/com/example/App.class", "app"),
                ("com/example/App.class", "shadow"),
            ],
        );
        let loader = NestedModuleLoader::new(
            vec![ClassPathEntry::directory(root, "BOOT-INF/classes")],
            NoParent,
        );

        assert_eq!(&*loader.resolve_module("com.example.App").unwrap(), b"app");
        assert_eq!(loader.class_path()[0].origin(), "app.jar!/BOOT-INF/classes/");
        assert!(loader.class_path()[0].is_directory());
    }

    #[test]
    fn test_parent_fallback() {
        let loader = NestedModuleLoader::new(
            vec![ClassPathEntry::nested(jar("a.jar", &[("r.txt", "a")]))],
            from_fn(|name| (name == "launcher.class").then(|| b"boot".to_vec())),
        );

        let found = loader.find("launcher.class").unwrap().unwrap();
        assert_eq!(found.source, ResolvedFrom::Parent);
        assert_eq!(&*found.bytes, b"boot");
        assert!(loader.contains("launcher.class"));
        assert!(!loader.contains("nothing.class"));
    }

    #[test]
    fn test_nested_beats_parent() {
        let loader = NestedModuleLoader::new(
            vec![ClassPathEntry::nested(jar("a.jar", &[("r.txt", "nested")]))],
            from_fn(|_| Some(b"parent".to_vec())),
        );
        assert_eq!(&*loader.resolve("r.txt").unwrap(), b"nested");
    }

    #[test]
    fn test_resolution_failure_names_module() {
        let loader = NestedModuleLoader::new(Vec::new(), NoParent);
        let err = loader.resolve_module("Missing.Main").unwrap_err();
        assert!(matches!(err, LaunchError::ResolutionFailure { ref name } if name == "Missing.Main"));
    }

    #[test]
    fn test_leading_slash_ignored() {
        let loader = NestedModuleLoader::new(
            vec![ClassPathEntry::nested(jar("a.jar", &[("r.txt", "a")]))],
            NoParent,
        );
        assert_eq!(&*loader.resolve("/r.txt").unwrap(), b"a");
    }

    #[test]
    fn test_directories_do_not_resolve() {
        let data = ZipTestBuilder::new().add_directory("conf/").build();
        let archive = Archive::from_bytes("a.jar", data).unwrap();
        let loader = NestedModuleLoader::new(vec![ClassPathEntry::nested(archive)], NoParent);
        assert!(loader.find("conf/").unwrap().is_none());
    }

    #[test]
    fn test_directory_resolver() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::write(temp.path().join("boot.class"), b"boot").unwrap();
        let parent = DirectoryResolver::new(temp.path());

        assert_eq!(parent.resolve("boot.class"), Some(b"boot".to_vec()));
        assert_eq!(parent.resolve("../boot.class"), None);
        assert_eq!(parent.resolve("missing.class"), None);
    }
}
