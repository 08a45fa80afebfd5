//! Entry points looked up by name at launch time.
//!
//! Rust cannot link code out of archive bytes, so the program's callable
//! symbols are registered up front in a [`SymbolTable`]. The launcher first
//! resolves the entry point's module through the nested loader, which proves
//! the packaged program actually ships it, then looks the symbol up by the
//! same identifier and checks that it has the entry point shape.

use std::any::Any;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::Archive;
use crate::BoxError;
use crate::LaunchError;
use crate::Result;
use crate::loader::NestedModuleLoader;
use crate::manifest::Manifest;

/// Signature of a program entry point: `(context, argv) -> exit status`.
pub type MainFn =
    Arc<dyn Fn(&ModuleContext<'_>, &[String]) -> std::result::Result<i32, BoxError> + Send + Sync>;

const MAIN_SHAPE: &str = "fn(&ModuleContext, &[String]) -> Result<i32, BoxError>";

/// What a running entry point can see of its own packaging.
#[derive(Debug, Clone, Copy)]
pub struct ModuleContext<'a> {
    root: &'a Archive,
    loader: &'a NestedModuleLoader,
    manifest: &'a Manifest,
}

impl<'a> ModuleContext<'a> {
    /// Creates a context.
    #[must_use]
    pub const fn new(
        root: &'a Archive,
        loader: &'a NestedModuleLoader,
        manifest: &'a Manifest,
    ) -> Self {
        Self {
            root,
            loader,
            manifest,
        }
    }

    /// The root archive.
    #[must_use]
    pub const fn root(&self) -> &'a Archive {
        self.root
    }

    /// The loader built for this launch.
    #[must_use]
    pub const fn loader(&self) -> &'a NestedModuleLoader {
        self.loader
    }

    /// The root archive's launch metadata.
    #[must_use]
    pub const fn manifest(&self) -> &'a Manifest {
        self.manifest
    }

    /// Resolves a resource through the loader.
    ///
    /// # Errors
    ///
    /// Returns [`LaunchError::ResolutionFailure`] if the resource does not
    /// exist.
    pub fn resource(&self, name: &str) -> Result<Cow<'a, [u8]>> {
        self.loader.resolve(name)
    }
}

/// Named symbols exported by the packaged program.
///
/// # Examples
///
/// ```
/// use bootpack_core::SymbolTable;
///
/// let mut symbols = SymbolTable::new();
/// symbols.register_main("com.example.App", |_ctx, args| Ok(args.len() as i32));
/// symbols.register("com.example.VERSION", "1.2.3");
///
/// assert!(symbols.main("com.example.App").is_ok());
/// assert!(symbols.main("com.example.VERSION").is_err());
/// assert_eq!(symbols.get::<&str>("com.example.VERSION").ok().flatten(), Some(&"1.2.3"));
/// ```
#[derive(Default, Clone)]
pub struct SymbolTable {
    symbols: HashMap<String, Arc<dyn Any + Send + Sync>>,
}

impl SymbolTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an arbitrary symbol, replacing any previous one.
    pub fn register<T: Any + Send + Sync>(&mut self, name: impl Into<String>, value: T) -> &mut Self {
        self.symbols.insert(name.into(), Arc::new(value));
        self
    }

    /// Registers an entry point.
    pub fn register_main<F>(&mut self, name: impl Into<String>, main: F) -> &mut Self
    where
        F: Fn(&ModuleContext<'_>, &[String]) -> std::result::Result<i32, BoxError>
            + Send
            + Sync
            + 'static,
    {
        let main: MainFn = Arc::new(main);
        self.register(name, main)
    }

    /// Looks a symbol up with its expected type.
    ///
    /// Returns `Ok(None)` if no symbol has this name.
    ///
    /// # Errors
    ///
    /// Returns [`LaunchError::EntryPointMismatch`] if the symbol exists with
    /// a different type.
    pub fn get<T: Any + Send + Sync>(&self, name: &str) -> Result<Option<&T>> {
        match self.symbols.get(name) {
            None => Ok(None),
            Some(symbol) => symbol.downcast_ref::<T>().map(Some).ok_or_else(|| {
                LaunchError::EntryPointMismatch {
                    name: name.to_string(),
                    expected: std::any::type_name::<T>(),
                }
            }),
        }
    }

    /// Looks an entry point up by name.
    ///
    /// # Errors
    ///
    /// Returns [`LaunchError::ResolutionFailure`] if no symbol has this name
    /// and [`LaunchError::EntryPointMismatch`] if it is not an entry point.
    pub fn main(&self, name: &str) -> Result<MainFn> {
        match self.get::<MainFn>(name) {
            Ok(Some(main)) => Ok(Arc::clone(main)),
            Ok(None) => Err(LaunchError::ResolutionFailure {
                name: name.to_string(),
            }),
            Err(_) => Err(LaunchError::EntryPointMismatch {
                name: name.to_string(),
                expected: MAIN_SHAPE,
            }),
        }
    }

    /// Returns `true` if a symbol has this name.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    /// Number of registered symbols.
    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Returns `true` if the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.symbols.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for SymbolTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymbolTable")
            .field("names", &self.names())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_lookup_main() {
        let mut symbols = SymbolTable::new();
        symbols.register_main("a.Main", |_ctx, args| Ok(i32::try_from(args.len())?));

        assert!(symbols.contains("a.Main"));
        assert!(symbols.main("a.Main").is_ok());
        assert_eq!(symbols.len(), 1);
    }

    #[test]
    fn test_missing_symbol() {
        let symbols = SymbolTable::new();
        assert!(matches!(
            symbols.main("Missing.Main"),
            Err(LaunchError::ResolutionFailure { .. })
        ));
        assert!(symbols.get::<u32>("Missing.Main").unwrap().is_none());
    }

    #[test]
    fn test_shape_mismatch() {
        let mut symbols = SymbolTable::new();
        symbols.register("a.Main", 42_u32);

        let err = symbols.main("a.Main").err().unwrap();
        assert!(matches!(err, LaunchError::EntryPointMismatch { .. }));
        assert!(err.to_string().contains("ModuleContext"));
        assert_eq!(symbols.get::<u32>("a.Main").unwrap(), Some(&42));
    }

    #[test]
    fn test_register_replaces() {
        let mut symbols = SymbolTable::new();
        symbols.register("a", 1_u8).register("a", 2_u8);
        assert_eq!(symbols.get::<u8>("a").unwrap(), Some(&2));
    }

    #[test]
    fn test_names_sorted() {
        let mut symbols = SymbolTable::new();
        symbols.register("b", ()).register("a", ());
        assert_eq!(symbols.names(), ["a", "b"]);
        assert!(format!("{symbols:?}").contains("\"a\""));
    }
}
