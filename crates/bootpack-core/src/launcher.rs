//! Launch orchestration.
//!
//! A launch walks through [`LaunchState`] in order and never goes back:
//!
//! 1. `Created`: the root archive is open.
//! 2. `ArchivesEnumerated`: every root entry accepted by the layout filter is
//!    turned into a search-path element, in enumeration order.
//! 3. `LoaderBuilt`: the nested loader is constructed over that search path.
//! 4. `EntryPointInvoked`: the entry point named in the metadata is resolved
//!    through the loader and called with the process arguments.
//!
//! Any failure is final. Nothing is retried and no partial launch is
//! attempted.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::Archive;
use crate::LaunchConfig;
use crate::LaunchError;
use crate::Result;
use crate::filter::ArchiveFilter;
use crate::filter::IndexedLayout;
use crate::loader::ClassPathEntry;
use crate::loader::NestedModuleLoader;
use crate::loader::NoParent;
use crate::loader::ParentResolver;
use crate::manifest::CLASSPATH_INDEX;
use crate::manifest::Manifest;
use crate::manifest::packaging_of;
use crate::manifest::read_attributes;
use crate::report::LaunchResult;
use crate::report::LaunchState;
use crate::symbols::ModuleContext;
use crate::symbols::SymbolTable;

/// Bootstraps a packaged program from its root archive.
///
/// # Examples
///
/// ```
/// use bootpack_core::{Archive, LaunchConfig, Launcher, SymbolTable};
/// use bootpack_core::test_utils::ZipTestBuilder;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let root = ZipTestBuilder::new()
///     .add_manifest(&[("Start-Class", "com.example.App")])
///     .add_directory("BOOT-INF/classes/")
///     .add_file("BOOT-INF/classes/com/example/App.class", b"\xCA\xFE\xBA\xBE")
///     .build();
///
/// let mut symbols = SymbolTable::new();
/// symbols.register_main("com.example.App", |_ctx, _args| Ok(0));
///
/// let launcher = Launcher::new(Archive::from_bytes("app.jar", root)?, LaunchConfig::default())?;
/// let result = launcher.launch(&[], &symbols);
/// assert!(result.is_completed());
/// # Ok(())
/// # }
/// ```
pub struct Launcher {
    root: Archive,
    filter: Box<dyn ArchiveFilter>,
    parent: Arc<dyn ParentResolver>,
    config: LaunchConfig,
    state: LaunchState,
}

impl Launcher {
    /// Creates a launcher whose layout is chosen from the configuration or,
    /// failing that, the root archive's metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if the metadata names an unknown layout or a
    /// classpath index that cannot be read.
    pub fn new(root: Archive, config: LaunchConfig) -> Result<Self> {
        let filter = select_filter(&root, &config)?;
        Ok(Self::with_filter(root, filter, config))
    }

    /// Creates a launcher with an explicit layout filter.
    #[must_use]
    pub fn with_filter(root: Archive, filter: Box<dyn ArchiveFilter>, config: LaunchConfig) -> Self {
        debug!(archive = root.name(), layout = filter.name(), "launcher created");
        Self {
            root,
            filter,
            parent: Arc::new(NoParent),
            config,
            state: LaunchState::Created,
        }
    }

    /// Sets the resolver consulted when no nested archive has a name.
    #[must_use]
    pub fn with_parent(mut self, parent: impl ParentResolver + 'static) -> Self {
        self.parent = Arc::new(parent);
        self
    }

    /// Current stage.
    #[must_use]
    pub const fn state(&self) -> LaunchState {
        self.state
    }

    /// The root archive.
    #[must_use]
    pub const fn root(&self) -> &Archive {
        &self.root
    }

    /// The layout filter in use.
    #[must_use]
    pub fn filter(&self) -> &dyn ArchiveFilter {
        self.filter.as_ref()
    }

    /// Classifies the root entries and opens every accepted file entry as a
    /// nested archive, in enumeration order.
    ///
    /// # Errors
    ///
    /// Returns an error if an accepted entry is not a valid nested archive.
    pub fn class_path(&mut self) -> Result<Vec<ClassPathEntry>> {
        let mut class_path = Vec::new();
        for entry in self.root.entries() {
            if !self.filter.is_nested(entry) {
                continue;
            }
            if entry.is_directory() {
                debug!(entry = %entry.name, "module root on search path");
                class_path.push(ClassPathEntry::directory(self.root.clone(), &entry.name));
            } else {
                debug!(entry = %entry.name, "nested archive on search path");
                class_path.push(ClassPathEntry::nested(self.root.open(entry)?));
            }
        }
        self.advance(LaunchState::ArchivesEnumerated);
        info!(
            archive = self.root.name(),
            layout = self.filter.name(),
            elements = class_path.len(),
            "search path enumerated"
        );
        Ok(class_path)
    }

    /// Builds the nested loader over the search path.
    ///
    /// # Errors
    ///
    /// Returns an error if the search path cannot be enumerated.
    pub fn build_loader(&mut self) -> Result<NestedModuleLoader> {
        let class_path = self.class_path()?;
        let loader = NestedModuleLoader::new(class_path, Arc::clone(&self.parent));
        self.advance(LaunchState::LoaderBuilt);
        Ok(loader)
    }

    /// Runs the launch to completion.
    ///
    /// `args` are passed to the entry point unchanged.
    #[must_use]
    pub fn launch(mut self, args: &[String], symbols: &SymbolTable) -> LaunchResult {
        match self.run(args, symbols) {
            Ok(exit_code) => {
                info!(exit_code, "entry point returned");
                LaunchResult::completed(exit_code)
            }
            Err(failure) => {
                warn!(reached = %self.state, error = %failure, "launch failed");
                LaunchResult::failed(failure, self.state, self.config.failure_exit_code)
            }
        }
    }

    fn run(&mut self, args: &[String], symbols: &SymbolTable) -> Result<i32> {
        let loader = self.build_loader()?;
        let manifest = Manifest::read_from(&self.root, &self.config.manifest_path)?;
        let entry_point = self
            .config
            .entry_point
            .clone()
            .unwrap_or_else(|| manifest.entry_point.clone());

        loader.resolve_module(&entry_point)?;
        let main = symbols.main(&entry_point)?;

        self.advance(LaunchState::EntryPointInvoked);
        info!(entry_point = %entry_point, args = args.len(), "invoking entry point");
        let context = ModuleContext::new(&self.root, &loader, &manifest);
        let outcome = if self.config.catch_panics {
            std::panic::catch_unwind(AssertUnwindSafe(|| main(&context, args)))
                .unwrap_or_else(|payload| Err(Panicked::from_payload(payload.as_ref()).into()))
        } else {
            main(&context, args)
        };

        outcome.map_err(|source| LaunchError::EntryPointFailure {
            entry_point,
            source,
        })
    }

    fn advance(&mut self, next: LaunchState) {
        debug!(from = %self.state, to = %next, "launch state");
        self.state = next;
    }
}

impl std::fmt::Debug for Launcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Launcher")
            .field("root", &self.root.name())
            .field("layout", &self.filter.name())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// Chooses the layout filter for `root`.
///
/// A layout override in `config` wins. Otherwise a `Classpath-Index`
/// attribute selects an [`IndexedLayout`], and without one the packaging
/// format decides.
///
/// # Errors
///
/// Returns [`LaunchError::MissingMetadata`] if the named index entry does not
/// exist or the packaging format is unknown.
pub fn select_filter(root: &Archive, config: &LaunchConfig) -> Result<Box<dyn ArchiveFilter>> {
    if let Some(layout) = config.layout {
        return Ok(layout.filter());
    }

    let attributes = read_attributes(root, &config.manifest_path)?.unwrap_or_default();
    let packaging = packaging_of(root, &attributes)?;
    let Some(index) = attributes.get(CLASSPATH_INDEX) else {
        return Ok(packaging.filter());
    };

    let listed = root.read_name(index)?.ok_or_else(|| {
        LaunchError::MissingMetadata(format!(
            "classpath index '{index}' not found in '{}'",
            root.name()
        ))
    })?;
    let listed = IndexedLayout::parse_index(&String::from_utf8_lossy(&listed));
    Ok(Box::new(IndexedLayout::new(packaging.module_root(), listed)))
}

/// Launches the program packaged in the running executable.
///
/// Arguments after the program name are passed to the entry point. On
/// failure the cause chain is written to standard error and a non-zero
/// status is returned.
///
/// ```no_run
/// use std::process::ExitCode;
///
/// use bootpack_core::SymbolTable;
///
/// fn main() -> ExitCode {
///     let mut symbols = SymbolTable::new();
///     symbols.register_main("com.example.App", |ctx, _args| {
///         let banner = ctx.resource("banner.txt")?;
///         println!("{}", String::from_utf8_lossy(&banner));
///         Ok(0)
///     });
///     bootpack_core::bootstrap(&symbols)
/// }
/// ```
#[must_use]
pub fn bootstrap(symbols: &SymbolTable) -> ExitCode {
    bootstrap_with(symbols, LaunchConfig::default())
}

/// [`bootstrap`] with explicit configuration.
#[must_use]
pub fn bootstrap_with(symbols: &SymbolTable, config: LaunchConfig) -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = launch_root(Archive::current_exe(), &args, symbols, config);

    // Nothing sensible is left to do if stderr itself is gone.
    let _ = result.report(&mut std::io::stderr().lock());
    result.exit_code()
}

/// Launches the program packaged in the archive at `path`.
///
/// This is what [`bootstrap_with`] does for the running executable, minus
/// argument collection and reporting. Failures to read or decode the root
/// are returned with [`LaunchState::Created`] as the state reached.
pub fn launch_path<P: AsRef<Path>>(
    path: P,
    args: &[String],
    symbols: &SymbolTable,
    config: LaunchConfig,
) -> LaunchResult {
    launch_root(Archive::from_path(path), args, symbols, config)
}

fn launch_root(
    root: Result<Archive>,
    args: &[String],
    symbols: &SymbolTable,
    config: LaunchConfig,
) -> LaunchResult {
    let failure_exit_code = config.failure_exit_code;
    root.and_then(|root| Launcher::new(root, config))
        .map_or_else(
            |err| {
                warn!(error = %err, "cannot open root archive");
                LaunchResult::failed(err, LaunchState::Created, failure_exit_code)
            },
            |launcher| launcher.launch(args, symbols),
        )
}

/// Panic raised by an entry point.
#[derive(Debug)]
struct Panicked(String);

impl Panicked {
    fn from_payload(payload: &(dyn Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        Self(message)
    }
}

impl std::fmt::Display for Panicked {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "panicked: {}", self.0)
    }
}

impl std::error::Error for Panicked {}
