//! Launcher for programs packaged as a single self-contained archive.
//!
//! `bootpack-core` runs a program whose modules and dependencies are stored
//! as archives nested inside one root archive, without extracting anything
//! to disk. Nested archives are opened as windows into the root archive's
//! bytes; stored entries are read in place.
//!
//! # Examples
//!
//! ```no_run
//! use bootpack_core::Archive;
//! use bootpack_core::LaunchConfig;
//! use bootpack_core::Launcher;
//! use bootpack_core::SymbolTable;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut symbols = SymbolTable::new();
//! symbols.register_main("com.example.App", |_ctx, args| {
//!     println!("started with {args:?}");
//!     Ok(0)
//! });
//!
//! let root = Archive::from_path("app.jar")?;
//! let result = Launcher::new(root, LaunchConfig::default())?.launch(&[], &symbols);
//! result.report(&mut std::io::stderr())?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod archive;
pub mod config;
pub mod data;
pub mod error;
pub mod filter;
pub mod formats;
pub mod launcher;
pub mod loader;
pub mod manifest;
pub mod report;
pub mod symbols;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
pub mod types;

// Re-export main API types
pub use archive::Archive;
pub use config::LaunchConfig;
pub use error::BoxError;
pub use error::LaunchError;
pub use error::Result;
pub use launcher::Launcher;
pub use launcher::bootstrap;
pub use launcher::bootstrap_with;
pub use launcher::launch_path;
pub use loader::NestedModuleLoader;
pub use manifest::Manifest;
pub use manifest::PackagingFormat;
pub use report::LaunchResult;
pub use report::LaunchState;
pub use symbols::MainFn;
pub use symbols::ModuleContext;
pub use symbols::SymbolTable;

// Re-export entry descriptors for easier access
pub use types::ByteRange;
pub use types::Entry;
pub use types::EntryKind;
