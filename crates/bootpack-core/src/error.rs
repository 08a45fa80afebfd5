//! Error types for archive launching.

use thiserror::Error;

/// Result type alias using `LaunchError`.
pub type Result<T> = std::result::Result<T, LaunchError>;

/// Boxed error raised by a launched entry point.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while opening archives or launching a program.
#[derive(Error, Debug)]
pub enum LaunchError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The bytes of an entry do not decode as a container.
    #[error("'{name}' is not a nested archive: {reason}")]
    NotAContainer {
        /// Name of the entry or archive.
        name: String,
        /// Why the bytes were rejected.
        reason: String,
    },

    /// An entry's declared byte range is inconsistent with its backing store.
    #[error(
        "corrupt entry '{name}': range {offset}+{length} exceeds {available} available bytes"
    )]
    CorruptEntry {
        /// Name of the entry.
        name: String,
        /// Declared offset of the entry data.
        offset: u64,
        /// Declared length of the entry data.
        length: u64,
        /// Bytes actually available in the backing view.
        available: u64,
    },

    /// The container directory was found but could not be decoded.
    #[error("corrupt archive '{name}': {reason}")]
    CorruptArchive {
        /// Name of the archive.
        name: String,
        /// Decoder diagnostic.
        reason: String,
    },

    /// The entry uses a compression method this loader cannot read.
    #[error("entry '{name}' uses unsupported compression method {method}")]
    UnsupportedCompression {
        /// Name of the entry.
        name: String,
        /// Raw zip compression method id.
        method: u16,
    },

    /// Launch metadata is missing or incomplete.
    #[error("missing metadata: {0}")]
    MissingMetadata(String),

    /// A required module or resource is not on the search path.
    #[error("cannot resolve '{name}' on the nested search path")]
    ResolutionFailure {
        /// Module or resource identifier.
        name: String,
    },

    /// The resolved symbol does not have the `(argv) -> exit status` shape.
    #[error("symbol '{name}' is not an entry point (expected {expected})")]
    EntryPointMismatch {
        /// Symbol name.
        name: String,
        /// Expected symbol shape.
        expected: &'static str,
    },

    /// The invoked program itself failed.
    #[error("entry point '{entry_point}' failed")]
    EntryPointFailure {
        /// Entry point identifier.
        entry_point: String,
        /// Failure raised by the program.
        #[source]
        source: BoxError,
    },
}

impl LaunchError {
    /// Returns `true` if the error means a byte range failed to decode as a
    /// container.
    ///
    /// # Examples
    ///
    /// ```
    /// use bootpack_core::LaunchError;
    ///
    /// let err = LaunchError::CorruptEntry {
    ///     name: "deps/x.jar".to_string(),
    ///     offset: 10,
    ///     length: 100,
    ///     available: 50,
    /// };
    /// assert!(err.is_corrupt_archive());
    ///
    /// let err = LaunchError::MissingMetadata("no Start-Class".to_string());
    /// assert!(!err.is_corrupt_archive());
    /// ```
    #[must_use]
    pub const fn is_corrupt_archive(&self) -> bool {
        matches!(
            self,
            Self::NotAContainer { .. } | Self::CorruptEntry { .. } | Self::CorruptArchive { .. }
        )
    }

    /// Returns `true` if the error comes from reading or decoding archive
    /// bytes rather than from resolving or running the entry point.
    ///
    /// These errors usually stop a launch while the search path is built,
    /// but a damaged entry read during resolution raises them too.
    #[must_use]
    pub const fn is_bootstrap_failure(&self) -> bool {
        matches!(
            self,
            Self::Io(_)
                | Self::NotAContainer { .. }
                | Self::CorruptEntry { .. }
                | Self::CorruptArchive { .. }
        )
    }

    /// Returns the module or symbol name the error refers to, if any.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        match self {
            Self::NotAContainer { name, .. }
            | Self::CorruptEntry { name, .. }
            | Self::CorruptArchive { name, .. }
            | Self::UnsupportedCompression { name, .. }
            | Self::ResolutionFailure { name }
            | Self::EntryPointMismatch { name, .. } => Some(name),
            Self::EntryPointFailure { entry_point, .. } => Some(entry_point),
            Self::Io(_) | Self::MissingMetadata(_) => None,
        }
    }

    /// Renders the cause chain from the outermost error to the root cause,
    /// one cause per line.
    #[must_use]
    pub fn chain(&self) -> Vec<String> {
        let mut causes = vec![self.to_string()];
        let mut source = std::error::Error::source(self);
        while let Some(err) = source {
            causes.push(err.to_string());
            source = err.source();
        }
        causes
    }
}
