//! Archive entry descriptor.

/// Kind of item stored in an archive.
///
/// # Examples
///
/// ```
/// use bootpack_core::types::EntryKind;
///
/// assert_eq!(EntryKind::from_name("BOOT-INF/classes/"), EntryKind::Directory);
/// assert_eq!(EntryKind::from_name("BOOT-INF/lib/a.jar"), EntryKind::File);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// Leaf data.
    File,

    /// Directory marker. Directories carry no data of their own.
    Directory,
}

impl EntryKind {
    /// Infers the kind from a forward-slash entry name.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        if name.ends_with('/') {
            Self::Directory
        } else {
            Self::File
        }
    }

    /// Returns `true` if this is a regular file.
    #[must_use]
    pub const fn is_file(self) -> bool {
        matches!(self, Self::File)
    }

    /// Returns `true` if this is a directory marker.
    #[must_use]
    pub const fn is_directory(self) -> bool {
        matches!(self, Self::Directory)
    }
}

/// How the bytes of an entry are encoded inside the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Compression {
    /// Raw bytes. Stored entries can be read and opened in place.
    Stored,

    /// Raw deflate stream.
    Deflated,

    /// Any other zip compression method, by id.
    Other(u16),
}

impl Compression {
    /// Maps a raw zip compression method id.
    #[must_use]
    pub const fn from_method(method: u16) -> Self {
        match method {
            0 => Self::Stored,
            8 => Self::Deflated,
            other => Self::Other(other),
        }
    }

    /// Returns the raw zip compression method id.
    #[must_use]
    pub const fn method(self) -> u16 {
        match self {
            Self::Stored => 0,
            Self::Deflated => 8,
            Self::Other(method) => method,
        }
    }
}

/// Offset and length of an entry's encoded bytes within its archive view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ByteRange {
    /// Offset from the start of the owning archive view.
    pub offset: u64,
    /// Number of encoded bytes.
    pub length: u64,
}

impl ByteRange {
    /// Creates a new range.
    #[must_use]
    pub const fn new(offset: u64, length: u64) -> Self {
        Self { offset, length }
    }

    /// Returns the exclusive end of the range, or `None` on overflow.
    #[must_use]
    pub const fn end(self) -> Option<u64> {
        self.offset.checked_add(self.length)
    }

    /// Returns `true` if the range lies within `available` bytes.
    #[must_use]
    pub fn fits_within(self, available: u64) -> bool {
        self.end().is_some_and(|end| end <= available)
    }
}

/// One named item inside an archive.
///
/// Names always use `/` as the separator regardless of host platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Entry {
    /// Full path of the entry inside its archive.
    pub name: String,
    /// File or directory marker.
    pub kind: EntryKind,
    /// Encoded bytes within the owning archive view.
    pub range: ByteRange,
    /// Encoding of the bytes in `range`.
    pub compression: Compression,
    /// Decoded size in bytes.
    pub size: u64,
}

impl Entry {
    /// Creates a stored file entry.
    #[must_use]
    pub fn file(name: impl Into<String>, range: ByteRange) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::File,
            range,
            compression: Compression::Stored,
            size: range.length,
        }
    }

    /// Creates a directory marker. A trailing `/` is added when missing.
    #[must_use]
    pub fn directory(name: impl Into<String>) -> Self {
        let mut name = name.into();
        if !name.ends_with('/') {
            name.push('/');
        }
        Self {
            name,
            kind: EntryKind::Directory,
            range: ByteRange::default(),
            compression: Compression::Stored,
            size: 0,
        }
    }

    /// Returns `true` if this entry is a directory marker.
    #[must_use]
    pub const fn is_directory(&self) -> bool {
        self.kind.is_directory()
    }

    /// Returns `true` if this entry holds data.
    #[must_use]
    pub const fn is_file(&self) -> bool {
        self.kind.is_file()
    }

    /// Returns the last path component, without any trailing `/`.
    #[must_use]
    pub fn file_name(&self) -> &str {
        let trimmed = self.name.trim_end_matches('/');
        trimmed.rsplit('/').next().unwrap_or(trimmed)
    }
}
