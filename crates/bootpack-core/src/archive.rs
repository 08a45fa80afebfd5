//! Read-only archives over shared byte views.

use std::borrow::Cow;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use flate2::read::DeflateDecoder;
use tracing::debug;

use crate::LaunchError;
use crate::Result;
use crate::data::ByteView;
use crate::formats::ContainerDecoder;
use crate::formats::ZipDecoder;
use crate::types::Compression;
use crate::types::Entry;

/// Separator used in the display name of nested archives.
pub const NESTED_SEPARATOR: &str = "!/";

/// Upper bound on how far one byte of deflate input can expand.
const MAX_DEFLATE_RATIO: u64 = 1032;

/// A read-only, enumerable container of named entries.
///
/// The entry index is decoded once when the archive is constructed and shared
/// by every clone. Nested archives opened with [`Archive::open`] read from
/// the same backing store as their parent; no bytes are copied or written to
/// disk, and nesting depth is not limited.
///
/// # Examples
///
/// ```
/// use bootpack_core::Archive;
/// use bootpack_core::test_utils::ZipTestBuilder;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let nested = ZipTestBuilder::new().add_file("r.txt", b"hello").build();
/// let root = ZipTestBuilder::new().add_file("deps/x.jar", &nested).build();
///
/// let root = Archive::from_bytes("app.jar", root)?;
/// let jar = root.entry("deps/x.jar").ok_or("missing")?;
/// let nested = root.open(jar)?;
/// let resource = nested.entry("r.txt").ok_or("missing")?;
/// assert_eq!(&*nested.read(resource)?, b"hello");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Archive {
    inner: Arc<ArchiveInner>,
}

#[derive(Debug)]
struct ArchiveInner {
    name: String,
    data: ByteView,
    decoder: Arc<dyn ContainerDecoder>,
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
    depth: usize,
}

impl Archive {
    /// Decodes an archive from a view using the given decoder.
    ///
    /// # Errors
    ///
    /// Returns an error if the decoder rejects the bytes.
    pub fn from_view(
        name: impl Into<String>,
        data: ByteView,
        decoder: Arc<dyn ContainerDecoder>,
    ) -> Result<Self> {
        Self::decode(name.into(), data, decoder, 0)
    }

    /// Decodes a ZIP archive from an owned buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a valid ZIP container.
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Result<Self> {
        Self::from_view(name, ByteView::from_vec(bytes), Arc::new(ZipDecoder))
    }

    /// Reads a ZIP archive from disk. The file is read once and held in
    /// memory for the lifetime of the archive and everything opened from it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid ZIP
    /// container.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        Self::from_bytes(path.display().to_string(), bytes)
    }

    /// Opens the running program's own executable as an archive.
    ///
    /// # Errors
    ///
    /// Returns an error if the executable cannot be located or does not carry
    /// a ZIP payload.
    pub fn current_exe() -> Result<Self> {
        let exe = std::env::current_exe()?;
        Self::from_path(exe)
    }

    fn decode(
        name: String,
        data: ByteView,
        decoder: Arc<dyn ContainerDecoder>,
        depth: usize,
    ) -> Result<Self> {
        let entries = decoder.decode(&name, &data)?;
        let mut index = HashMap::with_capacity(entries.len());
        for (position, entry) in entries.iter().enumerate() {
            index.entry(entry.name.clone()).or_insert(position);
        }
        debug!(
            archive = %name,
            format = decoder.format_name(),
            entries = entries.len(),
            depth,
            "decoded archive"
        );
        Ok(Self {
            inner: Arc::new(ArchiveInner {
                name,
                data,
                decoder,
                entries,
                index,
                depth,
            }),
        })
    }

    /// Returns the display name. Nested archives are named
    /// `parent!/entry`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Returns the view this archive reads from.
    #[must_use]
    pub fn data(&self) -> &ByteView {
        &self.inner.data
    }

    /// Number of nesting levels below the root archive.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.inner.depth
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.entries.len()
    }

    /// Returns `true` if the archive has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.entries.is_empty()
    }

    /// Iterates over all entries in container order. Every call starts a
    /// fresh pass over the same cached index.
    pub fn entries(&self) -> std::slice::Iter<'_, Entry> {
        self.inner.entries.iter()
    }

    /// Looks an entry up by its exact name. When a name occurs more than once
    /// the first occurrence wins.
    #[must_use]
    pub fn entry(&self, name: &str) -> Option<&Entry> {
        self.inner
            .index
            .get(name)
            .map(|&position| &self.inner.entries[position])
    }

    /// Returns `true` if an entry with this exact name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.inner.index.contains_key(name)
    }

    /// Opens a file entry whose bytes are themselves a container.
    ///
    /// The nested archive shares this archive's backing store.
    ///
    /// # Errors
    ///
    /// Returns [`LaunchError::NotAContainer`] if the entry is a directory, is
    /// compressed, or does not decode as a container, and
    /// [`LaunchError::CorruptEntry`] if its range exceeds this archive.
    pub fn open(&self, entry: &Entry) -> Result<Self> {
        let nested_name = format!("{}{NESTED_SEPARATOR}{}", self.name(), entry.name);
        if entry.is_directory() {
            return Err(LaunchError::NotAContainer {
                name: nested_name,
                reason: "entry is a directory".to_string(),
            });
        }
        if entry.compression != Compression::Stored {
            return Err(LaunchError::NotAContainer {
                name: nested_name,
                reason: "compressed entries cannot be opened in place".to_string(),
            });
        }

        let view = self.inner.data.slice(&entry.name, entry.range)?;
        Self::decode(
            nested_name,
            view,
            Arc::clone(&self.inner.decoder),
            self.inner.depth + 1,
        )
    }

    /// Reads the decoded bytes of a file entry.
    ///
    /// Stored entries are borrowed straight from the backing store; deflated
    /// entries are inflated into a new buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the range is inconsistent, the compression method
    /// is unsupported, or the deflate stream is damaged. A deflated entry
    /// that inflates to more or fewer bytes than its declared size is
    /// [`LaunchError::CorruptArchive`].
    pub fn read(&self, entry: &Entry) -> Result<Cow<'_, [u8]>> {
        let raw = self.raw(entry)?;
        match entry.compression {
            Compression::Stored => Ok(Cow::Borrowed(raw)),
            Compression::Deflated => {
                // Declared sizes are untrusted; reading one byte past them
                // detects an overrun.
                let capacity = entry
                    .size
                    .min((raw.len() as u64).saturating_mul(MAX_DEFLATE_RATIO));
                let mut out = Vec::with_capacity(usize::try_from(capacity).unwrap_or(0));
                DeflateDecoder::new(raw)
                    .take(entry.size.saturating_add(1))
                    .read_to_end(&mut out)
                    .map_err(|e| LaunchError::CorruptArchive {
                        name: self.name().to_string(),
                        reason: format!("cannot inflate '{}': {e}", entry.name),
                    })?;
                if out.len() as u64 != entry.size {
                    return Err(LaunchError::CorruptArchive {
                        name: self.name().to_string(),
                        reason: format!(
                            "'{}' inflated to {} bytes, expected {}",
                            entry.name,
                            out.len(),
                            entry.size
                        ),
                    });
                }
                Ok(Cow::Owned(out))
            }
            Compression::Other(method) => Err(LaunchError::UnsupportedCompression {
                name: entry.name.clone(),
                method,
            }),
        }
    }

    /// Reads an entry by name, returning `None` when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry exists but cannot be read.
    pub fn read_name(&self, name: &str) -> Result<Option<Cow<'_, [u8]>>> {
        match self.entry(name) {
            Some(entry) => self.read(entry).map(Some),
            None => Ok(None),
        }
    }

    fn raw(&self, entry: &Entry) -> Result<&[u8]> {
        let data = self.inner.data.as_slice();
        let available = data.len() as u64;
        let bounds = entry
            .range
            .fits_within(available)
            .then(|| {
                let start = usize::try_from(entry.range.offset).ok()?;
                let len = usize::try_from(entry.range.length).ok()?;
                Some(start..start + len)
            })
            .flatten();
        bounds
            .map(|bounds| &data[bounds])
            .ok_or_else(|| LaunchError::CorruptEntry {
                name: entry.name.clone(),
                offset: entry.range.offset,
                length: entry.range.length,
                available,
            })
    }
}
