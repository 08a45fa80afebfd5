//! Test utilities for building in-memory containers.
//!
//! Compiled for this crate's own tests and, elsewhere, only with the
//! `test-utils` feature.
//!
//! # Panics
//!
//! All functions in this module may panic on I/O errors since they are
//! designed for test use only where panics are acceptable.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::io::Cursor;
use std::io::Write;

use zip::write::SimpleFileOptions;
use zip::write::ZipWriter;

/// Creates an in-memory ZIP container from a list of stored entries.
///
/// # Examples
///
/// ```
/// use bootpack_core::test_utils::create_test_zip;
///
/// let zip_data = create_test_zip(vec![("r.txt", &b"hello"[..]), ("app/A.class", &b"world"[..])]);
/// ```
#[must_use]
pub fn create_test_zip(entries: Vec<(&str, &[u8])>) -> Vec<u8> {
    entries
        .into_iter()
        .fold(ZipTestBuilder::new(), |builder, (path, data)| {
            builder.add_file(path, data)
        })
        .build()
}

/// Builder for ZIP containers, including nested containers and manifests.
///
/// # Examples
///
/// ```
/// use bootpack_core::test_utils::ZipTestBuilder;
///
/// let nested = ZipTestBuilder::new().add_file("r.txt", b"resource").build();
/// let root = ZipTestBuilder::new()
///     .add_manifest(&[("Start-Class", "com.example.App")])
///     .add_directory("BOOT-INF/classes/")
///     .add_file("BOOT-INF/classes/com/example/App.class", b"\xCA\xFE\xBA\xBE")
///     .add_file("BOOT-INF/lib/x.jar", &nested)
///     .build();
/// ```
pub struct ZipTestBuilder {
    zip: ZipWriter<Cursor<Vec<u8>>>,
}

impl ZipTestBuilder {
    /// Creates a new ZIP test builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
        }
    }

    /// Adds a stored (uncompressed) file. Nested containers must be stored.
    #[must_use]
    pub fn add_file(mut self, path: &str, data: &[u8]) -> Self {
        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored)
            .unix_permissions(0o644);

        self.zip.start_file(path, options).unwrap();
        self.zip.write_all(data).unwrap();
        self
    }

    /// Adds a deflate-compressed file.
    #[must_use]
    pub fn add_deflated_file(mut self, path: &str, data: &[u8]) -> Self {
        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .unix_permissions(0o644);

        self.zip.start_file(path, options).unwrap();
        self.zip.write_all(data).unwrap();
        self
    }

    /// Adds a directory marker.
    #[must_use]
    pub fn add_directory(mut self, path: &str) -> Self {
        let options = SimpleFileOptions::default().unix_permissions(0o755);
        self.zip.add_directory(path, options).unwrap();
        self
    }

    /// Adds `META-INF/MANIFEST.MF` with the given main attributes.
    #[must_use]
    pub fn add_manifest(self, attributes: &[(&str, &str)]) -> Self {
        let mut manifest = String::from("Manifest-Version: 1.0\r\n");
        for (key, value) in attributes {
            manifest.push_str(key);
            manifest.push_str(": ");
            manifest.push_str(value);
            manifest.push_str("\r\n");
        }
        manifest.push_str("\r\n");
        self.add_directory("META-INF/")
            .add_file("META-INF/MANIFEST.MF", manifest.as_bytes())
    }

    /// Builds and returns the ZIP data.
    #[must_use]
    pub fn build(self) -> Vec<u8> {
        self.zip.finish().unwrap().into_inner()
    }
}

impl Default for ZipTestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_zip() {
        let zip_data = create_test_zip(vec![("file.txt", &b"hello"[..])]);
        assert!(zip_data.starts_with(b"PK\x03\x04"));
    }

    #[test]
    fn test_zip_builder_with_manifest() {
        let zip_data = ZipTestBuilder::new()
            .add_manifest(&[("Start-Class", "a.B")])
            .add_directory("dir/")
            .build();
        assert!(!zip_data.is_empty());
    }
}
