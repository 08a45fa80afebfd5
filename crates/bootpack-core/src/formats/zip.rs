//! ZIP container decoder.
//!
//! Central directory parsing is delegated to the `zip` crate. The local file
//! header of every entry is then read directly so that each [`Entry`] carries
//! the exact range of its data, which lets stored entries be read and opened
//! in place.
//!
//! Data prepended to a container (an executable stub, for instance) is
//! located from the last end-of-central-directory record: the directory's
//! declared size and offset tell how far the container starts into the view.
//! Entry ranges are always relative to the view that was decoded.

use std::io::Cursor;

use tracing::trace;
use zip::read::ArchiveOffset;
use zip::read::Config;
use zip::result::ZipError;

use super::traits::ContainerDecoder;
use crate::LaunchError;
use crate::Result;
use crate::data::ByteView;
use crate::types::ByteRange;
use crate::types::Compression;
use crate::types::Entry;
use crate::types::EntryKind;

const LOCAL_HEADER_SIGNATURE: [u8; 4] = *b"PK\x03\x04";
const END_OF_CENTRAL_DIRECTORY_SIGNATURE: [u8; 4] = *b"PK\x05\x06";
const LOCAL_HEADER_LEN: u64 = 30;
const END_OF_CENTRAL_DIRECTORY_LEN: usize = 22;
// Comment length is a u16
const MAX_COMMENT_LEN: usize = 0xFFFF;
// Directory size/offset of u32::MAX defer to the zip64 record
const ZIP64_MARKER: u32 = u32::MAX;

/// Decoder for ZIP (and therefore JAR/WAR) containers.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipDecoder;

impl ZipDecoder {
    /// Creates a new ZIP decoder.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ContainerDecoder for ZipDecoder {
    fn decode(&self, name: &str, data: &ByteView) -> Result<Vec<Entry>> {
        let bytes = data.as_slice();
        let Some(eocd) = find_end_of_central_directory(bytes) else {
            return Err(LaunchError::NotAContainer {
                name: name.to_string(),
                reason: "no end of central directory record".to_string(),
            });
        };

        // zip64 roots fall back to the zip crate's own offset detection
        let (base, container, offset) = match archive_offset(name, bytes, eocd)? {
            Some(0) => (0, data.clone(), ArchiveOffset::Known(0)),
            Some(base) => {
                trace!(archive = name, offset = base, "container starts after prepended data");
                let container = data.slice(name, ByteRange::new(base, bytes.len() as u64 - base))?;
                (base, container, ArchiveOffset::Known(0))
            }
            None => (0, data.clone(), ArchiveOffset::Detect),
        };
        let config = Config {
            archive_offset: offset,
        };
        let mut archive = zip::ZipArchive::with_config(config, Cursor::new(container.clone()))
            .map_err(|e| corrupt(name, &e))?;

        let mut entries = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let (entry_name, is_dir, method, header_start, compressed_size, size) = {
                let file = archive.by_index_raw(i).map_err(|e| corrupt(name, &e))?;
                (
                    file.name().to_string(),
                    file.is_dir(),
                    file.compression(),
                    file.header_start(),
                    file.compressed_size(),
                    file.size(),
                )
            };

            let header = read_local_header(
                name,
                &entry_name,
                container.as_slice(),
                header_start,
            )?;
            let range = ByteRange::new(base + header.data_offset, compressed_size);
            if !range.fits_within(bytes.len() as u64) {
                return Err(LaunchError::CorruptEntry {
                    name: entry_name,
                    offset: range.offset,
                    length: range.length,
                    available: bytes.len() as u64,
                });
            }

            let compression = match method {
                zip::CompressionMethod::Stored => Compression::Stored,
                zip::CompressionMethod::Deflated => Compression::Deflated,
                _ => Compression::from_method(header.method),
            };
            let kind = if is_dir {
                EntryKind::Directory
            } else {
                EntryKind::from_name(&entry_name)
            };

            trace!(archive = name, entry = %entry_name, offset = range.offset, "decoded entry");
            entries.push(Entry {
                name: entry_name,
                kind,
                range,
                compression,
                size,
            });
        }

        Ok(entries)
    }

    fn format_name(&self) -> &str {
        "zip"
    }
}

struct LocalHeader {
    method: u16,
    data_offset: u64,
}

fn read_local_header(
    archive_name: &str,
    entry_name: &str,
    bytes: &[u8],
    header_start: u64,
) -> Result<LocalHeader> {
    let available = bytes.len() as u64;
    let fixed = ByteRange::new(header_start, LOCAL_HEADER_LEN);
    let Some(header) = fixed
        .fits_within(available)
        .then(|| usize::try_from(header_start).ok())
        .flatten()
        .map(|start| &bytes[start..start + LOCAL_HEADER_LEN as usize])
    else {
        return Err(LaunchError::CorruptEntry {
            name: entry_name.to_string(),
            offset: header_start,
            length: LOCAL_HEADER_LEN,
            available,
        });
    };

    if header[0..4] != LOCAL_HEADER_SIGNATURE {
        return Err(LaunchError::CorruptArchive {
            name: archive_name.to_string(),
            reason: format!("invalid local header for '{entry_name}' at offset {header_start}"),
        });
    }

    let method = u16::from_le_bytes([header[8], header[9]]);
    let name_len = u64::from(u16::from_le_bytes([header[26], header[27]]));
    let extra_len = u64::from(u16::from_le_bytes([header[28], header[29]]));

    Ok(LocalHeader {
        method,
        data_offset: header_start + LOCAL_HEADER_LEN + name_len + extra_len,
    })
}

/// Position of the last end-of-central-directory record that fits entirely
/// in `bytes`.
fn find_end_of_central_directory(bytes: &[u8]) -> Option<usize> {
    let last = bytes.len().checked_sub(END_OF_CENTRAL_DIRECTORY_LEN)?;
    let first = last.saturating_sub(MAX_COMMENT_LEN);
    (first..=last)
        .rev()
        .find(|&pos| bytes[pos..pos + 4] == END_OF_CENTRAL_DIRECTORY_SIGNATURE)
}

/// Number of bytes in front of the container whose end-of-central-directory
/// record sits at `eocd`, or `None` when the record defers to zip64 fields.
fn archive_offset(name: &str, bytes: &[u8], eocd: usize) -> Result<Option<u64>> {
    let record = &bytes[eocd..eocd + END_OF_CENTRAL_DIRECTORY_LEN];
    let directory_size = u32::from_le_bytes([record[12], record[13], record[14], record[15]]);
    let directory_offset = u32::from_le_bytes([record[16], record[17], record[18], record[19]]);
    if directory_size == ZIP64_MARKER || directory_offset == ZIP64_MARKER {
        return Ok(None);
    }

    (eocd as u64)
        .checked_sub(u64::from(directory_size) + u64::from(directory_offset))
        .map(Some)
        .ok_or_else(|| LaunchError::CorruptArchive {
            name: name.to_string(),
            reason: format!(
                "central directory ({directory_size} bytes at offset {directory_offset}) \
                 does not fit before its end record at {eocd}"
            ),
        })
}

fn corrupt(name: &str, err: &ZipError) -> LaunchError {
    LaunchError::CorruptArchive {
        name: name.to_string(),
        reason: err.to_string(),
    }
}
