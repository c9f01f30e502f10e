// /////////////////////////////////////////////////////////////////////////////
// Anondump RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Input Resolution
//!
//! Maps a user-supplied input path to a readable dump stream plus a size
//! estimate for progress reporting. The gzip size probe reads the ISIZE
//! trailer (last 4 bytes, little-endian), which stores the uncompressed
//! length modulo 2^32. Best-effort only; wrong for dumps above 4 GiB.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use anondump_domain::AnonymizerError;
use flate2::read::MultiGzDecoder;

/// A resolved input: where the dump bytes come from and how many to expect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// `-`: read the dump from stdin. Size unknown.
    Stdin,
    /// A plain `.sql` file. Size is the file length.
    Raw { path: PathBuf, size: u64 },
    /// A gzip-compressed `.gz` file. Size from the ISIZE trailer when
    /// readable.
    Gzip { path: PathBuf, size: Option<u64> },
}

impl InputSource {
    /// Expected decompressed byte count, when known.
    pub fn size(&self) -> Option<u64> {
        match self {
            InputSource::Stdin => None,
            InputSource::Raw { size, .. } => Some(*size),
            InputSource::Gzip { size, .. } => *size,
        }
    }

    /// Opens the stream for reading decompressed dump bytes.
    pub fn open(&self) -> Result<Box<dyn Read + Send>, AnonymizerError> {
        match self {
            InputSource::Stdin => Ok(Box::new(std::io::stdin())),
            InputSource::Raw { path, .. } => Ok(Box::new(File::open(path)?)),
            InputSource::Gzip { path, .. } => Ok(Box::new(MultiGzDecoder::new(File::open(path)?))),
        }
    }
}

/// Resolves `path` (or `-`) to an [`InputSource`] by extension.
pub fn resolve_input(path: &str) -> Result<InputSource, AnonymizerError> {
    if path == "-" {
        return Ok(InputSource::Stdin);
    }

    let path_buf = PathBuf::from(path);
    match extension_of(&path_buf).as_deref() {
        Some("sql") => {
            let size = std::fs::metadata(&path_buf)?.len();
            Ok(InputSource::Raw { path: path_buf, size })
        }
        Some("gz") => {
            let size = read_gzip_isize(&path_buf);
            Ok(InputSource::Gzip { path: path_buf, size })
        }
        _ => Err(AnonymizerError::UnknownInputType(path.to_string())),
    }
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension().map(|ext| ext.to_string_lossy().to_ascii_lowercase())
}

/// The last 4 bytes of a gzip member hold the uncompressed size in
/// little-endian (modulo 2³²).
fn read_gzip_isize(path: &Path) -> Option<u64> {
    let mut file = File::open(path).ok()?;
    let length = file.metadata().ok()?.len();
    if length < 4 {
        return None;
    }
    file.seek(SeekFrom::End(-4)).ok()?;
    let mut trailer = [0u8; 4];
    file.read_exact(&mut trailer).ok()?;
    Some(u32::from_le_bytes(trailer) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    #[test]
    fn test_stdin_has_unknown_size() {
        let source = resolve_input("-").unwrap();
        assert_eq!(source, InputSource::Stdin);
        assert_eq!(source.size(), None);
    }

    #[test]
    fn test_raw_input_size_is_file_length() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump.sql");
        std::fs::write(&path, b"SELECT 1;\n").unwrap();

        let source = resolve_input(path.to_str().unwrap()).unwrap();
        assert_eq!(source.size(), Some(10));

        let mut contents = String::new();
        source.open().unwrap().read_to_string(&mut contents).unwrap();
        assert_eq!(contents, "SELECT 1;\n");
    }

    #[test]
    fn test_gzip_input_reports_uncompressed_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump.sql.gz");
        let payload = b"INSERT INTO t VALUES (1);\n".repeat(100);

        let file = File::create(&path).unwrap();
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(&payload).unwrap();
        encoder.finish().unwrap();

        let source = resolve_input(path.to_str().unwrap()).unwrap();
        assert_eq!(source.size(), Some(payload.len() as u64));

        let mut decompressed = Vec::new();
        source.open().unwrap().read_to_end(&mut decompressed).unwrap();
        assert_eq!(decompressed, payload);
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let err = resolve_input("dump.rar").unwrap_err();
        assert!(matches!(err, AnonymizerError::UnknownInputType(_)));
    }
}
