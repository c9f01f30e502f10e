// /////////////////////////////////////////////////////////////////////////////
// Anondump RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Output Resolution
//!
//! Maps a user-supplied output path to a writable dump sink. Compressed
//! writers buffer internally, so a sink must be explicitly
//! [`finish`](OutputWriter::finish)ed to flush trailers; dropping one
//! mid-stream loses data by design of the underlying encoders.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anondump_domain::AnonymizerError;
use flate2::write::GzEncoder;
use flate2::Compression;
use xz2::write::XzEncoder;

const XZ_COMPRESSION_LEVEL: u32 = 6;

/// A resolved output: where the dump bytes go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// `-`: write the dump to stdout.
    Stdout,
    /// A plain `.sql` file.
    Raw(PathBuf),
    /// A gzip-compressed `.gz` file.
    Gzip(PathBuf),
    /// An xz-compressed `.xz` file.
    Xz(PathBuf),
}

impl OutputTarget {
    /// Opens the sink for writing dump bytes.
    pub fn open(&self) -> Result<OutputWriter, AnonymizerError> {
        let writer = match self {
            OutputTarget::Stdout => OutputWriter::Stdout(io::stdout()),
            OutputTarget::Raw(path) => OutputWriter::Raw(File::create(path)?),
            OutputTarget::Gzip(path) => {
                OutputWriter::Gzip(GzEncoder::new(File::create(path)?, Compression::default()))
            }
            OutputTarget::Xz(path) => {
                OutputWriter::Xz(XzEncoder::new(File::create(path)?, XZ_COMPRESSION_LEVEL))
            }
        };
        Ok(writer)
    }
}

/// Resolves `path` (or `-`) to an [`OutputTarget`] by extension.
pub fn resolve_output(path: &str) -> Result<OutputTarget, AnonymizerError> {
    if path == "-" {
        return Ok(OutputTarget::Stdout);
    }

    let path_buf = PathBuf::from(path);
    match extension_of(&path_buf).as_deref() {
        Some("sql") => Ok(OutputTarget::Raw(path_buf)),
        Some("gz") => Ok(OutputTarget::Gzip(path_buf)),
        Some("xz") => Ok(OutputTarget::Xz(path_buf)),
        _ => Err(AnonymizerError::UnknownOutputType(path.to_string())),
    }
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension().map(|ext| ext.to_string_lossy().to_ascii_lowercase())
}

/// An open dump sink with transparent compression.
pub enum OutputWriter {
    Stdout(io::Stdout),
    Raw(File),
    Gzip(GzEncoder<File>),
    Xz(XzEncoder<File>),
}

impl OutputWriter {
    /// Flushes any buffered data and compression trailers, then releases
    /// the sink. Stdout is left open; it belongs to the process.
    pub fn finish(self) -> Result<(), AnonymizerError> {
        match self {
            OutputWriter::Stdout(mut stdout) => stdout.flush()?,
            OutputWriter::Raw(mut file) => file.flush()?,
            OutputWriter::Gzip(encoder) => {
                encoder.finish()?.flush()?;
            }
            OutputWriter::Xz(encoder) => {
                encoder.finish()?.flush()?;
            }
        }
        Ok(())
    }
}

impl Write for OutputWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            OutputWriter::Stdout(w) => w.write(buf),
            OutputWriter::Raw(w) => w.write(buf),
            OutputWriter::Gzip(w) => w.write(buf),
            OutputWriter::Xz(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            OutputWriter::Stdout(w) => w.flush(),
            OutputWriter::Raw(w) => w.flush(),
            OutputWriter::Gzip(w) => w.flush(),
            OutputWriter::Xz(w) => w.flush(),
        }
    }
}
