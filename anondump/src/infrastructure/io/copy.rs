// /////////////////////////////////////////////////////////////////////////////
// Anondump RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Streaming Copy
//!
//! Moves dump bytes between a resolved source and sink in fixed-size
//! chunks, flushing after each chunk so the receiving client tool sees
//! steady input instead of one burst at the end. Progress lands in the log
//! at coarse intervals; rendering progress is not this layer's concern.

use std::io::{Read, Write};

use anondump_domain::AnonymizerError;
use tracing::info;

/// Chunk size for streaming copies.
pub const CHUNK_SIZE: usize = 8192;

/// Log progress roughly this many times over a sized copy.
const PROGRESS_STEPS: u64 = 10;

/// Log every this-many bytes when the total is unknown.
const UNSIZED_PROGRESS_INTERVAL: u64 = 256 * 1024 * 1024;

/// Copies `reader` to `writer` in [`CHUNK_SIZE`] chunks, flushing after each
/// chunk. Returns the number of bytes moved.
pub fn copy_stream(
    reader: &mut dyn Read,
    writer: &mut dyn Write,
    total: Option<u64>,
    label: &str,
) -> Result<u64, AnonymizerError> {
    let mut buffer = [0u8; CHUNK_SIZE];
    let mut moved: u64 = 0;
    let mut next_report = progress_interval(total);

    loop {
        let read = reader.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        writer.write_all(&buffer[..read])?;
        writer.flush()?;
        moved += read as u64;

        if moved >= next_report {
            match total {
                Some(total) if total > 0 => {
                    info!("{}: {}% ({} / {} bytes)", label, moved * 100 / total, moved, total);
                }
                _ => info!("{}: {} bytes", label, moved),
            }
            next_report += progress_interval(total);
        }
    }

    info!("{}: complete ({} bytes)", label, moved);
    Ok(moved)
}

fn progress_interval(total: Option<u64>) -> u64 {
    match total {
        Some(total) if total >= PROGRESS_STEPS => total / PROGRESS_STEPS,
        Some(_) => 1,
        None => UNSIZED_PROGRESS_INTERVAL,
    }
}
