// /////////////////////////////////////////////////////////////////////////////
// Anondump RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Dump I/O Codec
//!
//! Resolves dump paths (or `-` for stdio) to streamable sources and sinks,
//! dispatching on extension for transparent de/compression:
//!
//! | extension | input | output |
//! |---|---|---|
//! | *(stdio)* `-` | stdin, unknown size | stdout |
//! | `.sql` | raw, size = file length | raw |
//! | `.gz` | gzip, size from ISIZE trailer (best-effort) | gzip |
//! | `.xz` | (not supported) | xz |
//!
//! Anything else fails with `UnknownInputType` / `UnknownOutputType`.

pub mod copy;
pub mod input;
pub mod output;

pub use copy::{copy_stream, CHUNK_SIZE};
pub use input::{resolve_input, InputSource};
pub use output::{resolve_output, OutputTarget, OutputWriter};
