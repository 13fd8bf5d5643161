//! Hexdump command implementation.
//!
//! Writes a file as uppercase hex pairs, one chunk per line, for diffing
//! original and patched executables.
//!
//! # Output Format
//!
//! ```text
//! DE AD BE EF 00 11 22 33 44 55 66 77 88 99 AA BB
//! ```

use std::path::Path;

use anyhow::{Context, Result};

/// Run the hexdump command
pub fn run(input: &Path, output: &Path, chunk_size: usize) -> Result<()> {
    let sequence = chkpatch::decode(input)
        .with_context(|| format!("failed to load {}", input.display()))?;

    chkpatch::write_hex_dump(&sequence, output, chunk_size)
        .with_context(|| format!("failed to write {}", output.display()))?;

    println!(
        "Hexdump of {} ({} bytes, {} per line) written to {}",
        input.display(),
        sequence.len(),
        chunk_size.max(1),
        output.display()
    );
    Ok(())
}
