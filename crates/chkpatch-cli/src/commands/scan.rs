//! Scan command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chkpatch::{MatchResult, Patcher, PatcherConfig};

use super::target::resolve_input;

/// Run the scan command. Returns `false` when the signature was not found.
pub fn run(
    config: &PatcherConfig,
    input: Option<PathBuf>,
    game_dir: Option<PathBuf>,
    json: bool,
) -> Result<bool> {
    let patcher = Patcher::new(config.clone())?;
    let input = resolve_input(config, input, game_dir.as_deref())?;
    let result = patcher
        .scan_file(&input)
        .with_context(|| format!("failed to load {}", input.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", describe(&result));
    }

    Ok(result != MatchResult::NotFound)
}

fn describe(result: &MatchResult) -> String {
    match *result {
        MatchResult::Found {
            start_offset,
            end_offset,
        } => format!(
            "Signature found at 0x{:X}..0x{:X} (patchable)",
            start_offset, end_offset
        ),
        MatchResult::AlreadyPatched { start_offset } => {
            format!("Already patched at 0x{:X}", start_offset)
        }
        MatchResult::NotFound => "Signature not found".to_string(),
    }
}
