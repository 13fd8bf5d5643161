//! Locate command implementation.

use std::path::PathBuf;

use anyhow::Result;
use chkpatch::PatcherConfig;

use super::target::resolve_input;

/// Run the locate command
pub fn run(config: &PatcherConfig, game_dir: Option<PathBuf>) -> Result<bool> {
    let path = resolve_input(config, None, game_dir.as_deref())?;
    println!("{}", path.display());
    Ok(true)
}
