//! Resolving which executable a command works on.

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use chkpatch::{DirectoryLocator, PatcherConfig, locate_executable};

/// Directory the tool itself lives in, falling back to the working directory.
pub fn tool_dir() -> PathBuf {
    DirectoryLocator::current_exe_dir()
        .map(|l| l.dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Pick the input executable: an explicit path wins, otherwise look in
/// `game_dir` (or next to the tool) for the configured executable.
pub fn resolve_input(
    config: &PatcherConfig,
    input: Option<PathBuf>,
    game_dir: Option<&Path>,
) -> Result<PathBuf> {
    if let Some(input) = input {
        return Ok(input);
    }

    let locator = DirectoryLocator::new(game_dir.map(Path::to_path_buf).unwrap_or_else(tool_dir));

    match locate_executable(&locator, &config.game.title, &config.game.executable) {
        Some(path) => Ok(path),
        None => bail!(
            "Unable to find {} in {}",
            config.game.executable,
            locator.dir().display()
        ),
    }
}
