//! Patch command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chkpatch::{PatchOutcome, Patcher, PatcherConfig, format_hex};
use tracing::info;

use super::target::{resolve_input, tool_dir};

pub struct PatchArgs {
    pub input: Option<PathBuf>,
    pub game_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub output_name: Option<String>,
    pub dump_hex: Option<PathBuf>,
}

/// Run the patch command. Returns `false` when the signature was not found.
pub fn run(mut config: PatcherConfig, args: PatchArgs) -> Result<bool> {
    if let Some(name) = args.output_name {
        config.game.output_name = name;
    }

    let patcher = Patcher::new(config)?;
    let input = resolve_input(patcher.config(), args.input, args.game_dir.as_deref())?;
    let output = patcher.output_path(args.output_dir.unwrap_or_else(tool_dir));

    let mut session = patcher
        .open(&input)
        .with_context(|| format!("failed to load {}", input.display()))?;

    // Dumps are only written for a patchable image; no-op runs leave the disk alone.
    if let Some(ref dir) = args.dump_hex {
        if session.scan().is_found() {
            let path = dir.join(format!("{}.txt", patcher.config().game.output_name));
            patcher.write_hex_dump(session.bytes(), &path)?;
            info!("Wrote original hex dump to {}", path.display());
        }
    }

    let outcome = patcher
        .patch_session(&mut session, &output)
        .with_context(|| format!("failed to patch {}", input.display()))?;

    match outcome {
        PatchOutcome::Patched { output, record } => {
            if let Some(ref dir) = args.dump_hex {
                let path = dir.join(format!(
                    "{}-patched.txt",
                    patcher.config().game.output_name
                ));
                patcher.write_hex_dump(session.bytes(), &path)?;
                info!("Wrote patched hex dump to {}", path.display());
            }

            println!(
                "Patched {} -> {} at 0x{:X}",
                format_hex(&record.original_bytes),
                format_hex(&record.patch_bytes),
                record.offset
            );
            println!("Wrote {}", output.display());
            println!("Patch successful.");
            Ok(true)
        }
        PatchOutcome::AlreadyPatched { offset } => {
            println!("{} is already patched (0x{:X}).", input.display(), offset);
            Ok(true)
        }
        PatchOutcome::NotFound => {
            println!("Checksum signature not found in {}.", input.display());
            println!("Patch failed.");
            Ok(false)
        }
    }
}
