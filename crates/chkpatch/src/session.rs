//! Patch sessions and the load → scan → patch → write pipeline.
//!
//! ## Example
//!
//! ```no_run
//! use chkpatch::{PatchOutcome, Patcher, PatcherConfig};
//!
//! let patcher = Patcher::new(PatcherConfig::default())?;
//! match patcher.patch_file("stellaris.exe", "stellaris-patched.exe")? {
//!     PatchOutcome::Patched { output, .. } => println!("wrote {}", output.display()),
//!     PatchOutcome::AlreadyPatched { .. } => println!("already patched"),
//!     PatchOutcome::NotFound => println!("signature not found"),
//! }
//! # Ok::<(), chkpatch::Error>(())
//! ```

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::bytes::ByteSequence;
use crate::codec;
use crate::config::PatcherConfig;
use crate::error::{Error, Result};
use crate::matcher::{self, MatchResult};
use crate::patch::{self, PatchRecord};
use crate::signature::{ReplacementSuffix, Signature};

/// One patch attempt over a loaded image.
#[derive(Debug, Clone)]
pub struct PatchSession {
    bytes: ByteSequence,
    signature: Signature,
    replacement: ReplacementSuffix,
    last_match: Option<MatchResult>,
}

impl PatchSession {
    pub fn new(
        bytes: ByteSequence,
        signature: Signature,
        replacement: ReplacementSuffix,
    ) -> Result<Self> {
        replacement.validate_for(&signature)?;
        Ok(Self {
            bytes,
            signature,
            replacement,
            last_match: None,
        })
    }

    /// Scan the loaded bytes and remember the result.
    pub fn scan(&mut self) -> MatchResult {
        let result = matcher::scan(&self.bytes, &self.signature, &self.replacement);
        self.last_match = Some(result);
        result
    }

    /// Patch the match found by the last [`scan`](Self::scan).
    ///
    /// Afterwards the recorded match is `AlreadyPatched`, so a second call
    /// fails instead of writing twice.
    pub fn apply(&mut self) -> Result<PatchRecord> {
        let Some(found) = self.last_match else {
            return Err(Error::NoMatch("no scan has been run".to_string()));
        };

        let record = patch::apply_in_place(&mut self.bytes, &found, &self.replacement)?;

        self.last_match = found
            .start_offset()
            .map(|start_offset| MatchResult::AlreadyPatched { start_offset });
        Ok(record)
    }

    /// Forget the last scan. The loaded bytes are kept.
    pub fn clear(&mut self) {
        self.last_match = None;
    }

    pub fn last_match(&self) -> Option<MatchResult> {
        self.last_match
    }

    pub fn bytes(&self) -> &ByteSequence {
        &self.bytes
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }
}

/// Result of a full patch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOutcome {
    /// A patched copy was written to `output`.
    Patched { output: PathBuf, record: PatchRecord },
    /// The input already carries the patch; nothing was written.
    AlreadyPatched { offset: usize },
    /// The signature is absent; nothing was written.
    NotFound,
}

/// Runs patch sessions with a fixed configuration.
#[derive(Debug, Clone)]
pub struct Patcher {
    config: PatcherConfig,
    signature: Signature,
    replacement: ReplacementSuffix,
}

impl Patcher {
    pub fn new(config: PatcherConfig) -> Result<Self> {
        config.validate()?;
        let signature = config.signature()?;
        let replacement = config.replacement();
        Ok(Self {
            config,
            signature,
            replacement,
        })
    }

    pub fn config(&self) -> &PatcherConfig {
        &self.config
    }

    /// Load `input` into a fresh session.
    pub fn open<P: AsRef<Path>>(&self, input: P) -> Result<PatchSession> {
        let bytes = codec::decode(input)?;
        PatchSession::new(bytes, self.signature.clone(), self.replacement.clone())
    }

    /// Load and scan `input` without writing anything.
    pub fn scan_file<P: AsRef<Path>>(&self, input: P) -> Result<MatchResult> {
        let mut session = self.open(input)?;
        Ok(session.scan())
    }

    /// Load, scan, patch and write `input` to `output`.
    pub fn patch_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input: P,
        output: Q,
    ) -> Result<PatchOutcome> {
        let mut session = self.open(input)?;
        self.patch_session(&mut session, output)
    }

    /// Scan, patch and write an already loaded session.
    pub fn patch_session<P: AsRef<Path>>(
        &self,
        session: &mut PatchSession,
        output: P,
    ) -> Result<PatchOutcome> {
        session.clear();
        info!("Acquiring checksum block...");

        match session.scan() {
            MatchResult::NotFound => {
                warn!("Signature {} not found", session.signature());
                Ok(PatchOutcome::NotFound)
            }
            MatchResult::AlreadyPatched { start_offset } => {
                info!("Already patched at {:#x}", start_offset);
                Ok(PatchOutcome::AlreadyPatched {
                    offset: start_offset,
                })
            }
            MatchResult::Found { start_offset, .. } => {
                info!("Found matching sequence at {:#x}, patching...", start_offset);
                let record = session.apply()?;
                let output = output.as_ref();
                codec::encode(session.bytes(), output)?;
                Ok(PatchOutcome::Patched {
                    output: output.to_path_buf(),
                    record,
                })
            }
        }
    }

    /// Default destination for the patched executable inside `dir`.
    pub fn output_path<P: AsRef<Path>>(&self, dir: P) -> PathBuf {
        dir.as_ref().join(self.config.output_file_name())
    }

    /// Write a hex dump of `sequence` using the configured line width.
    pub fn write_hex_dump<P: AsRef<Path>>(&self, sequence: &ByteSequence, path: P) -> Result<()> {
        codec::write_hex_dump(sequence, path, self.config.export.chunk_size)
    }
}
