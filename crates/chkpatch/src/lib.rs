//! # chkpatch
//!
//! Core library for the checksum patcher.
//!
//! This crate provides:
//! - Loading an executable into an immutable-length byte sequence
//! - Scanning for a `prefix + wildcards + suffix` signature, including
//!   detection of an already patched image
//! - Size-preserving suffix substitution
//! - Writing the patched image (atomically) and hex dumps for diagnostics
//! - Configuration and install-directory lookup

pub mod bytes;
pub mod codec;
pub mod config;
pub mod error;
pub mod locator;
pub mod matcher;
pub mod patch;
pub mod session;
pub mod signature;

pub use bytes::ByteSequence;
pub use codec::{
    DEFAULT_CHUNK_SIZE, decode, decode_reader, encode, encode_writer, hex_lines,
    write_hex_dump,
};
pub use config::{ExportConfig, GameConfig, PatcherConfig, PatcherConfigBuilder, SignatureConfig};
pub use error::{Error, Result};
pub use locator::{DirectoryLocator, InstallLocator, locate_executable};
pub use matcher::{MatchResult, scan};
pub use patch::{PatchRecord, apply, apply_in_place};
pub use session::{PatchOutcome, PatchSession, Patcher};
pub use signature::{
    HexBytes, ReplacementSuffix, Signature, format_hex, format_pattern, parse_pattern,
};
