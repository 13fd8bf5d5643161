//! Signature scanning over a loaded byte sequence.
//!
//! The scan is leftmost-first: candidate offsets are visited in ascending
//! order and the first occurrence of the prefix whose suffix is either the
//! original or the already-patched variant decides the result. A prefix
//! occurrence with any other suffix is a false positive and scanning resumes
//! at the next byte.

use serde::Serialize;
use tracing::{debug, trace};

use crate::bytes::ByteSequence;
use crate::signature::{ReplacementSuffix, Signature, format_hex};

/// Outcome of a single scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MatchResult {
    /// Unpatched signature found. `end_offset` is one past the last suffix byte.
    Found {
        start_offset: usize,
        end_offset: usize,
    },
    /// The suffix already holds the replacement bytes.
    AlreadyPatched { start_offset: usize },
    NotFound,
}

impl MatchResult {
    pub fn is_found(&self) -> bool {
        matches!(self, MatchResult::Found { .. })
    }

    pub fn start_offset(&self) -> Option<usize> {
        match *self {
            MatchResult::Found { start_offset, .. }
            | MatchResult::AlreadyPatched { start_offset } => Some(start_offset),
            MatchResult::NotFound => None,
        }
    }
}

/// Scan `sequence` for `signature`, treating `already_patched` as the
/// suffix of a previously patched image.
pub fn scan(
    sequence: &ByteSequence,
    signature: &Signature,
    already_patched: &ReplacementSuffix,
) -> MatchResult {
    let data = sequence.as_slice();

    let Some(last_start) = data.len().checked_sub(signature.len()) else {
        debug!(
            "Input ({} bytes) is shorter than the signature ({} bytes)",
            data.len(),
            signature.len()
        );
        return MatchResult::NotFound;
    };

    let prefix = signature.prefix();
    let suffix = signature.suffix();
    let suffix_offset = signature.suffix_offset();

    for start in memchr::memchr_iter(prefix[0], &data[..=last_start]) {
        if &data[start..start + prefix.len()] != prefix {
            continue;
        }

        let suffix_start = start + suffix_offset;
        let suffix_end = suffix_start + suffix.len();
        let candidate = &data[suffix_start..suffix_end];

        if candidate == suffix {
            debug!(
                "Signature found at {:#x}..{:#x}: {}",
                start,
                suffix_end,
                format_hex(&data[start..suffix_end])
            );
            return MatchResult::Found {
                start_offset: start,
                end_offset: suffix_end,
            };
        }

        if candidate == already_patched.as_slice() {
            debug!("Patched signature found at {:#x}", start);
            return MatchResult::AlreadyPatched {
                start_offset: start,
            };
        }

        trace!(
            "Prefix at {:#x} has suffix {}, skipping",
            start,
            format_hex(candidate)
        );
    }

    debug!("Signature {} not found", signature);
    MatchResult::NotFound
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stellaris_signature() -> (Signature, ReplacementSuffix) {
        (
            Signature::new(vec![0x48, 0x8B, 0x12], 14, vec![0x85, 0xC0]).unwrap(),
            ReplacementSuffix::new(vec![0x33, 0xC0]),
        )
    }

    fn place(buf: &mut [u8], offset: usize, suffix: [u8; 2]) {
        buf[offset..offset + 3].copy_from_slice(&[0x48, 0x8B, 0x12]);
        for (i, b) in buf[offset + 3..offset + 17].iter_mut().enumerate() {
            *b = 0xA0 + i as u8;
        }
        buf[offset + 17..offset + 19].copy_from_slice(&suffix);
    }

    #[test]
    fn test_scan_found_example() {
        let (sig, patched) = stellaris_signature();
        let mut buf = vec![0u8; 500];
        place(&mut buf, 100, [0x85, 0xC0]);
        let seq = ByteSequence::load(buf).unwrap();

        assert_eq!(
            scan(&seq, &sig, &patched),
            MatchResult::Found {
                start_offset: 100,
                end_offset: 119
            }
        );
    }

    #[test]
    fn test_scan_already_patched_example() {
        let (sig, patched) = stellaris_signature();
        let mut buf = vec![0u8; 500];
        place(&mut buf, 100, [0x33, 0xC0]);
        let seq = ByteSequence::load(buf).unwrap();

        assert_eq!(
            scan(&seq, &sig, &patched),
            MatchResult::AlreadyPatched { start_offset: 100 }
        );
    }

    #[test]
    fn test_scan_input_shorter_than_signature() {
        let (sig, patched) = stellaris_signature();
        let seq = ByteSequence::load(vec![0x48, 0x8B, 0x12, 0x00, 0x85, 0xC0]).unwrap();
        assert_eq!(scan(&seq, &sig, &patched), MatchResult::NotFound);
    }

    #[test]
    fn test_scan_no_prefix() {
        let (sig, patched) = stellaris_signature();
        let seq = ByteSequence::load(vec![0x90; 256]).unwrap();
        assert_eq!(scan(&seq, &sig, &patched), MatchResult::NotFound);
    }

    #[test]
    fn test_scan_exact_fit() {
        let (sig, patched) = stellaris_signature();
        let mut buf = vec![0u8; 19];
        place(&mut buf, 0, [0x85, 0xC0]);
        let seq = ByteSequence::load(buf).unwrap();
        assert_eq!(
            scan(&seq, &sig, &patched),
            MatchResult::Found {
                start_offset: 0,
                end_offset: 19
            }
        );
    }

    #[test]
    fn test_scan_prefix_too_close_to_end() {
        let (sig, patched) = stellaris_signature();
        let mut buf = vec![0u8; 30];
        buf[20..23].copy_from_slice(&[0x48, 0x8B, 0x12]);
        let seq = ByteSequence::load(buf).unwrap();
        assert_eq!(scan(&seq, &sig, &patched), MatchResult::NotFound);
    }

    #[test]
    fn test_scan_skips_false_positive() {
        let (sig, patched) = stellaris_signature();
        let mut buf = vec![0u8; 200];
        place(&mut buf, 10, [0x90, 0x90]);
        place(&mut buf, 60, [0x85, 0xC0]);
        let seq = ByteSequence::load(buf).unwrap();
        assert_eq!(
            scan(&seq, &sig, &patched),
            MatchResult::Found {
                start_offset: 60,
                end_offset: 79
            }
        );
    }

    #[test]
    fn test_scan_resumes_inside_false_positive_window() {
        // A second prefix starts inside the wildcard run of the first.
        let (sig, patched) = stellaris_signature();
        let mut buf = vec![0u8; 100];
        place(&mut buf, 10, [0x00, 0x00]);
        place(&mut buf, 15, [0x85, 0xC0]);
        let seq = ByteSequence::load(buf).unwrap();
        assert_eq!(
            scan(&seq, &sig, &patched),
            MatchResult::Found {
                start_offset: 15,
                end_offset: 34
            }
        );
    }

    #[test]
    fn test_scan_leftmost_match_wins() {
        let (sig, patched) = stellaris_signature();
        let mut buf = vec![0u8; 200];
        place(&mut buf, 40, [0x85, 0xC0]);
        place(&mut buf, 120, [0x85, 0xC0]);
        let seq = ByteSequence::load(buf).unwrap();
        assert_eq!(scan(&seq, &sig, &patched).start_offset(), Some(40));
    }

    #[test]
    fn test_scan_already_patched_stops_early() {
        let (sig, patched) = stellaris_signature();
        let mut buf = vec![0u8; 200];
        place(&mut buf, 40, [0x33, 0xC0]);
        place(&mut buf, 120, [0x85, 0xC0]);
        let seq = ByteSequence::load(buf).unwrap();
        assert_eq!(
            scan(&seq, &sig, &patched),
            MatchResult::AlreadyPatched { start_offset: 40 }
        );
    }

    #[test]
    fn test_scan_ignores_wildcard_contents() {
        let (sig, patched) = stellaris_signature();
        for fill in [0x00u8, 0x48, 0x85, 0xFF] {
            let mut buf = vec![0u8; 64];
            place(&mut buf, 5, [0x85, 0xC0]);
            buf[8..22].fill(fill);
            let seq = ByteSequence::load(buf).unwrap();
            assert!(scan(&seq, &sig, &patched).is_found(), "fill {:#x}", fill);
        }
    }

    #[test]
    fn test_match_result_serializes_with_status() {
        let json = serde_json::to_string(&MatchResult::Found {
            start_offset: 1,
            end_offset: 20,
        })
        .unwrap();
        assert_eq!(json, r#"{"status":"found","start_offset":1,"end_offset":20}"#);
        assert_eq!(
            serde_json::to_string(&MatchResult::NotFound).unwrap(),
            r#"{"status":"not_found"}"#
        );
    }
}
