//! Suffix substitution for a matched signature.
//!
//! This is the only operation that mutates a loaded image. It never changes
//! the length of the sequence.

use tracing::debug;

use crate::bytes::ByteSequence;
use crate::error::{Error, Result};
use crate::matcher::MatchResult;
use crate::signature::{ReplacementSuffix, format_hex};

/// Details of an applied patch, for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchRecord {
    /// Offset of the first overwritten byte.
    pub offset: usize,
    /// Bytes that were there before.
    pub original_bytes: Vec<u8>,
    /// Bytes that were written.
    pub patch_bytes: Vec<u8>,
}

/// Overwrite the last `replacement.len()` bytes of a `Found` match.
pub fn apply(
    mut sequence: ByteSequence,
    found: &MatchResult,
    replacement: &ReplacementSuffix,
) -> Result<ByteSequence> {
    apply_in_place(&mut sequence, found, replacement)?;
    Ok(sequence)
}

/// In-place variant of [`apply`], returning what was changed.
pub fn apply_in_place(
    sequence: &mut ByteSequence,
    found: &MatchResult,
    replacement: &ReplacementSuffix,
) -> Result<PatchRecord> {
    let MatchResult::Found {
        start_offset,
        end_offset,
    } = *found
    else {
        return Err(Error::NoMatch(format!(
            "expected a found signature, got {:?}",
            found
        )));
    };

    if end_offset > sequence.len()
        || start_offset
            .checked_add(replacement.len())
            .is_none_or(|min_end| end_offset < min_end)
    {
        return Err(Error::NoMatch(format!(
            "match {:#x}..{:#x} does not fit a {} byte replacement in a {} byte image",
            start_offset,
            end_offset,
            replacement.len(),
            sequence.len()
        )));
    }

    let offset = end_offset - replacement.len();
    let original_bytes = sequence.as_slice()[offset..end_offset].to_vec();

    debug!(
        "Original block: {}",
        format_hex(&sequence.as_slice()[start_offset..end_offset])
    );
    sequence.overwrite(offset, replacement.as_slice());
    debug!(
        "Modified block: {}",
        format_hex(&sequence.as_slice()[start_offset..end_offset])
    );

    Ok(PatchRecord {
        offset,
        original_bytes,
        patch_bytes: replacement.as_slice().to_vec(),
    })
}
