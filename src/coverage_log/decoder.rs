//! Decoding of raw coverage-log blobs into offset sets.

use crate::domain::{LogError, OffsetSet};

/// On-disk record layout of a coverage log.
///
/// Only the legacy headerless format is wired up today.
// TODO: newer logs carry an 8-byte magic prefix (the 0xC0BF_FFFF_FFFF_FF{32,64}
// family) selecting a 32- or 64-bit record width; the detection rule is not
// documented upstream, so nothing here sniffs for it yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Headerless stream of native-endian 32-bit offsets.
    Legacy,
}

impl LogFormat {
    #[must_use]
    pub const fn record_width(self) -> usize {
        match self {
            LogFormat::Legacy => 4,
        }
    }
}

/// Decode a legacy-format blob, inserting every offset into `into`.
///
/// Passing the same accumulator across calls is how same-library logs from
/// multiple processes merge into one set (duplicates collapse).
///
/// # Errors
/// Returns [`LogError::TruncatedRecord`] if the blob length is not a multiple
/// of the record width. The accumulator is left untouched on error.
pub fn decode_offsets(blob: &[u8], into: &mut OffsetSet) -> Result<(), LogError> {
    decode_with_format(blob, LogFormat::Legacy, into)
}

pub fn decode_with_format(
    blob: &[u8],
    format: LogFormat,
    into: &mut OffsetSet,
) -> Result<(), LogError> {
    let width = format.record_width();
    if blob.len() % width != 0 {
        return Err(LogError::TruncatedRecord { len: blob.len(), width });
    }
    for record in blob.chunks_exact(width) {
        let offset = match format {
            LogFormat::Legacy => {
                let mut bytes = [0u8; 4];
                bytes.copy_from_slice(record);
                u64::from(u32::from_ne_bytes(bytes))
            }
        };
        into.insert(offset);
    }
    Ok(())
}
