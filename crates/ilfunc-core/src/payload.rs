use crate::error::{Result, SpliceError};
use crate::packed::{read_packed_len, PackedLen};

/// Custom attribute blob prolog (`0x0001`, little endian).
pub const PROLOG: [u8; 2] = [0x01, 0x00];

/// Recover the string argument of a single-string attribute constructor:
/// prolog, packed length, then that many UTF-8 bytes. Anything after the string
/// (the named-argument count) is ignored.
pub fn decode_payload(blob: &[u8]) -> Result<String> {
    if blob.len() < PROLOG.len() {
        return Err(SpliceError::TruncatedPayload {
            index: 0,
            needed: PROLOG.len(),
            available: blob.len(),
        });
    }
    if blob[..PROLOG.len()] != PROLOG {
        log::warn!(
            "unexpected attribute prolog {:02X} {:02X}, decoding anyway",
            blob[0],
            blob[1]
        );
    }

    let mut cursor = PROLOG.len();
    let len = read_packed_len(blob, &mut cursor)? as usize;

    let available = blob.len() - cursor;
    if available < len {
        return Err(SpliceError::TruncatedPayload {
            index: cursor,
            needed: len,
            available,
        });
    }

    String::from_utf8(blob[cursor..cursor + len].to_vec()).map_err(|e| SpliceError::InvalidUtf8 {
        index: e.utf8_error().valid_up_to(),
    })
}

/// Build the blob a compiler would emit for `[ILFunc(text)]`: prolog, packed
/// length, UTF-8 text and a zero named-argument count.
///
/// Returns `None` when the text is too long for a packed length.
pub fn encode_payload(text: &str) -> Option<Vec<u8>> {
    let len = u32::try_from(text.len()).ok()?;
    let mut blob = PROLOG.to_vec();
    blob.extend(PackedLen::encode(len)?);
    blob.extend_from_slice(text.as_bytes());
    blob.extend_from_slice(&[0x00, 0x00]);
    Some(blob)
}
