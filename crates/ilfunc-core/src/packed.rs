//! ECMA-335 compressed unsigned integers, as used for string lengths in
//! custom attribute blobs.
//!
//! | first byte  | width | value                                  |
//! |-------------|-------|----------------------------------------|
//! | `0xxxxxxx`  | 1     | `b0`                                   |
//! | `10xxxxxx`  | 2     | `(b0 & 0x3F) << 8 \| b1`               |
//! | `110xxxxx`  | 4     | `(b0 & 0x1F) << 24 \| b1 << 16 \| ..`   |
//! | `111xxxxx`  | -     | reserved, rejected                     |

use crate::error::{Result, SpliceError};

/// Largest value the 4-byte form can carry.
pub const MAX_PACKED_LEN: u32 = 0x1FFF_FFFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackedLen {
    pub value: u32,
    /// Bytes consumed by the encoding: 1, 2 or 4.
    pub width: usize,
}

impl PackedLen {
    /// Decode the integer starting at `index`.
    pub fn decode(bytes: &[u8], index: usize) -> Result<Self> {
        let first = *bytes.get(index).ok_or(SpliceError::TruncatedPayload {
            index,
            needed: 1,
            available: 0,
        })?;

        let width = match first {
            b if b & 0x80 == 0 => 1,
            b if b & 0x40 == 0 => 2,
            b if b & 0x20 == 0 => 4,
            byte => return Err(SpliceError::InvalidLengthEncoding { byte, index }),
        };

        let available = bytes.len() - index;
        if available < width {
            return Err(SpliceError::TruncatedPayload {
                index,
                needed: width,
                available,
            });
        }

        let b = &bytes[index..index + width];
        let value = match width {
            1 => first as u32,
            2 => ((b[0] as u32 & 0x3F) << 8) | b[1] as u32,
            _ => {
                ((b[0] as u32 & 0x1F) << 24)
                    | ((b[1] as u32) << 16)
                    | ((b[2] as u32) << 8)
                    | b[3] as u32
            }
        };

        Ok(Self { value, width })
    }

    /// Shortest encoding of `value`, or `None` if it exceeds [`MAX_PACKED_LEN`].
    pub fn encode(value: u32) -> Option<Vec<u8>> {
        match value {
            0..=0x7F => Some(vec![value as u8]),
            0x80..=0x3FFF => Some(vec![0x80 | (value >> 8) as u8, value as u8]),
            0x4000..=MAX_PACKED_LEN => Some(vec![
                0xC0 | (value >> 24) as u8,
                (value >> 16) as u8,
                (value >> 8) as u8,
                value as u8,
            ]),
            _ => None,
        }
    }
}

/// Decode at `*cursor` and advance the cursor past the encoding.
pub fn read_packed_len(bytes: &[u8], cursor: &mut usize) -> Result<u32> {
    let len = PackedLen::decode(bytes, *cursor)?;
    *cursor += len.width;
    Ok(len.value)
}
