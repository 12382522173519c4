use crate::error::{Result, SpliceError};
use crate::scan::Scanner;

/// Raw bytes of a custom attribute value, recovered from the hex dump ildasm
/// prints between the parentheses of `= ( .. )`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteBlob {
    pub bytes: Vec<u8>,
    /// Offset of the closing `)` of the argument list.
    pub close: usize,
}

/// Scan from `start` (just past the `=` of a marker) for the attribute argument list
/// and collect its bytes.
///
/// `//` annotations are skipped to the end of their line wherever they appear,
/// since ildasm prints the ASCII rendering of the blob next to the hex.
pub fn extract_blob(text: &str, start: usize) -> Result<ByteBlob> {
    let mut scanner = Scanner::new(text, start);
    let mut bytes = Vec::new();
    let mut opened = false;

    while !scanner.is_eof() {
        if scanner.eat("//") {
            scanner.skip_line();
            continue;
        }

        if !opened {
            opened = scanner.at("(");
            scanner.bump();
            continue;
        }

        if scanner.at(")") {
            return Ok(ByteBlob {
                bytes,
                close: scanner.pos(),
            });
        }

        match scanner.hex_byte() {
            Some(b) => bytes.push(b),
            None => scanner.bump(),
        }
    }

    Err(SpliceError::MalformedBlob { start })
}

/// Render bytes the way ildasm dumps an attribute blob: `( 01 00 .. )`, sixteen per line.
pub fn render_hex(bytes: &[u8]) -> String {
    let mut out = String::from("(");
    for (i, chunk) in bytes.chunks(16).enumerate() {
        if i > 0 {
            out.push_str("\n ");
        }
        for b in chunk {
            out.push_str(&format!(" {b:02X}"));
        }
    }
    out.push_str(" )");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_bytes_up_to_close() {
        let text = "= ( 01 00 05 48 65 6C 6C 6F 00 00 ) trailing";
        let blob = extract_blob(text, 0).unwrap();
        assert_eq!(
            blob.bytes,
            vec![0x01, 0x00, 0x05, 0x48, 0x65, 0x6C, 0x6C, 0x6F, 0x00, 0x00]
        );
        assert_eq!(&text[blob.close..blob.close + 1], ")");
    }

    #[test]
    fn skips_annotations_across_lines() {
        let text = "( 01 00 03 41 // ..A\n  42 43 00 00 ) // BC..\n";
        let blob = extract_blob(text, 0).unwrap();
        assert_eq!(blob.bytes, vec![0x01, 0x00, 0x03, 0x41, 0x42, 0x43, 0x00, 0x00]);
        assert_eq!(blob.close, text.find(')').unwrap());
    }

    #[test]
    fn hex_letters_before_the_open_paren_are_ignored() {
        let blob = extract_blob("  bad ( ab )", 0).unwrap();
        assert_eq!(blob.bytes, vec![0xAB]);
    }

    #[test]
    fn lone_digit_is_low_nibble() {
        let blob = extract_blob("( 1 0F a)", 0).unwrap();
        assert_eq!(blob.bytes, vec![0x01, 0x0F, 0x0A]);
    }

    #[test]
    fn paren_inside_annotation_does_not_close() {
        let blob = extract_blob("( 01 // )\n 02 )", 0).unwrap();
        assert_eq!(blob.bytes, vec![0x01, 0x02]);
    }

    #[test]
    fn unterminated_list_is_malformed() {
        assert_eq!(
            extract_blob("xx ( 01 00 02", 2),
            Err(SpliceError::MalformedBlob { start: 2 })
        );
        assert_eq!(
            extract_blob("no list at all", 0),
            Err(SpliceError::MalformedBlob { start: 0 })
        );
    }

    #[test]
    fn render_round_trips_through_extract() {
        let bytes: Vec<u8> = (0u8..40).collect();
        let text = render_hex(&bytes);
        assert_eq!(extract_blob(&text, 0).unwrap().bytes, bytes);
    }
}
