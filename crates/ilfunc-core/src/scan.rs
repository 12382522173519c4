/// Forward-only cursor over disassembly text.
///
/// Every anchor the rewriter looks for is ASCII, so the cursor walks bytes and
/// any position it reports is a valid `str` slice boundary.
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(text: &'a str, pos: usize) -> Self {
        Self {
            text,
            pos: pos.min(text.len()),
        }
    }

    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.text.len()
    }

    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.text.as_bytes().get(self.pos).copied()
    }

    #[inline]
    pub fn bump(&mut self) {
        if !self.is_eof() {
            self.pos += 1;
        }
    }

    /// Whether `lit` starts at the current position.
    pub fn at(&self, lit: &str) -> bool {
        self.text.as_bytes()[self.pos..].starts_with(lit.as_bytes())
    }

    /// Advance past `lit` if it starts here.
    pub fn eat(&mut self, lit: &str) -> bool {
        if self.at(lit) {
            self.pos += lit.len();
            true
        } else {
            false
        }
    }

    /// Move to the line break ending the current line (`\n` or `\r\n`), or to the end of text.
    /// The cursor stays in front of the break.
    pub fn skip_line(&mut self) {
        while !self.is_eof() && !self.at("\r\n") && !self.at("\n") {
            self.pos += 1;
        }
    }

    /// Absolute offset of the next `needle` at or after the cursor.
    pub fn find(&self, needle: &str) -> Option<usize> {
        self.text[self.pos..].find(needle).map(|rel| self.pos + rel)
    }

    /// Consume one hex token: two digits make a big-endian byte, a single digit
    /// followed by anything else (or the end of text) is taken as a low nibble.
    pub fn hex_byte(&mut self) -> Option<u8> {
        let high = self.peek().and_then(hex_value)?;
        self.pos += 1;

        match self.peek().and_then(hex_value) {
            Some(low) => {
                self.pos += 1;
                Some((high << 4) | low)
            }
            None => Some(high),
        }
    }
}

#[inline]
fn hex_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}
