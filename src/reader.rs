//! Bounds-checked sequential access to the input buffer.
//!
//! Every decoder walks its input through a [`ByteCursor`] instead of raw
//! index arithmetic. Reads past the end return `None` and the decoders treat
//! that as end-of-input, so no truncation of the source file can cause an
//! out-of-bounds access.

/// A forward-only cursor over a byte slice with relative lookahead.
#[derive(Debug, Clone, Copy)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Cursor starting at a fixed offset (e.g. just past a header).
    pub fn at(data: &'a [u8], pos: usize) -> Self {
        Self { data, pos }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Byte at `pos + k`, without consuming anything.
    pub fn peek(&self, k: usize) -> Option<u8> {
        self.data.get(self.pos.checked_add(k)?).copied()
    }

    /// Little-endian u16 at `pos + k`.
    pub fn peek_u16_le(&self, k: usize) -> Option<u16> {
        Some(u16::from_le_bytes([self.peek(k)?, self.peek(k + 1)?]))
    }

    /// Big-endian u32 at `pos + k`.
    pub fn peek_u32_be(&self, k: usize) -> Option<u32> {
        Some(u32::from_be_bytes([
            self.peek(k)?,
            self.peek(k + 1)?,
            self.peek(k + 2)?,
            self.peek(k + 3)?,
        ]))
    }

    /// The bytes in `pos + from .. pos + to`, clipped to the buffer.
    pub fn peek_slice(&self, from: usize, to: usize) -> &'a [u8] {
        let len = self.data.len();
        let a = (self.pos.saturating_add(from)).min(len);
        let b = (self.pos.saturating_add(to)).min(len).max(a);
        &self.data[a..b]
    }

    /// Consume `n` bytes, saturating at the end of the buffer.
    pub fn advance(&mut self, n: usize) {
        self.pos = self.pos.saturating_add(n).min(self.data.len());
    }

    /// Consume and return exactly `n` bytes, or `None` without consuming.
    pub fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        if self.remaining() < n {
            return None;
        }
        let out = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peek_does_not_consume() {
        let cur = ByteCursor::new(b"abc");
        assert_eq!(cur.peek(0), Some(b'a'));
        assert_eq!(cur.peek(2), Some(b'c'));
        assert_eq!(cur.peek(3), None);
        assert_eq!(cur.pos(), 0);
    }

    #[test]
    fn advance_saturates() {
        let mut cur = ByteCursor::new(b"ab");
        cur.advance(100);
        assert_eq!(cur.remaining(), 0);
        assert_eq!(cur.peek(0), None);
    }

    #[test]
    fn take_is_all_or_nothing() {
        let mut cur = ByteCursor::new(b"abcd");
        assert_eq!(cur.take(2), Some(&b"ab"[..]));
        assert_eq!(cur.take(3), None);
        assert_eq!(cur.pos(), 2);
    }

    #[test]
    fn peek_slice_clips() {
        let cur = ByteCursor::at(b"abcdef", 4);
        assert_eq!(cur.peek_slice(0, 10), b"ef");
        assert_eq!(cur.peek_slice(8, 10), b"");
    }

    #[test]
    fn multibyte_reads() {
        let cur = ByteCursor::new(&[0x34, 0x12, 0xDE, 0xAD, 0xBE, 0xEF]);
        assert_eq!(cur.peek_u16_le(0), Some(0x1234));
        assert_eq!(cur.peek_u32_be(2), Some(0xDEAD_BEEF));
        assert_eq!(cur.peek_u32_be(3), None);
    }
}
