//! Wrapping 8-bit tape cells.

use std::fmt;

/// One tape cell: an unsigned byte whose arithmetic wraps modulo 256.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ByteCell(u8);

impl ByteCell {
    pub const ZERO: ByteCell = ByteCell(0);

    /// Reduce any integer into the cell range, wrapping in both directions.
    ///
    /// `wrap(256) == 0`, `wrap(-1) == 255`.
    pub fn wrap(n: i64) -> Self {
        ByteCell(n.rem_euclid(256) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn increment(self) -> Self {
        ByteCell(self.0.wrapping_add(1))
    }

    pub fn decrement(self) -> Self {
        ByteCell(self.0.wrapping_sub(1))
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// The Latin-1 character with the same code point as this cell.
    pub fn as_char(self) -> char {
        char::from(self.0)
    }
}

impl From<u8> for ByteCell {
    fn from(value: u8) -> Self {
        ByteCell(value)
    }
}

impl From<ByteCell> for i64 {
    fn from(cell: ByteCell) -> Self {
        i64::from(cell.0)
    }
}

impl fmt::Display for ByteCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
