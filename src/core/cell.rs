//! Cell and attribute types
//!
//! A cell is one byte of glyph plus one byte of colour attribute. The
//! attribute packs two 4-bit colour indices: the low nibble is the
//! foreground, the high nibble the background.

/// Colour attribute (low nibble = foreground, high nibble = background)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Attr(pub u8);

impl Attr {
    /// Zero attribute (black on black)
    pub const NONE: Attr = Attr(0);

    /// Build an attribute from foreground and background indices.
    /// Only the low 4 bits of each index are kept.
    pub const fn new(fg: u8, bg: u8) -> Self {
        Attr((fg & 0x0F) | ((bg & 0x0F) << 4))
    }

    /// Foreground-only attribute
    pub const fn fg(index: u8) -> Self {
        Self::new(index, 0)
    }

    /// Background-only attribute
    pub const fn bg(index: u8) -> Self {
        Self::new(0, index)
    }

    /// Foreground colour index (0-15)
    pub const fn foreground(self) -> u8 {
        self.0 & 0x0F
    }

    /// Background colour index (0-15)
    pub const fn background(self) -> u8 {
        self.0 >> 4
    }

    /// Replace the foreground nibble, keeping the background
    pub const fn with_foreground(self, index: u8) -> Self {
        Attr((index & 0x0F) | (self.0 & 0xF0))
    }

    /// Replace the background nibble, keeping the foreground
    pub const fn with_background(self, index: u8) -> Self {
        Attr(((index & 0x0F) << 4) | (self.0 & 0x0F))
    }
}

impl From<u8> for Attr {
    fn from(value: u8) -> Self {
        Attr(value)
    }
}

/// A single grid cell
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Cell {
    /// Glyph byte; 0 means blank
    pub ch: u8,
    pub attr: Attr,
}

impl Cell {
    /// Blank cell with zero attribute
    pub const BLANK: Cell = Cell { ch: 0, attr: Attr::NONE };

    pub const fn new(ch: u8, attr: Attr) -> Self {
        Self { ch, attr }
    }

    /// Map a char to the single byte stored in a cell.
    /// Anything outside ASCII is stored as `?`.
    pub fn glyph_for(ch: char) -> u8 {
        if ch.is_ascii() {
            ch as u8
        } else {
            b'?'
        }
    }

    /// Character to print for this cell (blank renders as space)
    pub fn display_char(&self) -> char {
        match self.ch {
            0 => ' ',
            b if b.is_ascii_control() => ' ',
            b => b as char,
        }
    }
}
