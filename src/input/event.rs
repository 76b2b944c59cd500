//! Raw input events
//!
//! Events as delivered by a host input source: a virtual key code with a
//! down/up flag, or an absolute mouse position with the held-button bitmask.

use bitflags::bitflags;

bitflags! {
    /// Mouse button state bitmask
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct MouseButtons: u8 {
        const LEFT   = 0b0001;
        const RIGHT  = 0b0010;
        const MIDDLE = 0b0100;
    }
}

/// Keyboard event
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    /// Virtual key code (see [`vk`])
    pub code: u8,
    /// true = pressed, false = released
    pub down: bool,
}

impl KeyEvent {
    pub const fn down(code: u8) -> Self {
        Self { code, down: true }
    }

    pub const fn up(code: u8) -> Self {
        Self { code, down: false }
    }
}

/// Mouse event
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MouseEvent {
    pub x: u16,
    pub y: u16,
    /// Buttons held at the time of the event
    pub buttons: MouseButtons,
}

impl MouseEvent {
    pub const fn new(x: u16, y: u16, buttons: MouseButtons) -> Self {
        Self { x, y, buttons }
    }
}

/// A single raw input event
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
}

impl From<KeyEvent> for InputEvent {
    fn from(event: KeyEvent) -> Self {
        InputEvent::Key(event)
    }
}

impl From<MouseEvent> for InputEvent {
    fn from(event: MouseEvent) -> Self {
        InputEvent::Mouse(event)
    }
}

/// Virtual key codes (Windows numbering)
pub mod vk {
    pub const BACK: u8 = 0x08;
    pub const TAB: u8 = 0x09;
    pub const RETURN: u8 = 0x0D;
    pub const SHIFT: u8 = 0x10;
    pub const CONTROL: u8 = 0x11;
    /// Alt
    pub const MENU: u8 = 0x12;
    pub const ESCAPE: u8 = 0x1B;
    pub const SPACE: u8 = 0x20;
    pub const PRIOR: u8 = 0x21;
    pub const NEXT: u8 = 0x22;
    pub const END: u8 = 0x23;
    pub const HOME: u8 = 0x24;
    pub const LEFT: u8 = 0x25;
    pub const UP: u8 = 0x26;
    pub const RIGHT: u8 = 0x27;
    pub const DOWN: u8 = 0x28;
    pub const INSERT: u8 = 0x2D;
    pub const DELETE: u8 = 0x2E;
    pub const F1: u8 = 0x70;
    pub const F24: u8 = 0x87;
    pub const OEM_PLUS: u8 = 0xBB;
    pub const OEM_COMMA: u8 = 0xBC;
    pub const OEM_MINUS: u8 = 0xBD;
    pub const OEM_PERIOD: u8 = 0xBE;

    /// Code for a letter or digit key (`'a'` and `'A'` share a code)
    pub const fn key(ch: char) -> Option<u8> {
        match ch {
            '0'..='9' => Some(ch as u8),
            'A'..='Z' => Some(ch as u8),
            'a'..='z' => Some(ch as u8 - b'a' + b'A'),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letter_codes() {
        assert_eq!(vk::key('w'), Some(0x57));
        assert_eq!(vk::key('W'), Some(0x57));
        assert_eq!(vk::key('7'), Some(0x37));
        assert_eq!(vk::key('#'), None);
    }

    #[test]
    fn test_event_conversions() {
        assert_eq!(
            InputEvent::from(KeyEvent::down(vk::SPACE)),
            InputEvent::Key(KeyEvent { code: 0x20, down: true })
        );
        let mouse = MouseEvent::new(3, 4, MouseButtons::LEFT | MouseButtons::RIGHT);
        assert_eq!(InputEvent::from(mouse), InputEvent::Mouse(mouse));
    }
}
