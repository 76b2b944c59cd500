//! Key mapping for terminal input
//!
//! Converts crossterm events into raw [`InputEvent`]s: virtual key codes
//! with a down/up flag, and absolute mouse positions with the held-button
//! bitmask.
//!
//! Modifier keys are tracked from the modifier state every key and mouse
//! event carries, so holding Shift while dragging shows up as `vk::SHIFT`
//! down even on terminals that never report the Shift key itself.

use bitflags::bitflags;
use crossterm::event::{
    Event, KeyCode, KeyEvent as CtKeyEvent, KeyEventKind, KeyModifiers, ModifierKeyCode,
    MouseButton, MouseEvent as CtMouseEvent, MouseEventKind,
};
use tracing::trace;

use crate::input::{vk, InputEvent, KeyEvent, MouseButtons, MouseEvent};

bitflags! {
    /// Modifier keys
    #[derive(Clone, Copy, Debug, Default, PartialEq)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const CTRL  = 0b0010;
        const ALT   = 0b0100;
    }
}

impl From<KeyModifiers> for Modifiers {
    fn from(mods: KeyModifiers) -> Self {
        let mut result = Modifiers::empty();
        if mods.contains(KeyModifiers::SHIFT) {
            result |= Modifiers::SHIFT;
        }
        if mods.contains(KeyModifiers::CONTROL) {
            result |= Modifiers::CTRL;
        }
        if mods.contains(KeyModifiers::ALT) {
            result |= Modifiers::ALT;
        }
        result
    }
}

impl Modifiers {
    /// Virtual key code of each modifier
    const KEYS: [(Modifiers, u8); 3] = [
        (Modifiers::SHIFT, vk::SHIFT),
        (Modifiers::CTRL, vk::CONTROL),
        (Modifiers::ALT, vk::MENU),
    ];
}

/// Stateful crossterm → raw event translator
#[derive(Debug, Default)]
pub struct KeyMapper {
    /// Last modifier state reported by the terminal
    modifiers: Modifiers,
    /// Mouse buttons currently held
    buttons: MouseButtons,
    /// Emit a release for every pressed key at the start of the next batch
    synthesize_release: bool,
    /// Keys awaiting a synthetic release
    latched: Vec<u8>,
}

impl KeyMapper {
    /// Mapper for a terminal that reports key releases
    pub fn new() -> Self {
        Self::default()
    }

    /// Mapper for a terminal that only reports presses
    pub fn with_synthetic_release() -> Self {
        Self {
            synthesize_release: true,
            ..Self::default()
        }
    }

    /// Start a new batch; releases keys latched during the previous one
    pub fn begin_batch(&mut self, out: &mut Vec<InputEvent>) {
        out.extend(self.latched.drain(..).map(|code| InputEvent::from(KeyEvent::up(code))));
    }

    /// Translate one crossterm event, appending the resulting raw events
    pub fn translate(&mut self, event: &Event, out: &mut Vec<InputEvent>) {
        match event {
            Event::Key(key) => self.translate_key(key, out),
            Event::Mouse(mouse) => self.translate_mouse(mouse, out),
            other => trace!(?other, "ignored terminal event"),
        }
    }

    fn translate_key(&mut self, key: &CtKeyEvent, out: &mut Vec<InputEvent>) {
        self.sync_modifiers(key.modifiers, out);

        let Some(code) = Self::key_code(key.code) else {
            trace!(?key, "unmapped key");
            return;
        };
        let down = !matches!(key.kind, KeyEventKind::Release);
        out.push(KeyEvent { code, down }.into());

        let is_modifier = Modifiers::KEYS.iter().any(|&(_, key)| key == code);
        if down && self.synthesize_release && !is_modifier && !self.latched.contains(&code) {
            self.latched.push(code);
        }
    }

    fn translate_mouse(&mut self, mouse: &CtMouseEvent, out: &mut Vec<InputEvent>) {
        self.sync_modifiers(mouse.modifiers, out);

        match mouse.kind {
            MouseEventKind::Down(button) | MouseEventKind::Drag(button) => {
                self.buttons.insert(Self::button_flag(button));
            }
            MouseEventKind::Up(button) => {
                self.buttons.remove(Self::button_flag(button));
            }
            _ => {}
        }
        out.push(MouseEvent::new(mouse.column, mouse.row, self.buttons).into());
    }

    /// Emit key events for modifiers whose state changed
    fn sync_modifiers(&mut self, mods: KeyModifiers, out: &mut Vec<InputEvent>) {
        let mods = Modifiers::from(mods);
        let changed = mods ^ self.modifiers;
        for (flag, code) in Modifiers::KEYS {
            if changed.contains(flag) {
                out.push(KeyEvent { code, down: mods.contains(flag) }.into());
            }
        }
        self.modifiers = mods;
    }

    fn button_flag(button: MouseButton) -> MouseButtons {
        match button {
            MouseButton::Left => MouseButtons::LEFT,
            MouseButton::Right => MouseButtons::RIGHT,
            MouseButton::Middle => MouseButtons::MIDDLE,
        }
    }

    /// Virtual key code for a crossterm key
    pub fn key_code(code: KeyCode) -> Option<u8> {
        match code {
            // Character keys
            KeyCode::Char(ch) => Self::char_code(ch),

            KeyCode::Enter => Some(vk::RETURN),
            KeyCode::Backspace => Some(vk::BACK),
            KeyCode::Tab | KeyCode::BackTab => Some(vk::TAB),
            KeyCode::Esc => Some(vk::ESCAPE),

            // Arrow keys
            KeyCode::Up => Some(vk::UP),
            KeyCode::Down => Some(vk::DOWN),
            KeyCode::Right => Some(vk::RIGHT),
            KeyCode::Left => Some(vk::LEFT),

            // Navigation keys
            KeyCode::Home => Some(vk::HOME),
            KeyCode::End => Some(vk::END),
            KeyCode::PageUp => Some(vk::PRIOR),
            KeyCode::PageDown => Some(vk::NEXT),
            KeyCode::Insert => Some(vk::INSERT),
            KeyCode::Delete => Some(vk::DELETE),

            // Function keys
            KeyCode::F(n @ 1..=24) => Some(vk::F1 + (n - 1)),

            KeyCode::Modifier(m) => match m {
                ModifierKeyCode::LeftShift | ModifierKeyCode::RightShift => Some(vk::SHIFT),
                ModifierKeyCode::LeftControl | ModifierKeyCode::RightControl => Some(vk::CONTROL),
                ModifierKeyCode::LeftAlt | ModifierKeyCode::RightAlt => Some(vk::MENU),
                _ => None,
            },

            _ => None,
        }
    }

    fn char_code(ch: char) -> Option<u8> {
        match ch {
            ' ' => Some(vk::SPACE),
            ',' | '<' => Some(vk::OEM_COMMA),
            '.' | '>' => Some(vk::OEM_PERIOD),
            '-' | '_' => Some(vk::OEM_MINUS),
            '=' | '+' => Some(vk::OEM_PLUS),
            _ => vk::key(ch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, mods: KeyModifiers) -> Event {
        Event::Key(CtKeyEvent::new(code, mods))
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16, mods: KeyModifiers) -> Event {
        Event::Mouse(CtMouseEvent {
            kind,
            column,
            row,
            modifiers: mods,
        })
    }

    fn translate(mapper: &mut KeyMapper, event: Event) -> Vec<InputEvent> {
        let mut out = Vec::new();
        mapper.translate(&event, &mut out);
        out
    }

    #[test]
    fn test_key_codes() {
        assert_eq!(KeyMapper::key_code(KeyCode::Char('a')), Some(0x41));
        assert_eq!(KeyMapper::key_code(KeyCode::Char('Z')), Some(0x5A));
        assert_eq!(KeyMapper::key_code(KeyCode::Char(' ')), Some(vk::SPACE));
        assert_eq!(KeyMapper::key_code(KeyCode::Esc), Some(vk::ESCAPE));
        assert_eq!(KeyMapper::key_code(KeyCode::Left), Some(vk::LEFT));
        assert_eq!(KeyMapper::key_code(KeyCode::F(1)), Some(vk::F1));
        assert_eq!(KeyMapper::key_code(KeyCode::F(24)), Some(vk::F24));
        assert_eq!(KeyMapper::key_code(KeyCode::F(25)), None);
        assert_eq!(KeyMapper::key_code(KeyCode::Char('é')), None);
    }

    #[test]
    fn test_press_and_release() {
        let mut mapper = KeyMapper::new();
        assert_eq!(
            translate(&mut mapper, key(KeyCode::Esc, KeyModifiers::NONE)),
            vec![KeyEvent::down(vk::ESCAPE).into()]
        );

        let release = Event::Key(CtKeyEvent::new_with_kind(
            KeyCode::Esc,
            KeyModifiers::NONE,
            KeyEventKind::Release,
        ));
        assert_eq!(translate(&mut mapper, release), vec![KeyEvent::up(vk::ESCAPE).into()]);
    }

    #[test]
    fn test_modifier_changes_emit_keys() {
        let mut mapper = KeyMapper::new();
        let z = vk::key('z').unwrap();

        // Ctrl+Z: Ctrl goes down before the key
        assert_eq!(
            translate(&mut mapper, key(KeyCode::Char('z'), KeyModifiers::CONTROL)),
            vec![KeyEvent::down(vk::CONTROL).into(), KeyEvent::down(z).into()]
        );

        // Still held: no repeat of the modifier
        assert_eq!(
            translate(&mut mapper, key(KeyCode::Char('z'), KeyModifiers::CONTROL)),
            vec![KeyEvent::down(z).into()]
        );

        // Mouse event without Ctrl releases it
        let out = translate(&mut mapper, mouse(MouseEventKind::Moved, 1, 1, KeyModifiers::NONE));
        assert_eq!(out[0], KeyEvent::up(vk::CONTROL).into());
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_mouse_buttons_tracked() {
        let mut mapper = KeyMapper::new();
        let shift = KeyModifiers::SHIFT;

        let out = translate(&mut mapper, mouse(MouseEventKind::Down(MouseButton::Left), 3, 4, shift));
        assert_eq!(
            out,
            vec![
                KeyEvent::down(vk::SHIFT).into(),
                MouseEvent::new(3, 4, MouseButtons::LEFT).into(),
            ]
        );

        let out = translate(&mut mapper, mouse(MouseEventKind::Drag(MouseButton::Left), 5, 4, shift));
        assert_eq!(out, vec![MouseEvent::new(5, 4, MouseButtons::LEFT).into()]);

        let out = translate(&mut mapper, mouse(MouseEventKind::Down(MouseButton::Right), 5, 4, shift));
        assert_eq!(out, vec![MouseEvent::new(5, 4, MouseButtons::LEFT | MouseButtons::RIGHT).into()]);

        let out = translate(&mut mapper, mouse(MouseEventKind::Up(MouseButton::Left), 6, 4, shift));
        assert_eq!(out, vec![MouseEvent::new(6, 4, MouseButtons::RIGHT).into()]);

        let out = translate(&mut mapper, mouse(MouseEventKind::ScrollUp, 7, 4, shift));
        assert_eq!(out, vec![MouseEvent::new(7, 4, MouseButtons::RIGHT).into()]);
    }

    #[test]
    fn test_synthetic_release() {
        let mut mapper = KeyMapper::with_synthetic_release();
        let a = vk::key('a').unwrap();

        let mut batch = Vec::new();
        mapper.begin_batch(&mut batch);
        mapper.translate(&key(KeyCode::Char('a'), KeyModifiers::NONE), &mut batch);
        mapper.translate(&key(KeyCode::Char('a'), KeyModifiers::NONE), &mut batch);
        mapper.translate(&key(KeyCode::Char('A'), KeyModifiers::SHIFT), &mut batch);
        assert_eq!(
            batch,
            vec![
                KeyEvent::down(a).into(),
                KeyEvent::down(a).into(),
                KeyEvent::down(vk::SHIFT).into(),
                KeyEvent::down(a).into(),
            ]
        );

        // Released once at the start of the next batch; Shift follows the modifier state
        let mut batch = Vec::new();
        mapper.begin_batch(&mut batch);
        assert_eq!(batch, vec![KeyEvent::up(a).into()]);

        let mut batch = Vec::new();
        mapper.begin_batch(&mut batch);
        assert!(batch.is_empty());
    }

    #[test]
    fn test_no_synthetic_release_by_default() {
        let mut mapper = KeyMapper::new();
        let mut batch = Vec::new();
        mapper.translate(&key(KeyCode::Enter, KeyModifiers::NONE), &mut batch);
        batch.clear();
        mapper.begin_batch(&mut batch);
        assert!(batch.is_empty());
    }

    #[test]
    fn test_other_events_ignored() {
        let mut mapper = KeyMapper::new();
        assert!(translate(&mut mapper, Event::FocusGained).is_empty());
        assert!(translate(&mut mapper, Event::Resize(100, 50)).is_empty());
    }
}
