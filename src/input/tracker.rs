//! Per-frame input state tracking
//!
//! [`InputTracker`] pulls one batch of raw events per frame from an
//! [`EventSource`], hands them out one at a time through [`InputTracker::poll`],
//! and folds each handed-out event into a persistent [`InputState`]:
//! a 256-entry key table, the clamped mouse position and the left/right
//! button state, with the previous frame's buttons kept for edge queries.
//!
//! ```text
//! refresh ──> poll ──> poll ──> ... ──> None      (one frame)
//!   │          │
//!   │          └─ key table / mouse state updated per event
//!   └─ previous-frame snapshot, queue replaced
//! ```

use std::collections::VecDeque;
use std::io;

use thiserror::Error;
use tracing::trace;

use super::event::{InputEvent, MouseButtons};
use crate::core::Surface;

#[derive(Error, Debug)]
pub enum InputError {
    #[error("Failed to read input events: {0}")]
    Read(#[source] io::Error),
}

pub type Result<T> = std::result::Result<T, InputError>;

/// Supplier of raw input events
pub trait EventSource {
    /// Append every event pending since the last call to `batch`
    fn fetch(&mut self, batch: &mut Vec<InputEvent>) -> Result<()>;
}

impl<S: EventSource + ?Sized> EventSource for &mut S {
    fn fetch(&mut self, batch: &mut Vec<InputEvent>) -> Result<()> {
        (**self).fetch(batch)
    }
}

/// Event source replaying prepared batches, one batch per fetch
#[derive(Clone, Debug, Default)]
pub struct ScriptedSource {
    frames: VecDeque<Vec<InputEvent>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`ScriptedSource::push_frame`]
    pub fn frame(mut self, events: Vec<InputEvent>) -> Self {
        self.push_frame(events);
        self
    }

    pub fn push_frame(&mut self, events: Vec<InputEvent>) {
        self.frames.push_back(events);
    }

    /// Batches not yet fetched
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl EventSource for ScriptedSource {
    fn fetch(&mut self, batch: &mut Vec<InputEvent>) -> Result<()> {
        if let Some(events) = self.frames.pop_front() {
            batch.extend(events);
        }
        Ok(())
    }
}

/// Mouse buttons with tracked edges
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
}

impl MouseButton {
    fn flag(self) -> MouseButtons {
        match self {
            MouseButton::Left => MouseButtons::LEFT,
            MouseButton::Right => MouseButtons::RIGHT,
        }
    }
}

/// Keyboard and mouse state derived from polled events
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InputState {
    keys: [bool; 256],
    mouse: (u16, u16),
    prev_mouse: (u16, u16),
    buttons: MouseButtons,
    prev_buttons: MouseButtons,
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            keys: [false; 256],
            mouse: (0, 0),
            prev_mouse: (0, 0),
            buttons: MouseButtons::empty(),
            prev_buttons: MouseButtons::empty(),
        }
    }
}

impl InputState {
    /// Whether the key with this virtual code is currently held
    pub fn is_key_pressed(&self, code: u8) -> bool {
        self.keys[code as usize]
    }

    pub fn mouse_position(&self) -> (u16, u16) {
        self.mouse
    }

    pub fn mouse_x(&self) -> u16 {
        self.mouse.0
    }

    pub fn mouse_y(&self) -> u16 {
        self.mouse.1
    }

    /// Mouse position at the start of the current frame
    pub fn previous_mouse_position(&self) -> (u16, u16) {
        self.prev_mouse
    }

    pub fn is_pressed(&self, button: MouseButton) -> bool {
        self.buttons.contains(button.flag())
    }

    /// Held now, not held at the start of the frame
    pub fn just_pressed(&self, button: MouseButton) -> bool {
        let flag = button.flag();
        self.buttons.contains(flag) && !self.prev_buttons.contains(flag)
    }

    /// Not held now, held at the start of the frame
    pub fn just_released(&self, button: MouseButton) -> bool {
        let flag = button.flag();
        !self.buttons.contains(flag) && self.prev_buttons.contains(flag)
    }

    fn begin_frame(&mut self) {
        self.prev_buttons = self.buttons;
        self.prev_mouse = self.mouse;
    }
}

/// Turns per-frame event batches into edge-triggered input state
pub struct InputTracker {
    /// Current frame's batch, refilled on every refresh
    queue: Vec<InputEvent>,
    /// Next event handed out by `poll`
    cursor: usize,
    width: u16,
    height: u16,
    state: InputState,
}

impl InputTracker {
    /// Tracker clamping mouse positions to a `width` x `height` area
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            queue: Vec::new(),
            cursor: 0,
            width,
            height,
            state: InputState::default(),
        }
    }

    /// Tracker clamping mouse positions to `surface`
    pub fn for_surface(surface: &Surface) -> Self {
        Self::new(surface.width(), surface.height())
    }

    /// Start a new frame: snapshot button state and replace the queued
    /// events with the source's pending batch. Call once per frame before
    /// polling. Returns the number of events queued.
    pub fn refresh<S: EventSource + ?Sized>(&mut self, source: &mut S) -> Result<usize> {
        self.queue.clear();
        self.cursor = 0;
        self.state.begin_frame();

        source.fetch(&mut self.queue)?;
        if !self.queue.is_empty() {
            trace!(count = self.queue.len(), "input batch");
        }
        Ok(self.queue.len())
    }

    /// Next queued event, applied to the input state as it is returned.
    /// `None` once the frame's batch is exhausted.
    pub fn poll(&mut self) -> Option<InputEvent> {
        let event = *self.queue.get(self.cursor)?;
        self.cursor += 1;
        self.apply(&event);
        Some(event)
    }

    /// Poll every remaining event, discarding them
    pub fn poll_all(&mut self) -> usize {
        let mut count = 0;
        while self.poll().is_some() {
            count += 1;
        }
        count
    }

    /// Events queued but not yet polled
    pub fn pending(&self) -> usize {
        self.queue.len() - self.cursor
    }

    pub fn state(&self) -> &InputState {
        &self.state
    }

    fn apply(&mut self, event: &InputEvent) {
        match event {
            InputEvent::Key(key) => {
                self.state.keys[key.code as usize] = key.down;
            }
            InputEvent::Mouse(mouse) => {
                self.state.mouse = (
                    mouse.x.min(self.width.saturating_sub(1)),
                    mouse.y.min(self.height.saturating_sub(1)),
                );
                self.state.buttons = mouse.buttons & (MouseButtons::LEFT | MouseButtons::RIGHT);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::event::{vk, KeyEvent, MouseEvent};

    struct Broken;

    impl EventSource for Broken {
        fn fetch(&mut self, _batch: &mut Vec<InputEvent>) -> Result<()> {
            Err(InputError::Read(io::Error::new(io::ErrorKind::Other, "closed")))
        }
    }

    fn mouse(x: u16, y: u16, buttons: MouseButtons) -> InputEvent {
        MouseEvent::new(x, y, buttons).into()
    }

    #[test]
    fn test_poll_without_refresh_is_empty() {
        let mut tracker = InputTracker::new(10, 10);
        assert_eq!(tracker.poll(), None);
        assert_eq!(tracker.pending(), 0);
        assert!(!tracker.state().is_key_pressed(vk::SPACE));
    }

    #[test]
    fn test_key_down_then_up() {
        let k = vk::key('k').unwrap();
        let mut source = ScriptedSource::new()
            .frame(vec![KeyEvent::down(k).into()])
            .frame(vec![KeyEvent::up(k).into()]);
        let mut tracker = InputTracker::new(10, 10);

        assert_eq!(tracker.refresh(&mut source).unwrap(), 1);
        assert_eq!(tracker.poll(), Some(KeyEvent::down(k).into()));
        assert!(tracker.state().is_key_pressed(k));
        assert_eq!(tracker.poll(), None);

        tracker.refresh(&mut source).unwrap();
        tracker.poll_all();
        assert!(!tracker.state().is_key_pressed(k));
    }

    #[test]
    fn test_key_held_across_frames() {
        let mut source = ScriptedSource::new()
            .frame(vec![KeyEvent::down(vk::SHIFT).into(), KeyEvent::down(vk::SHIFT).into()])
            .frame(vec![]);
        let mut tracker = InputTracker::new(10, 10);

        tracker.refresh(&mut source).unwrap();
        assert_eq!(tracker.poll_all(), 2);
        assert!(tracker.state().is_key_pressed(vk::SHIFT));

        // No events: the table keeps its value
        tracker.refresh(&mut source).unwrap();
        assert!(tracker.state().is_key_pressed(vk::SHIFT));
    }

    #[test]
    fn test_state_changes_only_when_polled() {
        let mut source = ScriptedSource::new().frame(vec![
            KeyEvent::down(vk::ESCAPE).into(),
            mouse(4, 4, MouseButtons::LEFT),
        ]);
        let mut tracker = InputTracker::new(10, 10);
        tracker.refresh(&mut source).unwrap();
        assert!(!tracker.state().is_key_pressed(vk::ESCAPE));

        tracker.poll();
        assert!(tracker.state().is_key_pressed(vk::ESCAPE));
        assert!(!tracker.state().is_pressed(MouseButton::Left));
        assert_eq!(tracker.pending(), 1);
    }

    #[test]
    fn test_mouse_clamped_to_surface() {
        let surface = Surface::new(20, 10).unwrap();
        let mut source = ScriptedSource::new()
            .frame(vec![mouse(45, 3, MouseButtons::empty())])
            .frame(vec![mouse(5, 200, MouseButtons::empty())]);
        let mut tracker = InputTracker::for_surface(&surface);

        tracker.refresh(&mut source).unwrap();
        tracker.poll_all();
        assert_eq!(tracker.state().mouse_position(), (19, 3));

        tracker.refresh(&mut source).unwrap();
        tracker.poll_all();
        assert_eq!(tracker.state().mouse_x(), 5);
        assert_eq!(tracker.state().mouse_y(), 9);
        assert_eq!(tracker.state().previous_mouse_position(), (19, 3));
    }

    #[test]
    fn test_mouse_edges() {
        let mut source = ScriptedSource::new()
            .frame(vec![mouse(1, 1, MouseButtons::LEFT)])
            .frame(vec![mouse(2, 1, MouseButtons::empty())])
            .frame(vec![]);
        let mut tracker = InputTracker::new(10, 10);

        // Frame N: pressed
        tracker.refresh(&mut source).unwrap();
        tracker.poll_all();
        let state = tracker.state();
        assert!(state.is_pressed(MouseButton::Left));
        assert!(state.just_pressed(MouseButton::Left));
        assert!(!state.just_released(MouseButton::Left));

        // Frame N+1: released
        tracker.refresh(&mut source).unwrap();
        tracker.poll_all();
        let state = tracker.state();
        assert!(!state.is_pressed(MouseButton::Left));
        assert!(!state.just_pressed(MouseButton::Left));
        assert!(state.just_released(MouseButton::Left));

        // Frame N+2: edges gone
        tracker.refresh(&mut source).unwrap();
        let state = tracker.state();
        assert!(!state.just_pressed(MouseButton::Left));
        assert!(!state.just_released(MouseButton::Left));
    }

    #[test]
    fn test_press_and_release_in_one_frame() {
        // Only the last event of the frame counts for edge detection
        let mut source = ScriptedSource::new().frame(vec![
            mouse(1, 1, MouseButtons::RIGHT),
            mouse(1, 1, MouseButtons::empty()),
        ]);
        let mut tracker = InputTracker::new(10, 10);
        tracker.refresh(&mut source).unwrap();
        tracker.poll_all();
        assert!(!tracker.state().just_pressed(MouseButton::Right));
        assert!(!tracker.state().just_released(MouseButton::Right));
    }

    #[test]
    fn test_buttons_are_independent() {
        let mut source = ScriptedSource::new()
            .frame(vec![mouse(0, 0, MouseButtons::LEFT | MouseButtons::MIDDLE)])
            .frame(vec![mouse(0, 0, MouseButtons::RIGHT)]);
        let mut tracker = InputTracker::new(10, 10);

        tracker.refresh(&mut source).unwrap();
        tracker.poll_all();
        assert!(tracker.state().is_pressed(MouseButton::Left));
        assert!(!tracker.state().is_pressed(MouseButton::Right));

        tracker.refresh(&mut source).unwrap();
        tracker.poll_all();
        assert!(tracker.state().just_released(MouseButton::Left));
        assert!(tracker.state().just_pressed(MouseButton::Right));
    }

    #[test]
    fn test_refresh_discards_unpolled_events() {
        let mut source = ScriptedSource::new()
            .frame(vec![KeyEvent::down(vk::UP).into(), KeyEvent::down(vk::DOWN).into()])
            .frame(vec![KeyEvent::down(vk::LEFT).into()]);
        let mut tracker = InputTracker::new(10, 10);

        tracker.refresh(&mut source).unwrap();
        tracker.poll();
        tracker.refresh(&mut source).unwrap();
        assert_eq!(tracker.poll(), Some(KeyEvent::down(vk::LEFT).into()));
        assert_eq!(tracker.poll(), None);
        assert!(tracker.state().is_key_pressed(vk::UP));
        assert!(!tracker.state().is_key_pressed(vk::DOWN));
    }

    #[test]
    fn test_scripted_source_runs_dry() {
        let mut source = ScriptedSource::new().frame(vec![KeyEvent::down(vk::TAB).into()]);
        let mut tracker = InputTracker::new(4, 4);
        assert_eq!(source.remaining(), 1);
        assert_eq!(tracker.refresh(&mut source).unwrap(), 1);
        assert_eq!(source.remaining(), 0);
        assert_eq!(tracker.refresh(&mut source).unwrap(), 0);
    }

    #[test]
    fn test_source_error_propagates() {
        let mut tracker = InputTracker::new(10, 10);
        assert!(matches!(tracker.refresh(&mut Broken), Err(InputError::Read(_))));
        assert_eq!(tracker.poll(), None);
    }
}
