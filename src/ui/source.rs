//! Terminal event source
//!
//! Reads pending crossterm events and translates them through a
//! [`KeyMapper`]. The first poll of a fetch waits at most one frame tick;
//! everything already queued after that is drained without blocking.
//!
//! Resize events carry no input; they are recorded so the console can
//! repaint the whole screen.

use std::time::Duration;

use crossterm::event::{self, Event};
use tracing::debug;

use super::keymapper::KeyMapper;
use crate::input::tracker::{EventSource, InputError, Result};
use crate::input::InputEvent;

/// [`EventSource`] backed by the host terminal
pub struct CrosstermSource {
    mapper: KeyMapper,
    /// Longest wait for the first event of a batch
    tick: Duration,
    /// Terminal resized since the last `take_resized`
    resized: bool,
}

impl CrosstermSource {
    /// `reports_release` tells whether the terminal delivers key-up events;
    /// when it does not, releases are synthesized one batch later
    pub fn new(tick: Duration, reports_release: bool) -> Self {
        let mapper = if reports_release {
            KeyMapper::new()
        } else {
            KeyMapper::with_synthetic_release()
        };
        Self {
            mapper,
            tick,
            resized: false,
        }
    }

    /// Whether the terminal was resized since the last call; clears the flag
    pub fn take_resized(&mut self) -> bool {
        std::mem::take(&mut self.resized)
    }

    fn absorb(&mut self, ev: &Event, batch: &mut Vec<InputEvent>) {
        if let Event::Resize(cols, rows) = ev {
            debug!(cols, rows, "terminal resized");
            self.resized = true;
            return;
        }
        self.mapper.translate(ev, batch);
    }
}

impl EventSource for CrosstermSource {
    fn fetch(&mut self, batch: &mut Vec<InputEvent>) -> Result<()> {
        self.mapper.begin_batch(batch);

        let mut timeout = self.tick;
        while event::poll(timeout).map_err(InputError::Read)? {
            let ev = event::read().map_err(InputError::Read)?;
            self.absorb(&ev, batch);
            timeout = Duration::ZERO;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent as CtKeyEvent, KeyModifiers};

    use crate::input::{vk, KeyEvent};

    #[test]
    fn test_resize_is_flagged_once() {
        let mut source = CrosstermSource::new(Duration::ZERO, true);
        let mut batch = Vec::new();
        assert!(!source.take_resized());

        source.absorb(&Event::Resize(100, 30), &mut batch);
        assert!(batch.is_empty());
        assert!(source.take_resized());
        assert!(!source.take_resized());
    }

    #[test]
    fn test_input_events_pass_through() {
        let mut source = CrosstermSource::new(Duration::ZERO, true);
        let mut batch = Vec::new();
        let key = CtKeyEvent::new(KeyCode::Esc, KeyModifiers::NONE);

        source.absorb(&Event::Key(key), &mut batch);
        assert_eq!(batch, vec![InputEvent::from(KeyEvent::down(vk::ESCAPE))]);
        assert!(!source.take_resized());
    }
}
