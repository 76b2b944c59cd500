//! Console facade
//!
//! Bundles the terminal session, the screen buffer the application draws
//! into, the input tracker and the presenter behind one per-frame API:
//!
//! ```text
//! refresh_events -> poll_event* -> draw into buffer_mut -> display
//! ```

use std::io::{self, BufWriter};
use std::time::Duration;

use tracing::debug;

use super::presenter::Presenter;
use super::session::{Result, Session};
use super::source::CrosstermSource;
use crate::config::Config;
use crate::core::Surface;
use crate::input::{InputEvent, InputState, InputTracker};

pub struct Console {
    buffer: Surface,
    tracker: InputTracker,
    source: CrosstermSource,
    presenter: Presenter,
    // Dropped last so the terminal is restored after everything else
    session: Session,
}

impl Console {
    /// Open a session sized and styled from `config`
    pub fn open(config: &Config) -> Result<Self> {
        let session = Session::open(config.width, config.height, &config.title)?;
        let buffer = Surface::new(config.width, config.height)?;
        let tracker = InputTracker::for_surface(&buffer);
        let source = CrosstermSource::new(
            Duration::from_millis(config.frame_ms),
            session.reports_key_release(),
        );
        debug!(
            palette = %config.color_scheme,
            synthetic_release = !session.reports_key_release(),
            "console ready"
        );

        Ok(Self {
            buffer,
            tracker,
            source,
            presenter: Presenter::new(config.palette()),
            session,
        })
    }

    /// Fetch this frame's input batch; waits at most one frame tick.
    /// A terminal resize forces a full repaint on the next display.
    pub fn refresh_events(&mut self) -> Result<usize> {
        let count = self.tracker.refresh(&mut self.source)?;
        if self.source.take_resized() {
            self.clear_window()?;
        }
        Ok(count)
    }

    pub fn poll_event(&mut self) -> Option<InputEvent> {
        self.tracker.poll()
    }

    pub fn input(&self) -> &InputState {
        self.tracker.state()
    }

    pub fn buffer_mut(&mut self) -> &mut Surface {
        &mut self.buffer
    }

    /// Tracker and screen borrowed together for one frame
    pub fn frame_parts(&mut self) -> (&mut InputTracker, &mut Surface) {
        (&mut self.tracker, &mut self.buffer)
    }

    /// Present the screen buffer
    pub fn display(&mut self) -> Result<()> {
        let stdout = io::stdout();
        let mut out = BufWriter::with_capacity(65536, stdout.lock());
        self.presenter.present(&mut out, &self.buffer)?;
        Ok(())
    }

    /// Clear the physical window and force a full redraw on next display
    pub fn clear_window(&mut self) -> Result<()> {
        self.session.clear_window()?;
        self.presenter.invalidate();
        Ok(())
    }

    /// Restore the terminal
    pub fn close(self) -> Result<()> {
        self.session.close()
    }
}
