//! Applications built on the console.
//!
//! - **paint**: mouse drawing with line/rectangle tools and undo
//! - **snake**: the classic game on a half-width grid
//!
//! An [`App`] sees one frame at a time: the tracker already refreshed with
//! the frame's input batch, and the screen surface to draw the whole frame
//! into. [`run`] drives an app against a live [`Console`].

pub mod paint;
pub mod snake;

use thiserror::Error;
use tracing::info;

use crate::core::{Surface, SurfaceError};
use crate::history::HistoryError;
use crate::input::InputTracker;
use crate::ui::{Console, SessionError};

pub use paint::Paint;
pub use snake::Snake;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Surface(#[from] SurfaceError),

    #[error(transparent)]
    History(#[from] HistoryError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Whether the main loop keeps going
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// A frame-driven console application
pub trait App {
    /// Poll this frame's events from `input` and draw the frame into `screen`
    fn frame(&mut self, input: &mut InputTracker, screen: &mut Surface) -> Result<Flow>;
}

/// Run `app` until it quits
pub fn run<A: App + ?Sized>(console: &mut Console, app: &mut A) -> Result<()> {
    let mut frames: u64 = 0;
    loop {
        console.refresh_events()?;

        let (input, screen) = console.frame_parts();
        let flow = app.frame(input, screen)?;
        if flow == Flow::Quit {
            break;
        }

        console.display()?;
        frames += 1;
    }
    info!(frames, "main loop finished");
    Ok(())
}
