//! Screen presenter using crossterm
//!
//! Pushes a [`Surface`] to the terminal, writing only the cells that changed
//! since the previous frame.

use std::io::{self, Write};

use crossterm::{
    cursor::MoveTo,
    queue,
    style::{Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{BeginSynchronizedUpdate, EndSynchronizedUpdate},
};
use tracing::trace;

use crate::config::Palette;
use crate::core::{Attr, Surface};

/// Diffing presenter
pub struct Presenter {
    palette: Palette,
    /// Last frame written to the terminal
    previous: Option<Surface>,
}

impl Presenter {
    pub fn new(palette: Palette) -> Self {
        Self {
            palette,
            previous: None,
        }
    }

    /// Forget the last frame so the next present redraws everything
    pub fn invalidate(&mut self) {
        self.previous = None;
    }

    /// Write `frame` to `out` and return the number of cells emitted
    pub fn present<W: Write>(&mut self, out: &mut W, frame: &Surface) -> io::Result<usize> {
        // A size change invalidates the diff base
        let previous = self
            .previous
            .as_ref()
            .filter(|prev| prev.size() == frame.size());

        queue!(out, BeginSynchronizedUpdate)?;

        let mut written = 0;
        let mut last_attr: Option<Attr> = None;
        let mut cursor: Option<(u16, u16)> = None;

        for y in 0..frame.height() {
            let Some(row) = frame.row(y) else { continue };
            let prev_row = previous.and_then(|prev| prev.row(y));

            for (x, cell) in row.iter().enumerate() {
                if prev_row.is_some_and(|prev| prev[x] == *cell) {
                    continue;
                }
                let x = x as u16;

                // Move cursor if not consecutive
                if cursor != Some((x, y)) {
                    queue!(out, MoveTo(x, y))?;
                }
                if last_attr != Some(cell.attr) {
                    queue!(
                        out,
                        SetForegroundColor(self.palette.color(cell.attr.foreground())),
                        SetBackgroundColor(self.palette.color(cell.attr.background()))
                    )?;
                    last_attr = Some(cell.attr);
                }
                queue!(out, Print(cell.display_char()))?;

                cursor = Some((x + 1, y));
                written += 1;
            }
        }

        queue!(out, ResetColor, EndSynchronizedUpdate)?;
        out.flush()?;

        match &mut self.previous {
            Some(prev) => prev.clone_from(frame),
            None => self.previous = Some(frame.clone()),
        }

        trace!(cells = written, "frame presented");
        Ok(written)
    }
}
