//! Cell surface
//!
//! A fixed-size, row-major grid of [`Cell`]s with point mutation and the
//! text / rectangle / line rasterizers. Every access clips to the surface:
//! writes outside `[0, width) x [0, height)` are dropped, reads return `None`.

use std::collections::TryReserveError;

use thiserror::Error;
use tracing::debug;

use super::cell::{Attr, Cell};

#[derive(Error, Debug)]
pub enum SurfaceError {
    #[error("Failed to allocate {width}x{height} surface: {source}")]
    Allocation {
        width: u16,
        height: u16,
        #[source]
        source: TryReserveError,
    },

    #[error("Surface size mismatch: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        expected: (u16, u16),
        actual: (u16, u16),
    },
}

pub type Result<T> = std::result::Result<T, SurfaceError>;

/// Character-cell grid
#[derive(Debug, PartialEq, Eq)]
pub struct Surface {
    width: u16,
    height: u16,
    /// Row-major, always `width * height` long
    cells: Vec<Cell>,
}

impl Clone for Surface {
    fn clone(&self) -> Self {
        Self {
            width: self.width,
            height: self.height,
            cells: self.cells.clone(),
        }
    }

    /// Reuses the existing allocation when the sizes match
    fn clone_from(&mut self, source: &Self) {
        self.width = source.width;
        self.height = source.height;
        self.cells.clone_from(&source.cells);
    }
}

impl Surface {
    /// Create a surface with every cell blank
    pub fn new(width: u16, height: u16) -> Result<Self> {
        let len = width as usize * height as usize;
        let mut cells = Vec::new();
        cells
            .try_reserve_exact(len)
            .map_err(|source| SurfaceError::Allocation { width, height, source })?;
        cells.resize(len, Cell::BLANK);

        debug!(width, height, "surface created");
        Ok(Self { width, height, cells })
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// (width, height)
    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    /// All cells in row-major order
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// One row of cells, `None` past the last row
    pub fn row(&self, y: u16) -> Option<&[Cell]> {
        if y >= self.height {
            return None;
        }
        let start = y as usize * self.width as usize;
        Some(&self.cells[start..start + self.width as usize])
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        if x >= self.width as usize || y >= self.height as usize {
            return None;
        }
        Some(x + y * self.width as usize)
    }

    fn cell_mut(&mut self, x: i32, y: i32) -> Option<&mut Cell> {
        let idx = self.index(x, y)?;
        self.cells.get_mut(idx)
    }

    /// Copy of the cell at (x, y)
    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        self.index(x, y).map(|idx| self.cells[idx])
    }

    pub fn set_cell(&mut self, x: i32, y: i32, cell: Cell) {
        if let Some(c) = self.cell_mut(x, y) {
            *c = cell;
        }
    }

    pub fn set_char(&mut self, x: i32, y: i32, ch: u8) {
        if let Some(c) = self.cell_mut(x, y) {
            c.ch = ch;
        }
    }

    pub fn set_attr(&mut self, x: i32, y: i32, attr: Attr) {
        if let Some(c) = self.cell_mut(x, y) {
            c.attr = attr;
        }
    }

    /// Set the foreground nibble, keeping the background
    pub fn set_foreground(&mut self, x: i32, y: i32, index: u8) {
        if let Some(c) = self.cell_mut(x, y) {
            c.attr = c.attr.with_foreground(index);
        }
    }

    /// Set the background nibble, keeping the foreground
    pub fn set_background(&mut self, x: i32, y: i32, index: u8) {
        if let Some(c) = self.cell_mut(x, y) {
            c.attr = c.attr.with_background(index);
        }
    }

    /// Fill every cell with (ch, attr)
    pub fn clear(&mut self, ch: u8, attr: Attr) {
        if ch == 0 && attr == Attr::NONE {
            // Lowers to a memset
            self.cells.fill(Cell::BLANK);
            return;
        }
        self.cells.fill(Cell::new(ch, attr));
    }

    /// Overwrite this surface's contents with `other`'s without reallocating
    pub fn copy_from(&mut self, other: &Surface) -> Result<()> {
        if self.size() != other.size() {
            return Err(SurfaceError::DimensionMismatch {
                expected: self.size(),
                actual: other.size(),
            });
        }
        self.cells.copy_from_slice(&other.cells);
        Ok(())
    }

    /// Write `text` left to right from (x, y) on a single row.
    ///
    /// Stops at the first `'\0'`; never wraps.
    pub fn draw_text(&mut self, text: &str, x: i32, y: i32, attr: Attr) {
        for (i, ch) in text.chars().take_while(|&c| c != '\0').enumerate() {
            let Some(cx) = i32::try_from(i).ok().and_then(|i| x.checked_add(i)) else {
                break;
            };
            if cx >= self.width as i32 {
                break;
            }
            self.set_cell(cx, y, Cell::new(Cell::glyph_for(ch), attr));
        }
    }

    /// Fill a `|width| x |height|` block anchored at (x, y).
    ///
    /// A negative extent grows left/up from the anchor, starting one cell
    /// before it, so `draw_rect(x, y, w, h)` and `draw_rect(x + w, y, -w, h)`
    /// cover the same cells.
    pub fn draw_rect(&mut self, x: i32, y: i32, width: i32, height: i32, ch: u8, attr: Attr) {
        let Some((x0, x1)) = span(x, width, self.width) else {
            return;
        };
        let Some((y0, y1)) = span(y, height, self.height) else {
            return;
        };

        let cell = Cell::new(ch, attr);
        let stride = self.width as usize;
        for row in y0..y1 {
            let start = row * stride;
            self.cells[start + x0..start + x1].fill(cell);
        }
    }

    /// Rasterize a line from (x1, y1) towards (x2, y2).
    ///
    /// Vertical and horizontal lines are 1-cell-wide rectangles with extent
    /// `y2 - y1` / `x2 - x1`, so the far endpoint is not drawn. Slanted lines
    /// always step along x, in increments of `1 / max(|dx|, |dy|)`, derive y
    /// from the slope and stop once the x offset reaches `|dx|`.
    pub fn draw_line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, ch: u8, attr: Attr) {
        if x2 == x1 {
            self.draw_rect(x1, y1, 1, y2.saturating_sub(y1), ch, attr);
            return;
        }
        if y2 == y1 {
            self.draw_rect(x1, y1, x2.saturating_sub(x1), 1, ch, attr);
            return;
        }

        let dx = x2 as i128 - x1 as i128;
        let dy = y2 as i128 - y1 as i128;
        let per_unit = dx.abs().max(dy.abs());
        let sign = dx.signum();
        // Sample k sits at x offset k / per_unit; y advances dy / (per_unit * |dx|) per sample
        let y_den = per_unit * dx.abs();
        let samples = dx.abs() * per_unit;

        // Only walk the samples that can land on the surface
        let (x_lo, x_hi) = sample_window(x1 as i128, sign, per_unit, self.width as i128);
        let (y_lo, y_hi) = sample_window(y1 as i128, dy, y_den, self.height as i128);
        let start = x_lo.max(y_lo).max(0);
        let end = x_hi.min(y_hi).min(samples);

        let cell = Cell::new(ch, attr);
        let (per_unit, y_den, dy, sign) = (per_unit as f64, y_den as f64, dy as f64, sign as f64);
        for k in start..end {
            let k = k as f64;
            let x = x1 as f64 + sign * k / per_unit;
            let y = y1 as f64 + k * dy / y_den;
            self.set_cell(x as i32, y as i32, cell);
        }
    }
}

/// Conservative range of sample indices `k` for which
/// `origin + k * num / den` truncates onto `[0, limit)`. `den` is positive.
fn sample_window(origin: i128, num: i128, den: i128, limit: i128) -> (i128, i128) {
    let floor = |a: i128, b: i128| a.div_euclid(b);
    let ceil = |a: i128, b: i128| -(-a).div_euclid(b);

    match num.signum() {
        0 if origin > -1 && origin < limit => (i128::MIN, i128::MAX),
        0 => (0, 0),
        1 => (
            floor((-1 - origin) * den, num),
            ceil((limit - origin) * den, num) + 1,
        ),
        _ => (
            floor((origin - limit) * den, -num),
            ceil((origin + 1) * den, -num) + 1,
        ),
    }
}

/// Clip the half-open span described by a signed extent to `[0, limit)`.
fn span(origin: i32, extent: i32, limit: u16) -> Option<(usize, usize)> {
    let origin = origin as i64;
    let extent = extent as i64;
    let (start, end) = if extent < 0 {
        (origin + extent, origin)
    } else {
        (origin, origin + extent)
    };
    let start = start.max(0);
    let end = end.min(limit as i64);
    if start >= end {
        return None;
    }
    Some((start as usize, end as usize))
}
