//! Undo history for a drawing surface
//!
//! A fixed-depth ring of [`Surface`] snapshots. Logical slot `0` is the
//! oldest retained state and slot `depth - 1` is the live surface the
//! application draws on. The ring never moves its buffers: a head index
//! rotates over them, so a commit or an undo costs exactly one in-place copy.

use std::cmp::Ordering;

use thiserror::Error;
use tracing::{debug, trace};

use crate::core::{Surface, SurfaceError};

/// Default number of retained snapshots (including the live one)
pub const DEFAULT_DEPTH: usize = 30;

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("History depth must be at least 1")]
    ZeroDepth,

    #[error("Failed to allocate history snapshot: {0}")]
    Surface(#[from] SurfaceError),
}

pub type Result<T> = std::result::Result<T, HistoryError>;

/// Bounded undo ring of surface snapshots
pub struct HistoryRing {
    /// Logical slot `i` lives at `(head + i) % slots.len()`
    slots: Vec<Surface>,
    head: usize,
}

impl HistoryRing {
    /// Create a ring of `depth` slots, each holding a copy of `initial`
    pub fn new(initial: Surface, depth: usize) -> Result<Self> {
        if depth == 0 {
            return Err(HistoryError::ZeroDepth);
        }

        let (width, height) = initial.size();
        let mut slots = Vec::with_capacity(depth);
        for _ in 1..depth {
            let mut snapshot = Surface::new(width, height)?;
            snapshot.copy_from(&initial)?;
            slots.push(snapshot);
        }
        slots.push(initial);

        debug!(depth, width, height, "history ring created");
        Ok(Self { slots, head: 0 })
    }

    /// Ring of blank surfaces
    pub fn blank(width: u16, height: u16, depth: usize) -> Result<Self> {
        Self::new(Surface::new(width, height)?, depth)
    }

    pub fn depth(&self) -> usize {
        self.slots.len()
    }

    fn physical(&self, logical: usize) -> usize {
        (self.head + logical) % self.slots.len()
    }

    /// The surface being drawn on
    pub fn live(&self) -> &Surface {
        &self.slots[self.physical(self.depth() - 1)]
    }

    pub fn live_mut(&mut self) -> &mut Surface {
        let idx = self.physical(self.depth() - 1);
        &mut self.slots[idx]
    }

    /// Snapshot at logical slot `index` (0 = oldest)
    pub fn snapshot(&self, index: usize) -> Option<&Surface> {
        if index >= self.depth() {
            return None;
        }
        Some(&self.slots[self.physical(index)])
    }

    /// Snapshots from oldest to live
    pub fn iter(&self) -> impl Iterator<Item = &Surface> + '_ {
        (0..self.depth()).map(move |i| &self.slots[self.physical(i)])
    }

    /// Establish an undo boundary.
    ///
    /// The oldest snapshot is dropped, the live surface becomes the newest
    /// past state, and a copy of it becomes the new live surface. Call once
    /// per discrete user action, before mutating.
    pub fn commit(&mut self) {
        let live = self.physical(self.depth() - 1);
        let oldest = self.head;
        copy_slot(&mut self.slots, live, oldest);
        self.head = (self.head + 1) % self.depth();
        trace!(head = self.head, "history commit");
    }

    /// Revert the live surface to the previous commit.
    ///
    /// The live contents are discarded and the oldest snapshot is duplicated
    /// into the freed slot, so once history runs out every further undo
    /// keeps returning the oldest retained state.
    pub fn undo(&mut self) {
        let newest = self.physical(self.depth() - 1);
        let oldest = self.head;
        copy_slot(&mut self.slots, oldest, newest);
        self.head = newest;
        trace!(head = self.head, "history undo");
    }
}

fn copy_slot(slots: &mut [Surface], src: usize, dst: usize) {
    match src.cmp(&dst) {
        Ordering::Equal => {}
        Ordering::Less => {
            let (before, after) = slots.split_at_mut(dst);
            after[0].clone_from(&before[src]);
        }
        Ordering::Greater => {
            let (before, after) = slots.split_at_mut(src);
            before[dst].clone_from(&after[0]);
        }
    }
}
