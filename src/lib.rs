//! conpaint - character-cell canvas for the terminal
//!
//! A small console "engine": a fixed-size grid of cells with clipped
//! drawing primitives, an input tracker that turns per-frame event batches
//! into edge-triggered keyboard and mouse state, and a bounded undo ring of
//! surface snapshots. The terminal front end (crossterm) and two sample
//! applications, a paint program and snake, are built on top.
//!
//! # Frame loop
//!
//! ```text
//! refresh events -> poll each event -> query state -> draw -> present
//! ```

pub mod app;
pub mod config;
pub mod core;
pub mod history;
pub mod input;
pub mod ui;

pub use crate::core::{Attr, Cell, Surface, SurfaceError};
pub use history::{HistoryError, HistoryRing};
pub use input::{InputEvent, InputState, InputTracker};
