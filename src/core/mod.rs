//! Core drawing components.
//!
//! - **cell**: one glyph byte plus a packed foreground/background attribute
//! - **surface**: fixed-size cell grid with text, rectangle and line rasterizers
//!
//! # Attribute layout
//!
//! ```text
//!  7   4 3   0
//! +-----+-----+
//! | bg  | fg  |   4-bit colour indices
//! +-----+-----+
//! ```

pub mod cell;
pub mod surface;

pub use cell::{Attr, Cell};
pub use surface::{Surface, SurfaceError};
