//! Input handling.
//!
//! - **event**: raw key/mouse events and virtual key codes
//! - **tracker**: per-frame refresh/poll state machine with edge detection
//!
//! The tracker owns all input state; nothing here is process-global, so
//! several trackers can run side by side (one per session, or per test).

pub mod event;
pub mod tracker;

pub use event::{vk, InputEvent, KeyEvent, MouseButtons, MouseEvent};
pub use tracker::{EventSource, InputError, InputState, InputTracker, MouseButton, ScriptedSource};
