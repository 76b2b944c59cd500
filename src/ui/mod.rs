//! Terminal front end.
//!
//! - **session**: scoped acquisition and restoration of the host terminal
//! - **keymapper**: crossterm events to virtual-key and mouse events
//! - **source**: [`EventSource`](crate::input::EventSource) over crossterm
//! - **presenter**: diff rendering of a surface
//! - **console**: the above bundled into a per-frame API

pub mod console;
pub mod keymapper;
pub mod presenter;
pub mod session;
pub mod source;

pub use console::Console;
pub use keymapper::{KeyMapper, Modifiers};
pub use presenter::Presenter;
pub use session::{Session, SessionError};
pub use source::CrosstermSource;
