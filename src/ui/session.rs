//! Terminal session
//!
//! Acquires the host terminal for full-screen cell drawing (raw mode,
//! alternate screen, mouse capture, hidden cursor) and puts everything back
//! when the session is closed or dropped, including on error paths.

use std::io::{self, Write};

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    style::{Attribute, ResetColor, SetAttribute},
    terminal::{
        self, Clear, ClearType, DisableLineWrap, EnableLineWrap, EnterAlternateScreen,
        LeaveAlternateScreen, SetSize, SetTitle,
    },
};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::core::SurfaceError;
use crate::input::InputError;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Terminal I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to create screen buffer: {0}")]
    Surface(#[from] SurfaceError),

    #[error(transparent)]
    Input(#[from] InputError),
}

pub type Result<T> = std::result::Result<T, SessionError>;

/// Scoped ownership of the terminal's display and input modes
pub struct Session {
    width: u16,
    height: u16,
    /// Terminal size before the session resized it
    previous_size: Option<(u16, u16)>,
    /// Keyboard enhancement flags were pushed (key releases reported)
    keyboard_enhanced: bool,
    /// Restores the console input mode when released or dropped
    #[cfg(windows)]
    input_mode: console_mode::InputModeGuard,
    active: bool,
}

impl Session {
    /// Take over the terminal for a `width` x `height` cell area
    pub fn open(width: u16, height: u16, title: &str) -> Result<Self> {
        let previous_size = terminal::size().ok();

        // Dropped on the early return below, restoring the input mode
        #[cfg(windows)]
        let input_mode = console_mode::InputModeGuard::enable_mouse_input();

        terminal::enable_raw_mode()?;

        // From here on Drop undoes whatever succeeded
        let mut session = Self {
            width,
            height,
            previous_size,
            keyboard_enhanced: false,
            #[cfg(windows)]
            input_mode,
            active: true,
        };

        let mut stdout = io::stdout();
        execute!(
            stdout,
            EnterAlternateScreen,
            EnableMouseCapture,
            DisableLineWrap,
            Hide,
            SetTitle(title),
            Clear(ClearType::All),
            MoveTo(0, 0)
        )?;

        if previous_size != Some((width, height)) {
            if let Err(e) = execute!(stdout, SetSize(width, height)) {
                warn!("Could not resize terminal to {}x{}: {}", width, height, e);
            }
        }

        if matches!(terminal::supports_keyboard_enhancement(), Ok(true)) {
            execute!(
                stdout,
                PushKeyboardEnhancementFlags(
                    KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                        | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
                )
            )?;
            session.keyboard_enhanced = true;
        }

        info!(width, height, title, "session opened");
        Ok(session)
    }

    /// Whether the terminal delivers key-up events
    pub fn reports_key_release(&self) -> bool {
        cfg!(windows) || self.keyboard_enhanced
    }

    /// Clear the physical screen
    pub fn clear_window(&self) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(stdout, ResetColor, Clear(ClearType::All), MoveTo(0, 0))?;
        Ok(())
    }

    /// Restore the terminal, reporting the first failure
    pub fn close(mut self) -> Result<()> {
        self.restore()
    }

    fn restore(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;

        let mut stdout = io::stdout();

        if self.keyboard_enhanced {
            let _ = execute!(stdout, PopKeyboardEnhancementFlags);
        }

        // Reset attributes, then undo the modes in reverse order
        let _ = execute!(stdout, ResetColor, SetAttribute(Attribute::Reset));
        let _ = execute!(stdout, Clear(ClearType::All), Show, EnableLineWrap);
        let _ = execute!(stdout, DisableMouseCapture);
        let _ = execute!(stdout, LeaveAlternateScreen);

        if let Some((cols, rows)) = self.previous_size {
            if (cols, rows) != (self.width, self.height) {
                let _ = execute!(stdout, SetSize(cols, rows));
            }
        }
        let _ = stdout.flush();

        // Disable raw mode - this is the most important part
        terminal::disable_raw_mode()?;

        #[cfg(windows)]
        self.input_mode.release();

        debug!("session closed");
        Ok(())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            error!("Failed to restore terminal: {}", e);
        }
    }
}

/// Windows console input mode handling
#[cfg(windows)]
mod console_mode {
    use tracing::debug;
    use windows::Win32::System::Console::{
        GetConsoleMode, GetStdHandle, SetConsoleMode, CONSOLE_MODE, ENABLE_EXTENDED_FLAGS,
        ENABLE_MOUSE_INPUT, ENABLE_QUICK_EDIT_MODE, ENABLE_WINDOW_INPUT, STD_INPUT_HANDLE,
    };

    /// Saved input mode, written back on `release` or drop
    pub struct InputModeGuard {
        saved: Option<CONSOLE_MODE>,
    }

    impl InputModeGuard {
        /// Disable Quick Edit mode so clicks reach the application as mouse
        /// events. Without a console there is nothing to restore.
        pub fn enable_mouse_input() -> Self {
            Self {
                saved: enable_mouse_input(),
            }
        }

        #[cfg(test)]
        pub fn saved(&self) -> Option<CONSOLE_MODE> {
            self.saved
        }

        pub fn release(&mut self) {
            if let Some(mode) = self.saved.take() {
                restore(mode);
            }
        }
    }

    impl Drop for InputModeGuard {
        fn drop(&mut self) {
            self.release();
        }
    }

    #[cfg(test)]
    fn current() -> Option<CONSOLE_MODE> {
        unsafe {
            let handle = GetStdHandle(STD_INPUT_HANDLE).ok()?;
            let mut mode = CONSOLE_MODE(0);
            GetConsoleMode(handle, &mut mode).ok()?;
            Some(mode)
        }
    }

    fn enable_mouse_input() -> Option<CONSOLE_MODE> {
        unsafe {
            let handle = GetStdHandle(STD_INPUT_HANDLE).ok()?;
            let mut mode = CONSOLE_MODE(0);
            GetConsoleMode(handle, &mut mode).ok()?;

            let new_mode = CONSOLE_MODE(
                (mode.0 & !ENABLE_QUICK_EDIT_MODE.0)
                    | ENABLE_EXTENDED_FLAGS.0
                    | ENABLE_MOUSE_INPUT.0
                    | ENABLE_WINDOW_INPUT.0,
            );
            match SetConsoleMode(handle, new_mode) {
                Ok(_) => debug!("console mode 0x{:08X} -> 0x{:08X}", mode.0, new_mode.0),
                Err(e) => debug!("SetConsoleMode failed: {:?}", e),
            }
            Some(mode)
        }
    }

    fn restore(mode: CONSOLE_MODE) {
        unsafe {
            if let Ok(handle) = GetStdHandle(STD_INPUT_HANDLE) {
                let _ = SetConsoleMode(handle, mode);
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_guard_restores_mode_on_drop() {
            let guard = InputModeGuard::enable_mouse_input();
            let Some(before) = guard.saved() else {
                // No console attached (e.g. redirected test runner)
                return;
            };
            drop(guard);
            assert_eq!(current(), Some(before));
        }
    }
}
