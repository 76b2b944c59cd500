//! Paint application
//!
//! Left drag paints with the selected colour, right drag erases. Holding
//! Shift turns a drag into a line, Ctrl into a rectangle; the shape is
//! previewed while dragging and committed on release. Every discrete action
//! (stroke, shape, clear) opens an undo step; Ctrl+Z walks back.

use tracing::debug;

use super::{App, Flow, Result};
use crate::core::{Attr, Surface};
use crate::history::HistoryRing;
use crate::input::{vk, InputEvent, InputState, InputTracker, MouseButton};

/// Number of selectable colours (indices 1 to 15)
const COLOURS: u8 = 15;
/// Border and tooltip background
const CHROME: u8 = 0x8;
/// White on grey
const TOOLTIP: Attr = Attr(0x8F);
/// Left edge of the palette strip
const PALETTE_X: i32 = 43;
const UNDO_KEY: Option<u8> = vk::key('z');

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tool {
    Line,
    Rect,
}

impl Tool {
    /// Shift selects the line tool, Ctrl the rectangle tool
    fn held(state: &InputState) -> Option<Tool> {
        if state.is_key_pressed(vk::SHIFT) {
            Some(Tool::Line)
        } else if state.is_key_pressed(vk::CONTROL) {
            Some(Tool::Rect)
        } else {
            None
        }
    }

    fn draw(self, surface: &mut Surface, from: (i32, i32), to: (i32, i32), brush: (u8, Attr)) {
        let (ch, attr) = brush;
        match self {
            Tool::Line => surface.draw_line(from.0, from.1, to.0, to.1, ch, attr),
            Tool::Rect => {
                surface.draw_rect(from.0, from.1, to.0 - from.0 + 1, to.1 - from.1 + 1, ch, attr)
            }
        }
    }
}

pub struct Paint {
    history: HistoryRing,
    title: String,
    /// Selected colour minus one (0..COLOURS)
    selected: u8,
    /// Anchor of the shape being dragged
    shape_start: (i32, i32),
    drawing_shape: bool,
    /// A freehand stroke is in progress (its undo step is already open)
    stroke_active: bool,
}

impl Paint {
    pub fn new(width: u16, height: u16, depth: usize, title: impl Into<String>) -> Result<Self> {
        Ok(Self {
            history: HistoryRing::blank(width, height, depth)?,
            title: title.into(),
            selected: COLOURS - 1,
            shape_start: (0, 0),
            drawing_shape: false,
            stroke_active: false,
        })
    }

    /// The drawing without chrome or previews
    pub fn drawing(&self) -> &Surface {
        self.history.live()
    }

    /// Selected colour index (1-15)
    pub fn colour(&self) -> u8 {
        self.selected + 1
    }

    fn brush(&self, erase: bool) -> (u8, Attr) {
        if erase {
            (0, Attr::NONE)
        } else {
            (b' ', Attr::bg(self.colour()))
        }
    }

    fn handle_events(&mut self, input: &mut InputTracker) -> Flow {
        let mut flow = Flow::Continue;
        while let Some(event) = input.poll() {
            let InputEvent::Key(key) = event else {
                continue;
            };
            match (key.code, key.down) {
                (vk::ESCAPE, true) => flow = Flow::Quit,
                (vk::SPACE, true) => {
                    self.history.commit();
                    self.history.live_mut().clear(0, Attr::NONE);
                    // Paint after the clear opens its own undo step
                    self.stroke_active = false;
                    debug!("drawing cleared");
                }
                (vk::LEFT, true) => self.selected = (self.selected + COLOURS - 1) % COLOURS,
                (vk::RIGHT, true) => self.selected = (self.selected + 1) % COLOURS,
                (code, true)
                    if Some(code) == UNDO_KEY && input.state().is_key_pressed(vk::CONTROL) =>
                {
                    self.history.undo();
                    self.drawing_shape = false;
                    self.stroke_active = false;
                    debug!("undo");
                }
                (vk::SHIFT | vk::CONTROL, false) => self.drawing_shape = false,
                _ => {}
            }
        }
        flow
    }

    fn update_drawing(&mut self, state: &InputState) {
        let (mx, my) = state.mouse_position();
        let mouse = (mx as i32, my as i32);

        if let Some(tool) = Tool::held(state) {
            if state.just_pressed(MouseButton::Left) || state.just_pressed(MouseButton::Right) {
                self.shape_start = mouse;
                self.drawing_shape = true;
                self.stroke_active = false;
            } else if state.just_released(MouseButton::Left)
                || state.just_released(MouseButton::Right)
            {
                if self.drawing_shape {
                    let brush = self.brush(state.just_released(MouseButton::Right));
                    self.history.commit();
                    tool.draw(self.history.live_mut(), self.shape_start, mouse, brush);
                    debug!(?tool, from = ?self.shape_start, to = ?mouse, "shape committed");
                }
                self.drawing_shape = false;
            }
        }

        if self.drawing_shape {
            return;
        }

        let background = if state.is_pressed(MouseButton::Left) {
            Some(self.colour())
        } else if state.is_pressed(MouseButton::Right) {
            Some(0)
        } else {
            None
        };

        match background {
            Some(bg) => {
                if !self.stroke_active {
                    self.history.commit();
                    self.stroke_active = true;
                }
                let drawing = self.history.live_mut();
                drawing.set_char(mouse.0, mouse.1, 0);
                drawing.set_background(mouse.0, mouse.1, bg);
            }
            None => self.stroke_active = false,
        }
    }

    fn draw_preview(&self, state: &InputState, screen: &mut Surface) {
        if !self.drawing_shape {
            return;
        }
        let Some(tool) = Tool::held(state) else {
            return;
        };
        let (mx, my) = state.mouse_position();
        let brush = self.brush(state.is_pressed(MouseButton::Right));
        tool.draw(screen, self.shape_start, (mx as i32, my as i32), brush);
    }

    fn draw_chrome(&self, screen: &mut Surface) {
        let width = screen.width() as i32;
        let height = screen.height() as i32;

        // Border
        for x in 0..width {
            for y in [0, height - 2, height - 1] {
                screen.set_char(x, y, b' ');
                screen.set_background(x, y, CHROME);
            }
        }
        for y in 0..height {
            for x in [0, width - 1] {
                screen.set_char(x, y, b' ');
                screen.set_background(x, y, CHROME);
            }
        }

        let title_len = self.title.chars().count() as i32;
        screen.draw_text(&self.title, width / 2 - title_len / 2, 0, TOOLTIP);

        let undo_hint = "Ctrl+Z to undo";
        screen.draw_text(undo_hint, width - 1 - undo_hint.len() as i32, 0, TOOLTIP);
        screen.draw_text("Space to clear", 0, height - 2, TOOLTIP);
        screen.draw_text("Escape to quit", 0, height - 1, TOOLTIP);
        screen.draw_text("Shift for line tool", 18, height - 2, TOOLTIP);
        screen.draw_text("Ctrl for rect tool", 18, height - 1, TOOLTIP);

        // Palette strip with selection marker
        let strip_y = height - 2;
        screen.set_char(PALETTE_X, strip_y, b'<');
        screen.set_foreground(PALETTE_X, strip_y, 0xF);
        screen.set_char(PALETTE_X + 33, strip_y, b'>');
        screen.set_foreground(PALETTE_X + 33, strip_y, 0xF);

        for i in 1..=COLOURS {
            let x = PALETTE_X + i as i32 * 2;
            for dx in 0..2 {
                screen.set_char(x + dx, strip_y, b' ');
                screen.set_background(x + dx, strip_y, i);
            }
            if self.colour() == i {
                screen.set_char(x, height - 1, b'^');
                screen.set_foreground(x, height - 1, 0xF);
            }
        }
    }

    fn draw_cursor(state: &InputState, screen: &mut Surface) {
        let (mx, my) = state.mouse_position();
        let colour = if state.is_pressed(MouseButton::Left) {
            15
        } else if state.is_pressed(MouseButton::Right) {
            4
        } else {
            7
        };
        screen.set_char(mx as i32, my as i32, b' ');
        screen.set_background(mx as i32, my as i32, colour);
    }
}

impl App for Paint {
    fn frame(&mut self, input: &mut InputTracker, screen: &mut Surface) -> Result<Flow> {
        if self.handle_events(input) == Flow::Quit {
            return Ok(Flow::Quit);
        }

        let state = input.state();
        self.update_drawing(state);

        screen.copy_from(self.history.live())?;
        self.draw_preview(state, screen);
        self.draw_chrome(screen);
        Self::draw_cursor(state, screen);

        Ok(Flow::Continue)
    }
}
