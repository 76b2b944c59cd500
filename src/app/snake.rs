//! Snake
//!
//! The board is half the screen width: every board cell is drawn two
//! columns wide so it looks square. WASD steers, the edges wrap, apples grow
//! the snake by one, and running into the body ends the game.

use std::collections::VecDeque;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, info};

use super::{App, Flow, Result};
use crate::core::{Attr, Surface};
use crate::input::{vk, InputEvent, InputTracker};

pub const INITIAL_LENGTH: usize = 4;
pub const MAX_LENGTH: usize = 256;
/// Frames between moves
pub const DEFAULT_STEP_FRAMES: u32 = 6;

const APPLE: Attr = Attr::bg(0x4);
const BODY: Attr = Attr::bg(0x2);
const TEXT: Attr = Attr(0x0F);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Right,
    Down,
    Left,
    Up,
}

impl Direction {
    fn opposite(self) -> Direction {
        match self {
            Direction::Right => Direction::Left,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Up => Direction::Down,
        }
    }

    fn from_key(code: u8) -> Option<Direction> {
        const W: Option<u8> = vk::key('w');
        const A: Option<u8> = vk::key('a');
        const S: Option<u8> = vk::key('s');
        const D: Option<u8> = vk::key('d');
        match Some(code) {
            W => Some(Direction::Up),
            A => Some(Direction::Left),
            S => Some(Direction::Down),
            D => Some(Direction::Right),
            _ => None,
        }
    }
}

/// Board position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pos {
    pub x: i32,
    pub y: i32,
}

impl Pos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// xorshift64 generator for apple placement
#[derive(Debug, Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        // Zero is a fixed point of xorshift
        Self(seed.max(1))
    }

    fn next(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    fn below(&mut self, bound: i32) -> i32 {
        (self.next() % bound.max(1) as u64) as i32
    }
}

pub struct Snake {
    cols: i32,
    rows: i32,
    /// Head first
    body: VecDeque<Pos>,
    direction: Direction,
    apple: Pos,
    rng: Rng,
    step_frames: u32,
    tick: u32,
    game_over: bool,
}

impl Snake {
    /// Game for a `width` x `height` screen, apples placed from `seed`
    pub fn new(width: u16, height: u16, seed: u64) -> Self {
        let cols = (width as i32 / 2).max(1);
        let rows = (height as i32).max(1);

        let body = (0..INITIAL_LENGTH as i32)
            .map(|i| Pos::new((cols / 2 - i).rem_euclid(cols), rows / 2))
            .collect();

        let mut rng = Rng::new(seed);
        let apple = Pos::new(rng.below(cols), rng.below(rows));

        debug!(cols, rows, seed, "snake board created");
        Self {
            cols,
            rows,
            body,
            direction: Direction::Right,
            apple,
            rng,
            step_frames: DEFAULT_STEP_FRAMES,
            tick: 0,
            game_over: false,
        }
    }

    /// Game seeded from the clock
    pub fn seeded_from_clock(width: u16, height: u16) -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(1);
        Self::new(width, height, seed)
    }

    /// Move once every `frames` frames
    pub fn with_step_frames(mut self, frames: u32) -> Self {
        self.step_frames = frames.max(1);
        self
    }

    pub fn score(&self) -> usize {
        self.body.len() - INITIAL_LENGTH
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn head(&self) -> Pos {
        self.body[0]
    }

    pub fn body(&self) -> impl Iterator<Item = &Pos> + '_ {
        self.body.iter()
    }

    pub fn apple(&self) -> Pos {
        self.apple
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    fn wrap(&self, pos: Pos) -> Pos {
        Pos::new(pos.x.rem_euclid(self.cols), pos.y.rem_euclid(self.rows))
    }

    fn steer(&mut self, dir: Direction) {
        if dir != self.direction.opposite() {
            self.direction = dir;
        }
    }

    /// Advance the snake one cell
    fn step(&mut self) {
        let head = self.head();
        let next = match self.direction {
            Direction::Right => Pos::new(head.x + 1, head.y),
            Direction::Down => Pos::new(head.x, head.y + 1),
            Direction::Left => Pos::new(head.x - 1, head.y),
            Direction::Up => Pos::new(head.x, head.y - 1),
        };
        let next = self.wrap(next);

        self.body.pop_back();
        self.body.push_front(next);

        if self.body.iter().skip(1).any(|&p| p == next) {
            self.game_over = true;
            info!(score = self.score(), "game over");
        }

        if next == self.apple {
            self.apple = Pos::new(self.rng.below(self.cols), self.rng.below(self.rows));
            self.grow();
        }
    }

    /// Extend the tail one cell past its last segment
    fn grow(&mut self) {
        if self.body.len() >= MAX_LENGTH {
            return;
        }
        let len = self.body.len();
        let (last, before) = (self.body[len - 1], self.body[len - 2]);
        let tail = Pos::new(
            last.x + (last.x - before.x).signum(),
            last.y + (last.y - before.y).signum(),
        );
        let tail = self.wrap(tail);
        self.body.push_back(tail);
        debug!(length = self.body.len(), "snake grew");
    }

    fn draw(&self, screen: &mut Surface) {
        screen.clear(0, Attr::NONE);

        screen.draw_rect(self.apple.x * 2, self.apple.y, 2, 1, b' ', APPLE);
        for part in &self.body {
            screen.draw_rect(part.x * 2, part.y, 2, 1, b' ', BODY);
        }

        screen.draw_text("SCORE:", 0, 0, TEXT);
        screen.draw_text(&self.score().to_string(), 8, 0, TEXT);

        if self.game_over {
            let (width, height) = screen.size();
            screen.draw_text("Game Over!", width as i32 / 2 - 5, height as i32 / 2, TEXT);
        }
    }
}

impl App for Snake {
    fn frame(&mut self, input: &mut InputTracker, screen: &mut Surface) -> Result<Flow> {
        while let Some(event) = input.poll() {
            let InputEvent::Key(key) = event else {
                continue;
            };
            if !key.down {
                continue;
            }
            if key.code == vk::ESCAPE {
                return Ok(Flow::Quit);
            }
            if let Some(dir) = Direction::from_key(key.code) {
                self.steer(dir);
            }
        }

        self.tick += 1;
        if self.tick >= self.step_frames && !self.game_over {
            self.tick = 0;
            self.step();
        }

        self.draw(screen);
        Ok(Flow::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{KeyEvent, ScriptedSource};

    const W: u16 = 80;
    const H: u16 = 40;

    fn run_frames(snake: &mut Snake, frames: Vec<Vec<InputEvent>>) -> (Surface, Flow) {
        let mut source = ScriptedSource::new();
        for events in &frames {
            source.push_frame(events.clone());
        }
        let mut input = InputTracker::new(W, H);
        let mut screen = Surface::new(W, H).unwrap();
        let mut flow = Flow::Continue;
        for _ in 0..frames.len() {
            input.refresh(&mut source).unwrap();
            flow = snake.frame(&mut input, &mut screen).unwrap();
            if flow == Flow::Quit {
                break;
            }
        }
        (screen, flow)
    }

    fn press(ch: char) -> InputEvent {
        KeyEvent::down(vk::key(ch).unwrap()).into()
    }

    fn place(snake: &mut Snake, body: &[(i32, i32)], direction: Direction) {
        snake.body = body.iter().map(|&(x, y)| Pos::new(x, y)).collect();
        snake.direction = direction;
        snake.apple = Pos::new(0, 0);
    }

    #[test]
    fn test_initial_board() {
        let snake = Snake::new(W, H, 7);
        assert_eq!(snake.head(), Pos::new(20, 20));
        assert_eq!(snake.body().count(), INITIAL_LENGTH);
        assert_eq!(snake.body().last(), Some(&Pos::new(17, 20)));
        assert!(snake.apple().x < 40 && snake.apple().y < 40);
        assert_eq!(snake.score(), 0);
    }

    #[test]
    fn test_moves_every_step_frames() {
        let mut snake = Snake::new(W, H, 7).with_step_frames(3);
        snake.apple = Pos::new(0, 0);
        run_frames(&mut snake, vec![vec![]; 2]);
        assert_eq!(snake.head(), Pos::new(20, 20));
        run_frames(&mut snake, vec![vec![]]);
        assert_eq!(snake.head(), Pos::new(21, 20));
    }

    #[test]
    fn test_reverse_is_ignored() {
        let mut snake = Snake::new(W, H, 7).with_step_frames(1);
        snake.apple = Pos::new(0, 0);
        run_frames(&mut snake, vec![vec![press('a')]]);
        assert_eq!(snake.direction(), Direction::Right);
        assert_eq!(snake.head(), Pos::new(21, 20));

        run_frames(&mut snake, vec![vec![press('S')]]);
        assert_eq!(snake.head(), Pos::new(21, 21));
    }

    #[test]
    fn test_edges_wrap() {
        let mut snake = Snake::new(W, H, 7).with_step_frames(1);
        place(&mut snake, &[(0, 5), (1, 5), (2, 5), (3, 5)], Direction::Left);
        snake.apple = Pos::new(10, 10);
        run_frames(&mut snake, vec![vec![]]);
        assert_eq!(snake.head(), Pos::new(39, 5));

        place(&mut snake, &[(7, 0), (7, 1), (7, 2), (7, 3)], Direction::Up);
        snake.apple = Pos::new(10, 10);
        run_frames(&mut snake, vec![vec![]]);
        assert_eq!(snake.head(), Pos::new(7, 39));
    }

    #[test]
    fn test_apple_grows_tail() {
        let mut snake = Snake::new(W, H, 7).with_step_frames(1);
        place(&mut snake, &[(5, 5), (4, 5), (3, 5), (2, 5)], Direction::Right);
        snake.apple = Pos::new(6, 5);

        let (screen, _) = run_frames(&mut snake, vec![vec![]]);
        assert_eq!(snake.score(), 1);
        assert_eq!(snake.body().last(), Some(&Pos::new(2, 5)));

        assert_eq!(screen.get(12, 5).unwrap().attr, BODY);
        assert_eq!(screen.get(13, 5).unwrap().attr, BODY);
        assert_eq!(screen.get(8, 0).unwrap().ch, b'1');
    }

    #[test]
    fn test_self_collision_ends_game() {
        let mut snake = Snake::new(W, H, 7).with_step_frames(1);
        place(
            &mut snake,
            &[(5, 5), (5, 6), (4, 6), (4, 5), (4, 4)],
            Direction::Up,
        );
        snake.apple = Pos::new(30, 30);

        let (screen, _) = run_frames(&mut snake, vec![vec![press('a')]]);
        assert!(snake.is_game_over());
        assert_eq!(screen.get(35, 20).unwrap().ch, b'G');

        // Frozen after game over
        let head = snake.head();
        run_frames(&mut snake, vec![vec![], vec![]]);
        assert_eq!(snake.head(), head);
    }

    #[test]
    fn test_escape_quits() {
        let mut snake = Snake::new(W, H, 7);
        let (_, flow) = run_frames(&mut snake, vec![vec![KeyEvent::down(vk::ESCAPE).into()]]);
        assert_eq!(flow, Flow::Quit);
    }

    #[test]
    fn test_seeds_are_deterministic() {
        let a = Snake::new(W, H, 42);
        let b = Snake::new(W, H, 42);
        assert_eq!(a.apple(), b.apple());
        assert!(Snake::new(W, H, 0).apple().x < 40);
    }
}
