//! Snake state machine: sub-grid interpolated movement, buffered turns,
//! collision detection and growth.
//!
//! The core [`Snake`] is pure and deterministic - it never touches the bus.
//! Each tick reports a [`TickOutcome`] and the module wiring at the bottom of
//! this file turns outcomes into events, creates a fresh snake on
//! `game_start` and applies fruit growth on `fruit_eaten`.
//!
//! # Body representation
//!
//! The head is a real-valued position whose integer part is the committed
//! grid cell. Body nodes store a *relative* unit offset from their
//! predecessor (the head for the first node), so a committed step shifts the
//! whole chain by copying offsets tailward instead of recomputing absolute
//! cells. Every node offset is a unit vector on exactly one axis; `(0, 0)`
//! never survives a committed step.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Result;
use crossterm::event::KeyCode;
use thiserror::Error;

use crate::app::{App, InputKind};
use crate::events::{EventKind, GameEvent};
use crate::types::{Direction, Playground, DISP_PRECISION};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SnakeError {
    #[error("cannot shrink an empty snake")]
    EmptyBody,
}

/// One body segment, as a unit offset from its predecessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnakeNode {
    pub dx: i32,
    pub dy: i32,
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Inactive (paused or ended), or committed to the idle direction.
    Idle,
    /// Sub-cell displacement only; the head is between cells.
    Advanced,
    /// A grid step committed at the given cell; the body shifted.
    Stepped { x: i32, y: i32 },
    /// Self or boundary collision; the snake is now inactive for good.
    Collided,
}

#[derive(Debug, Clone)]
pub struct Snake {
    nodes: Vec<SnakeNode>,
    x: f64,
    y: f64,
    direction: Direction,
    next_direction: Direction,
    speed: f64,
    min_speed: f64,
    active: bool,
}

impl Snake {
    pub fn new(x: i32, y: i32, speed: f64, min_speed: f64) -> Self {
        let mut snake = Self {
            nodes: Vec::new(),
            x: x as f64,
            y: y as f64,
            direction: Direction::Right,
            next_direction: Direction::Right,
            speed: min_speed,
            min_speed,
            active: true,
        };
        snake.set_speed(speed);
        snake
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    /// The committed grid cell (integer part of the head position).
    pub fn head_cell(&self) -> (i32, i32) {
        (self.x.trunc() as i32, self.y.trunc() as i32)
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn next_direction(&self) -> Direction {
        self.next_direction
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Set the movement speed, clamped to the configured floor.
    pub fn set_speed(&mut self, speed: f64) {
        self.speed = speed.max(self.min_speed);
    }

    pub fn active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[SnakeNode] {
        &self.nodes
    }

    /// Buffer a turn. Only takes effect at the next grid alignment, and only
    /// if perpendicular to the current committed direction - a reversal into
    /// the snake's own neck is dropped here, not deferred.
    pub fn buffer_turn(&mut self, requested: Direction) {
        let accepted = match requested {
            Direction::Up | Direction::Down => self.direction.is_horizontal(),
            Direction::Left | Direction::Right => self.direction.is_vertical(),
            Direction::None => false,
        };
        if accepted {
            self.next_direction = requested;
        }
    }

    /// Append a tail node mirroring the current tail offset. An empty snake
    /// is seeded with `(-1, 0)` so the very first segment already satisfies
    /// the unit-offset invariant.
    pub fn increment(&mut self) {
        let node = match self.nodes.last() {
            Some(tail) => *tail,
            None => SnakeNode { dx: -1, dy: 0 },
        };
        self.nodes.push(node);
    }

    /// Drop the tail node.
    pub fn decrement(&mut self) -> Result<(), SnakeError> {
        match self.nodes.pop() {
            Some(_) => Ok(()),
            None => Err(SnakeError::EmptyBody),
        }
    }

    /// Advance one tick. At grid alignment this commits the buffered turn,
    /// checks collision against the about-to-be-committed configuration,
    /// shifts the body and then applies displacement; between cells only the
    /// displacement accumulates.
    pub fn tick(&mut self, playground: Playground) -> TickOutcome {
        if !self.active {
            return TickOutcome::Idle;
        }

        if self.is_aligned() {
            self.direction = self.next_direction;
            if self.direction == Direction::None {
                return TickOutcome::Idle;
            }

            if self.hits_self() || !playground.contains(self.x, self.y) {
                self.active = false;
                return TickOutcome::Collided;
            }

            self.shift_body();
            let (x, y) = self.head_cell();
            self.displace();
            return TickOutcome::Stepped { x, y };
        }

        self.displace();
        TickOutcome::Advanced
    }

    /// Truncation (not floor) keeps the first sub-cell step past the min
    /// boundary "aligned", so the boundary check runs immediately on that
    /// edge; the max edge collides on the next whole cell.
    fn is_aligned(&self) -> bool {
        self.x - self.x.trunc() <= DISP_PRECISION && self.y - self.y.trunc() <= DISP_PRECISION
    }

    /// Walk the body accumulating offsets from the head; any node landing on
    /// the head cell is a self-collision. Runs before the body shift, on the
    /// configuration about to be committed.
    fn hits_self(&self) -> bool {
        let (mut x, mut y) = (self.x, self.y);
        for node in &self.nodes {
            x += node.dx as f64;
            y += node.dy as f64;
            if x == self.x && y == self.y {
                return true;
            }
        }
        false
    }

    /// Shift every offset one position tailward, then point the first node
    /// at the cell the head just left: the unit offset opposite the newly
    /// committed direction.
    fn shift_body(&mut self) {
        for i in (1..self.nodes.len()).rev() {
            self.nodes[i] = self.nodes[i - 1];
        }
        if let (Some(first), Some((dx, dy))) =
            (self.nodes.first_mut(), self.direction.trailing_offset())
        {
            first.dx = dx;
            first.dy = dy;
        }
    }

    fn displace(&mut self) {
        match self.direction {
            Direction::Up => self.y -= self.speed,
            Direction::Right => self.x += self.speed,
            Direction::Down => self.y += self.speed,
            Direction::Left => self.x -= self.speed,
            Direction::None => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Module wiring
// ---------------------------------------------------------------------------

/// Owner of the live snake instance. A new instance is created per game; a
/// collided one is never reactivated.
pub struct SnakeModule {
    snake: Option<Rc<RefCell<Snake>>>,
}

impl SnakeModule {
    /// The live snake, if a game has started.
    pub fn snake(&self) -> Option<Rc<RefCell<Snake>>> {
        self.snake.clone()
    }
}

fn direction_for_key(code: KeyCode) -> Option<Direction> {
    match code {
        KeyCode::Up => Some(Direction::Up),
        KeyCode::Right => Some(Direction::Right),
        KeyCode::Down => Some(Direction::Down),
        KeyCode::Left => Some(Direction::Left),
        _ => None,
    }
}

/// Subscribe the snake module: a fresh snake (and its tick listener, key
/// handler and drawer) per `game_start`, pause/resume toggling, and growth
/// on `fruit_eaten`.
pub fn setup(app: &mut App) -> Result<Rc<RefCell<SnakeModule>>> {
    let module = Rc::new(RefCell::new(SnakeModule { snake: None }));

    let m = module.clone();
    app.subscribe(EventKind::GameStart, "snake", move |app, _| {
        let replaced = m.borrow_mut().snake.take().is_some();
        if replaced {
            app.unregister_drawer("snake", "snake")?;
            app.unregister_tick_listener("snake")?;
            app.unregister_input_handler(InputKind::KeyPress, "snake")?;
        }

        let config = app.config();
        let (start_x, start_y) = config.snake_start;
        let snake = Rc::new(RefCell::new(Snake::new(
            start_x,
            start_y,
            config.snake_speed,
            config.min_speed,
        )));
        for _ in 0..config.snake_length {
            snake.borrow_mut().increment();
        }
        m.borrow_mut().snake = Some(snake.clone());

        let s = snake.clone();
        app.register_tick_listener("snake", move |app| {
            let playground = app.config().playground;
            let outcome = s.borrow_mut().tick(playground);
            match outcome {
                TickOutcome::Stepped { x, y } => app.fire(GameEvent::SnakeStep { x, y }),
                TickOutcome::Collided => app.fire(GameEvent::GameEnd),
                TickOutcome::Idle | TickOutcome::Advanced => {}
            }
            Ok(())
        })?;

        let s = snake.clone();
        app.register_input_handler(InputKind::KeyPress, "snake", move |_, key| {
            if let Some(direction) = direction_for_key(key.code) {
                s.borrow_mut().buffer_turn(direction);
            }
            Ok(())
        })?;

        let s = snake;
        app.register_drawer("snake", "snake", move |fb| {
            crate::term::view::draw_snake(&s.borrow(), fb);
        })?;

        Ok(())
    })?;

    let m = module.clone();
    app.subscribe(EventKind::GamePause, "snake", move |_, _| {
        if let Some(snake) = m.borrow().snake.as_ref() {
            snake.borrow_mut().set_active(false);
        }
        Ok(())
    })?;

    let m = module.clone();
    app.subscribe(EventKind::GameResume, "snake", move |_, _| {
        if let Some(snake) = m.borrow().snake.as_ref() {
            snake.borrow_mut().set_active(true);
        }
        Ok(())
    })?;

    // Growth stays with the body's owner; fruit modules only announce the
    // pickup.
    let m = module.clone();
    app.subscribe(EventKind::FruitEaten, "snake", move |_, event| {
        let GameEvent::FruitEaten { kind, .. } = *event else {
            return Ok(());
        };
        let snake = m.borrow().snake.clone();
        if let Some(snake) = snake {
            let increments = kind.increments();
            let mut snake = snake.borrow_mut();
            if increments >= 0 {
                for _ in 0..increments {
                    snake.increment();
                }
            } else {
                for _ in 0..increments.unsigned_abs() {
                    snake.decrement()?;
                }
            }
        }
        Ok(())
    })?;

    Ok(module)
}
