//! Core types shared across the application.
//!
//! Pure data: timing and playground constants, the movement directions, and
//! the scalar configuration every component consumes. Nothing here performs
//! I/O or depends on the terminal.

/// Simulation rate in ticks per second. All timing in the game (delays,
/// snake speed) is expressed in ticks of this rate.
pub const TICKRATE: u32 = 60;

/// Playground bounds in grid cells, inclusive on both ends.
pub const FIELD_MIN_X: i32 = 0;
pub const FIELD_MAX_X: i32 = 39;
pub const FIELD_MIN_Y: i32 = 0;
pub const FIELD_MAX_Y: i32 = 19;

/// Snake movement, in cells per tick.
pub const MIN_SPEED: f64 = 0.125;
pub const DEFAULT_SPEED: f64 = MIN_SPEED * 2.0;

/// Sub-cell displacement at or below this threshold counts as grid-aligned.
pub const DISP_PRECISION: f64 = 0.0;

/// Initial snake placement.
pub const INIT_X: i32 = 20;
pub const INIT_Y: i32 = 10;
pub const INIT_LENGTH: u32 = 3;

/// Draw layers, bottom to top. Drawers register against one of these ids and
/// the application invokes them in this order every frame.
pub const RENDER_ORDER: &[&str] = &["field", "fruit", "snake", "score", "gui"];

/// Movement directions on the grid. `None` is the idle direction; a snake
/// never commits to it once moving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    None,
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::Up | Direction::Down)
    }

    /// Unit offset pointing from the head to the cell directly behind it
    /// when travelling in this direction. `None` has no trailing cell.
    pub fn trailing_offset(self) -> Option<(i32, i32)> {
        match self {
            Direction::Up => Some((0, 1)),
            Direction::Right => Some((-1, 0)),
            Direction::Down => Some((0, -1)),
            Direction::Left => Some((1, 0)),
            Direction::None => None,
        }
    }
}

/// Rectangular playground, inclusive bounds on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Playground {
    pub minx: i32,
    pub maxx: i32,
    pub miny: i32,
    pub maxy: i32,
}

impl Playground {
    pub fn width(&self) -> i32 {
        self.maxx - self.minx + 1
    }

    pub fn height(&self) -> i32 {
        self.maxy - self.miny + 1
    }

    /// Whether a (possibly sub-cell) head position is inside the bounds.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.minx as f64
            && x <= self.maxx as f64
            && y >= self.miny as f64
            && y <= self.maxy as f64
    }
}

/// Scalar configuration consumed by the core. One value owns every knob, so
/// independent game instances (and tests) can run with different settings.
#[derive(Debug, Clone, Copy)]
pub struct GameConfig {
    pub tickrate: u32,
    pub playground: Playground,
    pub min_speed: f64,
    pub snake_speed: f64,
    pub snake_start: (i32, i32),
    pub snake_length: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tickrate: TICKRATE,
            playground: Playground {
                minx: FIELD_MIN_X,
                maxx: FIELD_MAX_X,
                miny: FIELD_MIN_Y,
                maxy: FIELD_MAX_Y,
            },
            min_speed: MIN_SPEED,
            snake_speed: DEFAULT_SPEED,
            snake_start: (INIT_X, INIT_Y),
            snake_length: INIT_LENGTH,
        }
    }
}

/// The closed set of fruit variants. Every kind grows the snake by its
/// `increments` when eaten; a negative value would shrink it instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FruitKind {
    Apple,
    Apricot,
    Cherry,
    Kiwi,
    Pear,
    Strawberry,
}

/// All spawnable kinds, the selection pool for the fruit module.
pub const FRUIT_KINDS: [FruitKind; 6] = [
    FruitKind::Apple,
    FruitKind::Apricot,
    FruitKind::Cherry,
    FruitKind::Kiwi,
    FruitKind::Pear,
    FruitKind::Strawberry,
];

impl FruitKind {
    /// Body-node delta applied to the snake on pickup.
    pub fn increments(self) -> i32 {
        1
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FruitKind::Apple => "apple",
            FruitKind::Apricot => "apricot",
            FruitKind::Cherry => "cherry",
            FruitKind::Kiwi => "kiwi",
            FruitKind::Pear => "pear",
            FruitKind::Strawberry => "strawberry",
        }
    }
}
