//! TUI Snake: a fixed-tickrate snake simulation behind a typed event bus.
//!
//! The core is three tightly coupled pieces:
//!
//! - [`events`]: a typed publish/subscribe bus - the only way modules talk
//!   to each other
//! - [`delays`]: the tick counter and one-shot deferred callbacks
//! - [`snake`]: the snake state machine - sub-grid interpolated movement,
//!   buffered turns, collision detection, growth
//!
//! [`app`] holds it all together: one `App` value owns the bus, the
//! scheduler and the tick-listener / input-handler / drawer registries, and
//! is threaded `&mut` through every callback. Nothing is global; tests build
//! as many independent instances as they like.
//!
//! The remaining modules are the collaborators wired over the bus:
//! [`fruits`], [`score`], [`field`] and [`ui`], bootstrapped by
//! [`modules::register_all`]. [`term`] is the terminal presentation layer
//! used by the binary.

pub mod app;
pub mod delays;
pub mod events;
pub mod field;
pub mod fruits;
pub mod modules;
pub mod score;
pub mod snake;
pub mod term;
pub mod types;
pub mod ui;
