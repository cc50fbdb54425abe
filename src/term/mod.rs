//! Terminal presentation layer: framebuffer, game view mapping and the
//! renderer that flushes frames to the terminal.

pub mod fb;
pub mod renderer;
pub mod view;

pub use fb::{Cell, CellStyle, FrameBuffer, Rgb};
pub use renderer::TerminalRenderer;
