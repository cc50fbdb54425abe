//! Terminal snake runner.
//!
//! Owns the real-time rhythm: crossterm input polling with a timeout that
//! expires at the next tick boundary, one simulation step per tick, then a
//! frame flush. The loop never runs extra steps to catch up; frames simply
//! arrive no faster than the configured tickrate.

use std::fs::File;
use std::sync::Mutex;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::Result;
use crossterm::event::{self, Event};
use tracing_subscriber::EnvFilter;

use tui_snake::app::App;
use tui_snake::events::GameEvent;
use tui_snake::modules::register_all;
use tui_snake::term::view;
use tui_snake::term::{Cell, FrameBuffer, TerminalRenderer};
use tui_snake::types::{GameConfig, RENDER_ORDER};

const LOG_FILE: &str = "tui-snake.log";

fn main() -> Result<()> {
    init_logging()?;

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term);

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

/// Log to a file; stdout belongs to the renderer while the game runs.
fn init_logging() -> Result<()> {
    let file = File::create(LOG_FILE)?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn clock_seed() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
        .unwrap_or(1)
}

fn run(term: &mut TerminalRenderer) -> Result<()> {
    let config = GameConfig::default();
    let mut app = App::new(config, RENDER_ORDER);
    let _modules = register_all(&mut app, clock_seed())?;

    app.fire(GameEvent::Load);
    app.fire(GameEvent::GameStart);

    let (width, height) = view::canvas_size(config.playground);
    let mut fb = FrameBuffer::new(width, height);

    let tick_duration = Duration::from_millis(1000 / config.tickrate as u64);
    let mut last_tick = Instant::now();

    while app.running() {
        // Input with timeout until the next tick.
        let timeout = tick_duration
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                app.dispatch_input(&key);
            }
        }

        // Tick, then draw the committed state.
        if last_tick.elapsed() >= tick_duration {
            last_tick = Instant::now();
            app.step();

            fb.clear(Cell::default());
            app.draw(&mut fb);
            term.draw(&fb)?;
        }
    }

    Ok(())
}
