//! Score module: fruit counter plus an elapsed-seconds clock driven by a
//! self-rescheduling one-second delay.
//!
//! The clock chain starts on `game_start` and is cancelled on `game_end`;
//! each firing schedules the next, so the scheduler always holds at most one
//! pending entry for it.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Result;

use crate::app::App;
use crate::delays::DelayId;
use crate::events::EventKind;
use crate::term::view;

pub struct ScoreModule {
    score: u32,
    seconds: u32,
    timer: Option<DelayId>,
}

impl ScoreModule {
    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn seconds(&self) -> u32 {
        self.seconds
    }
}

/// Schedule the next second tick and remember its handle.
fn schedule_clock(app: &mut App, module: &Rc<RefCell<ScoreModule>>) {
    let m = module.clone();
    let id = app.schedule(1.0, move |app| {
        m.borrow_mut().seconds += 1;
        schedule_clock(app, &m);
        Ok(())
    });
    module.borrow_mut().timer = Some(id);
}

pub fn setup(app: &mut App) -> Result<Rc<RefCell<ScoreModule>>> {
    let module = Rc::new(RefCell::new(ScoreModule {
        score: 0,
        seconds: 0,
        timer: None,
    }));

    let m = module.clone();
    app.subscribe(EventKind::Load, "score", move |app, _| {
        let m = m.clone();
        app.register_drawer("score", "score", move |fb| {
            let module = m.borrow();
            view::draw_hud(module.score, module.seconds, fb);
        })?;
        Ok(())
    })?;

    let m = module.clone();
    app.subscribe(EventKind::FruitEaten, "score", move |_, _| {
        m.borrow_mut().score += 1;
        Ok(())
    })?;

    let m = module.clone();
    app.subscribe(EventKind::GameStart, "score", move |app, _| {
        let stale = {
            let mut module = m.borrow_mut();
            module.score = 0;
            module.seconds = 0;
            module.timer.take()
        };
        if let Some(id) = stale {
            app.cancel_delay(id);
        }
        schedule_clock(app, &m);
        Ok(())
    })?;

    let m = module.clone();
    app.subscribe(EventKind::GameEnd, "score", move |app, _| {
        let timer = m.borrow_mut().timer.take();
        if let Some(id) = timer {
            app.cancel_delay(id);
        }
        Ok(())
    })?;

    Ok(module)
}
