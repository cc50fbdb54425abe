//! Keyboard front end: game lifecycle controls and the status banner.
//!
//! Enter starts a new game while none is running, Escape toggles
//! pause/resume during a run, and `q` (or Ctrl-C) quits the loop. The module
//! tracks `paused`/`finished` from the lifecycle events it also helps
//! produce, and a top-layer drawer renders the matching banner.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, InputKind};
use crate::events::{EventKind, GameEvent};
use crate::term::view;

pub struct UiModule {
    paused: bool,
    finished: bool,
}

impl UiModule {
    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn finished(&self) -> bool {
        self.finished
    }
}

fn should_quit(key: &KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q'))
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

enum UiAction {
    Start,
    Pause,
    Resume,
    Quit,
}

pub fn setup(app: &mut App) -> Result<Rc<RefCell<UiModule>>> {
    let module = Rc::new(RefCell::new(UiModule {
        paused: false,
        finished: true,
    }));

    let m = module.clone();
    app.subscribe(EventKind::Load, "ui", move |app, _| {
        let handler_state = m.clone();
        app.register_input_handler(InputKind::KeyPress, "ui", move |app, key| {
            let action = {
                let state = handler_state.borrow();
                if should_quit(key) {
                    Some(UiAction::Quit)
                } else {
                    match key.code {
                        KeyCode::Enter if state.finished => Some(UiAction::Start),
                        KeyCode::Esc if !state.finished => {
                            if state.paused {
                                Some(UiAction::Resume)
                            } else {
                                Some(UiAction::Pause)
                            }
                        }
                        _ => None,
                    }
                }
            };
            match action {
                Some(UiAction::Start) => app.fire(GameEvent::GameStart),
                Some(UiAction::Pause) => app.fire(GameEvent::GamePause),
                Some(UiAction::Resume) => app.fire(GameEvent::GameResume),
                Some(UiAction::Quit) => app.quit(),
                None => {}
            }
            Ok(())
        })?;

        let banner_state = m.clone();
        app.register_drawer("gui", "ui", move |fb| {
            let state = banner_state.borrow();
            if state.finished {
                view::draw_banner("PRESS ENTER TO START", fb);
            } else if state.paused {
                view::draw_banner("PAUSED - ESC TO RESUME", fb);
            }
        })?;
        Ok(())
    })?;

    let m = module.clone();
    app.subscribe(EventKind::GameStart, "ui", move |_, _| {
        let mut state = m.borrow_mut();
        state.finished = false;
        state.paused = false;
        Ok(())
    })?;

    let m = module.clone();
    app.subscribe(EventKind::GameEnd, "ui", move |_, _| {
        m.borrow_mut().finished = true;
        Ok(())
    })?;

    let m = module.clone();
    app.subscribe(EventKind::GamePause, "ui", move |_, _| {
        m.borrow_mut().paused = true;
        Ok(())
    })?;

    let m = module.clone();
    app.subscribe(EventKind::GameResume, "ui", move |_, _| {
        m.borrow_mut().paused = false;
        Ok(())
    })?;

    Ok(module)
}
