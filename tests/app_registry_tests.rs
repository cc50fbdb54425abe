//! Registry semantics of the application loop: ordering, identity and fault
//! isolation for tick listeners, input handlers and drawers.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::anyhow;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use tui_snake::app::{App, InputKind, RegistryError};
use tui_snake::term::FrameBuffer;
use tui_snake::types::{GameConfig, RENDER_ORDER};

fn test_app() -> App {
    App::new(GameConfig::default(), RENDER_ORDER)
}

fn recorder() -> Rc<RefCell<Vec<String>>> {
    Rc::new(RefCell::new(Vec::new()))
}

fn press(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

#[test]
fn test_tick_listeners_run_in_registration_order() {
    let mut app = test_app();
    let log = recorder();

    for id in ["first", "second", "third"] {
        let log = log.clone();
        app.register_tick_listener(id, move |_| {
            log.borrow_mut().push(id.to_string());
            Ok(())
        })
        .unwrap();
    }

    app.step();
    assert_eq!(*log.borrow(), ["first", "second", "third"]);
}

#[test]
fn test_faulting_tick_listener_does_not_abort_the_frame() {
    let mut app = test_app();
    let log = recorder();

    app.register_tick_listener("faulty", |_| Err(anyhow!("listener exploded")))
        .unwrap();
    let l = log.clone();
    app.register_tick_listener("healthy", move |_| {
        l.borrow_mut().push("healthy".into());
        Ok(())
    })
    .unwrap();

    app.step();
    app.step();
    assert_eq!(*log.borrow(), ["healthy", "healthy"]);
}

#[test]
fn test_listener_unregistering_itself_mid_step_still_finishes_the_step() {
    let mut app = test_app();
    let log = recorder();

    let l = log.clone();
    app.register_tick_listener("oneshot", move |app| {
        l.borrow_mut().push("oneshot".into());
        app.unregister_tick_listener("oneshot")?;
        Ok(())
    })
    .unwrap();
    let l = log.clone();
    app.register_tick_listener("steady", move |_| {
        l.borrow_mut().push("steady".into());
        Ok(())
    })
    .unwrap();

    app.step();
    app.step();
    assert_eq!(*log.borrow(), ["oneshot", "steady", "steady"]);
}

#[test]
fn test_input_handlers_receive_key_events_for_their_class() {
    let mut app = test_app();
    let log = recorder();

    let l = log.clone();
    app.register_input_handler(InputKind::KeyPress, "probe", move |_, key| {
        l.borrow_mut().push(format!("{:?}", key.code));
        Ok(())
    })
    .unwrap();

    app.dispatch_input(&press(KeyCode::Up));
    app.dispatch_input(&press(KeyCode::Enter));
    assert_eq!(*log.borrow(), ["Up", "Enter"]);
}

#[test]
fn test_terminal_auto_repeat_is_dropped() {
    let mut app = test_app();
    let log = recorder();

    let l = log.clone();
    app.register_input_handler(InputKind::KeyPress, "probe", move |_, _| {
        l.borrow_mut().push("press".into());
        Ok(())
    })
    .unwrap();

    let repeat =
        KeyEvent::new_with_kind(KeyCode::Up, KeyModifiers::NONE, KeyEventKind::Repeat);
    app.dispatch_input(&repeat);
    assert!(log.borrow().is_empty());
}

#[test]
fn test_duplicate_input_handler_rejected_per_class() {
    let mut app = test_app();
    app.register_input_handler(InputKind::KeyPress, "x", |_, _| Ok(()))
        .unwrap();
    let err = app
        .register_input_handler(InputKind::KeyPress, "x", |_, _| Ok(()))
        .unwrap_err();
    assert!(matches!(err, RegistryError::Duplicate { .. }));

    // The same id under the other class is distinct.
    app.register_input_handler(InputKind::KeyRelease, "x", |_, _| Ok(()))
        .unwrap();
}

#[test]
fn test_drawers_run_in_layer_order_not_registration_order() {
    let mut app = test_app();
    let log = recorder();

    let l = log.clone();
    app.register_drawer("gui", "banner", move |_| l.borrow_mut().push("gui".into()))
        .unwrap();
    let l = log.clone();
    app.register_drawer("snake", "snake", move |_| l.borrow_mut().push("snake".into()))
        .unwrap();
    let l = log.clone();
    app.register_drawer("field", "field", move |_| l.borrow_mut().push("field".into()))
        .unwrap();

    let mut fb = FrameBuffer::new(4, 4);
    app.draw(&mut fb);
    assert_eq!(*log.borrow(), ["field", "snake", "gui"]);
}

#[test]
fn test_drawers_keep_registration_order_within_a_layer() {
    let mut app = test_app();
    let log = recorder();

    for id in ["one", "two", "three"] {
        let log = log.clone();
        app.register_drawer("fruit", id, move |_| log.borrow_mut().push(id.to_string()))
            .unwrap();
    }

    let mut fb = FrameBuffer::new(4, 4);
    app.draw(&mut fb);
    assert_eq!(*log.borrow(), ["one", "two", "three"]);
}

#[test]
fn test_unregistered_drawer_no_longer_draws() {
    let mut app = test_app();
    let log = recorder();

    let l = log.clone();
    app.register_drawer("fruit", "apple", move |_| l.borrow_mut().push("apple".into()))
        .unwrap();
    app.unregister_drawer("fruit", "apple").unwrap();

    let mut fb = FrameBuffer::new(4, 4);
    app.draw(&mut fb);
    assert!(log.borrow().is_empty());

    let err = app.unregister_drawer("fruit", "apple").unwrap_err();
    assert!(matches!(err, RegistryError::NotFound { .. }));
}
