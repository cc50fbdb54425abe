//! Full-game scenarios: every module registered, lifecycle driven through
//! events and key input, observed through the module handles and probes.

use std::cell::RefCell;
use std::rc::Rc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use tui_snake::app::App;
use tui_snake::events::{EventKind, GameEvent};
use tui_snake::modules::{register_all, Modules};
use tui_snake::types::{GameConfig, RENDER_ORDER};

const SEED: u32 = 7;

fn flow_app(config: GameConfig) -> (App, Modules) {
    let mut app = App::new(config, RENDER_ORDER);
    let modules = register_all(&mut app, SEED).unwrap();
    app.fire(GameEvent::Load);
    (app, modules)
}

/// One whole cell per tick keeps committed steps and ticks in lockstep.
fn full_speed_config() -> GameConfig {
    GameConfig {
        snake_speed: 1.0,
        ..GameConfig::default()
    }
}

fn step_probe(app: &mut App) -> Rc<RefCell<Vec<(i32, i32)>>> {
    let probe = Rc::new(RefCell::new(Vec::new()));
    let p = probe.clone();
    app.subscribe(EventKind::SnakeStep, "test-probe", move |_, event| {
        if let GameEvent::SnakeStep { x, y } = *event {
            p.borrow_mut().push((x, y));
        }
        Ok(())
    })
    .unwrap();
    probe
}

fn end_probe(app: &mut App) -> Rc<RefCell<u32>> {
    let probe = Rc::new(RefCell::new(0));
    let p = probe.clone();
    app.subscribe(EventKind::GameEnd, "test-end-probe", move |_, _| {
        *p.borrow_mut() += 1;
        Ok(())
    })
    .unwrap();
    probe
}

fn press(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

#[test]
fn test_game_start_creates_snake_and_fruit() {
    let (mut app, modules) = flow_app(GameConfig::default());
    assert!(modules.snake.borrow().snake().is_none());
    assert!(modules.ui.borrow().finished());

    app.fire(GameEvent::GameStart);

    let snake = modules.snake.borrow().snake().expect("snake after start");
    assert_eq!(snake.borrow().len(), 3);
    assert!(snake.borrow().active());
    assert_eq!(snake.borrow().head_cell(), (20, 10));

    let fruits = modules.fruits.borrow();
    assert_eq!(fruits.fruits().len(), 1);
    let playground = app.config().playground;
    let fruit = &fruits.fruits()[0];
    assert!(fruit.x >= playground.minx && fruit.x <= playground.maxx);
    assert!(fruit.y >= playground.miny && fruit.y <= playground.maxy);

    assert_eq!(modules.score.borrow().score(), 0);
    assert!(!modules.ui.borrow().finished());
}

#[test]
fn test_committed_steps_publish_snake_step_with_prior_cell() {
    let (mut app, modules) = flow_app(full_speed_config());
    let probe = step_probe(&mut app);
    app.fire(GameEvent::GameStart);

    for _ in 0..3 {
        app.step();
    }

    assert_eq!(*probe.borrow(), [(20, 10), (21, 10), (22, 10)]);
    assert_eq!(app.current_tick(), 3);
    let snake = modules.snake.borrow().snake().unwrap();
    assert_eq!(snake.borrow().head_cell(), (23, 10));
}

#[test]
fn test_wall_collision_publishes_exactly_one_game_end() {
    let (mut app, modules) = flow_app(full_speed_config());
    let steps = step_probe(&mut app);
    let ends = end_probe(&mut app);
    app.fire(GameEvent::GameStart);

    // 20 commits reach the right wall (x = 39); the next tick collides.
    for _ in 0..40 {
        app.step();
    }

    assert_eq!(steps.borrow().len(), 20);
    assert_eq!(steps.borrow().last(), Some(&(39, 10)));
    assert_eq!(*ends.borrow(), 1);

    let snake = modules.snake.borrow().snake().unwrap();
    assert!(!snake.borrow().active());
    assert!(modules.ui.borrow().finished());
    // No fruit left on the field after the game ended.
    assert!(modules.fruits.borrow().fruits().is_empty());
}

#[test]
fn test_pause_and_resume_gate_the_snake() {
    let (mut app, _modules) = flow_app(full_speed_config());
    let probe = step_probe(&mut app);
    app.fire(GameEvent::GameStart);

    app.step();
    assert_eq!(probe.borrow().len(), 1);

    app.fire(GameEvent::GamePause);
    for _ in 0..5 {
        app.step();
    }
    assert_eq!(probe.borrow().len(), 1, "no steps while paused");

    app.fire(GameEvent::GameResume);
    app.step();
    assert_eq!(probe.borrow().len(), 2);
}

#[test]
fn test_fruit_pickup_grows_snake_scores_and_respawns() {
    let (mut app, modules) = flow_app(GameConfig::default());
    app.fire(GameEvent::GameStart);

    let eaten = Rc::new(RefCell::new(0));
    let e = eaten.clone();
    app.subscribe(EventKind::FruitEaten, "test-eaten-probe", move |_, _| {
        *e.borrow_mut() += 1;
        Ok(())
    })
    .unwrap();

    let (fx, fy) = {
        let fruits = modules.fruits.borrow();
        let fruit = &fruits.fruits()[0];
        (fruit.x, fruit.y)
    };

    // A committed step onto the fruit's cell is the pickup signal.
    app.fire(GameEvent::SnakeStep { x: fx, y: fy });

    assert_eq!(*eaten.borrow(), 1);
    assert_eq!(modules.score.borrow().score(), 1);
    let snake = modules.snake.borrow().snake().unwrap();
    assert_eq!(snake.borrow().len(), 4, "apple-class fruits grow by one");
    assert_eq!(
        modules.fruits.borrow().fruits().len(),
        1,
        "a replacement fruit spawns immediately"
    );
}

#[test]
fn test_enter_starts_and_escape_toggles_pause() {
    let (mut app, modules) = flow_app(GameConfig::default());

    app.dispatch_input(&press(KeyCode::Enter));
    let snake = modules.snake.borrow().snake().expect("Enter starts a game");
    assert!(snake.borrow().active());

    app.dispatch_input(&press(KeyCode::Esc));
    assert!(modules.ui.borrow().paused());
    assert!(!snake.borrow().active());

    app.dispatch_input(&press(KeyCode::Esc));
    assert!(!modules.ui.borrow().paused());
    assert!(snake.borrow().active());

    // Enter mid-game is ignored; the snake instance is unchanged.
    app.dispatch_input(&press(KeyCode::Enter));
    let same = modules.snake.borrow().snake().unwrap();
    assert!(Rc::ptr_eq(&snake, &same));
}

#[test]
fn test_restart_replaces_the_collided_snake() {
    let (mut app, modules) = flow_app(full_speed_config());
    app.fire(GameEvent::GameStart);

    for _ in 0..40 {
        app.step();
    }
    let dead = modules.snake.borrow().snake().unwrap();
    assert!(!dead.borrow().active());

    app.dispatch_input(&press(KeyCode::Enter));
    let fresh = modules.snake.borrow().snake().unwrap();
    assert!(!Rc::ptr_eq(&dead, &fresh), "a new instance per game");
    assert!(fresh.borrow().active());
    assert_eq!(fresh.borrow().head_cell(), (20, 10));
    assert_eq!(fresh.borrow().len(), 3);

    // The fresh snake ticks under the re-registered listener.
    let probe = step_probe(&mut app);
    app.step();
    assert_eq!(*probe.borrow(), [(20, 10)]);
}

#[test]
fn test_arrow_keys_buffer_turns_through_the_input_registry() {
    let (mut app, modules) = flow_app(full_speed_config());
    app.fire(GameEvent::GameStart);

    app.dispatch_input(&press(KeyCode::Down));
    app.step();
    let snake = modules.snake.borrow().snake().unwrap();
    assert_eq!(snake.borrow().head_cell(), (20, 11));

    // A reversal request is discarded outright.
    app.dispatch_input(&press(KeyCode::Up));
    app.step();
    assert_eq!(snake.borrow().head_cell(), (20, 12));
}

#[test]
fn test_score_clock_counts_seconds_and_stops_at_game_end() {
    let config = GameConfig {
        tickrate: 10,
        ..GameConfig::default()
    };
    let (mut app, modules) = flow_app(config);
    app.fire(GameEvent::GameStart);

    for _ in 0..10 {
        app.step();
    }
    assert_eq!(modules.score.borrow().seconds(), 1);
    for _ in 0..10 {
        app.step();
    }
    assert_eq!(modules.score.borrow().seconds(), 2);

    app.fire(GameEvent::GameEnd);
    for _ in 0..30 {
        app.step();
    }
    assert_eq!(modules.score.borrow().seconds(), 2, "clock cancelled at game end");
}

#[test]
fn test_restart_resets_score_and_clock() {
    let config = GameConfig {
        tickrate: 10,
        ..GameConfig::default()
    };
    let (mut app, modules) = flow_app(config);
    app.fire(GameEvent::GameStart);
    for _ in 0..10 {
        app.step();
    }
    assert_eq!(modules.score.borrow().seconds(), 1);

    app.fire(GameEvent::GameEnd);
    app.dispatch_input(&press(KeyCode::Enter));
    assert_eq!(modules.score.borrow().seconds(), 0);
    assert_eq!(modules.score.borrow().score(), 0);

    for _ in 0..10 {
        app.step();
    }
    assert_eq!(modules.score.borrow().seconds(), 1);
}
