//! Fruit module: spawning, pickup detection and respawn.
//!
//! One fruit lives on the field at a time. A fruit spawns at a uniformly
//! random playground cell on `game_start`, is eaten when a committed snake
//! step lands on its cell (announced as `fruit_eaten`; the snake module
//! applies the growth), and is replaced immediately. `game_end` clears the
//! field. Each fruit registers its own drawer and unregisters it when
//! removed.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Result;

use crate::app::App;
use crate::events::{EventKind, GameEvent};
use crate::term::view;
use crate::types::{FruitKind, FRUIT_KINDS};

/// Simple LCG (Numerical Recipes constants), enough for spawn cells and
/// kind selection. Seeded from the wall clock in the binary, from a fixed
/// value in tests.
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    pub fn new(seed: u32) -> Self {
        // A zero seed would walk a degenerate orbit.
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Random value in `[0, max)`.
    pub fn next_range(&mut self, max: u32) -> u32 {
        self.next_u32() % max
    }
}

/// A spawned fruit, pinned to one grid cell.
#[derive(Debug, Clone)]
pub struct Fruit {
    pub kind: FruitKind,
    pub x: i32,
    pub y: i32,
    drawer_id: String,
}

pub struct FruitModule {
    fruits: Vec<Fruit>,
    rng: SimpleRng,
    serial: u64,
}

impl FruitModule {
    /// Fruits currently on the field.
    pub fn fruits(&self) -> &[Fruit] {
        &self.fruits
    }
}

fn spawn_fruit(app: &mut App, module: &Rc<RefCell<FruitModule>>) -> Result<()> {
    let playground = app.config().playground;
    let (kind, x, y, drawer_id) = {
        let mut m = module.borrow_mut();
        let x = playground.minx + m.rng.next_range(playground.width() as u32) as i32;
        let y = playground.miny + m.rng.next_range(playground.height() as u32) as i32;
        let kind = FRUIT_KINDS[m.rng.next_range(FRUIT_KINDS.len() as u32) as usize];
        m.serial += 1;
        let drawer_id = format!("fruit#{}", m.serial);
        m.fruits.push(Fruit {
            kind,
            x,
            y,
            drawer_id: drawer_id.clone(),
        });
        (kind, x, y, drawer_id)
    };
    app.register_drawer("fruit", drawer_id, move |fb| {
        view::draw_fruit(kind, x, y, fb);
    })?;
    Ok(())
}

/// Subscribe the fruit module with a seeded RNG.
pub fn setup(app: &mut App, seed: u32) -> Result<Rc<RefCell<FruitModule>>> {
    let module = Rc::new(RefCell::new(FruitModule {
        fruits: Vec::new(),
        rng: SimpleRng::new(seed),
        serial: 0,
    }));

    let m = module.clone();
    app.subscribe(EventKind::GameStart, "fruit", move |app, _| {
        spawn_fruit(app, &m)
    })?;

    let m = module.clone();
    app.subscribe(EventKind::SnakeStep, "fruit", move |app, event| {
        let GameEvent::SnakeStep { x, y } = *event else {
            return Ok(());
        };
        let hits: Vec<(FruitKind, i32, i32)> = m
            .borrow()
            .fruits
            .iter()
            .filter(|f| f.x == x && f.y == y)
            .map(|f| (f.kind, f.x, f.y))
            .collect();
        for (kind, x, y) in hits {
            app.fire(GameEvent::FruitEaten { kind, x, y });
        }
        Ok(())
    })?;

    let m = module.clone();
    app.subscribe(EventKind::FruitEaten, "fruit", move |app, event| {
        let GameEvent::FruitEaten { kind, x, y } = *event else {
            return Ok(());
        };
        let removed = {
            let mut module = m.borrow_mut();
            module
                .fruits
                .iter()
                .position(|f| f.x == x && f.y == y && f.kind == kind)
                .map(|index| module.fruits.remove(index).drawer_id)
        };
        if let Some(drawer_id) = removed {
            app.unregister_drawer("fruit", &drawer_id)?;
            spawn_fruit(app, &m)?;
        }
        Ok(())
    })?;

    let m = module.clone();
    app.subscribe(EventKind::GameEnd, "fruit", move |app, _| {
        let ids: Vec<String> = m
            .borrow_mut()
            .fruits
            .drain(..)
            .map(|f| f.drawer_id)
            .collect();
        for drawer_id in ids {
            app.unregister_drawer("fruit", &drawer_id)?;
        }
        Ok(())
    })?;

    Ok(module)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rng_deterministic() {
        let mut a = SimpleRng::new(12345);
        let mut b = SimpleRng::new(12345);
        for _ in 0..100 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn test_rng_zero_seed_is_remapped() {
        let mut a = SimpleRng::new(0);
        let mut b = SimpleRng::new(1);
        assert_eq!(a.next_u32(), b.next_u32());
    }

    #[test]
    fn test_next_range_stays_in_bounds() {
        let mut rng = SimpleRng::new(7);
        for _ in 0..1000 {
            assert!(rng.next_range(40) < 40);
        }
    }
}
