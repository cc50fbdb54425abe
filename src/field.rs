//! Field module: the playground background drawer, registered once at
//! `load` on the bottom layer.

use anyhow::Result;

use crate::app::App;
use crate::events::EventKind;
use crate::term::view;

pub fn setup(app: &mut App) -> Result<()> {
    app.subscribe(EventKind::Load, "field", |app, _| {
        let playground = app.config().playground;
        app.register_drawer("field", "field", move |fb| {
            view::draw_field(playground, fb);
        })?;
        Ok(())
    })?;
    Ok(())
}
