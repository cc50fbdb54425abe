//! Game view: maps grid cells onto framebuffer characters.
//!
//! Each grid cell is two characters wide to keep the field roughly square in
//! a terminal. Layout: a HUD row on top, then the playground framed by a
//! one-character border. Drawers call into these helpers; nothing here
//! touches the terminal.

use crate::snake::Snake;
use crate::term::fb::{CellStyle, FrameBuffer, Rgb};
use crate::types::{Direction, FruitKind, Playground, DISP_PRECISION};

/// Characters per grid cell, horizontally.
pub const CELL_W: u16 = 2;
/// Field origin inside the framebuffer (right of / below the border).
pub const FIELD_X: u16 = 1;
pub const FIELD_Y: u16 = 2;

const BORDER_FG: Rgb = Rgb::new(120, 120, 120);
const FIELD_BG: Rgb = Rgb::new(12, 24, 12);
const SNAKE_BODY: Rgb = Rgb::new(60, 180, 60);
const SNAKE_HEAD: Rgb = Rgb::new(120, 240, 120);
const HUD_FG: Rgb = Rgb::new(230, 230, 230);
const BANNER_FG: Rgb = Rgb::new(250, 80, 80);

/// Framebuffer size needed for a playground plus HUD and border.
pub fn canvas_size(playground: Playground) -> (u16, u16) {
    let w = playground.width() as u16 * CELL_W + 2;
    let h = playground.height() as u16 + 3;
    (w, h)
}

fn cell_origin(x: i32, y: i32) -> Option<(u16, u16)> {
    if x < 0 || y < 0 {
        return None;
    }
    Some((FIELD_X + x as u16 * CELL_W, FIELD_Y + y as u16))
}

/// Paint one grid cell with a two-character glyph. Off-grid cells are
/// dropped, matching the framebuffer's clipping.
pub fn put_cell(fb: &mut FrameBuffer, x: i32, y: i32, glyphs: [char; 2], style: CellStyle) {
    let Some((cx, cy)) = cell_origin(x, y) else {
        return;
    };
    fb.put_char(cx, cy, glyphs[0], style);
    fb.put_char(cx + 1, cy, glyphs[1], style);
}

/// Playground background and border frame.
pub fn draw_field(playground: Playground, fb: &mut FrameBuffer) {
    let w = playground.width() as u16 * CELL_W;
    let h = playground.height() as u16;
    let border = CellStyle {
        fg: BORDER_FG,
        ..CellStyle::default()
    };
    let field = CellStyle {
        bg: FIELD_BG,
        ..CellStyle::default()
    };

    fb.fill_rect(FIELD_X, FIELD_Y, w, h, ' ', field);

    fb.put_char(0, FIELD_Y - 1, '+', border);
    fb.put_char(FIELD_X + w, FIELD_Y - 1, '+', border);
    fb.put_char(0, FIELD_Y + h, '+', border);
    fb.put_char(FIELD_X + w, FIELD_Y + h, '+', border);
    for dx in 0..w {
        fb.put_char(FIELD_X + dx, FIELD_Y - 1, '-', border);
        fb.put_char(FIELD_X + dx, FIELD_Y + h, '-', border);
    }
    for dy in 0..h {
        fb.put_char(0, FIELD_Y + dy, '|', border);
        fb.put_char(FIELD_X + w, FIELD_Y + dy, '|', border);
    }
}

/// The snake, from its committed head cell through the offset chain. While
/// gliding right or down the head is shown one cell ahead, the cell it is
/// entering; the truncated position already points there for left and up.
pub fn draw_snake(snake: &Snake, fb: &mut FrameBuffer) {
    let (mut x, mut y) = snake.head_cell();
    match snake.direction() {
        Direction::Down if snake.y() - y as f64 > DISP_PRECISION => y += 1,
        Direction::Right if snake.x() - x as f64 > DISP_PRECISION => x += 1,
        _ => {}
    }

    let head = CellStyle {
        fg: SNAKE_HEAD,
        bg: FIELD_BG,
        bold: true,
    };
    let body = CellStyle {
        fg: SNAKE_BODY,
        bg: FIELD_BG,
        bold: false,
    };

    put_cell(fb, x, y, ['[', ']'], head);
    for node in snake.nodes() {
        x += node.dx;
        y += node.dy;
        put_cell(fb, x, y, ['[', ']'], body);
    }
}

fn fruit_color(kind: FruitKind) -> Rgb {
    match kind {
        FruitKind::Apple => Rgb::new(220, 40, 40),
        FruitKind::Apricot => Rgb::new(240, 170, 60),
        FruitKind::Cherry => Rgb::new(180, 20, 60),
        FruitKind::Kiwi => Rgb::new(140, 190, 60),
        FruitKind::Pear => Rgb::new(200, 220, 80),
        FruitKind::Strawberry => Rgb::new(240, 60, 100),
    }
}

pub fn draw_fruit(kind: FruitKind, x: i32, y: i32, fb: &mut FrameBuffer) {
    let style = CellStyle {
        fg: fruit_color(kind),
        bg: FIELD_BG,
        bold: true,
    };
    put_cell(fb, x, y, ['(', ')'], style);
}

/// HUD row with the score and the elapsed-time clock.
pub fn draw_hud(score: u32, seconds: u32, fb: &mut FrameBuffer) {
    let style = CellStyle {
        fg: HUD_FG,
        ..CellStyle::default()
    };
    fb.put_str(FIELD_X, 0, &format!("score: {score}    elapsed: {seconds}s"), style);
}

/// Centered status banner over the field.
pub fn draw_banner(text: &str, fb: &mut FrameBuffer) {
    let style = CellStyle {
        fg: BANNER_FG,
        bold: true,
        ..CellStyle::default()
    };
    let x = (fb.width() as i32 / 2 - text.len() as i32 / 2).max(0) as u16;
    let y = fb.height() / 2;
    fb.put_str(x, y, text, style);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GameConfig;

    #[test]
    fn test_canvas_fits_default_playground() {
        let (w, h) = canvas_size(GameConfig::default().playground);
        assert_eq!(w, 40 * CELL_W + 2);
        assert_eq!(h, 20 + 3);
    }

    #[test]
    fn test_put_cell_lands_inside_the_frame() {
        let playground = GameConfig::default().playground;
        let (w, h) = canvas_size(playground);
        let mut fb = FrameBuffer::new(w, h);
        put_cell(&mut fb, 0, 0, ['[', ']'], CellStyle::default());
        assert_eq!(fb.get(FIELD_X, FIELD_Y).unwrap().ch, '[');
        assert_eq!(fb.get(FIELD_X + 1, FIELD_Y).unwrap().ch, ']');

        // Negative cells (a head gliding past the min edge) simply clip.
        put_cell(&mut fb, -1, 0, ['[', ']'], CellStyle::default());
    }
}
