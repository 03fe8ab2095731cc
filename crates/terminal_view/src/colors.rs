//! alacritty cell colors → GPUI colors.

use alacritty_terminal::term::color::Colors as TermColors;
use alacritty_terminal::vte::ansi::{Color, NamedColor, Rgb};
use gpui::{hsla, Hsla, Rgba};
use theme::TerminalColors;

const ANSI_NAMED: [NamedColor; 16] = [
    NamedColor::Black,
    NamedColor::Red,
    NamedColor::Green,
    NamedColor::Yellow,
    NamedColor::Blue,
    NamedColor::Magenta,
    NamedColor::Cyan,
    NamedColor::White,
    NamedColor::BrightBlack,
    NamedColor::BrightRed,
    NamedColor::BrightGreen,
    NamedColor::BrightYellow,
    NamedColor::BrightBlue,
    NamedColor::BrightMagenta,
    NamedColor::BrightCyan,
    NamedColor::BrightWhite,
];

pub fn rgb_to_hsla(rgb: Rgb) -> Hsla {
    Hsla::from(Rgba {
        r: rgb.r as f32 / 255.0,
        g: rgb.g as f32 / 255.0,
        b: rgb.b as f32 / 255.0,
        a: 1.0,
    })
}

/// Resolve a cell color. Colors the application set through OSC 4/10/11 win
/// over the palette.
pub fn color_to_hsla(color: Color, term_colors: &TermColors, palette: &TerminalColors) -> Hsla {
    match color {
        Color::Spec(rgb) => rgb_to_hsla(rgb),
        Color::Named(named) => term_colors[named]
            .map(rgb_to_hsla)
            .unwrap_or_else(|| named_color(named, palette)),
        Color::Indexed(idx) => term_colors[idx as usize]
            .map(rgb_to_hsla)
            .unwrap_or_else(|| indexed_color(idx, palette)),
    }
}

pub fn named_color(color: NamedColor, palette: &TerminalColors) -> Hsla {
    match color {
        NamedColor::Black => palette.black,
        NamedColor::Red => palette.red,
        NamedColor::Green => palette.green,
        NamedColor::Yellow => palette.yellow,
        NamedColor::Blue => palette.blue,
        NamedColor::Magenta => palette.magenta,
        NamedColor::Cyan => palette.cyan,
        NamedColor::White => palette.white,
        NamedColor::BrightBlack => palette.bright_black,
        NamedColor::BrightRed => palette.bright_red,
        NamedColor::BrightGreen => palette.bright_green,
        NamedColor::BrightYellow => palette.bright_yellow,
        NamedColor::BrightBlue => palette.bright_blue,
        NamedColor::BrightMagenta => palette.bright_magenta,
        NamedColor::BrightCyan => palette.bright_cyan,
        NamedColor::BrightWhite => palette.bright_white,
        NamedColor::Background => palette.background,
        NamedColor::Cursor => palette.cursor,
        _ => palette.foreground,
    }
}

/// xterm 256-color palette: 16 named colors, a 6×6×6 cube, then 24 grays.
pub fn indexed_color(idx: u8, palette: &TerminalColors) -> Hsla {
    match idx {
        0..=15 => named_color(ANSI_NAMED[idx as usize], palette),
        16..=231 => {
            let idx = idx - 16;
            let level = |v: u8| v as f32 / 5.0;
            Hsla::from(Rgba {
                r: level(idx / 36),
                g: level((idx % 36) / 6),
                b: level(idx % 6),
                a: 1.0,
            })
        }
        232..=255 => {
            let gray = (idx - 232) as f32 / 23.0 * 0.9 + 0.08;
            hsla(0.0, 0.0, gray, 1.0)
        }
    }
}

/// Bold text in one of the eight base colors is drawn in its bright variant.
pub fn bold_color(color: Color, term_colors: &TermColors, palette: &TerminalColors) -> Hsla {
    let base = match color {
        Color::Named(named) => ANSI_NAMED[..8].iter().position(|c| *c == named),
        Color::Indexed(idx) if idx < 8 => Some(idx as usize),
        _ => None,
    };
    match base {
        Some(idx) => color_to_hsla(Color::Indexed(idx as u8 + 8), term_colors, palette),
        None => color_to_hsla(color, term_colors, palette),
    }
}

pub fn apply_dim(color: Hsla) -> Hsla {
    hsla(color.h, color.s, color.l * 0.66, color.a)
}
