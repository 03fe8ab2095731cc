//! Theme setup for kiri.
//!
//! kiri always runs with gpui-component's dark theme; this crate maps it to
//! the terminal palette. The configured terminal font only applies to
//! terminal panes, UI text keeps the theme's own font.

mod colors;

pub use colors::{terminal_colors, TerminalColors};

use gpui::App;
use gpui_component::theme::{Theme, ThemeMode};

/// Switch to dark mode.
pub fn init(cx: &mut App) {
    Theme::change(ThemeMode::Dark, None, cx);
    tracing::debug!(font = %Theme::global(cx).font_family, "Dark theme applied");
}
