//! Terminal palette derived from the active gpui-component theme.

use gpui::{rgb, App, Hsla, SharedString};
use gpui_component::theme::Theme;
use gpui_component::{ActiveTheme, Colorize};
use parking_lot::Mutex;

/// Last computed palette, keyed by theme name
static PALETTE_CACHE: Mutex<Option<(SharedString, TerminalColors)>> = Mutex::new(None);

/// Colors used to draw terminal cells and the tab strip.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TerminalColors {
    pub background: Hsla,
    pub foreground: Hsla,
    pub cursor: Hsla,
    pub black: Hsla,
    pub red: Hsla,
    pub green: Hsla,
    pub yellow: Hsla,
    pub blue: Hsla,
    pub magenta: Hsla,
    pub cyan: Hsla,
    pub white: Hsla,
    pub bright_black: Hsla,
    pub bright_red: Hsla,
    pub bright_green: Hsla,
    pub bright_yellow: Hsla,
    pub bright_blue: Hsla,
    pub bright_magenta: Hsla,
    pub bright_cyan: Hsla,
    pub bright_white: Hsla,
    pub tab_bar: Hsla,
    pub tab_active: Hsla,
    pub tab_inactive: Hsla,
    pub border: Hsla,
    pub muted: Hsla,
    pub accent: Hsla,
    pub scrollbar_thumb: Hsla,
}

impl Default for TerminalColors {
    /// Tango-style dark palette, used until a theme is active.
    fn default() -> Self {
        Self {
            background: rgb(0x1c1c1c).into(),
            foreground: rgb(0xd3d7cf).into(),
            cursor: rgb(0xd3d7cf).into(),
            black: rgb(0x2e3436).into(),
            red: rgb(0xcc0000).into(),
            green: rgb(0x4e9a06).into(),
            yellow: rgb(0xc4a000).into(),
            blue: rgb(0x3465a4).into(),
            magenta: rgb(0x75507b).into(),
            cyan: rgb(0x06989a).into(),
            white: rgb(0xd3d7cf).into(),
            bright_black: rgb(0x555753).into(),
            bright_red: rgb(0xef2929).into(),
            bright_green: rgb(0x8ae234).into(),
            bright_yellow: rgb(0xfce94f).into(),
            bright_blue: rgb(0x729fcf).into(),
            bright_magenta: rgb(0xad7fa8).into(),
            bright_cyan: rgb(0x34e2e2).into(),
            bright_white: rgb(0xeeeeec).into(),
            tab_bar: rgb(0x151515).into(),
            tab_active: rgb(0x2e2e2e).into(),
            tab_inactive: rgb(0x1c1c1c).into(),
            border: rgb(0x333333).into(),
            muted: rgb(0x888a85).into(),
            accent: rgb(0x729fcf).into(),
            scrollbar_thumb: rgb(0x555753).into(),
        }
    }
}

/// Terminal palette for the current theme. Cached until the theme changes.
pub fn terminal_colors(cx: &App) -> TerminalColors {
    let theme_name = cx.theme().theme_name().clone();

    if let Some((cached_name, cached)) = PALETTE_CACHE.lock().as_ref() {
        if *cached_name == theme_name {
            return *cached;
        }
    }

    let colors = &Theme::global(cx).colors;
    let palette = TerminalColors {
        background: colors.background,
        foreground: colors.foreground,
        cursor: colors.caret,
        black: colors.background.darken(0.3),
        red: colors.red,
        green: colors.green,
        yellow: colors.yellow,
        blue: colors.blue,
        magenta: colors.magenta,
        cyan: colors.cyan,
        white: colors.foreground.lighten(0.1),
        bright_black: colors.muted_foreground,
        bright_red: colors.red_light,
        bright_green: colors.green_light,
        bright_yellow: colors.yellow_light,
        bright_blue: colors.blue_light,
        bright_magenta: colors.magenta_light,
        bright_cyan: colors.cyan_light,
        bright_white: colors.foreground.lighten(0.2),
        tab_bar: colors.tab_bar,
        tab_active: colors.tab_active,
        tab_inactive: colors.tab,
        border: colors.border,
        muted: colors.muted_foreground,
        accent: colors.accent,
        scrollbar_thumb: colors.muted_foreground.opacity(0.6),
    };

    *PALETTE_CACHE.lock() = Some((theme_name, palette));
    palette
}
