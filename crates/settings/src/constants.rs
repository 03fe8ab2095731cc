//! Centralized configuration constants for kiri.
//!
//! Organized by component.

/// Terminal pane configuration.
pub mod terminal {
    /// Default font size in points.
    pub const DEFAULT_FONT_SIZE: f32 = 14.0;
    /// Minimum allowed font size.
    pub const MIN_FONT_SIZE: f32 = 8.0;
    /// Maximum allowed font size.
    pub const MAX_FONT_SIZE: f32 = 32.0;
    /// Step applied by the increase/decrease font size commands.
    pub const FONT_SIZE_STEP: f32 = 1.0;

    /// Default monospace font family (macOS).
    #[cfg(target_os = "macos")]
    pub const FONT_FAMILY: &str = "Menlo";

    /// Default monospace font family (Windows).
    #[cfg(target_os = "windows")]
    pub const FONT_FAMILY: &str = "Consolas";

    /// Default monospace font family (Linux and others).
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    pub const FONT_FAMILY: &str = "DejaVu Sans Mono";

    /// Families offered as quick picks in the font dialog.
    pub const SUGGESTED_FAMILIES: &[&str] = &[
        "DejaVu Sans Mono",
        "Bitstream Vera Sans Mono",
        "JetBrains Mono",
        "Fira Code",
        "Menlo",
        "Consolas",
    ];

    /// Padding around terminal content.
    pub const PADDING: f32 = 2.0;
    /// Cursor thickness in pixels.
    pub const CURSOR_THICKNESS: f32 = 2.0;
    /// Opacity of the cell background drawn over a background image.
    pub const BACKGROUND_IMAGE_TINT: f32 = 0.82;
}

/// Tab bar configuration.
pub mod tab_bar {
    /// Tab bar height in pixels.
    pub const HEIGHT: f32 = 34.0;
    /// Horizontal padding.
    pub const PADDING: f32 = 8.0;
    /// Minimum tab width.
    pub const TAB_MIN_WIDTH: f32 = 110.0;
    /// Maximum tab width.
    pub const TAB_MAX_WIDTH: f32 = 220.0;
    /// Close button size.
    pub const CLOSE_BUTTON_SIZE: f32 = 18.0;
}

/// Scrollbar configuration.
pub mod scrollbar {
    /// Width of the scrollbar track in pixels.
    pub const WIDTH: f32 = 8.0;
    /// Smallest thumb height in pixels, so long histories stay grabbable.
    pub const MIN_THUMB_HEIGHT: f32 = 16.0;
}

/// Context menu configuration.
pub mod context_menu {
    /// Menu width in pixels.
    pub const WIDTH: f32 = 200.0;
}

/// Window configuration.
pub mod window {
    /// Default window width.
    pub const DEFAULT_WIDTH: f32 = 1000.0;
    /// Default window height.
    pub const DEFAULT_HEIGHT: f32 = 700.0;
    /// Window title.
    pub const TITLE: &str = "kiri";
}

/// Timing configuration.
pub mod timing {
    use std::time::Duration;

    /// Interval at which a pane polls its VT thread for repaint and exit.
    pub const PANE_POLL_INTERVAL: Duration = Duration::from_millis(16);
    /// Debounce window for config file change events.
    pub const CONFIG_DEBOUNCE: Duration = Duration::from_millis(100);
}

/// Scrollback buffer configuration.
pub mod scrollback {
    /// Default scrollback buffer size in lines.
    pub const DEFAULT_LINES: usize = 10_000;
    /// Maximum allowed scrollback buffer size in lines.
    pub const MAX_LINES: usize = 100_000;
}

/// Shell and helper program launch.
pub mod launch {
    /// Shell used when neither the config nor `SHELL` names one.
    pub const FALLBACK_SHELL: &str = "/bin/sh";
    /// Value exported as `TERM` to child shells.
    pub const TERM: &str = "xterm-256color";
    /// Environment variable naming the browser command for links.
    pub const BROWSER_ENV: &str = "BROWSER";
}

/// Settings file validation limits.
pub mod settings {
    /// Maximum settings file size in bytes (64 KB).
    pub const MAX_FILE_SIZE: u64 = 64 * 1024;

    /// Maximum length for string fields (font family, shell, browser).
    pub const MAX_STRING_LENGTH: usize = 256;
}
