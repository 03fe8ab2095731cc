//! TOML config file support with live reload.
//!
//! Config location: `~/.config/kiri/config.toml`

use crate::constants;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Custom keybinding: maps a key chord to an action name.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct KeybindingEntry {
    /// Key chord (e.g., "ctrl-shift-t", "alt-1")
    pub keys: String,
    /// Action name (e.g., "new-tab", "close-tab", "activate-tab-3")
    pub action: String,
}

/// User-facing config parsed from TOML.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Terminal font family.
    pub font_family: String,
    /// Terminal font size in points.
    pub font_size: f32,
    /// Keep the window above other windows at startup.
    pub always_on_top: bool,
    /// Shell override. Takes precedence over `$SHELL`.
    pub shell: Option<String>,
    /// Browser command for opening links. Takes precedence over `$BROWSER`.
    pub browser: Option<String>,
    /// Draw the scrollback scrollbar.
    pub show_scrollbar: bool,
    /// Maximum number of scrollback lines.
    pub scrollback_lines: usize,
    /// Background image for the first tab.
    pub background_image: Option<PathBuf>,
    /// Initial window width.
    pub window_width: Option<f32>,
    /// Initial window height.
    pub window_height: Option<f32>,
    /// Custom keybindings (override defaults).
    pub keybindings: Vec<KeybindingEntry>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            font_family: constants::terminal::FONT_FAMILY.to_string(),
            font_size: constants::terminal::DEFAULT_FONT_SIZE,
            always_on_top: false,
            shell: None,
            browser: None,
            show_scrollbar: true,
            scrollback_lines: constants::scrollback::DEFAULT_LINES,
            background_image: None,
            window_width: None,
            window_height: None,
            keybindings: Vec::new(),
        }
    }
}

impl Config {
    /// Parse config text, falling back to defaults on error.
    pub fn parse(content: &str) -> Self {
        if content.len() > constants::settings::MAX_FILE_SIZE as usize {
            tracing::warn!(
                "Config file too large ({} bytes), using defaults",
                content.len()
            );
            return Self::default();
        }

        match toml::from_str::<Config>(content) {
            Ok(cfg) => cfg.sanitized(),
            Err(e) => {
                tracing::warn!("Failed to parse config.toml: {}", e);
                Self::default()
            }
        }
    }

    /// Clamp numeric fields and drop oversized strings.
    fn sanitized(mut self) -> Self {
        let max_len = constants::settings::MAX_STRING_LENGTH;

        if self.font_family.trim().is_empty() || self.font_family.len() > max_len {
            tracing::warn!("Ignoring invalid font-family in config");
            self.font_family = constants::terminal::FONT_FAMILY.to_string();
        }
        if !self.font_size.is_finite() {
            self.font_size = constants::terminal::DEFAULT_FONT_SIZE;
        }
        self.font_size = self.font_size.clamp(
            constants::terminal::MIN_FONT_SIZE,
            constants::terminal::MAX_FONT_SIZE,
        );
        self.scrollback_lines = self.scrollback_lines.min(constants::scrollback::MAX_LINES);

        for (name, field) in [("shell", &mut self.shell), ("browser", &mut self.browser)] {
            if field
                .as_ref()
                .is_some_and(|v| v.trim().is_empty() || v.len() > max_len)
            {
                tracing::warn!("Ignoring invalid {} in config", name);
                *field = None;
            }
        }
        self
    }
}

/// Default config file content with comments (generated on first launch).
const DEFAULT_CONFIG: &str = r#"# kiri configuration
# Keybinding changes are applied live; other settings apply to new windows.

# Terminal font family (any monospace font installed on your system)
font-family = "FONT_PLACEHOLDER"

# Terminal font size in points (8-32)
font-size = 14

# Keep the window above other windows
always-on-top = false

# Shell to launch in new tabs (defaults to $SHELL, then /bin/sh)
# shell = "/bin/zsh"

# Command used to open links (defaults to $BROWSER, then the system opener)
# browser = "firefox --new-tab"

# Draw a scrollbar for the scrollback buffer
show-scrollbar = true

# Maximum scrollback buffer size (lines)
scrollback-lines = 10000

# Background image for the first tab
# background-image = "/home/me/Pictures/wallpaper.png"

# Window dimensions
# window-width = 1000
# window-height = 700

# Custom keybindings (override defaults)
# [[keybindings]]
# keys = "ctrl-shift-n"
# action = "set-tab-name"
#
# [[keybindings]]
# keys = "ctrl-alt-1"
# action = "activate-tab-1"
"#;

/// Return the config file path.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("kiri").join("config.toml"))
}

/// Ensure the config file exists, creating a default if missing.
/// Returns the path to the config file.
pub fn ensure_config_file() -> Option<PathBuf> {
    let path = config_path()?;
    if !path.exists() {
        let parent = path.parent()?;
        std::fs::create_dir_all(parent).ok()?;

        let content =
            DEFAULT_CONFIG.replace("FONT_PLACEHOLDER", constants::terminal::FONT_FAMILY);
        std::fs::write(&path, content).ok()?;
        tracing::info!("Created default config at {:?}", path);
    }
    Some(path)
}

/// Load and parse the config file. Returns default on any error.
pub fn load_config() -> Config {
    match config_path() {
        Some(path) => load_config_from(&path),
        None => Config::default(),
    }
}

/// Load and parse a config file at an explicit path. Returns default on any error.
pub fn load_config_from(path: &Path) -> Config {
    match std::fs::read_to_string(path) {
        Ok(content) => Config::parse(&content),
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("Failed to read config: {}", e);
            }
            Config::default()
        }
    }
}

/// Persist the font to the config file (preserving comments/formatting).
pub fn save_font(family: &str, size: f32) {
    if let Some(path) = config_path() {
        save_font_to(&path, family, size);
    }
}

/// Persist the font to a config file at an explicit path.
pub fn save_font_to(path: &Path, family: &str, size: f32) {
    let content = std::fs::read_to_string(path).unwrap_or_default();
    let mut doc = match content.parse::<toml_edit::DocumentMut>() {
        Ok(d) => d,
        Err(e) => {
            tracing::warn!("Not saving font, config is not valid TOML: {}", e);
            return;
        }
    };

    doc["font-family"] = toml_edit::value(family);
    doc["font-size"] = toml_edit::value(size as f64);

    if let Err(e) = std::fs::write(path, doc.to_string()) {
        tracing::warn!("Failed to save font: {}", e);
    }
}

use gpui::App;

/// Apply a reloaded Config to the running application.
/// `on_apply` carries the cross-crate side effects (keybindings).
pub fn apply_config(config: &Config, cx: &mut App, on_apply: impl FnOnce(&Config, &mut App)) {
    on_apply(config, cx);
    cx.refresh_windows();
}

/// Start watching the config file for changes.
/// Returns a guard that stops watching on drop.
pub fn watch_config(
    cx: &mut App,
    on_apply: fn(&Config, &mut App),
) -> Option<notify_debouncer_mini::Debouncer<notify::RecommendedWatcher>> {
    use notify_debouncer_mini::new_debouncer;
    use std::time::Duration;

    let path = config_path()?;
    let watch_dir = path.parent()?.to_path_buf();

    let current = std::sync::Arc::new(parking_lot::Mutex::new(load_config()));
    let path_clone = path.clone();

    let (tx, rx) = std::sync::mpsc::channel();

    let mut debouncer = new_debouncer(
        constants::timing::CONFIG_DEBOUNCE,
        move |res: Result<Vec<notify_debouncer_mini::DebouncedEvent>, _>| {
            if let Ok(events) = res {
                if events.iter().any(|event| event.path == path_clone) {
                    let _ = tx.send(());
                }
            }
        },
    )
    .ok()?;

    debouncer
        .watcher()
        .watch(&watch_dir, notify::RecursiveMode::NonRecursive)
        .ok()?;

    // Poll channel on a timer to apply changes on the main thread
    cx.spawn(async move |cx: &mut gpui::AsyncApp| loop {
        cx.background_executor()
            .timer(Duration::from_millis(50))
            .await;
        if rx.try_recv().is_ok() {
            while rx.try_recv().is_ok() {}

            let new_config = load_config();
            let mut prev = current.lock();
            if new_config != *prev {
                tracing::info!("Config file changed, reloading...");
                *prev = new_config.clone();
                drop(prev);
                let _ = cx.update(|cx| {
                    apply_config(&new_config, cx, on_apply);
                });
            }
        }
    })
    .detach();

    tracing::info!("Watching config file: {:?}", path);
    Some(debouncer)
}
