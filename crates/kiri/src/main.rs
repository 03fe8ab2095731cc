//! kiri - a small tabbed terminal emulator
//!
//! Main entry point for the application.

use actions::Quit;
use anyhow::{Context, Result};
use gpui::*;
use gpui_component_assets::Assets;
use kiri_workspace::{key_bindings, terminal_bindings, Keymap, Workspace};
use once_cell::sync::Lazy;
use settings::constants::window;
use settings::Config;
use std::time::Instant;
use tracing::{debug, error, info};

/// Application startup time for performance monitoring
static STARTUP_TIME: Lazy<Instant> = Lazy::new(Instant::now);

/// Check if debug mode is enabled via environment variable.
fn is_debug_mode() -> bool {
    std::env::var("KIRI_DEBUG").is_ok()
}

/// Initialize the logging system. `RUST_LOG` wins over `KIRI_DEBUG`.
fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let default_filter = if is_debug_mode() {
        "kiri=debug,kiri_workspace=debug,terminal=debug,terminal_view=debug,gpui=debug,info"
    } else {
        "kiri=info,kiri_workspace=info,terminal=info,terminal_view=info,warn"
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_line_number(true))
        .with(filter)
        .init();

    if is_debug_mode() {
        info!(
            "kiri v{} starting up (DEBUG MODE ENABLED)",
            env!("CARGO_PKG_VERSION")
        );
        info!("Set RUST_LOG for custom log levels, e.g. RUST_LOG=kiri_workspace=trace");
    } else {
        info!("kiri v{} starting up", env!("CARGO_PKG_VERSION"));
    }
}

/// Compute a centered origin for the given window size on the primary display.
fn centered_origin(w: f32, h: f32, cx: &mut App) -> Point<Pixels> {
    if let Some(display) = cx.primary_display() {
        let screen = display.bounds();
        let x = (f32::from(screen.size.width) - w) / 2.0;
        let y = (f32::from(screen.size.height) - h) / 2.0;
        Point::new(px(x.max(0.0)), px(y.max(0.0)))
    } else {
        Point::default()
    }
}

fn build_window_options(config: &Config, cx: &mut App) -> WindowOptions {
    let w = config.window_width.unwrap_or(window::DEFAULT_WIDTH);
    let h = config.window_height.unwrap_or(window::DEFAULT_HEIGHT);
    WindowOptions {
        window_bounds: Some(WindowBounds::Windowed(Bounds {
            origin: centered_origin(w, h, cx),
            size: Size {
                width: px(w),
                height: px(h),
            },
        })),
        titlebar: Some(TitlebarOptions {
            title: Some(window::TITLE.into()),
            appears_transparent: false,
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Open the main application window.
fn open_main_window(cx: &mut App) -> Result<()> {
    let config = settings::load_config();
    let options = build_window_options(&config, cx);
    cx.open_window(options, |window, cx| {
        let workspace = cx.new(|cx| Workspace::new(&config, window, cx));
        cx.new(|cx| gpui_component::Root::new(workspace, window, cx))
    })
    .context("Failed to open main window")?;

    info!("Main window opened in {:?}", STARTUP_TIME.elapsed());
    Ok(())
}

/// Bind the keymap (defaults plus the user's entries) and the keys the
/// terminal consumes itself.
fn register_keybindings(config: &Config, cx: &mut App) {
    let keymap = Keymap::from_config(&config.keybindings);
    let bindings = key_bindings(&keymap);
    debug!("Binding {} key chord(s)", bindings.len());
    cx.bind_keys(bindings);
    cx.bind_keys(terminal_bindings());
}

/// Callback for config file changes: rebuilds every key binding.
fn on_keybinding_config_apply(config: &Config, cx: &mut App) {
    cx.clear_key_bindings();
    register_keybindings(config, cx);
    info!("Keybindings reloaded");
}

/// Initialize subsystems.
fn initialize_subsystems(config: &Config, cx: &mut App) {
    gpui_component::init(cx);
    debug!("UI components initialized");

    theme::init(cx);
    debug!("Theme system initialized");

    // Without a window there is nobody to confirm with
    cx.on_action(|_: &Quit, cx| {
        info!("Application quit requested (fallback)");
        cx.quit();
    });
    register_keybindings(config, cx);
    debug!("Keybindings registered");

    if let Some(debouncer) = settings::watch_config(cx, on_keybinding_config_apply) {
        Box::leak(Box::new(debouncer));
    }
}

fn main() {
    let _ = *STARTUP_TIME;

    init_logging();

    match settings::ensure_config_file() {
        Some(path) => debug!("Config file: {}", path.display()),
        None => error!("Could not determine config directory"),
    }

    let app = Application::new().with_assets(Assets);

    app.on_reopen(|cx| {
        if cx.windows().is_empty() {
            if let Err(e) = open_main_window(cx) {
                error!("Failed to reopen window: {}", e);
            }
        }
    });

    app.run(|cx: &mut App| {
        cx.activate(true);
        let config = settings::load_config();
        initialize_subsystems(&config, cx);

        if let Err(e) = open_main_window(cx) {
            error!("Failed to open main window: {:#}", e);
            cx.quit();
        }

        info!(
            "Application fully initialized in {:?}",
            STARTUP_TIME.elapsed()
        );
    });
}
