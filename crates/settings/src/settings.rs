//! Configuration system for kiri.
//!
//! Provides compile-time constants and TOML config file support.

pub mod constants;
pub mod file;

pub use file::{
    apply_config, config_path, ensure_config_file, load_config, load_config_from, save_font,
    save_font_to, watch_config, Config, KeybindingEntry,
};
