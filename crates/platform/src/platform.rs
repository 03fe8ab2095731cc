//! Native window integrations.
//!
//! Keeping the window above others is a window-manager request that gpui
//! does not expose, so it is done per platform here.

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "linux")]
mod linux;

use anyhow::Result;

/// Ask the window manager to keep the window titled `window_title` above
/// other windows, or to stop doing so. Must be called once the window is
/// active. Does not wait for the window manager.
pub fn set_keep_above(window_title: &str, keep_above: bool) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        macos::set_keep_above(window_title, keep_above)
    }
    #[cfg(target_os = "linux")]
    {
        linux::set_keep_above(window_title, keep_above)
    }
    #[cfg(not(any(target_os = "macos", target_os = "linux")))]
    {
        anyhow::bail!(
            "Keeping '{}' on top (requested: {}) is not supported on this platform",
            window_title,
            keep_above
        )
    }
}
