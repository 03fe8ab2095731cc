//! macOS window level via AppKit.

use anyhow::{anyhow, Result};
use objc2::MainThreadMarker;
use objc2_app_kit::NSApplication;

/// NSNormalWindowLevel
const NORMAL_WINDOW_LEVEL: isize = 0;
/// NSFloatingWindowLevel
const FLOATING_WINDOW_LEVEL: isize = 3;

/// The key window of this process is ours, so the title is not needed once
/// the window has been activated.
pub fn set_keep_above(_window_title: &str, keep_above: bool) -> Result<()> {
    let mtm = MainThreadMarker::new()
        .ok_or_else(|| anyhow!("Window level can only be changed on the main thread"))?;
    let app = NSApplication::sharedApplication(mtm);
    let window = app
        .keyWindow()
        .ok_or_else(|| anyhow!("No key window to change the level of"))?;

    let level = if keep_above {
        FLOATING_WINDOW_LEVEL
    } else {
        NORMAL_WINDOW_LEVEL
    };
    unsafe {
        let _: () = objc2::msg_send![&window, setLevel: level];
    }
    tracing::debug!(keep_above, "Window level updated");
    Ok(())
}
