//! X11/EWMH window state through `wmctrl`.

use anyhow::{Context, Result};
use std::process::{Child, Command, Stdio};

const WMCTRL: &str = "wmctrl";

/// `-F` makes `-r` match the title exactly, so only our window is touched.
fn wmctrl_args(window_title: &str, keep_above: bool) -> [&str; 5] {
    let state = if keep_above {
        "add,above"
    } else {
        "remove,above"
    };
    ["-F", "-r", window_title, "-b", state]
}

pub fn set_keep_above(window_title: &str, keep_above: bool) -> Result<()> {
    let child = Command::new(WMCTRL)
        .args(wmctrl_args(window_title, keep_above))
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("Failed to run {}", WMCTRL))?;

    reap(child, keep_above)
}

/// Wait for `wmctrl` on its own thread so the caller never blocks.
fn reap(mut child: Child, keep_above: bool) -> Result<()> {
    std::thread::Builder::new()
        .name("kiri-wmctrl".into())
        .spawn(move || match child.wait() {
            Ok(status) if status.success() => {
                tracing::debug!(keep_above, "Window keep-above updated");
            }
            Ok(status) => tracing::warn!("{} exited with {}", WMCTRL, status),
            Err(e) => tracing::warn!("Failed to wait for {}: {}", WMCTRL, e),
        })
        .context("Failed to spawn wmctrl reaper thread")?;
    Ok(())
}
