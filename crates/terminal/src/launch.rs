//! Shell and browser launch descriptions.
//!
//! Both are resolved once from config + environment. Environment access goes
//! through a lookup closure so resolution is testable without touching the
//! process environment.

use anyhow::{bail, Context, Result};
use settings::constants::launch::{BROWSER_ENV, FALLBACK_SHELL, TERM};
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};
use std::thread::JoinHandle;

/// How to start the shell for a new session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellLaunch {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
    pub env: Vec<(String, String)>,
}

impl ShellLaunch {
    /// Resolve from the process environment.
    pub fn from_env(configured: Option<&str>) -> Self {
        Self::resolve(configured, |key| std::env::var(key).ok())
    }

    /// Config override, then `SHELL`, then the fallback shell. The working
    /// directory is `HOME` when set.
    pub fn resolve(configured: Option<&str>, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let program = configured
            .map(str::to_string)
            .or_else(|| lookup("SHELL"))
            .filter(|shell| !shell.trim().is_empty())
            .unwrap_or_else(|| FALLBACK_SHELL.to_string());

        let working_dir = lookup("HOME")
            .filter(|home| !home.is_empty())
            .map(PathBuf::from);

        Self {
            program,
            args: Vec::new(),
            working_dir,
            env: vec![("TERM".to_string(), TERM.to_string())],
        }
    }
}

/// Command used to open links in a browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserCommand {
    program: String,
    args: Vec<String>,
}

impl BrowserCommand {
    /// Resolve from the process environment.
    pub fn from_env(configured: Option<&str>) -> Self {
        Self::resolve(configured, |key| std::env::var(key).ok())
    }

    /// Config override, then `BROWSER`, then the platform opener.
    ///
    /// `BROWSER` may carry arguments; it is split with shell quoting rules.
    /// A value that does not parse falls through to the next candidate.
    pub fn resolve(configured: Option<&str>, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let candidates = configured
            .map(str::to_string)
            .into_iter()
            .chain(lookup(BROWSER_ENV));

        for candidate in candidates {
            match shell_words::split(&candidate) {
                Ok(mut words) if !words.is_empty() => {
                    let program = words.remove(0);
                    return Self {
                        program,
                        args: words,
                    };
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!("Ignoring unparsable browser command {:?}: {}", candidate, e)
                }
            }
        }

        Self::platform_default()
    }

    #[cfg(target_os = "macos")]
    fn platform_default() -> Self {
        Self {
            program: "open".into(),
            args: Vec::new(),
        }
    }

    #[cfg(target_os = "windows")]
    fn platform_default() -> Self {
        Self {
            program: "cmd".into(),
            args: vec!["/c".into(), "start".into(), "".into()],
        }
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    fn platform_default() -> Self {
        Self {
            program: "xdg-open".into(),
            args: Vec::new(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Launch the browser on `url` without waiting for it.
    pub fn open(&self, url: &str) -> Result<()> {
        self.launch(url).map(drop)
    }

    /// Spawn the browser and reap it on a background thread. The handle
    /// yields the exit status once the browser process is gone.
    fn launch(&self, url: &str) -> Result<JoinHandle<Option<ExitStatus>>> {
        if url.trim().is_empty() {
            bail!("refusing to open an empty link");
        }

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("Failed to launch browser '{}'", self.program))?;
        tracing::info!("Opened {} with {}", url, self.program);

        let program = self.program.clone();
        std::thread::Builder::new()
            .name("kiri-browser-reaper".into())
            .spawn(move || match child.wait() {
                Ok(status) => {
                    tracing::debug!("Browser '{}' exited with {}", program, status);
                    Some(status)
                }
                Err(e) => {
                    tracing::warn!("Failed to wait for browser '{}': {}", program, e);
                    None
                }
            })
            .context("Failed to spawn browser reaper thread")
    }
}
