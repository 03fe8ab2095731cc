//! Shared helpers for workspace integration tests.

// Not every test file uses every helper
#![allow(dead_code)]

use anyhow::{anyhow, Result};
use kiri_workspace::{AppState, ContextMenu, Host, SessionId, Spawned};
use std::path::{Path, PathBuf};
use terminal::{FontDescriptor, ShellLaunch};

/// Side effects a [`FakeHost`] was asked for, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Spawn(u32),
    Terminate(u32),
    Focus(u32),
    ApplyFont(u32, FontDescriptor),
    PersistFont(FontDescriptor),
    ApplyBackground(u32, PathBuf),
    KeepAbove(bool),
    ContextMenu(ContextMenu),
    FontDialog,
    BackgroundDialog(SessionId),
    TabNameDialog(SessionId, Option<String>),
    ConfirmClose(usize),
    OpenLink(String),
    Copy(String),
    Quit,
}

/// Host whose terminals are plain numbers (1, 2, 3... in spawn order).
#[derive(Default)]
pub struct FakeHost {
    pub calls: Vec<Call>,
    next_terminal: u32,
    /// Spawns fail while this is set
    pub fail_spawn: bool,
    /// Live terminals, in spawn order
    pub live: Vec<u32>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|call| matches(call)).count()
    }

    pub fn last_focus(&self) -> Option<u32> {
        self.calls.iter().rev().find_map(|call| match call {
            Call::Focus(terminal) => Some(*terminal),
            _ => None,
        })
    }

    pub fn quit_called(&self) -> bool {
        self.calls.contains(&Call::Quit)
    }
}

impl Host for FakeHost {
    type Terminal = u32;

    fn spawn_terminal(
        &mut self,
        _id: SessionId,
        _launch: &ShellLaunch,
        _font: &FontDescriptor,
    ) -> Result<Spawned<u32>> {
        if self.fail_spawn {
            return Err(anyhow!("openpty: out of pseudo-terminals"));
        }
        self.next_terminal += 1;
        let terminal = self.next_terminal;
        self.live.push(terminal);
        self.calls.push(Call::Spawn(terminal));
        Ok(Spawned {
            terminal,
            pid: Some(40_000 + terminal),
        })
    }

    fn terminate(&mut self, terminal: &u32) {
        self.live.retain(|t| t != terminal);
        self.calls.push(Call::Terminate(*terminal));
    }

    fn focus(&mut self, terminal: &u32) {
        self.calls.push(Call::Focus(*terminal));
    }

    fn apply_font(&mut self, terminal: &u32, font: &FontDescriptor) {
        self.calls.push(Call::ApplyFont(*terminal, font.clone()));
    }

    fn persist_font(&mut self, font: &FontDescriptor) {
        self.calls.push(Call::PersistFont(font.clone()));
    }

    fn apply_background(&mut self, terminal: &u32, image: &Path) -> Result<()> {
        self.calls
            .push(Call::ApplyBackground(*terminal, image.to_path_buf()));
        Ok(())
    }

    fn set_keep_above(&mut self, keep_above: bool) -> Result<()> {
        self.calls.push(Call::KeepAbove(keep_above));
        Ok(())
    }

    fn show_context_menu(&mut self, menu: ContextMenu) {
        self.calls.push(Call::ContextMenu(menu));
    }

    fn open_font_dialog(&mut self, _current: &FontDescriptor) {
        self.calls.push(Call::FontDialog);
    }

    fn open_background_dialog(&mut self, session: SessionId) {
        self.calls.push(Call::BackgroundDialog(session));
    }

    fn open_tab_name_dialog(&mut self, session: SessionId, current: Option<String>) {
        self.calls.push(Call::TabNameDialog(session, current));
    }

    fn confirm_close(&mut self, open_tabs: usize) {
        self.calls.push(Call::ConfirmClose(open_tabs));
    }

    fn open_link(&mut self, url: &str) -> Result<()> {
        self.calls.push(Call::OpenLink(url.to_string()));
        Ok(())
    }

    fn copy_to_clipboard(&mut self, text: &str) {
        self.calls.push(Call::Copy(text.to_string()));
    }

    fn quit(&mut self) {
        self.calls.push(Call::Quit);
    }
}

pub fn launch() -> ShellLaunch {
    ShellLaunch::resolve(Some("/bin/sh"), |_| None)
}

pub fn font() -> FontDescriptor {
    FontDescriptor::new("DejaVu Sans Mono", 12.0)
}

/// A started state with `tabs` open tabs.
pub fn started(tabs: usize) -> (AppState<u32>, FakeHost) {
    let mut host = FakeHost::new();
    let mut state = AppState::new(launch(), font(), false);
    state.start(None, &mut host);
    for _ in 1..tabs {
        state.handle(kiri_workspace::Command::NewTab.into(), &mut host);
    }
    (state, host)
}

/// Terminals in tab order.
pub fn tab_order(state: &AppState<u32>) -> Vec<u32> {
    state.sessions().iter().map(|s| s.terminal).collect()
}

pub fn active_terminal(state: &AppState<u32>) -> Option<u32> {
    state.sessions().active().map(|s| s.terminal)
}
