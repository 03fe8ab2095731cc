//! Side effects the application core asks of its toolkit.

use crate::command::Command;
use crate::session::SessionId;
use anyhow::Result;
use std::path::Path;
use terminal::{FontDescriptor, ShellLaunch};

/// A freshly spawned terminal and the pid of its shell.
pub struct Spawned<T> {
    pub terminal: T,
    pub pid: Option<u32>,
}

/// One row of the context menu.
#[derive(Debug, Clone, PartialEq)]
pub enum MenuItem {
    Entry {
        label: &'static str,
        command: Command,
        /// `Some` for checkable entries.
        checked: Option<bool>,
    },
    Separator,
}

/// Context menu contents for a right click in `session`.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextMenu {
    pub session: SessionId,
    pub items: Vec<MenuItem>,
}

impl ContextMenu {
    /// Link entries come first and only when a link was matched.
    pub fn build(session: SessionId, has_link: bool, keep_above: bool) -> Self {
        let mut items = Vec::new();
        if has_link {
            items.push(MenuItem::Entry {
                label: "Open link",
                command: Command::OpenLink,
                checked: None,
            });
            items.push(MenuItem::Entry {
                label: "Copy link",
                command: Command::CopyLink,
                checked: None,
            });
            items.push(MenuItem::Separator);
        }
        items.extend([
            MenuItem::Entry {
                label: "New tab",
                command: Command::NewTab,
                checked: None,
            },
            MenuItem::Entry {
                label: "Set tab name...",
                command: Command::SetTabName,
                checked: None,
            },
            MenuItem::Separator,
            MenuItem::Entry {
                label: "Select font...",
                command: Command::SelectFont,
                checked: None,
            },
            MenuItem::Entry {
                label: "Select background...",
                command: Command::SelectBackground,
                checked: None,
            },
            MenuItem::Entry {
                label: "Always on top",
                command: Command::ToggleAlwaysOnTop,
                checked: Some(keep_above),
            },
            MenuItem::Separator,
            MenuItem::Entry {
                label: "Close tab",
                command: Command::CloseTab,
                checked: None,
            },
        ]);
        Self { session, items }
    }

    pub fn commands(&self) -> impl Iterator<Item = Command> + '_ {
        self.items.iter().filter_map(|item| match item {
            MenuItem::Entry { command, .. } => Some(*command),
            MenuItem::Separator => None,
        })
    }
}

/// Toolkit-facing collaborator of [`AppState`](crate::AppState).
///
/// Every method runs on the UI thread and must not block.
#[cfg_attr(test, mockall::automock(type Terminal = u32;))]
pub trait Host {
    /// Terminal handle stored in each session.
    type Terminal;

    /// Create a terminal running `launch` with `font`. On error nothing may
    /// be left behind.
    fn spawn_terminal(
        &mut self,
        id: SessionId,
        launch: &ShellLaunch,
        font: &FontDescriptor,
    ) -> Result<Spawned<Self::Terminal>>;

    /// Kill the terminal's shell and reap it without waiting.
    fn terminate(&mut self, terminal: &Self::Terminal);

    /// Give keyboard focus to the terminal.
    fn focus(&mut self, terminal: &Self::Terminal);

    fn apply_font(&mut self, terminal: &Self::Terminal, font: &FontDescriptor);

    /// Remember the font for the next start.
    fn persist_font(&mut self, font: &FontDescriptor);

    /// Load `image` as the terminal's background. On error the terminal's
    /// appearance is unchanged.
    fn apply_background(&mut self, terminal: &Self::Terminal, image: &Path) -> Result<()>;

    fn set_keep_above(&mut self, keep_above: bool) -> Result<()>;

    fn show_context_menu(&mut self, menu: ContextMenu);

    fn open_font_dialog(&mut self, current: &FontDescriptor);

    /// Pick a background for `session`. The answer comes back as
    /// [`Event::BackgroundChosen`](crate::Event::BackgroundChosen) carrying
    /// the same session.
    fn open_background_dialog(&mut self, session: SessionId);

    /// Name the tab of `session`. `current` is the name the user gave the
    /// tab, if any.
    fn open_tab_name_dialog(&mut self, session: SessionId, current: Option<String>);

    /// Ask whether to close a window with `open_tabs` tabs. The answer comes
    /// back as [`Event::CloseConfirmed`](crate::Event::CloseConfirmed).
    fn confirm_close(&mut self, open_tabs: usize);

    fn open_link(&mut self, url: &str) -> Result<()>;

    fn copy_to_clipboard(&mut self, text: &str);

    /// Shut the application down.
    fn quit(&mut self);
}
