//! The single event type fed to [`AppState::handle`](crate::AppState::handle).

use crate::command::Command;
use crate::session::SessionId;
use std::path::PathBuf;
use terminal::FontDescriptor;

/// Everything that can change application state.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A user command (keybinding, button or menu entry).
    Command(Command),
    /// The close button of a specific tab was clicked.
    CloseTab(SessionId),
    /// The session's shell exited (or its PTY reached end of file).
    ChildExited(SessionId),
    /// The font dialog was accepted.
    FontChosen(FontDescriptor),
    /// The background image picker opened for `session` was accepted.
    BackgroundChosen { session: SessionId, path: PathBuf },
    /// The tab name dialog opened for `session` was accepted.
    TabNameChosen { session: SessionId, name: String },
    /// Right click inside a session. `link` is the link target under the
    /// pointer, if any.
    ContextMenuRequested {
        session: SessionId,
        link: Option<String>,
    },
    /// The window manager asked to close the window.
    CloseRequested,
    /// Answer to the close confirmation prompt.
    CloseConfirmed(bool),
}

impl From<Command> for Event {
    fn from(command: Command) -> Self {
        Self::Command(command)
    }
}
