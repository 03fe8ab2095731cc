//! Workspace for kiri.
//!
//! Sessions and tab order, the event dispatcher, and the window that shows
//! them. The dispatcher only talks to the toolkit through [`Host`], so the
//! tab logic runs the same against a gpui window and a test double.

mod command;
mod dialogs;
mod event;
mod host;
mod keys;
mod session;
mod state;
mod window_host;
mod workspace_view;

pub use command::{default_bindings, Command, KeyChord, Keymap, MAX_NUMBERED_TABS};
pub use event::Event;
pub use host::{ContextMenu, Host, MenuItem, Spawned};
pub use keys::{key_bindings, terminal_bindings};
pub use session::{Session, SessionId, SessionList};
pub use state::{AppState, Lifecycle};
pub use workspace_view::Workspace;
