//! Terminal session plumbing.
//!
//! PTY management, VT processing thread, shell/browser launch, link
//! recognition and the data types the pane renders from. No GPUI behavior
//! lives here (gpui types are used for data representation only).

pub mod font;
pub mod launch;
pub mod links;
mod pty_handler;
pub mod types;
pub mod vt_processor;

pub use font::FontDescriptor;
pub use launch::{BrowserCommand, ShellLaunch};
pub use links::{find_link_at, LinkKind, LinkSpan};
pub use pty_handler::PtyHandler;
pub use types::*;
pub use vt_processor::TerminalProcessor;
