//! Terminal GPUI view layer.
//!
//! Rendering, input handling and color conversion for one terminal pane.

mod background;
mod colors;
mod input;
mod pane;
mod render;

pub use background::probe_image;
pub use pane::{PaneOptions, TerminalEvent, TerminalPane};
