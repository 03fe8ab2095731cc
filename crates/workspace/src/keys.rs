//! Keymap → gpui key bindings.

use crate::command::{Command, Keymap};
use actions::*;
use gpui::KeyBinding;

/// Key context set by the terminal pane.
const TERMINAL_CONTEXT: &str = "terminal";

/// One gpui binding per keymap entry, active everywhere in the window.
pub fn key_bindings(keymap: &Keymap) -> Vec<KeyBinding> {
    keymap
        .bindings()
        .map(|(keys, command)| binding(&keys, command))
        .collect()
}

/// Keys the terminal must see before gpui's focus handling takes them.
pub fn terminal_bindings() -> Vec<KeyBinding> {
    vec![
        KeyBinding::new("tab", SendTab, Some(TERMINAL_CONTEXT)),
        KeyBinding::new("shift-tab", SendShiftTab, Some(TERMINAL_CONTEXT)),
        KeyBinding::new("ctrl-shift-v", Paste, Some(TERMINAL_CONTEXT)),
    ]
}

fn binding(keys: &str, command: Command) -> KeyBinding {
    match command {
        Command::NewTab => KeyBinding::new(keys, NewTab, None),
        Command::CloseTab => KeyBinding::new(keys, CloseTab, None),
        Command::NextTab => KeyBinding::new(keys, NextTab, None),
        Command::PrevTab => KeyBinding::new(keys, PrevTab, None),
        Command::ActivateTab(index) => KeyBinding::new(keys, ActivateTab(index), None),
        Command::IncreaseFontSize => KeyBinding::new(keys, IncreaseFontSize, None),
        Command::DecreaseFontSize => KeyBinding::new(keys, DecreaseFontSize, None),
        Command::SelectFont => KeyBinding::new(keys, SelectFont, None),
        Command::SelectBackground => KeyBinding::new(keys, SelectBackground, None),
        Command::SetTabName => KeyBinding::new(keys, SetTabName, None),
        Command::ToggleAlwaysOnTop => KeyBinding::new(keys, ToggleAlwaysOnTop, None),
        Command::OpenLink => KeyBinding::new(keys, OpenLink, None),
        Command::CopyLink => KeyBinding::new(keys, CopyLink, None),
        Command::Quit => KeyBinding::new(keys, Quit, None),
    }
}
