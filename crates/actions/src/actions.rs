//! Actions shared between the workspace, the terminal view and the binary.
//!
//! Key bindings are built from the keymap at startup; each bound command maps
//! to one of these actions.

use gpui::actions;

// Application lifecycle
actions!(kiri, [Quit]);

// Tab management
actions!(kiri, [NewTab, CloseTab, NextTab, PrevTab, SetTabName]);

// Appearance
actions!(
    kiri,
    [
        IncreaseFontSize,
        DecreaseFontSize,
        SelectFont,
        SelectBackground,
        ToggleAlwaysOnTop
    ]
);

// Context menu link entries
actions!(kiri, [OpenLink, CopyLink]);

// Terminal-specific actions to capture keys before GPUI's focus system
actions!(terminal, [SendTab, SendShiftTab, Paste]);

/// Switch to the tab at this 0-based index.
#[derive(Clone, PartialEq, gpui::Action)]
#[action(namespace = kiri, no_json)]
pub struct ActivateTab(pub usize);
