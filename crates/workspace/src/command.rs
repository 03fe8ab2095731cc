//! User commands and the keymap that triggers them.

use settings::KeybindingEntry;
use std::fmt;

/// Something the user asked for through a key chord, a tab-strip button or
/// the context menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    NewTab,
    CloseTab,
    NextTab,
    PrevTab,
    /// Switch to the tab at this 0-based index.
    ActivateTab(usize),
    IncreaseFontSize,
    DecreaseFontSize,
    SelectFont,
    SelectBackground,
    SetTabName,
    ToggleAlwaysOnTop,
    OpenLink,
    CopyLink,
    Quit,
}

/// Number of tabs reachable through `activate-tab-N` / Alt+digit.
pub const MAX_NUMBERED_TABS: usize = 9;

impl Command {
    /// Parse a config action name (`"new-tab"`, `"activate-tab-3"`, ...).
    pub fn from_name(name: &str) -> Option<Self> {
        let command = match name {
            "new-tab" => Self::NewTab,
            "close-tab" => Self::CloseTab,
            "next-tab" => Self::NextTab,
            "prev-tab" => Self::PrevTab,
            "increase-font-size" => Self::IncreaseFontSize,
            "decrease-font-size" => Self::DecreaseFontSize,
            "select-font" => Self::SelectFont,
            "select-background" => Self::SelectBackground,
            "set-tab-name" => Self::SetTabName,
            "toggle-always-on-top" => Self::ToggleAlwaysOnTop,
            "open-link" => Self::OpenLink,
            "copy-link" => Self::CopyLink,
            "quit" => Self::Quit,
            other => {
                let number: usize = other.strip_prefix("activate-tab-")?.parse().ok()?;
                if !(1..=MAX_NUMBERED_TABS).contains(&number) {
                    return None;
                }
                Self::ActivateTab(number - 1)
            }
        };
        Some(command)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NewTab => "new-tab",
            Self::CloseTab => "close-tab",
            Self::NextTab => "next-tab",
            Self::PrevTab => "prev-tab",
            Self::ActivateTab(index) => return write!(f, "activate-tab-{}", index + 1),
            Self::IncreaseFontSize => "increase-font-size",
            Self::DecreaseFontSize => "decrease-font-size",
            Self::SelectFont => "select-font",
            Self::SelectBackground => "select-background",
            Self::SetTabName => "set-tab-name",
            Self::ToggleAlwaysOnTop => "toggle-always-on-top",
            Self::OpenLink => "open-link",
            Self::CopyLink => "copy-link",
            Self::Quit => "quit",
        };
        f.write_str(name)
    }
}

/// A key chord in gpui keystroke syntax, normalized so modifier order does
/// not matter (`"shift-ctrl-T"` and `"ctrl-shift-t"` are the same chord).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyChord {
    ctrl: bool,
    alt: bool,
    shift: bool,
    platform: bool,
    key: String,
}

impl KeyChord {
    pub fn parse(text: &str) -> Option<Self> {
        let mut chord = Self {
            ctrl: false,
            alt: false,
            shift: false,
            platform: false,
            key: String::new(),
        };

        let text = text.trim();
        // A trailing "-" is the minus key itself ("ctrl--")
        let (modifiers, key) = match text.strip_suffix("--") {
            Some(rest) => (rest, "-"),
            None => match text.rsplit_once('-') {
                Some((modifiers, key)) => (modifiers, key),
                None => ("", text),
            },
        };

        if key.is_empty() {
            return None;
        }

        for modifier in modifiers.split('-').filter(|m| !m.is_empty()) {
            match modifier.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => chord.ctrl = true,
                "alt" | "option" => chord.alt = true,
                "shift" => chord.shift = true,
                "cmd" | "super" | "win" | "platform" => chord.platform = true,
                _ => return None,
            }
        }

        chord.key = key.to_ascii_lowercase();
        Some(chord)
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (set, name) in [
            (self.ctrl, "ctrl-"),
            (self.alt, "alt-"),
            (self.shift, "shift-"),
            (self.platform, "cmd-"),
        ] {
            if set {
                f.write_str(name)?;
            }
        }
        f.write_str(&self.key)
    }
}

/// Default chords. Alt+1..9 switch tabs.
pub fn default_bindings() -> Vec<(&'static str, Command)> {
    let mut bindings = vec![
        ("ctrl-shift-t", Command::NewTab),
        ("ctrl-shift-w", Command::CloseTab),
        ("ctrl-tab", Command::NextTab),
        ("ctrl-shift-tab", Command::PrevTab),
        ("ctrl-=", Command::IncreaseFontSize),
        ("ctrl-+", Command::IncreaseFontSize),
        ("ctrl-shift-=", Command::IncreaseFontSize),
        ("ctrl--", Command::DecreaseFontSize),
        ("ctrl-shift-f", Command::SelectFont),
        ("ctrl-shift-b", Command::SelectBackground),
        ("ctrl-shift-n", Command::SetTabName),
        ("ctrl-shift-a", Command::ToggleAlwaysOnTop),
        ("ctrl-shift-q", Command::Quit),
    ];
    const DIGIT_KEYS: [&str; MAX_NUMBERED_TABS] = [
        "alt-1", "alt-2", "alt-3", "alt-4", "alt-5", "alt-6", "alt-7", "alt-8", "alt-9",
    ];
    bindings.extend(
        DIGIT_KEYS
            .iter()
            .enumerate()
            .map(|(index, keys)| (*keys, Command::ActivateTab(index))),
    );
    bindings
}

/// Chord → command table: the defaults overlaid with user entries.
#[derive(Debug, Clone, Default)]
pub struct Keymap {
    bindings: Vec<(KeyChord, Command)>,
}

impl Keymap {
    pub fn with_defaults() -> Self {
        let mut keymap = Self::default();
        for (keys, command) in default_bindings() {
            keymap.bind(keys, command);
        }
        keymap
    }

    /// Defaults plus config entries. Entries with an unknown action name or
    /// an unparsable chord are skipped with a warning.
    pub fn from_config(entries: &[KeybindingEntry]) -> Self {
        let mut keymap = Self::with_defaults();
        keymap.apply(entries);
        keymap
    }

    /// Overlay config entries. Returns how many were applied.
    pub fn apply(&mut self, entries: &[KeybindingEntry]) -> usize {
        let mut applied = 0;
        for entry in entries {
            let Some(command) = Command::from_name(&entry.action) else {
                tracing::warn!("Unknown keybinding action: '{}'", entry.action);
                continue;
            };
            if self.bind(&entry.keys, command) {
                applied += 1;
            }
        }
        applied
    }

    /// Bind `keys` to `command`, replacing any previous binding of the chord.
    pub fn bind(&mut self, keys: &str, command: Command) -> bool {
        let Some(chord) = KeyChord::parse(keys) else {
            tracing::warn!("Invalid key chord: '{}'", keys);
            return false;
        };
        self.bindings.retain(|(existing, _)| *existing != chord);
        self.bindings.push((chord, command));
        true
    }

    pub fn lookup(&self, keys: &str) -> Option<Command> {
        let chord = KeyChord::parse(keys)?;
        self.bindings
            .iter()
            .find(|(bound, _)| *bound == chord)
            .map(|(_, command)| *command)
    }

    /// Bindings in registration order, chords in canonical form.
    pub fn bindings(&self) -> impl Iterator<Item = (String, Command)> + '_ {
        self.bindings
            .iter()
            .map(|(chord, command)| (chord.to_string(), *command))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case("new-tab", Some(Command::NewTab))]
    #[test_case("toggle-always-on-top", Some(Command::ToggleAlwaysOnTop))]
    #[test_case("activate-tab-1", Some(Command::ActivateTab(0)))]
    #[test_case("activate-tab-9", Some(Command::ActivateTab(8)))]
    #[test_case("activate-tab-0", None)]
    #[test_case("activate-tab-10", None)]
    #[test_case("split-vertical", None)]
    fn parses_action_names(name: &str, expected: Option<Command>) {
        assert_eq!(Command::from_name(name), expected);
    }

    #[test]
    fn names_round_trip_through_display() {
        for (_, command) in default_bindings() {
            assert_eq!(Command::from_name(&command.to_string()), Some(command));
        }
    }

    #[test_case("ctrl-shift-t", "ctrl-shift-t")]
    #[test_case("shift-ctrl-T", "ctrl-shift-t")]
    #[test_case("ctrl--", "ctrl--")]
    #[test_case("super-k", "cmd-k")]
    #[test_case("alt-1", "alt-1")]
    #[test_case("f5", "f5")]
    fn chords_are_normalized(input: &str, canonical: &str) {
        assert_eq!(KeyChord::parse(input).unwrap().to_string(), canonical);
    }

    #[test_case("" ; "empty")]
    #[test_case("ctrl-" ; "missing key")]
    #[test_case("hyper-k" ; "unknown modifier")]
    fn rejects_bad_chords(input: &str) {
        assert_eq!(KeyChord::parse(input), None);
    }

    #[test]
    fn defaults_cover_tab_shortcuts() {
        let keymap = Keymap::with_defaults();
        assert_eq!(keymap.lookup("ctrl-shift-t"), Some(Command::NewTab));
        assert_eq!(keymap.lookup("ctrl-shift-w"), Some(Command::CloseTab));
        assert_eq!(keymap.lookup("alt-1"), Some(Command::ActivateTab(0)));
        assert_eq!(keymap.lookup("alt-9"), Some(Command::ActivateTab(8)));
        assert_eq!(keymap.lookup("ctrl--"), Some(Command::DecreaseFontSize));
        assert_eq!(keymap.lookup("alt-0"), None);
    }

    #[test]
    fn config_entries_override_defaults() {
        let keymap = Keymap::from_config(&[
            KeybindingEntry {
                keys: "ctrl-shift-t".into(),
                action: "set-tab-name".into(),
            },
            KeybindingEntry {
                keys: "ctrl-alt-1".into(),
                action: "activate-tab-1".into(),
            },
        ]);
        assert_eq!(keymap.lookup("ctrl-shift-t"), Some(Command::SetTabName));
        assert_eq!(keymap.lookup("ctrl-alt-1"), Some(Command::ActivateTab(0)));
        assert_eq!(keymap.lookup("alt-1"), Some(Command::ActivateTab(0)));
        let rebinds = keymap
            .bindings()
            .filter(|(keys, _)| keys == "ctrl-shift-t")
            .count();
        assert_eq!(rebinds, 1);
    }

    #[test]
    fn unknown_entries_are_skipped() {
        let mut keymap = Keymap::with_defaults();
        let applied = keymap.apply(&[
            KeybindingEntry {
                keys: "ctrl-l".into(),
                action: "clear".into(),
            },
            KeybindingEntry {
                keys: "hyper-x".into(),
                action: "new-tab".into(),
            },
        ]);
        assert_eq!(applied, 0);
        assert_eq!(keymap.lookup("ctrl-l"), None);
    }
}
