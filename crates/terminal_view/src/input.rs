//! Keyboard and wheel input encoding for the PTY.

use std::fmt::Write as _;
use termwiz::input::{KeyCode, KeyCodeEncodeModes, KeyboardEncoding, Modifiers as TermwizMods};

/// Key modifiers relevant to terminal encoding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyMods {
    pub shift: bool,
    pub alt: bool,
    pub control: bool,
    pub platform: bool,
}

impl From<&gpui::Modifiers> for KeyMods {
    fn from(mods: &gpui::Modifiers) -> Self {
        Self {
            shift: mods.shift,
            alt: mods.alt,
            control: mods.control,
            platform: mods.platform,
        }
    }
}

impl KeyMods {
    fn only_shift(&self) -> bool {
        self.shift && !self.alt && !self.control && !self.platform
    }

    fn none(&self) -> bool {
        !self.shift && !self.alt && !self.control && !self.platform
    }

    fn to_termwiz(self) -> TermwizMods {
        let mut tm = TermwizMods::NONE;
        if self.shift {
            tm |= TermwizMods::SHIFT;
        }
        if self.alt {
            tm |= TermwizMods::ALT;
        }
        if self.control {
            tm |= TermwizMods::CTRL;
        }
        tm
    }
}

/// Bytes to send for a key press, or `None` when the key produces no input
/// (bare modifiers, platform-key chords).
///
/// `key` is the gpui key name, `key_char` the text the layout would type.
pub fn encode_key(
    key: &str,
    mods: KeyMods,
    key_char: Option<&str>,
    app_cursor: bool,
) -> Option<String> {
    if mods.platform {
        return None;
    }

    match key {
        "tab" if mods.only_shift() => return Some("\x1b[Z".into()),
        "tab" if mods.none() => return Some("\t".into()),
        "escape" if mods.none() => return Some("\x1b".into()),
        "enter" if mods.only_shift() => return Some("\x1b[13;2u".into()),
        "enter" if mods.none() => return Some("\r".into()),
        "backspace" if mods.only_shift() => return Some("\x7f".into()),
        "space" if mods.none() => return Some(" ".into()),
        "space" if mods.only_shift() => return Some("\x1b[32;2u".into()),
        "left" if mods.alt && !mods.control && !mods.shift => return Some("\x1bb".into()),
        "right" if mods.alt && !mods.control && !mods.shift => return Some("\x1bf".into()),
        "home" if mods.only_shift() => return Some("\x1b[1;2H".into()),
        "end" if mods.only_shift() => return Some("\x1b[1;2F".into()),
        _ => {}
    }

    // Printable text goes through as the layout typed it ("!" for shift-1)
    if !mods.control && !mods.alt {
        if let Some(text) = key_char.filter(|t| !t.is_empty() && !t.chars().any(char::is_control))
        {
            return Some(text.to_string());
        }
    }

    let keycode = key_to_termwiz(key)?;
    let modes = KeyCodeEncodeModes {
        encoding: KeyboardEncoding::Xterm,
        application_cursor_keys: app_cursor,
        newline_mode: false,
        modify_other_keys: None,
    };
    keycode
        .encode(mods.to_termwiz(), modes, true)
        .ok()
        .filter(|seq| !seq.is_empty())
}

fn key_to_termwiz(key: &str) -> Option<KeyCode> {
    let code = match key {
        "up" => KeyCode::UpArrow,
        "down" => KeyCode::DownArrow,
        "left" => KeyCode::LeftArrow,
        "right" => KeyCode::RightArrow,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" => KeyCode::PageUp,
        "pagedown" => KeyCode::PageDown,
        "insert" => KeyCode::Insert,
        "delete" => KeyCode::Delete,
        "tab" => KeyCode::Tab,
        "enter" => KeyCode::Enter,
        "escape" => KeyCode::Escape,
        "backspace" => KeyCode::Backspace,
        "space" => KeyCode::Char(' '),
        k if k.len() > 1 && k.starts_with('f') => {
            let n: u8 = k[1..].parse().ok()?;
            if !(1..=12).contains(&n) {
                return None;
            }
            KeyCode::Function(n)
        }
        k if k.chars().count() == 1 => KeyCode::Char(k.chars().next()?),
        _ => return None,
    };
    Some(code)
}

/// xterm wheel report. Button 64 is wheel up, 65 wheel down.
pub fn encode_wheel(up: bool, col: usize, row: usize, sgr: bool) -> String {
    let button: u8 = if up { 64 } else { 65 };
    let mut buf = String::with_capacity(16);
    if sgr {
        let _ = write!(
            buf,
            "\x1b[<{};{};{}M",
            button,
            col.saturating_add(1),
            row.saturating_add(1)
        );
    } else {
        // Legacy X10 coordinates are single bytes offset by 32
        let cb = button.saturating_add(32);
        let cx = (col.min(222) as u8).saturating_add(33);
        let cy = (row.min(222) as u8).saturating_add(33);
        let _ = write!(buf, "\x1b[M{}{}{}", cb as char, cx as char, cy as char);
    }
    buf
}

/// Wrap pasted text in bracketed-paste markers when the application asked
/// for them. Embedded end markers are stripped so the paste cannot end early.
pub fn paste_payload(text: &str, bracketed: bool) -> String {
    if bracketed {
        format!("\x1b[200~{}\x1b[201~", text.replace("\x1b[201~", ""))
    } else {
        text.replace("\r\n", "\r").replace('\n', "\r")
    }
}
