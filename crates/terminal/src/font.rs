//! Terminal font description.

use settings::constants::terminal::{
    DEFAULT_FONT_SIZE, FONT_FAMILY, FONT_SIZE_STEP, MAX_FONT_SIZE, MIN_FONT_SIZE,
};
use std::fmt;

/// Family and point size, written as `"Family Size"` (e.g. `"DejaVu Sans Mono 13"`).
#[derive(Debug, Clone, PartialEq)]
pub struct FontDescriptor {
    family: String,
    size: f32,
}

impl Default for FontDescriptor {
    fn default() -> Self {
        Self::new(FONT_FAMILY, DEFAULT_FONT_SIZE)
    }
}

impl FontDescriptor {
    /// Build a descriptor; the size is clamped to the supported range.
    pub fn new(family: impl Into<String>, size: f32) -> Self {
        let family = family.into();
        let family = match family.trim() {
            "" => FONT_FAMILY.to_string(),
            trimmed => trimmed.to_string(),
        };
        Self {
            family,
            size: clamp_size(size),
        }
    }

    /// Parse `"Family Size"`. A missing size keeps the default size.
    /// Returns `None` for empty input or a non-positive size.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        match text.rsplit_once(char::is_whitespace) {
            Some((family, size)) => match size.parse::<f32>() {
                Ok(size) if size.is_finite() && size > 0.0 => {
                    Some(Self::new(family, size))
                }
                Ok(_) => None,
                Err(_) => Some(Self::new(text, DEFAULT_FONT_SIZE)),
            },
            None => match text.parse::<f32>() {
                Ok(_) => None,
                Err(_) => Some(Self::new(text, DEFAULT_FONT_SIZE)),
            },
        }
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    /// Same family, one step larger (clamped).
    pub fn larger(&self) -> Self {
        self.with_size(self.size + FONT_SIZE_STEP)
    }

    /// Same family, one step smaller (clamped).
    pub fn smaller(&self) -> Self {
        self.with_size(self.size - FONT_SIZE_STEP)
    }

    pub fn with_size(&self, size: f32) -> Self {
        Self {
            family: self.family.clone(),
            size: clamp_size(size),
        }
    }
}

impl fmt::Display for FontDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.size.fract() == 0.0 {
            write!(f, "{} {}", self.family, self.size as i32)
        } else {
            write!(f, "{} {:.1}", self.family, self.size)
        }
    }
}

fn clamp_size(size: f32) -> f32 {
    if size.is_finite() {
        size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE)
    } else {
        DEFAULT_FONT_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use test_case::test_case;

    #[test_case("DejaVu Sans Mono 13", "DejaVu Sans Mono", 13.0 ; "multi word family")]
    #[test_case("Menlo 11.5", "Menlo", 11.5 ; "fractional size")]
    #[test_case("  Fira Code   15  ", "Fira Code", 15.0 ; "surrounding whitespace")]
    #[test_case("Monospace", "Monospace", DEFAULT_FONT_SIZE ; "family only")]
    #[test_case("Menlo 200", "Menlo", MAX_FONT_SIZE ; "size clamped high")]
    #[test_case("Menlo 1", "Menlo", MIN_FONT_SIZE ; "size clamped low")]
    fn parses_family_and_size(text: &str, family: &str, size: f32) {
        let font = FontDescriptor::parse(text).unwrap();
        assert_eq!(font.family(), family);
        assert_eq!(font.size(), size);
    }

    #[test_case("" ; "empty")]
    #[test_case("   " ; "blank")]
    #[test_case("12" ; "size only")]
    #[test_case("Menlo 0" ; "zero size")]
    #[test_case("Menlo -4" ; "negative size")]
    fn rejects_invalid(text: &str) {
        assert_eq!(FontDescriptor::parse(text), None);
    }

    #[test]
    fn displays_as_family_and_size() {
        assert_eq!(
            FontDescriptor::new("DejaVu Sans Mono", 13.0).to_string(),
            "DejaVu Sans Mono 13"
        );
        assert_eq!(FontDescriptor::new("Menlo", 11.5).to_string(), "Menlo 11.5");
    }

    #[test]
    fn steps_by_one_and_stops_at_bounds() {
        let font = FontDescriptor::new("Menlo", 13.0);
        assert_eq!(font.larger().size(), 14.0);
        assert_eq!(font.smaller().size(), 12.0);
        assert_eq!(font.larger().family(), "Menlo");

        let max = FontDescriptor::new("Menlo", MAX_FONT_SIZE);
        assert_eq!(max.larger(), max);
        let min = FontDescriptor::new("Menlo", MIN_FONT_SIZE);
        assert_eq!(min.smaller(), min);
    }

    #[test]
    fn blank_family_uses_default() {
        assert_eq!(FontDescriptor::new("  ", 12.0).family(), FONT_FAMILY);
    }

    proptest! {
        #[test]
        fn display_then_parse_keeps_font(size in 8u8..=32u8) {
            let font = FontDescriptor::new("JetBrains Mono", f32::from(size));
            prop_assert_eq!(FontDescriptor::parse(&font.to_string()), Some(font));
        }

        #[test]
        fn size_always_within_bounds(size in proptest::num::f32::ANY) {
            let font = FontDescriptor::new("Menlo", size);
            prop_assert!(font.size() >= MIN_FONT_SIZE && font.size() <= MAX_FONT_SIZE);
        }
    }
}
