//! Link recognition in terminal rows.
//!
//! A row is the text of one visual terminal line with exactly one `char` per
//! column, so char indices and column indices are interchangeable.

use once_cell::sync::Lazy;
use regex::Regex;

/// Patterns recognised as links, tried in order.
static LINK_PATTERNS: Lazy<Vec<(LinkKind, Regex)>> = Lazy::new(|| {
    [
        (
            LinkKind::Url,
            r"(?:https?|ftp|file|gopher|news|telnet|nntp)://[-A-Za-z0-9._~:/?#\[\]@!$&'()*+,;=%]+",
        ),
        (LinkKind::Url, r"(?:www|ftp)[-A-Za-z0-9]*\.[-A-Za-z0-9.]+(?::[0-9]+)?(?:/[-A-Za-z0-9._~:/?#\[\]@!$&'()*+,;=%]*)?"),
        (LinkKind::Email, r"(?:mailto:)?[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)+"),
    ]
    .into_iter()
    .filter_map(|(kind, pattern)| match Regex::new(pattern) {
        Ok(re) => Some((kind, re)),
        Err(e) => {
            tracing::error!("Invalid link pattern {:?}: {}", pattern, e);
            None
        }
    })
    .collect()
});

/// What kind of text a link span matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Url,
    Email,
}

/// A recognised link within a row. `start..end` are column indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSpan {
    pub start: usize,
    pub end: usize,
    pub kind: LinkKind,
    pub text: String,
}

impl LinkSpan {
    /// Target to hand to a browser. Bare `www.` hosts get a scheme and bare
    /// addresses get `mailto:`.
    pub fn target(&self) -> String {
        match self.kind {
            LinkKind::Url if !self.text.contains("://") => {
                if self.text.starts_with("ftp") {
                    format!("ftp://{}", self.text)
                } else {
                    format!("http://{}", self.text)
                }
            }
            LinkKind::Email if !self.text.starts_with("mailto:") => {
                format!("mailto:{}", self.text)
            }
            _ => self.text.clone(),
        }
    }
}

/// Find the link covering column `col` in `row`.
pub fn find_link_at(row: &str, col: usize) -> Option<LinkSpan> {
    for (kind, pattern) in LINK_PATTERNS.iter() {
        for found in pattern.find_iter(row) {
            let matched = trim_trailing_punctuation(found.as_str());
            if matched.is_empty() {
                continue;
            }

            let start = row[..found.start()].chars().count();
            let end = start + matched.chars().count();
            if (start..end).contains(&col) {
                return Some(LinkSpan {
                    start,
                    end,
                    kind: *kind,
                    text: matched.to_string(),
                });
            }
        }
    }
    None
}

/// Strip punctuation that usually closes the surrounding sentence rather than
/// the link. A closing paren is kept when the link has a matching opener.
fn trim_trailing_punctuation(text: &str) -> &str {
    let mut end = text.len();
    while let Some(last) = text[..end].chars().next_back() {
        let strip = match last {
            '.' | ',' | ';' | ':' | '!' | '?' | '\'' | '"' | ']' | '>' => true,
            ')' => {
                let body = &text[..end];
                body.matches('(').count() < body.matches(')').count()
            }
            _ => false,
        };
        if !strip {
            break;
        }
        end -= last.len_utf8();
    }
    &text[..end]
}
