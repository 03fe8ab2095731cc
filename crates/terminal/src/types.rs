//! Terminal data types.
//!
//! Plain data shared between the PTY/VT layer and the pane that renders it.
//! Constructible without a GPUI context.

use alacritty_terminal::grid::Dimensions;
use alacritty_terminal::term::cell::Flags as CellFlags;
use alacritty_terminal::vte::ansi::CursorShape;
use gpui::Hsla;

/// Terminal dimensions in rows and columns.
///
/// Implements `Dimensions` for alacritty compatibility.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TermSize {
    pub cols: u16,
    pub rows: u16,
}

impl Default for TermSize {
    fn default() -> Self {
        Self { cols: 80, rows: 24 }
    }
}

impl TermSize {
    /// Grid size that fits `width`×`height` pixels of content at the given cell size.
    /// Never smaller than 1×1.
    pub fn fit(width: f32, height: f32, cell_width: f32, cell_height: f32) -> Self {
        let cols = if cell_width > 0.0 {
            (width / cell_width).floor()
        } else {
            0.0
        };
        let rows = if cell_height > 0.0 {
            (height / cell_height).floor()
        } else {
            0.0
        };
        Self {
            cols: cols.clamp(1.0, u16::MAX as f32) as u16,
            rows: rows.clamp(1.0, u16::MAX as f32) as u16,
        }
    }
}

impl Dimensions for TermSize {
    fn total_lines(&self) -> usize {
        self.rows as usize
    }

    fn screen_lines(&self) -> usize {
        self.rows as usize
    }

    fn columns(&self) -> usize {
        self.cols as usize
    }
}

/// Display state read on every frame.
#[derive(Clone, Debug)]
pub struct DisplayState {
    /// Terminal dimensions in rows/columns
    pub size: TermSize,
    /// Cell dimensions (width, height) from font metrics
    pub cell_dims: (f32, f32),
    /// Element bounds in window coordinates (for mouse position conversion)
    pub bounds: Option<gpui::Bounds<gpui::Pixels>>,
    /// Font (size bits, family) the cached `cell_dims` were measured with
    pub cached_font_key: Option<(u32, String)>,
}

impl Default for DisplayState {
    fn default() -> Self {
        Self {
            size: TermSize::default(),
            cell_dims: (8.4, 17.0),
            bounds: None,
            cached_font_key: None,
        }
    }
}

/// A single cell to render.
#[derive(Clone, Debug)]
pub struct RenderCell {
    pub row: usize,
    pub col: usize,
    pub c: char,
    pub fg: Hsla,
    pub flags: CellFlags,
}

/// A background region to be painted.
#[derive(Clone, Debug)]
pub struct BgRegion {
    pub row: usize,
    pub col_start: usize,
    pub col_end: usize,
    pub color: Hsla,
}

/// Cursor rendering info.
#[derive(Clone, Copy, Debug)]
pub struct CursorInfo {
    pub row: usize,
    pub col: usize,
    pub shape: CursorShape,
    pub color: Hsla,
}

/// Pre-computed render data for a single frame.
#[derive(Default)]
pub struct RenderData {
    /// Cells to render (non-space cells only)
    pub cells: Vec<RenderCell>,
    /// Background regions (non-default backgrounds only)
    pub bg_regions: Vec<BgRegion>,
    pub cursor: Option<CursorInfo>,
    pub scrollbar: Option<ScrollbarThumb>,
}

/// Scrollbar thumb position as fractions of the track height.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollbarThumb {
    /// Top edge, 0.0 = top of track
    pub top: f32,
    /// Height, 1.0 = whole track
    pub height: f32,
}

impl ScrollbarThumb {
    /// Thumb for a viewport of `screen_lines` scrolled `display_offset` lines
    /// up into `history` lines of scrollback. `None` when there is nothing to
    /// scroll.
    pub fn compute(history: usize, display_offset: usize, screen_lines: usize) -> Option<Self> {
        if history == 0 || screen_lines == 0 {
            return None;
        }

        let total = (history + screen_lines) as f32;
        let offset = display_offset.min(history);
        let height = screen_lines as f32 / total;
        // offset 0 = bottom of history (live screen)
        let top = (history - offset) as f32 / total;
        Some(Self { top, height })
    }
}

#[cfg(test)]
#[allow(clippy::clone_on_copy)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use test_case::test_case;

    #[test]
    fn test_term_size_default() {
        let size = TermSize::default();
        assert_eq!(size.cols, 80);
        assert_eq!(size.rows, 24);
    }

    #[test_case(0, 0 ; "zero dimensions")]
    #[test_case(80, 24 ; "standard terminal")]
    #[test_case(u16::MAX, u16::MAX ; "maximum dimensions")]
    fn test_term_size_dimensions(cols: u16, rows: u16) {
        let size = TermSize { cols, rows };
        assert_eq!(size.columns(), cols as usize);
        assert_eq!(size.total_lines(), rows as usize);
        assert_eq!(size.screen_lines(), rows as usize);
    }

    #[test]
    fn test_fit_floors_to_whole_cells() {
        assert_eq!(
            TermSize::fit(805.0, 410.0, 10.0, 20.0),
            TermSize { cols: 80, rows: 20 }
        );
    }

    #[test_case(0.0, 0.0, 10.0, 20.0 ; "no space")]
    #[test_case(100.0, 100.0, 0.0, 0.0 ; "unmeasured cells")]
    fn test_fit_never_below_one_cell(w: f32, h: f32, cw: f32, ch: f32) {
        assert_eq!(TermSize::fit(w, h, cw, ch), TermSize { cols: 1, rows: 1 });
    }

    #[test]
    fn test_display_state_default() {
        let state = DisplayState::default();
        assert_eq!(state.size, TermSize::default());
        assert!(state.bounds.is_none());
        assert!(state.cached_font_key.is_none());
    }

    #[test]
    fn test_scrollbar_hidden_without_history() {
        assert_eq!(ScrollbarThumb::compute(0, 0, 24), None);
    }

    #[test]
    fn test_scrollbar_at_bottom_when_not_scrolled() {
        let thumb = ScrollbarThumb::compute(76, 0, 24).unwrap();
        assert_eq!(thumb.height, 0.24);
        assert_eq!(thumb.top, 0.76);
    }

    #[test]
    fn test_scrollbar_at_top_when_fully_scrolled() {
        let thumb = ScrollbarThumb::compute(76, 76, 24).unwrap();
        assert_eq!(thumb.top, 0.0);
    }

    #[test]
    fn test_scrollbar_offset_beyond_history_is_clamped() {
        assert_eq!(
            ScrollbarThumb::compute(10, 500, 10),
            ScrollbarThumb::compute(10, 10, 10)
        );
    }

    proptest! {
        #[test]
        fn scrollbar_thumb_stays_inside_track(
            history in 1usize..100_000,
            offset in 0usize..200_000,
            screen in 1usize..500,
        ) {
            let thumb = ScrollbarThumb::compute(history, offset, screen).unwrap();
            prop_assert!(thumb.top >= 0.0);
            prop_assert!(thumb.height > 0.0);
            prop_assert!(thumb.top + thumb.height <= 1.0 + f32::EPSILON * 4.0);
        }
    }
}
