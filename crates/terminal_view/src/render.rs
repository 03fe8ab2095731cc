//! Frame snapshot and painting for the terminal canvas.

use crate::colors::{apply_dim, bold_color, color_to_hsla};
use alacritty_terminal::event::EventListener;
use alacritty_terminal::grid::Dimensions;
use alacritty_terminal::term::cell::Flags as CellFlags;
use alacritty_terminal::term::Term;
use alacritty_terminal::vte::ansi::CursorShape;
use gpui::*;
use settings::constants::scrollbar::{MIN_THUMB_HEIGHT, WIDTH as SCROLLBAR_WIDTH};
use settings::constants::terminal::{CURSOR_THICKNESS, PADDING};
use terminal::{BgRegion, CursorInfo, RenderCell, RenderData, ScrollbarThumb};
use theme::TerminalColors;

/// Snapshot the visible grid. Cells with the default background produce no
/// background region, so a background image shows through them.
pub fn build_render_data<L: EventListener>(
    term: &Term<L>,
    palette: &TerminalColors,
    with_scrollbar: bool,
) -> RenderData {
    let content = term.renderable_content();
    let term_colors = content.colors;
    let default_bg = palette.background;

    let cols = term.columns();
    let rows = term.screen_lines();
    let display_offset = content.display_offset as i32;

    let mut cells: Vec<RenderCell> = Vec::with_capacity(rows * cols / 3);
    let mut bg_regions: Vec<BgRegion> = Vec::with_capacity(rows * 2);
    // (row, col_start, col_end, color) of the run being merged
    let mut current_bg: Option<(usize, usize, usize, Hsla)> = None;

    let cursor_row = content.cursor.point.line.0 + display_offset;
    let cursor_col = content.cursor.point.column.0;
    let cursor = (cursor_row >= 0 && (cursor_row as usize) < rows && cursor_col < cols).then(|| {
        CursorInfo {
            row: cursor_row as usize,
            col: cursor_col,
            shape: content.cursor.shape,
            color: palette.cursor,
        }
    });

    for cell in content.display_iter {
        let row = (cell.point.line.0 + display_offset) as usize;
        let col = cell.point.column.0;
        if row >= rows || col >= cols {
            continue;
        }

        let flags = cell.flags;
        if flags.contains(CellFlags::WIDE_CHAR_SPACER) {
            continue;
        }

        let mut fg = if flags.contains(CellFlags::BOLD) {
            bold_color(cell.fg, term_colors, palette)
        } else {
            color_to_hsla(cell.fg, term_colors, palette)
        };
        let mut bg = color_to_hsla(cell.bg, term_colors, palette);
        if flags.contains(CellFlags::DIM) {
            fg = apply_dim(fg);
        }
        if flags.contains(CellFlags::INVERSE) {
            std::mem::swap(&mut fg, &mut bg);
        }
        if flags.contains(CellFlags::HIDDEN) {
            fg = bg;
        }

        if bg != default_bg {
            match &mut current_bg {
                Some((cur_row, _, end, color)) if *cur_row == row && *end == col && *color == bg => {
                    *end = col + 1;
                }
                Some(run) => {
                    let (r, start, end, color) = *run;
                    bg_regions.push(BgRegion {
                        row: r,
                        col_start: start,
                        col_end: end,
                        color,
                    });
                    *run = (row, col, col + 1, bg);
                }
                None => current_bg = Some((row, col, col + 1, bg)),
            }
        } else if let Some((r, start, end, color)) = current_bg.take() {
            bg_regions.push(BgRegion {
                row: r,
                col_start: start,
                col_end: end,
                color,
            });
        }

        if cell.c != ' ' && cell.c != '\0' {
            cells.push(RenderCell {
                row,
                col,
                c: cell.c,
                fg,
                flags,
            });
        }
    }

    if let Some((row, col_start, col_end, color)) = current_bg {
        bg_regions.push(BgRegion {
            row,
            col_start,
            col_end,
            color,
        });
    }

    let scrollbar = if with_scrollbar {
        let history = term.grid().history_size();
        ScrollbarThumb::compute(history, content.display_offset, rows)
    } else {
        None
    };

    RenderData {
        cells,
        bg_regions,
        cursor,
        scrollbar,
    }
}

/// Grid geometry of one frame.
#[derive(Clone, Copy)]
pub struct CellGeometry {
    pub origin: Point<Pixels>,
    pub cell_width: f32,
    pub cell_height: f32,
}

impl CellGeometry {
    fn cell_origin(&self, row: usize, col: usize) -> Point<Pixels> {
        point(
            self.origin.x + px(PADDING + col as f32 * self.cell_width),
            self.origin.y + px(PADDING + row as f32 * self.cell_height),
        )
    }
}

pub fn paint_backgrounds(data: &RenderData, geometry: CellGeometry, window: &mut Window) {
    for region in &data.bg_regions {
        let width = px((region.col_end - region.col_start) as f32 * geometry.cell_width);
        window.paint_quad(fill(
            Bounds::new(
                geometry.cell_origin(region.row, region.col_start),
                size(width, px(geometry.cell_height)),
            ),
            region.color,
        ));
    }
}

/// Paint glyphs. Adjacent cells of the same style are shaped together and
/// placed at the first cell's grid position.
pub fn paint_text(
    data: &RenderData,
    geometry: CellGeometry,
    font: &Font,
    font_size: Pixels,
    window: &mut Window,
    cx: &mut App,
) {
    let style_flags = CellFlags::BOLD | CellFlags::ITALIC;
    let pick_font = |flags: CellFlags| -> Font {
        let mut font = font.clone();
        if flags.contains(CellFlags::BOLD) {
            font.weight = FontWeight::BOLD;
        }
        if flags.contains(CellFlags::ITALIC) {
            font.style = FontStyle::Italic;
        }
        font
    };

    let cells = &data.cells;
    let mut run_text = String::with_capacity(32);
    let mut i = 0;
    while i < cells.len() {
        let start = &cells[i];
        run_text.clear();
        run_text.push(start.c);
        let mut last_col = start.col;
        let mut last_wide = start.flags.contains(CellFlags::WIDE_CHAR);
        i += 1;

        while let Some(cell) = cells.get(i) {
            let expected = last_col + if last_wide { 2 } else { 1 };
            if cell.row != start.row
                || cell.col != expected
                || cell.fg != start.fg
                || cell.flags.intersection(style_flags) != start.flags.intersection(style_flags)
            {
                break;
            }
            run_text.push(cell.c);
            last_col = cell.col;
            last_wide = cell.flags.contains(CellFlags::WIDE_CHAR);
            i += 1;
        }

        let text: SharedString = run_text.clone().into();
        let run = TextRun {
            len: text.len(),
            font: pick_font(start.flags),
            color: start.fg,
            background_color: None,
            underline: None,
            strikethrough: None,
        };
        let shaped = window
            .text_system()
            .shape_line(text, font_size, &[run], None);
        let _ = shaped.paint(
            geometry.cell_origin(start.row, start.col),
            px(geometry.cell_height),
            window,
            cx,
        );
    }
}

pub fn paint_cursor(cursor: CursorInfo, geometry: CellGeometry, window: &mut Window) {
    let origin = geometry.cell_origin(cursor.row, cursor.col);
    let width = px(geometry.cell_width);
    let height = px(geometry.cell_height);
    let thickness = px(CURSOR_THICKNESS);

    let bars: Vec<Bounds<Pixels>> = match cursor.shape {
        CursorShape::Block | CursorShape::HollowBlock => vec![
            Bounds::new(origin, size(width, thickness)),
            Bounds::new(point(origin.x, origin.y + height - thickness), size(width, thickness)),
            Bounds::new(origin, size(thickness, height)),
            Bounds::new(point(origin.x + width - thickness, origin.y), size(thickness, height)),
        ],
        CursorShape::Beam => vec![Bounds::new(origin, size(thickness, height))],
        CursorShape::Underline => vec![Bounds::new(
            point(origin.x, origin.y + height - thickness),
            size(width, thickness),
        )],
        CursorShape::Hidden => Vec::new(),
    };
    for bar in bars {
        window.paint_quad(fill(bar, cursor.color));
    }
}

/// Thumb along the right edge of `bounds`.
pub fn paint_scrollbar(
    thumb: ScrollbarThumb,
    bounds: Bounds<Pixels>,
    color: Hsla,
    window: &mut Window,
) {
    let track_height: f32 = bounds.size.height.into();
    let height = (thumb.height * track_height).max(MIN_THUMB_HEIGHT);
    let top = (thumb.top * track_height).min(track_height - height).max(0.0);
    window.paint_quad(fill(
        Bounds::new(
            point(
                bounds.origin.x + bounds.size.width - px(SCROLLBAR_WIDTH),
                bounds.origin.y + px(top),
            ),
            size(px(SCROLLBAR_WIDTH), px(height)),
        ),
        color,
    ));
}
