//! Terminal pane: one shell session rendered with GPUI's canvas.
//!
//! The pane owns the emulator state and its PTY. Output is parsed on the VT
//! thread; the pane polls for new frames and for child exit on a GPUI timer
//! and reports both to its owner through [`TerminalEvent`].

use crate::background::probe_image;
use crate::input::{encode_key, encode_wheel, paste_payload, KeyMods};
use crate::render::{
    build_render_data, paint_backgrounds, paint_cursor, paint_scrollbar, paint_text, CellGeometry,
};
use actions::{Paste, SendShiftTab, SendTab};
use alacritty_terminal::event::{Event, EventListener, WindowSize};
use alacritty_terminal::grid::{Dimensions, Scroll};
use alacritty_terminal::index::{Column, Line};
use alacritty_terminal::term::{Config, Term, TermMode};
use alacritty_terminal::vte::ansi::Rgb;
use anyhow::Result;
use gpui::prelude::FluentBuilder;
use gpui::*;
use parking_lot::{Mutex, RwLock};
use settings::constants::terminal::{BACKGROUND_IMAGE_TINT, PADDING};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use terminal::{find_link_at, DisplayState, FontDescriptor, PtyHandler, TermSize, TerminalProcessor};
use theme::terminal_colors;

/// Poll interval while output is flowing.
const ACTIVE_POLL: Duration = Duration::from_millis(4);
/// Poll interval once the shell has been quiet for a few ticks.
const IDLE_POLL: Duration = Duration::from_millis(100);
const IDLE_THRESHOLD: u32 = 5;

fn terminal_font(font: &FontDescriptor) -> Font {
    Font {
        family: font.family().to_string().into(),
        features: FontFeatures::default(),
        fallbacks: None,
        weight: FontWeight::NORMAL,
        style: FontStyle::Normal,
    }
}

/// Cell size from font metrics, using the same text system that paints.
fn calculate_cell_dimensions(window: &mut Window, font: &FontDescriptor) -> (f32, f32) {
    let gpui_font = terminal_font(font);
    let font_size = px(font.size());
    let text_system = window.text_system();
    let font_id = text_system.resolve_font(&gpui_font);

    let cell_width: f32 = match text_system.advance(font_id, font_size, '0') {
        Ok(advance) => advance.width.into(),
        Err(_) => {
            let run = TextRun {
                len: 1,
                font: gpui_font.clone(),
                color: black(),
                background_color: None,
                underline: None,
                strikethrough: None,
            };
            text_system
                .shape_line("0".into(), font_size, &[run], None)
                .width
                .into()
        }
    };
    let ascent: f32 = text_system.ascent(font_id, font_size).into();
    let descent: f32 = text_system.descent(font_id, font_size).into();
    let cell_height = ascent + descent.abs();

    tracing::debug!(
        font = %font,
        cell_width,
        cell_height,
        "Cell dimensions calculated"
    );
    (cell_width, cell_height)
}

/// Receives emulator events on the VT thread.
#[derive(Clone)]
struct Listener {
    title: Arc<Mutex<Option<String>>>,
    /// Replies to terminal queries (DSR, OSC 11, ...) go back through the PTY
    pty: Arc<Mutex<Option<PtyHandler>>>,
    display: Arc<RwLock<DisplayState>>,
}

impl Listener {
    fn pty_write(&self, data: &[u8]) {
        if let Some(pty) = self.pty.lock().as_mut() {
            if let Err(e) = pty.write(data) {
                tracing::warn!(error = %e, "PTY write-back failed");
            }
        }
    }
}

impl EventListener for Listener {
    fn send_event(&self, event: Event) {
        match event {
            Event::Title(title) => *self.title.lock() = Some(title),
            Event::ResetTitle => *self.title.lock() = None,
            Event::PtyWrite(text) => self.pty_write(text.as_bytes()),
            Event::ColorRequest(_index, formatter) => {
                // Report a dark background so TUIs pick their dark palette
                let response = formatter(Rgb { r: 0, g: 0, b: 0 });
                self.pty_write(response.as_bytes());
            }
            Event::TextAreaSizeRequest(formatter) => {
                let (size, (cell_width, cell_height)) = {
                    let display = self.display.read();
                    (display.size, display.cell_dims)
                };
                let response = formatter(WindowSize {
                    num_lines: size.rows,
                    num_cols: size.cols,
                    cell_width: cell_width as u16,
                    cell_height: cell_height as u16,
                });
                self.pty_write(response.as_bytes());
            }
            _ => {}
        }
    }
}

/// Notifications from a pane to whoever hosts it.
#[derive(Clone, Debug, PartialEq)]
pub enum TerminalEvent {
    /// The shell exited (or its PTY closed).
    Exited,
    /// The shell set or reset the window title.
    TitleChanged,
    /// Right click. `link` is the link under the pointer, scheme included.
    ContextMenu {
        position: Point<Pixels>,
        link: Option<String>,
    },
}

/// Per-pane settings taken from the config.
#[derive(Clone, Copy, Debug)]
pub struct PaneOptions {
    pub show_scrollbar: bool,
    pub scrollback_lines: usize,
}

pub struct TerminalPane {
    pty: Arc<Mutex<Option<PtyHandler>>>,
    term: Arc<Mutex<Term<Listener>>>,
    listener: Listener,
    display: Arc<RwLock<DisplayState>>,
    font: FontDescriptor,
    options: PaneOptions,
    background: Option<PathBuf>,
    focus_handle: FocusHandle,
    exit_emitted: bool,
    last_title: Option<String>,
    /// Kept alive for its Drop, which stops the VT thread
    vt_processor: Option<TerminalProcessor>,
}

impl EventEmitter<TerminalEvent> for TerminalPane {}

impl TerminalPane {
    /// Wrap a spawned shell. The grid starts at the PTY's default size and
    /// follows the element bounds from the first paint on.
    pub fn new(
        mut pty: PtyHandler,
        font: FontDescriptor,
        options: PaneOptions,
        cx: &mut Context<Self>,
    ) -> Self {
        let display = Arc::new(RwLock::new(DisplayState::default()));
        let size = display.read().size;

        let output = pty.take_output();
        let exited = pty.exited_flag();
        let pty = Arc::new(Mutex::new(Some(pty)));

        let listener = Listener {
            title: Arc::new(Mutex::new(None)),
            pty: pty.clone(),
            display: display.clone(),
        };
        let config = Config {
            scrolling_history: options.scrollback_lines,
            ..Config::default()
        };
        let term = Arc::new(Mutex::new(Term::new(config, &size, listener.clone())));

        let vt_processor = match output {
            Some(output) => match TerminalProcessor::start(output, term.clone(), exited) {
                Ok(vt) => Some(vt),
                Err(e) => {
                    tracing::error!("Failed to start VT processing: {:#}", e);
                    None
                }
            },
            None => {
                tracing::error!("PTY output was already taken");
                None
            }
        };

        // Tab must reach the shell, not GPUI's focus navigation
        let focus_handle = cx.focus_handle().tab_stop(false);

        let pane = Self {
            pty,
            term,
            listener,
            display,
            font,
            options,
            background: None,
            focus_handle,
            exit_emitted: false,
            last_title: None,
            vt_processor,
        };
        pane.start_polling(cx);
        pane
    }

    /// Watch the VT thread's flags: repaint on new output, report title
    /// changes and exit. Polls fast while output flows, slowly when idle.
    fn start_polling(&self, cx: &mut Context<Self>) {
        cx.spawn(async move |this, cx| {
            let mut idle_ticks = 0u32;
            loop {
                let interval = if idle_ticks >= IDLE_THRESHOLD {
                    IDLE_POLL
                } else {
                    ACTIVE_POLL
                };
                cx.background_executor().timer(interval).await;

                let (done, had_output) = this
                    .update(cx, |pane, cx| pane.poll(cx))
                    .unwrap_or((true, false));
                if done {
                    break;
                }
                idle_ticks = if had_output {
                    0
                } else {
                    idle_ticks.saturating_add(1)
                };
            }
        })
        .detach();
    }

    /// One poll tick. Returns (stop polling, had new output).
    fn poll(&mut self, cx: &mut Context<Self>) -> (bool, bool) {
        let Some(vt) = self.vt_processor.as_ref() else {
            self.emit_exit(cx);
            return (true, false);
        };

        let had_output = vt.take_render_needed();
        let exited = vt.has_exited();
        if had_output {
            cx.notify();
        }

        let title = self.listener.title.lock().clone();
        if title != self.last_title {
            self.last_title = title;
            cx.emit(TerminalEvent::TitleChanged);
        }

        if exited {
            self.emit_exit(cx);
            return (true, had_output);
        }
        (false, had_output)
    }

    fn emit_exit(&mut self, cx: &mut Context<Self>) {
        if !self.exit_emitted {
            self.exit_emitted = true;
            tracing::debug!(pid = ?self.pid(), "Shell exited");
            cx.emit(TerminalEvent::Exited);
        }
    }

    /// Title last set by the shell (OSC 0/2).
    pub fn title(&self) -> Option<String> {
        self.listener.title.lock().clone()
    }

    pub fn pid(&self) -> Option<u32> {
        self.pty.lock().as_ref().and_then(PtyHandler::process_id)
    }

    pub fn font(&self) -> &FontDescriptor {
        &self.font
    }

    pub fn background(&self) -> Option<&Path> {
        self.background.as_deref()
    }

    /// Switch font. Cell metrics are re-measured on the next frame and the
    /// grid reflows to the new size.
    pub fn set_font(&mut self, font: FontDescriptor, cx: &mut Context<Self>) {
        if self.font != font {
            self.font = font;
            self.display.write().cached_font_key = None;
            cx.notify();
        }
    }

    /// Draw `path` behind the text. The image is validated first; on error
    /// the current background is kept.
    pub fn set_background_image(&mut self, path: &Path, cx: &mut Context<Self>) -> Result<()> {
        let (width, height) = probe_image(path)?;
        tracing::info!(path = %path.display(), width, height, "Background image set");
        self.background = Some(path.to_path_buf());
        cx.notify();
        Ok(())
    }

    /// Kill the shell and reap it if it is already gone. Never blocks.
    pub fn terminate(&mut self) {
        if let Some(mut pty) = self.pty.lock().take() {
            match pty.terminate() {
                Some(status) => tracing::debug!(?status, "Shell reaped"),
                None => tracing::debug!(pid = ?pty.process_id(), "Shell killed"),
            }
        }
        self.vt_processor = None;
        // Exit was requested, not reported
        self.exit_emitted = true;
    }

    pub fn send_input(&mut self, input: &str) {
        let mut guard = self.pty.lock();
        if let Some(pty) = guard.as_mut() {
            if let Err(e) = pty.write(input.as_bytes()) {
                tracing::warn!(
                    error = %e,
                    input_len = input.len(),
                    "PTY write failed, shell process likely exited"
                );
                *guard = None;
            }
        }
    }

    fn mode(&self) -> TermMode {
        *self.term.lock().mode()
    }

    fn handle_key(&mut self, event: &KeyDownEvent, cx: &mut Context<Self>) {
        let keystroke = &event.keystroke;
        let app_cursor = self.mode().contains(TermMode::APP_CURSOR);
        let Some(bytes) = encode_key(
            &keystroke.key,
            KeyMods::from(&keystroke.modifiers),
            keystroke.key_char.as_deref(),
            app_cursor,
        ) else {
            return;
        };

        // Typing snaps the view back to the live screen
        {
            let mut term = self.term.lock();
            if term.grid().display_offset() != 0 {
                term.scroll_display(Scroll::Bottom);
                cx.notify();
            }
        }
        self.send_input(&bytes);
    }

    fn paste_clipboard(&mut self, cx: &mut Context<Self>) {
        let Some(text) = cx.read_from_clipboard().and_then(|item| item.text()) else {
            return;
        };
        let bracketed = self.mode().contains(TermMode::BRACKETED_PASTE);
        self.send_input(&paste_payload(&text, bracketed));
        cx.notify();
    }

    /// Window position → (col, visual row).
    fn pixel_to_cell(&self, position: Point<Pixels>) -> Option<(usize, usize)> {
        let display = self.display.read();
        let bounds = display.bounds.as_ref()?;
        let (cell_width, cell_height) = display.cell_dims;

        let local_x: f32 = (position.x - bounds.origin.x).into();
        let local_y: f32 = (position.y - bounds.origin.y).into();
        let col = ((local_x - PADDING) / cell_width).floor();
        let row = ((local_y - PADDING) / cell_height).floor();

        let in_grid = col >= 0.0
            && row >= 0.0
            && (col as usize) < display.size.cols as usize
            && (row as usize) < display.size.rows as usize;
        in_grid.then_some((col as usize, row as usize))
    }

    /// Text of a visual row (0 = top of the viewport), one char per column.
    fn row_text(&self, visual_row: usize) -> String {
        let term = self.term.lock();
        let grid = term.grid();
        let line = Line(visual_row as i32 - grid.display_offset() as i32);

        let screen_lines = grid.screen_lines() as i32;
        let oldest = -(grid.history_size() as i32);
        if line.0 < oldest || line.0 >= screen_lines {
            return String::new();
        }

        let row = &grid[line];
        (0..grid.columns()).map(|c| row[Column(c)].c).collect()
    }

    fn handle_right_click(&mut self, event: &MouseDownEvent, cx: &mut Context<Self>) {
        let link = self.pixel_to_cell(event.position).and_then(|(col, row)| {
            find_link_at(&self.row_text(row), col).map(|span| span.target())
        });
        tracing::debug!(?link, "Context menu requested");
        cx.emit(TerminalEvent::ContextMenu {
            position: event.position,
            link,
        });
    }

    fn handle_scroll(&mut self, event: &ScrollWheelEvent) {
        let Some((col, row)) = self.pixel_to_cell(event.position) else {
            return;
        };
        let mode = self.mode();
        let (_, cell_height) = self.display.read().cell_dims;

        // Negative delta is a scroll-up gesture
        let delta_y: f32 = event.delta.pixel_delta(px(cell_height)).y.into();
        let lines = (delta_y.abs() / cell_height).ceil() as usize;
        if lines == 0 {
            return;
        }
        let up = delta_y < 0.0;

        if mode.intersects(TermMode::MOUSE_MODE) {
            let report = encode_wheel(up, col, row, mode.contains(TermMode::SGR_MOUSE));
            self.send_input(&report);
        } else if mode.contains(TermMode::ALT_SCREEN) {
            // Full-screen apps without mouse reporting get arrow keys
            let key = if up { "\x1b[A" } else { "\x1b[B" };
            self.send_input(&key.repeat(lines.min(5)));
        } else {
            let lines = lines as i32;
            let scroll = if up {
                Scroll::Delta(lines)
            } else {
                Scroll::Delta(-lines)
            };
            self.term.lock().scroll_display(scroll);
        }
    }

    /// Re-measure cells when the font changed since the last frame.
    fn refresh_cell_dimensions(&self, window: &mut Window) {
        let key = (self.font.size().to_bits(), self.font.family().to_string());
        if self.display.read().cached_font_key.as_ref() == Some(&key) {
            return;
        }
        let dims = calculate_cell_dimensions(window, &self.font);
        let mut display = self.display.write();
        display.cell_dims = dims;
        display.cached_font_key = Some(key);
    }
}

impl Render for TerminalPane {
    fn render(&mut self, window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        self.refresh_cell_dimensions(window);

        let palette = terminal_colors(cx);
        let bg_color = palette.background;
        let term = self.term.clone();
        let pty = self.pty.clone();
        let display = self.display.clone();
        let font = terminal_font(&self.font);
        let font_size = px(self.font.size());
        let show_scrollbar = self.options.show_scrollbar;

        div()
            .id("terminal-pane")
            .key_context("terminal")
            .track_focus(&self.focus_handle)
            .relative()
            .size_full()
            .bg(bg_color)
            .on_action(cx.listener(|this, _: &SendTab, _window, _cx| {
                this.send_input("\t");
            }))
            .on_action(cx.listener(|this, _: &SendShiftTab, _window, _cx| {
                this.send_input("\x1b[Z");
            }))
            .on_action(cx.listener(|this, _: &Paste, _window, cx| {
                this.paste_clipboard(cx);
            }))
            .on_key_down(cx.listener(|this, event: &KeyDownEvent, _window, cx| {
                this.handle_key(event, cx);
            }))
            .on_mouse_down(
                MouseButton::Left,
                cx.listener(|this, _event: &MouseDownEvent, window, _cx| {
                    window.focus(&this.focus_handle);
                }),
            )
            .on_mouse_down(
                MouseButton::Right,
                cx.listener(|this, event: &MouseDownEvent, window, cx| {
                    window.focus(&this.focus_handle);
                    this.handle_right_click(event, cx);
                }),
            )
            .on_scroll_wheel(cx.listener(|this, event: &ScrollWheelEvent, _window, cx| {
                this.handle_scroll(event);
                cx.notify();
            }))
            .when_some(self.background.clone(), |d, path| {
                d.child(
                    img(path)
                        .absolute()
                        .top_0()
                        .left_0()
                        .size_full()
                        .object_fit(ObjectFit::Cover),
                )
                .child(
                    div()
                        .absolute()
                        .top_0()
                        .left_0()
                        .size_full()
                        .bg(bg_color.opacity(BACKGROUND_IMAGE_TINT)),
                )
            })
            .child(
                canvas(
                    move |bounds, _window, _cx| {
                        let (cell_width, cell_height) = {
                            let mut display = display.write();
                            display.bounds = Some(bounds);
                            display.cell_dims
                        };

                        let width: f32 = bounds.size.width.into();
                        let height: f32 = bounds.size.height.into();
                        let fitted = TermSize::fit(
                            (width - PADDING * 2.0).max(0.0),
                            (height - PADDING * 2.0).max(0.0),
                            cell_width,
                            cell_height,
                        );

                        let resized = {
                            let mut display = display.write();
                            let changed = display.size != fitted;
                            display.size = fitted;
                            changed
                        };
                        if resized {
                            if let Some(pty) = pty.lock().as_ref() {
                                if let Err(e) = pty.resize(fitted) {
                                    tracing::warn!(
                                        cols = fitted.cols,
                                        rows = fitted.rows,
                                        error = %e,
                                        "PTY resize failed, shell may have exited"
                                    );
                                }
                            }
                            term.lock().resize(fitted);
                        }

                        let data = build_render_data(&*term.lock(), &palette, show_scrollbar);
                        let geometry = CellGeometry {
                            origin: bounds.origin,
                            cell_width,
                            cell_height,
                        };
                        (data, geometry)
                    },
                    move |bounds, (data, geometry), window, cx| {
                        paint_backgrounds(&data, geometry, window);
                        paint_text(&data, geometry, &font, font_size, window, cx);
                        if let Some(cursor) = data.cursor {
                            paint_cursor(cursor, geometry, window);
                        }
                        if let Some(thumb) = data.scrollbar {
                            paint_scrollbar(thumb, bounds, palette.scrollbar_thumb, window);
                        }
                    },
                )
                .absolute()
                .top_0()
                .left_0()
                .size_full(),
            )
    }
}

impl Focusable for TerminalPane {
    fn focus_handle(&self, _cx: &App) -> FocusHandle {
        self.focus_handle.clone()
    }
}
