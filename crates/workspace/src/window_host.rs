//! [`Host`] backed by a gpui window.

use crate::dialogs;
use crate::event::Event;
use crate::host::{ContextMenu, Host, Spawned};
use crate::session::SessionId;
use crate::workspace_view::{OpenMenu, WindowState, Workspace};
use anyhow::Result;
use gpui::*;
use settings::constants::window as window_consts;
use std::path::Path;
use terminal::{FontDescriptor, PtyHandler, ShellLaunch, TermSize};
use terminal_view::{TerminalEvent, TerminalPane};

/// Keep-above requests wait until the window has been activated; before that
/// the window manager may not know the window yet.
#[derive(Debug, Default)]
pub(crate) struct DeferredKeepAbove {
    pending: Option<bool>,
}

impl DeferredKeepAbove {
    /// Returns the value to apply now, or `None` if it was deferred.
    pub(crate) fn request(&mut self, keep_above: bool, window_active: bool) -> Option<bool> {
        if window_active {
            self.pending = None;
            Some(keep_above)
        } else {
            self.pending = Some(keep_above);
            None
        }
    }

    /// The window became active. Returns the latest deferred request once.
    pub(crate) fn activated(&mut self) -> Option<bool> {
        self.pending.take()
    }
}

/// Borrowed view of the window for the duration of one dispatch.
pub(crate) struct WindowHost<'a, 'b> {
    window_state: &'a mut WindowState,
    window: &'a mut Window,
    cx: &'a mut Context<'b, Workspace>,
}

impl<'a, 'b> WindowHost<'a, 'b> {
    pub(crate) fn new(
        window_state: &'a mut WindowState,
        window: &'a mut Window,
        cx: &'a mut Context<'b, Workspace>,
    ) -> Self {
        Self {
            window_state,
            window,
            cx,
        }
    }
}

impl Host for WindowHost<'_, '_> {
    type Terminal = Entity<TerminalPane>;

    fn spawn_terminal(
        &mut self,
        id: SessionId,
        launch: &ShellLaunch,
        font: &FontDescriptor,
    ) -> Result<Spawned<Self::Terminal>> {
        // The pane resizes the PTY to its bounds on first paint
        let pty = PtyHandler::spawn(launch, TermSize::default())?;
        let pid = pty.process_id();
        let options = self.window_state.pane_options;
        let font = font.clone();
        let pane = self
            .cx
            .new(|cx| TerminalPane::new(pty, font, options, cx));

        let subscription = self.cx.subscribe_in(
            &pane,
            self.window,
            move |workspace, _pane, event: &TerminalEvent, window, cx| {
                workspace.on_terminal_event(id, event, window, cx);
            },
        );
        self.window_state
            .subscriptions
            .insert(pane.entity_id(), subscription);

        Ok(Spawned {
            terminal: pane,
            pid,
        })
    }

    fn terminate(&mut self, terminal: &Self::Terminal) {
        self.window_state.subscriptions.remove(&terminal.entity_id());
        terminal.update(self.cx, |pane, _cx| pane.terminate());
    }

    fn focus(&mut self, terminal: &Self::Terminal) {
        let focus = terminal.read(self.cx).focus_handle(self.cx);
        self.window.focus(&focus);
    }

    fn apply_font(&mut self, terminal: &Self::Terminal, font: &FontDescriptor) {
        terminal.update(self.cx, |pane, cx| pane.set_font(font.clone(), cx));
    }

    fn persist_font(&mut self, font: &FontDescriptor) {
        settings::save_font(font.family(), font.size());
    }

    fn apply_background(&mut self, terminal: &Self::Terminal, image: &Path) -> Result<()> {
        terminal.update(self.cx, |pane, cx| pane.set_background_image(image, cx))
    }

    fn set_keep_above(&mut self, keep_above: bool) -> Result<()> {
        let active = self.window.is_window_active();
        match self.window_state.keep_above.request(keep_above, active) {
            Some(keep_above) => platform::set_keep_above(window_consts::TITLE, keep_above),
            None => {
                tracing::debug!(keep_above, "Window not active yet, deferring keep-above");
                Ok(())
            }
        }
    }

    fn show_context_menu(&mut self, menu: ContextMenu) {
        self.window_state.context_menu = Some(OpenMenu {
            menu,
            position: self.window_state.menu_anchor,
        });
    }

    fn open_font_dialog(&mut self, current: &FontDescriptor) {
        let workspace = self.cx.weak_entity();
        dialogs::open_font_dialog(current, workspace, self.window, self.cx);
    }

    fn open_background_dialog(&mut self, session: SessionId) {
        let paths = self.cx.prompt_for_paths(PathPromptOptions {
            files: true,
            directories: false,
            multiple: false,
            prompt: Some("Select background".into()),
        });

        self.cx
            .spawn_in(self.window, async move |this, cx| {
                let path = match paths.await {
                    Ok(Ok(Some(paths))) => paths.into_iter().next(),
                    Ok(Err(e)) => {
                        tracing::warn!("Background picker failed: {}", e);
                        None
                    }
                    _ => None,
                };
                let Some(path) = path else {
                    return;
                };
                this.update_in(cx, |workspace, window, cx| {
                    workspace.dispatch(Event::BackgroundChosen { session, path }, window, cx);
                })
                .ok();
            })
            .detach();
    }

    fn open_tab_name_dialog(&mut self, session: SessionId, current: Option<String>) {
        let workspace = self.cx.weak_entity();
        dialogs::open_tab_name_dialog(session, current, workspace, self.window, self.cx);
    }

    fn confirm_close(&mut self, open_tabs: usize) {
        let detail = format!(
            "{} tabs are open. Their shells will be terminated.",
            open_tabs
        );
        let answer = self.window.prompt(
            PromptLevel::Warning,
            "Close this window?",
            Some(detail.as_str()),
            &["Close", "Cancel"],
            self.cx,
        );

        self.cx
            .spawn_in(self.window, async move |this, cx| {
                let confirmed = matches!(answer.await, Ok(0));
                this.update_in(cx, |workspace, window, cx| {
                    workspace.dispatch(Event::CloseConfirmed(confirmed), window, cx);
                })
                .ok();
            })
            .detach();
    }

    fn open_link(&mut self, url: &str) -> Result<()> {
        self.window_state.browser.open(url)
    }

    fn copy_to_clipboard(&mut self, text: &str) {
        self.cx
            .write_to_clipboard(ClipboardItem::new_string(text.to_string()));
    }

    fn quit(&mut self) {
        self.cx.quit();
    }
}
