//! Application state and the event dispatcher.

use crate::command::Command;
use crate::event::Event;
use crate::host::{ContextMenu, Host};
use crate::session::{Session, SessionId, SessionList};
use std::path::{Path, PathBuf};
use terminal::{FontDescriptor, ShellLaunch};
use tracing::{debug, error, info, warn};

/// Whether the application is still serving events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Running,
    /// The last session closed or the window close was confirmed.
    TornDown,
}

/// Everything one window knows about its sessions.
pub struct AppState<T> {
    sessions: SessionList<T>,
    font: FontDescriptor,
    keep_above: bool,
    matched_link: Option<String>,
    launch: ShellLaunch,
    lifecycle: Lifecycle,
    created: usize,
}

impl<T> AppState<T> {
    pub fn new(launch: ShellLaunch, font: FontDescriptor, keep_above: bool) -> Self {
        Self {
            sessions: SessionList::new(),
            font,
            keep_above,
            matched_link: None,
            launch,
            lifecycle: Lifecycle::Running,
            created: 0,
        }
    }

    pub fn sessions(&self) -> &SessionList<T> {
        &self.sessions
    }

    pub fn font(&self) -> &FontDescriptor {
        &self.font
    }

    pub fn keep_above(&self) -> bool {
        self.keep_above
    }

    pub fn matched_link(&self) -> Option<&str> {
        self.matched_link.as_deref()
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn tabs_visible(&self) -> bool {
        self.sessions.tabs_visible()
    }

    /// Open the first tab and apply startup settings. Without a first tab
    /// there is nothing to show, so a failed spawn tears down.
    pub fn start(&mut self, background: Option<PathBuf>, host: &mut impl Host<Terminal = T>) {
        if self.keep_above {
            if let Err(e) = host.set_keep_above(true) {
                warn!("Failed to keep window above others: {:#}", e);
            }
        }

        let Some(first) = self.new_tab(host) else {
            error!("Could not open the first tab, shutting down");
            self.teardown(host);
            return;
        };

        if let Some(image) = background {
            self.set_background(first, &image, host);
        }
    }

    /// Dispatch one event.
    pub fn handle(&mut self, event: Event, host: &mut impl Host<Terminal = T>) {
        if self.lifecycle == Lifecycle::TornDown {
            debug!(?event, "Ignoring event after teardown");
            return;
        }

        match event {
            Event::Command(command) => self.run(command, host),
            Event::CloseTab(id) | Event::ChildExited(id) => self.remove_session(id, host),
            Event::FontChosen(font) => self.set_font(font, host),
            Event::BackgroundChosen { session, path } => {
                self.set_background(session, &path, host)
            }
            Event::TabNameChosen { session, name } => match self.sessions.find_mut(session) {
                Some(session) => {
                    session.set_custom_title(&name);
                    debug!(session = %session.id(), title = ?session.custom_title(), "Tab renamed");
                }
                None => debug!(%session, "Tab closed before it was named"),
            },
            Event::ContextMenuRequested { session, link } => {
                if self.sessions.find(session).is_none() {
                    debug!(%session, "Context menu for unknown session");
                    return;
                }
                let menu = ContextMenu::build(session, link.is_some(), self.keep_above);
                self.matched_link = link;
                host.show_context_menu(menu);
            }
            Event::CloseRequested => self.request_close(host),
            Event::CloseConfirmed(true) => self.teardown(host),
            Event::CloseConfirmed(false) => debug!("Window close cancelled"),
        }
    }

    fn run(&mut self, command: Command, host: &mut impl Host<Terminal = T>) {
        match command {
            Command::NewTab => {
                self.new_tab(host);
            }
            Command::CloseTab => match self.sessions.active() {
                Some(session) => {
                    let id = session.id();
                    self.remove_session(id, host);
                }
                None => debug!("No active tab to close"),
            },
            Command::ActivateTab(index) => {
                if self.sessions.activate(index) {
                    self.focus_active(host);
                } else {
                    debug!(index, tabs = self.sessions.len(), "No tab at index");
                }
            }
            Command::NextTab => {
                if self.sessions.activate_next() {
                    self.focus_active(host);
                }
            }
            Command::PrevTab => {
                if self.sessions.activate_prev() {
                    self.focus_active(host);
                }
            }
            Command::IncreaseFontSize => self.set_font(self.font.larger(), host),
            Command::DecreaseFontSize => self.set_font(self.font.smaller(), host),
            Command::SelectFont => host.open_font_dialog(&self.font),
            Command::SelectBackground => {
                if let Some(session) = self.sessions.active() {
                    host.open_background_dialog(session.id());
                }
            }
            Command::SetTabName => {
                if let Some(session) = self.sessions.active() {
                    let current = session.custom_title().map(str::to_string);
                    host.open_tab_name_dialog(session.id(), current);
                }
            }
            Command::ToggleAlwaysOnTop => {
                self.keep_above = !self.keep_above;
                info!(keep_above = self.keep_above, "Toggled always on top");
                if let Err(e) = host.set_keep_above(self.keep_above) {
                    warn!("Failed to change window stacking: {:#}", e);
                }
            }
            Command::OpenLink => match self.matched_link.as_deref() {
                Some(url) => {
                    if let Err(e) = host.open_link(url) {
                        warn!("Failed to open link {}: {:#}", url, e);
                    }
                }
                None => debug!("No link under pointer"),
            },
            Command::CopyLink => match self.matched_link.as_deref() {
                Some(url) => host.copy_to_clipboard(url),
                None => debug!("No link under pointer"),
            },
            Command::Quit => self.request_close(host),
        }
    }

    /// Spawn a session and append it as the active tab. On failure the state
    /// is left exactly as it was.
    fn new_tab(&mut self, host: &mut impl Host<Terminal = T>) -> Option<SessionId> {
        let id = SessionId::new();
        let spawned = match host.spawn_terminal(id, &self.launch, &self.font) {
            Ok(spawned) => spawned,
            Err(e) => {
                error!("Failed to open new tab: {:#}", e);
                return None;
            }
        };

        self.created += 1;
        let index = self
            .sessions
            .push(Session::new(id, spawned.terminal, spawned.pid, self.created));
        self.sessions.activate(index);
        self.focus_active(host);

        info!(session = %id, pid = ?spawned.pid, tabs = self.sessions.len(), "Opened tab");
        Some(id)
    }

    /// The one removal path: explicit close and child exit both land here.
    fn remove_session(&mut self, id: SessionId, host: &mut impl Host<Terminal = T>) {
        let Some(session) = self.sessions.remove(id) else {
            debug!(session = %id, "Session already removed");
            return;
        };

        host.terminate(&session.terminal);
        info!(session = %id, tabs = self.sessions.len(), "Closed tab");

        if self.sessions.is_empty() {
            self.teardown(host);
        } else {
            self.focus_active(host);
        }
    }

    fn request_close(&mut self, host: &mut impl Host<Terminal = T>) {
        match self.sessions.len() {
            0 | 1 => self.teardown(host),
            open_tabs => host.confirm_close(open_tabs),
        }
    }

    fn teardown(&mut self, host: &mut impl Host<Terminal = T>) {
        for session in self.sessions.drain() {
            host.terminate(&session.terminal);
        }
        self.matched_link = None;
        self.lifecycle = Lifecycle::TornDown;
        info!("Last tab closed, shutting down");
        host.quit();
    }

    fn set_font(&mut self, font: FontDescriptor, host: &mut impl Host<Terminal = T>) {
        if font == self.font {
            debug!(%font, "Font unchanged");
            return;
        }

        self.font = font;
        for session in self.sessions.iter() {
            host.apply_font(&session.terminal, &self.font);
        }
        host.persist_font(&self.font);
        info!(font = %self.font, "Font changed");
    }

    fn set_background(
        &mut self,
        id: SessionId,
        image: &Path,
        host: &mut impl Host<Terminal = T>,
    ) {
        let Some(session) = self.sessions.find(id) else {
            debug!(session = %id, "Tab closed before its background was chosen");
            return;
        };

        match host.apply_background(&session.terminal, image) {
            Ok(()) => info!(session = %session.id(), image = %image.display(), "Background set"),
            Err(e) => warn!(
                "Failed to load background image {}: {:#}",
                image.display(),
                e
            ),
        }
    }

    fn focus_active(&self, host: &mut impl Host<Terminal = T>) {
        if let Some(session) = self.sessions.active() {
            host.focus(&session.terminal);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{MockHost, Spawned};
    use anyhow::anyhow;
    use mockall::predicate::*;
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    fn launch() -> ShellLaunch {
        ShellLaunch::resolve(None, |_| None)
    }

    fn font() -> FontDescriptor {
        FontDescriptor::new("Menlo", 13.0)
    }

    /// Host that spawns terminals 1, 2, 3... and accepts everything else.
    fn permissive_host() -> MockHost {
        let mut host = MockHost::new();
        let mut next = 0u32;
        host.expect_spawn_terminal().returning(move |_, _, _| {
            next += 1;
            Ok(Spawned {
                terminal: next,
                pid: Some(4000 + next),
            })
        });
        host.expect_focus().return_const(());
        host.expect_terminate().return_const(());
        host
    }

    #[test]
    #[traced_test]
    fn failed_spawn_leaves_state_unchanged() {
        let mut host = permissive_host();
        let mut state = AppState::new(launch(), font(), false);
        state.handle(Command::NewTab.into(), &mut host);
        host.checkpoint();

        host.expect_spawn_terminal()
            .returning(|_, _, _| Err(anyhow!("openpty failed")));
        host.expect_focus().never();
        state.handle(Command::NewTab.into(), &mut host);

        assert_eq!(state.sessions().len(), 1);
        assert_eq!(state.sessions().active_index(), Some(0));
        assert!(logs_contain("Failed to open new tab"));
        assert!(logs_contain("openpty failed"));
    }

    #[test]
    #[traced_test]
    fn failed_first_spawn_tears_down() {
        let mut host = MockHost::new();
        host.expect_spawn_terminal()
            .returning(|_, _, _| Err(anyhow!("no pty")));
        host.expect_quit().times(1).return_const(());

        let mut state = AppState::new(launch(), font(), false);
        state.start(None, &mut host);

        assert_eq!(state.lifecycle(), Lifecycle::TornDown);
        assert!(logs_contain("Could not open the first tab"));
    }

    #[test]
    fn start_applies_keep_above_and_background() {
        let mut host = permissive_host();
        host.expect_set_keep_above()
            .with(eq(true))
            .times(1)
            .returning(|_| Ok(()));
        host.expect_apply_background()
            .withf(|terminal, image| *terminal == 1 && image == Path::new("/tmp/bg.png"))
            .times(1)
            .returning(|_, _| Ok(()));

        let mut state = AppState::new(launch(), font(), true);
        state.start(Some(PathBuf::from("/tmp/bg.png")), &mut host);

        assert_eq!(state.sessions().len(), 1);
    }

    #[test]
    #[traced_test]
    fn failed_background_is_logged_and_survivable() {
        let mut host = permissive_host();
        host.expect_apply_background()
            .returning(|_, _| Err(anyhow!("unsupported image format")));

        let mut state = AppState::new(launch(), font(), false);
        state.start(None, &mut host);
        let session = state.sessions().ids()[0];
        state.handle(
            Event::BackgroundChosen {
                session,
                path: "/tmp/notes.txt".into(),
            },
            &mut host,
        );

        assert_eq!(state.lifecycle(), Lifecycle::Running);
        assert!(logs_contain("Failed to load background image"));
    }

    #[test]
    #[traced_test]
    fn background_for_closed_tab_is_dropped() {
        let mut host = permissive_host();
        host.expect_apply_background().never();

        let mut state = AppState::new(launch(), font(), false);
        state.start(None, &mut host);
        state.handle(Command::NewTab.into(), &mut host);
        let gone = state.sessions().ids()[1];
        state.handle(Event::CloseTab(gone), &mut host);

        state.handle(
            Event::BackgroundChosen {
                session: gone,
                path: "/tmp/wall.png".into(),
            },
            &mut host,
        );

        assert_eq!(state.sessions().len(), 1);
        assert!(logs_contain("Tab closed before its background was chosen"));
    }

    #[test]
    #[traced_test]
    fn failed_browser_launch_is_logged() {
        let mut host = permissive_host();
        host.expect_show_context_menu().return_const(());
        host.expect_open_link()
            .withf(|url: &str| url == "https://example.com")
            .returning(|_| Err(anyhow!("browser not found")));

        let mut state = AppState::new(launch(), font(), false);
        state.start(None, &mut host);
        let session = state.sessions().ids()[0];
        state.handle(
            Event::ContextMenuRequested {
                session,
                link: Some("https://example.com".into()),
            },
            &mut host,
        );
        state.handle(Command::OpenLink.into(), &mut host);

        assert_eq!(state.lifecycle(), Lifecycle::Running);
        assert!(logs_contain("Failed to open link"));
    }

    #[test]
    fn open_link_without_match_does_nothing() {
        let mut host = permissive_host();
        host.expect_open_link().never();
        host.expect_copy_to_clipboard().never();

        let mut state = AppState::new(launch(), font(), false);
        state.start(None, &mut host);
        state.handle(Command::OpenLink.into(), &mut host);
        state.handle(Command::CopyLink.into(), &mut host);
    }

    #[test]
    fn context_menu_for_unknown_session_is_ignored() {
        let mut host = permissive_host();
        host.expect_show_context_menu().never();

        let mut state = AppState::new(launch(), font(), false);
        state.start(None, &mut host);
        state.handle(
            Event::ContextMenuRequested {
                session: SessionId::new(),
                link: Some("https://example.com".into()),
            },
            &mut host,
        );
        assert_eq!(state.matched_link(), None);
    }

    #[test]
    fn font_at_bound_is_not_reapplied() {
        let mut host = permissive_host();
        host.expect_apply_font().never();
        host.expect_persist_font().never();

        let max = FontDescriptor::new("Menlo", settings::constants::terminal::MAX_FONT_SIZE);
        let mut state = AppState::new(launch(), max, false);
        state.start(None, &mut host);
        state.handle(Command::IncreaseFontSize.into(), &mut host);
    }

    #[test]
    fn keep_above_failure_still_flips_flag() {
        let mut host = permissive_host();
        host.expect_set_keep_above()
            .returning(|_| Err(anyhow!("wmctrl missing")));

        let mut state = AppState::new(launch(), font(), false);
        state.start(None, &mut host);
        state.handle(Command::ToggleAlwaysOnTop.into(), &mut host);

        assert!(state.keep_above());
    }

    #[test]
    fn events_after_teardown_are_ignored() {
        let mut host = permissive_host();
        host.expect_quit().times(1).return_const(());

        let mut state = AppState::new(launch(), font(), false);
        state.start(None, &mut host);
        state.handle(Command::CloseTab.into(), &mut host);
        host.checkpoint();

        host.expect_spawn_terminal().never();
        host.expect_quit().never();
        state.handle(Command::NewTab.into(), &mut host);
        state.handle(Event::CloseRequested, &mut host);

        assert_eq!(state.lifecycle(), Lifecycle::TornDown);
        assert!(state.sessions().is_empty());
    }
}
