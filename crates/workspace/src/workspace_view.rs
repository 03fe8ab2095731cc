//! Main window: tab strip, the active terminal and the context menu.

use crate::command::Command;
use crate::event::Event;
use crate::host::{ContextMenu, MenuItem};
use crate::session::SessionId;
use crate::state::{AppState, Lifecycle};
use crate::window_host::{DeferredKeepAbove, WindowHost};
use actions::*;
use gpui::prelude::FluentBuilder;
use gpui::*;
use gpui_component::{Root, WindowExt};
use rustc_hash::FxHashMap;
use settings::constants::{context_menu, tab_bar, window as window_consts};
use settings::Config;
use terminal::{BrowserCommand, FontDescriptor, ShellLaunch};
use terminal_view::{PaneOptions, TerminalEvent, TerminalPane};
use theme::terminal_colors;

/// A context menu on screen, anchored where the right click happened.
pub(crate) struct OpenMenu {
    pub(crate) menu: ContextMenu,
    pub(crate) position: Point<Pixels>,
}

/// Window-side state the host side effects work with.
pub(crate) struct WindowState {
    pub(crate) pane_options: PaneOptions,
    pub(crate) browser: BrowserCommand,
    /// One pane event subscription per live terminal
    pub(crate) subscriptions: FxHashMap<EntityId, Subscription>,
    /// Where the last right click happened
    pub(crate) menu_anchor: Point<Pixels>,
    pub(crate) context_menu: Option<OpenMenu>,
    pub(crate) keep_above: DeferredKeepAbove,
}

/// The main workspace view containing the tab strip and terminal panes.
pub struct Workspace {
    state: AppState<Entity<TerminalPane>>,
    window_state: WindowState,
    _activation: Subscription,
}

impl Workspace {
    /// Build the workspace from `config`. The first tab opens once the window
    /// is up.
    pub fn new(config: &Config, window: &mut Window, cx: &mut Context<Self>) -> Self {
        let launch = ShellLaunch::from_env(config.shell.as_deref());
        let font = FontDescriptor::new(config.font_family.as_str(), config.font_size);
        tracing::info!(shell = %launch.program, %font, "Starting workspace");

        let weak = cx.weak_entity();
        window.on_window_should_close(cx, move |window, cx| {
            weak.update(cx, |workspace, cx| workspace.should_close(window, cx))
                .unwrap_or(true)
        });

        let activation = cx.observe_window_activation(window, |workspace, window, _cx| {
            if window.is_window_active() {
                workspace.apply_pending_keep_above();
            }
        });

        let background = config.background_image.clone();
        cx.defer_in(window, move |workspace, window, cx| {
            let mut host = WindowHost::new(&mut workspace.window_state, window, cx);
            workspace.state.start(background, &mut host);
            cx.notify();
        });

        Self {
            state: AppState::new(launch, font, config.always_on_top),
            window_state: WindowState {
                pane_options: PaneOptions {
                    show_scrollbar: config.show_scrollbar,
                    scrollback_lines: config.scrollback_lines,
                },
                browser: BrowserCommand::from_env(config.browser.as_deref()),
                subscriptions: FxHashMap::default(),
                menu_anchor: Point::default(),
                context_menu: None,
                keep_above: DeferredKeepAbove::default(),
            },
            _activation: activation,
        }
    }

    fn apply_pending_keep_above(&mut self) {
        let Some(keep_above) = self.window_state.keep_above.activated() else {
            return;
        };
        if let Err(e) = platform::set_keep_above(window_consts::TITLE, keep_above) {
            tracing::warn!("Failed to keep window above others: {:#}", e);
        }
    }

    /// Feed one event to the application state.
    pub(crate) fn dispatch(&mut self, event: Event, window: &mut Window, cx: &mut Context<Self>) {
        let mut host = WindowHost::new(&mut self.window_state, window, cx);
        self.state.handle(event, &mut host);
        cx.notify();
    }

    fn command(&mut self, command: Command, window: &mut Window, cx: &mut Context<Self>) {
        self.window_state.context_menu = None;
        self.dispatch(Event::Command(command), window, cx);
    }

    pub(crate) fn on_terminal_event(
        &mut self,
        session: SessionId,
        event: &TerminalEvent,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        match event {
            TerminalEvent::Exited => self.dispatch(Event::ChildExited(session), window, cx),
            TerminalEvent::TitleChanged => cx.notify(),
            TerminalEvent::ContextMenu { position, link } => {
                self.window_state.menu_anchor = *position;
                self.dispatch(
                    Event::ContextMenuRequested {
                        session,
                        link: link.clone(),
                    },
                    window,
                    cx,
                );
            }
        }
    }

    /// Window manager close request. Closing goes ahead only once the state
    /// has torn down; with several tabs that waits for the user's answer.
    fn should_close(&mut self, window: &mut Window, cx: &mut Context<Self>) -> bool {
        if self.state.lifecycle() == Lifecycle::Running {
            self.dispatch(Event::CloseRequested, window, cx);
        }
        self.state.lifecycle() == Lifecycle::TornDown
    }

    fn dismiss_context_menu(&mut self, cx: &mut Context<Self>) {
        if self.window_state.context_menu.take().is_some() {
            cx.notify();
        }
    }

    fn focus_active_pane(&self, window: &mut Window, cx: &mut Context<Self>) {
        if window.has_active_dialog(cx) || self.window_state.context_menu.is_some() {
            return;
        }
        if let Some(session) = self.state.sessions().active() {
            let focus = session.terminal.read(cx).focus_handle(cx);
            if !focus.is_focused(window) {
                window.focus(&focus);
            }
        }
    }

    fn render_tab_bar(&self, cx: &mut Context<Self>) -> impl IntoElement {
        let colors = terminal_colors(cx);
        let active = self.state.sessions().active_index();

        let tabs = self
            .state
            .sessions()
            .iter()
            .enumerate()
            .map(|(index, session)| {
                let id = session.id();
                let is_active = Some(index) == active;
                let title = session.display_title(session.terminal.read(cx).title().as_deref());

                div()
                    .id(ElementId::Name(format!("tab-{}", id).into()))
                    .h(px(tab_bar::HEIGHT))
                    .min_w(px(tab_bar::TAB_MIN_WIDTH))
                    .max_w(px(tab_bar::TAB_MAX_WIDTH))
                    .px_3()
                    .flex()
                    .items_center()
                    .justify_between()
                    .cursor_pointer()
                    .border_r_1()
                    .border_color(colors.border)
                    .when(is_active, |d| {
                        d.bg(colors.tab_active).text_color(colors.foreground)
                    })
                    .when(!is_active, |d| {
                        d.bg(colors.tab_inactive)
                            .text_color(colors.muted)
                            .hover(|d| d.bg(colors.tab_active))
                    })
                    .on_click(cx.listener(move |this, _: &ClickEvent, window, cx| {
                        this.command(Command::ActivateTab(index), window, cx);
                    }))
                    .child(
                        div()
                            .text_sm()
                            .overflow_hidden()
                            .whitespace_nowrap()
                            .child(title),
                    )
                    .child(
                        div()
                            .id(ElementId::Name(format!("close-{}", id).into()))
                            .w(px(tab_bar::CLOSE_BUTTON_SIZE))
                            .h(px(tab_bar::CLOSE_BUTTON_SIZE))
                            .ml_2()
                            .flex()
                            .items_center()
                            .justify_center()
                            .text_sm()
                            .text_color(colors.muted)
                            .hover(|d| d.text_color(colors.red))
                            .on_click(cx.listener(move |this, _: &ClickEvent, window, cx| {
                                cx.stop_propagation();
                                this.window_state.context_menu = None;
                                this.dispatch(Event::CloseTab(id), window, cx);
                            }))
                            .child("×"),
                    )
            });

        div()
            .h(px(tab_bar::HEIGHT))
            .w_full()
            .flex()
            .flex_none()
            .bg(colors.tab_bar)
            .pr(px(tab_bar::PADDING))
            .border_b_1()
            .border_color(colors.border)
            .children(tabs)
            .child(
                div()
                    .id("new-tab-btn")
                    .h(px(tab_bar::HEIGHT))
                    .w(px(tab_bar::HEIGHT))
                    .flex()
                    .items_center()
                    .justify_center()
                    .cursor_pointer()
                    .text_color(colors.muted)
                    .hover(|d| d.bg(colors.tab_active).text_color(colors.foreground))
                    .on_click(cx.listener(|this, _: &ClickEvent, window, cx| {
                        this.command(Command::NewTab, window, cx);
                    }))
                    .child("+"),
            )
    }

    fn render_context_menu(&self, open: &OpenMenu, cx: &mut Context<Self>) -> impl IntoElement {
        let colors = terminal_colors(cx);

        let items = open
            .menu
            .items
            .iter()
            .enumerate()
            .map(|(index, item)| match *item {
                MenuItem::Separator => div()
                    .h(px(1.0))
                    .mx(px(8.0))
                    .my(px(4.0))
                    .bg(colors.border)
                    .into_any_element(),
                MenuItem::Entry {
                    label,
                    command,
                    checked,
                } => div()
                    .id(ElementId::Name(format!("menu-{}", index).into()))
                    .px(px(12.0))
                    .py(px(6.0))
                    .flex()
                    .gap_2()
                    .text_sm()
                    .text_color(colors.foreground)
                    .cursor_pointer()
                    .hover(|d| d.bg(colors.tab_active))
                    .on_click(cx.listener(move |this, _: &ClickEvent, window, cx| {
                        this.command(command, window, cx);
                    }))
                    .when_some(checked, |d, checked| {
                        d.child(
                            div()
                                .w(px(12.0))
                                .text_color(colors.accent)
                                .child(if checked { "✓" } else { "" }),
                        )
                    })
                    .child(label)
                    .into_any_element(),
            })
            .collect::<Vec<_>>();

        div()
            .absolute()
            .size_full()
            .top_0()
            .left_0()
            // Clicking anywhere else dismisses the menu
            .on_mouse_down(
                MouseButton::Left,
                cx.listener(|this, _: &MouseDownEvent, _window, cx| {
                    this.dismiss_context_menu(cx)
                }),
            )
            .on_mouse_down(
                MouseButton::Right,
                cx.listener(|this, _: &MouseDownEvent, _window, cx| {
                    this.dismiss_context_menu(cx)
                }),
            )
            .child(
                div()
                    .id("context-menu")
                    .absolute()
                    .left(open.position.x)
                    .top(open.position.y)
                    .w(px(context_menu::WIDTH))
                    .bg(colors.tab_bar)
                    .border_1()
                    .border_color(colors.border)
                    .rounded(px(6.0))
                    .shadow_lg()
                    .py(px(4.0))
                    .flex()
                    .flex_col()
                    .on_mouse_down(MouseButton::Left, |_, _, cx| cx.stop_propagation())
                    .on_mouse_down(MouseButton::Right, |_, _, cx| cx.stop_propagation())
                    .children(items),
            )
    }
}

impl Render for Workspace {
    fn render(&mut self, window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        self.focus_active_pane(window, cx);

        let colors = terminal_colors(cx);
        let menu = self
            .window_state
            .context_menu
            .as_ref()
            .map(|open| self.render_context_menu(open, cx));

        div()
            .size_full()
            .relative()
            .bg(colors.background)
            .text_color(colors.foreground)
            .flex()
            .flex_col()
            .key_context("Workspace")
            .on_action(cx.listener(|this, _: &NewTab, window, cx| {
                this.command(Command::NewTab, window, cx)
            }))
            .on_action(cx.listener(|this, _: &CloseTab, window, cx| {
                this.command(Command::CloseTab, window, cx)
            }))
            .on_action(cx.listener(|this, _: &NextTab, window, cx| {
                this.command(Command::NextTab, window, cx)
            }))
            .on_action(cx.listener(|this, _: &PrevTab, window, cx| {
                this.command(Command::PrevTab, window, cx)
            }))
            .on_action(cx.listener(|this, action: &ActivateTab, window, cx| {
                this.command(Command::ActivateTab(action.0), window, cx)
            }))
            .on_action(cx.listener(|this, _: &IncreaseFontSize, window, cx| {
                this.command(Command::IncreaseFontSize, window, cx)
            }))
            .on_action(cx.listener(|this, _: &DecreaseFontSize, window, cx| {
                this.command(Command::DecreaseFontSize, window, cx)
            }))
            .on_action(cx.listener(|this, _: &SelectFont, window, cx| {
                this.command(Command::SelectFont, window, cx)
            }))
            .on_action(cx.listener(|this, _: &SelectBackground, window, cx| {
                this.command(Command::SelectBackground, window, cx)
            }))
            .on_action(cx.listener(|this, _: &SetTabName, window, cx| {
                this.command(Command::SetTabName, window, cx)
            }))
            .on_action(cx.listener(|this, _: &ToggleAlwaysOnTop, window, cx| {
                this.command(Command::ToggleAlwaysOnTop, window, cx)
            }))
            .on_action(cx.listener(|this, _: &OpenLink, window, cx| {
                this.command(Command::OpenLink, window, cx)
            }))
            .on_action(cx.listener(|this, _: &CopyLink, window, cx| {
                this.command(Command::CopyLink, window, cx)
            }))
            .on_action(cx.listener(|this, _: &Quit, window, cx| {
                this.command(Command::Quit, window, cx)
            }))
            .when(self.state.tabs_visible(), |d| d.child(self.render_tab_bar(cx)))
            .child(
                div()
                    .flex_1()
                    .w_full()
                    .overflow_hidden()
                    .children(
                        self.state
                            .sessions()
                            .active()
                            .map(|session| session.terminal.clone()),
                    ),
            )
            .children(menu)
            .children(Root::render_dialog_layer(window, cx))
    }
}
