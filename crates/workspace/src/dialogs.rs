//! Modal dialogs: font selection and tab naming.
//!
//! Accepting a dialog feeds an [`Event`] back into the workspace that opened
//! it; cancelling does nothing.

use crate::event::Event;
use crate::session::SessionId;
use crate::workspace_view::Workspace;
use gpui::prelude::FluentBuilder;
use gpui::*;
use gpui_component::input::{Input, InputState};
use gpui_component::{h_flex, v_flex, WindowExt};
use settings::constants::terminal::SUGGESTED_FAMILIES;
use terminal::FontDescriptor;
use theme::terminal_colors;

const DIALOG_WIDTH: f32 = 420.0;

/// Ask for a `"Family Size"` font. Suggested families fill the input while
/// keeping the current size.
pub(crate) fn open_font_dialog(
    current: &FontDescriptor,
    workspace: WeakEntity<Workspace>,
    window: &mut Window,
    cx: &mut App,
) {
    let input = cx.new(|cx| {
        InputState::new(window, cx)
            .default_value(current.to_string())
            .placeholder("Family and size, e.g. DejaVu Sans Mono 12")
    });
    let size = current.size();
    let current_family = current.family().to_string();

    window.open_dialog(cx, move |dialog, _window, cx| {
        let colors = terminal_colors(cx);

        let suggestions = SUGGESTED_FAMILIES.iter().map(|family| {
            let input = input.clone();
            let is_current = *family == current_family;
            div()
                .id(ElementId::Name(format!("font-{}", family).into()))
                .px_2()
                .py_1()
                .rounded(px(4.0))
                .text_sm()
                .cursor_pointer()
                .border_1()
                .border_color(colors.border)
                .when(is_current, |d| d.bg(colors.tab_active))
                .hover(|d| d.bg(colors.tab_active))
                .on_click(move |_: &ClickEvent, window, cx| {
                    let font = FontDescriptor::new(*family, size);
                    input.update(cx, |state, cx| {
                        state.set_value(font.to_string(), window, cx);
                    });
                })
                .child(*family)
        });

        let input_ok = input.clone();
        let workspace = workspace.clone();
        dialog
            .title("Select font")
            .w(px(DIALOG_WIDTH))
            .child(
                v_flex()
                    .gap_2()
                    .child(Input::new(&input))
                    .child(h_flex().flex_wrap().gap_1().children(suggestions)),
            )
            .confirm()
            .on_ok(move |_, window, cx| {
                let text = input_ok.read(cx).value().to_string();
                match FontDescriptor::parse(&text) {
                    Some(font) => {
                        dispatch(&workspace, Event::FontChosen(font), window, cx);
                        true
                    }
                    None => {
                        tracing::warn!("Not a font description: '{}'", text);
                        false
                    }
                }
            })
    });
}

/// Ask for the name of `session`'s tab. An empty name goes back to the
/// automatic title.
pub(crate) fn open_tab_name_dialog(
    session: SessionId,
    current: Option<String>,
    workspace: WeakEntity<Workspace>,
    window: &mut Window,
    cx: &mut App,
) {
    let input = cx.new(|cx| {
        InputState::new(window, cx)
            .default_value(current.unwrap_or_default())
            .placeholder("Leave empty to use the shell's title")
    });

    window.open_dialog(cx, move |dialog, _window, _cx| {
        let input_ok = input.clone();
        let workspace = workspace.clone();
        dialog
            .title("Set tab name")
            .w(px(DIALOG_WIDTH))
            .child(Input::new(&input))
            .confirm()
            .on_ok(move |_, window, cx| {
                let name = input_ok.read(cx).value().to_string();
                dispatch(&workspace, Event::TabNameChosen { session, name }, window, cx);
                true
            })
    });
}

fn dispatch(workspace: &WeakEntity<Workspace>, event: Event, window: &mut Window, cx: &mut App) {
    if let Err(e) = workspace.update(cx, |workspace, cx| workspace.dispatch(event, window, cx)) {
        tracing::debug!("Workspace gone before dialog answer: {}", e);
    }
}
