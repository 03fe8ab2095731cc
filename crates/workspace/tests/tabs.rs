//! Tab lifecycle through the public dispatcher.

mod common;

use common::{active_terminal, font, launch, started, tab_order, Call, FakeHost};
use kiri_workspace::{AppState, Command, Event, Keymap, Lifecycle, MenuItem};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use terminal::FontDescriptor;
use test_case::test_case;

#[test_case(1, false ; "single tab hides strip")]
#[test_case(2, true ; "two tabs show strip")]
#[test_case(6, true ; "many tabs show strip")]
fn tabs_open_in_creation_order(tabs: usize, strip_visible: bool) {
    let (state, _host) = started(tabs);

    let expected: Vec<u32> = (1..=tabs as u32).collect();
    assert_eq!(tab_order(&state), expected);
    assert_eq!(state.tabs_visible(), strip_visible);
    assert_eq!(active_terminal(&state), Some(tabs as u32));
}

#[test]
fn new_tab_focuses_the_new_terminal() {
    let (state, host) = started(3);
    assert_eq!(host.last_focus(), Some(3));
    assert_eq!(state.sessions().active_index(), Some(2));
}

#[test]
fn closing_the_only_tab_quits() {
    let (mut state, mut host) = started(1);

    state.handle(Command::CloseTab.into(), &mut host);

    assert_eq!(state.lifecycle(), Lifecycle::TornDown);
    assert!(state.sessions().is_empty());
    assert!(host.quit_called());
    assert!(host.live.is_empty());
}

#[test]
fn child_exit_of_the_only_tab_quits() {
    let (mut state, mut host) = started(1);
    let id = state.sessions().ids()[0];

    state.handle(Event::ChildExited(id), &mut host);

    assert_eq!(state.lifecycle(), Lifecycle::TornDown);
    assert!(host.quit_called());
}

#[test]
fn closing_a_middle_tab_keeps_the_others_in_order() {
    let (mut state, mut host) = started(4);
    let ids = state.sessions().ids();

    state.handle(Event::CloseTab(ids[1]), &mut host);

    assert_eq!(tab_order(&state), vec![1, 3, 4]);
    assert!(host.calls.contains(&Call::Terminate(2)));
    assert!(!host.quit_called());
    // The active tab was the last one and stays active
    assert_eq!(active_terminal(&state), Some(4));
}

#[test]
fn child_exit_removes_by_identity_not_position() {
    let (mut state, mut host) = started(3);
    let ids = state.sessions().ids();
    state.handle(Command::ActivateTab(0).into(), &mut host);

    state.handle(Event::ChildExited(ids[2]), &mut host);
    // A late second notification for the same session is harmless
    state.handle(Event::ChildExited(ids[2]), &mut host);

    assert_eq!(tab_order(&state), vec![1, 2]);
    assert_eq!(active_terminal(&state), Some(1));
    assert_eq!(host.count(|c| *c == Call::Terminate(3)), 1);
}

#[test]
fn font_size_changes_reach_every_tab() {
    let (mut state, mut host) = started(3);

    state.handle(Command::IncreaseFontSize.into(), &mut host);

    let expected = font().larger();
    assert_eq!(state.font(), &expected);
    for terminal in 1..=3 {
        assert!(host
            .calls
            .contains(&Call::ApplyFont(terminal, expected.clone())));
    }
    assert!(host.calls.contains(&Call::PersistFont(expected)));
}

#[test]
fn chosen_font_replaces_the_shared_font() {
    let (mut state, mut host) = started(2);
    let chosen = FontDescriptor::new("Fira Code", 15.0);

    state.handle(Event::FontChosen(chosen.clone()), &mut host);

    assert_eq!(state.font(), &chosen);
    assert_eq!(
        host.count(|c| matches!(c, Call::ApplyFont(_, f) if *f == chosen)),
        2
    );
}

#[test]
fn background_applies_to_the_active_tab_only() {
    let (mut state, mut host) = started(3);
    let ids = state.sessions().ids();
    state.handle(Command::ActivateTab(1).into(), &mut host);

    state.handle(Command::SelectBackground.into(), &mut host);
    assert!(host.calls.contains(&Call::BackgroundDialog(ids[1])));
    state.handle(
        Event::BackgroundChosen {
            session: ids[1],
            path: "/tmp/wall.png".into(),
        },
        &mut host,
    );

    let applied: Vec<_> = host
        .calls
        .iter()
        .filter(|c| matches!(c, Call::ApplyBackground(..)))
        .collect();
    assert_eq!(
        applied,
        vec![&Call::ApplyBackground(2, "/tmp/wall.png".into())]
    );
}

#[test]
fn background_lands_on_the_tab_it_was_picked_for() {
    let (mut state, mut host) = started(3);
    let ids = state.sessions().ids();
    state.handle(Command::ActivateTab(0).into(), &mut host);
    state.handle(Command::SelectBackground.into(), &mut host);

    // The picker does not block the window, so tabs can change meanwhile
    state.handle(Command::ActivateTab(2).into(), &mut host);
    state.handle(
        Event::BackgroundChosen {
            session: ids[0],
            path: "/tmp/wall.png".into(),
        },
        &mut host,
    );

    assert!(host.calls.contains(&Call::BackgroundDialog(ids[0])));
    assert!(host
        .calls
        .contains(&Call::ApplyBackground(1, "/tmp/wall.png".into())));
    assert_eq!(host.count(|c| matches!(c, Call::ApplyBackground(3, _))), 0);
}

#[test]
fn tab_name_labels_the_active_tab() {
    let (mut state, mut host) = started(2);
    let ids = state.sessions().ids();

    state.handle(Command::SetTabName.into(), &mut host);
    state.handle(
        Event::TabNameChosen {
            session: ids[1],
            name: "build".into(),
        },
        &mut host,
    );

    assert!(host.calls.contains(&Call::TabNameDialog(ids[1], None)));
    let titles: Vec<String> = state
        .sessions()
        .iter()
        .map(|s| s.display_title(None))
        .collect();
    assert_eq!(titles, vec!["Terminal 1", "build"]);
}

#[test]
fn name_for_an_exited_tab_is_dropped() {
    let (mut state, mut host) = started(3);
    let ids = state.sessions().ids();
    state.handle(Command::ActivateTab(1).into(), &mut host);
    state.handle(Command::SetTabName.into(), &mut host);

    // The shell exits while the dialog is open and terminal 3 becomes active
    state.handle(Event::ChildExited(ids[1]), &mut host);
    assert_eq!(active_terminal(&state), Some(3));
    state.handle(
        Event::TabNameChosen {
            session: ids[1],
            name: "build".into(),
        },
        &mut host,
    );

    let titles: Vec<String> = state
        .sessions()
        .iter()
        .map(|s| s.display_title(None))
        .collect();
    assert_eq!(titles, vec!["Terminal 1", "Terminal 3"]);
}

#[test]
fn failed_new_tab_leaves_tabs_untouched() {
    let (mut state, mut host) = started(2);
    host.fail_spawn = true;

    state.handle(Command::NewTab.into(), &mut host);

    assert_eq!(tab_order(&state), vec![1, 2]);
    assert_eq!(state.lifecycle(), Lifecycle::Running);
}

#[test]
fn right_click_on_link_offers_open_link() {
    let (mut state, mut host) = started(1);
    let session = state.sessions().ids()[0];

    state.handle(
        Event::ContextMenuRequested {
            session,
            link: Some("https://example.org/docs".into()),
        },
        &mut host,
    );
    state.handle(Command::OpenLink.into(), &mut host);

    let menu = host
        .calls
        .iter()
        .find_map(|c| match c {
            Call::ContextMenu(menu) => Some(menu.clone()),
            _ => None,
        })
        .expect("context menu shown");
    assert!(matches!(
        menu.items.first(),
        Some(MenuItem::Entry {
            command: Command::OpenLink,
            ..
        })
    ));
    assert!(host
        .calls
        .contains(&Call::OpenLink("https://example.org/docs".into())));
}

#[test]
fn toggle_always_on_top_asks_the_window_manager() {
    let (mut state, mut host) = started(1);

    state.handle(Command::ToggleAlwaysOnTop.into(), &mut host);
    state.handle(Command::ToggleAlwaysOnTop.into(), &mut host);

    assert!(!state.keep_above());
    assert_eq!(
        host.count(|c| matches!(c, Call::KeepAbove(_))),
        2
    );
    assert!(host.calls.ends_with(&[Call::KeepAbove(true), Call::KeepAbove(false)]));
}

#[test]
fn closing_window_with_several_tabs_asks_first() {
    let (mut state, mut host) = started(3);

    state.handle(Event::CloseRequested, &mut host);
    assert!(host.calls.contains(&Call::ConfirmClose(3)));
    assert_eq!(state.lifecycle(), Lifecycle::Running);

    state.handle(Event::CloseConfirmed(false), &mut host);
    assert_eq!(state.sessions().len(), 3);

    state.handle(Event::CloseRequested, &mut host);
    state.handle(Event::CloseConfirmed(true), &mut host);
    assert_eq!(state.lifecycle(), Lifecycle::TornDown);
    assert!(host.live.is_empty());
}

#[test]
fn closing_window_with_one_tab_does_not_ask() {
    let (mut state, mut host) = started(1);

    state.handle(Event::CloseRequested, &mut host);

    assert_eq!(host.count(|c| matches!(c, Call::ConfirmClose(_))), 0);
    assert!(host.quit_called());
}

#[test]
fn two_tabs_then_alt_1_then_close() {
    let keymap = Keymap::with_defaults();
    let mut host = FakeHost::new();
    let mut state = AppState::new(launch(), font(), false);

    state.handle(Command::NewTab.into(), &mut host);
    state.handle(Command::NewTab.into(), &mut host);
    assert_eq!(state.sessions().len(), 2);
    assert!(state.tabs_visible());

    let alt_1 = keymap.lookup("alt-1").expect("alt-1 is bound");
    state.handle(alt_1.into(), &mut host);
    assert_eq!(state.sessions().active_index(), Some(0));

    let survivor = state.sessions().get(1).map(|s| (s.id(), s.pid()));
    state.handle(Command::CloseTab.into(), &mut host);

    assert_eq!(state.sessions().len(), 1);
    assert!(!state.tabs_visible());
    let remaining = state.sessions().active().map(|s| (s.id(), s.pid()));
    assert_eq!(remaining, survivor);
    assert_eq!(remaining.and_then(|(_, pid)| pid), Some(40_002));
    assert_eq!(state.font(), &font());
}

proptest! {
    #[test]
    fn activate_tab_only_accepts_existing_indices(tabs in 1usize..8, target in 0usize..12) {
        let (mut state, mut host) = started(tabs);
        let before = state.sessions().active_index();

        state.handle(Command::ActivateTab(target).into(), &mut host);

        let expected = if target < tabs { Some(target) } else { before };
        prop_assert_eq!(state.sessions().active_index(), expected);
        prop_assert_eq!(state.sessions().len(), tabs);
    }

    #[test]
    fn closing_any_non_last_tab_preserves_order(tabs in 2usize..8, victim in 0usize..8) {
        let (mut state, mut host) = started(tabs);
        let victim = victim % tabs;
        let ids = state.sessions().ids();
        let mut expected = tab_order(&state);
        expected.remove(victim);

        state.handle(Event::CloseTab(ids[victim]), &mut host);

        prop_assert_eq!(tab_order(&state), expected);
        prop_assert_eq!(state.lifecycle(), Lifecycle::Running);
        prop_assert_eq!(state.tabs_visible(), tabs - 1 > 1);
    }
}
