//! Sessions and the ordered container that defines tab order.

use std::fmt;
use uuid::Uuid;

/// Stable identity of a session, independent of its position in the tab strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// One open tab: its terminal and the shell running in it.
pub struct Session<T> {
    id: SessionId,
    /// Handle to the terminal widget (a pane entity in the app).
    pub terminal: T,
    pid: Option<u32>,
    number: usize,
    custom_title: Option<String>,
}

impl<T> Session<T> {
    /// `number` is the 1-based creation ordinal used for the fallback title.
    pub fn new(id: SessionId, terminal: T, pid: Option<u32>, number: usize) -> Self {
        Self {
            id,
            terminal,
            pid,
            number,
            custom_title: None,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub fn custom_title(&self) -> Option<&str> {
        self.custom_title.as_deref()
    }

    /// Set a user title. Blank names clear it.
    pub fn set_custom_title(&mut self, title: &str) {
        let title = title.trim();
        self.custom_title = (!title.is_empty()).then(|| title.to_string());
    }

    pub fn fallback_title(&self) -> String {
        format!("Terminal {}", self.number)
    }

    /// Title shown in the tab strip: the user's name, else the title the
    /// shell reported, else "Terminal N".
    pub fn display_title(&self, reported: Option<&str>) -> String {
        self.custom_title
            .clone()
            .or_else(|| {
                reported
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| self.fallback_title())
    }
}

/// The single ordered collection of sessions. Tab order is vector order; the
/// tab strip is rendered straight from it.
pub struct SessionList<T> {
    sessions: Vec<Session<T>>,
    active: usize,
}

impl<T> Default for SessionList<T> {
    fn default() -> Self {
        Self {
            sessions: Vec::new(),
            active: 0,
        }
    }
}

impl<T> SessionList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// The tab strip is only shown with more than one session.
    pub fn tabs_visible(&self) -> bool {
        self.sessions.len() > 1
    }

    /// Append at the end. Returns the new session's index.
    pub fn push(&mut self, session: Session<T>) -> usize {
        self.sessions.push(session);
        self.sessions.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&Session<T>> {
        self.sessions.get(index)
    }

    pub fn position(&self, id: SessionId) -> Option<usize> {
        self.sessions.iter().position(|s| s.id == id)
    }

    pub fn find(&self, id: SessionId) -> Option<&Session<T>> {
        self.sessions.iter().find(|s| s.id == id)
    }

    pub fn find_mut(&mut self, id: SessionId) -> Option<&mut Session<T>> {
        self.sessions.iter_mut().find(|s| s.id == id)
    }

    pub fn active_index(&self) -> Option<usize> {
        (!self.sessions.is_empty()).then_some(self.active)
    }

    pub fn active(&self) -> Option<&Session<T>> {
        self.sessions.get(self.active)
    }

    pub fn active_mut(&mut self) -> Option<&mut Session<T>> {
        self.sessions.get_mut(self.active)
    }

    /// Make `index` active. Out-of-range indices are rejected.
    pub fn activate(&mut self, index: usize) -> bool {
        if index < self.sessions.len() {
            self.active = index;
            true
        } else {
            false
        }
    }

    /// Activate the next tab, wrapping around.
    pub fn activate_next(&mut self) -> bool {
        match self.sessions.len() {
            0 => false,
            len => self.activate((self.active + 1) % len),
        }
    }

    /// Activate the previous tab, wrapping around.
    pub fn activate_prev(&mut self) -> bool {
        match self.sessions.len() {
            0 => false,
            len => self.activate((self.active + len - 1) % len),
        }
    }

    /// Remove the session with `id`, keeping the order of the rest.
    ///
    /// The active tab stays on the same session when another tab is removed;
    /// when the active tab itself is removed, its right neighbour (or the new
    /// last tab) becomes active.
    pub fn remove(&mut self, id: SessionId) -> Option<Session<T>> {
        let index = self.position(id)?;
        let removed = self.sessions.remove(index);

        if self.active > index {
            self.active -= 1;
        }
        if self.active >= self.sessions.len() {
            self.active = self.sessions.len().saturating_sub(1);
        }
        Some(removed)
    }

    /// Remove every session, in tab order.
    pub fn drain(&mut self) -> Vec<Session<T>> {
        self.active = 0;
        std::mem::take(&mut self.sessions)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Session<T>> {
        self.sessions.iter()
    }

    pub fn ids(&self) -> Vec<SessionId> {
        self.sessions.iter().map(|s| s.id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use test_case::test_case;

    fn list(n: usize) -> (SessionList<usize>, Vec<SessionId>) {
        let mut sessions = SessionList::new();
        let mut ids = Vec::new();
        for i in 0..n {
            let id = SessionId::new();
            sessions.push(Session::new(id, i, Some(1000 + i as u32), i + 1));
            ids.push(id);
        }
        (sessions, ids)
    }

    #[test]
    fn push_keeps_creation_order() {
        let (sessions, ids) = list(3);
        assert_eq!(sessions.ids(), ids);
        assert_eq!(
            sessions.iter().map(|s| s.terminal).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
    }

    #[test_case(0, false ; "empty")]
    #[test_case(1, false ; "single")]
    #[test_case(2, true ; "two")]
    #[test_case(7, true ; "many")]
    fn tabs_visible_only_with_several(n: usize, visible: bool) {
        assert_eq!(list(n).0.tabs_visible(), visible);
    }

    #[test]
    fn activate_rejects_out_of_range() {
        let (mut sessions, _) = list(2);
        assert!(sessions.activate(1));
        assert!(!sessions.activate(2));
        assert_eq!(sessions.active_index(), Some(1));
    }

    #[test]
    fn active_index_is_none_when_empty() {
        assert_eq!(SessionList::<u8>::new().active_index(), None);
    }

    #[test]
    fn next_and_prev_wrap() {
        let (mut sessions, _) = list(3);
        sessions.activate(2);
        sessions.activate_next();
        assert_eq!(sessions.active_index(), Some(0));
        sessions.activate_prev();
        assert_eq!(sessions.active_index(), Some(2));
    }

    #[test]
    fn removing_tab_before_active_keeps_active_session() {
        let (mut sessions, ids) = list(3);
        sessions.activate(2);
        sessions.remove(ids[0]).unwrap();
        assert_eq!(sessions.active().map(|s| s.id()), Some(ids[2]));
    }

    #[test]
    fn removing_active_tab_activates_right_neighbour() {
        let (mut sessions, ids) = list(3);
        sessions.activate(1);
        sessions.remove(ids[1]).unwrap();
        assert_eq!(sessions.active().map(|s| s.id()), Some(ids[2]));
    }

    #[test]
    fn removing_last_active_tab_activates_new_last() {
        let (mut sessions, ids) = list(3);
        sessions.activate(2);
        sessions.remove(ids[2]).unwrap();
        assert_eq!(sessions.active().map(|s| s.id()), Some(ids[1]));
    }

    #[test]
    fn removing_unknown_id_is_none() {
        let (mut sessions, _) = list(2);
        assert!(sessions.remove(SessionId::new()).is_none());
        assert_eq!(sessions.len(), 2);
    }

    #[test]
    fn display_title_prefers_custom_then_reported() {
        let mut session = Session::new(SessionId::new(), (), None, 4);
        assert_eq!(session.display_title(None), "Terminal 4");
        assert_eq!(session.display_title(Some("  ")), "Terminal 4");
        assert_eq!(session.display_title(Some("vim")), "vim");

        session.set_custom_title("  logs ");
        assert_eq!(session.display_title(Some("vim")), "logs");

        session.set_custom_title("");
        assert_eq!(session.custom_title(), None);
        assert_eq!(session.display_title(Some("vim")), "vim");
    }

    proptest! {
        #[test]
        fn remove_preserves_relative_order(n in 1usize..12, pick in 0usize..12, active in 0usize..12) {
            let (mut sessions, ids) = list(n);
            sessions.activate(active % n);
            let victim = ids[pick % n];

            sessions.remove(victim).unwrap();

            let expected: Vec<_> = ids.iter().copied().filter(|id| *id != victim).collect();
            prop_assert_eq!(sessions.ids(), expected);
            prop_assert_eq!(sessions.len(), n - 1);
            if n > 1 {
                prop_assert!(sessions.active_index().unwrap() < sessions.len());
            } else {
                prop_assert_eq!(sessions.active_index(), None);
            }
        }
    }
}
