/// Tab bookkeeping for the lookup panel

/// Label of the placeholder tab shown before the first real lookup
pub const PLACEHOLDER_LABEL: &str = "Welcome";

/// One open lookup: its tab label, rendered result fragment and the scroll
/// offset of its pane at the moment it was last blurred.
#[derive(Debug, Clone, PartialEq)]
pub struct Tab {
    pub label: String,
    pub content: String,
    pub scroll: f64,
    pub has_audio: bool,
}

impl Tab {
    fn new(label: &str, content: &str, has_audio: bool) -> Tab {
        Tab {
            label: label.to_string(),
            content: content.to_string(),
            scroll: 0.0,
            has_audio,
        }
    }
}

/// The panel's tab list. Indices are stable addresses: closing a tab leaves a
/// hole instead of re-indexing, and only an all-empty list resets the vector.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TabSession {
    slots: Vec<Option<Tab>>,
    active: Option<usize>,
    revision: u64,
}

impl TabSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.live_count() == 0
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    pub fn get(&self, index: usize) -> Option<&Tab> {
        self.slots.get(index).and_then(|slot| slot.as_ref())
    }

    /// Bumped whenever a pane's content is replaced wholesale, so the view
    /// layer can tell "new fragment" apart from in-place updates.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Tab)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|tab| (index, tab)))
    }

    /// Persist the scroll offset of a tab's pane (typically on blur).
    /// Unknown indices are ignored.
    pub fn save_scroll(&mut self, index: usize, offset: f64) {
        if let Some(tab) = self.slots.get_mut(index).and_then(|slot| slot.as_mut()) {
            tab.scroll = offset;
        }
    }

    /// Make `index` the active tab. Returns false (and changes nothing) for
    /// a dead or out-of-range index.
    pub fn focus(&mut self, index: usize) -> bool {
        if self.get(index).is_some() {
            self.active = Some(index);
            true
        } else {
            false
        }
    }

    /// Deliver a lookup result. In single-tab mode the active tab (or the
    /// last live one) is relabeled and refilled in place; in multi-tab mode a
    /// lone placeholder tab is evicted first and a fresh tab is appended.
    /// The affected tab becomes active; returns its index.
    pub fn open_result(&mut self, html: &str, term: &str, single_tab: bool, has_audio: bool) -> usize {
        self.revision += 1;
        if single_tab {
            let target = self.active.or_else(|| self.last_live());
            if let Some(index) = target {
                if let Some(tab) = self.slots.get_mut(index).and_then(|slot| slot.as_mut()) {
                    tab.label = term.to_string();
                    tab.content = html.to_string();
                    tab.scroll = 0.0;
                    tab.has_audio = has_audio;
                }
                self.active = Some(index);
                return index;
            }
            self.push_tab(html, term, has_audio)
        } else {
            self.evict_placeholder();
            self.push_tab(html, term, has_audio)
        }
    }

    /// Append extra markup to a pane in place. Not a fresh fragment, so the
    /// revision is left alone and the pane keeps its scroll position.
    pub fn append_content(&mut self, index: usize, html: &str) {
        if let Some(tab) = self.slots.get_mut(index).and_then(|slot| slot.as_mut()) {
            tab.content.push_str(html);
        }
    }

    /// Close the tab at `index`. When the active tab closes, focus moves to
    /// the nearest lower live tab, else the nearest higher one. Closing the
    /// last tab leaves the list empty; no placeholder is re-created.
    pub fn close(&mut self, index: usize) {
        if self.get(index).is_none() {
            return;
        }
        if self.active == Some(index) {
            self.active = (0..index)
                .rev()
                .find(|&i| self.get(i).is_some())
                .or_else(|| (index + 1..self.slots.len()).find(|&i| self.get(i).is_some()));
        }
        self.slots[index] = None;
        if self.slots.iter().all(|slot| slot.is_none()) {
            self.slots.clear();
            self.active = None;
        }
    }

    /// Close every tab, highest index first so each intermediate focus
    /// reassignment sees a well-formed list.
    pub fn close_all(&mut self) {
        for index in (0..self.slots.len()).rev() {
            self.close(index);
        }
    }

    fn last_live(&self) -> Option<usize> {
        (0..self.slots.len()).rev().find(|&i| self.get(i).is_some())
    }

    fn push_tab(&mut self, html: &str, term: &str, has_audio: bool) -> usize {
        let index = self.slots.len();
        self.slots.push(Some(Tab::new(term, html, has_audio)));
        self.active = Some(index);
        index
    }

    fn evict_placeholder(&mut self) {
        if self.live_count() != 1 {
            return;
        }
        let placeholder = self
            .iter()
            .find(|(_, tab)| tab.label == PLACEHOLDER_LABEL)
            .map(|(index, _)| index);
        if let Some(index) = placeholder {
            self.close(index);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with(labels: &[&str]) -> TabSession {
        let mut session = TabSession::new();
        for label in labels {
            session.open_result("<p>content</p>", label, false, false);
        }
        session
    }

    fn assert_single_active(session: &TabSession) {
        let live: Vec<usize> = session.iter().map(|(i, _)| i).collect();
        let active = session.active();
        if live.is_empty() {
            assert_eq!(active, None);
        } else {
            assert!(active.is_some_and(|i| live.contains(&i)));
        }
    }

    #[test]
    fn test_open_multi_tab_appends_and_focuses() {
        let session = session_with(&["犬", "猫"]);
        assert_eq!(session.live_count(), 2);
        assert_eq!(session.active(), Some(1));
        assert_eq!(session.get(0).unwrap().label, "犬");
        assert_single_active(&session);
    }

    #[test]
    fn test_open_single_tab_replaces_in_place() {
        let mut session = session_with(&["犬"]);
        session.save_scroll(0, 120.0);
        let index = session.open_result("<p>new</p>", "猫", true, false);
        assert_eq!(index, 0);
        assert_eq!(session.live_count(), 1);
        let tab = session.get(0).unwrap();
        assert_eq!(tab.label, "猫");
        assert_eq!(tab.content, "<p>new</p>");
        assert_eq!(tab.scroll, 0.0);
    }

    #[test]
    fn test_open_single_tab_creates_first_tab() {
        let mut session = TabSession::new();
        let index = session.open_result("<p>hi</p>", "犬", true, false);
        assert_eq!(index, 0);
        assert_eq!(session.active(), Some(0));
    }

    #[test]
    fn test_multi_tab_evicts_lone_placeholder() {
        let mut session = TabSession::new();
        session.open_result("<p>welcome</p>", PLACEHOLDER_LABEL, true, false);
        session.open_result("<p>def</p>", "犬", false, false);
        assert_eq!(session.live_count(), 1);
        assert_eq!(session.get(session.active().unwrap()).unwrap().label, "犬");
    }

    #[test]
    fn test_placeholder_kept_when_not_alone() {
        let mut session = TabSession::new();
        session.open_result("<p>welcome</p>", PLACEHOLDER_LABEL, true, false);
        session.open_result("<p>a</p>", "犬", false, false);
        session.open_result("<p>b</p>", "猫", false, false);
        // only a *lone* placeholder is evicted; "犬" is no placeholder
        assert_eq!(session.live_count(), 2);
    }

    #[test]
    fn test_focus_restores_exactly_one_active() {
        let mut session = session_with(&["a", "b", "c"]);
        assert!(session.focus(0));
        assert_eq!(session.active(), Some(0));
        assert_single_active(&session);
    }

    #[test]
    fn test_focus_dead_index_is_noop() {
        let mut session = session_with(&["a", "b"]);
        session.close(0);
        assert!(!session.focus(0));
        assert!(!session.focus(99));
        assert_eq!(session.active(), Some(1));
    }

    #[test]
    fn test_close_active_prefers_lower_index() {
        let mut session = session_with(&["a", "b", "c"]);
        session.focus(1);
        session.close(1);
        assert_eq!(session.active(), Some(0));
        assert_single_active(&session);
    }

    #[test]
    fn test_close_active_falls_back_to_higher_index() {
        let mut session = session_with(&["a", "b", "c"]);
        session.focus(0);
        session.close(0);
        assert_eq!(session.active(), Some(1));
    }

    #[test]
    fn test_close_skips_holes_when_reassigning() {
        let mut session = session_with(&["a", "b", "c", "d"]);
        session.close(2);
        session.focus(3);
        session.close(3);
        // slot 2 is a hole, so focus lands on 1
        assert_eq!(session.active(), Some(1));
    }

    #[test]
    fn test_close_non_active_keeps_focus() {
        let mut session = session_with(&["a", "b", "c"]);
        session.close(0);
        assert_eq!(session.active(), Some(2));
    }

    #[test]
    fn test_indices_stay_stable_after_close() {
        let mut session = session_with(&["a", "b", "c"]);
        session.close(1);
        assert_eq!(session.len(), 3);
        assert_eq!(session.get(2).unwrap().label, "c");
        assert!(session.get(1).is_none());
    }

    #[test]
    fn test_empty_list_resets_slots() {
        let mut session = session_with(&["a", "b"]);
        session.close(0);
        session.close(1);
        assert_eq!(session.len(), 0);
        assert_eq!(session.active(), None);
        assert!(session.is_empty());
    }

    #[test]
    fn test_close_all_empties_without_panicking() {
        let mut session = session_with(&["a", "b", "c", "d", "e"]);
        session.close(2);
        session.close_all();
        assert!(session.is_empty());
        assert_eq!(session.active(), None);
    }

    #[test]
    fn test_close_out_of_range_is_noop() {
        let mut session = session_with(&["a"]);
        session.close(42);
        assert_eq!(session.live_count(), 1);
    }

    #[test]
    fn test_scroll_saved_and_kept_across_focus() {
        let mut session = session_with(&["a", "b"]);
        session.save_scroll(0, 250.5);
        session.focus(0);
        assert_eq!(session.get(0).unwrap().scroll, 250.5);
    }

    #[test]
    fn test_append_content_extends_pane_in_place() {
        let mut session = session_with(&["a"]);
        let revision = session.revision();
        session.append_content(0, "<div>extra</div>");
        assert!(session.get(0).unwrap().content.ends_with("<div>extra</div>"));
        assert_eq!(session.revision(), revision);
        session.append_content(7, "<div>ignored</div>");
    }

    #[test]
    fn test_revision_bumps_on_open_only() {
        let mut session = TabSession::new();
        let before = session.revision();
        session.open_result("<p>a</p>", "a", false, false);
        assert!(session.revision() > before);
        let opened = session.revision();
        session.focus(0);
        session.save_scroll(0, 10.0);
        assert_eq!(session.revision(), opened);
    }
}
