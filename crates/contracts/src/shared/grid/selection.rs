use std::collections::HashSet;

use crate::shared::record::RecordKey;

/// Header checkbox state for the current view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    None,
    Some,
    All,
}

/// Selected record keys, always a subset of the visible keys it was last
/// reconciled with
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    keys: HashSet<RecordKey>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &RecordKey) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> &HashSet<RecordKey> {
        &self.keys
    }

    /// Adds `keys` that are visible; the rest are ignored.
    pub fn select<'a>(
        &mut self,
        keys: impl IntoIterator<Item = &'a RecordKey>,
        visible: &HashSet<&RecordKey>,
    ) {
        self.keys.extend(
            keys.into_iter()
                .filter(|key| visible.contains(key))
                .cloned(),
        );
    }

    pub fn deselect(&mut self, key: &RecordKey) {
        self.keys.remove(key);
    }

    pub fn select_all<'a>(&mut self, visible: impl IntoIterator<Item = &'a RecordKey>) {
        self.keys = visible.into_iter().cloned().collect();
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    /// Selects every visible key that was not selected and vice versa.
    pub fn invert<'a>(&mut self, visible: impl IntoIterator<Item = &'a RecordKey>) {
        let inverted = visible
            .into_iter()
            .filter(|key| !self.keys.contains(*key))
            .cloned()
            .collect();
        self.keys = inverted;
    }

    /// Drops keys that are no longer visible.
    pub fn retain_visible(&mut self, visible: &HashSet<&RecordKey>) {
        self.keys.retain(|key| visible.contains(key));
    }

    pub fn state(&self, visible_count: usize) -> SelectionState {
        if self.keys.is_empty() || visible_count == 0 {
            SelectionState::None
        } else if self.keys.len() >= visible_count {
            SelectionState::All
        } else {
            SelectionState::Some
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(raw: &[&str]) -> Vec<RecordKey> {
        raw.iter().map(|k| RecordKey::from(*k)).collect()
    }

    #[test]
    fn test_select_ignores_invisible_keys() {
        let visible_keys = keys(&["a", "b"]);
        let visible: HashSet<&RecordKey> = visible_keys.iter().collect();
        let mut selection = Selection::new();
        selection.select(&keys(&["a", "z"]), &visible);
        assert_eq!(selection.len(), 1);
        assert!(selection.contains(&RecordKey::from("a")));
    }

    #[test]
    fn test_invert_and_state() {
        let visible_keys = keys(&["a", "b", "c"]);
        let visible: HashSet<&RecordKey> = visible_keys.iter().collect();
        let mut selection = Selection::new();
        selection.select(&keys(&["a"]), &visible);
        assert_eq!(selection.state(3), SelectionState::Some);
        selection.invert(&visible_keys);
        assert!(!selection.contains(&RecordKey::from("a")));
        assert_eq!(selection.len(), 2);
        selection.select_all(&visible_keys);
        assert_eq!(selection.state(3), SelectionState::All);
        selection.clear();
        assert_eq!(selection.state(3), SelectionState::None);
    }

    #[test]
    fn test_retain_visible() {
        let all = keys(&["a", "b", "c"]);
        let mut selection = Selection::new();
        selection.select_all(&all);
        let narrowed = keys(&["b"]);
        selection.retain_visible(&narrowed.iter().collect());
        assert_eq!(selection.len(), 1);
        assert!(selection.contains(&RecordKey::from("b")));
    }
}
