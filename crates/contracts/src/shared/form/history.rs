use std::collections::VecDeque;

use super::Values;

/// Linear undo/redo stack of full value snapshots, capped at `capacity`
/// entries; the oldest snapshot goes first.
#[derive(Debug, Clone)]
pub struct History {
    snapshots: VecDeque<Values>,
    pointer: usize,
    capacity: usize,
}

impl History {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            snapshots: VecDeque::new(),
            pointer: 0,
            capacity: capacity.max(1),
        }
    }

    /// Drops everything and records `root` as the only snapshot.
    pub fn reset(&mut self, root: Values) {
        self.snapshots.clear();
        self.snapshots.push_back(root);
        self.pointer = 0;
    }

    /// Records a new snapshot after the current one; any redo branch is lost.
    pub fn push(&mut self, snapshot: Values) {
        if !self.snapshots.is_empty() {
            self.snapshots.truncate(self.pointer + 1);
        }
        self.snapshots.push_back(snapshot);
        while self.snapshots.len() > self.capacity {
            self.snapshots.pop_front();
        }
        self.pointer = self.snapshots.len() - 1;
    }

    pub fn undo(&mut self) -> Option<&Values> {
        if !self.can_undo() {
            return None;
        }
        self.pointer -= 1;
        self.snapshots.get(self.pointer)
    }

    pub fn redo(&mut self) -> Option<&Values> {
        if !self.can_redo() {
            return None;
        }
        self.pointer += 1;
        self.snapshots.get(self.pointer)
    }

    pub fn can_undo(&self) -> bool {
        self.pointer > 0
    }

    pub fn can_redo(&self) -> bool {
        self.pointer + 1 < self.snapshots.len()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snap(n: i64) -> Values {
        let mut v = Values::new();
        v.insert("n".into(), json!(n));
        v
    }

    #[test]
    fn test_undo_redo_boundaries() {
        let mut history = History::with_capacity(10);
        history.reset(snap(0));
        assert!(history.undo().is_none());
        history.push(snap(1));
        history.push(snap(2));
        assert_eq!(history.undo(), Some(&snap(1)));
        assert_eq!(history.undo(), Some(&snap(0)));
        assert!(history.undo().is_none());
        assert_eq!(history.redo(), Some(&snap(1)));
        assert_eq!(history.redo(), Some(&snap(2)));
        assert!(history.redo().is_none());
    }

    #[test]
    fn test_push_discards_redo_branch() {
        let mut history = History::with_capacity(10);
        history.reset(snap(0));
        history.push(snap(1));
        history.undo();
        history.push(snap(5));
        assert!(!history.can_redo());
        assert_eq!(history.len(), 2);
        assert_eq!(history.undo(), Some(&snap(0)));
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut history = History::with_capacity(3);
        history.reset(snap(0));
        for n in 1..=4 {
            history.push(snap(n));
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.undo(), Some(&snap(3)));
        assert_eq!(history.undo(), Some(&snap(2)));
        assert!(history.undo().is_none());
    }
}
