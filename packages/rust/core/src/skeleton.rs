//! The article outline: an ordered, duplicate-free list of block ids.

use contentsynth_shared::InsightBlock;

/// Ordered references (by id) to curated insight blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Skeleton {
    ids: Vec<String>,
}

impl Skeleton {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `id` unless it is already present. Returns whether it was added.
    pub fn add(&mut self, id: &str) -> bool {
        if self.contains(id) {
            return false;
        }
        self.ids.push(id.to_string());
        true
    }

    /// Remove `id`. Returns whether anything was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.ids.len();
        self.ids.retain(|existing| existing != id);
        self.ids.len() != before
    }

    /// Move the entry at `from` so it ends up at index `to`.
    ///
    /// No-op when either index is absent or out of range, or when they are
    /// equal. Every other entry keeps its relative order.
    pub fn reorder(&mut self, from: Option<usize>, to: Option<usize>) -> bool {
        let (Some(from), Some(to)) = (from, to) else {
            return false;
        };
        if from == to || from >= self.ids.len() || to >= self.ids.len() {
            return false;
        }
        let moved = self.ids.remove(from);
        self.ids.insert(to, moved);
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|existing| existing == id)
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Resolve ids against `insights`, in skeleton order.
    pub fn resolve<'a>(&self, insights: &'a [InsightBlock]) -> Vec<&'a InsightBlock> {
        self.ids
            .iter()
            .filter_map(|id| insights.iter().find(|b| &b.id == id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skeleton(ids: &[&str]) -> Skeleton {
        let mut s = Skeleton::new();
        for id in ids {
            s.add(id);
        }
        s
    }

    #[test]
    fn adding_twice_keeps_length() {
        let mut s = skeleton(&["a"]);
        assert!(!s.add("a"));
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn removing_non_member_is_noop() {
        let mut s = skeleton(&["a", "b"]);
        assert!(!s.remove("zzz"));
        assert_eq!(s.ids(), ["a", "b"]);
    }

    #[test]
    fn reorder_same_index_is_noop() {
        let mut s = skeleton(&["a", "b", "c"]);
        for i in 0..3 {
            assert!(!s.reorder(Some(i), Some(i)));
        }
        assert_eq!(s.ids(), ["a", "b", "c"]);
    }

    #[test]
    fn reorder_first_to_end_preserves_rest() {
        let mut s = skeleton(&["a", "b", "c", "d"]);
        assert!(s.reorder(Some(0), Some(3)));
        assert_eq!(s.ids(), ["b", "c", "d", "a"]);
    }

    #[test]
    fn reorder_moves_backwards() {
        let mut s = skeleton(&["a", "b", "c", "d"]);
        assert!(s.reorder(Some(3), Some(1)));
        assert_eq!(s.ids(), ["a", "d", "b", "c"]);
    }

    #[test]
    fn reorder_with_missing_or_bad_index_is_noop() {
        let mut s = skeleton(&["a", "b"]);
        assert!(!s.reorder(None, Some(1)));
        assert!(!s.reorder(Some(0), None));
        assert!(!s.reorder(Some(0), Some(5)));
        assert_eq!(s.ids(), ["a", "b"]);
    }

    #[test]
    fn resolve_follows_skeleton_order() {
        let block = |id: &str| InsightBlock {
            id: id.into(),
            kind: "Result".into(),
            content: String::new(),
            summary: String::new(),
            tags: vec![],
            confidence_score: 1.0,
        };
        let insights = vec![block("x"), block("y"), block("z")];
        let s = skeleton(&["z", "x"]);
        let ids: Vec<_> = s.resolve(&insights).iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, ["z", "x"]);
    }
}
