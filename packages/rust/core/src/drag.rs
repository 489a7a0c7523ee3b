//! Drag-and-drop bookkeeping for the insights screen.
//!
//! Two gestures exist: dragging an insight block onto the skeleton (adds it)
//! and dragging a skeleton item onto another position (reorders). This type
//! only tracks what is being dragged and where; the session applies drops.

/// In-flight drag gesture state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DragState {
    dragged_block: Option<String>,
    over_skeleton: bool,
    dragged_index: Option<usize>,
    drop_target: Option<usize>,
}

impl DragState {
    /// Begin dragging the insight block `id`.
    pub fn start_block(&mut self, id: &str) {
        self.dragged_block = Some(id.to_string());
    }

    /// Abandon a block drag.
    pub fn end_block(&mut self) {
        self.dragged_block = None;
        self.over_skeleton = false;
    }

    pub fn enter_skeleton(&mut self) {
        self.over_skeleton = true;
    }

    pub fn leave_skeleton(&mut self) {
        self.over_skeleton = false;
    }

    /// Finish a block drag, returning the block to add, if any.
    pub fn take_block(&mut self) -> Option<String> {
        self.over_skeleton = false;
        self.dragged_block.take()
    }

    /// Begin dragging the skeleton item at `index`.
    pub fn start_item(&mut self, index: usize) {
        self.dragged_index = Some(index);
    }

    /// Mark `index` as the current drop target.
    pub fn item_over(&mut self, index: usize) {
        self.drop_target = Some(index);
    }

    /// Abandon an item drag.
    pub fn end_item(&mut self) {
        self.dragged_index = None;
        self.drop_target = None;
    }

    /// Finish an item drag, returning `(from, to)`.
    pub fn take_item_move(&mut self) -> (Option<usize>, Option<usize>) {
        let indices = (self.dragged_index, self.drop_target);
        self.end_item();
        indices
    }

    pub fn dragged_block(&self) -> Option<&str> {
        self.dragged_block.as_deref()
    }

    pub fn is_over_skeleton(&self) -> bool {
        self.over_skeleton
    }

    pub fn dragged_index(&self) -> Option<usize> {
        self.dragged_index
    }

    pub fn drop_target(&self) -> Option<usize> {
        self.drop_target
    }

    /// Whether `index` should be highlighted as the insertion point.
    pub fn is_drop_target(&self, index: usize) -> bool {
        self.drop_target == Some(index) && self.dragged_index != Some(index)
    }

    pub fn is_active(&self) -> bool {
        self.dragged_block.is_some() || self.dragged_index.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_drag_yields_block_once() {
        let mut drag = DragState::default();
        drag.start_block("b1");
        drag.enter_skeleton();
        assert!(drag.is_over_skeleton());
        assert_eq!(drag.take_block().as_deref(), Some("b1"));
        assert_eq!(drag.take_block(), None);
        assert!(!drag.is_over_skeleton());
    }

    #[test]
    fn item_drag_reports_indices_and_clears() {
        let mut drag = DragState::default();
        drag.start_item(2);
        drag.item_over(0);
        assert!(drag.is_drop_target(0));
        assert!(!drag.is_drop_target(2));
        assert_eq!(drag.take_item_move(), (Some(2), Some(0)));
        assert!(!drag.is_active());
    }

    #[test]
    fn dragged_item_is_not_its_own_target() {
        let mut drag = DragState::default();
        drag.start_item(1);
        drag.item_over(1);
        assert!(!drag.is_drop_target(1));
    }
}
