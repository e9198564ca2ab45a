use std::sync::Mutex;

use shared::domain::StageId;

use crate::{lock, NodeSelectionActions};

#[derive(Default)]
pub struct CanvasSelection {
    selected: Mutex<Option<StageId>>,
}

impl CanvasSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&self, stage_id: StageId) {
        *lock(&self.selected) = Some(stage_id);
    }

    pub fn selected(&self) -> Option<StageId> {
        *lock(&self.selected)
    }
}

impl NodeSelectionActions for CanvasSelection {
    fn reset_selected_node(&self) {
        if let Some(stage_id) = lock(&self.selected).take() {
            tracing::debug!(stage_id = stage_id.0, "cleared canvas selection");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_clears_selected_stage() {
        let selection = CanvasSelection::new();
        selection.select(StageId(4));
        assert_eq!(selection.selected(), Some(StageId(4)));

        selection.reset_selected_node();
        assert_eq!(selection.selected(), None);

        selection.reset_selected_node();
        assert_eq!(selection.selected(), None);
    }
}
