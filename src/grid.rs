use serde::{Deserialize, Serialize};

use crate::messages::{HostChannel, OutboundMessage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragEnterDirection {
    Left,
    Right,
    Top,
    Bottom,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionInfo {
    pub revision: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridColumn {
    pub revision: String,
    pub group: Option<String>,
    pub pinned: bool,
}

impl GridColumn {
    pub fn display_name(&self) -> String {
        match &self.group {
            Some(group) => format!("{} [{group}]", self.revision),
            None => self.revision.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropTarget {
    pub id: String,
    pub direction: DragEnterDirection,
}

/// Column pin state and row/column ordering for the comparison view. Every
/// committed reorder is pushed to the host channel as a full order of the
/// underlying revision or row ids, never of view indices.
#[derive(Debug, Default)]
pub struct ComparisonGrid {
    columns: Vec<GridColumn>,
    rows: Vec<String>,
    dragged_id: Option<String>,
    drop_target: Option<DropTarget>,
}

impl ComparisonGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn columns(&self) -> &[GridColumn] {
        &self.columns
    }

    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    pub fn column_order(&self) -> Vec<String> {
        self.columns
            .iter()
            .map(|column| column.revision.clone())
            .collect()
    }

    /// Reconciles the column list against the currently selected revisions.
    /// Vanished revisions drop out, new ones append after all existing
    /// columns. Never emits a message on its own.
    pub fn sync_columns(&mut self, revisions: &[RevisionInfo]) {
        self.columns
            .retain(|column| revisions.iter().any(|info| info.revision == column.revision));
        for info in revisions {
            if self
                .columns
                .iter()
                .any(|column| column.revision == info.revision)
            {
                continue;
            }
            self.columns.push(GridColumn {
                revision: info.revision.clone(),
                group: info.group.clone(),
                pinned: false,
            });
        }
    }

    pub fn set_rows(&mut self, rows: Vec<String>) {
        self.rows = rows;
    }

    /// At most one column is pinned. Pinning replaces any existing pin and
    /// moves the column to the front; unpinning leaves it in place.
    pub fn toggle_pin(&mut self, revision: &str, channel: &dyn HostChannel) {
        let Some(position) = self
            .columns
            .iter()
            .position(|column| column.revision == revision)
        else {
            return;
        };

        if self.columns[position].pinned {
            self.columns[position].pinned = false;
        } else {
            for column in &mut self.columns {
                column.pinned = false;
            }
            let mut column = self.columns.remove(position);
            column.pinned = true;
            self.columns.insert(0, column);
        }

        channel.post(OutboundMessage::ReorderPlotsComparison(self.column_order()));
    }

    pub fn drag_start(&mut self, id: &str) {
        self.dragged_id = Some(id.to_string());
    }

    pub fn drag_end(&mut self) {
        self.dragged_id = None;
        self.drop_target = None;
    }

    pub fn dragged_id(&self) -> Option<&str> {
        self.dragged_id.as_deref()
    }

    pub fn drop_target(&self) -> Option<&DropTarget> {
        self.drop_target.as_ref()
    }

    /// Updates the transient drop placeholder. The dragged column itself and
    /// any pinned column never show one.
    pub fn drag_enter(&mut self, target_id: &str, direction: DragEnterDirection) {
        let over_self = self.dragged_id.as_deref() == Some(target_id);
        let over_pinned = self
            .columns
            .iter()
            .any(|column| column.revision == target_id && column.pinned);

        self.drop_target = if over_self || over_pinned {
            None
        } else {
            Some(DropTarget {
                id: format!("{target_id}__drop"),
                direction,
            })
        };
    }

    pub fn drop_column(
        &mut self,
        target_id: &str,
        direction: DragEnterDirection,
        channel: &dyn HostChannel,
    ) -> bool {
        let Some(dragged_id) = self.dragged_id.clone() else {
            return false;
        };
        if dragged_id == target_id {
            self.drag_end();
            return false;
        }

        let dragged = self
            .columns
            .iter()
            .position(|column| column.revision == dragged_id);
        let target = self
            .columns
            .iter()
            .position(|column| column.revision == target_id);
        let (Some(dragged), Some(target)) = (dragged, target) else {
            self.drag_end();
            return false;
        };
        if self.columns[dragged].pinned || self.columns[target].pinned {
            self.drag_end();
            return false;
        }

        let before = self.column_order();
        let column = self.columns.remove(dragged);
        let mut insert_at = match self
            .columns
            .iter()
            .position(|candidate| candidate.revision == target_id)
        {
            Some(position) => position,
            None => {
                self.columns.insert(dragged, column);
                self.drag_end();
                return false;
            }
        };
        if direction == DragEnterDirection::Right {
            insert_at += 1;
        }
        self.columns.insert(insert_at, column);

        let changed = self.column_order() != before;
        if changed {
            channel.post(OutboundMessage::ReorderPlotsComparison(self.column_order()));
        }
        self.drag_end();
        changed
    }

    /// Directional row drop: top half inserts before the target, bottom half
    /// after. Adjacent no-op directions emit nothing.
    pub fn drop_row(
        &mut self,
        dragged_id: &str,
        target_id: &str,
        direction: DragEnterDirection,
        channel: &dyn HostChannel,
    ) -> bool {
        if dragged_id == target_id {
            return false;
        }
        let dragged = self.rows.iter().position(|row| row == dragged_id);
        let target = self.rows.iter().position(|row| row == target_id);
        let (Some(dragged), Some(_)) = (dragged, target) else {
            return false;
        };

        let before = self.rows.clone();
        let row = self.rows.remove(dragged);
        let Some(mut insert_at) = self.rows.iter().position(|candidate| candidate == target_id)
        else {
            self.rows.insert(dragged, row);
            return false;
        };
        if direction == DragEnterDirection::Bottom {
            insert_at += 1;
        }
        self.rows.insert(insert_at, row);

        let changed = self.rows != before;
        if changed {
            channel.post(OutboundMessage::ReorderPlotsComparisonRows(
                self.rows.clone(),
            ));
        }
        changed
    }

    pub fn refresh_revision(&self, revision: &str, channel: &dyn HostChannel) {
        channel.post(OutboundMessage::RefreshRevision(revision.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingChannel {
        messages: RefCell<Vec<OutboundMessage>>,
    }

    impl HostChannel for RecordingChannel {
        fn post(&self, message: OutboundMessage) {
            self.messages.borrow_mut().push(message);
        }
    }

    impl RecordingChannel {
        fn take(&self) -> Vec<OutboundMessage> {
            self.messages.borrow_mut().drain(..).collect()
        }
    }

    fn revisions(ids: &[&str]) -> Vec<RevisionInfo> {
        ids.iter()
            .map(|id| RevisionInfo {
                revision: id.to_string(),
                group: None,
            })
            .collect()
    }

    fn grid_with(ids: &[&str]) -> ComparisonGrid {
        let mut grid = ComparisonGrid::new();
        grid.sync_columns(&revisions(ids));
        grid
    }

    #[test]
    fn pinning_moves_the_column_to_the_front() {
        let channel = RecordingChannel::default();
        let mut grid = grid_with(&["main", "exp-1", "exp-2"]);

        grid.toggle_pin("exp-1", &channel);

        assert_eq!(grid.column_order(), vec!["exp-1", "main", "exp-2"]);
        assert!(grid.columns()[0].pinned);
        assert_eq!(
            channel.take(),
            vec![OutboundMessage::ReorderPlotsComparison(vec![
                "exp-1".to_string(),
                "main".to_string(),
                "exp-2".to_string(),
            ])]
        );
    }

    #[test]
    fn pinning_a_second_column_replaces_the_first_pin() {
        let channel = RecordingChannel::default();
        let mut grid = grid_with(&["main", "exp-1", "exp-2"]);

        grid.toggle_pin("exp-1", &channel);
        grid.toggle_pin("exp-2", &channel);

        assert_eq!(grid.column_order(), vec!["exp-2", "exp-1", "main"]);
        let pinned = grid
            .columns()
            .iter()
            .filter(|column| column.pinned)
            .map(|column| column.revision.clone())
            .collect::<Vec<_>>();
        assert_eq!(pinned, vec!["exp-2"]);
    }

    #[test]
    fn unpinning_keeps_position_and_still_emits() {
        let channel = RecordingChannel::default();
        let mut grid = grid_with(&["main", "exp-1"]);

        grid.toggle_pin("exp-1", &channel);
        channel.take();
        grid.toggle_pin("exp-1", &channel);

        assert_eq!(grid.column_order(), vec!["exp-1", "main"]);
        assert!(grid.columns().iter().all(|column| !column.pinned));
        assert_eq!(channel.take().len(), 1);
    }

    #[test]
    fn pin_toggle_on_unknown_revision_is_silent() {
        let channel = RecordingChannel::default();
        let mut grid = grid_with(&["main"]);
        grid.toggle_pin("gone", &channel);
        assert!(channel.take().is_empty());
    }

    #[test]
    fn column_drop_reorders_before_or_after_the_target() {
        let channel = RecordingChannel::default();
        let mut grid = grid_with(&["a", "b", "c", "d", "e"]);

        grid.drag_start("d");
        assert!(grid.drop_column("b", DragEnterDirection::Left, &channel));

        assert_eq!(grid.column_order(), vec!["a", "d", "b", "c", "e"]);
        assert_eq!(
            channel.take(),
            vec![OutboundMessage::ReorderPlotsComparison(vec![
                "a".to_string(),
                "d".to_string(),
                "b".to_string(),
                "c".to_string(),
                "e".to_string(),
            ])]
        );
        assert_eq!(grid.dragged_id(), None);
    }

    #[test]
    fn dropping_a_column_on_itself_is_silent() {
        let channel = RecordingChannel::default();
        let mut grid = grid_with(&["a", "b"]);

        grid.drag_start("a");
        assert!(!grid.drop_column("a", DragEnterDirection::Right, &channel));
        assert_eq!(grid.column_order(), vec!["a", "b"]);
        assert!(channel.take().is_empty());
    }

    #[test]
    fn pinned_columns_never_participate_in_drops() {
        let channel = RecordingChannel::default();
        let mut grid = grid_with(&["a", "b", "c"]);
        grid.toggle_pin("a", &channel);
        channel.take();

        grid.drag_start("b");
        assert!(!grid.drop_column("a", DragEnterDirection::Right, &channel));
        assert!(channel.take().is_empty());

        grid.drag_start("a");
        assert!(!grid.drop_column("c", DragEnterDirection::Left, &channel));
        assert_eq!(grid.column_order(), vec!["a", "b", "c"]);
        assert!(channel.take().is_empty());
    }

    #[test]
    fn drag_enter_places_a_placeholder_except_on_self_or_pinned() {
        let channel = RecordingChannel::default();
        let mut grid = grid_with(&["a", "b", "c"]);
        grid.toggle_pin("a", &channel);

        grid.drag_start("b");
        grid.drag_enter("c", DragEnterDirection::Right);
        assert_eq!(
            grid.drop_target(),
            Some(&DropTarget {
                id: "c__drop".to_string(),
                direction: DragEnterDirection::Right,
            })
        );

        grid.drag_enter("b", DragEnterDirection::Left);
        assert_eq!(grid.drop_target(), None);

        grid.drag_enter("a", DragEnterDirection::Left);
        assert_eq!(grid.drop_target(), None);

        grid.drag_end();
        assert_eq!(grid.drop_target(), None);
    }

    #[test]
    fn row_drops_follow_the_directional_contract() {
        let cases = [
            ("r2", "r1", DragEnterDirection::Top, Some(vec!["r2", "r1"])),
            ("r2", "r1", DragEnterDirection::Bottom, None),
            ("r1", "r2", DragEnterDirection::Bottom, Some(vec!["r2", "r1"])),
            ("r1", "r2", DragEnterDirection::Top, None),
        ];

        for (dragged, target, direction, expected) in cases {
            let channel = RecordingChannel::default();
            let mut grid = ComparisonGrid::new();
            grid.set_rows(vec!["r1".to_string(), "r2".to_string()]);

            let changed = grid.drop_row(dragged, target, direction, &channel);
            match expected {
                Some(order) => {
                    assert!(changed);
                    assert_eq!(grid.rows(), order.as_slice());
                    assert_eq!(
                        channel.take(),
                        vec![OutboundMessage::ReorderPlotsComparisonRows(
                            order.iter().map(|row| row.to_string()).collect(),
                        )]
                    );
                }
                None => {
                    assert!(!changed);
                    assert_eq!(grid.rows(), ["r1", "r2"]);
                    assert!(channel.take().is_empty());
                }
            }
        }
    }

    #[test]
    fn sync_appends_new_revisions_and_drops_vanished_ones() {
        let channel = RecordingChannel::default();
        let mut grid = grid_with(&["main", "exp-1", "exp-2"]);
        grid.toggle_pin("exp-2", &channel);
        channel.take();

        grid.sync_columns(&revisions(&["main", "exp-2", "exp-3"]));

        assert_eq!(grid.column_order(), vec!["exp-2", "main", "exp-3"]);
        assert!(grid.columns()[0].pinned);
        assert!(channel.take().is_empty());
    }

    #[test]
    fn refresh_revision_posts_the_revision_id() {
        let channel = RecordingChannel::default();
        let grid = ComparisonGrid::new();
        grid.refresh_revision("exp-1", &channel);
        assert_eq!(
            channel.take(),
            vec![OutboundMessage::RefreshRevision("exp-1".to_string())]
        );
    }

    #[test]
    fn display_name_carries_the_group_suffix() {
        let column = GridColumn {
            revision: "main".to_string(),
            group: Some("workspace".to_string()),
            pinned: false,
        };
        assert_eq!(column.display_name(), "main [workspace]");
        let plain = GridColumn {
            revision: "main".to_string(),
            group: None,
            pinned: false,
        };
        assert_eq!(plain.display_name(), "main");
    }
}
