use tracing::debug;

use crate::model::{Point, SelectionRect};

/// Both sides of a drag must exceed this many natural units to commit.
pub const MIN_SELECTION_SIZE: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SelectionState {
    #[default]
    Idle,
    Dragging {
        anchor: Point,
        candidate: SelectionRect,
    },
    Committed(SelectionRect),
}

/// Change of the reported selection, delivered to the single observer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionChange {
    Committed(SelectionRect),
    Cleared,
}

impl SelectionChange {
    pub fn selection(self) -> Option<SelectionRect> {
        match self {
            Self::Committed(rect) => Some(rect),
            Self::Cleared => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SelectionController {
    state: SelectionState,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, SelectionState::Dragging { .. })
    }

    /// The committed selection, if any.
    pub fn selection(&self) -> Option<SelectionRect> {
        match self.state {
            SelectionState::Committed(rect) => Some(rect),
            _ => None,
        }
    }

    /// The rectangle to draw: the in-progress candidate or the committed selection.
    pub fn visible_rect(&self) -> Option<SelectionRect> {
        match self.state {
            SelectionState::Idle => None,
            SelectionState::Dragging { candidate, .. } => Some(candidate),
            SelectionState::Committed(rect) => Some(rect),
        }
    }

    pub fn begin(&mut self, anchor: Point) -> Option<SelectionChange> {
        let had_selection = self.selection().is_some();
        self.state = SelectionState::Dragging {
            anchor,
            candidate: SelectionRect::at(anchor),
        };
        had_selection.then_some(SelectionChange::Cleared)
    }

    pub fn update(&mut self, current: Point) {
        if let SelectionState::Dragging { anchor, candidate } = &mut self.state {
            *candidate = SelectionRect::spanning(*anchor, current);
        }
    }

    pub fn finish(&mut self) -> Option<SelectionChange> {
        let SelectionState::Dragging { candidate, .. } = self.state else {
            return None;
        };

        if candidate.width > MIN_SELECTION_SIZE && candidate.height > MIN_SELECTION_SIZE {
            debug!(
                x = candidate.x,
                y = candidate.y,
                width = candidate.width,
                height = candidate.height,
                "selection committed"
            );
            self.state = SelectionState::Committed(candidate);
            Some(SelectionChange::Committed(candidate))
        } else {
            // A drag never has a reported selection.
            self.state = SelectionState::Idle;
            None
        }
    }

    /// Pointer left the surface mid-gesture; same rules as `finish`.
    pub fn abort(&mut self) -> Option<SelectionChange> {
        self.finish()
    }

    pub fn clear(&mut self) -> Option<SelectionChange> {
        let previous = std::mem::take(&mut self.state);
        match previous {
            SelectionState::Idle | SelectionState::Dragging { .. } => None,
            SelectionState::Committed(_) => Some(SelectionChange::Cleared),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{SelectionChange, SelectionController, SelectionState};
    use crate::model::{Point, SelectionRect};

    fn drag(controller: &mut SelectionController, from: Point, to: Point) -> Option<SelectionChange> {
        controller.begin(from);
        controller.update(to);
        controller.finish()
    }

    #[test]
    fn drag_commits_regardless_of_direction() {
        let expected = SelectionRect::new(100.0, 100.0, 200.0, 150.0).expect("rect");

        let mut forward = SelectionController::new();
        let change = drag(&mut forward, Point::new(100.0, 100.0), Point::new(300.0, 250.0));
        assert_eq!(change, Some(SelectionChange::Committed(expected)));

        let mut backward = SelectionController::new();
        let change = drag(&mut backward, Point::new(300.0, 250.0), Point::new(100.0, 100.0));
        assert_eq!(change, Some(SelectionChange::Committed(expected)));
        assert_eq!(backward.selection(), Some(expected));
    }

    #[test]
    fn small_drags_are_discarded() {
        let cases = [
            (Point::new(10.0, 10.0), Point::new(15.0, 100.0)),
            (Point::new(10.0, 10.0), Point::new(100.0, 15.0)),
            (Point::new(10.0, 10.0), Point::new(10.0, 10.0)),
        ];
        for (from, to) in cases {
            let mut controller = SelectionController::new();
            assert_eq!(drag(&mut controller, from, to), None);
            assert_eq!(controller.state(), SelectionState::Idle);
            assert!(controller.selection().is_none());
        }
    }

    #[test]
    fn candidate_tracks_pointer_while_dragging() {
        let mut controller = SelectionController::new();
        controller.begin(Point::new(50.0, 50.0));
        assert_eq!(
            controller.visible_rect(),
            Some(SelectionRect::at(Point::new(50.0, 50.0)))
        );
        controller.update(Point::new(20.0, 80.0));
        let rect = controller.visible_rect().expect("candidate");
        assert_eq!((rect.x, rect.y, rect.width, rect.height), (20.0, 50.0, 30.0, 30.0));
        assert!(controller.selection().is_none());
    }

    #[test]
    fn abort_applies_threshold() {
        let mut controller = SelectionController::new();
        controller.begin(Point::new(0.0, 0.0));
        controller.update(Point::new(40.0, 40.0));
        assert!(matches!(controller.abort(), Some(SelectionChange::Committed(_))));
    }

    #[test]
    fn new_drag_clears_committed_selection() {
        let mut controller = SelectionController::new();
        drag(&mut controller, Point::new(0.0, 0.0), Point::new(50.0, 50.0));
        assert_eq!(
            controller.begin(Point::new(5.0, 5.0)),
            Some(SelectionChange::Cleared)
        );
        assert!(controller.is_dragging());
    }

    #[test]
    fn events_outside_a_drag_are_ignored() {
        let mut controller = SelectionController::new();
        controller.update(Point::new(10.0, 10.0));
        assert_eq!(controller.finish(), None);
        assert_eq!(controller.clear(), None);
    }

    #[test]
    fn drag_from_idle_reports_nothing_until_commit() {
        let mut controller = SelectionController::new();
        assert_eq!(controller.begin(Point::new(0.0, 0.0)), None);
        controller.update(Point::new(3.0, 3.0));
        assert_eq!(controller.finish(), None);

        controller.begin(Point::new(0.0, 0.0));
        assert_eq!(controller.clear(), None);
        assert_eq!(controller.state(), SelectionState::Idle);
    }

    #[test]
    fn replacing_selection_with_small_drag_reports_one_clear() {
        let mut controller = SelectionController::new();
        drag(&mut controller, Point::new(0.0, 0.0), Point::new(50.0, 50.0));
        assert_eq!(
            controller.begin(Point::new(5.0, 5.0)),
            Some(SelectionChange::Cleared)
        );
        controller.update(Point::new(7.0, 7.0));
        assert_eq!(controller.finish(), None);
        assert!(controller.selection().is_none());
    }

    #[test]
    fn clear_resets_committed_selection() {
        let mut controller = SelectionController::new();
        drag(&mut controller, Point::new(0.0, 0.0), Point::new(50.0, 50.0));
        assert_eq!(controller.clear(), Some(SelectionChange::Cleared));
        assert_eq!(controller.state(), SelectionState::Idle);
    }
}
