// BoxSelector - rubber-band selection driven by one pointer sample per frame

use crate::chart::entity::{EntityId, SelectableEntity};
use crate::chart::store::EntityStore;
use crate::selection::set::SelectionSet;
use egui::{Pos2, Rect};

/// Pointer state sampled once per frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerFrame {
    pub position: Pos2,
    /// Primary button held
    pub pressed: bool,
}

impl PointerFrame {
    pub fn new(position: Pos2, pressed: bool) -> Self {
        Self { position, pressed }
    }

    fn has_valid_position(&self) -> bool {
        self.position.x.is_finite() && self.position.y.is_finite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoxState {
    Idle,
    Dragging { anchor: Pos2, current: Pos2 },
}

/// What one tick of the selector did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxTick {
    /// Nothing happened
    Idle,
    /// Press edge, drag started
    Started,
    /// Rectangle follows the pointer
    Dragging,
    /// Release edge; the selection was replaced and holds `selected` entities
    Released { selected: usize },
    /// Release with an unusable pointer; the previous selection is retained
    Abandoned,
    /// Pointer coordinates were not finite; the frame was ignored
    Skipped,
}

impl BoxTick {
    /// True when the selection set was modified
    pub fn selection_changed(self) -> bool {
        matches!(self, BoxTick::Released { .. })
    }
}

/// Rubber-band selector
#[derive(Debug, Clone)]
pub struct BoxSelector {
    state: BoxState,
    /// Releases closer than this to the anchor only clear the selection
    min_drag_distance: f32,
}

impl BoxSelector {
    pub fn new(min_drag_distance: f32) -> Self {
        Self {
            state: BoxState::Idle,
            min_drag_distance: min_drag_distance.max(0.0),
        }
    }

    pub fn state(&self) -> BoxState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, BoxState::Dragging { .. })
    }

    /// Current selection rectangle, normalized (non-negative size)
    pub fn rect(&self) -> Option<Rect> {
        match self.state {
            BoxState::Idle => None,
            BoxState::Dragging { anchor, current } => Some(Rect::from_two_pos(anchor, current)),
        }
    }

    /// Advance by one frame
    pub fn tick(
        &mut self,
        frame: PointerFrame,
        store: &mut EntityStore,
        selection: &mut SelectionSet,
    ) -> BoxTick {
        let valid = frame.has_valid_position();

        match (self.state, frame.pressed) {
            (BoxState::Idle, false) => BoxTick::Idle,
            (BoxState::Idle, true) => {
                if !valid {
                    log::debug!("Skipping press with invalid pointer {:?}", frame.position);
                    return BoxTick::Skipped;
                }
                self.state = BoxState::Dragging {
                    anchor: frame.position,
                    current: frame.position,
                };
                log::debug!("Box selection started at {:?}", frame.position);
                BoxTick::Started
            }
            (BoxState::Dragging { anchor, .. }, true) => {
                if !valid {
                    log::debug!("Skipping drag frame with invalid pointer {:?}", frame.position);
                    return BoxTick::Skipped;
                }
                self.state = BoxState::Dragging {
                    anchor,
                    current: frame.position,
                };
                BoxTick::Dragging
            }
            (BoxState::Dragging { anchor, .. }, false) => {
                self.state = BoxState::Idle;

                if !valid {
                    log::debug!("Box selection released with invalid pointer, keeping selection");
                    return BoxTick::Abandoned;
                }

                let selected = self.select_in(anchor, frame.position, store, selection);
                log::debug!("Box selection released at {:?}", frame.position);
                BoxTick::Released { selected }
            }
        }
    }

    fn select_in(
        &self,
        anchor: Pos2,
        end: Pos2,
        store: &mut EntityStore,
        selection: &mut SelectionSet,
    ) -> usize {
        selection.clear(store);

        if anchor.distance(end) < self.min_drag_distance {
            return 0;
        }

        let rect = Rect::from_two_pos(anchor, end);
        let hits: Vec<EntityId> = store
            .iter()
            .filter(|entity| entity.corners().iter().any(|p| strictly_inside(rect, *p)))
            .map(|entity| entity.id())
            .collect();

        for id in &hits {
            selection.add(store, *id);
        }
        hits.len()
    }
}

impl Default for BoxSelector {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// Open-interval containment on both axes
pub fn strictly_inside(rect: Rect, point: Pos2) -> bool {
    rect.min.x < point.x && point.x < rect.max.x && rect.min.y < point.y && point.y < rect.max.y
}
