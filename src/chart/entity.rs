// SelectableEntity - uniform capability set over notes and timed events
//
// Box selection and batch editing only ever talk to entities through this trait.
// Type-specific code lives in the `Note` / `TimedEvent` impls.

use crate::chart::event::TimedEvent;
use crate::chart::field::{EditError, FieldId, FieldValue};
use crate::chart::note::Note;
use crate::selection::SelectionId;
use egui::{Pos2, Rect};

/// Identifier for chart entities
///
/// Assigned by whoever builds the chart. Must be unique within one [`EntityStore`].
///
/// [`EntityStore`]: crate::chart::store::EntityStore
pub type EntityId = u64;

/// Capabilities shared by everything that can be selected and batch-edited
pub trait SelectableEntity {
    fn id(&self) -> EntityId;

    /// Fields this entity exposes to the property editor
    fn editable_fields(&self) -> &'static [FieldId];

    /// Current value of `field`, or None if the entity has no such field
    fn field(&self, field: FieldId) -> Option<FieldValue>;

    /// Write a concrete value into `field`
    ///
    /// Sentinel values are rejected: a real entity always holds a concrete value.
    fn set_field(&mut self, field: FieldId, value: FieldValue) -> Result<(), EditError>;

    /// Hit-test geometry in view space
    fn bounds(&self) -> Rect;

    /// Corner points used by box selection
    fn corners(&self) -> [Pos2; 4] {
        let bounds = self.bounds();
        [
            bounds.left_top(),
            bounds.right_top(),
            bounds.right_bottom(),
            bounds.left_bottom(),
        ]
    }

    /// Selection set currently owning this entity's selected flag
    fn selected_by(&self) -> Option<SelectionId>;

    fn set_selected_by(&mut self, owner: Option<SelectionId>);

    fn is_selected(&self) -> bool {
        self.selected_by().is_some()
    }
}

/// Kind tag of a [`ChartEntity`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Note,
    Event,
}

/// Tagged union of every selectable chart element
#[derive(Debug, Clone, PartialEq)]
pub enum ChartEntity {
    Note(Note),
    Event(TimedEvent),
}

impl ChartEntity {
    pub fn kind(&self) -> EntityKind {
        match self {
            ChartEntity::Note(_) => EntityKind::Note,
            ChartEntity::Event(_) => EntityKind::Event,
        }
    }

    pub fn as_note(&self) -> Option<&Note> {
        match self {
            ChartEntity::Note(note) => Some(note),
            ChartEntity::Event(_) => None,
        }
    }

    pub fn as_note_mut(&mut self) -> Option<&mut Note> {
        match self {
            ChartEntity::Note(note) => Some(note),
            ChartEntity::Event(_) => None,
        }
    }

    pub fn as_event(&self) -> Option<&TimedEvent> {
        match self {
            ChartEntity::Event(event) => Some(event),
            ChartEntity::Note(_) => None,
        }
    }

    /// Set the view-space bounds used for hit testing
    pub fn set_bounds(&mut self, bounds: Rect) {
        match self {
            ChartEntity::Note(note) => note.bounds = bounds,
            ChartEntity::Event(event) => event.bounds = bounds,
        }
    }

    fn inner(&self) -> &dyn SelectableEntity {
        match self {
            ChartEntity::Note(note) => note,
            ChartEntity::Event(event) => event,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn SelectableEntity {
        match self {
            ChartEntity::Note(note) => note,
            ChartEntity::Event(event) => event,
        }
    }
}

impl SelectableEntity for ChartEntity {
    fn id(&self) -> EntityId {
        self.inner().id()
    }

    fn editable_fields(&self) -> &'static [FieldId] {
        self.inner().editable_fields()
    }

    fn field(&self, field: FieldId) -> Option<FieldValue> {
        self.inner().field(field)
    }

    fn set_field(&mut self, field: FieldId, value: FieldValue) -> Result<(), EditError> {
        self.inner_mut().set_field(field, value)
    }

    fn bounds(&self) -> Rect {
        self.inner().bounds()
    }

    fn selected_by(&self) -> Option<SelectionId> {
        self.inner().selected_by()
    }

    fn set_selected_by(&mut self, owner: Option<SelectionId>) {
        self.inner_mut().set_selected_by(owner);
    }
}

impl From<Note> for ChartEntity {
    fn from(note: Note) -> Self {
        ChartEntity::Note(note)
    }
}

impl From<TimedEvent> for ChartEntity {
    fn from(event: TimedEvent) -> Self {
        ChartEntity::Event(event)
    }
}
