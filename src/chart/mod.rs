// Chart module - edit-side notes and timed events, and export baking

pub mod entity;
pub mod event;
pub mod export;
pub mod field;
pub mod note;
pub mod store;

pub use entity::{ChartEntity, EntityId, EntityKind, SelectableEntity};
pub use event::{Curve, TimedEvent};
pub use export::{
    ExportError, NoteStats, RuntimeChart, RuntimeEvent, RuntimeNote, bake, mark_simultaneous,
};
pub use field::{EditError, FieldId, FieldValue};
pub use note::{IllegalEffectBits, Note, NoteEffect, NoteKind};
pub use store::EntityStore;
