// Rhythm chart editor core - library exports for the editor UI, tests and benchmarks

pub mod batch;
pub mod chart;
pub mod config;
pub mod editor;
pub mod messaging;
pub mod selection;
pub mod timing;

// Re-export commonly used types for convenience
pub use batch::{BatchEditSynchronizer, Sentinel, SyncReport, TriState, VirtualEntity};
pub use chart::{
    ChartEntity, Curve, EntityId, EntityStore, FieldId, FieldValue, Note, NoteEffect, NoteKind,
    RuntimeChart, SelectableEntity, TimedEvent,
};
pub use config::{ConfigError, EditorConfig};
pub use editor::{EditorSession, TickReport};
pub use messaging::{EditorEvent, FieldEdit, create_edit_channel, create_event_channel};
pub use selection::{BoxSelector, PointerFrame, SelectionSet};
pub use timing::{BeatClock, BpmSegment, TimingError};
