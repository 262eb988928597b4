// Events published by the editor to the UI

use crate::chart::entity::EntityId;
use crate::chart::field::FieldId;
use crate::messaging::notification::Notification;

#[derive(Debug, Clone)]
pub enum EditorEvent {
    /// Selection replaced; members sorted by id
    SelectionChanged { members: Vec<EntityId> },
    /// Batch proxy rebuilt from the new selection
    VirtualEntityRebuilt {
        fields: Vec<FieldId>,
        mixed: Vec<FieldId>,
    },
    /// Fields written to every selected entity
    FieldsPropagated {
        fields: Vec<FieldId>,
        entities: usize,
    },
    /// User-facing message
    Notice(Notification),
}
