// Batch module - multi-entity property editing
//
// The selection is collapsed into a VirtualEntity that the property panel edits like a
// single object; the synchronizer writes touched fields back to every member.

pub mod sentinel;
pub mod synchronizer;
pub mod virtual_entity;

pub use sentinel::{EnumTag, Sentinel, TaggedEnum, TriState};
pub use synchronizer::{BatchEditSynchronizer, SyncReport};
pub use virtual_entity::VirtualEntity;
