// EntityStore - the entities visible in the current editing view
// This is the "scope" box selection tests against and batch edits write into.

use crate::chart::entity::{ChartEntity, EntityId, EntityKind, SelectableEntity};
use crate::chart::event::TimedEvent;
use crate::chart::note::Note;

/// Owner of every edit-side chart entity
#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    /// Kept in insertion order
    entities: Vec<ChartEntity>,
}

impl EntityStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity, returning its id
    pub fn insert(&mut self, entity: impl Into<ChartEntity>) -> EntityId {
        let entity = entity.into();
        let id = entity.id();
        debug_assert!(self.get(id).is_none(), "Duplicate entity id {}", id);
        self.entities.push(entity);
        id
    }

    /// Remove an entity by ID
    pub fn remove(&mut self, id: EntityId) -> Option<ChartEntity> {
        let index = self.entities.iter().position(|e| e.id() == id)?;
        Some(self.entities.remove(index))
    }

    pub fn get(&self, id: EntityId) -> Option<&ChartEntity> {
        self.entities.iter().find(|e| e.id() == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut ChartEntity> {
        self.entities.iter_mut().find(|e| e.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChartEntity> {
        self.entities.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ChartEntity> {
        self.entities.iter_mut()
    }

    pub fn notes(&self) -> impl Iterator<Item = &Note> {
        self.entities.iter().filter_map(ChartEntity::as_note)
    }

    pub fn events(&self) -> impl Iterator<Item = &TimedEvent> {
        self.entities.iter().filter_map(ChartEntity::as_event)
    }

    pub fn count_of(&self, kind: EntityKind) -> usize {
        self.entities.iter().filter(|e| e.kind() == kind).count()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
