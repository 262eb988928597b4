// SelectionSet - exclusive ownership of the entities' "selected" flag
//
// An entity records the id of the set that selected it. When another set takes the entity
// over, the previous owner's membership goes stale and is dropped on the next `prune`.

use crate::chart::entity::{EntityId, EntityKind, SelectableEntity};
use crate::chart::store::EntityStore;
use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifier of a selection set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SelectionId(u64);

static NEXT_SELECTION_ID: AtomicU64 = AtomicU64::new(1);

impl SelectionId {
    fn generate() -> Self {
        SelectionId(NEXT_SELECTION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for SelectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "selection#{}", self.0)
    }
}

/// Set of selected entities
#[derive(Debug)]
pub struct SelectionSet {
    id: SelectionId,
    members: HashSet<EntityId>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self {
            id: SelectionId::generate(),
            members: HashSet::new(),
        }
    }

    pub fn id(&self) -> SelectionId {
        self.id
    }

    /// Select an entity, taking it over from any other set
    ///
    /// Returns false if the entity is not in the store.
    pub fn add(&mut self, store: &mut EntityStore, id: EntityId) -> bool {
        let Some(entity) = store.get_mut(id) else {
            return false;
        };

        if let Some(previous) = entity.selected_by()
            && previous != self.id
        {
            log::debug!("Entity {} moves from {} to {}", id, previous, self.id);
        }
        entity.set_selected_by(Some(self.id));
        self.members.insert(id);
        true
    }

    /// Deselect one entity
    ///
    /// Also used after the entity was deleted from the store, in which case only the
    /// membership is dropped.
    pub fn remove(&mut self, store: &mut EntityStore, id: EntityId) -> bool {
        if !self.members.remove(&id) {
            return false;
        }
        if let Some(entity) = store.get_mut(id)
            && entity.selected_by() == Some(self.id)
        {
            entity.set_selected_by(None);
        }
        true
    }

    /// Deselect every member this set still owns
    pub fn clear(&mut self, store: &mut EntityStore) {
        for id in self.members.drain() {
            if let Some(entity) = store.get_mut(id)
                && entity.selected_by() == Some(self.id)
            {
                entity.set_selected_by(None);
            }
        }
    }

    /// Single-click path: the set ends up holding exactly `id`
    pub fn select_single(&mut self, store: &mut EntityStore, id: EntityId) -> bool {
        self.clear(store);
        self.add(store, id)
    }

    /// Rebuild membership from the entities' own flags
    pub fn refresh_from_store(&mut self, store: &EntityStore) {
        self.members = store
            .iter()
            .filter(|entity| entity.selected_by() == Some(self.id))
            .map(|entity| entity.id())
            .collect();
    }

    /// Drop members that were deleted or taken over by another set
    ///
    /// Returns the number of members dropped.
    pub fn prune(&mut self, store: &EntityStore) -> usize {
        let before = self.members.len();
        let owner = Some(self.id);
        self.members
            .retain(|id| store.get(*id).is_some_and(|e| e.selected_by() == owner));
        before - self.members.len()
    }

    /// Membership as of the last `prune`
    ///
    /// May still report an entity another set took over since; see [`owns`](Self::owns).
    pub fn contains(&self, id: EntityId) -> bool {
        self.members.contains(&id)
    }

    /// True if `id` is a member and its selected flag still points at this set
    pub fn owns(&self, store: &EntityStore, id: EntityId) -> bool {
        self.members.contains(&id)
            && store
                .get(id)
                .is_some_and(|e| e.selected_by() == Some(self.id))
    }

    /// Member count as of the last `prune`
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.members.iter().copied()
    }

    /// Snapshot of the members as of the last `prune`, sorted by id
    pub fn transmit(&self) -> Vec<EntityId> {
        let mut members: Vec<EntityId> = self.members.iter().copied().collect();
        members.sort_unstable();
        members
    }

    /// Snapshot of the members this set still owns, sorted by id
    pub fn transmit_owned(&self, store: &EntityStore) -> Vec<EntityId> {
        let mut members: Vec<EntityId> = self
            .members
            .iter()
            .copied()
            .filter(|id| self.owns(store, *id))
            .collect();
        members.sort_unstable();
        members
    }

    /// Summary for the status line, e.g. "2 notes, 1 event"
    pub fn describe(&self, store: &EntityStore) -> String {
        let mut notes = 0;
        let mut events = 0;
        let owner = Some(self.id);
        let owned = self
            .members
            .iter()
            .filter_map(|id| store.get(*id))
            .filter(|e| e.selected_by() == owner);
        for entity in owned {
            match entity.kind() {
                EntityKind::Note => notes += 1,
                EntityKind::Event => events += 1,
            }
        }

        let mut parts = Vec::new();
        if notes > 0 {
            parts.push(plural(notes, "note"));
        }
        if events > 0 {
            parts.push(plural(events, "event"));
        }
        if parts.is_empty() {
            "nothing".to_string()
        } else {
            parts.join(", ")
        }
    }
}

impl Default for SelectionSet {
    fn default() -> Self {
        Self::new()
    }
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("1 {}", noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::event::TimedEvent;
    use crate::chart::note::{Note, NoteKind};

    fn store() -> EntityStore {
        let mut store = EntityStore::new();
        store.insert(Note::new(1, NoteKind::Tap, 0.0));
        store.insert(Note::new(2, NoteKind::Tap, 1.0));
        store.insert(TimedEvent::new(3, 0.0, 4.0));
        store
    }

    #[test]
    fn test_add_marks_entity() {
        let mut store = store();
        let mut selection = SelectionSet::new();

        assert!(selection.add(&mut store, 1));
        assert!(!selection.add(&mut store, 99));
        assert_eq!(store.get(1).unwrap().selected_by(), Some(selection.id()));
        assert_eq!(selection.transmit(), vec![1]);
    }

    #[test]
    fn test_clear_unsets_flags() {
        let mut store = store();
        let mut selection = SelectionSet::new();
        selection.add(&mut store, 1);
        selection.add(&mut store, 3);

        selection.clear(&mut store);

        assert!(selection.is_empty());
        assert!(store.iter().all(|e| !e.is_selected()));
    }

    #[test]
    fn test_exclusive_between_sets() {
        let mut store = store();
        let mut first = SelectionSet::new();
        let mut second = SelectionSet::new();
        assert_ne!(first.id(), second.id());

        first.add(&mut store, 1);
        first.add(&mut store, 2);
        second.add(&mut store, 2);

        assert_eq!(store.get(2).unwrap().selected_by(), Some(second.id()));
        assert_eq!(first.prune(&store), 1);
        assert_eq!(first.transmit(), vec![1]);

        // Clearing the old owner must not deselect what the new owner holds
        first.add(&mut store, 3);
        second.add(&mut store, 3);
        first.clear(&mut store);
        assert!(store.get(2).unwrap().is_selected());
        assert!(store.get(3).unwrap().is_selected());
        assert_eq!(second.len(), 2);
    }

    #[test]
    fn test_taken_over_member_is_not_owned() {
        let mut store = store();
        let mut first = SelectionSet::new();
        let mut second = SelectionSet::new();
        first.add(&mut store, 1);
        first.add(&mut store, 2);
        second.add(&mut store, 2);

        // Stale until pruned
        assert!(first.contains(2));
        assert_eq!(first.transmit(), vec![1, 2]);

        assert!(!first.owns(&store, 2));
        assert!(second.owns(&store, 2));
        assert_eq!(first.transmit_owned(&store), vec![1]);
        assert_eq!(first.describe(&store), "1 note");

        first.prune(&store);
        assert_eq!(first.transmit(), first.transmit_owned(&store));
    }

    #[test]
    fn test_select_single() {
        let mut store = store();
        let mut selection = SelectionSet::new();
        selection.add(&mut store, 1);
        selection.add(&mut store, 2);

        assert!(selection.select_single(&mut store, 3));
        assert_eq!(selection.transmit(), vec![3]);
        assert!(!store.get(1).unwrap().is_selected());
    }

    #[test]
    fn test_remove_after_delete() {
        let mut store = store();
        let mut selection = SelectionSet::new();
        selection.add(&mut store, 1);
        selection.add(&mut store, 2);

        store.remove(2);
        assert!(selection.remove(&mut store, 2));
        assert!(!selection.remove(&mut store, 2));
        assert_eq!(selection.transmit(), vec![1]);
    }

    #[test]
    fn test_refresh_from_store() {
        let mut store = store();
        let mut selection = SelectionSet::new();
        store.get_mut(3).unwrap().set_selected_by(Some(selection.id()));

        selection.refresh_from_store(&store);

        assert!(selection.contains(3));
        assert_eq!(selection.len(), 1);
    }

    #[test]
    fn test_describe() {
        let mut store = store();
        let mut selection = SelectionSet::new();
        assert_eq!(selection.describe(&store), "nothing");

        selection.add(&mut store, 1);
        assert_eq!(selection.describe(&store), "1 note");

        selection.add(&mut store, 2);
        selection.add(&mut store, 3);
        assert_eq!(selection.describe(&store), "2 notes, 1 event");
    }
}
