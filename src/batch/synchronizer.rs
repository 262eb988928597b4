// BatchEditSynchronizer - edit N selected entities as if they were one
//
// Two snapshots of the batch proxy are kept. `original` is what the selection looked like
// at rebuild (or after the last propagation), `working` is what the property panel has
// written since. A field is propagated only when the two disagree, so untouched fields
// keep each entity's own value.

use crate::batch::virtual_entity::VirtualEntity;
use crate::chart::entity::{EntityId, SelectableEntity};
use crate::chart::field::{EditError, FieldId, FieldValue};
use crate::chart::store::EntityStore;
use crate::messaging::edit::FieldEdit;
use crate::selection::set::SelectionSet;

/// Outcome of one synchronization pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncReport {
    /// Fields written to every member
    pub propagated: Vec<FieldId>,
    /// Fields whose propagation was aborted
    pub aborted: Vec<FieldId>,
    /// Number of entities written
    pub entities: usize,
}

impl SyncReport {
    pub fn is_empty(&self) -> bool {
        self.propagated.is_empty() && self.aborted.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct BatchEditSynchronizer {
    original: VirtualEntity,
    working: VirtualEntity,
}

impl BatchEditSynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute both snapshots from the current selection
    ///
    /// Pending edits that were not synchronized yet are discarded.
    pub fn rebuild(&mut self, selection: &SelectionSet, store: &EntityStore) -> &VirtualEntity {
        let members = selection.transmit_owned(store);
        self.original = VirtualEntity::from_entities(members.iter().filter_map(|id| store.get(*id)));
        self.working = self.original.clone();

        log::info!(
            "Rebuilt batch proxy for {} entities: {} fields, {} mixed",
            members.len(),
            self.working.len(),
            self.working.mixed_fields().len()
        );
        &self.working
    }

    /// Drop both snapshots (selection became empty)
    pub fn discard(&mut self) {
        self.original = VirtualEntity::default();
        self.working = VirtualEntity::default();
    }

    /// Proxy as shown in the property panel
    pub fn working(&self) -> &VirtualEntity {
        &self.working
    }

    pub fn original(&self) -> &VirtualEntity {
        &self.original
    }

    /// Write one field of the working snapshot
    pub fn set_working(&mut self, field: FieldId, value: FieldValue) -> Result<(), EditError> {
        self.working.set(field, value)
    }

    /// True if some field was edited but not yet propagated
    pub fn has_pending(&self) -> bool {
        !self.working.same_as(&self.original)
    }

    /// Write an edit to the working snapshot and synchronize immediately
    pub fn apply_edit(
        &mut self,
        edit: FieldEdit,
        selection: &SelectionSet,
        store: &mut EntityStore,
    ) -> Result<SyncReport, EditError> {
        self.set_working(edit.field, edit.value)?;
        Ok(self.sync(selection, store))
    }

    /// Propagate every touched field to all selected entities
    ///
    /// No-op unless the selection owns at least two entities.
    pub fn sync(&mut self, selection: &SelectionSet, store: &mut EntityStore) -> SyncReport {
        let members = selection.transmit_owned(store);
        if members.len() <= 1 {
            return SyncReport::default();
        }
        self.commit(&members, store)
    }

    /// Write every touched field straight into the only selected entity
    ///
    /// Counterpart of [`sync`](Self::sync) for a one-entity selection. Does nothing
    /// when the selection owns zero or several entities.
    pub fn commit_single(
        &mut self,
        selection: &SelectionSet,
        store: &mut EntityStore,
    ) -> SyncReport {
        let members = selection.transmit_owned(store);
        if members.len() != 1 {
            return SyncReport::default();
        }
        self.commit(&members, store)
    }

    fn commit(&mut self, members: &[EntityId], store: &mut EntityStore) -> SyncReport {
        let mut report = SyncReport::default();

        let touched: Vec<(FieldId, FieldValue)> = self
            .working
            .iter()
            .filter(|(field, value)| {
                self.original
                    .get(*field)
                    .is_none_or(|original| !value.same_as(&original))
            })
            .collect();

        let mut rejected = Vec::new();
        for (field, value) in touched {
            match propagate(field, value, members, store) {
                Ok(()) => self.accept(field, value, &mut report),
                Err(err) => rejected.push((field, value, err)),
            }
        }

        // One retry once the other fields have landed, so both ends of an event can move
        let retry = !report.propagated.is_empty();
        for (field, value, err) in rejected {
            let result = if retry {
                propagate(field, value, members, store)
            } else {
                Err(err)
            };
            match result {
                Ok(()) => self.accept(field, value, &mut report),
                Err(err) => {
                    log::warn!("Aborted batch edit of '{}': {}", field, err);
                    self.revert(field);
                    report.aborted.push(field);
                }
            }
        }

        if !report.propagated.is_empty() {
            report.entities = members.len();
            log::info!(
                "Propagated {} field(s) to {} entities",
                report.propagated.len(),
                members.len()
            );
        }
        report
    }

    fn accept(&mut self, field: FieldId, value: FieldValue, report: &mut SyncReport) {
        // Cannot fail: both snapshots share fields and value types
        let _ = self.original.set(field, value);
        report.propagated.push(field);
    }

    /// Put the working value of `field` back to the last synchronized value
    fn revert(&mut self, field: FieldId) {
        if let Some(original) = self.original.get(field) {
            let _ = self.working.set(field, original);
        }
    }
}

/// Write `value` to `field` of every member, or to none of them
///
/// Every member is validated on a copy first, so one rejection leaves the store untouched.
fn propagate(
    field: FieldId,
    value: FieldValue,
    members: &[EntityId],
    store: &mut EntityStore,
) -> Result<(), EditError> {
    if value.is_mixed() {
        return Err(EditError::MixedValue(field));
    }

    let mut updated = Vec::with_capacity(members.len());
    for id in members {
        if let Some(entity) = store.get(*id) {
            let mut candidate = entity.clone();
            candidate.set_field(field, value)?;
            updated.push(candidate);
        }
    }

    for candidate in updated {
        if let Some(entity) = store.get_mut(candidate.id()) {
            *entity = candidate;
        }
    }
    Ok(())
}
