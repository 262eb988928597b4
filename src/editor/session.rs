// EditorSession - owns the editing core and drives it one frame at a time
//
// All mutation of the store, the selection and the batch snapshots happens inside the
// session's methods. The UI talks to it through `tick` and the two ring buffers.

use crate::batch::synchronizer::{BatchEditSynchronizer, SyncReport};
use crate::batch::virtual_entity::VirtualEntity;
use crate::chart::entity::{ChartEntity, EntityId};
use crate::chart::event::TimedEvent;
use crate::chart::export::{self, ExportError, RuntimeChart};
use crate::chart::field::EditError;
use crate::chart::note::Note;
use crate::chart::store::EntityStore;
use crate::config::EditorConfig;
use crate::messaging::channels::{EditConsumer, EventProducer};
use crate::messaging::edit::FieldEdit;
use crate::messaging::event::EditorEvent;
use crate::messaging::notification::{Notification, NotificationCategory};
use crate::selection::box_selector::{BoxSelector, BoxTick, PointerFrame};
use crate::selection::set::SelectionSet;
use crate::timing::{BeatClock, BpmSegment, TimingError};
use ringbuf::traits::{Consumer, Producer};

/// What happened during one tick
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub selector: BoxTick,
    pub selection_changed: bool,
    /// Edits taken from the inbound channel
    pub edits_received: usize,
    pub sync: SyncReport,
}

pub struct EditorSession {
    clock: BeatClock,
    config: EditorConfig,
    store: EntityStore,
    selection: SelectionSet,
    selector: BoxSelector,
    synchronizer: BatchEditSynchronizer,

    events: EventProducer,
    edits: EditConsumer,
    dropped_events: usize,
}

impl EditorSession {
    pub fn new(
        clock: BeatClock,
        config: EditorConfig,
        events: EventProducer,
        edits: EditConsumer,
    ) -> Self {
        let selector = BoxSelector::new(config.selection.min_drag_distance);
        Self {
            clock,
            config,
            store: EntityStore::new(),
            selection: SelectionSet::new(),
            selector,
            synchronizer: BatchEditSynchronizer::new(),
            events,
            edits,
            dropped_events: 0,
        }
    }

    /// Run one frame: apply queued property edits, then advance the box selector
    ///
    /// Edits queued before a release land on the selection that was current when they
    /// were made, never on the one the release produces.
    pub fn tick(&mut self, frame: PointerFrame) -> TickReport {
        let mut selection_changed = self.prune_selection();

        let mut edits_received = 0;
        while let Some(edit) = self.edits.try_pop() {
            edits_received += 1;
            if let Err(err) = self.synchronizer.set_working(edit.field, edit.value) {
                log::warn!("Rejected property edit: {}", err);
                self.notify(Notification::warning(
                    NotificationCategory::Selection,
                    err.to_string(),
                ));
            }
        }
        let sync = self.commit_pending();

        let selector = self
            .selector
            .tick(frame, &mut self.store, &mut self.selection);
        if selector.selection_changed() {
            self.on_selection_changed();
            selection_changed = true;
        }

        TickReport {
            selector,
            selection_changed,
            edits_received,
            sync,
        }
    }

    pub fn insert_note(&mut self, note: Note) -> EntityId {
        self.store.insert(note)
    }

    pub fn insert_event(&mut self, event: TimedEvent) -> EntityId {
        self.store.insert(event)
    }

    /// Remove an entity, keeping the selection consistent
    pub fn delete_entity(&mut self, id: EntityId) -> Option<ChartEntity> {
        let removed = self.store.remove(id)?;
        if self.selection.remove(&mut self.store, id) {
            self.on_selection_changed();
        }
        Some(removed)
    }

    /// Single-click selection
    pub fn select_single(&mut self, id: EntityId) -> bool {
        let selected = self.selection.select_single(&mut self.store, id);
        self.on_selection_changed();
        selected
    }

    /// Deselect everything
    pub fn clear_selection(&mut self) {
        self.selection.clear(&mut self.store);
        self.on_selection_changed();
    }

    /// Apply a programmatic edit right away
    ///
    /// Batches go through the synchronizer; a single selected entity is written directly.
    pub fn apply_edit(&mut self, edit: FieldEdit) -> Result<SyncReport, EditError> {
        self.prune_selection();
        self.synchronizer.set_working(edit.field, edit.value)?;
        Ok(self.commit_pending())
    }

    /// Bake the runtime chart
    ///
    /// Also refreshes the simultaneous-hit flags of the edit-side notes.
    pub fn export(&mut self) -> Result<RuntimeChart, ExportError> {
        let result = export::mark_simultaneous(
            &mut self.store,
            &self.clock,
            self.config.timing.simultaneous_epsilon,
        )
        .and_then(|_| export::bake(&self.store, &self.clock, &self.config.timing));

        match &result {
            Ok(chart) => self.notify(Notification::info(
                NotificationCategory::Export,
                format!(
                    "Exported {} notes and {} events",
                    chart.notes.len(),
                    chart.events.len()
                ),
            )),
            Err(err) => {
                log::warn!("Export failed: {}", err);
                self.notify(Notification::error(
                    NotificationCategory::Export,
                    err.to_string(),
                ));
            }
        }
        result
    }

    /// Swap the BPM table; the old one stays if the new one is invalid
    pub fn replace_bpm_table(&mut self, segments: Vec<BpmSegment>) -> Result<(), TimingError> {
        if let Err(err) = self.clock.replace_table(segments) {
            log::warn!("Rejected BPM table: {}", err);
            self.notify(Notification::warning(
                NotificationCategory::Timing,
                err.to_string(),
            ));
            return Err(err);
        }
        Ok(())
    }

    pub fn clock(&self) -> &BeatClock {
        &self.clock
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    /// Direct access for the view layer (bounds updates, single-entity edits)
    pub fn store_mut(&mut self) -> &mut EntityStore {
        &mut self.store
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn selector(&self) -> &BoxSelector {
        &self.selector
    }

    /// Batch proxy as shown in the property panel
    pub fn working(&self) -> &VirtualEntity {
        self.synchronizer.working()
    }

    /// Events lost because the outbound channel was full
    pub fn dropped_events(&self) -> usize {
        self.dropped_events
    }

    /// Drop stale members; true if the selection changed
    fn prune_selection(&mut self) -> bool {
        let pruned = self.selection.prune(&self.store);
        if pruned == 0 {
            return false;
        }
        log::debug!("Pruned {} stale selection members", pruned);
        self.on_selection_changed();
        true
    }

    fn commit_pending(&mut self) -> SyncReport {
        if !self.synchronizer.has_pending() {
            return SyncReport::default();
        }

        let report = if self.selection.transmit_owned(&self.store).len() == 1 {
            self.synchronizer.commit_single(&self.selection, &mut self.store)
        } else {
            self.synchronizer.sync(&self.selection, &mut self.store)
        };
        self.publish_sync(&report);
        report
    }

    fn on_selection_changed(&mut self) {
        let members = self.selection.transmit_owned(&self.store);

        if members.is_empty() {
            self.synchronizer.discard();
        } else {
            self.synchronizer.rebuild(&self.selection, &self.store);
        }

        let summary = self.selection.describe(&self.store);
        log::info!("Selected {}", summary);

        let working = self.synchronizer.working();
        let rebuilt = EditorEvent::VirtualEntityRebuilt {
            fields: working.fields(),
            mixed: working.mixed_fields(),
        };

        self.publish(EditorEvent::SelectionChanged { members });
        self.publish(rebuilt);
        self.notify(Notification::info(
            NotificationCategory::Selection,
            format!("Selected {}", summary),
        ));
    }

    fn publish_sync(&mut self, report: &SyncReport) {
        if !report.propagated.is_empty() {
            self.publish(EditorEvent::FieldsPropagated {
                fields: report.propagated.clone(),
                entities: report.entities,
            });
        }
        if !report.aborted.is_empty() {
            let fields: Vec<String> = report.aborted.iter().map(|f| f.to_string()).collect();
            self.notify(Notification::warning(
                NotificationCategory::Selection,
                format!("Could not apply: {}", fields.join(", ")),
            ));
        }
    }

    fn notify(&mut self, notification: Notification) {
        self.publish(EditorEvent::Notice(notification));
    }

    fn publish(&mut self, event: EditorEvent) {
        if self.events.try_push(event).is_err() {
            self.dropped_events += 1;
            log::warn!("Event channel full, dropped event ({} total)", self.dropped_events);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::field::{FieldId, FieldValue};
    use crate::chart::note::NoteKind;
    use crate::messaging::channels::{
        EditProducer, EventConsumer, create_edit_channel, create_event_channel,
    };
    use egui::{Rect, pos2};

    fn session() -> (EditorSession, EventConsumer, EditProducer) {
        let config = EditorConfig::default();
        let (event_tx, event_rx) = create_event_channel(config.messaging.event_capacity);
        let (edit_tx, edit_rx) = create_edit_channel(config.messaging.edit_capacity);
        let clock = BeatClock::constant(120.0).unwrap();
        (EditorSession::new(clock, config, event_tx, edit_rx), event_rx, edit_tx)
    }

    fn boxed_note(id: EntityId, x: f32, lane: f64) -> Note {
        Note::new(id, NoteKind::Tap, id as f64)
            .with_lane_position(lane)
            .with_bounds(Rect::from_min_max(pos2(x, 10.0), pos2(x + 4.0, 14.0)))
    }

    fn drag(session: &mut EditorSession, from: egui::Pos2, to: egui::Pos2) -> TickReport {
        session.tick(PointerFrame::new(from, true));
        session.tick(PointerFrame::new(to, true));
        session.tick(PointerFrame::new(to, false))
    }

    fn drain(rx: &mut EventConsumer) -> Vec<EditorEvent> {
        std::iter::from_fn(|| rx.try_pop()).collect()
    }

    #[test]
    fn test_box_drag_rebuilds_proxy() {
        let (mut session, mut events, _edits) = session();
        session.insert_note(boxed_note(1, 0.0, 1.0));
        session.insert_note(boxed_note(2, 20.0, 2.0));
        session.insert_note(boxed_note(3, 100.0, 2.0));

        let report = drag(&mut session, pos2(-5.0, 0.0), pos2(50.0, 50.0));

        assert!(report.selection_changed);
        assert_eq!(report.selector, BoxTick::Released { selected: 2 });
        assert_eq!(session.selection().transmit(), vec![1, 2]);
        assert!(session.working().is_mixed(FieldId::LanePosition));

        let events = drain(&mut events);
        assert!(matches!(
            &events[0],
            EditorEvent::SelectionChanged { members } if members == &vec![1, 2]
        ));
        assert!(matches!(
            &events[1],
            EditorEvent::VirtualEntityRebuilt { mixed, .. } if mixed.contains(&FieldId::LanePosition)
        ));
        assert!(matches!(
            &events[2],
            EditorEvent::Notice(n) if n.message == "Selected 2 notes"
        ));
    }

    #[test]
    fn test_queued_edit_is_propagated_on_tick() {
        let (mut session, mut events, mut edits) = session();
        session.insert_note(boxed_note(1, 0.0, 1.0));
        session.insert_note(boxed_note(2, 20.0, 2.0));
        drag(&mut session, pos2(-5.0, 0.0), pos2(50.0, 50.0));
        drain(&mut events);

        edits
            .try_push(FieldEdit::number(FieldId::LanePosition, 0.25))
            .unwrap();
        let report = session.tick(PointerFrame::new(pos2(0.0, 0.0), false));

        assert_eq!(report.edits_received, 1);
        assert_eq!(report.sync.propagated, vec![FieldId::LanePosition]);
        assert!(session.store().notes().all(|n| n.lane_position == 0.25));
        assert!(matches!(
            drain(&mut events).as_slice(),
            [EditorEvent::FieldsPropagated { entities: 2, .. }]
        ));

        // Nothing pending on the next frame
        let report = session.tick(PointerFrame::new(pos2(0.0, 0.0), false));
        assert!(report.sync.is_empty());
    }

    #[test]
    fn test_delete_selected_entity() {
        let (mut session, _events, _edits) = session();
        session.insert_note(boxed_note(1, 0.0, 1.0));
        session.insert_note(boxed_note(2, 20.0, 1.0));
        drag(&mut session, pos2(-5.0, 0.0), pos2(50.0, 50.0));

        assert!(session.delete_entity(2).is_some());
        assert!(session.delete_entity(2).is_none());
        assert_eq!(session.selection().transmit(), vec![1]);
    }

    #[test]
    fn test_select_single_and_clear() {
        let (mut session, _events, _edits) = session();
        session.insert_note(boxed_note(1, 0.0, 1.0));

        assert!(session.select_single(1));
        assert_eq!(session.working().get(FieldId::LanePosition), Some(FieldValue::Number(1.0)));

        session.clear_selection();
        assert!(session.working().is_empty());
        assert!(session.selection().is_empty());
    }

    #[test]
    fn test_apply_edit_to_single_selection() {
        let (mut session, mut events, _edits) = session();
        session.insert_note(boxed_note(1, 0.0, 1.0));
        session.insert_note(boxed_note(2, 20.0, 1.0));
        session.select_single(1);
        drain(&mut events);

        let report = session
            .apply_edit(FieldEdit::number(FieldId::LanePosition, 5.0))
            .unwrap();

        assert_eq!(report.propagated, vec![FieldId::LanePosition]);
        assert_eq!(report.entities, 1);
        let lanes: Vec<f64> = session.store().notes().map(|n| n.lane_position).collect();
        assert_eq!(lanes, vec![5.0, 1.0]);
        assert_eq!(
            session.working().get(FieldId::LanePosition),
            Some(FieldValue::Number(5.0))
        );
        assert!(matches!(
            drain(&mut events).as_slice(),
            [EditorEvent::FieldsPropagated { entities: 1, .. }]
        ));
    }

    #[test]
    fn test_queued_edit_on_single_selection() {
        let (mut session, _events, mut edits) = session();
        session.insert_note(boxed_note(1, 0.0, 1.0));
        session.select_single(1);

        edits
            .try_push(FieldEdit::number(FieldId::LanePosition, 5.0))
            .unwrap();
        let report = session.tick(PointerFrame::new(pos2(0.0, 0.0), false));

        assert_eq!(report.sync.entities, 1);
        assert_eq!(session.store().notes().next().unwrap().lane_position, 5.0);

        let report = session.tick(PointerFrame::new(pos2(0.0, 0.0), false));
        assert!(report.sync.is_empty());
    }

    #[test]
    fn test_edit_queued_during_drag_keeps_old_selection() {
        let (mut session, _events, mut edits) = session();
        session.insert_note(boxed_note(1, 0.0, 1.0));
        session.insert_note(boxed_note(2, 20.0, 1.0));
        session.insert_note(boxed_note(3, 100.0, 1.0));
        session.insert_note(boxed_note(4, 120.0, 1.0));
        drag(&mut session, pos2(-5.0, 0.0), pos2(50.0, 50.0));

        // New box over 3 and 4, with an edit arriving before the release
        session.tick(PointerFrame::new(pos2(90.0, 0.0), true));
        session.tick(PointerFrame::new(pos2(150.0, 50.0), true));
        edits
            .try_push(FieldEdit::number(FieldId::LanePosition, 9.0))
            .unwrap();
        let report = session.tick(PointerFrame::new(pos2(150.0, 50.0), false));

        assert_eq!(report.sync.entities, 2);
        assert_eq!(report.selector, BoxTick::Released { selected: 2 });
        assert_eq!(session.selection().transmit(), vec![3, 4]);
        let lanes: Vec<f64> = session.store().notes().map(|n| n.lane_position).collect();
        assert_eq!(lanes, vec![9.0, 9.0, 1.0, 1.0]);
        assert!(!session.working().is_mixed(FieldId::LanePosition));
    }

    #[test]
    fn test_export_marks_simultaneous_notes() {
        let (mut session, _events, _edits) = session();
        session.insert_note(Note::new(1, NoteKind::Tap, 4.0));
        session.insert_note(Note::new(2, NoteKind::Hold, 4.0).with_hold(2.0));

        let chart = session.export().unwrap();

        assert_eq!(chart.notes.len(), 2);
        assert!(chart.notes.iter().all(|n| n.has_other));
        assert!(session.store().notes().all(|n| n.has_simultaneous));
        assert_eq!(chart.stats.hold, 1);
    }

    #[test]
    fn test_rejected_bpm_table_keeps_previous() {
        let (mut session, mut events, _edits) = session();

        let result = session.replace_bpm_table(vec![BpmSegment::new(1.0, 120.0)]);

        assert!(matches!(result, Err(TimingError::InvalidTimingTable(_))));
        assert_eq!(session.clock().seconds_at(120.0).unwrap(), 60.0);
        assert!(matches!(
            drain(&mut events).as_slice(),
            [EditorEvent::Notice(n)] if n.category == NotificationCategory::Timing
        ));
    }

    #[test]
    fn test_full_event_channel_drops() {
        let config = EditorConfig::default();
        let (event_tx, _event_rx) = create_event_channel(1);
        let (_edit_tx, edit_rx) = create_edit_channel(1);
        let mut session =
            EditorSession::new(BeatClock::constant(120.0).unwrap(), config, event_tx, edit_rx);
        session.insert_note(boxed_note(1, 0.0, 1.0));

        session.select_single(1);

        assert_eq!(session.dropped_events(), 2);
    }
}
