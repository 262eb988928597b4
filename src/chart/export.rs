// Export baking - turn beat-relative edit entities into the absolute-time runtime chart
//
// The persistence layer writes the result; this module only converts.

use crate::chart::entity::{ChartEntity, EntityId};
use crate::chart::event::{Curve, TimedEvent};
use crate::chart::note::{Note, NoteEffect, NoteKind};
use crate::chart::store::EntityStore;
use crate::config::TimingConfig;
use crate::timing::{BeatClock, TimingError};
use serde::{Deserialize, Serialize};

/// Export error types
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Timing error: {0}")]
    Timing(#[from] TimingError),

    #[error("Event {id} ends before it starts ({start}s > {end}s)")]
    InvertedEvent { id: EntityId, start: f64, end: f64 },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Note in the runtime chart format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeNote {
    pub kind: NoteKind,
    /// Absolute hit time in seconds
    pub hit_time: f64,
    /// Hold duration in seconds (0 for non-hold notes)
    pub hold_time: f64,
    pub effect: NoteEffect,
    pub position_x: f64,
    pub is_clockwise: bool,
    /// Another note is hit at the same time
    pub has_other: bool,
}

impl RuntimeNote {
    /// Hold duration, never shorter than the judge window
    pub fn effective_hold_time(&self, minimum_judge_window: f64) -> f64 {
        self.hold_time.max(minimum_judge_window)
    }

    /// Time after which the note can no longer be judged
    pub fn end_time(&self, minimum_judge_window: f64) -> f64 {
        self.hit_time + self.effective_hold_time(minimum_judge_window)
    }
}

/// Timed event in the runtime chart format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeEvent {
    pub start_time: f64,
    pub end_time: f64,
    pub start_value: f64,
    pub end_value: f64,
    pub curve: Curve,
}

impl RuntimeEvent {
    /// Interpolated value at `time` (held at the endpoints outside the event)
    pub fn value_at(&self, time: f64) -> f64 {
        let span = self.end_time - self.start_time;
        let progress = if span <= 0.0 {
            if time < self.start_time { 0.0 } else { 1.0 }
        } else {
            (time - self.start_time) / span
        };
        self.start_value + (self.end_value - self.start_value) * self.curve.sample(progress)
    }
}

/// Per-kind note counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteStats {
    pub tap: usize,
    pub hold: usize,
    pub drag: usize,
    pub flick: usize,
    pub full_flick: usize,
    pub point: usize,
}

impl NoteStats {
    fn record(&mut self, kind: NoteKind) {
        match kind {
            NoteKind::Tap => self.tap += 1,
            NoteKind::Hold => self.hold += 1,
            NoteKind::Drag => self.drag += 1,
            NoteKind::Flick => self.flick += 1,
            NoteKind::Point => self.point += 1,
            NoteKind::FullFlickA | NoteKind::FullFlickB => self.full_flick += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.tap + self.hold + self.drag + self.flick + self.full_flick + self.point
    }
}

/// The baked runtime chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeChart {
    /// Sorted by hit time
    pub notes: Vec<RuntimeNote>,
    /// Sorted by start time
    pub events: Vec<RuntimeEvent>,
    pub stats: NoteStats,
    /// Judge window the note end times were computed with
    pub minimum_judge_window: f64,
}

impl RuntimeChart {
    /// Last moment anything in the chart is active
    pub fn length(&self) -> f64 {
        let note_end = self
            .notes
            .iter()
            .map(|n| n.end_time(self.minimum_judge_window))
            .fold(0.0, f64::max);
        let event_end = self.events.iter().map(|e| e.end_time).fold(0.0, f64::max);
        note_end.max(event_end)
    }

    pub fn to_json(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<RuntimeChart, ExportError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Bake every entity of `store` into absolute time
///
/// # Errors
/// Fails on the first entity whose beats cannot be converted, or on an event whose end
/// time resolves before its start time.
pub fn bake(
    store: &EntityStore,
    clock: &BeatClock,
    timing: &TimingConfig,
) -> Result<RuntimeChart, ExportError> {
    let mut notes = Vec::with_capacity(store.len());
    let mut events = Vec::new();
    let mut stats = NoteStats::default();

    for entity in store.iter() {
        match entity {
            ChartEntity::Note(note) => {
                stats.record(note.kind);
                notes.push(bake_note(note, clock)?);
            }
            ChartEntity::Event(event) => events.push(bake_event(event, clock)?),
        }
    }

    notes.sort_by(|a, b| a.hit_time.total_cmp(&b.hit_time));
    events.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
    mark_runtime_simultaneous(&mut notes, timing.simultaneous_epsilon);

    log::info!(
        "Baked chart: {} notes, {} events",
        notes.len(),
        events.len()
    );

    Ok(RuntimeChart {
        notes,
        events,
        stats,
        minimum_judge_window: timing.minimum_judge_window,
    })
}

fn bake_note(note: &Note, clock: &BeatClock) -> Result<RuntimeNote, ExportError> {
    let hit_time = clock.seconds_at(note.hit_beat)?;
    let end_time = clock.seconds_at(note.end_beat())?;

    Ok(RuntimeNote {
        kind: note.kind,
        hit_time,
        hold_time: end_time - hit_time,
        effect: note.effect,
        position_x: note.lane_position,
        is_clockwise: note.is_clockwise,
        has_other: false,
    })
}

fn bake_event(event: &TimedEvent, clock: &BeatClock) -> Result<RuntimeEvent, ExportError> {
    let start_time = clock.seconds_at(event.start_beat)?;
    let end_time = clock.seconds_at(event.end_beat)?;
    if start_time > end_time {
        return Err(ExportError::InvertedEvent {
            id: event.id,
            start: start_time,
            end: end_time,
        });
    }

    Ok(RuntimeEvent {
        start_time,
        end_time,
        start_value: event.start_value,
        end_value: event.end_value,
        curve: event.curve,
    })
}

/// Flag neighbours closer than `epsilon`; `notes` must be sorted by hit time
fn mark_runtime_simultaneous(notes: &mut [RuntimeNote], epsilon: f64) {
    for i in 1..notes.len() {
        if notes[i].hit_time - notes[i - 1].hit_time <= epsilon {
            notes[i - 1].has_other = true;
            notes[i].has_other = true;
        }
    }
}

/// Recompute `has_simultaneous` on the edit-side notes
///
/// Returns the number of notes flagged.
pub fn mark_simultaneous(
    store: &mut EntityStore,
    clock: &BeatClock,
    epsilon: f64,
) -> Result<usize, ExportError> {
    let mut hits: Vec<(EntityId, f64)> = store
        .notes()
        .map(|note| Ok((note.id, clock.seconds_at(note.hit_beat)?)))
        .collect::<Result<_, TimingError>>()?;
    hits.sort_by(|a, b| a.1.total_cmp(&b.1));

    let mut flagged = vec![false; hits.len()];
    for i in 1..hits.len() {
        if hits[i].1 - hits[i - 1].1 <= epsilon {
            flagged[i - 1] = true;
            flagged[i] = true;
        }
    }

    let mut count = 0;
    for ((id, _), is_simultaneous) in hits.iter().zip(flagged) {
        if let Some(note) = store.get_mut(*id).and_then(ChartEntity::as_note_mut) {
            note.has_simultaneous = is_simultaneous;
            count += usize::from(is_simultaneous);
        }
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timing::BpmSegment;

    fn clock() -> BeatClock {
        BeatClock::new(vec![BpmSegment::new(0.0, 120.0), BpmSegment::new(120.0, 60.0)]).unwrap()
    }

    #[test]
    fn test_bake_note_times() {
        let mut store = EntityStore::new();
        // Hold straddles the tempo change: beats 110..130
        store.insert(Note::new(1, NoteKind::Hold, 110.0).with_hold(20.0));

        let chart = bake(&store, &clock(), &TimingConfig::default()).unwrap();
        let note = &chart.notes[0];

        assert_eq!(note.hit_time, 55.0);
        // 10 beats at 120 BPM + 10 beats at 60 BPM = 5s + 10s
        assert_eq!(note.hold_time, 15.0);
        assert_eq!(note.end_time(0.16), 70.0);
    }

    #[test]
    fn test_end_time_respects_judge_window() {
        let mut store = EntityStore::new();
        store.insert(Note::new(1, NoteKind::Tap, 2.0));

        let chart = bake(&store, &clock(), &TimingConfig::default()).unwrap();
        let note = &chart.notes[0];

        assert_eq!(note.hold_time, 0.0);
        assert_eq!(note.effective_hold_time(0.16), 0.16);
        assert_eq!(note.end_time(0.16), 1.16);
        assert_eq!(chart.length(), 1.16);
    }

    #[test]
    fn test_bake_sorts_and_counts() {
        let mut store = EntityStore::new();
        store.insert(Note::new(1, NoteKind::Flick, 8.0));
        store.insert(Note::new(2, NoteKind::Tap, 4.0));
        store.insert(Note::new(3, NoteKind::FullFlickA, 6.0));
        store.insert(Note::new(4, NoteKind::FullFlickB, 7.0));
        store.insert(TimedEvent::new(5, 4.0, 8.0));
        store.insert(TimedEvent::new(6, 0.0, 2.0));

        let chart = bake(&store, &clock(), &TimingConfig::default()).unwrap();

        let hit_times: Vec<f64> = chart.notes.iter().map(|n| n.hit_time).collect();
        assert_eq!(hit_times, vec![2.0, 3.0, 3.5, 4.0]);
        assert_eq!(chart.events[0].start_time, 0.0);
        assert_eq!(chart.stats.full_flick, 2);
        assert_eq!(chart.stats.total(), 4);
    }

    #[test]
    fn test_simultaneous_notes() {
        let mut store = EntityStore::new();
        store.insert(Note::new(1, NoteKind::Tap, 4.0));
        store.insert(Note::new(2, NoteKind::Drag, 4.0));
        store.insert(Note::new(3, NoteKind::Tap, 5.0));

        let chart = bake(&store, &clock(), &TimingConfig::default()).unwrap();
        let flags: Vec<bool> = chart.notes.iter().map(|n| n.has_other).collect();
        assert_eq!(flags, vec![true, true, false]);

        let flagged = mark_simultaneous(&mut store, &clock(), 0.001).unwrap();
        assert_eq!(flagged, 2);
        assert!(store.get(1).unwrap().as_note().unwrap().has_simultaneous);
        assert!(!store.get(3).unwrap().as_note().unwrap().has_simultaneous);
    }

    #[test]
    fn test_event_value_interpolation() {
        let event = RuntimeEvent {
            start_time: 1.0,
            end_time: 3.0,
            start_value: 0.0,
            end_value: 100.0,
            curve: Curve::Linear,
        };

        assert_eq!(event.value_at(0.0), 0.0);
        assert_eq!(event.value_at(2.0), 50.0);
        assert_eq!(event.value_at(5.0), 100.0);
    }

    #[test]
    fn test_json_output() {
        let mut store = EntityStore::new();
        store.insert(Note::new(1, NoteKind::Tap, 2.0).with_effect(NoteEffect::RIPPLE));

        let chart = bake(&store, &clock(), &TimingConfig::default()).unwrap();
        let json = chart.to_json().unwrap();

        assert!(json.contains("\"hit_time\": 1.0"));
        assert!(json.contains("\"effect\": 1"));
        assert_eq!(RuntimeChart::from_json(&json).unwrap(), chart);
    }

    #[test]
    fn test_inverted_event_is_rejected() {
        let mut store = EntityStore::new();
        let mut event = TimedEvent::new(9, 0.0, 4.0);
        event.start_beat = 6.0;
        store.insert(event);

        let result = bake(&store, &clock(), &TimingConfig::default());
        assert!(matches!(result, Err(ExportError::InvertedEvent { id: 9, .. })));
    }

    #[test]
    fn test_stale_simultaneous_flag_is_recomputed() {
        let mut store = EntityStore::new();
        let mut stale = Note::new(1, NoteKind::Tap, 0.0);
        stale.has_simultaneous = true;
        store.insert(stale);
        store.insert(Note::new(2, NoteKind::Tap, 8.0));

        let chart = bake(&store, &clock(), &TimingConfig::default()).unwrap();

        let flags: Vec<bool> = chart.notes.iter().map(|n| n.has_other).collect();
        assert_eq!(flags, vec![false, false]);
    }

    #[test]
    fn test_from_json_rejects_reserved_effect_bits() {
        let mut store = EntityStore::new();
        store.insert(Note::new(1, NoteKind::Tap, 2.0).with_effect(NoteEffect::RIPPLE));
        let json = bake(&store, &clock(), &TimingConfig::default())
            .unwrap()
            .to_json()
            .unwrap();

        let tampered = json.replace("\"effect\": 1", "\"effect\": 128");
        assert_ne!(tampered, json);
        assert!(matches!(
            RuntimeChart::from_json(&tampered),
            Err(ExportError::Json(_))
        ));
    }
}
