// BeatClock - BPM timeline and beat/second conversion
// Handles conversion from authoring-time beats to absolute seconds across tempo changes

use serde::{Deserialize, Serialize};
use std::fmt;

/// Errors raised by the timing table or by conversion requests
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TimingError {
    #[error("Invalid timing table: {0}")]
    InvalidTimingTable(String),

    #[error("Invalid beat position: {0}")]
    InvalidBeat(f64),

    #[error("Beat position refers to missing BPM segment {0}")]
    SegmentOutOfRange(usize),

    #[error("Invalid time: {0}s")]
    InvalidSeconds(f64),
}

/// One tempo change point on the BPM timeline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BpmSegment {
    /// Beat at which this tempo takes effect
    pub start_beat: f64,
    /// Tempo in beats per minute
    pub bpm: f64,
}

impl BpmSegment {
    pub fn new(start_beat: f64, bpm: f64) -> Self {
        Self { start_beat, bpm }
    }

    /// Duration of one beat in seconds at this tempo
    pub fn beat_duration_seconds(&self) -> f64 {
        60.0 / self.bpm
    }
}

impl fmt::Display for BpmSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3} @ {:.1} BPM", self.start_beat, self.bpm)
    }
}

/// A beat expressed relative to one segment of the BPM table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeatPosition {
    pub segment_index: usize,
    pub beats_into_segment: f64,
}

/// Converts beats into absolute seconds using a validated BPM table
///
/// The table is immutable once installed. Edits go through [`BeatClock::replace_table`],
/// which validates the whole new table before swapping it in, so a conversion never
/// observes a half-edited timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct BeatClock {
    segments: Vec<BpmSegment>,

    /// Absolute seconds at which each segment starts.
    /// Same length as `segments`; built together with the table.
    segment_starts: Vec<f64>,
}

impl BeatClock {
    /// Create a clock from a BPM table
    ///
    /// # Errors
    /// Returns [`TimingError::InvalidTimingTable`] if the table is empty, does not start at
    /// beat 0, is not strictly ascending, or contains a non-positive tempo.
    pub fn new(segments: Vec<BpmSegment>) -> Result<Self, TimingError> {
        validate_table(&segments)?;
        let segment_starts = segment_start_seconds(&segments);
        Ok(Self {
            segments,
            segment_starts,
        })
    }

    /// Clock with a single tempo for the whole chart
    pub fn constant(bpm: f64) -> Result<Self, TimingError> {
        Self::new(vec![BpmSegment::new(0.0, bpm)])
    }

    /// The installed BPM table
    pub fn segments(&self) -> &[BpmSegment] {
        &self.segments
    }

    /// Atomically replace the BPM table
    ///
    /// On error the previous table stays in effect.
    pub fn replace_table(&mut self, segments: Vec<BpmSegment>) -> Result<(), TimingError> {
        *self = Self::new(segments)?;
        log::info!("BPM table replaced ({} segments)", self.segments.len());
        Ok(())
    }

    /// Index of the last segment starting at or before `beat`
    fn segment_index_at(&self, beat: f64) -> usize {
        // First segment starts at 0 and beat >= 0, so the partition point is at least 1
        self.segments
            .partition_point(|segment| segment.start_beat <= beat)
            .saturating_sub(1)
    }

    /// Resolve an absolute beat against the table
    pub fn position_of(&self, beat: f64) -> Result<BeatPosition, TimingError> {
        check_beat(beat)?;
        let segment_index = self.segment_index_at(beat);
        Ok(BeatPosition {
            segment_index,
            beats_into_segment: beat - self.segments[segment_index].start_beat,
        })
    }

    /// Absolute beat of a segment-relative position
    pub fn beat_of(&self, position: BeatPosition) -> Result<f64, TimingError> {
        let segment = self
            .segments
            .get(position.segment_index)
            .ok_or(TimingError::SegmentOutOfRange(position.segment_index))?;
        check_beat(position.beats_into_segment)?;
        Ok(segment.start_beat + position.beats_into_segment)
    }

    /// Absolute seconds at `beat`
    ///
    /// Sums the full duration of every segment before the one containing `beat`, then adds
    /// the partial time spent in that segment.
    ///
    /// # Errors
    /// Returns [`TimingError::InvalidBeat`] for negative or non-finite beats.
    pub fn seconds_at(&self, beat: f64) -> Result<f64, TimingError> {
        check_beat(beat)?;
        let index = self.segment_index_at(beat);
        let segment = &self.segments[index];
        Ok(self.segment_starts[index] + (beat - segment.start_beat) * segment.beat_duration_seconds())
    }

    /// Absolute seconds at a segment-relative position
    pub fn seconds_at_position(&self, position: BeatPosition) -> Result<f64, TimingError> {
        self.seconds_at(self.beat_of(position)?)
    }

    /// Seconds elapsed between two beats
    pub fn duration_between(&self, from_beat: f64, to_beat: f64) -> Result<f64, TimingError> {
        Ok(self.seconds_at(to_beat)? - self.seconds_at(from_beat)?)
    }

    /// Inverse conversion: beat reached after `seconds` of playback
    pub fn beat_at(&self, seconds: f64) -> Result<f64, TimingError> {
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(TimingError::InvalidSeconds(seconds));
        }

        let index = self
            .segment_starts
            .partition_point(|start| *start <= seconds)
            .saturating_sub(1);
        let segment = &self.segments[index];
        Ok(segment.start_beat + (seconds - self.segment_starts[index]) * segment.bpm / 60.0)
    }
}

fn check_beat(beat: f64) -> Result<(), TimingError> {
    if beat.is_finite() && beat >= 0.0 {
        Ok(())
    } else {
        Err(TimingError::InvalidBeat(beat))
    }
}

fn validate_table(segments: &[BpmSegment]) -> Result<(), TimingError> {
    let first = segments
        .first()
        .ok_or_else(|| TimingError::InvalidTimingTable("BPM table is empty".to_string()))?;

    if first.start_beat != 0.0 {
        return Err(TimingError::InvalidTimingTable(format!(
            "First BPM segment must start at beat 0 (found {})",
            first.start_beat
        )));
    }

    for (index, segment) in segments.iter().enumerate() {
        if !segment.bpm.is_finite() || segment.bpm <= 0.0 {
            return Err(TimingError::InvalidTimingTable(format!(
                "Segment {} has invalid tempo {}",
                index, segment.bpm
            )));
        }
        if !segment.start_beat.is_finite() {
            return Err(TimingError::InvalidTimingTable(format!(
                "Segment {} has invalid start beat {}",
                index, segment.start_beat
            )));
        }
    }

    for (index, pair) in segments.windows(2).enumerate() {
        if pair[1].start_beat <= pair[0].start_beat {
            return Err(TimingError::InvalidTimingTable(format!(
                "Segment {} starts at beat {} which is not after beat {}",
                index + 1,
                pair[1].start_beat,
                pair[0].start_beat
            )));
        }
    }

    Ok(())
}

fn segment_start_seconds(segments: &[BpmSegment]) -> Vec<f64> {
    let mut starts = Vec::with_capacity(segments.len());
    let mut elapsed = 0.0;
    for (index, segment) in segments.iter().enumerate() {
        starts.push(elapsed);
        if let Some(next) = segments.get(index + 1) {
            elapsed += (next.start_beat - segment.start_beat) * segment.beat_duration_seconds();
        }
    }
    starts
}
