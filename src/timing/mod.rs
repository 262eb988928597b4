// Timing module - beat to absolute time conversion
// The BPM table comes from chart metadata; the clock only ever reads an immutable copy of it.

pub mod clock;

pub use clock::{BeatClock, BeatPosition, BpmSegment, TimingError};
