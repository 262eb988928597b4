// Note representation for the chart editor
// A note is hit at a beat, optionally held for a number of beats, and placed on a lane

use crate::batch::sentinel::{EnumTag, Sentinel, TaggedEnum, TriState};
use crate::chart::entity::{EntityId, SelectableEntity};
use crate::chart::field::{EditError, FieldId, FieldValue};
use crate::selection::SelectionId;
use egui::Rect;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of note, as stored in the runtime chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i8)]
pub enum NoteKind {
    Tap = 0,
    Hold = 1,
    Drag = 2,
    Flick = 3,
    Point = 4,
    FullFlickA = 5,
    FullFlickB = 6,
}

impl NoteKind {
    pub const ALL: [NoteKind; 7] = [
        NoteKind::Tap,
        NoteKind::Hold,
        NoteKind::Drag,
        NoteKind::Flick,
        NoteKind::Point,
        NoteKind::FullFlickA,
        NoteKind::FullFlickB,
    ];
}

impl TaggedEnum for NoteKind {
    fn tag(self) -> EnumTag {
        EnumTag(self as i8)
    }

    fn from_tag(tag: EnumTag) -> Option<Self> {
        usize::try_from(tag.0)
            .ok()
            .and_then(|index| NoteKind::ALL.get(index).copied())
    }
}

/// Effect flags carried by a note
///
/// Only the low three bits are legal. The high bit pattern is reserved as the batch-edit
/// sentinel, so it can never be confused with "no effects" (zero).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct NoteEffect(u8);

/// Raw effect bits outside the legal flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Illegal note effect bits {0:#04x}")]
pub struct IllegalEffectBits(pub u8);

impl NoteEffect {
    pub const NONE: NoteEffect = NoteEffect(0);
    pub const RIPPLE: NoteEffect = NoteEffect(1);
    pub const FULL_LINE: NoteEffect = NoteEffect(2);
    pub const COMMON_EFFECT: NoteEffect = NoteEffect(4);

    const LEGAL_BITS: u8 = 0b111;

    /// Build from raw bits, dropping anything outside the legal flags
    pub fn from_bits_truncate(bits: u8) -> Self {
        NoteEffect(bits & Self::LEGAL_BITS)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn contains(self, other: NoteEffect) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl TryFrom<u8> for NoteEffect {
    type Error = IllegalEffectBits;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        if bits & !Self::LEGAL_BITS != 0 {
            return Err(IllegalEffectBits(bits));
        }
        Ok(NoteEffect(bits))
    }
}

impl From<NoteEffect> for u8 {
    fn from(effect: NoteEffect) -> u8 {
        effect.0
    }
}

impl std::ops::BitOr for NoteEffect {
    type Output = NoteEffect;
    fn bitor(self, rhs: NoteEffect) -> NoteEffect {
        NoteEffect(self.0 | rhs.0)
    }
}

impl Sentinel for NoteEffect {
    const MIXED: Self = NoteEffect(0x80);

    fn is_mixed(&self) -> bool {
        self.0 == Self::MIXED.0
    }

    fn same_as(&self, other: &Self) -> bool {
        self == other
    }
}

impl fmt::Debug for NoteEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NoteEffect({})", self)
    }
}

impl fmt::Display for NoteEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_mixed() {
            return write!(f, "mixed");
        }
        if self.is_empty() {
            return write!(f, "none");
        }

        let names: Vec<&str> = [
            (NoteEffect::RIPPLE, "ripple"),
            (NoteEffect::FULL_LINE, "full-line"),
            (NoteEffect::COMMON_EFFECT, "common"),
        ]
        .iter()
        .filter(|(flag, _)| self.contains(*flag))
        .map(|(_, name)| *name)
        .collect();
        write!(f, "{}", names.join("|"))
    }
}

/// A note in the edit-side chart
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    /// Unique identifier for this note
    pub id: EntityId,

    pub kind: NoteKind,

    /// Beat at which the note is hit
    pub hit_beat: f64,

    /// Hold length in beats (0 for non-hold notes)
    pub hold_beat: f64,

    pub effect: NoteEffect,

    /// Horizontal position on the judge line
    pub lane_position: f64,

    pub is_clockwise: bool,

    /// Another note is hit at the same time (multi-press marker, filled in on export)
    pub has_simultaneous: bool,

    /// Screen-space bounds, supplied by the view layer
    pub bounds: Rect,

    selected_by: Option<SelectionId>,
}

impl Note {
    /// Creates a new note
    pub fn new(id: EntityId, kind: NoteKind, hit_beat: f64) -> Self {
        assert!(
            hit_beat.is_finite() && hit_beat >= 0.0,
            "Note hit beat must be a finite beat >= 0"
        );

        Self {
            id,
            kind,
            hit_beat,
            hold_beat: 0.0,
            effect: NoteEffect::NONE,
            lane_position: 0.0,
            is_clockwise: false,
            has_simultaneous: false,
            bounds: Rect::NOTHING,
            selected_by: None,
        }
    }

    pub fn with_hold(mut self, hold_beat: f64) -> Self {
        assert!(
            hold_beat.is_finite() && hold_beat >= 0.0,
            "Note hold length must be a finite beat count >= 0"
        );
        self.hold_beat = hold_beat;
        self
    }

    pub fn with_lane_position(mut self, lane_position: f64) -> Self {
        self.lane_position = lane_position;
        self
    }

    pub fn with_effect(mut self, effect: NoteEffect) -> Self {
        self.effect = effect;
        self
    }

    pub fn with_clockwise(mut self, is_clockwise: bool) -> Self {
        self.is_clockwise = is_clockwise;
        self
    }

    pub fn with_bounds(mut self, bounds: Rect) -> Self {
        self.bounds = bounds;
        self
    }

    /// Beat at which the hold ends
    pub fn end_beat(&self) -> f64 {
        self.hit_beat + self.hold_beat
    }
}

impl SelectableEntity for Note {
    fn id(&self) -> EntityId {
        self.id
    }

    fn editable_fields(&self) -> &'static [FieldId] {
        FieldId::NOTE_FIELDS
    }

    fn field(&self, field: FieldId) -> Option<FieldValue> {
        let value = match field {
            FieldId::HitBeat => FieldValue::Number(self.hit_beat),
            FieldId::HoldBeat => FieldValue::Number(self.hold_beat),
            FieldId::NoteKind => FieldValue::Tag(self.kind.tag()),
            FieldId::Effect => FieldValue::Effect(self.effect),
            FieldId::LanePosition => FieldValue::Number(self.lane_position),
            FieldId::Clockwise => FieldValue::Flag(TriState::from(self.is_clockwise)),
            _ => return None,
        };
        Some(value)
    }

    fn set_field(&mut self, field: FieldId, value: FieldValue) -> Result<(), EditError> {
        match field {
            FieldId::HitBeat => self.hit_beat = value.beat(field)?,
            FieldId::HoldBeat => self.hold_beat = value.beat(field)?,
            FieldId::NoteKind => {
                let tag = value.tag(field)?;
                self.kind = NoteKind::from_tag(tag).ok_or(EditError::InvalidTag(tag.0))?;
            }
            FieldId::Effect => self.effect = value.effect(field)?,
            FieldId::LanePosition => self.lane_position = value.number(field)?,
            FieldId::Clockwise => self.is_clockwise = value.flag(field)?,
            _ => return Err(EditError::UnsupportedField(field)),
        }
        Ok(())
    }

    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn selected_by(&self) -> Option<SelectionId> {
        self.selected_by
    }

    fn set_selected_by(&mut self, owner: Option<SelectionId>) {
        self.selected_by = owner;
    }
}
