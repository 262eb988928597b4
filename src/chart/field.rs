// Editable fields shared by every selectable chart entity

use crate::batch::sentinel::{EnumTag, Sentinel, TriState};
use crate::chart::note::NoteEffect;
use std::fmt;

/// Identifier of one editable property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldId {
    // Note fields
    HitBeat,
    HoldBeat,
    NoteKind,
    Effect,
    LanePosition,
    Clockwise,

    // Timed event fields
    StartBeat,
    EndBeat,
    StartValue,
    EndValue,
    Curve,
}

impl FieldId {
    pub const NOTE_FIELDS: &'static [FieldId] = &[
        FieldId::HitBeat,
        FieldId::HoldBeat,
        FieldId::NoteKind,
        FieldId::Effect,
        FieldId::LanePosition,
        FieldId::Clockwise,
    ];

    pub const EVENT_FIELDS: &'static [FieldId] = &[
        FieldId::StartBeat,
        FieldId::EndBeat,
        FieldId::StartValue,
        FieldId::EndValue,
        FieldId::Curve,
    ];

    /// Property-panel label
    pub fn label(self) -> &'static str {
        match self {
            FieldId::HitBeat => "Hit beat",
            FieldId::HoldBeat => "Hold beats",
            FieldId::NoteKind => "Note type",
            FieldId::Effect => "Effect",
            FieldId::LanePosition => "Position X",
            FieldId::Clockwise => "Clockwise",
            FieldId::StartBeat => "Start beat",
            FieldId::EndBeat => "End beat",
            FieldId::StartValue => "Start value",
            FieldId::EndValue => "End value",
            FieldId::Curve => "Curve",
        }
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Value of a field, in its sentinel-capable encoding
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    Number(f64),
    Tag(EnumTag),
    Effect(NoteEffect),
    Flag(TriState),
}

impl FieldValue {
    pub fn is_mixed(&self) -> bool {
        match self {
            FieldValue::Number(v) => v.is_mixed(),
            FieldValue::Tag(v) => v.is_mixed(),
            FieldValue::Effect(v) => v.is_mixed(),
            FieldValue::Flag(v) => v.is_mixed(),
        }
    }

    /// Sentinel of the same variant
    pub fn mixed_like(&self) -> FieldValue {
        match self {
            FieldValue::Number(_) => FieldValue::Number(f64::MIXED),
            FieldValue::Tag(_) => FieldValue::Tag(EnumTag::MIXED),
            FieldValue::Effect(_) => FieldValue::Effect(NoteEffect::MIXED),
            FieldValue::Flag(_) => FieldValue::Flag(TriState::MIXED),
        }
    }

    /// Sentinel-aware equality; values of different variants are never the same
    pub fn same_as(&self, other: &FieldValue) -> bool {
        match (self, other) {
            (FieldValue::Number(a), FieldValue::Number(b)) => a.same_as(b),
            (FieldValue::Tag(a), FieldValue::Tag(b)) => a.same_as(b),
            (FieldValue::Effect(a), FieldValue::Effect(b)) => a.same_as(b),
            (FieldValue::Flag(a), FieldValue::Flag(b)) => a.same_as(b),
            _ => false,
        }
    }

    /// Fold another entity's value into a running common value
    pub fn merge(self, other: FieldValue) -> FieldValue {
        match (self, other) {
            (FieldValue::Number(a), FieldValue::Number(b)) => FieldValue::Number(a.merge(b)),
            (FieldValue::Tag(a), FieldValue::Tag(b)) => FieldValue::Tag(a.merge(b)),
            (FieldValue::Effect(a), FieldValue::Effect(b)) => FieldValue::Effect(a.merge(b)),
            (FieldValue::Flag(a), FieldValue::Flag(b)) => FieldValue::Flag(a.merge(b)),
            (a, _) => a.mixed_like(),
        }
    }

    /// Concrete number for `field`
    pub fn number(self, field: FieldId) -> Result<f64, EditError> {
        match self {
            FieldValue::Number(v) if v.is_mixed() => Err(EditError::MixedValue(field)),
            FieldValue::Number(v) if !v.is_finite() => Err(EditError::InvalidNumber { field, value: v }),
            FieldValue::Number(v) => Ok(v),
            _ => Err(EditError::TypeMismatch {
                field,
                expected: "number",
            }),
        }
    }

    /// Concrete non-negative beat for `field`
    pub fn beat(self, field: FieldId) -> Result<f64, EditError> {
        let value = self.number(field)?;
        if value < 0.0 {
            return Err(EditError::InvalidNumber { field, value });
        }
        Ok(value)
    }

    pub fn tag(self, field: FieldId) -> Result<EnumTag, EditError> {
        match self {
            FieldValue::Tag(v) if v.is_mixed() => Err(EditError::MixedValue(field)),
            FieldValue::Tag(v) => Ok(v),
            _ => Err(EditError::TypeMismatch {
                field,
                expected: "tag",
            }),
        }
    }

    pub fn effect(self, field: FieldId) -> Result<NoteEffect, EditError> {
        match self {
            FieldValue::Effect(v) if v.is_mixed() => Err(EditError::MixedValue(field)),
            FieldValue::Effect(v) => Ok(v),
            _ => Err(EditError::TypeMismatch {
                field,
                expected: "effect flags",
            }),
        }
    }

    pub fn flag(self, field: FieldId) -> Result<bool, EditError> {
        match self {
            FieldValue::Flag(v) => v.as_bool().ok_or(EditError::MixedValue(field)),
            _ => Err(EditError::TypeMismatch {
                field,
                expected: "boolean",
            }),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_mixed() {
            return write!(f, "mixed");
        }
        match self {
            FieldValue::Number(v) => write!(f, "{}", v),
            FieldValue::Tag(v) => write!(f, "{}", v),
            FieldValue::Effect(v) => write!(f, "{}", v),
            FieldValue::Flag(v) => write!(f, "{}", *v == TriState::True),
        }
    }
}

/// Errors raised when writing a field on a real entity
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EditError {
    #[error("Field '{0}' is not editable on this entity")]
    UnsupportedField(FieldId),

    #[error("Field '{field}' expects a {expected} value")]
    TypeMismatch {
        field: FieldId,
        expected: &'static str,
    },

    #[error("Tag {0} is out of range")]
    InvalidTag(i8),

    #[error("Field '{field}' cannot hold {value}")]
    InvalidNumber { field: FieldId, value: f64 },

    #[error("Mixed value cannot be written to field '{0}'")]
    MixedValue(FieldId),

    #[error("Event would end at beat {end} before it starts at beat {start}")]
    InvertedRange { start: f64, end: f64 },
}
