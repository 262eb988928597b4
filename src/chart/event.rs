// Timed events - value animations between two beats (line movement, rotation, alpha...)

use crate::batch::sentinel::{EnumTag, TaggedEnum};
use crate::chart::entity::{EntityId, SelectableEntity};
use crate::chart::field::{EditError, FieldId, FieldValue};
use crate::selection::SelectionId;
use egui::Rect;
use serde::{Deserialize, Serialize};

/// Interpolation preset applied between start and end value
///
/// The editor treats it as an opaque id; only the runtime samples it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(i8)]
pub enum Curve {
    #[default]
    Linear = 0,
    EaseInQuad = 1,
    EaseOutQuad = 2,
    EaseInOutQuad = 3,
    EaseInCubic = 4,
    EaseOutCubic = 5,
    Step = 6,
}

impl Curve {
    pub const ALL: [Curve; 7] = [
        Curve::Linear,
        Curve::EaseInQuad,
        Curve::EaseOutQuad,
        Curve::EaseInOutQuad,
        Curve::EaseInCubic,
        Curve::EaseOutCubic,
        Curve::Step,
    ];

    /// Map normalized progress `t` (clamped to [0, 1]) through the curve
    pub fn sample(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Curve::Linear => t,
            Curve::EaseInQuad => t * t,
            Curve::EaseOutQuad => t * (2.0 - t),
            Curve::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
            Curve::EaseInCubic => t * t * t,
            Curve::EaseOutCubic => {
                let u = t - 1.0;
                u * u * u + 1.0
            }
            Curve::Step => {
                if t < 1.0 {
                    0.0
                } else {
                    1.0
                }
            }
        }
    }
}

impl TaggedEnum for Curve {
    fn tag(self) -> EnumTag {
        EnumTag(self as i8)
    }

    fn from_tag(tag: EnumTag) -> Option<Self> {
        usize::try_from(tag.0)
            .ok()
            .and_then(|index| Curve::ALL.get(index).copied())
    }
}

/// A value animation between two beats
#[derive(Debug, Clone, PartialEq)]
pub struct TimedEvent {
    pub id: EntityId,
    pub start_beat: f64,
    pub end_beat: f64,
    pub start_value: f64,
    pub end_value: f64,
    pub curve: Curve,

    /// Screen-space bounds, supplied by the view layer
    pub bounds: Rect,

    selected_by: Option<SelectionId>,
}

impl TimedEvent {
    pub fn new(id: EntityId, start_beat: f64, end_beat: f64) -> Self {
        assert!(
            start_beat.is_finite() && start_beat >= 0.0,
            "Event start beat must be a finite beat >= 0"
        );
        assert!(
            end_beat.is_finite() && end_beat >= start_beat,
            "Event end beat must not precede its start beat"
        );

        Self {
            id,
            start_beat,
            end_beat,
            start_value: 0.0,
            end_value: 0.0,
            curve: Curve::Linear,
            bounds: Rect::NOTHING,
            selected_by: None,
        }
    }

    pub fn with_values(mut self, start_value: f64, end_value: f64) -> Self {
        self.start_value = start_value;
        self.end_value = end_value;
        self
    }

    pub fn with_curve(mut self, curve: Curve) -> Self {
        self.curve = curve;
        self
    }

    pub fn with_bounds(mut self, bounds: Rect) -> Self {
        self.bounds = bounds;
        self
    }
}

impl SelectableEntity for TimedEvent {
    fn id(&self) -> EntityId {
        self.id
    }

    fn editable_fields(&self) -> &'static [FieldId] {
        FieldId::EVENT_FIELDS
    }

    fn field(&self, field: FieldId) -> Option<FieldValue> {
        let value = match field {
            FieldId::StartBeat => FieldValue::Number(self.start_beat),
            FieldId::EndBeat => FieldValue::Number(self.end_beat),
            FieldId::StartValue => FieldValue::Number(self.start_value),
            FieldId::EndValue => FieldValue::Number(self.end_value),
            FieldId::Curve => FieldValue::Tag(self.curve.tag()),
            _ => return None,
        };
        Some(value)
    }

    fn set_field(&mut self, field: FieldId, value: FieldValue) -> Result<(), EditError> {
        match field {
            FieldId::StartBeat => {
                let start = value.beat(field)?;
                check_range(start, self.end_beat)?;
                self.start_beat = start;
            }
            FieldId::EndBeat => {
                let end = value.beat(field)?;
                check_range(self.start_beat, end)?;
                self.end_beat = end;
            }
            FieldId::StartValue => self.start_value = value.number(field)?,
            FieldId::EndValue => self.end_value = value.number(field)?,
            FieldId::Curve => {
                let tag = value.tag(field)?;
                self.curve = Curve::from_tag(tag).ok_or(EditError::InvalidTag(tag.0))?;
            }
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

fn check_range(start: f64, end: f64) -> Result<(), EditError> {
    if end < start {
        return Err(EditError::InvertedRange { start, end });
    }
    Ok(())
}
