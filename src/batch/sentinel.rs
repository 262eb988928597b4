// Sentinel encodings for "selected entities disagree"
//
// Every field type that can appear on the batch proxy reserves one value that no real
// entity can hold. A type without such a value cannot implement `Sentinel` and therefore
// cannot be registered as a batch-editable field at all.

use std::fmt;

/// A value type with a reserved "mixed" encoding
pub trait Sentinel: Copy + fmt::Debug {
    /// The reserved value meaning "entities disagree"
    const MIXED: Self;

    fn is_mixed(&self) -> bool;

    /// Equality where two mixed values are equal
    ///
    /// Plain `PartialEq` is not enough for floats: NaN never equals itself, which would make
    /// an untouched mixed field look edited on every comparison.
    fn same_as(&self, other: &Self) -> bool;

    /// Fold another entity's value into a running common value
    fn merge(self, other: Self) -> Self {
        if self.same_as(&other) { self } else { Self::MIXED }
    }
}

impl Sentinel for f64 {
    const MIXED: Self = f64::NAN;

    fn is_mixed(&self) -> bool {
        self.is_nan()
    }

    fn same_as(&self, other: &Self) -> bool {
        (self.is_nan() && other.is_nan()) || self == other
    }
}

/// Integer tag of an enum field, -1 reserved for mixed
///
/// Enum types expose themselves to the property editor through [`TaggedEnum`], whose tags
/// are always non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnumTag(pub i8);

impl Sentinel for EnumTag {
    const MIXED: Self = EnumTag(-1);

    fn is_mixed(&self) -> bool {
        self.0 == -1
    }

    fn same_as(&self, other: &Self) -> bool {
        self == other
    }
}

impl fmt::Display for EnumTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_mixed() {
            write!(f, "mixed")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Enums that can be edited through an [`EnumTag`]
pub trait TaggedEnum: Sized + Copy {
    fn tag(self) -> EnumTag;
    fn from_tag(tag: EnumTag) -> Option<Self>;
}

/// Boolean with an explicit third "mixed" state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriState {
    False,
    True,
    Mixed,
}

impl TriState {
    /// Concrete value, or None when mixed
    pub fn as_bool(self) -> Option<bool> {
        match self {
            TriState::False => Some(false),
            TriState::True => Some(true),
            TriState::Mixed => None,
        }
    }
}

impl From<bool> for TriState {
    fn from(value: bool) -> Self {
        if value { TriState::True } else { TriState::False }
    }
}

impl Sentinel for TriState {
    const MIXED: Self = TriState::Mixed;

    fn is_mixed(&self) -> bool {
        *self == TriState::Mixed
    }

    fn same_as(&self, other: &Self) -> bool {
        self == other
    }
}
