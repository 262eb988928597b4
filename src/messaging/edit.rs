// Property panel edits sent to the editor

use crate::chart::field::{FieldId, FieldValue};

/// One field written on the batch proxy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldEdit {
    pub field: FieldId,
    pub value: FieldValue,
}

impl FieldEdit {
    pub fn new(field: FieldId, value: FieldValue) -> Self {
        Self { field, value }
    }

    pub fn number(field: FieldId, value: f64) -> Self {
        Self::new(field, FieldValue::Number(value))
    }
}
