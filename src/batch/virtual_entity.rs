// VirtualEntity - one value per field shared by the whole selection

use crate::chart::entity::SelectableEntity;
use crate::chart::field::{EditError, FieldId, FieldValue};
use std::collections::BTreeMap;
use std::mem;

/// Batch proxy edited by the property panel
///
/// Holds the fields every selected entity has in common. A field whose entities disagree
/// holds the sentinel of its type.
#[derive(Debug, Clone, Default)]
pub struct VirtualEntity {
    fields: BTreeMap<FieldId, FieldValue>,
}

impl VirtualEntity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collapse a group of entities into one proxy
    pub fn from_entities<'a, E, I>(entities: I) -> Self
    where
        E: SelectableEntity + 'a,
        I: IntoIterator<Item = &'a E>,
    {
        let mut entities = entities.into_iter();
        let Some(first) = entities.next() else {
            return Self::default();
        };

        let mut fields: BTreeMap<FieldId, FieldValue> = first
            .editable_fields()
            .iter()
            .filter_map(|field| first.field(*field).map(|value| (*field, value)))
            .collect();

        for entity in entities {
            fields.retain(|field, common| match entity.field(*field) {
                Some(value) => {
                    *common = common.merge(value);
                    true
                }
                None => false,
            });
        }

        Self { fields }
    }

    pub fn get(&self, field: FieldId) -> Option<FieldValue> {
        self.fields.get(&field).copied()
    }

    /// Overwrite a field, keeping its value type
    ///
    /// The sentinel is accepted here: the proxy may hold it, real entities may not.
    pub fn set(&mut self, field: FieldId, value: FieldValue) -> Result<(), EditError> {
        let slot = self
            .fields
            .get_mut(&field)
            .ok_or(EditError::UnsupportedField(field))?;

        if mem::discriminant(slot) != mem::discriminant(&value) {
            return Err(EditError::TypeMismatch {
                field,
                expected: type_name(slot),
            });
        }

        *slot = value;
        Ok(())
    }

    pub fn contains(&self, field: FieldId) -> bool {
        self.fields.contains_key(&field)
    }

    pub fn is_mixed(&self, field: FieldId) -> bool {
        self.fields.get(&field).is_some_and(FieldValue::is_mixed)
    }

    pub fn fields(&self) -> Vec<FieldId> {
        self.fields.keys().copied().collect()
    }

    pub fn mixed_fields(&self) -> Vec<FieldId> {
        self.fields
            .iter()
            .filter(|(_, value)| value.is_mixed())
            .map(|(field, _)| *field)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldId, FieldValue)> + '_ {
        self.fields.iter().map(|(field, value)| (*field, *value))
    }

    /// Sentinel-aware comparison of two proxies
    pub fn same_as(&self, other: &VirtualEntity) -> bool {
        self.fields.len() == other.fields.len()
            && self
                .iter()
                .all(|(field, value)| other.get(field).is_some_and(|o| value.same_as(&o)))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

fn type_name(value: &FieldValue) -> &'static str {
    match value {
        FieldValue::Number(_) => "number",
        FieldValue::Tag(_) => "tag",
        FieldValue::Effect(_) => "effect flags",
        FieldValue::Flag(_) => "boolean",
    }
}
