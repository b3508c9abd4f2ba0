use std::collections::BTreeMap;

use crate::model::FormField;

/// Seam over the externally-owned form state. The engine reads a snapshot
/// once at classification time and writes values back through `set`; it
/// never owns the form and never re-runs the form's own validation.
pub trait FormAdapter {
    /// Current values for the requested fields. Fields with no value may be
    /// omitted from the returned map; absence reads as empty.
    fn get(&self, fields: &[FormField]) -> BTreeMap<FormField, String>;

    /// Write the given values into the form, overwriting existing ones.
    fn set(&mut self, values: &BTreeMap<FormField, String>);
}

/// Reference in-memory form, used by tests and embedding hosts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryForm {
    values: BTreeMap<FormField, String>,
}

impl MemoryForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, field: FormField, value: &str) -> Self {
        self.values.insert(field, value.to_string());
        self
    }

    pub fn value(&self, field: FormField) -> &str {
        self.values.get(&field).map(String::as_str).unwrap_or("")
    }
}

impl FormAdapter for MemoryForm {
    fn get(&self, fields: &[FormField]) -> BTreeMap<FormField, String> {
        fields
            .iter()
            .filter_map(|f| self.values.get(f).map(|v| (*f, v.clone())))
            .collect()
    }

    fn set(&mut self, values: &BTreeMap<FormField, String>) {
        for (field, value) in values {
            self.values.insert(*field, value.clone());
        }
    }
}
