//! Field declarations and the complete field map held by a wizard.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::definition::WizardDefinition;
use super::errors::PersistenceError;

/// How a field is edited, stored and checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// One token out of a fixed set.
    Choice(&'static [&'static str]),
    /// Free text.
    Text,
    /// Digits only; non-digits are stripped on entry.
    Digits,
    /// Digits only, keeping at most the first `n`.
    DigitsUpTo(usize),
    /// Digits only, displayed with thousands separators.
    Currency,
    /// An 8-digit `DDMMYYYY` date string.
    Date,
    /// Whole number computed from another field; `null` when unknown.
    Derived { from: &'static str },
    /// Yes/no answer; `null` until answered.
    Flag,
}

/// A declared field of a wizard instance.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    /// Initial text for text-like kinds, ignored otherwise.
    pub initial: &'static str,
}

impl FieldSpec {
    pub const fn new(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self { name, label, kind, initial: "" }
    }

    pub const fn with_initial(self, initial: &'static str) -> Self {
        Self { initial, ..self }
    }

    pub fn default_value(&self) -> FieldValue {
        match self.kind {
            FieldKind::Derived { .. } => FieldValue::Number(None),
            FieldKind::Flag => FieldValue::Flag(None),
            _ => FieldValue::Text(self.initial.to_string()),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.kind, FieldKind::Digits | FieldKind::DigitsUpTo(_) | FieldKind::Currency | FieldKind::Date)
    }
}

/// The value held by one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(Option<i64>),
    Flag(Option<bool>),
}

impl FieldValue {
    /// Reinterprets a deserialized value against its declared kind. `null`
    /// deserializes as `Number(None)`, so flags need this to come back whole.
    fn conform(self, spec: &FieldSpec) -> Option<FieldValue> {
        match (spec.kind, self) {
            (FieldKind::Derived { .. }, v @ FieldValue::Number(_)) => Some(v),
            (FieldKind::Flag, v @ FieldValue::Flag(_)) => Some(v),
            (FieldKind::Flag, FieldValue::Number(None)) => Some(FieldValue::Flag(None)),
            (FieldKind::Derived { .. } | FieldKind::Flag, _) => None,
            (_, v @ FieldValue::Text(_)) => Some(v),
            _ => None,
        }
    }
}

/// Every declared field of a wizard, by name. A declared field is never
/// absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fields(BTreeMap<String, FieldValue>);

impl Fields {
    /// All fields of `definition` at their defaults.
    pub fn initial(definition: &WizardDefinition) -> Self {
        Self(
            definition
                .fields
                .iter()
                .map(|spec| (spec.name.to_string(), spec.default_value()))
                .collect(),
        )
    }

    /// Rebuilds a complete field map from a saved one: missing fields take
    /// their defaults, undeclared keys are dropped, and a value of the wrong
    /// kind rejects the whole map.
    pub fn reconcile(definition: &WizardDefinition, mut saved: Fields) -> Result<Self, PersistenceError> {
        let mut fields = Self::initial(definition);
        for spec in definition.fields {
            if let Some(value) = saved.0.remove(spec.name) {
                let value = value
                    .conform(spec)
                    .ok_or_else(|| PersistenceError::FieldKind(spec.name.to_string()))?;
                fields.0.insert(spec.name.to_string(), value);
            }
        }
        Ok(fields)
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.get(name)
    }

    /// Text content of a text-like field, empty for anything else.
    pub fn text(&self, name: &str) -> &str {
        match self.0.get(name) {
            Some(FieldValue::Text(s)) => s,
            _ => "",
        }
    }

    pub fn number(&self, name: &str) -> Option<i64> {
        match self.0.get(name) {
            Some(FieldValue::Number(n)) => *n,
            _ => None,
        }
    }

    pub fn flag(&self, name: &str) -> Option<bool> {
        match self.0.get(name) {
            Some(FieldValue::Flag(b)) => *b,
            _ => None,
        }
    }

    pub(crate) fn set(&mut self, name: &str, value: FieldValue) {
        if let Some(slot) = self.0.get_mut(name) {
            *slot = value;
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}
