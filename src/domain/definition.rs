//! A wizard instance described as data: its fields, its numbered steps with
//! their validation rules, and how a completed application is summarized.

use super::fields::{FieldKind, FieldSpec, Fields};

/// One requirement checked by a step's predicate.
#[derive(Debug, Clone, Copy)]
pub enum Rule {
    /// Non-empty and one of the field's allowed tokens.
    Choice(&'static str),
    /// Non-empty after trimming. Numeric kinds must also parse.
    Required(&'static [&'static str]),
    /// May be empty; when present must parse as a non-negative integer.
    OptionalDigits(&'static str),
    /// Every listed flag has been answered.
    Answered(&'static [&'static str]),
    /// Non-empty and at least `min` characters long.
    MinLength { field: &'static str, min: usize },
    /// Looks like `local@domain.tld`.
    Email(&'static str),
    /// Applies the rules listed for whichever token `selector` holds.
    Branch {
        selector: &'static str,
        branches: &'static [(&'static str, &'static [Rule])],
    },
    /// Time at an address: at least one of years/months non-zero and
    /// months within `0..=11`.
    Tenure { years: &'static str, months: &'static str },
    /// A date field whose derived age must fall within `min..=max`.
    Age { date: &'static str, age: &'static str, min: i64, max: i64 },
}

/// A numbered screen of the wizard.
#[derive(Debug, Clone, Copy)]
pub struct StepSpec {
    pub title: &'static str,
    /// Fields edited on this step, in display order.
    pub fields: &'static [&'static str],
    pub rules: &'static [Rule],
    /// Description shown when a required answer is missing.
    pub missing: &'static str,
    /// Descriptions that replace `missing` when the named field is the
    /// first one failing.
    pub field_missing: &'static [(&'static str, &'static str)],
}

impl StepSpec {
    /// Description for a failure naming `fields`, most specific first.
    pub fn missing_for(&self, fields: &[&str]) -> &'static str {
        fields
            .first()
            .and_then(|first| self.field_missing.iter().find(|(name, _)| name == first))
            .map_or(self.missing, |(_, text)| *text)
    }
}

/// One entry of the structured notes blob.
#[derive(Debug, Clone, Copy)]
pub enum NoteEntry {
    /// `key: <value of field>`
    Field { key: &'static str, field: &'static str },
    /// `key: { sub: <value of field>, ... }`
    Group { key: &'static str, entries: &'static [(&'static str, &'static str)] },
    /// `key: "value"`
    Constant { key: &'static str, value: &'static str },
}

/// Title and description of a notice shown after a submission attempt.
#[derive(Debug, Clone, Copy)]
pub struct Message {
    pub title: &'static str,
    pub detail: &'static str,
}

/// Fields copied verbatim into the contact columns of a submission.
#[derive(Debug, Clone, Copy)]
pub struct ContactFields {
    pub first_name: &'static str,
    pub last_name: &'static str,
    pub email: &'static str,
    pub phone: &'static str,
}

/// A complete wizard instance.
#[derive(Debug)]
pub struct WizardDefinition {
    /// Stable identifier, also used as the telemetry form type.
    pub id: &'static str,
    pub name: &'static str,
    /// Persistence store key for in-progress state.
    pub storage_key: &'static str,
    pub fields: &'static [FieldSpec],
    pub steps: &'static [StepSpec],
    pub contact: ContactFields,
    pub notes: &'static [NoteEntry],
    pub summary: fn(&Fields) -> String,
    pub submitted: Message,
    pub submit_failed: Message,
    /// Steps reachable through an edit shortcut from any later step.
    pub edit_shortcuts: &'static [usize],
}

impl WizardDefinition {
    pub fn total_steps(&self) -> usize {
        self.steps.len()
    }

    /// The pseudo-step reached only after a successful submission.
    pub fn terminal_step(&self) -> usize {
        self.steps.len() + 1
    }

    /// Step `index` (1-based), if it is a data-entry step.
    pub fn step(&self, index: usize) -> Option<&StepSpec> {
        index.checked_sub(1).and_then(|i| self.steps.get(i))
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Derived fields computed from `source`.
    pub fn dependents_of<'a>(&'a self, source: &'a str) -> impl Iterator<Item = &'a FieldSpec> + 'a {
        self.fields
            .iter()
            .filter(move |f| matches!(f.kind, FieldKind::Derived { from } if from == source))
    }
}
