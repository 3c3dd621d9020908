//! Assembly of the final submission from a completed field map.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::definition::{NoteEntry, WizardDefinition};
use super::fields::Fields;

pub const INITIAL_STATUS: &str = "new";

/// The structured result of a completed wizard, built once at submit time.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionPayload {
    pub contact_name: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub summary_message: String,
    pub structured_notes: Value,
    pub status: &'static str,
}

/// The row handed to a submission sink: `notes` carries the serialized
/// structured notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRow {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub notes: String,
    pub status: String,
}

impl SubmissionPayload {
    pub fn to_row(&self) -> Result<SubmissionRow, serde_json::Error> {
        Ok(SubmissionRow {
            name: self.contact_name.clone(),
            email: self.contact_email.clone(),
            phone: self.contact_phone.clone(),
            message: self.summary_message.clone(),
            notes: serde_json::to_string_pretty(&self.structured_notes)?,
            status: self.status.to_string(),
        })
    }
}

/// Builds the payload for `fields`. The caller is responsible for having
/// validated them.
pub fn assemble(definition: &WizardDefinition, fields: &Fields) -> SubmissionPayload {
    let contact = &definition.contact;
    let name = format!("{} {}", fields.text(contact.first_name).trim(), fields.text(contact.last_name).trim());

    SubmissionPayload {
        contact_name: name.trim().to_string(),
        contact_email: fields.text(contact.email).trim().to_string(),
        contact_phone: fields.text(contact.phone).trim().to_string(),
        summary_message: (definition.summary)(fields),
        structured_notes: structured_notes(definition, fields),
        status: INITIAL_STATUS,
    }
}

fn field_json(fields: &Fields, name: &str) -> Value {
    fields
        .get(name)
        .and_then(|v| serde_json::to_value(v).ok())
        .unwrap_or(Value::Null)
}

/// Groups the field map into the notes layout of `definition`.
pub fn structured_notes(definition: &WizardDefinition, fields: &Fields) -> Value {
    let mut notes = Map::new();
    for entry in definition.notes {
        match *entry {
            NoteEntry::Field { key, field } => {
                notes.insert(key.to_string(), field_json(fields, field));
            }
            NoteEntry::Group { key, entries } => {
                let group = entries
                    .iter()
                    .map(|(sub, field)| (sub.to_string(), field_json(fields, field)))
                    .collect();
                notes.insert(key.to_string(), Value::Object(group));
            }
            NoteEntry::Constant { key, value } => {
                notes.insert(key.to_string(), Value::String(value.to_string()));
            }
        }
    }
    Value::Object(notes)
}

/// Parses the `notes` column of a stored row back into its grouped form.
pub fn parse_notes(notes: &str) -> Result<Value, serde_json::Error> {
    serde_json::from_str(notes)
}

/// Flattens grouped notes into `section.key: value` lines for a detail view.
pub fn detail_lines(notes: &Value) -> Vec<(String, String)> {
    let mut lines = Vec::new();
    flatten("", notes, &mut lines);
    lines
}

fn flatten(prefix: &str, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            for (key, inner) in map {
                let path = if prefix.is_empty() { key.clone() } else { format!("{prefix}.{key}") };
                flatten(&path, inner, out);
            }
        }
        Value::String(s) if s.is_empty() => out.push((prefix.to_string(), "-".to_string())),
        Value::String(s) => out.push((prefix.to_string(), s.clone())),
        Value::Null => out.push((prefix.to_string(), "-".to_string())),
        Value::Bool(b) => out.push((prefix.to_string(), if *b { "Yes" } else { "No" }.to_string())),
        other => out.push((prefix.to_string(), other.to_string())),
    }
}
