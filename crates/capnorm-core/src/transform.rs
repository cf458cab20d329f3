//! Record transform engine.
//!
//! Turns the raw `skills` / `workflows` columns of an [`AgentRow`] into parsed
//! label lists, normalizes them element-wise, and reports whether anything
//! changed. A row with an unparseable field, or without a text id, is
//! rejected as a whole.

use crate::normalize::normalize;
use crate::store::AgentRow;
use serde::Serialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// RecordField
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordField {
    Id,
    Skills,
    Workflows,
}

impl RecordField {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordField::Id => "id",
            RecordField::Skills => "skills",
            RecordField::Workflows => "workflows",
        }
    }
}

impl std::fmt::Display for RecordField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A column that keeps the record from being migrated: a label list that is
/// not a JSON array of strings, or an id that is NULL or not text.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("malformed {field}: {reason}")]
pub struct MalformedField {
    pub field: RecordField,
    pub reason: String,
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// The key `update` needs for this row.
pub fn record_key(row: &AgentRow) -> std::result::Result<&str, MalformedField> {
    row.id.as_deref().ok_or_else(|| MalformedField {
        field: RecordField::Id,
        reason: "id is NULL or not text".to_string(),
    })
}

/// Parse a raw label column.
///
/// `NULL` and the empty string both mean "no labels". Anything else must be a
/// JSON array of strings.
pub fn parse_label_list(
    field: RecordField,
    raw: Option<&str>,
) -> std::result::Result<Vec<String>, MalformedField> {
    match raw {
        None | Some("") => Ok(Vec::new()),
        Some(text) => serde_json::from_str::<Vec<String>>(text).map_err(|e| MalformedField {
            field,
            reason: e.to_string(),
        }),
    }
}

/// Normalize every label, keeping order and length.
pub fn normalize_labels(labels: &[String]) -> Vec<String> {
    labels.iter().map(|l| normalize(l)).collect()
}

// ---------------------------------------------------------------------------
// LabelFields / RecordChange
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LabelFields {
    pub skills: Vec<String>,
    pub workflows: Vec<String>,
}

impl LabelFields {
    pub fn parse(row: &AgentRow) -> std::result::Result<Self, MalformedField> {
        Ok(Self {
            skills: parse_label_list(RecordField::Skills, row.skills_raw.as_deref())?,
            workflows: parse_label_list(RecordField::Workflows, row.workflows_raw.as_deref())?,
        })
    }

    pub fn normalized(&self) -> Self {
        Self {
            skills: normalize_labels(&self.skills),
            workflows: normalize_labels(&self.workflows),
        }
    }

    /// Serialize both lists back to the JSON text stored in the columns.
    pub fn to_raw(&self) -> (String, String) {
        // Vec<String> serialization cannot fail.
        let skills = serde_json::to_string(&self.skills).unwrap_or_else(|_| "[]".to_string());
        let workflows =
            serde_json::to_string(&self.workflows).unwrap_or_else(|_| "[]".to_string());
        (skills, workflows)
    }
}

/// Before/after view of one record's label fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordChange {
    pub before: LabelFields,
    pub after: LabelFields,
}

impl RecordChange {
    /// List-level inequality on either field.
    pub fn is_changed(&self) -> bool {
        self.before != self.after
    }
}

/// Parse and normalize one row. No partial result is produced for a row with
/// a malformed field.
pub fn transform_row(row: &AgentRow) -> std::result::Result<RecordChange, MalformedField> {
    record_key(row)?;
    let before = LabelFields::parse(row)?;
    let after = before.normalized();
    Ok(RecordChange { before, after })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
