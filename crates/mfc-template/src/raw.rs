//! # Raw Template Wire Shapes
//!
//! Serde models for the template document exactly as the backend stores
//! it, including both historical section shapes. These types are lenient
//! by design: optional fields carry `#[serde(default)]`, unknown fields
//! are ignored, and field aliases cover the renames the backend has gone
//! through. Strictness lives in [`crate::normalize`], not here.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use mfc_core::TemplateId;

use crate::field_type::FieldType;

/// A checklist template as returned by the backend, pre-normalization.
///
/// `template_data` may be a JSON object or a JSON-encoded *string*
/// containing the sections document; both occur in production data.
/// It is kept as a raw [`Value`] here and parsed by the normalizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTemplate {
    pub id: TemplateId,
    pub name: String,
    /// Template category (e.g. `"pre_departure"`, `"mlc"`, `"biosecurity"`).
    #[serde(default)]
    pub template_type: Option<String>,
    /// The sections document: object, JSON-encoded string, or absent.
    #[serde(default)]
    pub template_data: Option<Value>,
}

/// One section of a template document. Carries either `fields` (flat
/// legacy shape) or `subsections` (nested legacy shape); the normalizer
/// decides which, per section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSection {
    #[serde(alias = "section_name")]
    pub name: String,
    #[serde(default)]
    pub fields: Option<Vec<RawField>>,
    #[serde(default)]
    pub subsections: Option<Vec<RawSubsection>>,
}

/// A subsection within the nested legacy shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSubsection {
    #[serde(alias = "subsection_name")]
    pub name: String,
    #[serde(default)]
    pub items: Vec<RawField>,
}

/// One answerable unit as authored in the template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawField {
    #[serde(alias = "item_id")]
    pub field_id: String,
    #[serde(default)]
    pub description: String,
    /// Responsible-party label (person in charge).
    #[serde(default)]
    pub pic: String,
    #[serde(default)]
    pub guidance: String,
    #[serde(default)]
    pub field_type: FieldType,
    #[serde(default)]
    pub is_mandatory: bool,
    #[serde(default)]
    pub requires_evidence: bool,
    #[serde(default)]
    pub table_structure: Option<TableStructure>,
}

/// Column and row layout for table-valued items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableStructure {
    pub columns: Vec<TableColumn>,
    /// When present, row identity is fixed by the template (e.g. an MLC
    /// or biosecurity questionnaire) and only answer columns are editable.
    #[serde(default)]
    pub predefined_rows: Option<Vec<PredefinedRow>>,
}

impl TableStructure {
    /// Whether this table has template-owned rows.
    pub fn is_predefined(&self) -> bool {
        self.predefined_rows
            .as_ref()
            .is_some_and(|rows| !rows.is_empty())
    }

    /// Column ids declared by the template, in order.
    pub fn column_ids(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.id.as_str())
    }
}

/// One declared table column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableColumn {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub kind: ColumnKind,
}

/// The role a column plays in a predefined-row table.
///
/// Free-form tables treat every column as [`ColumnKind::Text`]; the
/// distinction only matters when the template owns row identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Question text fixed by the template; never user-editable.
    Query,
    /// The answer column; defaults per template-authoring convention.
    Response,
    /// Free-text remarks column.
    Remarks,
    /// Plain value column (free-form tables).
    #[serde(other)]
    Text,
}

impl Default for ColumnKind {
    fn default() -> Self {
        Self::Text
    }
}

/// A template-owned table row: the question text and optional authored
/// defaults. Only the response/remarks columns are user-editable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredefinedRow {
    pub query: String,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub remarks: Option<String>,
}
