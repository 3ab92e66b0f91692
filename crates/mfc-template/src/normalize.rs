//! # Template Normalization
//!
//! Converts a [`RawTemplate`] into a [`NormalizedTemplate`]: one flat,
//! order-stable list of checklist items with a uniform contract, plus
//! the legacy parallel arrays older consumers still read.
//!
//! The canonical representation for all new logic is the item array;
//! the parallel arrays are derived from it and never diverge.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::field_type::ResponseType;
use crate::raw::{RawField, RawSection, RawTemplate, TableStructure};

/// Errors from template normalization.
///
/// A template that cannot be normalized is always surfaced as an error,
/// never silently substituted with an empty template.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// `template_data` was a string that is not valid JSON, or its
    /// sections were structurally malformed.
    #[error("template {template_id} has invalid template_data: {reason}")]
    InvalidJson {
        template_id: String,
        reason: String,
    },

    /// `template_data` was absent, or carried no `sections` array.
    #[error("template {template_id} has no sections array")]
    MissingSections { template_id: String },

    /// The sections walked to zero resolvable items.
    #[error("template {template_id} resolved to zero items")]
    NoItems { template_id: String },
}

/// One answerable checklist item in canonical form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistItem {
    /// Stable identifier, unique within the template after dedup.
    pub item_id: String,
    pub section: String,
    pub subsection: Option<String>,
    pub description: String,
    /// Responsible-party label (person in charge).
    pub pic: String,
    pub guidance: String,
    pub response_type: ResponseType,
    pub is_mandatory: bool,
    pub requires_evidence: bool,
    /// Position in template order, 0-based, stable across renormalization.
    pub order_index: usize,
    /// Present only for `response_type == Table`.
    pub table_structure: Option<TableStructure>,
}

/// Parallel arrays kept for backward-compatible consumers.
///
/// Derived from the item array on every normalization; do not build new
/// logic against these.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LegacyArrays {
    pub descriptions: Vec<String>,
    pub response_types: Vec<ResponseType>,
    pub mandatory_flags: Vec<bool>,
}

/// A fully normalized template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedTemplate {
    pub template_id: mfc_core::TemplateId,
    pub name: String,
    pub template_type: Option<String>,
    pub items: Vec<ChecklistItem>,
    pub total_items: usize,
    pub mandatory_items: usize,
    pub legacy: LegacyArrays,
}

impl NormalizedTemplate {
    /// Look up an item by id.
    pub fn item(&self, item_id: &str) -> Option<&ChecklistItem> {
        self.items.iter().find(|i| i.item_id == item_id)
    }

    /// Ids of mandatory items, in template order.
    pub fn mandatory_ids(&self) -> impl Iterator<Item = &str> {
        self.items
            .iter()
            .filter(|i| i.is_mandatory)
            .map(|i| i.item_id.as_str())
    }
}

/// Normalize a raw template into the canonical item list.
///
/// Handles both historical section shapes (flat `fields` and nested
/// `subsections[].items`) and a `template_data` document that may be a
/// JSON object or a JSON-encoded string. Duplicate `item_id`s keep the
/// first occurrence; later duplicates are dropped.
///
/// # Errors
///
/// - [`TemplateError::InvalidJson`] — stringified data that fails to
///   parse, or a structurally malformed section. Never a partial result.
/// - [`TemplateError::MissingSections`] — absent or non-array `sections`.
/// - [`TemplateError::NoItems`] — the walk produced zero items.
pub fn normalize(raw: &RawTemplate) -> Result<NormalizedTemplate, TemplateError> {
    let template_id = raw.id.to_string();

    let data = match &raw.template_data {
        None => {
            return Err(TemplateError::MissingSections { template_id });
        }
        Some(Value::String(encoded)) => {
            serde_json::from_str::<Value>(encoded).map_err(|e| TemplateError::InvalidJson {
                template_id: template_id.clone(),
                reason: e.to_string(),
            })?
        }
        Some(other) => other.clone(),
    };

    let sections = match data.get("sections") {
        Some(Value::Array(sections)) => sections,
        _ => return Err(TemplateError::MissingSections { template_id }),
    };

    let mut items = Vec::new();
    let mut seen = HashSet::new();

    for (idx, section_value) in sections.iter().enumerate() {
        let section: RawSection =
            serde_json::from_value(section_value.clone()).map_err(|e| {
                TemplateError::InvalidJson {
                    template_id: template_id.clone(),
                    reason: format!("section {idx}: {e}"),
                }
            })?;

        if let Some(fields) = &section.fields {
            for field in fields {
                push_item(&mut items, &mut seen, &section.name, None, field);
            }
        } else if let Some(subsections) = &section.subsections {
            for subsection in subsections {
                for field in &subsection.items {
                    push_item(
                        &mut items,
                        &mut seen,
                        &section.name,
                        Some(&subsection.name),
                        field,
                    );
                }
            }
        }
        // A section with neither shape contributes nothing; the NoItems
        // check below catches templates made entirely of such sections.
    }

    if items.is_empty() {
        return Err(TemplateError::NoItems { template_id });
    }

    let legacy = LegacyArrays {
        descriptions: items.iter().map(|i| i.description.clone()).collect(),
        response_types: items.iter().map(|i| i.response_type).collect(),
        mandatory_flags: items.iter().map(|i| i.is_mandatory).collect(),
    };
    let total_items = items.len();
    let mandatory_items = items.iter().filter(|i| i.is_mandatory).count();

    Ok(NormalizedTemplate {
        template_id: raw.id,
        name: raw.name.clone(),
        template_type: raw.template_type.clone(),
        items,
        total_items,
        mandatory_items,
        legacy,
    })
}

/// Append one field as a normalized item, unless its id was already seen.
fn push_item(
    items: &mut Vec<ChecklistItem>,
    seen: &mut HashSet<String>,
    section: &str,
    subsection: Option<&str>,
    field: &RawField,
) {
    // First occurrence wins; authoring errors that repeat an id are
    // dropped deterministically.
    if !seen.insert(field.field_id.clone()) {
        return;
    }

    items.push(ChecklistItem {
        item_id: field.field_id.clone(),
        section: section.to_string(),
        subsection: subsection.map(str::to_string),
        description: field.description.clone(),
        pic: field.pic.clone(),
        guidance: field.guidance.clone(),
        response_type: field.field_type.response_type(),
        is_mandatory: field.is_mandatory,
        requires_evidence: field.requires_evidence,
        order_index: items.len(),
        table_structure: field.table_structure.clone(),
    });
}
