//! # Dynamic Table Merging
//!
//! Table-valued items come in two modes. Free-form tables are user-owned:
//! rows are added and removed at will, and stored data is filtered against
//! the declared columns so stale rows cannot resurface. Predefined tables
//! (MLC and biosecurity questionnaires) are template-owned: row identity
//! and question text come from the template, stored answers are overlaid
//! *positionally*, and "delete" clears a row's answer instead of removing
//! the row.
//!
//! The merge exposes a per-row `deviates` flag (current response differs
//! from the no-issue canonical value) so callers can highlight
//! attention-worthy answers without this layer knowing about styling.

use thiserror::Error;

use mfc_template::{ColumnKind, TableStructure};

use crate::response::TableRowData;

/// Default response for a predefined row with no stored or authored
/// value. Template-authoring convention: the unanswered state reads as
/// "no issue".
const PREDEFINED_RESPONSE_DEFAULT: &str = "Yes";

/// One row ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRow {
    /// Column id → cell value, restricted to declared columns.
    pub cells: TableRowData,
    /// Whether the row's identity is owned by the template.
    pub predefined: bool,
    /// Predefined rows only: the current response differs from the
    /// row's canonical no-issue value. Always `false` for free-form
    /// rows.
    pub deviates: bool,
}

/// Errors from table row edits.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableEditError {
    /// Row index outside the table's row set.
    #[error("row index {index} out of range (table has {len} rows)")]
    RowOutOfRange { index: usize, len: usize },
}

/// Merge stored rows with the template structure into display rows.
///
/// Predefined mode: one display row per template row, in template order,
/// with stored answers overlaid by position. Free-form mode: stored rows
/// filtered to declared columns; rows with no populated cell left are
/// dropped entirely.
pub fn merge(structure: &TableStructure, stored: &[TableRowData]) -> Vec<DisplayRow> {
    match &structure.predefined_rows {
        Some(rows) if !rows.is_empty() => merge_predefined(structure, rows, stored),
        _ => merge_free_form(structure, stored),
    }
}

fn merge_predefined(
    structure: &TableStructure,
    predefined: &[mfc_template::PredefinedRow],
    stored: &[TableRowData],
) -> Vec<DisplayRow> {
    predefined
        .iter()
        .enumerate()
        .map(|(index, template_row)| {
            // Stored answers match by position; predefined rows have no
            // free-form row ids.
            let stored_row = stored.get(index);
            let canonical = template_row
                .response
                .as_deref()
                .unwrap_or(PREDEFINED_RESPONSE_DEFAULT);

            let mut cells = TableRowData::new();
            let mut deviates = false;

            for column in &structure.columns {
                let value = match column.kind {
                    ColumnKind::Query => template_row.query.clone(),
                    ColumnKind::Response => {
                        let current = stored_value(stored_row, &column.id)
                            .unwrap_or_else(|| canonical.to_string());
                        deviates = current != canonical;
                        current
                    }
                    ColumnKind::Remarks => stored_value(stored_row, &column.id)
                        .or_else(|| template_row.remarks.clone())
                        .unwrap_or_default(),
                    ColumnKind::Text => {
                        stored_value(stored_row, &column.id).unwrap_or_default()
                    }
                };
                cells.insert(column.id.clone(), value);
            }

            DisplayRow {
                cells,
                predefined: true,
                deviates,
            }
        })
        .collect()
}

fn merge_free_form(structure: &TableStructure, stored: &[TableRowData]) -> Vec<DisplayRow> {
    stored
        .iter()
        .filter_map(|row| {
            let cells: TableRowData = structure
                .column_ids()
                .filter_map(|id| {
                    row.get(id)
                        .filter(|v| !v.trim().is_empty())
                        .map(|v| (id.to_string(), v.clone()))
                })
                .collect();

            // Stale data can hold rows whose every declared column is
            // empty; reintroducing them would resurrect deleted rows.
            if cells.is_empty() {
                None
            } else {
                Some(DisplayRow {
                    cells,
                    predefined: false,
                    deviates: false,
                })
            }
        })
        .collect()
}

fn stored_value(row: Option<&TableRowData>, column_id: &str) -> Option<String> {
    row.and_then(|r| r.get(column_id))
        .filter(|v| !v.trim().is_empty())
        .cloned()
}

/// Delete a row from stored data, honoring the table's mode.
///
/// Free-form: the row is removed. Predefined: the row's response and
/// remarks are cleared back to the template default, but the row itself
/// is preserved. Row identity is structural, not user-owned.
pub fn delete_row(
    structure: &TableStructure,
    stored: &mut Vec<TableRowData>,
    index: usize,
) -> Result<(), TableEditError> {
    match &structure.predefined_rows {
        Some(rows) if !rows.is_empty() => {
            if index >= rows.len() {
                return Err(TableEditError::RowOutOfRange {
                    index,
                    len: rows.len(),
                });
            }
            // No stored answer at this position means nothing to clear.
            if let Some(row) = stored.get_mut(index) {
                for column in &structure.columns {
                    if matches!(column.kind, ColumnKind::Response | ColumnKind::Remarks) {
                        row.remove(&column.id);
                    }
                }
            }
            Ok(())
        }
        _ => {
            if index >= stored.len() {
                return Err(TableEditError::RowOutOfRange {
                    index,
                    len: stored.len(),
                });
            }
            stored.remove(index);
            Ok(())
        }
    }
}
