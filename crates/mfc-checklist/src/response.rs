//! # Wire Responses and the Encode/Optimize Codec
//!
//! A [`WireResponse`] is the persisted form of one answer: keyed by
//! `item_id`, with exactly one populated value field matching the item's
//! response type. The central invariant is *meaningfulness*: a response
//! counts toward progress and is persisted only if at least one value
//! field is non-empty. Empty responses are filtered, never stored as
//! noise.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use mfc_template::{NormalizedTemplate, ResponseType};

/// One stored table row: column id → cell value.
///
/// `BTreeMap` keeps serialization order deterministic.
pub type TableRowData = BTreeMap<String, String>;

/// The normalized wire format for one answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireResponse {
    pub item_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yes_no_na_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_data: Option<Vec<TableRowData>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

impl WireResponse {
    fn empty(item_id: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            yes_no_na_value: None,
            text_value: None,
            date_value: None,
            table_data: None,
            remarks: None,
        }
    }

    /// A text answer.
    pub fn text(item_id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            text_value: Some(value.into()),
            ..Self::empty(item_id)
        }
    }

    /// A date answer (wire format is the backend's date string).
    pub fn date(item_id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            date_value: Some(value.into()),
            ..Self::empty(item_id)
        }
    }

    /// A yes/no/not-applicable answer.
    pub fn yes_no_na(item_id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            yes_no_na_value: Some(value.into()),
            ..Self::empty(item_id)
        }
    }

    /// A table answer.
    pub fn table(item_id: impl Into<String>, rows: Vec<TableRowData>) -> Self {
        Self {
            table_data: Some(rows),
            ..Self::empty(item_id)
        }
    }

    /// Attach remarks.
    pub fn with_remarks(mut self, remarks: impl Into<String>) -> Self {
        self.remarks = Some(remarks.into());
        self
    }

    /// Whether this response carries at least one non-empty value field.
    ///
    /// Remarks alone do not make a response meaningful; a table value is
    /// meaningful only if some row has a non-empty cell.
    pub fn is_meaningful(&self) -> bool {
        let scalar = [&self.yes_no_na_value, &self.text_value, &self.date_value]
            .into_iter()
            .any(|v| v.as_deref().is_some_and(|s| !s.trim().is_empty()));
        let table = self.table_data.as_deref().is_some_and(|rows| {
            rows.iter()
                .any(|row| row.values().any(|cell| !cell.trim().is_empty()))
        });
        scalar || table
    }
}

/// The value half of a form answer, before encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    /// Text, date, or yes/no/na. The item's response type decides the
    /// wire field.
    Scalar(String),
    /// Table rows.
    Table(Vec<TableRowData>),
}

/// One client-side answer as held by the form layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormAnswer {
    pub value: FormValue,
    pub remarks: Option<String>,
}

impl FormAnswer {
    /// A scalar answer without remarks.
    pub fn scalar(value: impl Into<String>) -> Self {
        Self {
            value: FormValue::Scalar(value.into()),
            remarks: None,
        }
    }

    /// A table answer without remarks.
    pub fn table(rows: Vec<TableRowData>) -> Self {
        Self {
            value: FormValue::Table(rows),
            remarks: None,
        }
    }
}

/// Encode form answers into wire responses, in template item order.
///
/// Each answer lands in the single value field matching its item's
/// `response_type`. Items with no answer are skipped, as are answers
/// whose shape does not match the item (a scalar for a table item or
/// vice versa; those cannot be persisted faithfully).
pub fn encode(
    answers: &HashMap<String, FormAnswer>,
    template: &NormalizedTemplate,
) -> Vec<WireResponse> {
    let mut out = Vec::new();

    for item in &template.items {
        let Some(answer) = answers.get(&item.item_id) else {
            continue;
        };

        let response = match (&answer.value, item.response_type) {
            (FormValue::Scalar(v), ResponseType::Text) => {
                WireResponse::text(&item.item_id, v.clone())
            }
            (FormValue::Scalar(v), ResponseType::Date) => {
                WireResponse::date(&item.item_id, v.clone())
            }
            (FormValue::Scalar(v), ResponseType::YesNoNa) => {
                WireResponse::yes_no_na(&item.item_id, v.clone())
            }
            (FormValue::Table(rows), ResponseType::Table) => {
                WireResponse::table(&item.item_id, rows.clone())
            }
            (FormValue::Scalar(_), ResponseType::Table)
            | (FormValue::Table(_), _) => continue,
        };

        let response = match &answer.remarks {
            Some(remarks) => response.with_remarks(remarks.clone()),
            None => response,
        };
        out.push(response);
    }

    out
}

/// Deduplicate a response batch and drop non-meaningful entries.
///
/// Within the batch the **last** occurrence of an `item_id` wins (a
/// correction later in submission order supersedes the earlier answer),
/// holding the position of the first occurrence so output order is
/// stable. Pure and idempotent: `optimize(optimize(x)) == optimize(x)`.
pub fn optimize(responses: Vec<WireResponse>) -> Vec<WireResponse> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut merged: Vec<WireResponse> = Vec::new();

    for response in responses {
        match index.get(&response.item_id) {
            Some(&i) => merged[i] = response,
            None => {
                index.insert(response.item_id.clone(), merged.len());
                merged.push(response);
            }
        }
    }

    merged.into_iter().filter(WireResponse::is_meaningful).collect()
}
