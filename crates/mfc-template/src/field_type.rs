//! # Legacy Field Types and the Response Type Enum
//!
//! Templates have been authored over several years against several
//! backend versions, so the `field_type` strings in stored documents
//! span fourteen legacy values. Answers, however, are recorded in
//! exactly four shapes. The mapping between the two is an exhaustive
//! `match` over closed enums: adding a legacy type without deciding its
//! response shape does not compile.

use serde::{Deserialize, Serialize};

/// The four shapes an answer can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    Text,
    Date,
    YesNoNa,
    Table,
}

impl ResponseType {
    /// Wire string for this response type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Date => "date",
            Self::YesNoNa => "yes_no_na",
            Self::Table => "table",
        }
    }
}

impl std::fmt::Display for ResponseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Legacy field-type strings as they appear in stored templates.
///
/// `Unknown` is the forward-compatible catch-all for types introduced
/// after this client version was deployed; it renders as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Textarea,
    Date,
    Datetime,
    YesNo,
    Boolean,
    Number,
    Integer,
    Decimal,
    Table,
    File,
    Select,
    Radio,
    Checkbox,
    #[serde(other)]
    Unknown,
}

impl Default for FieldType {
    fn default() -> Self {
        Self::Unknown
    }
}

impl FieldType {
    /// Map this legacy field type onto its canonical response shape.
    ///
    /// The match is deliberately exhaustive with no wildcard arm, so a
    /// new `FieldType` variant forces a decision here.
    pub fn response_type(self) -> ResponseType {
        match self {
            FieldType::Date | FieldType::Datetime => ResponseType::Date,
            FieldType::YesNo | FieldType::Boolean => ResponseType::YesNoNa,
            FieldType::Table => ResponseType::Table,
            FieldType::Text
            | FieldType::Textarea
            | FieldType::Number
            | FieldType::Integer
            | FieldType::Decimal
            | FieldType::File
            | FieldType::Select
            | FieldType::Radio
            | FieldType::Checkbox
            | FieldType::Unknown => ResponseType::Text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yes_no_maps_to_yes_no_na() {
        assert_eq!(FieldType::YesNo.response_type(), ResponseType::YesNoNa);
        assert_eq!(FieldType::Boolean.response_type(), ResponseType::YesNoNa);
    }

    #[test]
    fn test_date_variants_map_to_date() {
        assert_eq!(FieldType::Date.response_type(), ResponseType::Date);
        assert_eq!(FieldType::Datetime.response_type(), ResponseType::Date);
    }

    #[test]
    fn test_table_maps_to_table() {
        assert_eq!(FieldType::Table.response_type(), ResponseType::Table);
    }

    #[test]
    fn test_textual_variants_map_to_text() {
        for ft in [
            FieldType::Text,
            FieldType::Textarea,
            FieldType::Number,
            FieldType::Integer,
            FieldType::Decimal,
            FieldType::File,
            FieldType::Select,
            FieldType::Radio,
            FieldType::Checkbox,
        ] {
            assert_eq!(ft.response_type(), ResponseType::Text, "{ft:?}");
        }
    }

    #[test]
    fn test_unknown_string_parses_to_unknown_then_text() {
        let ft: FieldType = serde_json::from_str("\"hologram\"").unwrap();
        assert_eq!(ft, FieldType::Unknown);
        assert_eq!(ft.response_type(), ResponseType::Text);
    }

    #[test]
    fn test_wire_strings_are_snake_case() {
        assert_eq!(
            serde_json::to_string(&ResponseType::YesNoNa).unwrap(),
            "\"yes_no_na\""
        );
        assert_eq!(serde_json::to_string(&FieldType::YesNo).unwrap(), "\"yes_no\"");
    }
}
