//! # mfc-template — Checklist Template Normalization
//!
//! Inspection templates arrive from the backend in two historical shapes:
//! flat (`sections[].fields[]`) and nested (`sections[].subsections[].items[]`),
//! and the `template_data` document itself may be a JSON object or a
//! JSON-encoded string. This crate detects the shape at the parsing
//! boundary and normalizes immediately to one canonical, order-stable
//! item list. The shape union never escapes the normalizer.
//!
//! ## Guarantees
//!
//! - Parse failure is an explicit [`TemplateError`], never a partial or
//!   silently-empty template.
//! - Legacy field-type strings map onto the closed [`ResponseType`] enum
//!   through an exhaustive `match`; an unmapped legacy type is a compile
//!   error, not a runtime surprise.
//! - Duplicate `item_id`s are deduplicated deterministically: first
//!   occurrence wins, template order is preserved.

pub mod field_type;
pub mod normalize;
pub mod raw;

pub use field_type::{FieldType, ResponseType};
pub use normalize::{normalize, ChecklistItem, LegacyArrays, NormalizedTemplate, TemplateError};
pub use raw::{
    ColumnKind, PredefinedRow, RawField, RawSection, RawSubsection, RawTemplate, TableColumn,
    TableStructure,
};
