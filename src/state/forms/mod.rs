//! Form domain layer
//!
//! Type-safe model of the forms on a page: fields and their constraints,
//! selected files, the submit control and repeatable field groups.

mod field;
mod file;
mod form_state;
mod group;

pub use field::{Constraints, FieldKind, FieldValue, FormField, Validity};
pub use file::SelectedFile;
pub use form_state::{
    Form, FormValue, Method, SubmitControl, ASYNC_MARKER, VALIDATED_CLASS, VALIDATION_MARKER,
};
pub use group::{
    FieldGroup, FieldTemplate, GroupContainer, IndexedName, Label, TemplateField, TemplateLabel,
    INDEX_PLACEHOLDER,
};
