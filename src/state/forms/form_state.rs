//! Form state: fields, submit control and dynamic group containers

use super::field::{FieldKind, FormField};
use super::file::SelectedFile;
use super::group::GroupContainer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Class marking a form for client-side validation
pub const VALIDATION_MARKER: &str = "needs-validation";
/// Class marking a form for asynchronous submission
pub const ASYNC_MARKER: &str = "ajax-form";
/// Class applied after a submit attempt to trigger error styling
pub const VALIDATED_CLASS: &str = "was-validated";

/// HTTP method declared on a form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[serde(alias = "get")]
    Get,
    #[default]
    #[serde(alias = "post")]
    Post,
    #[serde(alias = "put")]
    Put,
    #[serde(alias = "patch")]
    Patch,
    #[serde(alias = "delete")]
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

/// The form's `button[type=submit]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmitControl {
    pub label: String,
    pub disabled: bool,
    #[serde(skip)]
    original_label: Option<String>,
}

impl Default for SubmitControl {
    fn default() -> Self {
        Self {
            label: "Submit".to_string(),
            disabled: false,
            original_label: None,
        }
    }
}

impl SubmitControl {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            ..Default::default()
        }
    }

    /// Disable the control and swap in the loading label.
    /// Returns false if it is already locked by an in-flight request.
    pub fn show_loading(&mut self, loading_label: &str) -> bool {
        if self.disabled {
            return false;
        }
        self.disabled = true;
        self.original_label = Some(std::mem::replace(
            &mut self.label,
            loading_label.to_string(),
        ));
        true
    }

    /// Re-enable the control and restore its label
    pub fn hide_loading(&mut self) {
        self.disabled = false;
        if let Some(label) = self.original_label.take() {
            self.label = label;
        }
    }

    pub fn is_loading(&self) -> bool {
        self.disabled && self.original_label.is_some()
    }
}

/// A value serialized from a form, in document order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    Text(String),
    File(SelectedFile),
}

/// A form on the page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Form {
    pub id: String,
    /// Declared action; resolved against the page location when submitted
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<Method>,
    pub classes: BTreeSet<String>,
    pub fields: Vec<FormField>,
    pub containers: Vec<GroupContainer>,
    pub submit: SubmitControl,
    /// Name of the field holding focus
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focused: Option<String>,
}

impl Form {
    pub fn new(id: &str, action: &str) -> Self {
        Self {
            id: id.to_string(),
            action: action.to_string(),
            ..Default::default()
        }
    }

    pub fn class(mut self, class: &str) -> Self {
        self.classes.insert(class.to_string());
        self
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn field(mut self, field: FormField) -> Self {
        self.fields.push(field);
        self
    }

    pub fn container(mut self, container: GroupContainer) -> Self {
        self.containers.push(container);
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    pub fn needs_validation(&self) -> bool {
        self.has_class(VALIDATION_MARKER)
    }

    pub fn is_async(&self) -> bool {
        self.has_class(ASYNC_MARKER)
    }

    pub fn effective_method(&self) -> Method {
        self.method.unwrap_or_default()
    }

    /// All fields in document order: static fields, then dynamic groups
    pub fn all_fields(&self) -> impl Iterator<Item = &FormField> {
        self.fields.iter().chain(
            self.containers
                .iter()
                .flat_map(|c| c.groups.iter().flat_map(|g| g.fields.iter())),
        )
    }

    pub fn all_fields_mut(&mut self) -> impl Iterator<Item = &mut FormField> {
        self.fields.iter_mut().chain(
            self.containers
                .iter_mut()
                .flat_map(|c| c.groups.iter_mut().flat_map(|g| g.fields.iter_mut())),
        )
    }

    /// First field with the given name
    pub fn get_field(&self, name: &str) -> Option<&FormField> {
        self.all_fields().find(|f| f.name == name)
    }

    pub fn get_field_mut(&mut self, name: &str) -> Option<&mut FormField> {
        self.all_fields_mut().find(|f| f.name == name)
    }

    pub fn container_mut(&mut self, id: &str) -> Option<&mut GroupContainer> {
        self.containers.iter_mut().find(|c| c.id == id)
    }

    /// Native `checkValidity()` over every field
    pub fn check_validity(&self) -> bool {
        self.all_fields().all(FormField::check_validity)
    }

    /// Name of the first field failing validation, in document order
    pub fn first_invalid(&self) -> Option<&str> {
        self.all_fields()
            .find(|f| !f.check_validity())
            .map(|f| f.name.as_str())
    }

    /// Move focus to the named field
    pub fn focus(&mut self, name: &str) {
        self.focused = Some(name.to_string());
    }

    /// Snapshot current values as the reset defaults
    pub fn capture_defaults(&mut self) {
        self.all_fields_mut().for_each(FormField::capture_default);
    }

    /// `form.reset()` plus dropping the validated styling state
    pub fn reset(&mut self) {
        self.all_fields_mut().for_each(FormField::reset);
        self.classes.remove(VALIDATED_CLASS);
    }

    /// Remove every rendered server error note
    pub fn clear_error_notes(&mut self) {
        self.all_fields_mut().for_each(|f| f.error_note = None);
    }

    /// Names of fields currently carrying an error note
    pub fn error_notes(&self) -> Vec<(&str, &str)> {
        self.all_fields()
            .filter_map(|f| f.error_note.as_deref().map(|n| (f.name.as_str(), n)))
            .collect()
    }

    /// Serialize like `new FormData(form)`: named fields in document order,
    /// one entry per selected file
    pub fn form_data(&self) -> Vec<(String, FormValue)> {
        let mut data = Vec::new();
        for field in self.all_fields().filter(|f| !f.name.is_empty()) {
            match field.kind {
                FieldKind::File => {
                    for file in field.files() {
                        data.push((field.name.clone(), FormValue::File(file.clone())));
                    }
                }
                _ => data.push((
                    field.name.clone(),
                    FormValue::Text(field.as_text().to_string()),
                )),
            }
        }
        data
    }
}
