//! Form field value objects

use super::file::SelectedFile;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;
use url::Url;

// WHATWG "valid e-mail address" production, used for the native type check
static NATIVE_EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("NATIVE_EMAIL_REGEX: invalid regex pattern")
});

/// Declared input kind (the `type` attribute, or the tag name for
/// `select`/`textarea`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[default]
    Text,
    Email,
    #[serde(alias = "phone")]
    Tel,
    Url,
    Number,
    Password,
    Hidden,
    File,
    Select,
    Textarea,
}

/// Type-safe field values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Files(Vec<SelectedFile>),
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Text(String::new())
    }
}

/// Native constraint attributes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Constraints {
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(rename = "minlength", skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(rename = "maxlength", skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    /// Allowed values of a `select`
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

/// Constraint validation state of one field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Validity {
    pub value_missing: bool,
    pub type_mismatch: bool,
    pub pattern_mismatch: bool,
    pub too_long: bool,
    pub too_short: bool,
    pub custom_error: bool,
}

impl Validity {
    pub fn is_valid(&self) -> bool {
        !(self.value_missing
            || self.type_mismatch
            || self.pattern_mismatch
            || self.too_long
            || self.too_short
            || self.custom_error)
    }
}

/// Represents a single form field with its configuration and value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormField {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    pub value: FieldValue,
    #[serde(flatten)]
    pub constraints: Constraints,
    /// Remaining markup attributes (`data-max-size`, `data-preview`, ...)
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,
    /// Note rendered directly after the field from a server error mapping
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_note: Option<String>,
    #[serde(skip)]
    default_value: String,
    #[serde(skip)]
    custom_validity: String,
}

impl FormField {
    /// Create a new empty field of the given kind
    pub fn new(name: &str, kind: FieldKind) -> Self {
        let value = match kind {
            FieldKind::File => FieldValue::Files(Vec::new()),
            _ => FieldValue::Text(String::new()),
        };
        Self {
            name: name.to_string(),
            kind,
            value,
            ..Default::default()
        }
    }

    /// Create a new text-valued field with an initial value
    pub fn with_value(name: &str, kind: FieldKind, value: &str) -> Self {
        let mut field = Self::new(name, kind);
        field.value = FieldValue::Text(value.to_string());
        field.default_value = value.to_string();
        field
    }

    pub fn id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn required(mut self) -> Self {
        self.constraints.required = true;
        self
    }

    pub fn pattern(mut self, pattern: &str) -> Self {
        self.constraints.pattern = Some(pattern.to_string());
        self
    }

    pub fn attr(mut self, key: &str, value: &str) -> Self {
        self.attrs.insert(key.to_string(), value.to_string());
        self
    }

    /// Look up a markup attribute
    pub fn get_attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    /// Get the text value (returns empty string for file fields)
    pub fn as_text(&self) -> &str {
        match &self.value {
            FieldValue::Text(s) => s,
            FieldValue::Files(_) => "",
        }
    }

    /// Get the selected files (empty for text fields)
    pub fn files(&self) -> &[SelectedFile] {
        match &self.value {
            FieldValue::Files(files) => files,
            FieldValue::Text(_) => &[],
        }
    }

    /// Set the text value
    pub fn set_text(&mut self, value: impl Into<String>) {
        self.value = FieldValue::Text(value.into());
    }

    /// Replace the file selection
    pub fn set_files(&mut self, files: Vec<SelectedFile>) {
        self.value = FieldValue::Files(files);
    }

    /// Clear the field value
    pub fn clear(&mut self) {
        match &mut self.value {
            FieldValue::Text(s) => s.clear(),
            FieldValue::Files(files) => files.clear(),
        }
    }

    /// Remember the current value as the one restored by a form reset
    pub fn capture_default(&mut self) {
        self.default_value = self.as_text().to_string();
    }

    /// Restore the value captured when the page was bound
    pub fn reset(&mut self) {
        match self.kind {
            FieldKind::File => self.value = FieldValue::Files(Vec::new()),
            _ => self.value = FieldValue::Text(self.default_value.clone()),
        }
    }

    /// Current custom validity message (empty when none is set)
    pub fn custom_validity(&self) -> &str {
        &self.custom_validity
    }

    pub fn set_custom_validity(&mut self, message: impl Into<String>) {
        self.custom_validity = message.into();
    }

    /// Evaluate native constraints plus the custom validity message
    pub fn validity(&self) -> Validity {
        // Hidden inputs are barred from constraint validation
        if self.kind == FieldKind::Hidden {
            return Validity::default();
        }

        let text = self.as_text();
        let is_empty = match self.kind {
            FieldKind::File => self.files().is_empty(),
            _ => text.is_empty(),
        };

        let mut validity = Validity {
            value_missing: self.constraints.required && is_empty,
            custom_error: !self.custom_validity.is_empty(),
            ..Default::default()
        };

        if is_empty || self.kind == FieldKind::File {
            return validity;
        }

        validity.type_mismatch = match self.kind {
            FieldKind::Email => !NATIVE_EMAIL_REGEX.is_match(text),
            FieldKind::Url => Url::parse(text).is_err(),
            FieldKind::Number => text.trim().parse::<f64>().is_err(),
            FieldKind::Select => {
                !self.constraints.options.is_empty()
                    && !self.constraints.options.iter().any(|o| o == text)
            }
            _ => false,
        };

        if let Some(pattern) = self.constraints.pattern.as_deref() {
            // Invalid patterns are ignored, as browsers do
            if let Ok(re) = Regex::new(&format!("^(?:{pattern})$")) {
                validity.pattern_mismatch = !re.is_match(text);
            }
        }

        let len = text.chars().count();
        validity.too_long = self.constraints.max_length.is_some_and(|max| len > max);
        validity.too_short = self.constraints.min_length.is_some_and(|min| len < min);

        validity
    }

    pub fn check_validity(&self) -> bool {
        self.validity().is_valid()
    }

    /// Message a browser would show for the current validity state
    pub fn validation_message(&self) -> Option<String> {
        let validity = self.validity();
        if validity.custom_error {
            Some(self.custom_validity.clone())
        } else if validity.value_missing {
            Some("Please fill out this field.".to_string())
        } else if validity.type_mismatch {
            Some("Please enter a valid value.".to_string())
        } else if validity.pattern_mismatch {
            Some("Please match the requested format.".to_string())
        } else if validity.too_long {
            Some("Please shorten this text.".to_string())
        } else if validity.too_short {
            Some("Please lengthen this text.".to_string())
        } else {
            None
        }
    }

    /// Get the display value for rendering
    pub fn display_value(&self) -> String {
        match &self.value {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Files(files) => files
                .iter()
                .map(|f| f.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_file_field_holds_files() {
        let field = FormField::new("logo", FieldKind::File);
        assert!(matches!(field.value, FieldValue::Files(_)));
        assert!(field.files().is_empty());
        assert_eq!(field.as_text(), "");
    }

    #[test]
    fn test_required_empty_is_value_missing() {
        let field = FormField::new("name", FieldKind::Text).required();
        let validity = field.validity();
        assert!(validity.value_missing);
        assert!(!validity.is_valid());
        assert_eq!(
            field.validation_message().as_deref(),
            Some("Please fill out this field.")
        );
    }

    #[test]
    fn test_required_file_without_selection() {
        let mut field = FormField::new("doc", FieldKind::File).required();
        assert!(!field.check_validity());
        field.set_files(vec![SelectedFile::sized("a.pdf", "application/pdf", 10)]);
        assert!(field.check_validity());
    }

    #[test]
    fn test_native_email_type_mismatch() {
        let field = FormField::with_value("email", FieldKind::Email, "user@@example");
        assert!(field.validity().type_mismatch);

        let field = FormField::with_value("email", FieldKind::Email, "user@example.com");
        assert!(field.check_validity());
    }

    #[test]
    fn test_native_url_type_mismatch() {
        let field = FormField::with_value("site", FieldKind::Url, "not a url");
        assert!(field.validity().type_mismatch);

        let field = FormField::with_value("site", FieldKind::Url, "https://example.com");
        assert!(field.check_validity());
    }

    #[test]
    fn test_pattern_is_anchored() {
        let field = FormField::with_value("code", FieldKind::Text, "abc123").pattern("[a-z]+");
        assert!(field.validity().pattern_mismatch);

        let field = FormField::with_value("code", FieldKind::Text, "abc").pattern("[a-z]+");
        assert!(field.check_validity());
    }

    #[test]
    fn test_invalid_pattern_is_ignored() {
        let field = FormField::with_value("code", FieldKind::Text, "abc").pattern("[a-z");
        assert!(field.check_validity());
    }

    #[test]
    fn test_length_constraints() {
        let mut field = FormField::with_value("bio", FieldKind::Textarea, "abcdef");
        field.constraints.max_length = Some(3);
        assert!(field.validity().too_long);

        field.constraints.max_length = None;
        field.constraints.min_length = Some(10);
        assert!(field.validity().too_short);
    }

    #[test]
    fn test_select_value_must_be_an_option() {
        let mut field = FormField::with_value("plan", FieldKind::Select, "gold");
        field.constraints.options = vec!["basic".to_string(), "pro".to_string()];
        assert!(field.validity().type_mismatch);
        field.set_text("pro");
        assert!(field.check_validity());
    }

    #[test]
    fn test_hidden_fields_are_always_valid() {
        let field = FormField::new("csrf", FieldKind::Hidden).required();
        assert!(field.check_validity());
    }

    #[test]
    fn test_custom_validity_makes_field_invalid() {
        let mut field = FormField::with_value("email", FieldKind::Email, "a@b.co");
        field.set_custom_validity("taken");
        assert!(field.validity().custom_error);
        assert_eq!(field.validation_message().as_deref(), Some("taken"));

        field.set_custom_validity("");
        assert!(field.check_validity());
    }

    #[test]
    fn test_reset_restores_captured_default() {
        let mut field = FormField::with_value("name", FieldKind::Text, "initial");
        field.set_text("changed");
        field.reset();
        assert_eq!(field.as_text(), "initial");

        field.set_text("second");
        field.capture_default();
        field.set_text("third");
        field.reset();
        assert_eq!(field.as_text(), "second");
    }

    #[test]
    fn test_reset_clears_file_selection() {
        let mut field = FormField::new("logo", FieldKind::File);
        field.set_files(vec![SelectedFile::sized("a.png", "image/png", 1)]);
        field.reset();
        assert!(field.files().is_empty());
    }

    #[test]
    fn test_display_value_lists_file_names() {
        let mut field = FormField::new("docs", FieldKind::File);
        field.set_files(vec![
            SelectedFile::sized("a.pdf", "application/pdf", 1),
            SelectedFile::sized("b.pdf", "application/pdf", 1),
        ]);
        assert_eq!(field.display_value(), "a.pdf, b.pdf");
    }

    #[test]
    fn test_deserialize_markup_shape() {
        let json = r#"{
            "name": "phone",
            "type": "tel",
            "value": "254712345678",
            "required": true,
            "maxlength": 12,
            "attrs": {"data-hint": "msisdn"}
        }"#;
        let field: FormField = serde_json::from_str(json).unwrap();
        assert_eq!(field.kind, FieldKind::Tel);
        assert_eq!(field.as_text(), "254712345678");
        assert!(field.constraints.required);
        assert_eq!(field.constraints.max_length, Some(12));
        assert_eq!(field.get_attr("data-hint"), Some("msisdn"));
    }

    #[test]
    fn test_phone_alias() {
        let kind: FieldKind = serde_json::from_str(r#""phone""#).unwrap();
        assert_eq!(kind, FieldKind::Tel);
    }
}
