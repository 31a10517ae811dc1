//! JSON reply of a form backend

use crate::error::SubmitError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `{success, message?, redirect?, reset_form?, errors?}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_form: Option<bool>,
    /// Field name to error message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, String>>,
}

impl SubmissionResult {
    pub fn from_slice(body: &[u8]) -> Result<Self, SubmitError> {
        Ok(serde_json::from_slice(body)?)
    }

    pub fn ok(message: &str) -> Self {
        Self {
            success: true,
            message: Some(message.to_string()),
            ..Default::default()
        }
    }

    pub fn failed(message: &str) -> Self {
        Self {
            success: false,
            message: Some(message.to_string()),
            ..Default::default()
        }
    }

    pub fn with_redirect(mut self, target: &str) -> Self {
        self.redirect = Some(target.to_string());
        self
    }

    pub fn with_reset(mut self) -> Self {
        self.reset_form = Some(true);
        self
    }

    pub fn with_error(mut self, field: &str, message: &str) -> Self {
        self.errors
            .get_or_insert_with(BTreeMap::new)
            .insert(field.to_string(), message.to_string());
        self
    }

    /// Message if present and non-empty
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref().filter(|m| !m.is_empty())
    }

    /// Redirect target if present and non-empty
    pub fn redirect(&self) -> Option<&str> {
        self.redirect.as_deref().filter(|r| !r.is_empty())
    }

    pub fn should_reset(&self) -> bool {
        self.reset_form.unwrap_or(false)
    }
}
