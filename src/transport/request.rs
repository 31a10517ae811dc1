//! Outgoing submission request

use crate::error::SubmitError;
use crate::state::{Form, FormValue, Method};
use url::Url;

pub const REQUESTED_WITH_HEADER: &str = "X-Requested-With";
pub const REQUESTED_WITH_VALUE: &str = "XMLHttpRequest";

/// A form serialized for sending
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitRequest {
    pub url: Url,
    pub method: Method,
    pub fields: Vec<(String, FormValue)>,
}

impl SubmitRequest {
    /// Serialize `form`, resolving its action against `base`
    pub fn from_form(form: &Form, base: &Url) -> Result<Self, SubmitError> {
        let url = base
            .join(&form.action)
            .map_err(|source| SubmitError::InvalidUrl {
                url: form.action.clone(),
                source,
            })?;

        Ok(Self {
            url,
            method: form.effective_method(),
            fields: form.form_data(),
        })
    }

    /// Text entries only, as query pairs for GET requests
    pub fn text_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().filter_map(|(name, value)| match value {
            FormValue::Text(text) => Some((name.as_str(), text.as_str())),
            FormValue::File(_) => None,
        })
    }
}
