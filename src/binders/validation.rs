//! Validation binder
//!
//! Custom rules for email, Kenyan MSISDN and URL fields, evaluated on blur
//! and again on submit of every form carrying the validation marker.

use crate::state::{FieldKind, Form, FormField, VALIDATED_CLASS};
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("EMAIL_REGEX: invalid regex pattern")
});

// 254, then 7 or 1, then 8 more digits
static MSISDN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^254[17]\d{8}$").expect("MSISDN_REGEX: invalid regex pattern"));

pub const EMAIL_MESSAGE: &str = "Please enter a valid email address";
pub const PHONE_MESSAGE: &str = "Please enter a valid Kenyan phone number (254XXXXXXXXX)";
pub const URL_MESSAGE: &str = "Please enter a valid URL";

/// Kenyan country code used by [`format_msisdn`]
const COUNTRY_CODE: &str = "254";

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_REGEX.is_match(value)
}

pub fn is_valid_msisdn(value: &str) -> bool {
    MSISDN_REGEX.is_match(value)
}

pub fn is_valid_url(value: &str) -> bool {
    Url::parse(value).is_ok()
}

/// Bring a phone number into international form. Non-digits are dropped,
/// then a leading `0` becomes `254` and a bare `7…`/`1…` number gets `254`
/// prepended; anything else is returned as its digits.
pub fn format_msisdn(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() || digits.starts_with(COUNTRY_CODE) {
        return digits;
    }
    match digits.strip_prefix('0') {
        Some(local) => format!("{COUNTRY_CODE}{local}"),
        None if digits.starts_with(['7', '1']) => format!("{COUNTRY_CODE}{digits}"),
        None => digits,
    }
}

/// Custom rule attached to a field kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Email,
    Phone,
    Url,
    /// No custom rule; native constraints only
    Native,
}

impl Rule {
    pub fn for_kind(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Email => Rule::Email,
            FieldKind::Tel => Rule::Phone,
            FieldKind::Url => Rule::Url,
            _ => Rule::Native,
        }
    }

    /// Message for a value failing this rule. Empty values always pass;
    /// `required` handles emptiness.
    pub fn check(&self, value: &str) -> Option<&'static str> {
        if value.is_empty() {
            return None;
        }
        match self {
            Rule::Email if !is_valid_email(value) => Some(EMAIL_MESSAGE),
            Rule::Phone if !is_valid_msisdn(value) => Some(PHONE_MESSAGE),
            Rule::Url if !is_valid_url(value) => Some(URL_MESSAGE),
            _ => None,
        }
    }
}

/// Re-run the custom rule for one field, overwriting its custom validity.
///
/// Returns whether the field's custom rule accepts the value; for fields
/// without a custom rule, whether native constraints hold.
pub fn validate_field(field: &mut FormField, normalize_phone: bool) -> bool {
    let rule = Rule::for_kind(field.kind);

    if rule == Rule::Phone && normalize_phone {
        let normalized = format_msisdn(field.as_text());
        if !normalized.is_empty() {
            field.set_text(normalized);
        }
    }

    match rule {
        Rule::Native => field.check_validity(),
        rule => {
            let value = field.as_text().trim().to_string();
            let message = rule.check(&value);
            field.set_custom_validity(message.unwrap_or_default());
            message.is_none()
        }
    }
}

/// Result of a submit attempt on a validation-marked form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitVerdict {
    Allowed,
    /// Submission prevented; focus moved to `first_invalid`
    Blocked { first_invalid: String },
}

impl SubmitVerdict {
    pub fn is_allowed(&self) -> bool {
        matches!(self, SubmitVerdict::Allowed)
    }
}

/// Blur handler
pub fn on_blur(field: &mut FormField, normalize_phone: bool) -> bool {
    let valid = validate_field(field, normalize_phone);
    tracing::debug!(field = %field.name, valid, "validated field on blur");
    valid
}

/// Submit handler: recompute every custom rule, mark the form validated,
/// and block with focus on the first invalid field if anything fails.
pub fn on_submit(form: &mut Form, normalize_phone: bool) -> SubmitVerdict {
    for field in form.all_fields_mut() {
        validate_field(field, normalize_phone);
    }
    form.classes.insert(VALIDATED_CLASS.to_string());

    match form.first_invalid().map(str::to_string) {
        Some(name) => {
            tracing::info!(form = %form.id, field = %name, "submission blocked by validation");
            form.focus(&name);
            SubmitVerdict::Blocked {
                first_invalid: name,
            }
        }
        None => SubmitVerdict::Allowed,
    }
}
