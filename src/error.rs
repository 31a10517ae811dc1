//! Error types for the form interaction layer

use thiserror::Error;

/// An event referenced something the page does not contain
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("no form with id `{0}`")]
    UnknownForm(String),

    #[error("form `{form}` has no field named `{field}`")]
    UnknownField { form: String, field: String },

    #[error("field `{0}` is not a file input")]
    NotAFileInput(String),

    #[error("no template with id `{0}`")]
    UnknownTemplate(String),

    #[error("no dynamic group container matches `{0}`")]
    UnknownContainer(String),

    #[error("no add control with id `{0}`")]
    UnknownControl(String),

    #[error("no drop area with id `{0}`")]
    UnknownDropArea(String),
}

/// An asynchronous submission could not complete
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("request failed: {0}")]
    Network(String),

    #[error("request timed out")]
    Timeout,

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid action url `{url}`: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("could not read `{name}`: {source}")]
    UnreadableFile {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<reqwest::Error> for SubmitError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SubmitError::Timeout
        } else {
            SubmitError::Network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_error_messages() {
        assert_eq!(
            FormError::UnknownForm("contact".to_string()).to_string(),
            "no form with id `contact`"
        );
        assert_eq!(
            FormError::UnknownField {
                form: "contact".to_string(),
                field: "email".to_string()
            }
            .to_string(),
            "form `contact` has no field named `email`"
        );
    }

    #[test]
    fn test_decode_error_converts() {
        let err: SubmitError = serde_json::from_str::<serde_json::Value>("<html>")
            .unwrap_err()
            .into();
        assert!(matches!(err, SubmitError::Decode(_)));
        assert!(err.to_string().starts_with("unexpected response body"));
    }

    #[test]
    fn test_invalid_url_keeps_source() {
        let source = url::Url::parse("::").unwrap_err();
        let err = SubmitError::InvalidUrl {
            url: "::".to_string(),
            source,
        };
        assert!(std::error::Error::source(&err).is_some());
    }
}
