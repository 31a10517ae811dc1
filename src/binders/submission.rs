//! Async submission binder
//!
//! A submission runs in three steps: [`begin`] locks the submit control
//! and serializes the form, the transport call is awaited, and [`finish`]
//! applies the outcome to the form and the alert center. [`submit`] chains
//! them for callers that do not need to interleave other events.

use crate::error::SubmitError;
use crate::state::{AlertCenter, Form};
use crate::transport::{SubmissionResult, SubmitRequest, SubmitTransport};
use std::collections::BTreeMap;
use std::time::Instant;
use url::Url;

pub const DEFAULT_SUCCESS_MESSAGE: &str = "Operation completed successfully";
pub const DEFAULT_FAILURE_MESSAGE: &str = "An error occurred";
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred. Please try again.";

/// Lock the submit control and serialize the form.
///
/// Returns `Ok(None)` when the control is already disabled by an in-flight
/// submission; the event is then ignored.
pub fn begin(
    form: &mut Form,
    base: &Url,
    loading_label: &str,
) -> Result<Option<SubmitRequest>, SubmitError> {
    if form.submit.disabled {
        tracing::debug!(form = %form.id, "submission already in flight, ignoring");
        return Ok(None);
    }
    let request = SubmitRequest::from_form(form, base)?;
    form.submit.show_loading(loading_label);
    Ok(Some(request))
}

/// Apply a submission outcome received at `now`. Always re-enables the
/// submit control.
///
/// Returns the redirect target of a successful response, if any.
pub fn finish(
    form: &mut Form,
    outcome: Result<SubmissionResult, SubmitError>,
    alerts: &mut AlertCenter,
    now: Instant,
) -> Option<String> {
    form.submit.hide_loading();

    let result = match outcome {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(form = %form.id, error = %e, "form submission failed");
            alerts.error(UNEXPECTED_ERROR_MESSAGE, now);
            return None;
        }
    };

    if result.success {
        tracing::info!(form = %form.id, "form submission succeeded");
        alerts.success(result.message().unwrap_or(DEFAULT_SUCCESS_MESSAGE), now);
        if result.should_reset() {
            form.reset();
        }
        return result.redirect().map(str::to_string);
    }

    tracing::info!(form = %form.id, "form submission rejected by server");
    alerts.error(result.message().unwrap_or(DEFAULT_FAILURE_MESSAGE), now);
    if let Some(errors) = &result.errors {
        render_field_errors(form, errors);
    }
    None
}

/// Replace every field-error note with the server's messages. Names the
/// form does not contain are skipped.
fn render_field_errors(form: &mut Form, errors: &BTreeMap<String, String>) {
    form.clear_error_notes();
    for (name, message) in errors {
        match form.get_field_mut(name) {
            Some(field) => field.error_note = Some(message.clone()),
            None => tracing::debug!(form = %form.id, field = %name, "no field for server error"),
        }
    }
}

/// Run a whole submission against `transport`
pub async fn submit<T>(
    form: &mut Form,
    base: &Url,
    loading_label: &str,
    transport: &T,
    alerts: &mut AlertCenter,
) -> Option<String>
where
    T: SubmitTransport + ?Sized,
{
    let request = match begin(form, base, loading_label) {
        Ok(Some(request)) => request,
        Ok(None) => return None,
        Err(e) => return finish(form, Err(e), alerts, Instant::now()),
    };
    let outcome = transport.submit(request).await;
    finish(form, outcome, alerts, Instant::now())
}
