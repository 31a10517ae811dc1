//! Form context: one page view with its binders attached
//!
//! The context owns the page model, the alert center, the configuration and
//! the submission transport. Events are routed through [`FormContext::dispatch`];
//! time-based effects (alert expiry, delayed redirects) are applied by
//! [`FormContext::tick`].

use crate::binders::upload::{self, ChangeOutcome};
use crate::binders::validation::{self, SubmitVerdict};
use crate::binders::{dynamic, submission};
use crate::config::FormsConfig;
use crate::error::{FormError, SubmitError};
use crate::state::{AlertCenter, FieldKind, Page, SelectedFile};
use crate::transport::{SubmissionResult, SubmitRequest, SubmitTransport};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Instant;
use url::Url;

/// A user interaction on the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PageEvent {
    /// Typing into a field
    Input {
        form: String,
        field: String,
        value: String,
    },
    /// Focus leaving a field
    Blur { form: String, field: String },
    Submit { form: String },
    /// Files chosen through click-to-browse
    FileChange {
        form: String,
        field: String,
        files: Vec<SelectedFile>,
    },
    DragOver { area: String },
    DragLeave { area: String },
    /// Files dropped onto a drop area
    Drop {
        area: String,
        files: Vec<SelectedFile>,
    },
    /// Click on an add-group control
    AddGroup { control: String },
    /// Click on a remove control inside a group
    RemoveGroup { container: String, index: usize },
}

impl PageEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Input { .. } => "input",
            Self::Blur { .. } => "blur",
            Self::Submit { .. } => "submit",
            Self::FileChange { .. } => "file_change",
            Self::DragOver { .. } => "drag_over",
            Self::DragLeave { .. } => "drag_leave",
            Self::Drop { .. } => "drop",
            Self::AddGroup { .. } => "add_group",
            Self::RemoveGroup { .. } => "remove_group",
        }
    }

    /// Files carried by the event, if any
    pub fn files_mut(&mut self) -> Option<&mut Vec<SelectedFile>> {
        match self {
            Self::FileChange { files, .. } | Self::Drop { files, .. } => Some(files),
            _ => None,
        }
    }
}

/// A page view with validation, upload, dynamic group and submission
/// behaviour attached
pub struct FormContext<T> {
    page: Page,
    alerts: AlertCenter,
    config: FormsConfig,
    transport: T,
    /// Forms carrying the validation marker at bind time
    validated: BTreeSet<String>,
    /// Forms carrying the async marker at bind time
    async_forms: BTreeSet<String>,
}

impl<T: SubmitTransport> FormContext<T> {
    /// Attach every binder to the page
    pub fn bind(mut page: Page, config: FormsConfig, transport: T) -> Self {
        let mut validated = BTreeSet::new();
        let mut async_forms = BTreeSet::new();

        for form in &mut page.forms {
            form.capture_defaults();
            if form.needs_validation() {
                validated.insert(form.id.clone());
            }
            if form.is_async() {
                async_forms.insert(form.id.clone());
            }
        }

        tracing::debug!(
            location = %page.location,
            forms = page.forms.len(),
            validated = validated.len(),
            async_forms = async_forms.len(),
            "bound form layer"
        );

        Self {
            page,
            alerts: AlertCenter::new(config.alert_lifetime()),
            config,
            transport,
            validated,
            async_forms,
        }
    }

    /// End the page view, handing back the page model
    pub fn teardown(self) -> Page {
        tracing::debug!(location = %self.page.location, "tearing down form layer");
        self.page
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn alerts(&self) -> &AlertCenter {
        &self.alerts
    }

    pub fn config(&self) -> &FormsConfig {
        &self.config
    }

    /// Base URL for relative form actions
    fn base_url(&self) -> Url {
        self.config
            .backend_url
            .clone()
            .unwrap_or_else(|| self.page.location.clone())
    }

    /// Route one event to its binder
    pub async fn dispatch(&mut self, event: PageEvent) -> Result<(), FormError> {
        let name = event.name();
        tracing::debug!(event = name, "dispatching page event");

        let result = match event {
            PageEvent::Input { form, field, value } => self.input(&form, &field, value),
            PageEvent::Blur { form, field } => self.blur(&form, &field),
            PageEvent::Submit { form } => self.submit(&form).await,
            PageEvent::FileChange { form, field, files } => {
                self.handle_files(&form, &field, files, None).await
            }
            PageEvent::DragOver { area } => self
                .page
                .drop_area_mut(&area)
                .map(upload::on_drag_over),
            PageEvent::DragLeave { area } => self
                .page
                .drop_area_mut(&area)
                .map(upload::on_drag_leave),
            PageEvent::Drop { area, files } => self.drop_files(&area, files).await,
            PageEvent::AddGroup { control } => self.add_group(&control).map(|_| ()),
            PageEvent::RemoveGroup { container, index } => self.remove_group(&container, index),
        };

        if let Err(e) = &result {
            tracing::warn!(event = name, error = %e, "page event referenced a missing element");
        }
        result
    }

    fn input(&mut self, form: &str, field: &str, value: String) -> Result<(), FormError> {
        self.page
            .form_mut(form)?
            .get_field_mut(field)
            .ok_or_else(|| unknown_field(form, field))?
            .set_text(value);
        Ok(())
    }

    fn blur(&mut self, form_id: &str, field: &str) -> Result<(), FormError> {
        let bound = self.validated.contains(form_id);
        let normalize = self.config.normalize_phone_on_blur;
        let form = self.page.form_mut(form_id)?;
        let field = form
            .get_field_mut(field)
            .ok_or_else(|| unknown_field(form_id, field))?;
        if bound {
            validation::on_blur(field, normalize);
        }
        Ok(())
    }

    /// Run the submit handlers of a form, awaiting the request of an async
    /// form before returning
    pub async fn submit(&mut self, form: &str) -> Result<(), FormError> {
        if let Some(request) = self.begin_submit(form)? {
            let outcome = self.transport.submit(request).await;
            self.finish_submit(form, outcome, Instant::now())?;
        }
        Ok(())
    }

    /// Validate, then lock and serialize an async form.
    ///
    /// Returns `None` when nothing is to be sent: validation blocked the
    /// submission, the form is not async, a request is already in flight,
    /// or the action URL could not be resolved.
    pub fn begin_submit(&mut self, form_id: &str) -> Result<Option<SubmitRequest>, FormError> {
        let base = self.base_url();
        let normalize = self.config.normalize_phone_on_blur;
        let form = self.page.form_mut(form_id)?;

        if self.validated.contains(form_id) {
            if let SubmitVerdict::Blocked { .. } = validation::on_submit(form, normalize) {
                return Ok(None);
            }
        }
        if !self.async_forms.contains(form_id) {
            tracing::debug!(form = form_id, "leaving submission to the browser");
            return Ok(None);
        }

        match submission::begin(form, &base, &self.config.loading_label) {
            Ok(request) => Ok(request),
            Err(e) => {
                submission::finish(form, Err(e), &mut self.alerts, Instant::now());
                Ok(None)
            }
        }
    }

    /// Apply a submission outcome received at `now`
    pub fn finish_submit(
        &mut self,
        form_id: &str,
        outcome: Result<SubmissionResult, SubmitError>,
        now: Instant,
    ) -> Result<(), FormError> {
        let delay = self.config.redirect_delay();
        let form = self.page.form_mut(form_id)?;
        if let Some(target) = submission::finish(form, outcome, &mut self.alerts, now) {
            tracing::info!(form = form_id, redirect = %target, "scheduling redirect");
            self.page.schedule_navigation(target, now + delay);
        }
        Ok(())
    }

    /// Check a new selection, then render its preview and drop-area list
    async fn handle_files(
        &mut self,
        form: &str,
        field_name: &str,
        files: Vec<SelectedFile>,
        area: Option<&str>,
    ) -> Result<(), FormError> {
        let default_max = self.config.default_max_file_size;
        let field = self
            .page
            .form_mut(form)?
            .get_field_mut(field_name)
            .ok_or_else(|| unknown_field(form, field_name))?;
        if field.kind != FieldKind::File {
            return Err(FormError::NotAFileInput(field_name.to_string()));
        }

        let outcome = upload::on_change(field, files, default_max);
        let selected = field.files().to_vec();

        match outcome {
            ChangeOutcome::Rejected(rejection) => {
                self.alerts.error(rejection.to_string(), Instant::now());
            }
            ChangeOutcome::Accepted {
                preview: Some(target),
            } => self.preview(&target, selected.first()).await,
            ChangeOutcome::Accepted { preview: None } => {}
        }

        if let Some(area) = area {
            upload::render_file_list(self.page.drop_area_mut(area)?, &selected);
        }
        Ok(())
    }

    async fn preview(&mut self, target: &str, file: Option<&SelectedFile>) {
        let Some(file) = file else {
            return;
        };
        if !self.page.has_preview_target(target) {
            tracing::debug!(target_selector = target, "no preview target on page");
            return;
        }
        match upload::render_preview(file).await {
            Ok(preview) => {
                self.page.set_preview(target, preview);
            }
            Err(e) => {
                tracing::warn!(file = %file.name, error = %e, "could not read file for preview");
            }
        }
    }

    async fn drop_files(&mut self, area_id: &str, files: Vec<SelectedFile>) -> Result<(), FormError> {
        let area = self.page.drop_area_mut(area_id)?;
        upload::on_drag_leave(area);
        let (form, field) = (area.form.clone(), area.field.clone());
        self.handle_files(&form, &field, files, Some(area_id)).await
    }

    /// Add a group through an add control; returns the new group's index
    pub fn add_group(&mut self, control_id: &str) -> Result<usize, FormError> {
        let control = self.page.add_control(control_id)?.clone();
        let template = self.page.template(&control.template)?.clone();
        let container = self.page.container_mut(&control.container)?;
        Ok(dynamic::add_group(&template, container))
    }

    fn remove_group(&mut self, container: &str, index: usize) -> Result<(), FormError> {
        let container = self.page.container_mut(container)?;
        if !dynamic::remove_group(container, index) {
            tracing::debug!(container = %container.id, index, "no group to remove");
        }
        Ok(())
    }

    /// Apply time-based effects. Returns the new location if a scheduled
    /// redirect fired.
    pub fn tick(&mut self, now: Instant) -> Option<Url> {
        self.alerts.expire(now);
        self.page.apply_due_navigation(now)
    }
}

fn unknown_field(form: &str, field: &str) -> FormError {
    FormError::UnknownField {
        form: form.to_string(),
        field: field.to_string(),
    }
}
