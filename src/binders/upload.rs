//! File-upload binder
//!
//! Size and type checks for file inputs, preview rendering and the
//! drag-and-drop affordance. Click-to-browse and drop both end up in
//! [`on_change`].

use crate::state::{DropArea, FormField, Preview, SelectedFile};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;

/// Maximum size in bytes
pub const MAX_SIZE_ATTR: &str = "data-max-size";
/// Comma-separated MIME types
pub const ALLOWED_TYPES_ATTR: &str = "data-allowed-types";
/// Selector of the element receiving the preview
pub const PREVIEW_ATTR: &str = "data-preview";
/// Class toggled on a drop area while files are dragged over it
pub const DRAGOVER_CLASS: &str = "dragover";

/// Limit used when an input declares no `data-max-size` (5 MiB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Human-readable size: 1024-based, at most two decimals
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let k = 1024f64;
    let bytes = bytes as f64;
    let exp = ((bytes.ln() / k.ln()).floor() as usize).min(SIZE_UNITS.len() - 1);
    let value = bytes / k.powi(exp as i32);
    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, SIZE_UNITS[exp])
}

fn human_size(bytes: &u64) -> String {
    format_file_size(*bytes)
}

/// Why a selection was voided; the message is what the user sees
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FileRejection {
    #[error("File {name} is too large. Maximum size is {}.", human_size(.max))]
    TooLarge { name: String, size: u64, max: u64 },

    #[error("File {name} has an invalid type. Allowed types: {allowed}")]
    DisallowedType {
        name: String,
        mime: String,
        allowed: String,
    },
}

/// Constraints declared on one file input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileConstraint {
    pub max_size: u64,
    pub allowed_types: Option<Vec<String>>,
    /// Attribute text, quoted back in rejection messages
    allowed_raw: String,
}

impl FileConstraint {
    pub fn new(max_size: u64, allowed_types: Option<&str>) -> Self {
        let allowed_raw = allowed_types.unwrap_or_default().to_string();
        let allowed_types = allowed_types
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| raw.split(',').map(|t| t.trim().to_string()).collect());
        Self {
            max_size,
            allowed_types,
            allowed_raw,
        }
    }

    /// Read the constraint from the input's attributes
    pub fn from_field(field: &FormField, default_max: u64) -> Self {
        let max_size = match field.get_attr(MAX_SIZE_ATTR) {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                tracing::warn!(field = %field.name, value = raw, "ignoring unparsable {MAX_SIZE_ATTR}");
                default_max
            }),
            None => default_max,
        };
        Self::new(max_size, field.get_attr(ALLOWED_TYPES_ATTR))
    }

    pub fn check(&self, file: &SelectedFile) -> Result<(), FileRejection> {
        if file.size > self.max_size {
            return Err(FileRejection::TooLarge {
                name: file.name.clone(),
                size: file.size,
                max: self.max_size,
            });
        }
        if let Some(allowed) = &self.allowed_types {
            if !allowed.iter().any(|t| *t == file.mime) {
                return Err(FileRejection::DisallowedType {
                    name: file.name.clone(),
                    mime: file.mime.clone(),
                    allowed: self.allowed_raw.clone(),
                });
            }
        }
        Ok(())
    }

    /// Check every file; the first violation voids the whole selection
    pub fn check_all(&self, files: &[SelectedFile]) -> Result<(), FileRejection> {
        files.iter().try_for_each(|f| self.check(f))
    }
}

/// What happened to a new selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeOutcome {
    /// Selection cleared
    Rejected(FileRejection),
    /// Selection kept; `preview` is the declared preview selector, if any
    Accepted { preview: Option<String> },
}

/// Change handler: assign the selection, check it, and clear it on the
/// first violation
pub fn on_change(
    field: &mut FormField,
    files: Vec<SelectedFile>,
    default_max: u64,
) -> ChangeOutcome {
    let constraint = FileConstraint::from_field(field, default_max);
    field.set_files(files);

    if let Err(rejection) = constraint.check_all(field.files()) {
        tracing::warn!(field = %field.name, %rejection, "file selection rejected");
        field.set_files(Vec::new());
        return ChangeOutcome::Rejected(rejection);
    }

    tracing::debug!(field = %field.name, count = field.files().len(), "file selection accepted");
    ChangeOutcome::Accepted {
        preview: field.get_attr(PREVIEW_ATTR).map(str::to_string),
    }
}

fn caption(file: &SelectedFile) -> String {
    format!("{} ({})", file.name, format_file_size(file.size))
}

/// Render the preview for one file. Images are read into a data URL.
pub async fn render_preview(file: &SelectedFile) -> std::io::Result<Preview> {
    if !file.is_image() {
        return Ok(Preview::File {
            caption: caption(file),
        });
    }
    let bytes = file.read_bytes().await?;
    Ok(Preview::Image {
        data_url: format!("data:{};base64,{}", file.mime, STANDARD.encode(bytes)),
        caption: caption(file),
    })
}

pub fn on_drag_over(area: &mut DropArea) {
    area.classes.insert(DRAGOVER_CLASS.to_string());
}

pub fn on_drag_leave(area: &mut DropArea) {
    area.classes.remove(DRAGOVER_CLASS);
}

/// Redraw a drop area's file list from the input's current selection
pub fn render_file_list(area: &mut DropArea, files: &[SelectedFile]) {
    area.file_list = files.iter().map(caption).collect();
}
