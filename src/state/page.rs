//! Page model: the markup the binders attach to

use super::forms::{FieldTemplate, Form, GroupContainer};
use crate::error::FormError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;
use url::Url;

/// Content rendered into a preview target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Preview {
    /// Image thumbnail read as a data URL
    Image { data_url: String, caption: String },
    /// Icon placeholder for non-image files
    File { caption: String },
}

/// An "add group" button (`data-template` + `data-container`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddControl {
    pub id: String,
    /// Template element id
    #[serde(alias = "data-template")]
    pub template: String,
    /// Container selector, e.g. `#variants`
    #[serde(alias = "data-container")]
    pub container: String,
}

/// A drag-and-drop region wrapping one file input
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DropArea {
    pub id: String,
    pub form: String,
    pub field: String,
    pub classes: BTreeSet<String>,
    /// Rendered file list entries ("name (size)")
    pub file_list: Vec<String>,
}

/// A navigation waiting for its delay to elapse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledNavigation {
    pub target: String,
    pub due: Instant,
}

/// Everything the form layer can see of one page view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    pub location: Url,
    #[serde(default)]
    pub forms: Vec<Form>,
    #[serde(default)]
    pub templates: BTreeMap<String, FieldTemplate>,
    #[serde(default)]
    pub add_controls: Vec<AddControl>,
    /// Preview targets by element id
    #[serde(default)]
    pub previews: BTreeMap<String, Option<Preview>>,
    #[serde(default)]
    pub drop_areas: Vec<DropArea>,
    #[serde(skip)]
    pending_navigation: Option<ScheduledNavigation>,
}

/// Strip the `#` of an id selector
fn selector_id(selector: &str) -> &str {
    selector.strip_prefix('#').unwrap_or(selector)
}

impl Page {
    pub fn new(location: Url) -> Self {
        Self {
            location,
            forms: Vec::new(),
            templates: BTreeMap::new(),
            add_controls: Vec::new(),
            previews: BTreeMap::new(),
            drop_areas: Vec::new(),
            pending_navigation: None,
        }
    }

    pub fn form(&self, id: &str) -> Result<&Form, FormError> {
        self.forms
            .iter()
            .find(|f| f.id == id)
            .ok_or_else(|| FormError::UnknownForm(id.to_string()))
    }

    pub fn form_mut(&mut self, id: &str) -> Result<&mut Form, FormError> {
        self.forms
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| FormError::UnknownForm(id.to_string()))
    }

    pub fn template(&self, id: &str) -> Result<&FieldTemplate, FormError> {
        self.templates
            .get(id)
            .ok_or_else(|| FormError::UnknownTemplate(id.to_string()))
    }

    pub fn add_control(&self, id: &str) -> Result<&AddControl, FormError> {
        self.add_controls
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| FormError::UnknownControl(id.to_string()))
    }

    /// Resolve a container selector across every form on the page
    pub fn container_mut(&mut self, selector: &str) -> Result<&mut GroupContainer, FormError> {
        let id = selector_id(selector);
        self.forms
            .iter_mut()
            .flat_map(|f| f.containers.iter_mut())
            .find(|c| c.id == id)
            .ok_or_else(|| FormError::UnknownContainer(selector.to_string()))
    }

    pub fn drop_area(&self, id: &str) -> Result<&DropArea, FormError> {
        self.drop_areas
            .iter()
            .find(|a| a.id == id)
            .ok_or_else(|| FormError::UnknownDropArea(id.to_string()))
    }

    pub fn drop_area_mut(&mut self, id: &str) -> Result<&mut DropArea, FormError> {
        self.drop_areas
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| FormError::UnknownDropArea(id.to_string()))
    }

    /// Whether a preview target matches `selector`
    pub fn has_preview_target(&self, selector: &str) -> bool {
        self.previews.contains_key(selector_id(selector))
    }

    /// Render into a preview target; returns false when nothing matches
    pub fn set_preview(&mut self, selector: &str, preview: Preview) -> bool {
        match self.previews.get_mut(selector_id(selector)) {
            Some(slot) => {
                *slot = Some(preview);
                true
            }
            None => false,
        }
    }

    pub fn preview(&self, selector: &str) -> Option<&Preview> {
        self.previews
            .get(selector_id(selector))
            .and_then(Option::as_ref)
    }

    pub fn schedule_navigation(&mut self, target: String, due: Instant) {
        self.pending_navigation = Some(ScheduledNavigation { target, due });
    }

    pub fn pending_navigation(&self) -> Option<&ScheduledNavigation> {
        self.pending_navigation.as_ref()
    }

    /// Navigate if a scheduled navigation is due. Returns the new location.
    ///
    /// A target that does not resolve against the current location is
    /// dropped with a warning.
    pub fn apply_due_navigation(&mut self, now: Instant) -> Option<Url> {
        if !self.pending_navigation.as_ref().is_some_and(|n| now >= n.due) {
            return None;
        }
        let navigation = self.pending_navigation.take()?;
        match self.location.join(&navigation.target) {
            Ok(url) => {
                tracing::info!(from = %self.location, to = %url, "navigating");
                self.location = url.clone();
                Some(url)
            }
            Err(e) => {
                tracing::warn!(redirect = %navigation.target, error = %e, "ignoring unresolvable redirect");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::forms::{FieldKind, FormField};
    use std::time::Duration;

    fn page() -> Page {
        let mut page = Page::new(Url::parse("https://shop.example/products/new").unwrap());
        page.forms.push(
            Form::new("product", "/products")
                .field(FormField::new("name", FieldKind::Text))
                .container(GroupContainer::new("variants")),
        );
        page.previews.insert("logo-preview".to_string(), None);
        page
    }

    #[test]
    fn test_form_lookup() {
        let page = page();
        assert!(page.form("product").is_ok());
        assert_eq!(
            page.form("missing").unwrap_err(),
            FormError::UnknownForm("missing".to_string())
        );
    }

    #[test]
    fn test_container_selector_resolution() {
        let mut page = page();
        assert!(page.container_mut("#variants").is_ok());
        assert!(page.container_mut("variants").is_ok());
        assert!(matches!(
            page.container_mut("#nope"),
            Err(FormError::UnknownContainer(_))
        ));
    }

    #[test]
    fn test_set_preview_only_on_declared_targets() {
        let mut page = page();
        let preview = Preview::File {
            caption: "a.pdf (1 KB)".to_string(),
        };
        assert!(page.has_preview_target("#logo-preview"));
        assert!(page.set_preview("#logo-preview", preview.clone()));
        assert_eq!(page.preview("#logo-preview"), Some(&preview));

        assert!(!page.set_preview("#other", preview));
    }

    #[test]
    fn test_navigation_waits_for_delay() {
        let mut page = page();
        let start = Instant::now();
        page.schedule_navigation("/products".to_string(), start + Duration::from_secs(1));

        assert!(page.apply_due_navigation(start).is_none());
        assert!(page.pending_navigation().is_some());

        let url = page
            .apply_due_navigation(start + Duration::from_secs(1))
            .unwrap();
        assert_eq!(url.as_str(), "https://shop.example/products");
        assert_eq!(page.location, url);
        assert!(page.pending_navigation().is_none());
    }

    #[test]
    fn test_deserialize_page() {
        let json = r##"{
            "location": "https://shop.example/",
            "forms": [{"id": "f", "action": "/x", "classes": ["ajax-form"]}],
            "previews": {"p": null},
            "add_controls": [{"id": "add", "template": "row", "container": "#rows"}]
        }"##;
        let page: Page = serde_json::from_str(json).unwrap();
        assert!(page.form("f").unwrap().is_async());
        assert!(page.has_preview_target("#p"));
        assert_eq!(page.add_control("add").unwrap().template, "row");
    }
}
