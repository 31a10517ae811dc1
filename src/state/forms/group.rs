//! Repeatable field groups and the templates they are instantiated from

use super::field::{Constraints, FieldKind, FormField};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Token replaced by the group index inside template attributes
pub const INDEX_PLACEHOLDER: &str = "__INDEX__";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Index,
}

/// An attribute value containing zero or more index placeholders,
/// parsed once so that instantiation never touches raw strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct IndexedName {
    segments: Vec<Segment>,
}

impl IndexedName {
    pub fn parse(raw: &str) -> Self {
        let mut segments = Vec::new();
        let mut rest = raw;
        while let Some(pos) = rest.find(INDEX_PLACEHOLDER) {
            if pos > 0 {
                segments.push(Segment::Literal(rest[..pos].to_string()));
            }
            segments.push(Segment::Index);
            rest = &rest[pos + INDEX_PLACEHOLDER.len()..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }
        Self { segments }
    }

    /// Substitute every placeholder with `index`
    pub fn render(&self, index: usize) -> String {
        self.segments
            .iter()
            .map(|segment| match segment {
                Segment::Literal(s) => s.clone(),
                Segment::Index => index.to_string(),
            })
            .collect()
    }

    pub fn is_indexed(&self) -> bool {
        self.segments.iter().any(|s| matches!(s, Segment::Index))
    }
}

impl From<String> for IndexedName {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<&str> for IndexedName {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<IndexedName> for String {
    fn from(name: IndexedName) -> Self {
        name.to_string()
    }
}

impl fmt::Display for IndexedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            match segment {
                Segment::Literal(s) => f.write_str(s)?,
                Segment::Index => f.write_str(INDEX_PLACEHOLDER)?,
            }
        }
        Ok(())
    }
}

/// One input inside a template fragment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateField {
    pub name: IndexedName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<IndexedName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: FieldKind,
    #[serde(default)]
    pub value: String,
    #[serde(flatten)]
    pub constraints: Constraints,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,
}

impl TemplateField {
    pub fn new(name: &str, kind: FieldKind) -> Self {
        Self {
            name: IndexedName::parse(name),
            id: None,
            label: None,
            kind,
            value: String::new(),
            constraints: Constraints::default(),
            attrs: BTreeMap::new(),
        }
    }

    pub fn id(mut self, id: &str) -> Self {
        self.id = Some(IndexedName::parse(id));
        self
    }

    fn instantiate(&self, index: usize) -> FormField {
        let mut field = FormField::with_value(&self.name.render(index), self.kind, &self.value);
        if self.kind == FieldKind::File {
            field.reset();
        }
        field.id = self.id.as_ref().map(|id| id.render(index));
        field.label = self.label.clone();
        field.constraints = self.constraints.clone();
        field.attrs = self.attrs.clone();
        field
    }
}

/// A `<label for=...>` inside a template fragment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateLabel {
    #[serde(rename = "for", default, skip_serializing_if = "Option::is_none")]
    pub for_id: Option<IndexedName>,
    #[serde(default)]
    pub text: String,
}

/// A `<template>` fragment that dynamic groups are cloned from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldTemplate {
    pub fields: Vec<TemplateField>,
    pub labels: Vec<TemplateLabel>,
}

impl FieldTemplate {
    /// Build the group for `index`, substituting the index into every
    /// name, id and label target
    pub fn instantiate(&self, index: usize) -> FieldGroup {
        FieldGroup {
            index,
            fields: self.fields.iter().map(|f| f.instantiate(index)).collect(),
            labels: self
                .labels
                .iter()
                .map(|l| Label {
                    for_id: l.for_id.as_ref().map(|f| f.render(index)),
                    text: l.text.clone(),
                })
                .collect(),
        }
    }
}

/// A rendered label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    #[serde(rename = "for", default, skip_serializing_if = "Option::is_none")]
    pub for_id: Option<String>,
    #[serde(default)]
    pub text: String,
}

/// An instantiated dynamic field group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldGroup {
    pub index: usize,
    #[serde(default)]
    pub fields: Vec<FormField>,
    #[serde(default)]
    pub labels: Vec<Label>,
}

/// Element that dynamic groups are appended to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupContainer {
    pub id: String,
    pub groups: Vec<FieldGroup>,
    /// One past the highest index ever handed out by this container
    #[serde(skip)]
    high_water: usize,
}

impl GroupContainer {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            ..Default::default()
        }
    }

    /// Index for the next group: the child count, raised past any index
    /// that is live or was handed out before
    pub fn next_index(&self) -> usize {
        let live = self.groups.iter().map(|g| g.index + 1).max().unwrap_or(0);
        self.groups.len().max(live).max(self.high_water)
    }

    pub fn push(&mut self, group: FieldGroup) {
        self.high_water = self.high_water.max(group.index + 1);
        self.groups.push(group);
    }

    /// Remove the group with `index`; returns false when no such group exists.
    /// The high-water mark is raised first so groups loaded with the page
    /// never have their index handed out again.
    pub fn remove(&mut self, index: usize) -> bool {
        self.high_water = self.next_index();
        let before = self.groups.len();
        self.groups.retain(|g| g.index != index);
        self.groups.len() != before
    }

    pub fn indices(&self) -> Vec<usize> {
        self.groups.iter().map(|g| g.index).collect()
    }
}
