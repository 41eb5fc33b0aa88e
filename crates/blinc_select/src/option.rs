//! Option data model
//!
//! A select's dataset is an ordered list of [`OptionItem`]s. Each item is
//! either a selectable [`OptionLeaf`] or a non-selectable [`OptionGroup`]
//! bundling leaves under a header. Groups never nest.
//!
//! Items deserialize from the JSON shape remote endpoints usually return,
//! which lets `process_data` callbacks build them straight from a body:
//!
//! ```ignore
//! let items: Vec<OptionItem> = serde_json::from_value(json!([
//!     { "value": "us", "label": "United States" },
//!     { "label": "Europe", "children": [{ "value": "de", "label": "Germany" }] },
//! ]))?;
//! ```

use serde::{Deserialize, Serialize};

/// A selectable option
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionLeaf {
    /// The display label (used for the input text, tags and filtering)
    pub label: String,
    /// Markup to render in the dropdown instead of the plain label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_label: Option<String>,
    /// The value submitted with the form
    pub value: String,
    /// Whether this option can be chosen
    #[serde(default)]
    pub disabled: bool,
}

impl OptionLeaf {
    /// Create a new enabled option with value and label
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            html_label: None,
            value: value.into(),
            disabled: false,
        }
    }

    /// Mark this option as disabled
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// Render this markup in the dropdown instead of the label
    pub fn html_label(mut self, html: impl Into<String>) -> Self {
        self.html_label = Some(html.into());
        self
    }

    /// Check if the label contains an already lowercased needle
    pub fn matches(&self, needle_lower: &str) -> bool {
        needle_lower.is_empty() || self.label.to_lowercase().contains(needle_lower)
    }
}

/// A header bundling leaves; carries no value of its own
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionGroup {
    pub label: String,
    pub children: Vec<OptionLeaf>,
}

impl OptionGroup {
    pub fn new(label: impl Into<String>, children: impl IntoIterator<Item = OptionLeaf>) -> Self {
        Self {
            label: label.into(),
            children: children.into_iter().collect(),
        }
    }

    /// Whether a header should be shown for this group
    ///
    /// Groups with a blank label still bundle their children but render
    /// without a header row.
    pub fn has_header(&self) -> bool {
        !self.label.trim().is_empty()
    }
}

/// A top-level catalog entry
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionItem {
    Group(OptionGroup),
    Leaf(OptionLeaf),
}

impl OptionItem {
    pub fn label(&self) -> &str {
        match self {
            OptionItem::Group(group) => &group.label,
            OptionItem::Leaf(leaf) => &leaf.label,
        }
    }

    /// The leaf's value; groups have none
    pub fn value(&self) -> Option<&str> {
        match self {
            OptionItem::Group(_) => None,
            OptionItem::Leaf(leaf) => Some(&leaf.value),
        }
    }

    /// Iterate the selectable leaves of this item in display order
    pub fn leaves(&self) -> impl Iterator<Item = &OptionLeaf> {
        let slice = match self {
            OptionItem::Group(group) => group.children.as_slice(),
            OptionItem::Leaf(leaf) => std::slice::from_ref(leaf),
        };
        slice.iter()
    }
}

impl From<OptionLeaf> for OptionItem {
    fn from(leaf: OptionLeaf) -> Self {
        OptionItem::Leaf(leaf)
    }
}

impl From<OptionGroup> for OptionItem {
    fn from(group: OptionGroup) -> Self {
        OptionItem::Group(group)
    }
}
