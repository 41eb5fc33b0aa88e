//! Source-of-truth adapter
//!
//! The select mirrors its state onto an external list that the host form
//! actually submits (a native `<select>` element, a form model, ...). The
//! engine never assumes a particular host widget; it only needs the
//! capabilities in [`SourceList`].
//!
//! [`NativeSelect`] is an in-memory implementation with native select
//! semantics, useful for headless hosts and tests.

/// One option of the source list
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceEntry {
    pub value: String,
    pub label: String,
    pub disabled: bool,
    pub selected: bool,
}

impl SourceEntry {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            disabled: false,
            selected: false,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    pub fn selected(mut self) -> Self {
        self.selected = true;
        self
    }
}

/// A top-level node of the source list, in document order
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SourceNode {
    Entry(SourceEntry),
    Group {
        label: String,
        entries: Vec<SourceEntry>,
    },
}

/// Capabilities the engine needs from the source-of-truth list
pub trait SourceList {
    /// Enumerate top-level nodes in document order
    fn nodes(&self) -> Vec<SourceNode>;

    /// Mark or unmark the entry with `value` as selected
    ///
    /// Returns `false` if no such entry exists.
    fn set_selected(&mut self, value: &str, selected: bool) -> bool;

    /// Append a synthesized, unselected entry at the end of the list
    fn append(&mut self, value: &str, label: &str);

    /// Whether the list natively allows several selected entries
    fn is_multiple(&self) -> bool;

    /// Switch the list to the selection mode the select resolved
    fn set_multiple(&mut self, multiple: bool);

    /// All entries with groups flattened, in document order
    fn entries(&self) -> Vec<SourceEntry> {
        let mut out = Vec::new();
        for node in self.nodes() {
            match node {
                SourceNode::Entry(entry) => out.push(entry),
                SourceNode::Group { entries, .. } => out.extend(entries),
            }
        }
        out
    }

    fn contains(&self, value: &str) -> bool {
        self.entries().iter().any(|e| e.value == value)
    }

    /// Values of the entries currently marked selected
    fn selected_values(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|e| e.selected)
            .map(|e| e.value)
            .collect()
    }
}

/// In-memory source list with native select semantics
#[derive(Clone, Debug, Default)]
pub struct NativeSelect {
    nodes: Vec<SourceNode>,
    multiple: bool,
}

impl NativeSelect {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow several selected entries
    pub fn multiple(mut self, multiple: bool) -> Self {
        self.multiple = multiple;
        self
    }

    /// Add an option with value and label
    pub fn option(self, value: impl Into<String>, label: impl Into<String>) -> Self {
        self.entry(SourceEntry::new(value, label))
    }

    /// Add a pre-configured entry
    pub fn entry(mut self, entry: SourceEntry) -> Self {
        self.nodes.push(SourceNode::Entry(entry));
        self
    }

    /// Add an option group
    pub fn group(
        mut self,
        label: impl Into<String>,
        entries: impl IntoIterator<Item = SourceEntry>,
    ) -> Self {
        self.nodes.push(SourceNode::Group {
            label: label.into(),
            entries: entries.into_iter().collect(),
        });
        self
    }

    fn entries_mut(&mut self) -> impl Iterator<Item = &mut SourceEntry> {
        self.nodes.iter_mut().flat_map(|node| match node {
            SourceNode::Entry(entry) => std::slice::from_mut(entry).iter_mut(),
            SourceNode::Group { entries, .. } => entries.iter_mut(),
        })
    }
}

impl SourceList for NativeSelect {
    fn nodes(&self) -> Vec<SourceNode> {
        self.nodes.clone()
    }

    fn set_selected(&mut self, value: &str, selected: bool) -> bool {
        let multiple = self.multiple;
        let mut found = false;
        for entry in self.entries_mut() {
            if entry.value == value {
                entry.selected = selected;
                found = true;
            } else if selected && !multiple {
                // A single select holds at most one selected entry
                entry.selected = false;
            }
        }
        found
    }

    fn append(&mut self, value: &str, label: &str) {
        self.nodes
            .push(SourceNode::Entry(SourceEntry::new(value, label)));
    }

    fn is_multiple(&self) -> bool {
        self.multiple
    }

    fn set_multiple(&mut self, multiple: bool) {
        self.multiple = multiple;
    }
}
