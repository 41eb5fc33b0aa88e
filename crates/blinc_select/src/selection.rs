//! Selection model
//!
//! The authoritative record of chosen values. Every mutation is mirrored onto
//! the [`SourceList`] in the same call, and every mutation reports what
//! changed so the caller can update selected markers and tags before the
//! next event is processed.

use indexmap::IndexSet;

use crate::source::SourceList;

/// What a selection mutation changed
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectionChange {
    /// Value that became selected
    pub added: Option<String>,
    /// Values that stopped being selected, in selection order
    pub removed: Vec<String>,
}

impl SelectionChange {
    pub fn is_empty(&self) -> bool {
        self.added.is_none() && self.removed.is_empty()
    }
}

/// Ordered set of selected values, synchronized with a source list
#[derive(Clone, Debug, Default)]
pub struct SelectionModel {
    /// Insertion order doubles as tag order in multi-select mode
    selected: IndexSet<String>,
    multiple: bool,
    /// Remote values may be missing from the source and get synthesized
    remote: bool,
}

impl SelectionModel {
    pub fn new(multiple: bool, remote: bool) -> Self {
        Self {
            selected: IndexSet::new(),
            multiple,
            remote,
        }
    }

    pub fn is_multiple(&self) -> bool {
        self.multiple
    }

    /// Seed the model from entries already selected in the source list
    ///
    /// A single select keeps only the last selected entry, matching how a
    /// native single select resolves several `selected` options.
    pub fn sync_from_source(&mut self, source: &dyn SourceList) {
        self.selected.clear();
        let values = source.selected_values();
        if self.multiple {
            self.selected.extend(values);
        } else if let Some(last) = values.into_iter().last() {
            self.selected.insert(last);
        }
    }

    /// Select a value
    ///
    /// In single-select mode the previous holder is deselected. Selecting an
    /// already selected value changes nothing.
    pub fn select(
        &mut self,
        value: &str,
        label: &str,
        source: &mut dyn SourceList,
    ) -> SelectionChange {
        if !source.contains(value) {
            if !self.remote {
                tracing::debug!("Ignoring selection of unknown value {:?}", value);
                return SelectionChange::default();
            }
            source.append(value, label);
        }

        if self.selected.contains(value) {
            source.set_selected(value, true);
            return SelectionChange::default();
        }

        let mut change = SelectionChange::default();
        if !self.multiple {
            for old in self.selected.drain(..) {
                source.set_selected(&old, false);
                change.removed.push(old);
            }
        }

        source.set_selected(value, true);
        self.selected.insert(value.to_string());
        change.added = Some(value.to_string());
        change
    }

    /// Deselect a value; deselecting an unselected value changes nothing
    pub fn deselect(&mut self, value: &str, source: &mut dyn SourceList) -> SelectionChange {
        source.set_selected(value, false);
        if self.selected.shift_remove(value) {
            SelectionChange {
                added: None,
                removed: vec![value.to_string()],
            }
        } else {
            SelectionChange::default()
        }
    }

    /// Select the value if unselected, otherwise deselect it
    pub fn toggle(
        &mut self,
        value: &str,
        label: &str,
        source: &mut dyn SourceList,
    ) -> SelectionChange {
        if self.is_selected(value) {
            self.deselect(value, source)
        } else {
            self.select(value, label, source)
        }
    }

    /// Deselect everything, including source entries selected behind our back
    pub fn clear(&mut self, source: &mut dyn SourceList) -> SelectionChange {
        for value in source.selected_values() {
            source.set_selected(&value, false);
        }
        SelectionChange {
            added: None,
            removed: self.selected.drain(..).collect(),
        }
    }

    pub fn is_selected(&self, value: &str) -> bool {
        self.selected.contains(value)
    }

    /// Selected values in the order they were selected
    pub fn selected_values(&self) -> &IndexSet<String> {
        &self.selected
    }

    /// The most recently selected value
    pub fn last(&self) -> Option<&str> {
        self.selected.last().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }
}
