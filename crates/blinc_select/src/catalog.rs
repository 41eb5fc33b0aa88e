//! Static option catalog
//!
//! In local mode the dataset is read once from the source list and filtered
//! in memory as the user types. Filtering keeps display order and returns a
//! fresh copy; the catalog itself never changes after construction.

use crate::option::{OptionGroup, OptionItem, OptionLeaf};
use crate::source::{SourceEntry, SourceList, SourceNode};

/// The immutable dataset of a select in local mode
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OptionCatalog {
    items: Vec<OptionItem>,
}

impl OptionCatalog {
    pub fn new(items: Vec<OptionItem>) -> Self {
        Self { items }
    }

    /// Build the catalog from the source list's options and groups
    pub fn load(source: &dyn SourceList) -> Self {
        let items = source
            .nodes()
            .into_iter()
            .map(|node| match node {
                SourceNode::Entry(entry) => OptionItem::Leaf(leaf_from_entry(entry)),
                SourceNode::Group { label, entries } => OptionItem::Group(OptionGroup::new(
                    label,
                    entries.into_iter().map(leaf_from_entry),
                )),
            })
            .collect();
        Self { items }
    }

    pub fn items(&self) -> &[OptionItem] {
        &self.items
    }

    /// Find a leaf anywhere in the catalog by value
    pub fn find(&self, value: &str) -> Option<&OptionLeaf> {
        self.items
            .iter()
            .flat_map(|item| item.leaves())
            .find(|leaf| leaf.value == value)
    }

    /// Items whose label contains the trimmed query, ignoring case
    ///
    /// A group is kept, with only its matching children, when at least one
    /// child matches. A missing or blank query yields the whole catalog.
    pub fn filter(&self, query: Option<&str>) -> Vec<OptionItem> {
        let needle = query.map(str::trim).unwrap_or_default().to_lowercase();
        if needle.is_empty() {
            return self.items.clone();
        }

        self.items
            .iter()
            .filter_map(|item| match item {
                OptionItem::Leaf(leaf) => leaf.matches(&needle).then(|| item.clone()),
                OptionItem::Group(group) => {
                    let children: Vec<OptionLeaf> = group
                        .children
                        .iter()
                        .filter(|child| child.matches(&needle))
                        .cloned()
                        .collect();
                    (!children.is_empty()).then(|| {
                        OptionItem::Group(OptionGroup {
                            label: group.label.clone(),
                            children,
                        })
                    })
                }
            })
            .collect()
    }
}

fn leaf_from_entry(entry: SourceEntry) -> OptionLeaf {
    OptionLeaf {
        label: entry.label,
        html_label: None,
        value: entry.value,
        disabled: entry.disabled,
    }
}
