//! Rendering collaborator
//!
//! The engine never draws. It pushes every visible change to a
//! [`RenderSurface`] and addresses rendered rows through opaque
//! [`ItemHandle`]s the surface hands back. Focus is owned by the surface too,
//! because the host platform decides what is focused; the engine re-queries
//! it on every navigation command instead of caching positions.
//!
//! [`RecordingSurface`] keeps the whole presentation in memory. It backs
//! headless hosts and is what the tests assert against.

use rustc_hash::FxHashSet;

use crate::option::{OptionGroup, OptionLeaf};

/// Opaque reference to a rendered option row
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemHandle(u64);

impl ItemHandle {
    pub fn from_raw(raw: u64) -> Self {
        ItemHandle(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// What the surface knows about a rendered option row
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedItem {
    pub value: String,
    pub label: String,
    pub disabled: bool,
    pub selected: bool,
    pub group: Option<String>,
}

/// Presentation capabilities the engine drives
pub trait RenderSurface {
    /// Remove every option row and group from the dropdown
    fn clear_items(&mut self);

    /// Whether a group with this label is currently rendered
    fn has_group(&self, label: &str) -> bool;

    /// Append an empty group container (with a header if the label is not blank)
    fn render_group(&mut self, group: &OptionGroup);

    /// Render an option row at the end of `group`, or at the end of the list
    fn render_leaf(&mut self, leaf: &OptionLeaf, group: Option<&str>, selected: bool)
        -> ItemHandle;

    fn item(&self, handle: ItemHandle) -> Option<RenderedItem>;

    /// Rendered rows carrying `value`
    fn items_with_value(&self, value: &str) -> Vec<ItemHandle>;

    /// Add or remove the selected marker on a row
    fn set_item_selected(&mut self, handle: ItemHandle, selected: bool);

    /// Enabled option rows in display order
    fn navigable_items(&self) -> Vec<ItemHandle>;

    /// The option row holding input focus, if any
    fn focused_item(&self) -> Option<ItemHandle>;

    fn focus_item(&mut self, handle: ItemHandle);

    fn focus_input(&mut self);

    fn input_text(&self) -> String;

    fn set_input_text(&mut self, text: &str);

    fn set_placeholder(&mut self, text: &str);

    /// Append a tag chip for a selected value (multi-select)
    fn append_tag(&mut self, value: &str, label: &str);

    fn remove_tag(&mut self, value: &str);

    /// Show the trailing loading indicator watched by the visibility sensor
    fn show_loader(&mut self);

    fn hide_loader(&mut self);

    /// Show or hide the dropdown
    fn set_open(&mut self, open: bool);
}

#[derive(Clone, Debug)]
enum Row {
    Header(String),
    Leaf(ItemHandle, RenderedItem),
}

/// Where the host's input focus currently is
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SurfaceFocus {
    #[default]
    None,
    Input,
    Item(ItemHandle),
}

/// In-memory [`RenderSurface`]
#[derive(Clone, Debug, Default)]
pub struct RecordingSurface {
    rows: Vec<Row>,
    groups: FxHashSet<String>,
    next_handle: u64,
    focus: SurfaceFocus,
    input_text: String,
    placeholder: String,
    tags: Vec<(String, String)>,
    loader: bool,
    open: bool,
    rebuilds: usize,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Labels of all option rows in display order
    pub fn labels(&self) -> Vec<String> {
        self.leaves().map(|(_, item)| item.label.clone()).collect()
    }

    /// Group headers in display order
    pub fn headers(&self) -> Vec<String> {
        self.rows
            .iter()
            .filter_map(|row| match row {
                Row::Header(label) => Some(label.clone()),
                Row::Leaf(..) => None,
            })
            .collect()
    }

    /// Values of rows carrying the selected marker
    pub fn selected_values(&self) -> Vec<String> {
        self.leaves()
            .filter(|(_, item)| item.selected)
            .map(|(_, item)| item.value.clone())
            .collect()
    }

    /// First row with the given label
    pub fn handle_for_label(&self, label: &str) -> Option<ItemHandle> {
        self.leaves()
            .find(|(_, item)| item.label == label)
            .map(|(handle, _)| handle)
    }

    /// Values of the tag chips, oldest first
    pub fn tag_values(&self) -> Vec<String> {
        self.tags.iter().map(|(value, _)| value.clone()).collect()
    }

    pub fn tag_labels(&self) -> Vec<String> {
        self.tags.iter().map(|(_, label)| label.clone()).collect()
    }

    pub fn focus(&self) -> SurfaceFocus {
        self.focus
    }

    /// Label of the focused row
    pub fn focused_label(&self) -> Option<String> {
        match self.focus {
            SurfaceFocus::Item(handle) => self.item(handle).map(|item| item.label),
            _ => None,
        }
    }

    /// Simulate focus leaving the host (window blur or outside click)
    pub fn blur(&mut self) {
        self.focus = SurfaceFocus::None;
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub fn loader_visible(&self) -> bool {
        self.loader
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// How many times the item list was rebuilt from scratch
    pub fn rebuilds(&self) -> usize {
        self.rebuilds
    }

    fn leaves(&self) -> impl Iterator<Item = (ItemHandle, &RenderedItem)> {
        self.rows.iter().filter_map(|row| match row {
            Row::Leaf(handle, item) => Some((*handle, item)),
            Row::Header(_) => None,
        })
    }

    fn leaf_mut(&mut self, handle: ItemHandle) -> Option<&mut RenderedItem> {
        self.rows.iter_mut().find_map(|row| match row {
            Row::Leaf(h, item) if *h == handle => Some(item),
            _ => None,
        })
    }

    /// Index just past the last row belonging to `group`
    fn group_end(&self, group: &str) -> Option<usize> {
        self.rows
            .iter()
            .rposition(|row| match row {
                Row::Header(label) => label == group,
                Row::Leaf(_, item) => item.group.as_deref() == Some(group),
            })
            .map(|idx| idx + 1)
    }
}

impl RenderSurface for RecordingSurface {
    fn clear_items(&mut self) {
        self.rows.clear();
        self.groups.clear();
        if matches!(self.focus, SurfaceFocus::Item(_)) {
            self.focus = SurfaceFocus::None;
        }
        self.rebuilds += 1;
    }

    fn has_group(&self, label: &str) -> bool {
        self.groups.contains(label)
    }

    fn render_group(&mut self, group: &OptionGroup) {
        self.groups.insert(group.label.clone());
        if group.has_header() {
            self.rows.push(Row::Header(group.label.clone()));
        }
    }

    fn render_leaf(
        &mut self,
        leaf: &OptionLeaf,
        group: Option<&str>,
        selected: bool,
    ) -> ItemHandle {
        let handle = ItemHandle(self.next_handle);
        self.next_handle += 1;

        let item = RenderedItem {
            value: leaf.value.clone(),
            label: leaf.label.clone(),
            disabled: leaf.disabled,
            selected,
            group: group.map(str::to_string),
        };

        let at = match group {
            Some(label) => {
                self.groups.insert(label.to_string());
                self.group_end(label).unwrap_or(self.rows.len())
            }
            None => self.rows.len(),
        };
        self.rows.insert(at, Row::Leaf(handle, item));
        handle
    }

    fn item(&self, handle: ItemHandle) -> Option<RenderedItem> {
        self.leaves()
            .find(|(h, _)| *h == handle)
            .map(|(_, item)| item.clone())
    }

    fn items_with_value(&self, value: &str) -> Vec<ItemHandle> {
        self.leaves()
            .filter(|(_, item)| item.value == value)
            .map(|(handle, _)| handle)
            .collect()
    }

    fn set_item_selected(&mut self, handle: ItemHandle, selected: bool) {
        if let Some(item) = self.leaf_mut(handle) {
            item.selected = selected;
        }
    }

    fn navigable_items(&self) -> Vec<ItemHandle> {
        self.leaves()
            .filter(|(_, item)| !item.disabled)
            .map(|(handle, _)| handle)
            .collect()
    }

    fn focused_item(&self) -> Option<ItemHandle> {
        match self.focus {
            SurfaceFocus::Item(handle) => Some(handle),
            _ => None,
        }
    }

    fn focus_item(&mut self, handle: ItemHandle) {
        if self.item(handle).is_some() {
            self.focus = SurfaceFocus::Item(handle);
        }
    }

    fn focus_input(&mut self) {
        self.focus = SurfaceFocus::Input;
    }

    fn input_text(&self) -> String {
        self.input_text.clone()
    }

    fn set_input_text(&mut self, text: &str) {
        self.input_text = text.to_string();
    }

    fn set_placeholder(&mut self, text: &str) {
        self.placeholder = text.to_string();
    }

    fn append_tag(&mut self, value: &str, label: &str) {
        if !self.tags.iter().any(|(v, _)| v == value) {
            self.tags.push((value.to_string(), label.to_string()));
        }
    }

    fn remove_tag(&mut self, value: &str) {
        self.tags.retain(|(v, _)| v != value);
    }

    fn show_loader(&mut self) {
        self.loader = true;
    }

    fn hide_loader(&mut self) {
        self.loader = false;
    }

    fn set_open(&mut self, open: bool) {
        self.open = open;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaves_append_into_existing_group() {
        let mut surface = RecordingSurface::new();
        surface.render_group(&OptionGroup::new("Fruit", []));
        surface.render_leaf(&OptionLeaf::new("a", "Apple"), Some("Fruit"), false);
        surface.render_group(&OptionGroup::new("Veg", []));
        surface.render_leaf(&OptionLeaf::new("c", "Carrot"), Some("Veg"), false);

        // A later page adds to the first group, not the end of the list
        surface.render_leaf(&OptionLeaf::new("b", "Banana"), Some("Fruit"), false);

        assert_eq!(surface.labels(), vec!["Apple", "Banana", "Carrot"]);
        assert_eq!(surface.headers(), vec!["Fruit", "Veg"]);
    }

    #[test]
    fn test_blank_group_has_no_header() {
        let mut surface = RecordingSurface::new();
        surface.render_group(&OptionGroup::new("", []));
        surface.render_leaf(&OptionLeaf::new("a", "Apple"), Some(""), false);

        assert!(surface.has_group(""));
        assert!(surface.headers().is_empty());
        assert_eq!(surface.labels(), vec!["Apple"]);
    }

    #[test]
    fn test_navigable_skips_disabled() {
        let mut surface = RecordingSurface::new();
        let a = surface.render_leaf(&OptionLeaf::new("a", "Apple"), None, false);
        surface.render_leaf(&OptionLeaf::new("b", "Banana").disabled(), None, false);
        let c = surface.render_leaf(&OptionLeaf::new("c", "Cherry"), None, true);

        assert_eq!(surface.navigable_items(), vec![a, c]);
        assert_eq!(surface.selected_values(), vec!["c"]);
    }

    #[test]
    fn test_clear_drops_item_focus() {
        let mut surface = RecordingSurface::new();
        let a = surface.render_leaf(&OptionLeaf::new("a", "Apple"), None, false);
        surface.focus_item(a);
        assert_eq!(surface.focused_item(), Some(a));

        surface.clear_items();
        assert_eq!(surface.focused_item(), None);
        assert!(surface.item(a).is_none());
        assert_eq!(surface.rebuilds(), 1);
    }
}
