//! Interaction router
//!
//! [`DropdownSelect`] is the select itself. It composes the selection model,
//! catalog, search and pagination controllers, and routes every pointer,
//! keyboard, focus, timer and network event to them. It is a plain
//! synchronous state machine: anything that takes time comes back out as an
//! [`Effect`], and its completion comes back in as another [`SelectEvent`].
//!
//! # Example
//!
//! ```ignore
//! use blinc_select::prelude::*;
//!
//! let source = NativeSelect::new()
//!     .option("a", "Apple")
//!     .option("b", "Banana");
//! let mut select = DropdownSelect::new(source, RecordingSurface::new(), SelectConfig::new());
//!
//! let apple = select.surface().handle_for_label("Apple").unwrap();
//! select.handle(SelectEvent::Click(ClickTarget::Item(apple)))?;
//! assert!(select.selection().is_selected("a"));
//! ```

use crate::catalog::OptionCatalog;
use crate::config::SelectConfig;
use crate::error::Result;
use crate::event::{ClickTarget, Effect, FocusOut, Key, KeyTarget, SelectEvent};
use crate::fetch::PageRequest;
use crate::focus;
use crate::option::{OptionGroup, OptionItem, OptionLeaf};
use crate::pagination::{PageOutcome, PageResult, PaginationController};
use crate::search::SearchController;
use crate::selection::{SelectionChange, SelectionModel};
use crate::source::SourceList;
use crate::surface::{ItemHandle, RenderSurface};
use serde_json::Value;

/// Whether the dropdown is shown
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Visibility {
    #[default]
    Closed,
    Open,
}

/// Inputs to the visibility state machine
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VisibilityEvent {
    InputFocused,
    Pointer,
    Navigate,
    Search,
    /// A value was chosen in single-select mode
    Selected,
    Escape,
    /// Focus moved to an element outside the widget
    FocusLost,
    /// The dropdown indicator was clicked while open
    Dismissed,
}

impl Visibility {
    /// Handle an event and return the new state, or None if no transition
    pub fn on_event(&self, event: VisibilityEvent) -> Option<Self> {
        use VisibilityEvent::*;
        match (self, event) {
            (Visibility::Closed, InputFocused | Pointer | Navigate | Search) => {
                Some(Visibility::Open)
            }
            (Visibility::Open, Selected | Escape | FocusLost | Dismissed) => {
                Some(Visibility::Closed)
            }
            _ => None,
        }
    }
}

/// Enhanced select bound to a source list and a rendering surface
pub struct DropdownSelect<S: SourceList, R: RenderSurface> {
    config: SelectConfig,
    source: S,
    surface: R,
    multiple: bool,
    /// Present in local mode only
    catalog: Option<OptionCatalog>,
    selection: SelectionModel,
    search: SearchController,
    pagination: PaginationController,
    visibility: Visibility,
}

impl<S: SourceList, R: RenderSurface> DropdownSelect<S, R> {
    /// Attach to `source`, rendering through `surface`
    ///
    /// In local mode the dropdown is rendered from the source list right away.
    /// In remote mode it starts empty with a loading indicator; the first page
    /// is requested once the indicator is reported visible.
    pub fn new(mut source: S, surface: R, config: SelectConfig) -> Self {
        let multiple = config.resolve_multiple(source.is_multiple());
        let remote = config.is_remote();
        // The source list must hold as many entries as the model does
        source.set_multiple(multiple);

        let mut selection = SelectionModel::new(multiple, remote);
        selection.sync_from_source(&source);

        let catalog = (!remote).then(|| OptionCatalog::load(&source));
        let search = SearchController::new(config.debounce_window());

        let mut select = Self {
            config,
            source,
            surface,
            multiple,
            catalog,
            selection,
            search,
            pagination: PaginationController::new(),
            visibility: Visibility::Closed,
        };
        select.initial_render();
        select
    }

    fn initial_render(&mut self) {
        if let Some(catalog) = &self.catalog {
            let items = catalog.items().to_vec();
            self.render_items(&items);
        } else {
            self.pagination.reset(None);
            self.surface.show_loader();
        }

        let labels = self.selected_labels();
        if self.multiple {
            for (value, label) in &labels {
                self.surface.append_tag(value, label);
            }
        } else if let Some((_, label)) = labels.last() {
            self.surface.set_input_text(label);
        }
        self.refresh_placeholder();
        self.surface.set_open(false);
    }

    pub fn config(&self) -> &SelectConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn surface(&self) -> &R {
        &self.surface
    }

    /// Mutable access for hosts that update focus or text on the surface
    pub fn surface_mut(&mut self) -> &mut R {
        &mut self.surface
    }

    pub fn selection(&self) -> &SelectionModel {
        &self.selection
    }

    pub fn search(&self) -> &SearchController {
        &self.search
    }

    pub fn pagination(&self) -> &PaginationController {
        &self.pagination
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_open(&self) -> bool {
        self.visibility == Visibility::Open
    }

    pub fn is_multiple(&self) -> bool {
        self.multiple
    }

    pub fn is_remote(&self) -> bool {
        self.catalog.is_none()
    }

    /// Route one event
    pub fn handle(&mut self, event: SelectEvent) -> Result<Vec<Effect>> {
        match event {
            SelectEvent::InputFocused => {
                self.transition(VisibilityEvent::InputFocused);
                Ok(Vec::new())
            }
            SelectEvent::InputChanged(text) => Ok(self.on_input_changed(text)),
            SelectEvent::KeyDown { key, target } => self.on_key(key, target),
            SelectEvent::Click(target) => self.on_click(target),
            SelectEvent::FocusOut(focus_out) => {
                self.on_focus_out(focus_out);
                Ok(Vec::new())
            }
            SelectEvent::LoaderVisible => self.load_next_page(),
            SelectEvent::DebounceElapsed(generation) => match self.search.fire(generation) {
                Some(query) => self.commit_query(query),
                None => Ok(Vec::new()),
            },
            SelectEvent::PageLoaded { request, response } => {
                self.on_page_loaded(request, response)
            }
        }
    }

    // =========================================================================
    // Programmatic API
    // =========================================================================

    /// Select `value` as if its row had been chosen
    ///
    /// Unlike a click, this never toggles an already selected value off.
    /// Disabled or unknown values are ignored.
    pub fn select_value(&mut self, value: &str) -> Vec<Effect> {
        match self.lookup(value) {
            Some(leaf) if leaf.disabled => Vec::new(),
            Some(leaf) if self.multiple => {
                let change = self.selection.select(&leaf.value, &leaf.label, &mut self.source);
                self.apply_change(&change, &leaf.label)
            }
            Some(leaf) => self.commit_selection(&leaf.value, &leaf.label),
            None => Vec::new(),
        }
    }

    /// Deselect `value`
    pub fn deselect_value(&mut self, value: &str) -> Vec<Effect> {
        let change = self.selection.deselect(value, &mut self.source);
        self.apply_change(&change, "")
    }

    /// Clear the selection, the input text and the search query
    ///
    /// A pending keystroke is dropped and an empty query is committed right
    /// away. Locally that restores the unfiltered list; in remote mode it
    /// resets pagination and requests the first page.
    pub fn clear(&mut self) -> Result<Vec<Effect>> {
        let change = self.selection.clear(&mut self.source);
        let mut effects = self.apply_change(&change, "");
        self.surface.set_input_text("");

        let query = self.search.commit_now(None);
        effects.extend(self.commit_query(query)?);
        Ok(effects)
    }

    // =========================================================================
    // Event handlers
    // =========================================================================

    fn on_input_changed(&mut self, text: String) -> Vec<Effect> {
        self.transition(VisibilityEvent::Search);
        self.surface.set_input_text(&text);
        let ticket = self.search.on_query_text_changed(text);
        vec![Effect::ScheduleSearch(ticket)]
    }

    fn on_key(&mut self, key: Key, target: KeyTarget) -> Result<Vec<Effect>> {
        match (key, target) {
            (Key::ArrowDown, _) => self.navigate(1),
            (Key::ArrowUp, _) => self.navigate(-1),
            (Key::Escape, _) => {
                self.transition(VisibilityEvent::Escape);
            }
            (Key::Enter, KeyTarget::Item(handle)) => return Ok(self.choose_item(handle)),
            // Enter in the input never submits the host form
            (Key::Enter, KeyTarget::Input) => {}
            (Key::Backspace, KeyTarget::Input) => return Ok(self.remove_last_tag()),
            (key, KeyTarget::Item(_)) if key.is_letter() => {
                self.surface.focus_input();
                self.transition(VisibilityEvent::Search);
            }
            _ => {}
        }
        Ok(Vec::new())
    }

    fn on_click(&mut self, target: ClickTarget) -> Result<Vec<Effect>> {
        match target {
            ClickTarget::ControlSurface => {
                self.surface.focus_input();
                self.transition(VisibilityEvent::Pointer);
            }
            ClickTarget::DropdownIndicator => {
                if self.is_open() {
                    self.transition(VisibilityEvent::Dismissed);
                } else {
                    self.surface.focus_input();
                    self.transition(VisibilityEvent::Pointer);
                }
            }
            ClickTarget::ClearButton => {
                self.surface.focus_input();
                self.transition(VisibilityEvent::Pointer);
                return self.clear();
            }
            ClickTarget::Item(handle) => return Ok(self.choose_item(handle)),
            ClickTarget::TagRemove(value) => return Ok(self.deselect_value(&value)),
            ClickTarget::Other => {}
        }
        Ok(Vec::new())
    }

    fn on_focus_out(&mut self, focus_out: FocusOut) {
        // Window blur keeps the active element; the dropdown stays as it is
        if focus_out.active_inside {
            return;
        }
        if focus_out.related_inside != Some(true) {
            self.transition(VisibilityEvent::FocusLost);
        }
    }

    fn navigate(&mut self, delta: isize) {
        self.transition(VisibilityEvent::Navigate);
        focus::move_focus(&mut self.surface, delta);
    }

    fn remove_last_tag(&mut self) -> Vec<Effect> {
        if !self.multiple || !self.surface.input_text().is_empty() {
            return Vec::new();
        }
        match self.selection.last().map(str::to_string) {
            Some(value) => self.deselect_value(&value),
            None => Vec::new(),
        }
    }

    // =========================================================================
    // Selection
    // =========================================================================

    fn choose_item(&mut self, handle: ItemHandle) -> Vec<Effect> {
        match self.surface.item(handle) {
            Some(item) if !item.disabled => self.commit_selection(&item.value, &item.label),
            Some(_) => {
                tracing::trace!("Ignoring disabled row {:?}", handle);
                Vec::new()
            }
            None => Vec::new(),
        }
    }

    fn commit_selection(&mut self, value: &str, label: &str) -> Vec<Effect> {
        if self.multiple {
            let change = self.selection.toggle(value, label, &mut self.source);
            return self.apply_change(&change, label);
        }

        let change = self.selection.select(value, label, &mut self.source);
        let effects = self.apply_change(&change, label);
        if self.selection.is_selected(value) {
            self.surface.set_input_text(label);
            self.transition(VisibilityEvent::Selected);
        }
        effects
    }

    /// Bring markers, tags and placeholder in line with a selection change
    fn apply_change(&mut self, change: &SelectionChange, added_label: &str) -> Vec<Effect> {
        if change.is_empty() {
            return Vec::new();
        }

        for value in &change.removed {
            for handle in self.surface.items_with_value(value) {
                self.surface.set_item_selected(handle, false);
            }
            if self.multiple {
                self.surface.remove_tag(value);
            }
        }

        if let Some(value) = &change.added {
            for handle in self.surface.items_with_value(value) {
                self.surface.set_item_selected(handle, true);
            }
            if self.multiple {
                self.surface.append_tag(value, added_label);
            }
        }

        self.refresh_placeholder();
        vec![Effect::SelectionChanged(
            self.selection.selected_values().iter().cloned().collect(),
        )]
    }

    fn refresh_placeholder(&mut self) {
        if self.multiple && !self.selection.is_empty() {
            self.surface.set_placeholder("");
        } else {
            let placeholder = self.config.placeholder_text().to_string();
            self.surface.set_placeholder(&placeholder);
        }
    }

    /// Labels for the selected values, taken from the source list
    fn selected_labels(&self) -> Vec<(String, String)> {
        let entries = self.source.entries();
        self.selection
            .selected_values()
            .iter()
            .map(|value| {
                let label = entries
                    .iter()
                    .find(|e| &e.value == value)
                    .map(|e| e.label.clone())
                    .unwrap_or_else(|| value.clone());
                (value.clone(), label)
            })
            .collect()
    }

    fn lookup(&self, value: &str) -> Option<OptionLeaf> {
        if let Some(leaf) = self.catalog.as_ref().and_then(|c| c.find(value)) {
            return Some(leaf.clone());
        }
        if let Some(item) = self
            .surface
            .items_with_value(value)
            .into_iter()
            .find_map(|handle| self.surface.item(handle))
        {
            return Some(OptionLeaf {
                label: item.label,
                html_label: None,
                value: item.value,
                disabled: item.disabled,
            });
        }
        self.source
            .entries()
            .into_iter()
            .find(|e| e.value == value)
            .map(|e| OptionLeaf {
                label: e.label,
                html_label: None,
                value: e.value,
                disabled: e.disabled,
            })
    }

    // =========================================================================
    // Search & pagination
    // =========================================================================

    fn commit_query(&mut self, query: Option<String>) -> Result<Vec<Effect>> {
        if let Some(catalog) = &self.catalog {
            let items = catalog.filter(query.as_deref());
            self.render_items(&items);
            return Ok(Vec::new());
        }

        self.surface.clear_items();
        self.pagination.reset(query);
        self.surface.show_loader();
        self.load_next_page()
    }

    fn load_next_page(&mut self) -> Result<Vec<Effect>> {
        if !self.is_remote() {
            return Ok(Vec::new());
        }
        Ok(self
            .pagination
            .request_next_page(&self.config)?
            .map(Effect::FetchPage)
            .into_iter()
            .collect())
    }

    fn on_page_loaded(
        &mut self,
        request: PageRequest,
        response: Result<Value>,
    ) -> Result<Vec<Effect>> {
        match self.pagination.complete(&request, response, &self.config) {
            Ok(PageOutcome::Loaded(page)) => {
                self.surface.hide_loader();
                self.merge_page(&page);
                if page.has_more {
                    self.surface.show_loader();
                }
                Ok(Vec::new())
            }
            Ok(PageOutcome::Stale) => Ok(Vec::new()),
            // Not retried. The loader stays hidden until the next committed
            // query; a host that re-reports `LoaderVisible` retries the page.
            Ok(PageOutcome::Failed(err)) => {
                tracing::warn!("Page request to {} failed: {}", request.url, err);
                self.surface.hide_loader();
                Ok(Vec::new())
            }
            Err(err) => {
                tracing::warn!("Page from {} could not be processed: {}", request.url, err);
                self.surface.hide_loader();
                Err(err)
            }
        }
    }

    /// Rebuild the dropdown from `items`
    fn render_items(&mut self, items: &[OptionItem]) {
        self.surface.clear_items();
        for item in items {
            match item {
                OptionItem::Leaf(leaf) => {
                    let selected = self.selection.is_selected(&leaf.value);
                    self.surface.render_leaf(leaf, None, selected);
                }
                OptionItem::Group(group) => {
                    self.surface.render_group(&OptionGroup::new(group.label.clone(), []));
                    for child in &group.children {
                        let selected = self.selection.is_selected(&child.value);
                        self.surface.render_leaf(child, Some(&group.label), selected);
                    }
                }
            }
        }
    }

    /// Append a remote page to what is already rendered
    fn merge_page(&mut self, page: &PageResult) {
        let group = page.group_label.as_deref();
        if let Some(label) = group {
            if !self.surface.has_group(label) {
                self.surface.render_group(&OptionGroup::new(label, []));
            }
        }
        for leaf in &page.items {
            let selected = self.selection.is_selected(&leaf.value);
            self.surface.render_leaf(leaf, group, selected);
        }
    }

    fn transition(&mut self, event: VisibilityEvent) {
        if let Some(next) = self.visibility.on_event(event) {
            tracing::trace!("Dropdown {:?} -> {:?} on {:?}", self.visibility, next, event);
            self.visibility = next;
            self.surface.set_open(next == Visibility::Open);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_transitions() {
        use VisibilityEvent::*;

        assert_eq!(
            Visibility::Closed.on_event(InputFocused),
            Some(Visibility::Open)
        );
        assert_eq!(Visibility::Closed.on_event(Navigate), Some(Visibility::Open));
        assert_eq!(Visibility::Closed.on_event(Escape), None);

        assert_eq!(Visibility::Open.on_event(Selected), Some(Visibility::Closed));
        assert_eq!(Visibility::Open.on_event(FocusLost), Some(Visibility::Closed));
        assert_eq!(Visibility::Open.on_event(Search), None);
    }
}
