//! Events delivered to the select and effects it asks the host to perform

use serde_json::Value;

use crate::error::Result;
use crate::fetch::PageRequest;
use crate::search::DebounceTicket;
use crate::surface::ItemHandle;

/// Keys the select reacts to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Enter,
    ArrowDown,
    ArrowUp,
    Escape,
    Backspace,
    Char(char),
    Other,
}

impl Key {
    /// Letter keys redirect typing from a focused row to the search input
    pub fn is_letter(&self) -> bool {
        matches!(self, Key::Char(c) if c.is_ascii_alphabetic())
    }
}

/// Element a key press was delivered to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyTarget {
    /// The search input
    Input,
    /// An option row in the dropdown
    Item(ItemHandle),
}

/// Element a pointer click landed on
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClickTarget {
    /// The control frame around the input and tags
    ControlSurface,
    /// The chevron/search indicator
    DropdownIndicator,
    /// The clear-selection button
    ClearButton,
    /// An option row
    Item(ItemHandle),
    /// The remove icon of the tag for this value
    TagRemove(String),
    /// Anything else inside the widget
    Other,
}

/// Focus left an element inside the widget
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FocusOut {
    /// The previously focused element is still the active one (window blur)
    pub active_inside: bool,
    /// Whether the element receiving focus is inside the widget;
    /// `None` when focus moved to no element at all
    pub related_inside: Option<bool>,
}

/// Input to [`DropdownSelect::handle`](crate::DropdownSelect::handle)
#[derive(Debug)]
pub enum SelectEvent {
    /// The search input gained focus
    InputFocused,
    /// The search input's text changed
    InputChanged(String),
    KeyDown {
        key: Key,
        target: KeyTarget,
    },
    Click(ClickTarget),
    FocusOut(FocusOut),
    /// The visibility sensor saw the trailing loading indicator
    LoaderVisible,
    /// The delay of a [`DebounceTicket`] elapsed
    DebounceElapsed(u64),
    /// A page fetch finished
    PageLoaded {
        request: PageRequest,
        response: Result<Value>,
    },
}

/// Work the host must perform on behalf of the select
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Report `DebounceElapsed(ticket.generation)` after `ticket.delay`
    ScheduleSearch(DebounceTicket),
    /// Fetch this page and report `PageLoaded`
    FetchPage(PageRequest),
    /// The selected values changed; carries the full selection in order
    SelectionChanged(Vec<String>),
}
