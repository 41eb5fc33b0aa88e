//! # Blinc Select
//!
//! A searchable, keyboard-navigable selection engine that upgrades a native
//! "choose one or more values" control into a styled dropdown, optionally
//! backed by a paginated remote data source.
//!
//! The crate is the interaction and state engine only. Drawing, the host's
//! native select element and the network transport are collaborators behind
//! traits:
//!
//! - **[`SourceList`]**: the source of truth the form submits; selection is mirrored onto it
//! - **[`RenderSurface`]**: the presentation; rows come back as opaque [`ItemHandle`]s
//! - **[`PageFetcher`]**: fetches one remote page
//!
//! [`DropdownSelect`] is a synchronous state machine fed with [`SelectEvent`]s.
//! Timers and fetches come back out as [`Effect`]s; [`SelectDriver`] performs
//! them on tokio.
//!
//! ## Example
//!
//! ```ignore
//! use blinc_select::prelude::*;
//!
//! let source = NativeSelect::new()
//!     .multiple(true)
//!     .option("a", "Apple")
//!     .option("b", "Banana");
//!
//! let mut select = DropdownSelect::new(
//!     source,
//!     RecordingSurface::new(),
//!     SelectConfig::new().placeholder("Pick fruit..."),
//! );
//!
//! select.handle(SelectEvent::InputFocused)?;
//! select.handle(SelectEvent::KeyDown { key: Key::ArrowDown, target: KeyTarget::Input })?;
//! ```
//!
//! ## Remote mode
//!
//! Setting a url switches the select to remote mode. Each committed search
//! opens a new pagination epoch; pages from earlier epochs are dropped when
//! they arrive.
//!
//! ```ignore
//! let config = SelectConfig::new()
//!     .url("https://example.com/api/people")
//!     .query_params(|search, prev, _body| {
//!         let page = prev.and_then(|p| p.get("page")).and_then(|p| p.parse::<u32>().ok());
//!         QueryParams::new()
//!             .with("q", search.unwrap_or_default())
//!             .with("page", page.map_or(1, |p| p + 1))
//!     })
//!     .process_data(|body, _params| ProcessedData::from_value(body));
//! ```

pub mod catalog;
pub mod config;
pub mod driver;
pub mod error;
pub mod event;
pub mod fetch;
pub mod focus;
pub mod option;
pub mod pagination;
pub mod router;
pub mod search;
pub mod selection;
pub mod source;
pub mod surface;

pub use catalog::OptionCatalog;
pub use config::{
    ProcessDataFn, ProcessedData, QueryParamsFn, SelectConfig, SelectSettings,
    DEFAULT_DEBOUNCE_MS,
};
pub use driver::{SelectDriver, SelectHandle};
pub use error::{Result, SelectError};
pub use event::{ClickTarget, Effect, FocusOut, Key, KeyTarget, SelectEvent};
#[cfg(feature = "network")]
pub use fetch::HttpFetcher;
pub use fetch::{FetchFuture, PageFetcher, PageRequest, QueryParams};
pub use focus::{move_focus, next_focus_index};
pub use option::{OptionGroup, OptionItem, OptionLeaf};
pub use pagination::{Epoch, PageCursor, PageOutcome, PageResult, PageState, PaginationController};
pub use router::{DropdownSelect, Visibility, VisibilityEvent};
pub use search::{DebounceTicket, SearchController};
pub use selection::{SelectionChange, SelectionModel};
pub use source::{NativeSelect, SourceEntry, SourceList, SourceNode};
pub use surface::{ItemHandle, RecordingSurface, RenderSurface, RenderedItem, SurfaceFocus};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::{ProcessedData, SelectConfig, SelectSettings};
    pub use crate::driver::{SelectDriver, SelectHandle};
    pub use crate::error::{Result, SelectError};
    pub use crate::event::{ClickTarget, Effect, FocusOut, Key, KeyTarget, SelectEvent};
    pub use crate::fetch::{PageFetcher, PageRequest, QueryParams};
    pub use crate::option::{OptionGroup, OptionItem, OptionLeaf};
    pub use crate::router::DropdownSelect;
    pub use crate::source::{NativeSelect, SourceEntry, SourceList};
    pub use crate::surface::{ItemHandle, RecordingSurface, RenderSurface};
}
