//! Remote pagination
//!
//! Pages are requested strictly one at a time per query epoch:
//!
//! ```text
//! Idle ──request──► Loading ──has_more──► Idle
//!   ▲                  │  └──last page──► Exhausted
//!   │                  └──failure──────► Idle
//!   └──────────── reset (new query, any state)
//! ```
//!
//! Every committed query opens a new [`Epoch`]. Requests carry the epoch
//! they were issued in, and a response whose epoch is no longer current is
//! reported as [`PageOutcome::Stale`] without touching the cursor. The
//! transport itself is never cancelled.

use serde_json::Value;

use crate::config::SelectConfig;
use crate::error::{Result, SelectError};
use crate::fetch::{PageRequest, QueryParams};
use crate::option::OptionLeaf;

/// Identifies one search/pagination cycle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Epoch(u64);

impl Epoch {
    pub fn get(self) -> u64 {
        self.0
    }

    fn next(self) -> Self {
        Epoch(self.0 + 1)
    }
}

/// Pagination state within the current epoch
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PageState {
    #[default]
    Idle,
    Loading,
    /// The last page has been received; nothing more to fetch
    Exhausted,
}

/// Accumulator threaded through successive page requests
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PageCursor {
    pub last_params: Option<QueryParams>,
    pub last_response: Option<Value>,
}

/// A processed page ready to be merged into the dropdown
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PageResult {
    pub items: Vec<OptionLeaf>,
    pub has_more: bool,
    pub group_label: Option<String>,
}

/// How a page response was handled
#[derive(Debug)]
pub enum PageOutcome {
    Loaded(PageResult),
    /// The response belongs to an abandoned epoch and was dropped
    Stale,
    /// The fetch failed; pagination is idle again and will not retry by itself
    Failed(SelectError),
}

/// Sequences remote page requests for the active query
#[derive(Clone, Debug, Default)]
pub struct PaginationController {
    epoch: Epoch,
    state: PageState,
    cursor: PageCursor,
    query: Option<String>,
}

impl PaginationController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub fn state(&self) -> PageState {
        self.state
    }

    pub fn cursor(&self) -> &PageCursor {
        &self.cursor
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.state == PageState::Loading
    }

    /// Start a new epoch for `query`, forgetting the cursor
    ///
    /// Any request still in flight becomes stale.
    pub fn reset(&mut self, query: Option<String>) -> Epoch {
        self.epoch = self.epoch.next();
        self.state = PageState::Idle;
        self.cursor = PageCursor::default();
        self.query = query;
        tracing::debug!(
            "Pagination epoch {} opened for query {:?}",
            self.epoch.0,
            self.query
        );
        self.epoch
    }

    /// Issue the next page request for the current epoch
    ///
    /// Returns `Ok(None)` while a page is already loading or after the last
    /// page arrived. Fails if remote mode is not fully configured.
    pub fn request_next_page(&mut self, config: &SelectConfig) -> Result<Option<PageRequest>> {
        let url = config.url_ref().ok_or_else(|| {
            SelectError::Configuration("url is required to load remote pages".to_string())
        })?;
        let query_params = config.query_params_fn()?;
        config.process_data_fn()?;

        if self.state != PageState::Idle {
            tracing::trace!(
                "Skipping page request in epoch {}: {:?}",
                self.epoch.0,
                self.state
            );
            return Ok(None);
        }

        let params = query_params(
            self.query.as_deref(),
            self.cursor.last_params.as_ref(),
            self.cursor.last_response.as_ref(),
        );
        self.state = PageState::Loading;

        Ok(Some(PageRequest {
            epoch: self.epoch,
            url: url.to_string(),
            params,
        }))
    }

    /// Handle the response to `request`
    ///
    /// Stale responses are dropped untouched. A malformed body is returned as
    /// an error after pagination goes back to idle.
    pub fn complete(
        &mut self,
        request: &PageRequest,
        response: Result<Value>,
        config: &SelectConfig,
    ) -> Result<PageOutcome> {
        if request.epoch != self.epoch || self.state != PageState::Loading {
            tracing::debug!(
                "Dropping page from epoch {} (current {})",
                request.epoch.0,
                self.epoch.0
            );
            return Ok(PageOutcome::Stale);
        }

        let body = match response {
            Ok(body) => body,
            Err(err) => {
                self.state = PageState::Idle;
                return Ok(PageOutcome::Failed(err));
            }
        };

        let processed = match config
            .process_data_fn()
            .and_then(|process| process(&body, &request.params))
        {
            Ok(processed) => processed,
            Err(err) => {
                self.state = PageState::Idle;
                return Err(err);
            }
        };

        self.cursor = PageCursor {
            last_params: Some(request.params.clone()),
            last_response: Some(body),
        };
        self.state = if processed.has_more {
            PageState::Idle
        } else {
            PageState::Exhausted
        };

        tracing::debug!(
            "Loaded {} options in epoch {} (has_more: {})",
            processed.data.len(),
            self.epoch.0,
            processed.has_more
        );

        Ok(PageOutcome::Loaded(PageResult {
            items: processed.data,
            has_more: processed.has_more,
            group_label: processed.group_label,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProcessedData;
    use serde_json::json;

    fn remote_config() -> SelectConfig {
        SelectConfig::new()
            .url("https://example.com/people")
            .query_params(|search, prev, _body| {
                let page = prev
                    .and_then(|p| p.get("page"))
                    .and_then(|p| p.parse::<u32>().ok())
                    .map_or(1, |p| p + 1);
                QueryParams::new()
                    .with("q", search.unwrap_or_default())
                    .with("page", page)
            })
            .process_data(|body, _params| ProcessedData::from_value(body))
    }

    fn page(has_more: bool) -> Value {
        json!({ "data": [{ "value": "1", "label": "One" }], "hasMore": has_more })
    }

    #[test]
    fn test_requests_are_sequential() {
        let config = remote_config();
        let mut pager = PaginationController::new();
        pager.reset(Some("jo".to_string()));

        let first = pager.request_next_page(&config).unwrap().unwrap();
        assert_eq!(first.params.get("q"), Some("jo"));
        assert_eq!(first.params.get("page"), Some("1"));
        assert!(pager.is_loading());

        // Visibility signal while loading does not fetch again
        assert!(pager.request_next_page(&config).unwrap().is_none());

        let outcome = pager.complete(&first, Ok(page(true)), &config).unwrap();
        assert!(matches!(outcome, PageOutcome::Loaded(ref r) if r.has_more));
        assert_eq!(pager.state(), PageState::Idle);

        let second = pager.request_next_page(&config).unwrap().unwrap();
        assert_eq!(second.params.get("page"), Some("2"));
    }

    #[test]
    fn test_last_page_exhausts_epoch() {
        let config = remote_config();
        let mut pager = PaginationController::new();
        pager.reset(None);

        let request = pager.request_next_page(&config).unwrap().unwrap();
        pager.complete(&request, Ok(page(false)), &config).unwrap();
        assert_eq!(pager.state(), PageState::Exhausted);
        assert!(pager.request_next_page(&config).unwrap().is_none());

        pager.reset(Some("x".to_string()));
        assert_eq!(pager.state(), PageState::Idle);
        assert!(pager.request_next_page(&config).unwrap().is_some());
    }

    #[test]
    fn test_stale_response_is_dropped() {
        let config = remote_config();
        let mut pager = PaginationController::new();
        pager.reset(Some("jo".to_string()));
        let old = pager.request_next_page(&config).unwrap().unwrap();

        pager.reset(Some("john".to_string()));
        let current = pager.request_next_page(&config).unwrap().unwrap();
        assert_ne!(old.epoch, current.epoch);

        let outcome = pager.complete(&old, Ok(page(true)), &config).unwrap();
        assert!(matches!(outcome, PageOutcome::Stale));
        assert!(pager.is_loading());
        assert_eq!(pager.cursor(), &PageCursor::default());

        let outcome = pager.complete(&current, Ok(page(true)), &config).unwrap();
        assert!(matches!(outcome, PageOutcome::Loaded(_)));
        assert_eq!(pager.cursor().last_params.as_ref(), Some(&current.params));
    }

    #[test]
    fn test_transport_failure_returns_to_idle() {
        let config = remote_config();
        let mut pager = PaginationController::new();
        pager.reset(None);
        let request = pager.request_next_page(&config).unwrap().unwrap();

        let outcome = pager
            .complete(
                &request,
                Err(SelectError::Transport("connection reset".to_string())),
                &config,
            )
            .unwrap();
        assert!(matches!(outcome, PageOutcome::Failed(SelectError::Transport(_))));
        assert_eq!(pager.state(), PageState::Idle);
        assert!(pager.cursor().last_params.is_none());

        // The next visibility signal retries with the same cursor
        let retry = pager.request_next_page(&config).unwrap().unwrap();
        assert_eq!(retry.params, request.params);
    }

    #[test]
    fn test_malformed_response_is_an_error() {
        let config = remote_config();
        let mut pager = PaginationController::new();
        pager.reset(None);
        let request = pager.request_next_page(&config).unwrap().unwrap();

        let err = pager
            .complete(&request, Ok(json!({ "data": "nope" })), &config)
            .unwrap_err();
        assert!(matches!(err, SelectError::MalformedResponse(_)));
        assert_eq!(pager.state(), PageState::Idle);
    }

    #[test]
    fn test_missing_configuration() {
        let mut pager = PaginationController::new();

        let err = pager.request_next_page(&SelectConfig::new()).unwrap_err();
        assert!(matches!(err, SelectError::Configuration(_)));

        let err = pager
            .request_next_page(&SelectConfig::new().url("https://example.com"))
            .unwrap_err();
        assert!(matches!(err, SelectError::Configuration(_)));
        assert_eq!(pager.state(), PageState::Idle);
    }
}
