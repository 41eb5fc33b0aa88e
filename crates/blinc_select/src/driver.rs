//! Async event loop
//!
//! [`SelectDriver`] owns a [`DropdownSelect`] on a single task and performs
//! the effects it emits: the debounce deadline becomes a `sleep_until`, page
//! requests are spawned on the runtime and their results are posted back
//! into the loop. UI events keep flowing while a fetch is outstanding.
//!
//! # Example
//!
//! ```ignore
//! let driver = SelectDriver::new(select, Arc::new(HttpFetcher::new()))
//!     .on_change(|values| println!("Selected: {:?}", values));
//! let handle = driver.handle();
//! let task = tokio::spawn(driver.run());
//!
//! handle.send(SelectEvent::InputFocused);
//! handle.send(SelectEvent::InputChanged("john".into()));
//! ```

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::error::SelectError;
use crate::event::{Effect, SelectEvent};
use crate::fetch::PageFetcher;
use crate::router::DropdownSelect;
use crate::source::SourceList;
use crate::surface::RenderSurface;

type ChangeCallback = Box<dyn FnMut(&[String]) + Send>;

/// Sends UI events to a running [`SelectDriver`]
#[derive(Clone, Debug)]
pub struct SelectHandle {
    tx: mpsc::UnboundedSender<SelectEvent>,
}

impl SelectHandle {
    /// Queue an event; returns `false` if the driver has stopped
    pub fn send(&self, event: SelectEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

struct DriverState<S: SourceList, R: RenderSurface> {
    select: DropdownSelect<S, R>,
    fetcher: Arc<dyn PageFetcher>,
    page_tx: mpsc::UnboundedSender<SelectEvent>,
    /// The single armed debounce slot: generation and deadline
    debounce: Option<(u64, Instant)>,
    in_flight: usize,
    on_change: Option<ChangeCallback>,
}

impl<S: SourceList, R: RenderSurface> DriverState<S, R> {
    fn dispatch(&mut self, event: SelectEvent) {
        match self.select.handle(event) {
            Ok(effects) => {
                for effect in effects {
                    self.perform(effect);
                }
            }
            Err(err @ SelectError::Configuration(_)) => {
                tracing::error!("Select is misconfigured: {}", err);
            }
            Err(err) => {
                tracing::warn!("Select event failed: {}", err);
            }
        }
    }

    fn perform(&mut self, effect: Effect) {
        match effect {
            Effect::ScheduleSearch(ticket) => {
                // Re-arming replaces the previous deadline
                self.debounce = Some((ticket.generation, Instant::now() + ticket.delay));
            }
            Effect::FetchPage(request) => {
                tracing::debug!(
                    "Fetching page for epoch {} from {}",
                    request.epoch.get(),
                    request.url
                );
                let response = self.fetcher.fetch(&request);
                let tx = self.page_tx.clone();
                self.in_flight += 1;
                tokio::spawn(async move {
                    let response = response.await;
                    // The driver may already be gone; nothing to deliver to then
                    let _ = tx.send(SelectEvent::PageLoaded { request, response });
                });
            }
            Effect::SelectionChanged(values) => {
                if let Some(callback) = self.on_change.as_mut() {
                    callback(&values);
                }
            }
        }
    }
}

/// Runs a select on the tokio runtime
pub struct SelectDriver<S: SourceList, R: RenderSurface> {
    state: DriverState<S, R>,
    ui_tx: mpsc::UnboundedSender<SelectEvent>,
    ui_rx: mpsc::UnboundedReceiver<SelectEvent>,
    page_rx: mpsc::UnboundedReceiver<SelectEvent>,
}

impl<S: SourceList, R: RenderSurface> SelectDriver<S, R> {
    pub fn new(select: DropdownSelect<S, R>, fetcher: Arc<dyn PageFetcher>) -> Self {
        let (ui_tx, ui_rx) = mpsc::unbounded_channel();
        let (page_tx, page_rx) = mpsc::unbounded_channel();
        Self {
            state: DriverState {
                select,
                fetcher,
                page_tx,
                debounce: None,
                in_flight: 0,
                on_change: None,
            },
            ui_tx,
            ui_rx,
            page_rx,
        }
    }

    /// Call `callback` with the full selection whenever it changes
    pub fn on_change<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&[String]) + Send + 'static,
    {
        self.state.on_change = Some(Box::new(callback));
        self
    }

    /// A handle for delivering UI events
    pub fn handle(&self) -> SelectHandle {
        SelectHandle {
            tx: self.ui_tx.clone(),
        }
    }

    pub fn select(&self) -> &DropdownSelect<S, R> {
        &self.state.select
    }

    /// Process events until every [`SelectHandle`] is dropped and pending
    /// debounce and fetch work has settled, then hand the select back
    pub async fn run(self) -> DropdownSelect<S, R> {
        let SelectDriver {
            mut state,
            ui_tx,
            mut ui_rx,
            mut page_rx,
        } = self;
        drop(ui_tx);

        let mut ui_open = true;
        loop {
            if !ui_open && state.debounce.is_none() && state.in_flight == 0 {
                break;
            }

            let deadline = state.debounce.map(|(_, deadline)| deadline);
            let debounce = async move {
                match deadline {
                    Some(deadline) => tokio::time::sleep_until(deadline).await,
                    None => std::future::pending::<()>().await,
                }
            };

            tokio::select! {
                event = ui_rx.recv(), if ui_open => match event {
                    Some(event) => state.dispatch(event),
                    None => ui_open = false,
                },
                Some(page) = page_rx.recv() => {
                    state.in_flight = state.in_flight.saturating_sub(1);
                    state.dispatch(page);
                }
                _ = debounce => {
                    if let Some((generation, _)) = state.debounce.take() {
                        state.dispatch(SelectEvent::DebounceElapsed(generation));
                    }
                }
            }
        }

        tracing::debug!("Select driver stopped");
        state.select
    }
}
