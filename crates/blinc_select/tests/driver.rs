//! End-to-end tests of the tokio driver with a paused clock

use std::sync::{Arc, Mutex};
use std::time::Duration;

use blinc_select::prelude::*;
use blinc_select::FetchFuture;
use serde_json::json;

/// Answers every request at once, except queries listed as slow
#[derive(Clone, Default)]
struct ScriptedFetcher {
    requests: Arc<Mutex<Vec<PageRequest>>>,
    slow: Vec<(&'static str, Duration)>,
}

impl ScriptedFetcher {
    fn slow(mut self, query: &'static str, delay: Duration) -> Self {
        self.slow.push((query, delay));
        self
    }

    fn queries(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.params.get("q").unwrap_or_default().to_string())
            .collect()
    }
}

impl PageFetcher for ScriptedFetcher {
    fn fetch(&self, request: &PageRequest) -> FetchFuture {
        self.requests.lock().unwrap().push(request.clone());
        let query = request.params.get("q").unwrap_or_default().to_string();
        let delay = self
            .slow
            .iter()
            .find(|(q, _)| *q == query)
            .map(|(_, delay)| *delay);

        Box::pin(async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            Ok(json!({
                "data": [{ "value": format!("{}-1", query), "label": format!("{} result", query) }],
                "hasMore": false
            }))
        })
    }
}

fn remote_select() -> DropdownSelect<NativeSelect, RecordingSurface> {
    DropdownSelect::new(
        NativeSelect::new(),
        RecordingSurface::new(),
        SelectConfig::new()
            .url("https://example.com/api/people")
            .query_params(|search, _prev, _body| {
                QueryParams::new().with("q", search.unwrap_or_default())
            })
            .process_data(|body, _params| ProcessedData::from_value(body)),
    )
}

#[tokio::test(start_paused = true)]
async fn test_typing_within_window_sends_one_request() {
    let fetcher = ScriptedFetcher::default();
    let driver = SelectDriver::new(remote_select(), Arc::new(fetcher.clone()));
    let handle = driver.handle();
    let task = tokio::spawn(driver.run());

    handle.send(SelectEvent::InputFocused);
    handle.send(SelectEvent::InputChanged("jo".to_string()));
    tokio::time::sleep(Duration::from_millis(200)).await;
    handle.send(SelectEvent::InputChanged("john".to_string()));
    drop(handle);

    let select = task.await.unwrap();
    assert_eq!(fetcher.queries(), vec!["john"]);
    assert_eq!(select.surface().labels(), vec!["john result"]);
    assert!(select.is_open());
}

#[tokio::test(start_paused = true)]
async fn test_slow_response_from_old_query_is_dropped() {
    let fetcher = ScriptedFetcher::default().slow("jo", Duration::from_secs(2));
    let driver = SelectDriver::new(remote_select(), Arc::new(fetcher.clone()));
    let handle = driver.handle();
    let task = tokio::spawn(driver.run());

    handle.send(SelectEvent::InputChanged("jo".to_string()));
    tokio::time::sleep(Duration::from_millis(600)).await;
    handle.send(SelectEvent::InputChanged("john".to_string()));
    tokio::time::sleep(Duration::from_millis(600)).await;
    drop(handle);

    // The driver waits for the slow response before stopping
    let select = task.await.unwrap();
    assert_eq!(fetcher.queries(), vec!["jo", "john"]);
    assert_eq!(select.surface().labels(), vec!["john result"]);
    assert!(!select.surface().loader_visible());
}

#[tokio::test(start_paused = true)]
async fn test_selection_changes_reach_callback() {
    let changes = Arc::new(Mutex::new(Vec::new()));
    let select = DropdownSelect::new(
        NativeSelect::new()
            .multiple(true)
            .option("a", "Apple")
            .option("b", "Banana"),
        RecordingSurface::new(),
        SelectConfig::new(),
    );
    let apple = select.surface().handle_for_label("Apple").unwrap();
    let banana = select.surface().handle_for_label("Banana").unwrap();

    let recorded = changes.clone();
    let driver = SelectDriver::new(select, Arc::new(ScriptedFetcher::default()))
        .on_change(move |values| recorded.lock().unwrap().push(values.to_vec()));
    let handle = driver.handle();
    let task = tokio::spawn(driver.run());

    handle.send(SelectEvent::Click(ClickTarget::Item(apple)));
    handle.send(SelectEvent::Click(ClickTarget::Item(banana)));
    handle.send(SelectEvent::Click(ClickTarget::TagRemove("a".to_string())));
    drop(handle);

    let select = task.await.unwrap();
    assert_eq!(
        *changes.lock().unwrap(),
        vec![
            vec!["a".to_string()],
            vec!["a".to_string(), "b".to_string()],
            vec!["b".to_string()],
        ]
    );
    assert_eq!(select.source().selected_values(), vec!["b"]);
}

#[tokio::test(start_paused = true)]
async fn test_loader_visibility_fetches_first_page() {
    let fetcher = ScriptedFetcher::default();
    let driver = SelectDriver::new(remote_select(), Arc::new(fetcher.clone()));
    let handle = driver.handle();
    let task = tokio::spawn(driver.run());

    handle.send(SelectEvent::LoaderVisible);
    drop(handle);

    let select = task.await.unwrap();
    assert_eq!(fetcher.queries(), vec![""]);
    assert_eq!(select.surface().labels(), vec![" result"]);
    assert!(!select.surface().loader_visible());
}
