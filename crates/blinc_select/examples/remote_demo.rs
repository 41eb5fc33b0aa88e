//! Remote Select Demo
//!
//! Drives a remote-mode multi-select against an in-memory people directory:
//! - pages of three results, loaded as the loader row comes into view
//! - debounced search that restarts pagination
//! - selections mirrored onto the native select
//!
//! Run with: cargo run -p blinc_select --example remote_demo

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use blinc_select::prelude::*;
use blinc_select::FetchFuture;
use serde_json::json;

const PAGE_SIZE: usize = 3;

const SETTINGS: &str = r#"
placeholder = "Search people..."
multiple = true
url = "https://example.com/api/people"
debounce_ms = 300
"#;

const PEOPLE: &[&str] = &[
    "Ada Lovelace",
    "Alan Turing",
    "Barbara Liskov",
    "Edsger Dijkstra",
    "Grace Hopper",
    "John Backus",
    "John McCarthy",
    "Ken Thompson",
];

/// Serves `PEOPLE` filtered by `q`, one page per request
fn directory() -> impl Fn(&PageRequest) -> FetchFuture + Send + Sync {
    |request: &PageRequest| -> FetchFuture {
        let query = request.params.get("q").unwrap_or_default().to_lowercase();
        let page: usize = request
            .params
            .get("page")
            .and_then(|p| p.parse().ok())
            .unwrap_or(1);

        let matches: Vec<_> = PEOPLE
            .iter()
            .enumerate()
            .filter(|(_, name)| name.to_lowercase().contains(&query))
            .collect();
        let start = page.saturating_sub(1) * PAGE_SIZE;
        let data: Vec<_> = matches
            .iter()
            .skip(start)
            .take(PAGE_SIZE)
            .map(|(id, name)| json!({ "value": id.to_string(), "label": name }))
            .collect();
        let has_more = matches.len() > start + PAGE_SIZE;

        Box::pin(async move {
            // Simulated network latency
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(json!({ "data": data, "hasMore": has_more, "optGroup": "People" }))
        })
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = SelectSettings::from_toml_str(SETTINGS)?
        .into_config()
        .query_params(|search, prev, _body| {
            let page = prev
                .and_then(|p| p.get("page"))
                .and_then(|p| p.parse::<u32>().ok());
            QueryParams::new()
                .with("q", search.unwrap_or_default())
                .with("page", page.map_or(1, |p| p + 1))
        })
        .process_data(|body, _params| ProcessedData::from_value(body));

    let select = DropdownSelect::new(
        NativeSelect::new().multiple(true),
        RecordingSurface::new(),
        config,
    );

    let driver = SelectDriver::new(select, Arc::new(directory()))
        .on_change(|values| tracing::info!("Selection changed: {:?}", values));
    let handle = driver.handle();
    let task = tokio::spawn(driver.run());

    handle.send(SelectEvent::InputFocused);
    handle.send(SelectEvent::LoaderVisible);
    tokio::time::sleep(Duration::from_millis(100)).await;
    handle.send(SelectEvent::LoaderVisible);
    tokio::time::sleep(Duration::from_millis(100)).await;

    handle.send(SelectEvent::InputChanged("jo".to_string()));
    tokio::time::sleep(Duration::from_millis(100)).await;
    handle.send(SelectEvent::InputChanged("john".to_string()));
    tokio::time::sleep(Duration::from_millis(500)).await;

    drop(handle);

    // The select is handed back once the driver settles; keep using it directly
    let mut select = task.await?;
    if let Some(row) = select.surface().handle_for_label("John Backus") {
        for effect in select.handle(SelectEvent::Click(ClickTarget::Item(row)))? {
            tracing::info!("Effect: {:?}", effect);
        }
    }

    println!("Rows:     {:?}", select.surface().labels());
    println!("Tags:     {:?}", select.surface().tag_labels());
    println!("Selected: {:?}", select.source().selected_values());

    Ok(())
}
