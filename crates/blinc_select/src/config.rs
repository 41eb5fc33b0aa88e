//! Select configuration
//!
//! [`SelectConfig`] is the full set of construction options, including the
//! remote-mode callbacks. [`SelectSettings`] is its serializable subset, for
//! hosts that keep select options in a settings file:
//!
//! ```toml
//! placeholder = "Search people..."
//! url = "https://example.com/api/people"
//! multiple = true
//! debounce_ms = 300
//! ```

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, SelectError};
use crate::fetch::QueryParams;
use crate::option::OptionLeaf;

/// Default search debounce window in milliseconds
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// Builds the next page's params from `(search, previous params, previous body)`
pub type QueryParamsFn =
    Arc<dyn Fn(Option<&str>, Option<&QueryParams>, Option<&Value>) -> QueryParams + Send + Sync>;

/// Turns a response body into options for the dropdown
pub type ProcessDataFn = Arc<dyn Fn(&Value, &QueryParams) -> Result<ProcessedData> + Send + Sync>;

/// One processed page of remote options
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProcessedData {
    pub data: Vec<OptionLeaf>,
    /// Whether another page can be requested
    pub has_more: bool,
    /// Group the options are appended to; created if missing
    pub group_label: Option<String>,
}

impl ProcessedData {
    /// Read the conventional `{ data: [...], hasMore, optGroup }` body shape
    ///
    /// Fails with [`SelectError::MalformedResponse`] when `data` is missing or
    /// not an array, or when an element is not a valid option.
    pub fn from_value(body: &Value) -> Result<Self> {
        let data = match body.get("data") {
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(SelectError::MalformedResponse(format!(
                    "data must be an array, got {}",
                    other
                )))
            }
            None => {
                return Err(SelectError::MalformedResponse(
                    "data must be an array, got nothing".to_string(),
                ))
            }
        };

        let data = data
            .iter()
            .map(|item| OptionLeaf::deserialize(item).map_err(SelectError::from))
            .collect::<Result<Vec<_>>>()?;

        let has_more = body
            .get("hasMore")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let group_label = body
            .get("optGroup")
            .or_else(|| body.get("groupLabel"))
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(Self {
            data,
            has_more,
            group_label,
        })
    }
}

/// Construction options for a select
#[derive(Clone)]
pub struct SelectConfig {
    placeholder: String,
    multiple: Option<bool>,
    url: Option<String>,
    query_params: Option<QueryParamsFn>,
    process_data: Option<ProcessDataFn>,
    debounce: Duration,
}

impl std::fmt::Debug for SelectConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectConfig")
            .field("placeholder", &self.placeholder)
            .field("multiple", &self.multiple)
            .field("url", &self.url)
            .field("query_params", &self.query_params.is_some())
            .field("process_data", &self.process_data.is_some())
            .field("debounce", &self.debounce)
            .finish()
    }
}

impl Default for SelectConfig {
    fn default() -> Self {
        Self {
            placeholder: String::new(),
            multiple: None,
            url: None,
            query_params: None,
            process_data: None,
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
        }
    }
}

impl SelectConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the placeholder text shown in the search input
    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Allow several values; defaults to the source list's own flag
    pub fn multiple(mut self, multiple: bool) -> Self {
        self.multiple = Some(multiple);
        self
    }

    /// Load options page by page from this url instead of the source list
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the request params builder (required in remote mode)
    pub fn query_params<F>(mut self, f: F) -> Self
    where
        F: Fn(Option<&str>, Option<&QueryParams>, Option<&Value>) -> QueryParams
            + Send
            + Sync
            + 'static,
    {
        self.query_params = Some(Arc::new(f));
        self
    }

    /// Set the response processor (required in remote mode)
    pub fn process_data<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value, &QueryParams) -> Result<ProcessedData> + Send + Sync + 'static,
    {
        self.process_data = Some(Arc::new(f));
        self
    }

    /// Set the search debounce window
    pub fn debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// The effective placeholder
    ///
    /// An empty placeholder becomes a single space so hosts styling on
    /// "placeholder shown" still see one.
    pub fn placeholder_text(&self) -> &str {
        if self.placeholder.is_empty() {
            " "
        } else {
            &self.placeholder
        }
    }

    /// Resolve multi-select against the source list's native flag
    pub fn resolve_multiple(&self, source_multiple: bool) -> bool {
        source_multiple || self.multiple.unwrap_or(false)
    }

    pub fn url_ref(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Remote mode is selected by the presence of a url
    pub fn is_remote(&self) -> bool {
        self.url.is_some()
    }

    pub fn debounce_window(&self) -> Duration {
        self.debounce
    }

    pub(crate) fn query_params_fn(&self) -> Result<&QueryParamsFn> {
        self.query_params.as_ref().ok_or_else(|| {
            SelectError::Configuration("query_params is required in remote mode".to_string())
        })
    }

    pub(crate) fn process_data_fn(&self) -> Result<&ProcessDataFn> {
        self.process_data.as_ref().ok_or_else(|| {
            SelectError::Configuration("process_data is required in remote mode".to_string())
        })
    }
}

/// Serializable select options
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct SelectSettings {
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub multiple: Option<bool>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

impl Default for SelectSettings {
    fn default() -> Self {
        Self {
            placeholder: None,
            multiple: None,
            url: None,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

impl SelectSettings {
    /// Parse settings from TOML
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Start a config from these settings; callbacks are added by the caller
    pub fn into_config(self) -> SelectConfig {
        let mut config = SelectConfig::new()
            .debounce(Duration::from_millis(self.debounce_ms));
        if let Some(placeholder) = self.placeholder {
            config = config.placeholder(placeholder);
        }
        if let Some(multiple) = self.multiple {
            config = config.multiple(multiple);
        }
        if let Some(url) = self.url {
            config = config.url(url);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_placeholder_defaults_to_space() {
        assert_eq!(SelectConfig::new().placeholder_text(), " ");
        assert_eq!(SelectConfig::new().placeholder("").placeholder_text(), " ");
        assert_eq!(
            SelectConfig::new().placeholder("Pick one").placeholder_text(),
            "Pick one"
        );
    }

    #[test]
    fn test_multiple_follows_source_flag() {
        assert!(SelectConfig::new().resolve_multiple(true));
        assert!(!SelectConfig::new().resolve_multiple(false));
        assert!(SelectConfig::new().multiple(true).resolve_multiple(false));
    }

    #[test]
    fn test_remote_callbacks_required() {
        let config = SelectConfig::new().url("https://example.com");
        assert!(config.is_remote());
        assert!(matches!(
            config.query_params_fn(),
            Err(SelectError::Configuration(_))
        ));
        assert!(matches!(
            config.process_data_fn(),
            Err(SelectError::Configuration(_))
        ));
    }

    #[test]
    fn test_processed_data_from_value() {
        let processed = ProcessedData::from_value(&json!({
            "data": [{ "value": "1", "label": "One" }],
            "hasMore": true,
            "optGroup": "Numbers"
        }))
        .unwrap();

        assert_eq!(processed.data, vec![OptionLeaf::new("1", "One")]);
        assert!(processed.has_more);
        assert_eq!(processed.group_label.as_deref(), Some("Numbers"));
    }

    #[test]
    fn test_processed_data_rejects_non_array() {
        let err = ProcessedData::from_value(&json!({ "data": { "value": "1" } })).unwrap_err();
        assert!(matches!(err, SelectError::MalformedResponse(_)));

        let err = ProcessedData::from_value(&json!({ "items": [] })).unwrap_err();
        assert!(matches!(err, SelectError::MalformedResponse(_)));
    }

    #[test]
    fn test_settings_from_toml() {
        let settings = SelectSettings::from_toml_str(
            r#"
            placeholder = "Search people..."
            url = "https://example.com/api/people"
            multiple = true
            "#,
        )
        .unwrap();

        assert_eq!(settings.debounce_ms, DEFAULT_DEBOUNCE_MS);
        let config = settings.into_config();
        assert!(config.is_remote());
        assert!(config.resolve_multiple(false));
        assert_eq!(config.placeholder_text(), "Search people...");
        assert_eq!(config.debounce_window(), Duration::from_millis(500));
    }

    #[test]
    fn test_settings_rejects_bad_toml() {
        let err = SelectSettings::from_toml_str("debounce_ms = \"soon\"").unwrap_err();
        assert!(matches!(err, SelectError::Settings(_)));
    }
}
