use std::{collections::HashMap, sync::Arc};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use shared::{
    domain::StoryId,
    protocol::{SearchPage, Story},
};
use thiserror::Error;
use tokio::sync::{broadcast, watch, Mutex};
use tracing::{debug, warn};
use url::Url;

pub mod history;
pub mod results;
mod settings;
pub mod sort;

pub use settings::DurableSettingsStore;

use history::SearchHistory;
use results::{reduce, StoriesAction, StoriesState};
use sort::{sorted_view, SortKey};

pub const DEFAULT_BASE_URL: &str = "https://hn.algolia.com/api/v1";
pub const DEFAULT_SEARCH_TERM: &str = "React";
pub const SEARCH_TERM_KEY: &str = "search";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("search request failed with status {0}")]
    Status(StatusCode),
    #[error("search request transport failure: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("search response body did not match the expected shape: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Injected HTTP request capability. A non-2xx status or transport failure is
/// a rejected outcome; there is no partial success.
#[async_trait]
pub trait SearchGateway: Send + Sync {
    async fn fetch_page(&self, url: &Url) -> Result<SearchPage>;
}

pub struct MissingSearchGateway;

#[async_trait]
impl SearchGateway for MissingSearchGateway {
    async fn fetch_page(&self, url: &Url) -> Result<SearchPage> {
        Err(anyhow!("search gateway is unavailable for {url}"))
    }
}

pub struct HttpSearchGateway {
    http: Client,
}

impl HttpSearchGateway {
    pub fn new() -> Self {
        Self {
            http: Client::new(),
        }
    }
}

impl Default for HttpSearchGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchGateway for HttpSearchGateway {
    async fn fetch_page(&self, url: &Url) -> Result<SearchPage> {
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(FetchError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status).into());
        }

        let page = response
            .json::<SearchPage>()
            .await
            .map_err(FetchError::Decode)?;
        Ok(page)
    }
}

/// Injected durable key/value capability holding the persisted search term.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> Result<()>;
}

pub struct MissingSettingsStore;

#[async_trait]
impl SettingsStore for MissingSettingsStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Err(anyhow!("settings store is unavailable for key '{key}'"))
    }

    async fn set(&self, key: &str, _value: &str) -> Result<()> {
        Err(anyhow!("settings store is unavailable for key '{key}'"))
    }
}

/// Process-local store for tests and for running without a database.
#[derive(Default)]
pub struct InMemorySettingsStore {
    values: Mutex<HashMap<String, String>>,
}

impl InMemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsStore for InMemorySettingsStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Everything the UI boundary needs to render one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchView {
    pub search_input: String,
    pub is_loading: bool,
    pub is_error: bool,
    pub items: Vec<Story>,
    pub recent_searches: Vec<String>,
    pub can_load_more: bool,
    pub sort_key: SortKey,
    pub sort_reversed: bool,
}

#[derive(Debug, Clone)]
pub enum ClientEvent {
    ViewChanged(SearchView),
    Error(String),
}

/// One entry of the latest-URL slot watched by the fetch task. The sequence
/// number is the history length at issue time; resolutions older than the
/// most recently issued request are discarded.
#[derive(Debug, Clone)]
struct IssuedRequest {
    seq: u64,
    url: Url,
}

struct ClientState {
    stories: StoriesState,
    history: SearchHistory,
    search_input: String,
    sort_key: SortKey,
    sort_reversed: bool,
    issued_seq: u64,
}

/// Composition root: wires the persisted search term, the URL history, the
/// reactive fetch task, and the results reducer behind user-facing intents.
pub struct StoriesClient {
    gateway: Arc<dyn SearchGateway>,
    settings: Arc<dyn SettingsStore>,
    inner: Mutex<ClientState>,
    latest_url: watch::Sender<Option<IssuedRequest>>,
    events: broadcast::Sender<ClientEvent>,
}

impl StoriesClient {
    /// Connects against [`DEFAULT_BASE_URL`] with the stock default term.
    pub async fn initialize(
        gateway: Arc<dyn SearchGateway>,
        settings: Arc<dyn SettingsStore>,
    ) -> Result<Arc<Self>> {
        let base_url = Url::parse(DEFAULT_BASE_URL)?;
        Self::initialize_with_options(base_url, DEFAULT_SEARCH_TERM, gateway, settings).await
    }

    /// Reads the persisted term (falling back to `default_term` when the slot
    /// is empty or the store is unavailable), seeds the history with a page-0
    /// search for it, and starts the fetch task. The seeded search fires
    /// immediately, so the restored term loads without any user input.
    pub async fn initialize_with_options(
        base_url: Url,
        default_term: &str,
        gateway: Arc<dyn SearchGateway>,
        settings: Arc<dyn SettingsStore>,
    ) -> Result<Arc<Self>> {
        let initial_term = match settings.get(SEARCH_TERM_KEY).await {
            Ok(Some(term)) if !term.is_empty() => term,
            Ok(_) => default_term.to_string(),
            Err(err) => {
                warn!("settings store unavailable, defaulting search term: {err:#}");
                default_term.to_string()
            }
        };

        let (latest_url, url_rx) = watch::channel(None);
        let (events, _) = broadcast::channel(256);
        let client = Arc::new(Self {
            gateway,
            settings,
            inner: Mutex::new(ClientState {
                stories: StoriesState::default(),
                history: SearchHistory::new(base_url),
                search_input: initial_term.clone(),
                sort_key: SortKey::default(),
                sort_reversed: false,
                issued_seq: 0,
            }),
            latest_url,
            events,
        });

        client.spawn_fetch_task(url_rx);
        client.issue_search(&initial_term, 0).await?;
        Ok(client)
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    /// Appends a page-0 search for `term` and persists it as the active
    /// search-box value. Empty-term suppression is a UI boundary policy, not
    /// enforced here.
    pub async fn submit_search(&self, term: &str) -> Result<()> {
        self.set_search_input(term).await;
        self.issue_search(term, 0).await
    }

    /// Re-runs a previously submitted term; the search box follows the
    /// picked term.
    pub async fn select_recent_search(&self, term: &str) -> Result<()> {
        self.submit_search(term).await
    }

    /// Requests the next page of the currently active search.
    pub async fn load_more(&self) -> Result<()> {
        let (term, next_page) = {
            let inner = self.inner.lock().await;
            let term = inner
                .history
                .current_term()
                .ok_or_else(|| anyhow!("no search has been submitted yet"))?;
            (term, inner.stories.page + 1)
        };
        self.issue_search(&term, next_page).await
    }

    /// Removes a story from the local results. Absent ids are a no-op.
    pub async fn remove_story(&self, object_id: &StoryId) {
        let mut inner = self.inner.lock().await;
        let next = reduce(
            &inner.stories,
            StoriesAction::RemoveStory {
                object_id: object_id.clone(),
            },
        );
        inner.stories = next;
        self.publish_view(&inner);
    }

    /// Updates the visible search-box value and writes it through to the
    /// settings slot. No request is issued; write failures degrade silently.
    pub async fn set_search_input(&self, term: &str) {
        {
            let mut inner = self.inner.lock().await;
            inner.search_input = term.to_string();
            self.publish_view(&inner);
        }
        if let Err(err) = self.settings.set(SEARCH_TERM_KEY, term).await {
            warn!("failed to persist search term: {err:#}");
        }
    }

    /// Selecting the already-active key toggles the direction; a new key
    /// starts in its natural direction.
    pub async fn set_sort(&self, key: SortKey) {
        let mut inner = self.inner.lock().await;
        if inner.sort_key == key {
            inner.sort_reversed = !inner.sort_reversed;
        } else {
            inner.sort_key = key;
            inner.sort_reversed = false;
        }
        self.publish_view(&inner);
    }

    pub async fn view(&self) -> SearchView {
        view_of(&*self.inner.lock().await)
    }

    pub async fn results_state(&self) -> StoriesState {
        self.inner.lock().await.stories.clone()
    }

    async fn issue_search(&self, term: &str, page: u32) -> Result<()> {
        let (seq, url) = {
            let mut inner = self.inner.lock().await;
            let url = inner.history.push(term, page)?;
            (inner.history.len() as u64, url)
        };
        self.latest_url.send_replace(Some(IssuedRequest { seq, url }));
        Ok(())
    }

    fn spawn_fetch_task(self: &Arc<Self>, mut url_rx: watch::Receiver<Option<IssuedRequest>>) {
        let weak = Arc::downgrade(self);
        tokio::spawn(async move {
            while url_rx.changed().await.is_ok() {
                let Some(request) = (*url_rx.borrow_and_update()).clone() else {
                    continue;
                };
                let Some(client) = weak.upgrade() else {
                    break;
                };
                client.begin_fetch(request).await;
            }
        });
    }

    /// Dispatches FetchInit serially in issue order, then runs the request in
    /// its own task so an in-flight fetch is never cancelled by a newer one.
    async fn begin_fetch(self: &Arc<Self>, request: IssuedRequest) {
        {
            let mut inner = self.inner.lock().await;
            inner.issued_seq = request.seq;
            let next = reduce(&inner.stories, StoriesAction::FetchInit);
            inner.stories = next;
            self.publish_view(&inner);
        }

        let client = Arc::clone(self);
        tokio::spawn(async move {
            let outcome = client.gateway.fetch_page(&request.url).await;
            client.resolve_fetch(request.seq, outcome).await;
        });
    }

    async fn resolve_fetch(&self, seq: u64, outcome: Result<SearchPage>) {
        let mut inner = self.inner.lock().await;
        if seq < inner.issued_seq {
            debug!(seq, latest = inner.issued_seq, "discarding stale search response");
            return;
        }

        match outcome {
            Ok(page) => {
                let next = reduce(
                    &inner.stories,
                    StoriesAction::FetchSuccess {
                        hits: page.hits,
                        page: page.page,
                    },
                );
                inner.stories = next;
                self.publish_view(&inner);
            }
            Err(err) => {
                let next = reduce(&inner.stories, StoriesAction::FetchFailure);
                inner.stories = next;
                self.publish_view(&inner);
                let _ = self
                    .events
                    .send(ClientEvent::Error(format!("search request failed: {err:#}")));
            }
        }
    }

    fn publish_view(&self, state: &ClientState) {
        let _ = self
            .events
            .send(ClientEvent::ViewChanged(view_of(state)));
    }
}

fn view_of(state: &ClientState) -> SearchView {
    SearchView {
        search_input: state.search_input.clone(),
        is_loading: state.stories.is_loading,
        is_error: state.stories.is_error,
        items: sorted_view(&state.stories.data, state.sort_key, state.sort_reversed),
        recent_searches: state.history.recent_searches(),
        can_load_more: !state.stories.is_loading
            && !state.stories.is_error
            && !state.stories.data.is_empty(),
        sort_key: state.sort_key,
        sort_reversed: state.sort_reversed,
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
