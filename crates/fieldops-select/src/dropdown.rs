//! Paginated, searchable single-select control backed by a [`ListProvider`].
//!
//! The control is a state machine owned by one host (a form, a terminal UI,
//! the CLI). Commands such as [`SearchSelect::open`] or
//! [`SearchSelect::set_query`] mutate state synchronously and, when needed,
//! start provider calls or debounce timers as Tokio tasks. Those tasks report
//! back through a channel private to the control. The host applies them by
//! awaiting [`SearchSelect::next_event`] (or [`SearchSelect::settle`]), so every
//! state change still happens through `&mut self`.
//!
//! Ordering rules:
//!
//! - Every fetch carries the generation that was current when it was issued.
//!   Opening, closing, selecting and changing the query bump the generation,
//!   and a completion whose generation is no longer current is discarded.
//! - At most one fetch is in flight per control. A first-page fetch requested
//!   while another is outstanding is queued and issued once that one settles.
//! - Cancellation never aborts the transport; results are simply ignored.
//!
//! The control spawns Tokio tasks and must be driven inside a Tokio runtime.

use std::collections::{BTreeMap, HashSet};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use fieldops_core::{ListItem, ListPage, ListProvider, ListRequest};
use futures::FutureExt;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::debounce::Debouncer;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Formats an item into the label shown in the option list.
pub type LabelFormatter<T> = Arc<dyn Fn(&T) -> String + Send + Sync>;

type SelectCallback<T> = Box<dyn FnMut(&T) + Send>;
type ToggleCallback = Box<dyn FnMut(bool) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    LoadingFirstPage,
    LoadingMore,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    /// First-page fetch that replaces accumulated items.
    Reset,
    /// Next-page fetch that appends de-duplicated items.
    More,
}

/// The parent form's committed choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayOption {
    pub id: String,
    pub label: String,
}

/// What the option panel should show right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListStatus<'a> {
    Closed,
    Loading,
    Error(&'a str),
    Empty(&'a str),
    Ready,
}

/// Result of applying one internal signal, returned by [`SearchSelect::next_event`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectEvent {
    /// The debounce timer elapsed and a first-page fetch for `query` was requested.
    SearchFired { query: String },
    Loaded {
        kind: FetchKind,
        added: usize,
        total: u64,
    },
    Failed { kind: FetchKind, message: String },
    /// A fetch completed after its query or session was superseded.
    Discarded { kind: FetchKind },
}

#[derive(Debug, Clone)]
pub struct SelectOptions {
    pub page_size: u32,
    pub debounce: Duration,
    pub searchable: bool,
    pub disabled: bool,
    /// Static filters added to every request.
    pub filters: BTreeMap<String, String>,
    pub placeholder: String,
    pub error_message: String,
    pub no_data_message: String,
}

impl Default for SelectOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            debounce: DEFAULT_DEBOUNCE,
            searchable: true,
            disabled: false,
            filters: BTreeMap::new(),
            placeholder: "Select".to_owned(),
            error_message: "Failed to load items. Please try again.".to_owned(),
            no_data_message: "No items found".to_owned(),
        }
    }
}

enum Signal<T> {
    Fetched {
        generation: u64,
        kind: FetchKind,
        outcome: Result<ListPage<T>, String>,
    },
    DebounceElapsed {
        token: u64,
    },
}

pub struct SearchSelect<P: ListProvider> {
    provider: Arc<P>,
    options: SelectOptions,
    formatter: LabelFormatter<P::Item>,
    on_select: Option<SelectCallback<P::Item>>,
    on_toggle: Option<ToggleCallback>,
    selection: Option<Selection>,

    is_open: bool,
    query: String,
    page: u32,
    total_count: u64,
    total_pages: u64,
    items: Vec<P::Item>,
    load_state: LoadState,
    error: Option<String>,
    failed_fetch: Option<FetchKind>,

    generation: u64,
    in_flight: Option<FetchKind>,
    queued_reset: bool,
    debouncer: Debouncer,
    tx: UnboundedSender<Signal<P::Item>>,
    rx: UnboundedReceiver<Signal<P::Item>>,
}

impl<P: ListProvider> SearchSelect<P> {
    #[must_use]
    pub fn new(provider: Arc<P>, options: SelectOptions) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let debouncer = Debouncer::new(options.debounce);
        let page_size = options.page_size.max(1);
        Self {
            provider,
            options: SelectOptions {
                page_size,
                ..options
            },
            formatter: Arc::new(default_label::<P::Item>),
            on_select: None,
            on_toggle: None,
            selection: None,
            is_open: false,
            query: String::new(),
            page: 1,
            total_count: 0,
            total_pages: 0,
            items: Vec::new(),
            load_state: LoadState::Idle,
            error: None,
            failed_fetch: None,
            generation: 0,
            in_flight: None,
            queued_reset: false,
            debouncer,
            tx,
            rx,
        }
    }

    /// Replaces the default label formatter (item name, falling back to id).
    #[must_use]
    pub fn with_formatter<F>(mut self, formatter: F) -> Self
    where
        F: Fn(&P::Item) -> String + Send + Sync + 'static,
    {
        self.formatter = Arc::new(formatter);
        self
    }

    #[must_use]
    pub fn on_select<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&P::Item) + Send + 'static,
    {
        self.on_select = Some(Box::new(callback));
        self
    }

    /// Registers a callback notified with `true`/`false` on open/close.
    #[must_use]
    pub fn on_toggle<F>(mut self, callback: F) -> Self
    where
        F: FnMut(bool) + Send + 'static,
    {
        self.on_toggle = Some(Box::new(callback));
        self
    }

    #[must_use]
    pub fn with_selection(mut self, selection: Option<Selection>) -> Self {
        self.selection = selection;
        self
    }

    /// Updates the committed selection supplied by the parent form.
    pub fn set_selection(&mut self, selection: Option<Selection>) {
        self.selection = selection;
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    /// Opens the option list and starts a fresh first-page fetch.
    ///
    /// Ignored when the control is disabled or already open.
    pub fn open(&mut self) {
        if self.options.disabled || self.is_open {
            return;
        }
        self.is_open = true;
        self.generation += 1;
        self.items.clear();
        self.page = 1;
        self.total_count = 0;
        self.total_pages = 0;
        self.error = None;
        self.failed_fetch = None;
        self.notify_toggle(true);
        self.request_reset();
    }

    /// Closes the option list and discards the working state.
    ///
    /// The parent's committed selection is left untouched. Any fetch still in
    /// flight completes in the background and is ignored.
    pub fn close(&mut self) {
        if !self.is_open {
            return;
        }
        self.is_open = false;
        self.generation += 1;
        self.debouncer.cancel();
        self.queued_reset = false;
        self.query.clear();
        self.page = 1;
        self.total_count = 0;
        self.total_pages = 0;
        self.items.clear();
        self.load_state = LoadState::Idle;
        self.error = None;
        self.failed_fetch = None;
        self.notify_toggle(false);
    }

    pub fn toggle(&mut self) {
        if self.is_open {
            self.close();
        } else {
            self.open();
        }
    }

    /// Updates the search text.
    ///
    /// While open and searchable, (re)starts the debounce timer; when it
    /// elapses a first-page fetch for the latest text is issued. Results of
    /// fetches issued for earlier text are discarded on arrival.
    pub fn set_query(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text == self.query {
            return;
        }
        self.query = text;
        if !self.is_open || !self.options.searchable {
            return;
        }
        self.generation += 1;
        self.queued_reset = false;
        // A failed page belonged to the old text; only a first page can follow.
        self.failed_fetch = None;
        self.debouncer
            .schedule(&self.tx, |token| Signal::DebounceElapsed { token });
    }

    /// Requests the next page. Returns `false` when gated.
    ///
    /// Only runs when the control is open and idle, no search is pending, and
    /// the provider reported more records than are loaded.
    pub fn load_more(&mut self) -> bool {
        if !self.is_open
            || self.load_state != LoadState::Idle
            || self.in_flight.is_some()
            || self.debouncer.is_pending()
            || !self.has_more()
        {
            return false;
        }
        self.dispatch(FetchKind::More);
        true
    }

    /// Re-issues the fetch that failed. Returns `false` outside the error state.
    ///
    /// If the query changed since the failure, the retry becomes a first-page
    /// fetch for the current text and the pending search timer is dropped.
    pub fn retry(&mut self) -> bool {
        if !self.is_open || self.load_state != LoadState::Error {
            return false;
        }
        if self.debouncer.is_pending() {
            self.debouncer.cancel();
            self.failed_fetch = None;
        }
        match self.failed_fetch.take() {
            Some(FetchKind::More) => self.dispatch(FetchKind::More),
            Some(FetchKind::Reset) | None => self.request_reset(),
        }
        true
    }

    /// Hands `item` to the selection callback, then closes the control.
    pub fn select_item(&mut self, item: &P::Item) {
        if let Some(callback) = self.on_select.as_mut() {
            callback(item);
        }
        self.close();
    }

    /// Selects a loaded item by id. Returns `false` if no such item is loaded.
    pub fn select_by_id(&mut self, id: &str) -> bool {
        let Some(item) = self.items.iter().find(|i| i.id() == id).cloned() else {
            return false;
        };
        self.select_item(&item);
        true
    }

    // ------------------------------------------------------------------
    // Event pump
    // ------------------------------------------------------------------

    /// Waits for the next fetch completion or debounce timer and applies it.
    ///
    /// Returns `None` immediately when nothing is pending.
    pub async fn next_event(&mut self) -> Option<SelectEvent> {
        loop {
            if !self.is_busy() {
                return None;
            }
            let signal = self.rx.recv().await?;
            if let Some(event) = self.apply(signal) {
                return Some(event);
            }
        }
    }

    /// Applies events until no fetch or timer is pending.
    pub async fn settle(&mut self) -> Vec<SelectEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.next_event().await {
            events.push(event);
        }
        events
    }

    /// `true` while a fetch is outstanding or a debounce timer is armed.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some() || self.queued_reset || self.debouncer.is_pending()
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    /// Loaded items as `(id, label)` pairs, in load order.
    #[must_use]
    pub fn options(&self) -> Vec<DisplayOption> {
        self.items
            .iter()
            .map(|item| DisplayOption {
                id: item.id().to_owned(),
                label: (self.formatter)(item),
            })
            .collect()
    }

    /// Committed selection label, or the placeholder.
    #[must_use]
    pub fn display_text(&self) -> &str {
        self.selection
            .as_ref()
            .map_or(self.options.placeholder.as_str(), |s| s.label.as_str())
    }

    #[must_use]
    pub fn status(&self) -> ListStatus<'_> {
        if !self.is_open {
            return ListStatus::Closed;
        }
        match self.load_state {
            LoadState::LoadingFirstPage => ListStatus::Loading,
            // A failed next page keeps the loaded items on screen.
            LoadState::Error if self.items.is_empty() => ListStatus::Error(
                self.error
                    .as_deref()
                    .unwrap_or(&self.options.error_message),
            ),
            _ if self.items.is_empty() => ListStatus::Empty(&self.options.no_data_message),
            _ => ListStatus::Ready,
        }
    }

    /// `"Load More (10 of 25)"` while more pages remain.
    #[must_use]
    pub fn load_more_label(&self) -> Option<String> {
        self.has_more().then(|| {
            format!(
                "Load More ({} of {})",
                self.items.len(),
                self.total_count
            )
        })
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.is_open
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Number of pages loaded into `items` (1 after a first-page fetch).
    #[must_use]
    pub fn page(&self) -> u32 {
        self.page
    }

    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.options.page_size
    }

    #[must_use]
    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    #[must_use]
    pub fn total_pages(&self) -> u64 {
        self.total_pages
    }

    #[must_use]
    pub fn items(&self) -> &[P::Item] {
        &self.items
    }

    #[must_use]
    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    #[must_use]
    pub fn has_more(&self) -> bool {
        u64::from(self.page) < self.total_pages && (self.items.len() as u64) < self.total_count
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn notify_toggle(&mut self, open: bool) {
        if let Some(callback) = self.on_toggle.as_mut() {
            callback(open);
        }
    }

    /// Issues a first-page fetch, or queues it behind the one in flight.
    fn request_reset(&mut self) {
        self.load_state = LoadState::LoadingFirstPage;
        self.error = None;
        if self.in_flight.is_some() {
            self.queued_reset = true;
            return;
        }
        self.dispatch(FetchKind::Reset);
    }

    fn build_request(&self, kind: FetchKind) -> ListRequest {
        let page = match kind {
            FetchKind::Reset => 1,
            FetchKind::More => self.page + 1,
        };
        let search = if self.options.searchable {
            self.query.as_str()
        } else {
            ""
        };
        ListRequest::new(page, self.options.page_size)
            .with_search(search)
            .with_filters(&self.options.filters)
    }

    fn dispatch(&mut self, kind: FetchKind) {
        let request = self.build_request(kind);
        self.load_state = match kind {
            FetchKind::Reset => LoadState::LoadingFirstPage,
            FetchKind::More => LoadState::LoadingMore,
        };
        self.error = None;
        self.in_flight = Some(kind);

        let generation = self.generation;
        let provider = Arc::clone(&self.provider);
        let tx = self.tx.clone();
        tracing::debug!(
            generation,
            ?kind,
            page = request.page,
            search = request.search.as_deref().unwrap_or(""),
            "dispatching list fetch"
        );

        tokio::spawn(async move {
            let outcome = match AssertUnwindSafe(provider.fetch_page(request))
                .catch_unwind()
                .await
            {
                Ok(Ok(page)) => Ok(page),
                Ok(Err(e)) => Err(e.to_string()),
                Err(_) => Err("list provider panicked".to_owned()),
            };
            // Receiver gone means the control was dropped.
            let _ = tx.send(Signal::Fetched {
                generation,
                kind,
                outcome,
            });
        });
    }

    fn apply(&mut self, signal: Signal<P::Item>) -> Option<SelectEvent> {
        match signal {
            Signal::DebounceElapsed { token } => {
                if !self.debouncer.acknowledge(token) || !self.is_open {
                    return None;
                }
                let query = self.query.trim().to_owned();
                self.request_reset();
                Some(SelectEvent::SearchFired { query })
            }
            Signal::Fetched {
                generation,
                kind,
                outcome,
            } => {
                self.in_flight = None;
                let event = if generation == self.generation {
                    self.apply_outcome(kind, outcome)
                } else {
                    tracing::debug!(
                        generation,
                        current = self.generation,
                        ?kind,
                        "discarding stale list fetch"
                    );
                    if !self.queued_reset
                        && matches!(
                            self.load_state,
                            LoadState::LoadingFirstPage | LoadState::LoadingMore
                        )
                        && !self.debouncer.is_pending()
                    {
                        self.load_state = LoadState::Idle;
                    }
                    SelectEvent::Discarded { kind }
                };
                if self.queued_reset {
                    self.queued_reset = false;
                    self.dispatch(FetchKind::Reset);
                }
                Some(event)
            }
        }
    }

    fn apply_outcome(
        &mut self,
        kind: FetchKind,
        outcome: Result<ListPage<P::Item>, String>,
    ) -> SelectEvent {
        match outcome {
            Ok(page) if page.success => {
                let total = page.total_or_len();
                let added = match kind {
                    FetchKind::Reset => {
                        self.items = page.data;
                        self.page = 1;
                        self.items.len()
                    }
                    FetchKind::More => {
                        let mut seen: HashSet<String> =
                            self.items.iter().map(|i| i.id().to_owned()).collect();
                        let before = self.items.len();
                        self.items.extend(
                            page.data
                                .into_iter()
                                .filter(|item| seen.insert(item.id().to_owned())),
                        );
                        self.page += 1;
                        self.items.len() - before
                    }
                };
                self.total_count = total;
                self.total_pages = total.div_ceil(u64::from(self.options.page_size));
                self.load_state = LoadState::Idle;
                self.error = None;
                self.failed_fetch = None;
                tracing::debug!(
                    ?kind,
                    added,
                    loaded = self.items.len(),
                    total,
                    "applied list page"
                );
                SelectEvent::Loaded { kind, added, total }
            }
            Ok(page) => {
                let message = page
                    .message
                    .unwrap_or_else(|| self.options.error_message.clone());
                tracing::warn!(?kind, %message, "list provider rejected request");
                self.fail(kind, message)
            }
            Err(error) => {
                tracing::warn!(?kind, %error, "list fetch failed");
                let message = self.options.error_message.clone();
                self.fail(kind, message)
            }
        }
    }

    fn fail(&mut self, kind: FetchKind, message: String) -> SelectEvent {
        self.load_state = LoadState::Error;
        self.error = Some(message.clone());
        self.failed_fetch = Some(kind);
        if kind == FetchKind::Reset {
            self.items.clear();
            self.total_count = 0;
            self.total_pages = 0;
        }
        SelectEvent::Failed { kind, message }
    }
}

fn default_label<T: ListItem>(item: &T) -> String {
    item.name().unwrap_or(item.id()).to_owned()
}

#[cfg(test)]
#[path = "dropdown_test.rs"]
mod tests;
