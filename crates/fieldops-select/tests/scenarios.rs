//! End-to-end behaviour of the selection controls against in-memory providers,
//! driven on a paused Tokio clock.

use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use fieldops_core::{
    City, ListItem, ListPage, ListProvider, ListRequest, PincodeLookup, PincodeRecord,
    PlaceSearch, PlaceSuggestion, Record,
};
use fieldops_select::{
    AreaSuggester, FetchKind, LoadState, LocationResolver, PincodeOutcome, SearchSelect,
    SelectEvent, SelectOptions, SuggestEvent,
};
use serde_json::json;

#[derive(Debug)]
struct Offline;

impl fmt::Display for Offline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("offline")
    }
}

impl std::error::Error for Offline {}

// ---------------------------------------------------------------------------
// Remote list fake
// ---------------------------------------------------------------------------

type PageFn = Box<dyn Fn(&ListRequest) -> (Duration, ListPage<Record>) + Send + Sync>;

struct FakeList {
    page_fn: PageFn,
    requests: Mutex<Vec<ListRequest>>,
}

impl FakeList {
    fn new(
        page_fn: impl Fn(&ListRequest) -> (Duration, ListPage<Record>) + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            page_fn: Box::new(page_fn),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// `total` records per search term, ids prefixed with the term.
    fn catalog(total: usize) -> Arc<Self> {
        Self::new(move |req| {
            (
                Duration::from_millis(100),
                slice(req, req.search.as_deref().unwrap_or("all"), total),
            )
        })
    }

    fn requests(&self) -> Vec<ListRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl ListProvider for FakeList {
    type Item = Record;
    type Error = Offline;

    async fn fetch_page(&self, request: ListRequest) -> Result<ListPage<Record>, Offline> {
        let (latency, page) = (self.page_fn)(&request);
        self.requests.lock().unwrap().push(request);
        tokio::time::sleep(latency).await;
        Ok(page)
    }
}

fn record(id: &str) -> Record {
    serde_json::from_value(json!({ "id": id, "name": format!("Record {id}") })).unwrap()
}

fn slice(req: &ListRequest, prefix: &str, total: usize) -> ListPage<Record> {
    let limit = req.limit as usize;
    let start = (req.page as usize - 1) * limit;
    let data = (start..total.min(start + limit))
        .map(|n| record(&format!("{prefix}-{n}")))
        .collect();
    ListPage::ok(data, Some(total as u64))
}

fn ids(select: &SearchSelect<FakeList>) -> Vec<String> {
    select.items().iter().map(|r| r.id().to_owned()).collect()
}

// ---------------------------------------------------------------------------
// Search-select control
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn overlapping_pages_never_duplicate_ids() {
    // Each page repeats the last id of the previous one.
    let provider = FakeList::new(|req| {
        let start = (req.page as usize - 1) * 2;
        let data = (start..start + 3).map(|n| record(&n.to_string())).collect();
        (Duration::from_millis(10), ListPage::ok(data, Some(12)))
    });
    let mut select = SearchSelect::new(
        Arc::clone(&provider),
        SelectOptions {
            page_size: 3,
            ..SelectOptions::default()
        },
    );

    select.open();
    select.settle().await;
    while select.load_more() {
        select.settle().await;
    }

    let ids = ids(&select);
    let unique: HashSet<&String> = ids.iter().collect();
    assert_eq!(unique.len(), ids.len(), "duplicate ids in {ids:?}");
    assert_eq!(provider.requests().len(), 4);
}

#[tokio::test(start_paused = true)]
async fn reopening_discards_items_and_refetches_first_page() {
    let provider = FakeList::catalog(25);
    let mut select = SearchSelect::new(Arc::clone(&provider), SelectOptions::default());

    select.open();
    select.settle().await;
    assert!(select.load_more());
    select.settle().await;
    assert_eq!(select.items().len(), 20);

    select.close();
    select.open();
    assert!(select.items().is_empty());
    assert_eq!(select.page(), 1);
    select.settle().await;

    assert_eq!(select.items().len(), 10);
    let pages: Vec<u32> = provider.requests().iter().map(|r| r.page).collect();
    assert_eq!(pages, vec![1, 2, 1]);
}

#[tokio::test(start_paused = true)]
async fn rapid_keystrokes_issue_one_search() {
    let provider = FakeList::catalog(25);
    let mut select = SearchSelect::new(Arc::clone(&provider), SelectOptions::default());
    select.open();
    select.settle().await;

    select.set_query("a");
    tokio::time::advance(Duration::from_millis(200)).await;
    select.set_query("ab");
    tokio::time::advance(Duration::from_millis(200)).await;
    select.set_query("abc");

    let events = select.settle().await;
    assert_eq!(
        events.first(),
        Some(&SelectEvent::SearchFired {
            query: "abc".to_owned()
        })
    );

    let searches: Vec<Option<String>> = provider
        .requests()
        .into_iter()
        .skip(1)
        .map(|r| r.search)
        .collect();
    assert_eq!(searches, vec![Some("abc".to_owned())]);
    assert!(ids(&select).iter().all(|id| id.starts_with("abc-")));
}

#[tokio::test(start_paused = true)]
async fn slow_result_for_old_query_is_discarded() {
    let provider = FakeList::new(|req| {
        let search = req.search.clone().unwrap_or_default();
        let latency = if search == "a" { 2_000 } else { 100 };
        (Duration::from_millis(latency), slice(req, &search, 25))
    });
    let mut select = SearchSelect::new(Arc::clone(&provider), SelectOptions::default());
    select.open();
    select.settle().await;

    select.set_query("a");
    assert_eq!(
        select.next_event().await,
        Some(SelectEvent::SearchFired {
            query: "a".to_owned()
        })
    );
    select.set_query("b");
    let events = select.settle().await;

    assert!(events.contains(&SelectEvent::Discarded {
        kind: FetchKind::Reset
    }));
    let ids = ids(&select);
    assert_eq!(ids.len(), 10);
    assert!(ids.iter().all(|id| id.starts_with("b-")), "got {ids:?}");
    assert_eq!(select.load_state(), LoadState::Idle);
}

#[tokio::test(start_paused = true)]
async fn load_more_during_first_page_is_ignored() {
    let provider = FakeList::catalog(25);
    let mut select = SearchSelect::new(Arc::clone(&provider), SelectOptions::default());

    select.open();
    assert_eq!(select.load_state(), LoadState::LoadingFirstPage);
    assert!(!select.load_more());

    let events = select.settle().await;
    assert_eq!(events.len(), 1);
    assert_eq!(provider.requests().len(), 1);
    assert_eq!(select.items().len(), 10);
}

#[tokio::test(start_paused = true)]
async fn pages_through_twenty_five_records() {
    let provider = FakeList::catalog(25);
    let mut select = SearchSelect::new(Arc::clone(&provider), SelectOptions::default());

    select.open();
    select.settle().await;
    assert_eq!(select.items().len(), 10);
    assert_eq!(select.load_state(), LoadState::Idle);

    assert!(select.load_more());
    select.settle().await;
    assert!(select.load_more());
    select.settle().await;
    assert_eq!(select.items().len(), 25);
    assert_eq!(select.total_count(), 25);

    assert!(!select.load_more());
    assert!(!select.is_busy());
    assert_eq!(provider.requests().len(), 3);
}

// ---------------------------------------------------------------------------
// Location resolution
// ---------------------------------------------------------------------------

struct CountingLookup {
    records: Vec<PincodeRecord>,
    calls: AtomicUsize,
}

impl CountingLookup {
    fn new(records: Vec<PincodeRecord>) -> Self {
        Self {
            records,
            calls: AtomicUsize::new(0),
        }
    }
}

impl PincodeLookup for &CountingLookup {
    type Error = Offline;

    async fn lookup(&self, _pincode: &str) -> Result<Vec<PincodeRecord>, Offline> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.records.clone())
    }
}

fn pune_record(district: &str) -> Vec<PincodeRecord> {
    vec![PincodeRecord {
        district: district.to_owned(),
        state: "Maharashtra".to_owned(),
    }]
}

fn pune_catalog() -> Vec<City> {
    vec![City {
        id: "c1".to_owned(),
        name: "Pune".to_owned(),
        state: "Maharashtra".to_owned(),
        slug: None,
        pincode: None,
    }]
}

#[tokio::test]
async fn five_digits_stay_unresolved_and_six_resolve() {
    let lookup = CountingLookup::new(pune_record("Pune"));
    let mut resolver = LocationResolver::new(&lookup, Vec::new());

    let update = resolver.on_pincode_changed("12345").await;
    assert_eq!(update.pincode, "12345");
    assert_eq!(update.outcome, PincodeOutcome::Incomplete);
    assert_eq!(lookup.calls.load(Ordering::SeqCst), 0);
    let res = resolver.resolution();
    assert!(res.resolved_state.is_none());
    assert!(res.resolved_city_name.is_none());
    assert!(res.matched_city_id.is_none());

    let update = resolver.on_pincode_changed("123456").await;
    assert_eq!(update.outcome, PincodeOutcome::Resolved);
    let res = resolver.resolution();
    assert_eq!(res.resolved_state.as_deref(), Some("Maharashtra"));
    assert_eq!(res.resolved_city_name.as_deref(), Some("Pune"));
}

#[tokio::test]
async fn district_containing_catalog_name_matches() {
    let lookup = CountingLookup::new(pune_record("Pune City"));
    let mut resolver = LocationResolver::new(&lookup, pune_catalog());

    resolver.on_pincode_changed("411001").await;
    assert_eq!(resolver.resolution().matched_city_id.as_deref(), Some("c1"));
    assert_eq!(
        resolver.resolution().resolved_city_name.as_deref(),
        Some("Pune City")
    );
}

#[tokio::test]
async fn unknown_pincode_keeps_digits_and_notifies() {
    let lookup = CountingLookup::new(Vec::new());
    let mut resolver = LocationResolver::new(&lookup, pune_catalog());

    let update = resolver.on_pincode_changed("999999").await;
    let PincodeOutcome::Invalid(notice) = update.outcome else {
        panic!("expected invalid pincode notice");
    };
    assert_eq!(notice.title, "Invalid Pincode");
    assert_eq!(resolver.resolution().pincode, "999999");
    assert!(!resolver.resolution().is_resolved());
}

// ---------------------------------------------------------------------------
// Area suggestions alongside pincode resolution
// ---------------------------------------------------------------------------

struct OnePlace;

impl PlaceSearch for OnePlace {
    type Error = Offline;

    async fn search(&self, query: &str, _limit: usize) -> Result<Vec<PlaceSuggestion>, Offline> {
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok(vec![PlaceSuggestion {
            id: "p1".to_owned(),
            name: format!("{query} Road"),
            display_name: format!("{query} Road, Pune, Maharashtra, India"),
            lat: 18.5,
            lon: 73.8,
        }])
    }
}

#[tokio::test(start_paused = true)]
async fn pincode_resolution_does_not_cancel_pending_suggestion() {
    let lookup = CountingLookup::new(pune_record("Pune"));
    let mut resolver = LocationResolver::new(&lookup, pune_catalog());
    let mut suggester = AreaSuggester::new(Arc::new(OnePlace), Duration::from_millis(500));

    suggester.set_text("Baner");
    tokio::time::advance(Duration::from_millis(200)).await;
    resolver.on_pincode_changed("411045").await;
    assert!(resolver.resolution().is_resolved());

    let events = suggester.settle().await;
    assert_eq!(events.last(), Some(&SuggestEvent::Suggestions { count: 1 }));
    assert_eq!(suggester.choose("p1").as_deref(), Some("Baner Road"));
}
