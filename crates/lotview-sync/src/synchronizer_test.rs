use std::future::Future;

use lotview_filters::Condition;

use super::*;
use crate::router::{MemoryRouter, RouterCall};

const DEBOUNCE: Duration = Duration::from_millis(250);

fn q(search: &str) -> UrlQuery {
    parse_search(search)
}

fn mounted(router: &MemoryRouter, search: &str) -> InventorySync<MemoryRouter> {
    let mut sync = InventorySync::new(router.clone(), DEBOUNCE);
    sync.mount(search);
    sync
}

/// Router whose replace is followed by an outside navigation before the
/// write settles, whether or not the write itself succeeded.
struct RacingRouter {
    inner: MemoryRouter,
    racer: UrlQuery,
}

impl UrlRouter for RacingRouter {
    fn current_query(&self) -> UrlQuery {
        self.inner.current_query()
    }

    fn subscribe(&self) -> watch::Receiver<UrlQuery> {
        self.inner.subscribe()
    }

    fn replace(&self, query: UrlQuery) -> impl Future<Output = Result<(), SyncError>> + Send {
        let inner = self.inner.clone();
        let racer = self.racer.clone();
        async move {
            let result = inner.replace(query).await;
            inner.push_external(racer);
            result
        }
    }

    fn navigate(&self, query: UrlQuery) -> impl Future<Output = Result<(), SyncError>> + Send {
        self.inner.navigate(query)
    }
}

#[tokio::test(start_paused = true)]
async fn new_does_not_read_the_route_snapshot() {
    let router = MemoryRouter::from_search("?search=stale&minPrice=10");
    let sync = InventorySync::new(router, DEBOUNCE);
    assert_eq!(sync.phase(), SyncPhase::Uninitialized);
    assert_eq!(*sync.state(), FilterState::default());
    assert!(!sync.has_pending_write());
}

#[tokio::test(start_paused = true)]
async fn mount_adopts_browser_query_over_stale_snapshot() {
    let router = MemoryRouter::from_search("?search=stale&utm=x");
    let mut sync = InventorySync::new(router.clone(), DEBOUNCE);

    sync.mount("?search=fresh&utm=x&sort=price-ascending");

    assert!(sync.is_ready());
    assert_eq!(sync.state().search_query, "fresh");
    assert_eq!(sync.sort_mode(), SortMode::PriceAscending);
    assert!(sync.has_pending_write());

    let step = sync.step().await.unwrap();
    assert_eq!(
        step,
        SyncStep::UrlWritten(q("search=fresh&sort=price-ascending&utm=x"))
    );
    assert_eq!(router.current_query(), q("search=fresh&sort=price-ascending&utm=x"));
}

#[tokio::test(start_paused = true)]
async fn mount_on_canonical_url_schedules_nothing() {
    let router = MemoryRouter::from_search("?search=barn&condition=used");
    let sync = mounted(&router, "?search=barn&condition=used");
    assert_eq!(sync.state().condition, Some(Condition::Used));
    assert!(!sync.has_pending_write());
}

#[tokio::test(start_paused = true)]
async fn changes_before_mount_are_never_written() {
    let router = MemoryRouter::new(UrlQuery::new());
    let mut sync = InventorySync::new(router.clone(), DEBOUNCE);

    sync.update(|s| s.search_query = "early".to_string());
    assert_eq!(sync.step().await.unwrap(), SyncStep::NotReady);
    assert!(router.calls().is_empty());

    assert!(!sync.apply_route_query(&q("search=shed")));
    assert_eq!(sync.state().search_query, "early");
}

#[tokio::test(start_paused = true)]
async fn burst_of_updates_coalesces_into_one_replace() {
    let router = MemoryRouter::new(UrlQuery::new());
    let mut sync = mounted(&router, "");
    let start = Instant::now();

    for typed in ["b", "ba", "bar", "barn"] {
        sync.update(|s| s.search_query = typed.to_string());
        tokio::time::advance(Duration::from_millis(100)).await;
    }
    let deadline = sync.write_deadline().unwrap();
    assert_eq!(deadline - start, Duration::from_millis(550));

    let step = sync.step().await.unwrap();

    assert_eq!(step, SyncStep::UrlWritten(q("search=barn")));
    assert!(Instant::now() >= deadline);
    assert_eq!(router.calls(), vec![RouterCall::Replace(q("search=barn"))]);
}

#[tokio::test(start_paused = true)]
async fn own_write_is_not_seen_as_route_change() {
    let router = MemoryRouter::new(UrlQuery::new());
    let mut sync = mounted(&router, "");
    sync.update(|s| s.min_price = Some(1000.0));
    sync.step().await.unwrap();
    assert!(!sync.is_syncing());

    let idle = tokio::time::timeout(Duration::from_secs(5), sync.step()).await;
    assert!(idle.is_err(), "synchronizer reacted to its own write");
    assert_eq!(router.replace_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn no_op_update_schedules_nothing() {
    let router = MemoryRouter::new(UrlQuery::new());
    let mut sync = mounted(&router, "?search=barn");
    // mount schedules the canonicalizing write; drain it first.
    sync.step().await.unwrap();

    sync.update(|s| s.search_query = "barn".to_string());
    assert!(!sync.has_pending_write());
    sync.set_sort_mode(SortMode::Default);
    assert!(!sync.has_pending_write());
}

#[tokio::test(start_paused = true)]
async fn back_navigation_is_adopted() {
    let events = EventBus::default();
    let mut rx = events.subscribe();
    let router = MemoryRouter::new(UrlQuery::new());
    let mut sync = mounted(&router, "").with_events(events);

    router.push_external(q("search=shed&minPrice=100&sort=size-descending"));
    assert_eq!(sync.step().await.unwrap(), SyncStep::RouteAdopted);

    assert_eq!(sync.state().search_query, "shed");
    assert_eq!(sync.state().min_price, Some(100.0));
    assert_eq!(sync.sort_mode(), SortMode::SizeDescending);
    assert!(!sync.has_pending_write());
    assert!(matches!(
        rx.try_recv().unwrap(),
        CatalogEvent::RouteAdopted { .. }
    ));
}

#[tokio::test(start_paused = true)]
async fn non_canonical_route_is_rewritten() {
    let router = MemoryRouter::new(UrlQuery::new());
    let mut sync = mounted(&router, "");

    router.push_external(q("minPrice=abc&search=shed&sort=bogus&discounted=yes"));
    sync.step().await.unwrap();
    assert_eq!(sync.state().min_price, None);
    assert_eq!(sync.state().discounted, None);
    assert_eq!(sync.sort_mode(), SortMode::Default);
    assert!(sync.has_pending_write());

    let step = sync.step().await.unwrap();
    assert_eq!(step, SyncStep::UrlWritten(q("search=shed")));
}

#[tokio::test(start_paused = true)]
async fn unrelated_params_survive_write_back() {
    let router = MemoryRouter::from_search("?utm_source=mail&page=2");
    let mut sync = mounted(&router, "?utm_source=mail&page=2");

    sync.update(|s| {
        s.location_slug = Some("dothan".to_string());
        s.discounted = Some(false);
    });
    sync.flush().await.unwrap();

    assert_eq!(
        router.current_query(),
        q("discounted=0&location=dothan&page=2&utm_source=mail")
    );
    assert!(!sync.has_pending_write());
}

#[tokio::test(start_paused = true)]
async fn default_sort_is_omitted() {
    let router = MemoryRouter::new(UrlQuery::new());
    let mut sync = mounted(&router, "");

    sync.set_sort_mode(SortMode::ProductName);
    sync.step().await.unwrap();
    assert_eq!(router.current_query(), q("sort=product-name"));

    sync.set_sort_mode(SortMode::Default);
    sync.step().await.unwrap();
    assert!(router.current_query().is_empty());
}

#[tokio::test(start_paused = true)]
async fn chip_removal_and_reset_keep_region() {
    let router = MemoryRouter::new(UrlQuery::new());
    let mut sync = mounted(&router, "?search=barn&minPrice=1000&region=south");
    sync.step().await.unwrap();

    sync.clear_chip(FilterKey::RegionSlug);
    assert!(!sync.has_pending_write());

    sync.clear_chip(FilterKey::MinPrice);
    assert_eq!(sync.state().min_price, None);
    assert_eq!(sync.state().search_query, "barn");

    sync.reset();
    sync.step().await.unwrap();
    assert_eq!(router.current_query(), q("region=south"));
}

#[tokio::test(start_paused = true)]
async fn failed_write_releases_guard_and_surfaces_error() {
    let router = MemoryRouter::new(UrlQuery::new());
    let mut sync = mounted(&router, "");
    router.reject_writes(Some("navigation aborted"));

    sync.update(|s| s.size = Some("12x24".to_string()));
    let err = sync.step().await.unwrap_err();

    assert!(matches!(err, SyncError::Navigation { action: "replace", .. }));
    assert!(!sync.is_syncing());
    assert!(router.current_query().is_empty());
    assert_eq!(sync.state().size.as_deref(), Some("12x24"));

    router.reject_writes(None);
    assert_eq!(
        sync.flush().await.unwrap(),
        SyncStep::UrlWritten(q("size=12x24"))
    );
}

#[tokio::test(start_paused = true)]
async fn navigation_racing_a_write_is_applied_afterwards() {
    let inner = MemoryRouter::new(UrlQuery::new());
    let router = RacingRouter {
        inner: inner.clone(),
        racer: q("search=from-back-button"),
    };
    let mut sync = InventorySync::new(router, DEBOUNCE);
    sync.mount("");

    sync.update(|s| s.search_query = "typed".to_string());
    sync.step().await.unwrap();

    assert_eq!(sync.state().search_query, "from-back-button");
    assert!(!sync.is_syncing());
}

#[tokio::test(start_paused = true)]
async fn navigation_landing_with_an_expired_debounce_wins() {
    // Both wake sources are ready at once; repeat so an unordered pick
    // would show up.
    for _ in 0..32 {
        let router = MemoryRouter::new(UrlQuery::new());
        let mut sync = mounted(&router, "");

        sync.update(|s| s.search_query = "typed".to_string());
        router.push_external(q("search=from-back-button"));
        tokio::time::advance(DEBOUNCE + Duration::from_millis(50)).await;

        assert_eq!(sync.step().await.unwrap(), SyncStep::RouteAdopted);
        assert_eq!(sync.state().search_query, "from-back-button");
        assert!(!sync.has_pending_write());
        assert!(router.calls().is_empty());
        assert_eq!(router.current_query(), q("search=from-back-button"));
    }
}

#[tokio::test(start_paused = true)]
async fn navigation_racing_a_failed_write_is_still_applied() {
    let inner = MemoryRouter::new(UrlQuery::new());
    inner.reject_writes(Some("navigation aborted"));
    let router = RacingRouter {
        inner: inner.clone(),
        racer: q("search=from-back-button"),
    };
    let mut sync = InventorySync::new(router, DEBOUNCE);
    sync.mount("");

    sync.update(|s| s.search_query = "typed".to_string());
    let err = sync.step().await.unwrap_err();

    assert!(matches!(err, SyncError::Navigation { action: "replace", .. }));
    assert!(!sync.is_syncing());
    assert_eq!(sync.state().search_query, "from-back-button");
    assert_eq!(inner.current_query(), q("search=from-back-button"));
    assert!(!sync.has_pending_write());
}

#[tokio::test(start_paused = true)]
async fn failed_strip_keeps_state_in_step_with_url() {
    let router = MemoryRouter::from_search("?tag=nonexistent&search=barn");
    let mut sync = mounted(&router, "?tag=nonexistent&search=barn");
    let valid: BTreeSet<String> = ["sale".to_string()].into();
    router.reject_writes(Some("navigation aborted"));

    let err = sync
        .validate_facet(FilterKey::HighlightedLabel, &valid, RenderMode::Client)
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::Navigation { action: "replace", .. }));
    assert!(!sync.is_syncing());
    assert_eq!(sync.state().highlighted_label.as_deref(), Some("nonexistent"));
    assert_eq!(router.current_query(), q("tag=nonexistent&search=barn"));

    router.reject_writes(None);
    assert!(sync
        .validate_facet(FilterKey::HighlightedLabel, &valid, RenderMode::Client)
        .await
        .unwrap());
    assert_eq!(router.current_query(), q("search=barn"));
}

#[tokio::test(start_paused = true)]
async fn navigation_racing_a_failed_strip_is_applied() {
    let inner = MemoryRouter::from_search("?tag=nonexistent");
    inner.reject_writes(Some("navigation aborted"));
    let router = RacingRouter {
        inner: inner.clone(),
        racer: q("search=from-back-button"),
    };
    let mut sync = InventorySync::new(router, DEBOUNCE);
    sync.mount("?tag=nonexistent");
    let valid: BTreeSet<String> = ["sale".to_string()].into();

    let result = sync
        .validate_facet(FilterKey::HighlightedLabel, &valid, RenderMode::Client)
        .await;

    assert!(result.is_err());
    assert_eq!(sync.state().highlighted_label, None);
    assert_eq!(sync.state().search_query, "from-back-button");
}

#[tokio::test(start_paused = true)]
async fn invalid_facet_is_replaced_away_in_browser() {
    let events = EventBus::default();
    let mut rx = events.subscribe();
    let router = MemoryRouter::from_search("?tag=nonexistent&search=barn");
    let mut sync = mounted(&router, "?tag=nonexistent&search=barn").with_events(events);
    let valid: BTreeSet<String> = ["sale", "new-arrival"].map(String::from).into();

    let stripped = sync
        .validate_facet(FilterKey::HighlightedLabel, &valid, RenderMode::Client)
        .await
        .unwrap();

    assert!(stripped);
    assert_eq!(sync.state().highlighted_label, None);
    assert_eq!(sync.state().search_query, "barn");
    assert_eq!(router.calls(), vec![RouterCall::Replace(q("search=barn"))]);
    assert_eq!(
        rx.try_recv().unwrap(),
        CatalogEvent::FacetStripped {
            key: "tag".to_string(),
            value: "nonexistent".to_string(),
            mode: RenderMode::Client,
        }
    );
}

#[tokio::test(start_paused = true)]
async fn invalid_facet_redirects_on_server() {
    let router = MemoryRouter::from_search("?location=gone");
    let mut sync = InventorySync::new(router.clone(), DEBOUNCE);
    let valid: BTreeSet<String> = ["dothan".to_string()].into();

    let stripped = sync
        .validate_facet(FilterKey::LocationSlug, &valid, RenderMode::Server)
        .await
        .unwrap();

    assert!(stripped);
    assert_eq!(router.calls(), vec![RouterCall::Navigate(UrlQuery::new())]);
}

#[tokio::test(start_paused = true)]
async fn validation_skips_unloaded_data_valid_values_and_region() {
    let router = MemoryRouter::from_search("?tag=sale&region=gone");
    let mut sync = mounted(&router, "?tag=sale&region=gone");
    let tags: BTreeSet<String> = ["sale".to_string()].into();
    let regions: BTreeSet<String> = ["north".to_string()].into();

    let unloaded = sync
        .validate_facet(FilterKey::HighlightedLabel, &BTreeSet::new(), RenderMode::Client)
        .await
        .unwrap();
    let known = sync
        .validate_facet(FilterKey::HighlightedLabel, &tags, RenderMode::Client)
        .await
        .unwrap();
    let region = sync
        .validate_facet(FilterKey::RegionSlug, &regions, RenderMode::Client)
        .await
        .unwrap();

    assert!(!unloaded && !known && !region);
    assert!(router.calls().is_empty());
    assert_eq!(sync.state().region_slug.as_deref(), Some("gone"));
}
