//! `lotview inspect`: one page load of the inventory catalog.

use lotview_core::{AppConfig, CatalogItem, DistanceTable};
use lotview_filters::{to_search, FilterKey};
use lotview_sync::{
    CatalogSnapshot, CatalogView, EventBus, GateDecision, InventorySync, MemoryRouter,
    MemorySessionStore, RegionGate, RegionGateConfig, RegionGateState, RenderMode, UrlRouter,
};
use serde::Serialize;

use crate::{read_json, InspectArgs};

/// Facets whose URL values are checked against the loaded data. The region
/// is exempt.
const VALIDATED_KEYS: [FilterKey; 6] = [
    FilterKey::ProductCategorySlug,
    FilterKey::ProductLineSlug,
    FilterKey::ProductSlug,
    FilterKey::Size,
    FilterKey::LocationSlug,
    FilterKey::HighlightedLabel,
];

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InspectReport {
    pub url: String,
    pub region_gate: RegionGateState,
    pub gate_decision: String,
    pub stripped: Vec<FilterKey>,
    pub snapshot: CatalogSnapshot,
}

/// Mounts the filters on `search`, validates the URL against the items, runs
/// the region gate and settles the URL.
///
/// # Errors
///
/// Returns an error if the in-memory router rejects a write.
pub(crate) async fn inspect(
    config: &AppConfig,
    items: Vec<CatalogItem>,
    distances: DistanceTable,
    search: &str,
    region: Option<&str>,
) -> anyhow::Result<InspectReport> {
    let router = MemoryRouter::from_search(search);
    let events = EventBus::default();
    let mut rx = events.subscribe();
    let mut sync = InventorySync::from_config(router.clone(), config).with_events(events.clone());
    let mut gate = RegionGate::new(RegionGateConfig::from(config), MemorySessionStore::new())
        .with_events(events);
    let mut view = CatalogView::new(items);
    view.set_distances(distances);

    sync.mount(search);

    let mut stripped = Vec::new();
    for key in VALIDATED_KEYS {
        let valid = view.known_values(key);
        if sync.validate_facet(key, &valid, RenderMode::Client).await? {
            stripped.push(key);
        }
    }

    let items = view.items().to_vec();
    let decision = sync.update(|state| gate.decide(&items, state));
    if let Some(region) = region.filter(|_| gate.is_open()) {
        let offered = matches!(
            &decision,
            GateDecision::Prompt(regions) if regions.iter().any(|r| r == region)
        );
        if offered {
            sync.update(|state| gate.apply_selection(region, state));
        } else {
            tracing::warn!(region, "requested region is not in the catalog");
        }
    }

    sync.flush().await?;

    while let Ok(event) = rx.try_recv() {
        tracing::debug!(?event, "catalog event");
    }

    Ok(InspectReport {
        url: to_search(&router.current_query()),
        region_gate: gate.state().clone(),
        gate_decision: format!("{decision:?}"),
        stripped,
        snapshot: view.snapshot(sync.state(), sync.sort_mode()).clone(),
    })
}

pub(crate) async fn run_inspect(config: &AppConfig, args: InspectArgs) -> anyhow::Result<()> {
    let items: Vec<CatalogItem> = read_json(&args.items)?;
    let distances = match &args.distances {
        Some(path) => read_json(path)?,
        None => DistanceTable::new(),
    };
    let report = inspect(
        config,
        items,
        distances,
        &args.search,
        args.region.as_deref(),
    )
    .await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("url: {}", if report.url.is_empty() { "(none)" } else { &report.url });
    println!(
        "region gate: {} ({})",
        if report.region_gate.open { "open" } else { "closed" },
        report.gate_decision
    );
    for key in &report.stripped {
        println!("stripped: {key:?}");
    }
    for chip in &report.snapshot.chips {
        println!("chip: {}", chip.label);
    }
    println!(
        "{} shown, {} hidden",
        report.snapshot.results.len(),
        report.snapshot.hidden_count
    );
    for item in &report.snapshot.results {
        println!(
            "  {:<12} {:<28} {:>10.2} {:<8} {}",
            item.serial_number(),
            item.product().map_or("-", |p| p.title.as_str()),
            item.price(),
            item.size().unwrap_or("-"),
            item.location().map_or("-", |l| l.title.as_str()),
        );
    }
    Ok(())
}
