//! `lotview gallery`: the ideas gallery tag filter.

use lotview_core::{AppConfig, GalleryEntry};
use lotview_filters::to_search;
use lotview_sync::{
    GalleryTagFilter, GalleryTagOption, MemoryRouter, RenderMode, RouterCall, UrlRouter,
};
use serde::Serialize;

use crate::{read_json, GalleryArgs};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GalleryReport {
    pub url: String,
    pub redirected: bool,
    pub active_tag: Option<String>,
    pub options: Vec<GalleryTagOption>,
    pub shown: Vec<String>,
    pub hidden_count: usize,
}

/// # Errors
///
/// Returns an error if the in-memory router rejects a write.
pub(crate) async fn gallery(
    config: &AppConfig,
    entries: Vec<GalleryEntry>,
    search: &str,
    tag: Option<&str>,
    mode: RenderMode,
) -> anyhow::Result<GalleryReport> {
    let router = MemoryRouter::from_search(search);
    let mut filter = GalleryTagFilter::new(router.clone(), config.gallery_query_key.clone());
    filter.set_entries(entries, mode).await?;
    if let Some(tag) = tag {
        filter.set_tag(tag).await?;
    }

    Ok(GalleryReport {
        url: to_search(&router.current_query()),
        redirected: router
            .calls()
            .iter()
            .any(|c| matches!(c, RouterCall::Navigate(_))),
        active_tag: filter.active_tag().map(str::to_string),
        options: filter.tag_options(),
        shown: filter
            .filtered_entries()
            .iter()
            .map(|e| e.title.clone())
            .collect(),
        hidden_count: filter.hidden_count(),
    })
}

pub(crate) async fn run_gallery(config: &AppConfig, args: GalleryArgs) -> anyhow::Result<()> {
    let entries: Vec<GalleryEntry> = read_json(&args.entries)?;
    let mode = if args.server {
        RenderMode::Server
    } else {
        RenderMode::Client
    };
    let report = gallery(config, entries, &args.search, args.tag.as_deref(), mode).await?;

    println!("url: {}", if report.url.is_empty() { "(none)" } else { &report.url });
    if report.redirected {
        println!("redirected: unknown tag removed");
    }
    for option in &report.options {
        let mark = if option.is_active { "x" } else { " " };
        println!("[{mark}] {} ({})", option.title, option.slug);
    }
    println!("{} shown, {} hidden", report.shown.len(), report.hidden_count);
    for title in &report.shown {
        println!("  {title}");
    }
    Ok(())
}
