//! Library browsing operations.

use plexmcp_core::domain::error::PlexError;
use plexmcp_core::domain::summary::{
    summarize_all, summarize_history_entry, summarize_item, summarize_library,
};
use plexmcp_core::plex::types::MediaContainer;
use plexmcp_core::plex::ConnectionManager;
use serde_json::{json, Value};

use super::params::{
    clamp_limit, BrowseLibraryParams, LibraryStatsParams, RatingKeyParams, RecentlyAddedParams,
    ScanLibraryParams, SearchMediaParams, WatchHistoryParams,
};
use super::{media_type_number, resolve, respond};

pub async fn list_libraries(manager: &ConnectionManager) -> Result<Value, PlexError> {
    let server = manager.acquire().await?;
    let sections = server.sections().await?;
    let (items, skipped) = respond::shape(&sections, summarize_library);
    Ok(respond::listing(&items, &skipped))
}

pub async fn library_stats(
    manager: &ConnectionManager,
    params: LibraryStatsParams,
) -> Result<Value, PlexError> {
    let server = manager.acquire().await?;
    let sections = match params.library.as_deref() {
        Some(reference) => vec![resolve::section(&server, reference).await?],
        None => server.sections().await?,
    };

    let mut rows = Vec::new();
    for section in &sections {
        let Some(key) = section.key.as_deref() else {
            continue;
        };
        let kind = section.item_type.as_deref().unwrap_or("unknown");
        // size-zero page returns only the total count
        let count_query = [
            ("X-Plex-Container-Start".to_string(), "0".to_string()),
            ("X-Plex-Container-Size".to_string(), "0".to_string()),
        ];

        let mut row = json!({
            "library": section.title,
            "kind": kind,
        });
        if kind == "show" {
            // show and episode totals are independent reads
            let mut episode_query = count_query.to_vec();
            episode_query.push(("type".to_string(), "4".to_string()));
            let (shows, episodes) = tokio::join!(
                server.section_items(key, &count_query),
                server.section_items(key, &episode_query)
            );
            row["items"] = json!(total_of(&shows?));
            row["episodes"] = json!(total_of(&episodes?));
        } else {
            let container = server.section_items(key, &count_query).await?;
            row["items"] = json!(total_of(&container));
        }
        rows.push(row);
    }

    Ok(json!({ "count": rows.len(), "libraries": rows }))
}

pub async fn browse_library(
    manager: &ConnectionManager,
    params: BrowseLibraryParams,
) -> Result<Value, PlexError> {
    let server = manager.acquire().await?;
    let section = resolve::section(&server, &params.library).await?;
    let key = section
        .key
        .as_deref()
        .ok_or_else(|| PlexError::Decode("library section has no key".into()))?;

    let limit = clamp_limit(params.limit, 20, 100);
    let offset = params.offset.unwrap_or(0);
    let mut query = vec![
        ("X-Plex-Container-Start".to_string(), offset.to_string()),
        ("X-Plex-Container-Size".to_string(), limit.to_string()),
    ];
    if let Some(media_type) = params.media_type.as_deref() {
        query.push(("type".to_string(), media_type_number(media_type)?.to_string()));
    }
    if let Some(sort) = sort_param(params.sort.as_deref())? {
        query.push(("sort".to_string(), sort.to_string()));
    }

    let container = server.section_items(key, &query).await?;
    let total = container
        .total_size
        .or(container.size)
        .unwrap_or(container.items.len() as i64);
    let (items, skipped) = summarize_all(&container.items);

    let mut payload = respond::listing(&items, &skipped);
    payload["library"] = json!(section.title);
    payload["total"] = json!(total);
    payload["offset"] = json!(offset);
    payload["limit"] = json!(limit);
    Ok(payload)
}

pub async fn recently_added(
    manager: &ConnectionManager,
    params: RecentlyAddedParams,
) -> Result<Value, PlexError> {
    let server = manager.acquire().await?;
    let limit = clamp_limit(params.limit, 20, 100);
    let section_key = match params.library.as_deref() {
        Some(reference) => {
            let section = resolve::section(&server, reference).await?;
            section.key
        }
        None => None,
    };
    let container = server.recently_added(section_key.as_deref(), limit).await?;
    let (items, skipped) = summarize_all(&container.items);
    Ok(respond::listing(&items, &skipped))
}

pub async fn on_deck(manager: &ConnectionManager) -> Result<Value, PlexError> {
    let server = manager.acquire().await?;
    let container = server.on_deck().await?;
    let (items, skipped) = summarize_all(&container.items);
    Ok(respond::listing(&items, &skipped))
}

pub async fn search_media(
    manager: &ConnectionManager,
    params: SearchMediaParams,
) -> Result<Value, PlexError> {
    if params.query.trim().is_empty() {
        return Err(PlexError::Validation("search query must not be empty".into()));
    }
    if let Some(media_type) = params.media_type.as_deref() {
        media_type_number(media_type)?;
    }
    let server = manager.acquire().await?;
    let limit = clamp_limit(params.limit, 20, 100);

    let hubs = server.search_hubs(params.query.trim(), limit).await?;
    let matches: Vec<_> = hubs
        .into_iter()
        .flat_map(|hub| hub.items)
        .filter(|item| match params.media_type.as_deref() {
            Some(kind) => item.item_type.as_deref() == Some(kind),
            None => true,
        })
        .take(limit as usize)
        .collect();

    let (items, skipped) = summarize_all(&matches);
    let mut payload = respond::listing(&items, &skipped);
    payload["query"] = json!(params.query.trim());
    Ok(payload)
}

pub async fn media_details(
    manager: &ConnectionManager,
    params: RatingKeyParams,
) -> Result<Value, PlexError> {
    let server = manager.acquire().await?;
    let item = resolve::item_by_key(&server, &params.rating_key).await?;
    let summary = summarize_item(&item)?;

    let genres: Vec<&str> = item.genres.iter().filter_map(|g| g.tag.as_deref()).collect();
    let directors: Vec<&str> = item.directors.iter().filter_map(|d| d.tag.as_deref()).collect();
    Ok(json!({
        "item": summary,
        "summary": item.summary,
        "genres": genres,
        "directors": directors,
        "library": item.library_section_title,
        "view_count": item.view_count,
        "user_rating": item.user_rating,
    }))
}

pub async fn media_children(
    manager: &ConnectionManager,
    params: RatingKeyParams,
) -> Result<Value, PlexError> {
    let server = manager.acquire().await?;
    let parent = resolve::item_by_key(&server, &params.rating_key).await?;
    let container = server.children(&params.rating_key).await?;
    let (items, skipped) = summarize_all(&container.items);

    let mut payload = respond::listing(&items, &skipped);
    payload["parent"] = json!({
        "rating_key": parent.rating_key,
        "title": parent.title,
        "kind": parent.item_type,
    });
    Ok(payload)
}

pub async fn watch_history(
    manager: &ConnectionManager,
    params: WatchHistoryParams,
) -> Result<Value, PlexError> {
    let server = manager.acquire().await?;
    let limit = clamp_limit(params.limit, 20, 100);

    let mut query = vec![
        ("sort".to_string(), "viewedAt:desc".to_string()),
        ("X-Plex-Container-Start".to_string(), "0".to_string()),
        ("X-Plex-Container-Size".to_string(), limit.to_string()),
    ];
    if let Some(rating_key) = params.rating_key.as_deref() {
        if !resolve::is_key(rating_key) {
            return Err(PlexError::Validation(format!(
                "rating_key must be numeric, got '{rating_key}'"
            )));
        }
        query.push(("metadataItemID".to_string(), rating_key.to_string()));
    }
    if let Some(account_id) = params.account_id {
        query.push(("accountID".to_string(), account_id.to_string()));
    }

    let container = server.history(&query).await?;
    let (items, skipped) = respond::shape(&container.items, summarize_history_entry);
    Ok(respond::listing(&items, &skipped))
}

pub async fn scan_library(
    manager: &ConnectionManager,
    params: ScanLibraryParams,
) -> Result<Value, PlexError> {
    let server = manager.acquire().await?;
    let section = resolve::section(&server, &params.library).await?;
    let key = section
        .key
        .as_deref()
        .ok_or_else(|| PlexError::Decode("library section has no key".into()))?;
    server.scan_section(key).await?;
    Ok(respond::acknowledged(format!(
        "scan started for library '{}'",
        section.title.as_deref().unwrap_or(key)
    )))
}

fn total_of(container: &MediaContainer) -> i64 {
    container.total_size.or(container.size).unwrap_or(0)
}

fn sort_param(sort: Option<&str>) -> Result<Option<&'static str>, PlexError> {
    match sort {
        None => Ok(None),
        Some("title") => Ok(Some("titleSort")),
        Some("added") => Ok(Some("addedAt:desc")),
        Some("year") => Ok(Some("year:desc")),
        Some("rating") => Ok(Some("rating:desc")),
        Some("viewed") => Ok(Some("lastViewedAt:desc")),
        Some(other) => Err(PlexError::Validation(format!(
            "unknown sort '{other}'; use title, added, year, rating, or viewed"
        ))),
    }
}
