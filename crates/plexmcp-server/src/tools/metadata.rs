//! Metadata editing operations.

use plexmcp_core::domain::error::PlexError;
use plexmcp_core::plex::types::Metadata;
use plexmcp_core::plex::ConnectionManager;
use serde_json::{json, Value};

use super::params::{EditMetadataParams, RateMediaParams, RatingKeyParams};
use super::{media_type_number, resolve, respond};

pub async fn edit_metadata(
    manager: &ConnectionManager,
    params: EditMetadataParams,
) -> Result<Value, PlexError> {
    let server = manager.acquire().await?;
    let item = resolve::item_by_key(&server, &params.rating_key).await?;

    let section_id = item.library_section_id.ok_or_else(|| {
        PlexError::Decode("item carries no library section id; cannot edit".into())
    })?;
    let kind = item
        .item_type
        .as_deref()
        .ok_or_else(|| PlexError::Decode("item carries no type; cannot edit".into()))?;
    let type_number = media_type_number(kind)?;

    let fields = edit_fields(&item, &params)?;
    let edited: Vec<&str> = edited_field_names(&params);

    server
        .edit_fields(section_id, type_number, &params.rating_key, &fields)
        .await?;
    Ok(json!({
        "status": "ok",
        "title": item.title,
        "edited": edited,
    }))
}

/// Build the section-edit parameter list. Edited scalar fields are locked so
/// the next agent refresh keeps them. Genre additions must resend the full
/// tag list; removals use the `-` suffixed parameter.
fn edit_fields(
    item: &Metadata,
    params: &EditMetadataParams,
) -> Result<Vec<(String, String)>, PlexError> {
    let mut fields: Vec<(String, String)> = Vec::new();
    let lock = |fields: &mut Vec<(String, String)>, name: &str, value: String| {
        fields.push((format!("{name}.value"), value));
        fields.push((format!("{name}.locked"), "1".to_string()));
    };

    if let Some(title) = &params.title {
        lock(&mut fields, "title", title.clone());
    }
    if let Some(sort_title) = &params.sort_title {
        lock(&mut fields, "titleSort", sort_title.clone());
    }
    if let Some(summary) = &params.summary {
        lock(&mut fields, "summary", summary.clone());
    }
    if let Some(year) = params.year {
        lock(&mut fields, "year", year.to_string());
    }
    if let Some(content_rating) = &params.content_rating {
        lock(&mut fields, "contentRating", content_rating.clone());
    }

    let removals: Vec<String> = params
        .remove_genres
        .clone()
        .unwrap_or_default()
        .into_iter()
        .filter(|g| !g.trim().is_empty())
        .collect();
    let additions: Vec<String> = params
        .add_genres
        .clone()
        .unwrap_or_default()
        .into_iter()
        .filter(|g| !g.trim().is_empty())
        .collect();

    if !additions.is_empty() {
        let mut desired: Vec<String> = item
            .genres
            .iter()
            .filter_map(|g| g.tag.clone())
            .filter(|g| !removals.iter().any(|r| r.eq_ignore_ascii_case(g)))
            .collect();
        for addition in additions {
            if !desired.iter().any(|g| g.eq_ignore_ascii_case(&addition)) {
                desired.push(addition);
            }
        }
        for (index, genre) in desired.iter().enumerate() {
            fields.push((format!("genre[{index}].tag.tag"), genre.clone()));
        }
        fields.push(("genre.locked".to_string(), "1".to_string()));
    }
    if !removals.is_empty() {
        fields.push(("genre[].tag.tag-".to_string(), removals.join(",")));
        if params.add_genres.is_none() {
            fields.push(("genre.locked".to_string(), "1".to_string()));
        }
    }

    if fields.is_empty() {
        return Err(PlexError::Validation(
            "nothing to edit: provide at least one field".into(),
        ));
    }
    Ok(fields)
}

fn edited_field_names(params: &EditMetadataParams) -> Vec<&'static str> {
    let mut edited = Vec::new();
    if params.title.is_some() {
        edited.push("title");
    }
    if params.sort_title.is_some() {
        edited.push("sort_title");
    }
    if params.summary.is_some() {
        edited.push("summary");
    }
    if params.year.is_some() {
        edited.push("year");
    }
    if params.content_rating.is_some() {
        edited.push("content_rating");
    }
    if params.add_genres.as_ref().is_some_and(|g| !g.is_empty()) {
        edited.push("genres_added");
    }
    if params.remove_genres.as_ref().is_some_and(|g| !g.is_empty()) {
        edited.push("genres_removed");
    }
    edited
}

pub async fn rate_media(
    manager: &ConnectionManager,
    params: RateMediaParams,
) -> Result<Value, PlexError> {
    if !(0.0..=10.0).contains(&params.rating) {
        return Err(PlexError::Validation(format!(
            "rating must be between 0.0 and 10.0, got {}",
            params.rating
        )));
    }
    let server = manager.acquire().await?;
    let item = resolve::item_by_key(&server, &params.rating_key).await?;
    server.rate(&params.rating_key, params.rating).await?;
    Ok(json!({
        "status": "ok",
        "title": item.title,
        "rating": params.rating,
    }))
}

pub async fn mark_watched(
    manager: &ConnectionManager,
    params: RatingKeyParams,
) -> Result<Value, PlexError> {
    let server = manager.acquire().await?;
    let item = resolve::item_by_key(&server, &params.rating_key).await?;
    server.scrobble(&params.rating_key).await?;
    Ok(respond::acknowledged(format!(
        "'{}' marked watched",
        item.title.as_deref().unwrap_or(&params.rating_key)
    )))
}

pub async fn mark_unwatched(
    manager: &ConnectionManager,
    params: RatingKeyParams,
) -> Result<Value, PlexError> {
    let server = manager.acquire().await?;
    let item = resolve::item_by_key(&server, &params.rating_key).await?;
    server.unscrobble(&params.rating_key).await?;
    Ok(respond::acknowledged(format!(
        "'{}' marked unwatched",
        item.title.as_deref().unwrap_or(&params.rating_key)
    )))
}

pub async fn refresh_metadata(
    manager: &ConnectionManager,
    params: RatingKeyParams,
) -> Result<Value, PlexError> {
    let server = manager.acquire().await?;
    let item = resolve::item_by_key(&server, &params.rating_key).await?;
    server.refresh_metadata(&params.rating_key).await?;
    Ok(respond::acknowledged(format!(
        "metadata refresh queued for '{}'",
        item.title.as_deref().unwrap_or(&params.rating_key)
    )))
}
