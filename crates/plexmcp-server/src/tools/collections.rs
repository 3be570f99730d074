//! Collection operations.

use plexmcp_core::domain::error::PlexError;
use plexmcp_core::domain::summary::{summarize_all, summarize_collection};
use plexmcp_core::plex::types::type_number;
use plexmcp_core::plex::ConnectionManager;
use serde_json::{json, Value};

use super::params::{
    AddToCollectionParams, CollectionParams, CreateCollectionParams, EditCollectionParams,
    ListCollectionsParams, RemoveFromCollectionParams,
};
use super::{media_type_number, resolve, respond};

pub async fn list_collections(
    manager: &ConnectionManager,
    params: ListCollectionsParams,
) -> Result<Value, PlexError> {
    let server = manager.acquire().await?;
    let sections = match params.library.as_deref() {
        Some(reference) => vec![resolve::section(&server, reference).await?],
        None => server.sections().await?,
    };

    let mut pool = Vec::new();
    for section in &sections {
        let Some(key) = section.key.as_deref() else {
            continue;
        };
        pool.extend(server.collections(key).await?);
    }
    let (items, skipped) = respond::shape(&pool, summarize_collection);
    Ok(respond::listing(&items, &skipped))
}

pub async fn collection_items(
    manager: &ConnectionManager,
    params: CollectionParams,
) -> Result<Value, PlexError> {
    let server = manager.acquire().await?;
    let collection =
        resolve::collection(&server, &params.collection, params.library.as_deref()).await?;
    let key = collection
        .rating_key
        .as_deref()
        .ok_or_else(|| PlexError::Decode("collection has no rating key".into()))?;

    let container = server.collection_children(key).await?;
    let (items, skipped) = summarize_all(&container.items);
    let mut payload = respond::listing(&items, &skipped);
    payload["collection"] = json!(collection.title);
    Ok(payload)
}

pub async fn create_collection(
    manager: &ConnectionManager,
    params: CreateCollectionParams,
) -> Result<Value, PlexError> {
    if params.rating_keys.is_empty() {
        return Err(PlexError::Validation(
            "a collection needs at least one item".into(),
        ));
    }
    let server = manager.acquire().await?;
    let section = resolve::section(&server, &params.library).await?;
    let section_id: i64 = section
        .key
        .as_deref()
        .and_then(|k| k.parse().ok())
        .ok_or_else(|| PlexError::Decode("library section has no numeric key".into()))?;
    let kind = section.item_type.as_deref().unwrap_or("movie");
    let kind_number = type_number(kind).unwrap_or(1);

    let created = server
        .create_collection(section_id, &params.title, kind_number, &params.rating_keys)
        .await?;
    Ok(json!({
        "status": "ok",
        "collection": summarize_collection(&created)?,
    }))
}

pub async fn add_to_collection(
    manager: &ConnectionManager,
    params: AddToCollectionParams,
) -> Result<Value, PlexError> {
    if params.rating_keys.is_empty() {
        return Err(PlexError::Validation("no items given to add".into()));
    }
    let server = manager.acquire().await?;
    let collection =
        resolve::collection(&server, &params.collection, params.library.as_deref()).await?;
    let key = collection
        .rating_key
        .as_deref()
        .ok_or_else(|| PlexError::Decode("collection has no rating key".into()))?;

    server.add_to_collection(key, &params.rating_keys).await?;
    Ok(respond::acknowledged(format!(
        "added {} item(s) to '{}'",
        params.rating_keys.len(),
        collection.title.as_deref().unwrap_or(key)
    )))
}

pub async fn remove_from_collection(
    manager: &ConnectionManager,
    params: RemoveFromCollectionParams,
) -> Result<Value, PlexError> {
    let server = manager.acquire().await?;
    let collection =
        resolve::collection(&server, &params.collection, params.library.as_deref()).await?;
    let key = collection
        .rating_key
        .as_deref()
        .ok_or_else(|| PlexError::Decode("collection has no rating key".into()))?;

    server.remove_from_collection(key, &params.rating_key).await?;
    Ok(respond::acknowledged(format!(
        "removed item {} from '{}'",
        params.rating_key,
        collection.title.as_deref().unwrap_or(key)
    )))
}

pub async fn delete_collection(
    manager: &ConnectionManager,
    params: CollectionParams,
) -> Result<Value, PlexError> {
    let server = manager.acquire().await?;
    let collection =
        resolve::collection(&server, &params.collection, params.library.as_deref()).await?;
    let key = collection
        .rating_key
        .as_deref()
        .ok_or_else(|| PlexError::Decode("collection has no rating key".into()))?;

    server.delete_collection(key).await?;
    Ok(respond::acknowledged(format!(
        "collection '{}' deleted",
        collection.title.as_deref().unwrap_or(key)
    )))
}

pub async fn edit_collection(
    manager: &ConnectionManager,
    params: EditCollectionParams,
) -> Result<Value, PlexError> {
    let server = manager.acquire().await?;
    let collection =
        resolve::collection(&server, &params.collection, params.library.as_deref()).await?;
    let key = collection
        .rating_key
        .as_deref()
        .ok_or_else(|| PlexError::Decode("collection has no rating key".into()))?;
    let section_id = collection.library_section_id.ok_or_else(|| {
        PlexError::Decode("collection carries no library section id; cannot edit".into())
    })?;

    let mut fields: Vec<(String, String)> = Vec::new();
    let mut edited: Vec<&str> = Vec::new();
    if let Some(title) = &params.title {
        fields.push(("title.value".into(), title.clone()));
        fields.push(("title.locked".into(), "1".into()));
        edited.push("title");
    }
    if let Some(sort_title) = &params.sort_title {
        fields.push(("titleSort.value".into(), sort_title.clone()));
        fields.push(("titleSort.locked".into(), "1".into()));
        edited.push("sort_title");
    }
    if let Some(summary) = &params.summary {
        fields.push(("summary.value".into(), summary.clone()));
        fields.push(("summary.locked".into(), "1".into()));
        edited.push("summary");
    }
    if fields.is_empty() {
        return Err(PlexError::Validation(
            "nothing to edit: provide at least one field".into(),
        ));
    }

    server
        .edit_fields(section_id, media_type_number("collection")?, key, &fields)
        .await?;
    Ok(json!({
        "status": "ok",
        "collection": collection.title,
        "edited": edited,
    }))
}
