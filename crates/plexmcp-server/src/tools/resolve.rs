//! Name-to-entity resolution.
//!
//! Tools accept human references (titles, client names) as well as keys.
//! Lookups resolve case-insensitively; zero matches yield `NotFound` and
//! several matches yield `Ambiguous` with retryable candidates. The matching
//! itself is pure so it can be tested without a server.

use plexmcp_core::domain::error::{Candidate, PlexError};
use plexmcp_core::plex::types::{Directory, Metadata, PlayerClient};
use plexmcp_core::plex::PlexServer;

/// Keys are numeric; anything else is treated as a title.
pub fn is_key(reference: &str) -> bool {
    !reference.is_empty() && reference.bytes().all(|b| b.is_ascii_digit())
}

/// Static label for a media type filter, for error messages.
pub fn kind_label(media_type: Option<&str>) -> &'static str {
    match media_type {
        Some("movie") => "movie",
        Some("show") => "show",
        Some("season") => "season",
        Some("episode") => "episode",
        Some("artist") => "artist",
        Some("album") => "album",
        Some("track") => "track",
        _ => "item",
    }
}

pub async fn section(server: &PlexServer, reference: &str) -> Result<Directory, PlexError> {
    let sections = server.sections().await?;
    match_section(&sections, reference)
}

pub fn match_section(sections: &[Directory], reference: &str) -> Result<Directory, PlexError> {
    if is_key(reference) {
        if let Some(hit) = sections.iter().find(|s| s.key.as_deref() == Some(reference)) {
            return Ok(hit.clone());
        }
    }
    let matches: Vec<&Directory> = sections
        .iter()
        .filter(|s| {
            s.title
                .as_deref()
                .is_some_and(|t| t.eq_ignore_ascii_case(reference))
        })
        .collect();
    match matches.len() {
        1 => Ok(matches[0].clone()),
        0 => Err(PlexError::not_found("library", reference)),
        _ => Err(PlexError::Ambiguous {
            kind: "library",
            name: reference.to_string(),
            candidates: matches
                .iter()
                .map(|s| {
                    let candidate = Candidate::new(
                        s.key.clone().unwrap_or_default(),
                        s.title.clone().unwrap_or_default(),
                    );
                    match s.item_type.as_deref() {
                        Some(kind) => candidate.with_detail(kind),
                        None => candidate,
                    }
                })
                .collect(),
        }),
    }
}

pub async fn client(server: &PlexServer, reference: &str) -> Result<PlayerClient, PlexError> {
    let clients = server.clients().await?;
    match_client(&clients, reference)
}

pub fn match_client(clients: &[PlayerClient], reference: &str) -> Result<PlayerClient, PlexError> {
    if let Some(hit) = clients
        .iter()
        .find(|c| c.machine_identifier.as_deref() == Some(reference))
    {
        return Ok(hit.clone());
    }
    let exact: Vec<&PlayerClient> = clients
        .iter()
        .filter(|c| {
            c.name
                .as_deref()
                .is_some_and(|n| n.eq_ignore_ascii_case(reference))
        })
        .collect();
    let matches = if exact.is_empty() {
        let needle = reference.to_ascii_lowercase();
        clients
            .iter()
            .filter(|c| {
                c.name
                    .as_deref()
                    .is_some_and(|n| n.to_ascii_lowercase().contains(&needle))
            })
            .collect()
    } else {
        exact
    };
    match matches.len() {
        1 => Ok(matches[0].clone()),
        0 => Err(PlexError::not_found("client", reference)),
        _ => Err(PlexError::Ambiguous {
            kind: "client",
            name: reference.to_string(),
            candidates: matches
                .iter()
                .map(|c| {
                    let candidate = Candidate::new(
                        c.machine_identifier.clone().unwrap_or_default(),
                        c.name.clone().unwrap_or_default(),
                    );
                    match c.product.as_deref() {
                        Some(product) => candidate.with_detail(product),
                        None => candidate,
                    }
                })
                .collect(),
        }),
    }
}

pub async fn playlist(server: &PlexServer, reference: &str) -> Result<Metadata, PlexError> {
    let playlists = server.playlists().await?;
    match_playlist(&playlists, reference)
}

pub fn match_playlist(playlists: &[Metadata], reference: &str) -> Result<Metadata, PlexError> {
    if is_key(reference) {
        if let Some(hit) = playlists
            .iter()
            .find(|p| p.rating_key.as_deref() == Some(reference))
        {
            return Ok(hit.clone());
        }
    }
    let matches: Vec<&Metadata> = playlists
        .iter()
        .filter(|p| {
            p.title
                .as_deref()
                .is_some_and(|t| t.eq_ignore_ascii_case(reference))
        })
        .collect();
    match matches.len() {
        1 => Ok(matches[0].clone()),
        0 => Err(PlexError::not_found("playlist", reference)),
        _ => Err(PlexError::Ambiguous {
            kind: "playlist",
            name: reference.to_string(),
            candidates: matches.iter().map(|p| playlist_candidate(p)).collect(),
        }),
    }
}

fn playlist_candidate(playlist: &Metadata) -> Candidate {
    let candidate = Candidate::new(
        playlist.rating_key.clone().unwrap_or_default(),
        playlist.title.clone().unwrap_or_default(),
    );
    match playlist.playlist_type.as_deref() {
        Some(kind) => candidate.with_detail(kind),
        None => candidate,
    }
}

/// Resolve a collection by title or rating key, optionally scoped to one
/// library. Title lookups scan the collection listings of the candidate
/// sections.
pub async fn collection(
    server: &PlexServer,
    reference: &str,
    library: Option<&str>,
) -> Result<Metadata, PlexError> {
    if is_key(reference) {
        let item = item_by_key(server, reference).await?;
        if item.item_type.as_deref() != Some("collection") {
            return Err(PlexError::Validation(format!(
                "rating key {reference} is not a collection"
            )));
        }
        return Ok(item);
    }

    let sections = match library {
        Some(name) => vec![section(server, name).await?],
        None => server.sections().await?,
    };

    let mut pool = Vec::new();
    for sec in &sections {
        let Some(key) = sec.key.as_deref() else {
            continue;
        };
        let mut found = server.collections(key).await?;
        for item in &mut found {
            // collection listings omit the section title
            if item.library_section_title.is_none() {
                item.library_section_title = sec.title.clone();
            }
        }
        pool.extend(found);
    }
    match_collection(&pool, reference)
}

pub fn match_collection(pool: &[Metadata], reference: &str) -> Result<Metadata, PlexError> {
    let matches: Vec<&Metadata> = pool
        .iter()
        .filter(|c| {
            c.title
                .as_deref()
                .is_some_and(|t| t.eq_ignore_ascii_case(reference))
        })
        .collect();
    match matches.len() {
        1 => Ok(matches[0].clone()),
        0 => Err(PlexError::not_found("collection", reference)),
        _ => Err(PlexError::Ambiguous {
            kind: "collection",
            name: reference.to_string(),
            candidates: matches
                .iter()
                .map(|c| {
                    let candidate = Candidate::new(
                        c.rating_key.clone().unwrap_or_default(),
                        c.title.clone().unwrap_or_default(),
                    );
                    match c.library_section_title.as_deref() {
                        Some(library) => candidate.with_detail(library),
                        None => candidate,
                    }
                })
                .collect(),
        }),
    }
}

/// Resolve a media item by title via hub search. Exact title matches win;
/// otherwise the whole result pool is considered.
pub async fn media_item(
    server: &PlexServer,
    title: &str,
    media_type: Option<&str>,
) -> Result<Metadata, PlexError> {
    let hubs = server.search_hubs(title, 50).await?;
    let pool: Vec<Metadata> = hubs
        .into_iter()
        .flat_map(|hub| hub.items)
        .filter(|item| match media_type {
            Some(kind) => item.item_type.as_deref() == Some(kind),
            None => true,
        })
        .collect();
    pick_media(pool, title, kind_label(media_type))
}

pub fn pick_media(
    pool: Vec<Metadata>,
    title: &str,
    kind: &'static str,
) -> Result<Metadata, PlexError> {
    let exact: Vec<&Metadata> = pool
        .iter()
        .filter(|m| {
            m.title
                .as_deref()
                .is_some_and(|t| t.eq_ignore_ascii_case(title))
        })
        .collect();
    let picks: Vec<&Metadata> = if exact.is_empty() {
        pool.iter().collect()
    } else {
        exact
    };
    match picks.len() {
        1 => Ok(picks[0].clone()),
        0 => Err(PlexError::not_found(kind, title)),
        _ => Err(PlexError::Ambiguous {
            kind,
            name: title.to_string(),
            candidates: picks.iter().take(10).map(|m| media_candidate(m)).collect(),
        }),
    }
}

fn media_candidate(item: &Metadata) -> Candidate {
    let candidate = Candidate::new(
        item.rating_key.clone().unwrap_or_default(),
        item.title.clone().unwrap_or_default(),
    );
    let mut details = Vec::new();
    if let Some(kind) = item.item_type.as_deref() {
        details.push(kind.to_string());
    }
    if let Some(year) = item.year {
        details.push(year.to_string());
    }
    if let Some(library) = item.library_section_title.as_deref() {
        details.push(library.to_string());
    }
    if details.is_empty() {
        candidate
    } else {
        candidate.with_detail(details.join(", "))
    }
}

/// Direct rating-key fetch, mapping the server's 404 to `NotFound`.
pub async fn item_by_key(server: &PlexServer, rating_key: &str) -> Result<Metadata, PlexError> {
    match server.metadata(rating_key).await {
        Err(PlexError::RemoteApi { status: 404, .. }) => {
            Err(PlexError::not_found("item", rating_key))
        }
        other => other,
    }
}
