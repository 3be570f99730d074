//! Connection manager integration tests.
//!
//! These drive `ConnectionManager` against wiremock doubles of a Plex server
//! and of the plex.tv account API, covering handle caching, the retry loop,
//! and account discovery.

mod discovery;
mod freshness;
