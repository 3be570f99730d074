//! HTTP transport tests against the real router on an ephemeral port.
//!
//! `build_router` gives back the same router `HttpServer` serves, so these
//! exercise the health endpoint, the Streamable HTTP transport, the bearer
//! guard, and the RFC 9728 metadata documents end to end.

mod guarded;
mod surface;
