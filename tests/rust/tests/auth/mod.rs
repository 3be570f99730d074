//! Bearer validation against a wiremock OAuth issuer.
//!
//! Covers issuer metadata discovery, JWKS caching and key rotation, and the
//! validation outcomes themselves.

mod validator;
