//! Shared test utilities and fixtures for PlexMCP integration tests.

pub mod harness;
pub mod mocks;

pub use harness::{args, call_tool, initialize_request, payload_of, serve_router};

use std::time::Duration;

use plexmcp_core::domain::config::{
    AccountCredentials, DirectCredentials, HttpSettings, OAuthSettings,
};
use plexmcp_core::{ConnectionManager, ConnectionSettings, Settings, TransportKind};
use url::Url;

/// Token the direct-connection fixtures present to the mock server.
pub const PLEX_TOKEN: &str = "test-token";

/// Settings pointing straight at one server.
pub fn direct_settings(base_url: &str) -> ConnectionSettings {
    ConnectionSettings {
        direct: Some(DirectCredentials {
            base_url: base_url.to_string(),
            token: PLEX_TOKEN.to_string(),
        }),
        account: None,
    }
}

/// Settings that force plex.tv account discovery.
pub fn account_settings(server_name: Option<&str>) -> ConnectionSettings {
    ConnectionSettings {
        direct: None,
        account: Some(AccountCredentials {
            username: "kara@example.com".to_string(),
            password: "hunter2".to_string(),
            server_name: server_name.map(str::to_string),
        }),
    }
}

/// A manager talking directly to `base_url` with the default policy.
pub fn manager_for(base_url: &str) -> ConnectionManager {
    ConnectionManager::new(direct_settings(base_url))
}

/// HTTP transport settings with OAuth left off.
pub fn http_settings(connection: ConnectionSettings) -> Settings {
    Settings {
        transport: TransportKind::Http,
        http: HttpSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
            enable_cors: false,
        },
        connection,
        oauth: None,
        log_dir: None,
    }
}

/// OAuth settings trusting `issuer` and protecting `public_url`.
pub fn oauth_settings(issuer: &str, public_url: &str) -> OAuthSettings {
    OAuthSettings {
        issuer: Url::parse(issuer).expect("issuer fixture should be a valid URL"),
        public_url: Url::parse(public_url).expect("public URL fixture should be a valid URL"),
        jwks_ttl: Duration::from_secs(3600),
    }
}
