//! plex.tv discovery: strategy precedence, sign-in, and server selection.

use std::time::{Duration, Instant};

use plexmcp_core::{ConnectionManager, ConnectionSettings, PlexError};
use serde_json::json;
use tests::{account_settings, direct_settings, mocks};
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn plex_tv_url(mock: &MockServer) -> Url {
    Url::parse(&mock.uri()).expect("mock URI should parse")
}

#[tokio::test]
async fn direct_credentials_win_over_account_discovery() {
    let plex = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mocks::root_body("Den")))
        .expect(1)
        .mount(&plex)
        .await;

    let plex_tv = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users/signin"))
        .respond_with(ResponseTemplate::new(201).set_body_json(mocks::signin_body("unused")))
        .expect(0)
        .mount(&plex_tv)
        .await;
    Mock::given(method("GET"))
        .and(path("/resources"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&plex_tv)
        .await;

    let settings = ConnectionSettings {
        direct: direct_settings(&plex.uri()).direct,
        account: account_settings(Some("Den")).account,
    };
    let manager = ConnectionManager::new(settings).with_plex_tv_base(plex_tv_url(&plex_tv));

    let server = manager
        .acquire()
        .await
        .expect("direct connect should succeed without discovery");
    assert_eq!(server.friendly_name(), "Den");
}

#[tokio::test]
async fn account_discovery_signs_in_and_picks_the_named_server() {
    let plex = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("X-Plex-Token", "den-access-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mocks::root_body("Den")))
        .expect(1)
        .mount(&plex)
        .await;

    let plex_tv = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users/signin"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(mocks::signin_body("account-token")),
        )
        .expect(1)
        .mount(&plex_tv)
        .await;
    Mock::given(method("GET"))
        .and(path("/resources"))
        .and(header("X-Plex-Token", "account-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            mocks::player_resource("Shield"),
            mocks::server_resource("Attic", "attic-access-token", "http://127.0.0.1:1"),
            mocks::server_resource("Den", "den-access-token", &plex.uri()),
        ])))
        .expect(1)
        .mount(&plex_tv)
        .await;

    // Matching is case-insensitive.
    let manager = ConnectionManager::new(account_settings(Some("den")))
        .with_plex_tv_base(plex_tv_url(&plex_tv));

    let server = manager
        .acquire()
        .await
        .expect("discovery should land on the named server");
    assert_eq!(server.machine_identifier(), "plex-test-01");
}

#[tokio::test]
async fn several_servers_without_a_name_are_ambiguous() {
    let plex_tv = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users/signin"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(mocks::signin_body("account-token")),
        )
        .expect(1)
        .mount(&plex_tv)
        .await;
    Mock::given(method("GET"))
        .and(path("/resources"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            mocks::server_resource("Den", "den-access-token", "http://127.0.0.1:1"),
            mocks::server_resource("Attic", "attic-access-token", "http://127.0.0.1:1"),
        ])))
        .expect(1)
        .mount(&plex_tv)
        .await;

    let manager = ConnectionManager::new(account_settings(None))
        .with_plex_tv_base(plex_tv_url(&plex_tv))
        .with_retry_policy(3, Duration::from_secs(60));

    let started = Instant::now();
    let err = manager
        .acquire()
        .await
        .expect_err("two servers without a name cannot be resolved");

    match err {
        PlexError::Ambiguous { candidates, .. } => {
            assert_eq!(candidates.len(), 2);
            assert!(candidates.iter().any(|c| c.title == "Den"));
            assert!(candidates.iter().any(|c| c.title == "Attic"));
        }
        other => panic!("expected an ambiguous error, got {other:?}"),
    }
    assert!(
        started.elapsed() < Duration::from_secs(5),
        "ambiguity must not be retried"
    );
}
