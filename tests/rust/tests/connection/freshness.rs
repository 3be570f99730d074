//! Handle caching: the freshness window, liveness probes, and invalidation.

use std::sync::Arc;
use std::time::Duration;

use plexmcp_core::ConnectionManager;
use tests::{direct_settings, manager_for, mocks, PLEX_TOKEN};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn fresh_handle_is_reused_without_server_traffic() {
    let plex = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("X-Plex-Token", PLEX_TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(mocks::root_body("Den")))
        .expect(1)
        .mount(&plex)
        .await;
    Mock::given(method("GET"))
        .and(path("/identity"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&plex)
        .await;

    let manager = manager_for(&plex.uri());
    let first = manager.acquire().await.expect("first acquire should connect");
    let second = manager.acquire().await.expect("second acquire should reuse");

    assert!(
        Arc::ptr_eq(&first, &second),
        "a fresh handle should be handed out again"
    );
    assert_eq!(first.friendly_name(), "Den");
}

#[tokio::test]
async fn stale_handle_is_probed_and_the_window_rearmed() {
    let plex = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mocks::root_body("Den")))
        .expect(1)
        .mount(&plex)
        .await;
    Mock::given(method("GET"))
        .and(path("/identity"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&plex)
        .await;

    let manager = ConnectionManager::new(direct_settings(&plex.uri()))
        .with_freshness_window(Duration::from_millis(200));

    let first = manager.acquire().await.expect("connect");
    tokio::time::sleep(Duration::from_millis(250)).await;
    let second = manager
        .acquire()
        .await
        .expect("stale acquire should revalidate the handle");
    // A successful probe restarts the window, so this one stays quiet.
    let third = manager
        .acquire()
        .await
        .expect("rearmed handle should count as fresh");

    assert!(Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(&second, &third));
}

#[tokio::test]
async fn failed_probe_discards_the_handle_and_reconnects() {
    let plex = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mocks::root_body("Den")))
        .expect(2)
        .mount(&plex)
        .await;
    Mock::given(method("GET"))
        .and(path("/identity"))
        .respond_with(ResponseTemplate::new(500).set_body_string("probe down"))
        .expect(1)
        .mount(&plex)
        .await;

    let manager = ConnectionManager::new(direct_settings(&plex.uri()))
        .with_freshness_window(Duration::ZERO);

    let first = manager.acquire().await.expect("initial connect");
    let second = manager
        .acquire()
        .await
        .expect("reconnect after the failed probe");

    assert!(
        !Arc::ptr_eq(&first, &second),
        "a failed probe should discard the cached handle"
    );
}

#[tokio::test]
async fn invalidate_forces_the_next_acquire_to_reconnect() {
    let plex = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mocks::root_body("Den")))
        .expect(2)
        .mount(&plex)
        .await;
    Mock::given(method("GET"))
        .and(path("/identity"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&plex)
        .await;

    let manager = manager_for(&plex.uri());
    let first = manager.acquire().await.expect("initial connect");
    manager.invalidate().await;
    let second = manager.acquire().await.expect("reconnect after invalidate");

    assert!(!Arc::ptr_eq(&first, &second));
}
