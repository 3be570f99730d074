//! Name resolution on mutating collection tools.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;
use tests::{args, call_tool, manager_for, mocks, payload_of};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn ambiguous_collection_names_block_the_mutation() {
    let plex = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mocks::root_body("Den")))
        .mount(&plex)
        .await;
    Mock::given(method("GET"))
        .and(path("/library/sections"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mocks::sections_body(&[
            ("1", "Movies", "movie"),
            ("2", "Concerts", "movie"),
        ])))
        .mount(&plex)
        .await;
    Mock::given(method("GET"))
        .and(path("/library/sections/1/collections"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(mocks::items_body(vec![mocks::collection("900", "80s Classics")])),
        )
        .mount(&plex)
        .await;
    Mock::given(method("GET"))
        .and(path("/library/sections/2/collections"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(mocks::items_body(vec![mocks::collection("901", "80s Classics")])),
        )
        .mount(&plex)
        .await;
    // neither candidate may be deleted
    Mock::given(method("DELETE"))
        .and(path("/library/collections/900"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&plex)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/library/collections/901"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&plex)
        .await;

    let manager = Arc::new(manager_for(&plex.uri()));
    let result = call_tool(
        manager,
        "delete_collection",
        args(json!({ "collection": "80s Classics" })),
    )
    .await;

    assert_ne!(
        result.is_error,
        Some(true),
        "disambiguation is a successful outcome"
    );
    let payload = payload_of(&result);
    assert_eq!(payload["status"], "ambiguous");
    let candidates = payload["candidates"].as_array().unwrap();
    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0]["id"], "900");
    assert_eq!(candidates[0]["detail"], "Movies");
    assert_eq!(candidates[1]["id"], "901");
    assert_eq!(candidates[1]["detail"], "Concerts");
}

#[tokio::test]
async fn a_unique_name_resolves_and_the_delete_goes_through() {
    let plex = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mocks::root_body("Den")))
        .mount(&plex)
        .await;
    Mock::given(method("GET"))
        .and(path("/library/sections"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(mocks::sections_body(&[("1", "Movies", "movie")])),
        )
        .mount(&plex)
        .await;
    Mock::given(method("GET"))
        .and(path("/library/sections/1/collections"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(mocks::items_body(vec![mocks::collection("900", "80s Classics")])),
        )
        .mount(&plex)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/library/collections/900"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&plex)
        .await;

    let manager = Arc::new(manager_for(&plex.uri()));
    let result = call_tool(
        manager,
        "delete_collection",
        args(json!({ "collection": "80s classics" })),
    )
    .await;

    assert_ne!(result.is_error, Some(true));
    let payload = payload_of(&result);
    assert_eq!(payload["status"], "ok");
    assert!(payload["message"]
        .as_str()
        .unwrap()
        .contains("80s Classics"));
}
