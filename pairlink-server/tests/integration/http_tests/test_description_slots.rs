use pairlink_core::{ErrorBody, ErrorCode, SessionDescription};
use pairlink_server::ServerConfig;
use reqwest::StatusCode;

use crate::integration::init_tracing;
use crate::utils::TestServer;

#[tokio::test]
async fn test_offer_is_published_once_and_readable() {
    init_tracing();
    let server = TestServer::start(ServerConfig::default()).await.unwrap();
    let client = reqwest::Client::new();

    let offer = SessionDescription::offer("v=0\r\no=- offer");
    let resp = client
        .put(server.url("/rooms/ab12cd345/offer"))
        .json(&offer)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    // A second offer must not replace the first.
    let resp = client
        .put(server.url("/rooms/ab12cd345/offer"))
        .json(&SessionDescription::offer("v=0\r\no=- intruder"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: ErrorBody = resp.json().await.unwrap();
    assert_eq!(body.code, ErrorCode::SlotTaken);

    let stored: SessionDescription = client
        .get(server.url("/rooms/ab12cd345/offer"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stored, offer);

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_answer_before_offer_is_rejected() {
    init_tracing();
    let server = TestServer::start(ServerConfig::default()).await.unwrap();
    let client = reqwest::Client::new();

    let resp = client
        .put(server.url("/rooms/doesnotexist/answer"))
        .json(&SessionDescription::answer("v=0"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: ErrorBody = resp.json().await.unwrap();
    assert_eq!(body.code, ErrorCode::RoomNotFound);

    let resp = client
        .get(server.url("/rooms/doesnotexist/offer"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: ErrorBody = resp.json().await.unwrap();
    assert_eq!(body.code, ErrorCode::RoomNotFound);

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_answer_slot_fills_exactly_once() {
    init_tracing();
    let server = TestServer::start(ServerConfig::default()).await.unwrap();
    let client = reqwest::Client::new();

    client
        .put(server.url("/rooms/room42/offer"))
        .json(&SessionDescription::offer("v=0"))
        .send()
        .await
        .unwrap();

    let resp = client.get(server.url("/rooms/room42/answer")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: ErrorBody = resp.json().await.unwrap();
    assert_eq!(body.code, ErrorCode::SlotEmpty);

    let answer = SessionDescription::answer("v=0\r\no=- answer");
    let resp = client
        .put(server.url("/rooms/room42/answer"))
        .json(&answer)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = client
        .put(server.url("/rooms/room42/answer"))
        .json(&SessionDescription::answer("v=0\r\no=- late"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let stored: SessionDescription = client
        .get(server.url("/rooms/room42/answer"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stored, answer);

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_description_kind_must_match_path() {
    init_tracing();
    let server = TestServer::start(ServerConfig::default()).await.unwrap();
    let client = reqwest::Client::new();

    let resp = client
        .put(server.url("/rooms/mixup/offer"))
        .json(&SessionDescription::answer("v=0"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: ErrorBody = resp.json().await.unwrap();
    assert_eq!(body.code, ErrorCode::KindMismatch);

    let resp = client
        .put(server.url("/rooms/mixup/candidates"))
        .json(&SessionDescription::offer("v=0"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    server.stop().await.unwrap();
}
