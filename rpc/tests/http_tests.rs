//! End-to-end tests for the RPC surface: real signatures, real router,
//! requests driven through `tower::ServiceExt::oneshot`.

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use gpoll_core::{BatchSettings, PollLimits, PollService};
use gpoll_crypto::{derive_address, keypair_from_seed, sign_vote, DomainTag};
use gpoll_types::{KeyPair, PollId, VoterAddress};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

fn domain() -> DomainTag {
    DomainTag::from_label("gpoll-rpc-test")
}

fn voter(seed: u8) -> (KeyPair, VoterAddress) {
    let kp = keypair_from_seed(&[seed; 32]);
    let addr = derive_address(&kp.public);
    (kp, addr)
}

fn owner() -> VoterAddress {
    voter(200).1
}

fn app(min: usize, max: usize) -> Router {
    let service = PollService::with_settings(
        domain(),
        owner(),
        BatchSettings::new(min, max).unwrap(),
        PollLimits::default(),
    );
    gpoll_rpc::router(Arc::new(Mutex::new(service)))
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(json) => Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create_poll(app: &Router) -> u64 {
    let (status, body) = call(
        app,
        Method::POST,
        "/polls",
        Some(json!({
            "caller": voter(1).1.as_str(),
            "question": "favourite letter?",
            "options": ["A", "B"],
            "duration_secs": 3600,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["poll_id"].as_u64().unwrap()
}

fn vote_body(seed: u8, poll_id: u64, option: u32, nonce: u64) -> Value {
    let (kp, addr) = voter(seed);
    let sig = sign_vote(
        &domain(),
        PollId::new(poll_id),
        option,
        nonce,
        &addr,
        &kp.private,
    );
    json!({
        "poll_id": poll_id,
        "option_index": option,
        "voter": addr.as_str(),
        "nonce": nonce,
        "public_key": hex::encode(kp.public.as_bytes()),
        "signature": hex::encode(sig.as_bytes()),
    })
}

#[tokio::test]
async fn create_submit_and_settle_via_http() {
    let app = app(2, 10);
    let poll_id = create_poll(&app).await;

    let (status, body) = call(&app, Method::POST, "/votes", Some(vote_body(10, poll_id, 0, 0))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pending"], 1);

    // Second vote reaches the threshold and settles synchronously.
    let (status, body) = call(&app, Method::POST, "/votes", Some(vote_body(11, poll_id, 1, 0))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pending"], 0);

    let (status, body) = call(
        &app,
        Method::GET,
        &format!("/polls/{poll_id}/tallies"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tallies"], json!([1, 1]));
    assert_eq!(body["total"], 2);
}

#[tokio::test]
async fn duplicate_vote_conflicts() {
    let app = app(10, 10);
    let poll_id = create_poll(&app).await;

    let (status, _) = call(&app, Method::POST, "/votes", Some(vote_body(10, poll_id, 0, 0))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(&app, Method::POST, "/votes", Some(vote_body(10, poll_id, 1, 1))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("already voted"));
}

#[tokio::test]
async fn tampered_signature_is_bad_request() {
    let app = app(10, 10);
    let poll_id = create_poll(&app).await;

    let mut body = vote_body(10, poll_id, 0, 0);
    body["option_index"] = json!(1);
    let (status, body) = call(&app, Method::POST, "/votes", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("signature"));
}

#[tokio::test]
async fn unknown_poll_is_not_found() {
    let app = app(10, 10);
    let (status, _) = call(&app, Method::GET, "/polls/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn force_drain_requires_owner() {
    let app = app(10, 10);
    let poll_id = create_poll(&app).await;

    let (status, _) = call(
        &app,
        Method::POST,
        &format!("/polls/{poll_id}/force"),
        Some(json!({"caller": voter(66).1.as_str()})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = call(
        &app,
        Method::POST,
        &format!("/polls/{poll_id}/force"),
        Some(json!({"caller": owner().as_str()})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["processed"], 0);
}

#[tokio::test]
async fn batch_settings_roundtrip() {
    let app = app(5, 20);
    let (status, body) = call(&app, Method::GET, "/settings/batch", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["min_batch_size"], 5);

    let (status, _) = call(
        &app,
        Method::PUT,
        "/settings/batch",
        Some(json!({
            "caller": owner().as_str(),
            "min_batch_size": 2,
            "max_batch_size": 8,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = call(&app, Method::GET, "/settings/batch", None).await;
    assert_eq!(body["min_batch_size"], 2);
    assert_eq!(body["max_batch_size"], 8);
}

#[tokio::test]
async fn nonce_is_exposed_for_self_correction() {
    let app = app(10, 10);
    let poll_id = create_poll(&app).await;
    let (_, addr) = voter(10);

    let (_, body) = call(&app, Method::GET, &format!("/nonces/{}", addr.as_str()), None).await;
    assert_eq!(body["nonce"], 0);

    call(&app, Method::POST, "/votes", Some(vote_body(10, poll_id, 0, 0))).await;

    let (_, body) = call(&app, Method::GET, &format!("/nonces/{}", addr.as_str()), None).await;
    assert_eq!(body["nonce"], 1);

    let (_, body) = call(
        &app,
        Method::GET,
        &format!("/polls/{poll_id}/voted/{}", addr.as_str()),
        None,
    )
    .await;
    assert_eq!(body["voted"], true);
}
