//! Transport behaviour against a live HTTP backend.

mod common;

use serde_json::{json, Value};
use std::time::Duration;

use common::*;
use marketplace_client::auth;
use marketplace_client::error::ErrorKind;
use marketplace_client::transport::{Method, RequestOptions, X_REQUEST_ID};

#[tokio::test]
async fn test_get_resolves_envelope_data() {
    let (addr, seen) =
        start_recording_backend(vec![(200, r#"{"code":0,"data":{"items":[1,2]}}"#)]).await;
    let (transport, _) = transport_for(&config_for(addr));
    transport.credentials().set("tok-123").unwrap();

    let value = transport
        .dispatch(
            Method::Get,
            "/assets",
            Some(json!({ "page": 2, "keyword": "egg" })),
            RequestOptions::default(),
        )
        .await
        .unwrap();
    assert_eq!(value, json!({ "items": [1, 2] }));

    let requests = seen.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let req = &requests[0];
    assert_eq!(req.method, "GET");
    assert_eq!(req.target, "/api/v1/assets?keyword=egg&page=2");
    assert_eq!(req.header("authorization"), Some("Bearer tok-123"));
    assert!(req.header(X_REQUEST_ID).is_some());
    assert!(req.body.is_empty());
}

#[tokio::test]
async fn test_post_sends_json_body() {
    let (addr, seen) = start_recording_backend(vec![(200, r#"{"success":true,"data":{"id":77}}"#)]).await;
    let (transport, _) = transport_for(&config_for(addr));

    let value: Value = transport
        .post("/trades", Some(json!({ "assetId": 5, "price": 120 })))
        .await
        .unwrap();
    assert_eq!(value, json!({ "id": 77 }));

    let requests = seen.lock().unwrap();
    let req = &requests[0];
    assert_eq!(req.method, "POST");
    assert_eq!(req.target, "/api/v1/trades");
    assert_eq!(req.header("content-type"), Some("application/json"));
    assert!(req.header("authorization").is_none());
    assert_eq!(req.json(), json!({ "assetId": 5, "price": 120 }));
}

#[tokio::test]
async fn test_business_and_http_errors() {
    let (addr, _) = start_recording_backend(vec![
        (200, r#"{"code":1003,"message":"Insufficient points"}"#),
        (409, r#"{"code":409,"message":"Listing already sold"}"#),
        (500, "not json"),
    ])
    .await;
    let (transport, navigator) = transport_for(&config_for(addr));

    let err = transport.get::<Value>("/points", None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Business);
    assert_eq!(err.code(), 1003);
    assert_eq!(err.message(), "Insufficient points");

    let err = transport.post::<Value>("/trades", None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Http);
    assert_eq!(err.code(), 409);
    assert_eq!(err.message(), "Listing already sold");

    let err = transport.get::<Value>("/points", None).await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert_eq!(err.message(), "Request failed");

    assert_eq!(navigator.count(), 0);
}

#[tokio::test]
async fn test_unauthorized_clears_credential_and_navigates_once() {
    let addr = start_mock_backend(401, r#"{"code":401,"message":"token expired"}"#).await;
    let (transport, navigator) = transport_for(&config_for(addr));
    transport.credentials().set("stale").unwrap();
    let mut events = transport.credentials().subscribe();

    let err = transport.get::<Value>("/users/me", None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert_eq!(err.code(), 401);
    assert!(!transport.credentials().is_authenticated());
    assert_eq!(navigator.count(), 1);
    assert_eq!(
        events.recv().await.unwrap(),
        auth::CredentialEvent::Cleared(auth::ClearReason::Unauthorized)
    );
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn test_connection_refused_is_network() {
    let (transport, navigator) = transport_for(&config_for(closed_port().await));

    let err = transport.get::<Value>("/assets", None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Network);
    assert_eq!(err.code(), -1);
    assert_eq!(navigator.count(), 0);
}

#[tokio::test]
async fn test_slow_backend_times_out() {
    let addr = start_programmable_backend(|_| async {
        tokio::time::sleep(Duration::from_secs(2)).await;
        (200, r#"{"code":0}"#.to_string())
    })
    .await;
    let (transport, _) = transport_for(&config_for(addr));

    let options = RequestOptions::default().with_timeout(Duration::from_millis(200));
    let err = transport
        .dispatch(Method::Get, "/slow", None, options)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Network);
}

#[tokio::test]
async fn test_login_then_logout() {
    let (addr, seen) = start_recording_backend(vec![
        (200, r#"{"code":0,"data":{"token":"fresh","user":{"id":1,"phone":"13800000000"}}}"#),
        (200, r#"{"code":0,"data":{"balance":10}}"#),
        (500, r#"{"message":"logout backend down"}"#),
    ])
    .await;
    let (transport, navigator) = transport_for(&config_for(addr));

    let session = auth::login(&transport, "13800000000", "secret").await.unwrap();
    assert_eq!(session.token, "fresh");
    assert_eq!(session.user["id"], 1);
    assert!(transport.credentials().is_authenticated());

    let _: Value = transport.get("/points/balance", None).await.unwrap();

    // A failing logout call still ends the local session
    auth::logout(&transport).await;
    assert!(!transport.credentials().is_authenticated());
    assert_eq!(navigator.count(), 1);

    let requests = seen.lock().unwrap();
    assert_eq!(requests[0].target, "/api/v1/users/login");
    assert_eq!(requests[0].json(), json!({ "phone": "13800000000", "password": "secret" }));
    assert_eq!(requests[1].header("authorization"), Some("Bearer fresh"));
    assert_eq!(requests[2].target, "/api/v1/users/logout");
    assert_eq!(requests[2].header("authorization"), Some("Bearer fresh"));
}

#[tokio::test]
async fn test_register_stores_token() {
    let (addr, seen) =
        start_recording_backend(vec![(200, r#"{"code":0,"data":{"token":"new-user"}}"#)]).await;
    let (transport, _) = transport_for(&config_for(addr));

    auth::register(&transport, "13900000000", "pw", "pw").await.unwrap();
    assert_eq!(
        transport.credentials().token().as_deref().map(String::as_str),
        Some("new-user")
    );
    assert_eq!(
        seen.lock().unwrap()[0].json(),
        json!({ "phone": "13900000000", "password": "pw", "confirmPassword": "pw" })
    );
}
