//! Login, logout, registration and the client-side token session.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use reqwest::StatusCode;
use serde_json::{Value, json};
use vendure_storefront::vendure::documents::MutationOutcome;
use vendure_storefront::vendure::{FileTokenStore, MemoryTokenStore, ShopSession, TokenStore};
use vendure_storefront_core::SessionToken;
use vendure_storefront_integration_tests::{
    FakeReply, FakeVendure, Gateway, RecordedRequest, set_cookies,
};

fn current_user() -> Value {
    json!({ "__typename": "CurrentUser", "id": "1", "identifier": "ada@example.com" })
}

/// Accepts `ada@example.com` / `hunter22`, issues `tok-1` on login.
fn shop_api(request: &RecordedRequest) -> FakeReply {
    match request.operation_name() {
        Some("Login") => {
            let vars = &request.body["variables"];
            if vars["username"] == "ada@example.com" && vars["password"] == "hunter22" {
                FakeReply::data(json!({ "login": current_user() }))
                    .with_auth_token("tok-1")
                    .with_cookie("session=signed-in; Path=/; HttpOnly")
            } else {
                FakeReply::data(json!({
                    "login": {
                        "__typename": "InvalidCredentialsError",
                        "errorCode": "INVALID_CREDENTIALS_ERROR",
                        "message": "The provided credentials are invalid"
                    }
                }))
            }
        }
        Some("Logout") => FakeReply::data(json!({ "logout": { "success": true } }))
            .with_cookie("session=; Max-Age=0; Path=/"),
        Some("AuthStatus") => {
            let signed_in = request.header("authorization") == Some("Bearer tok-1");
            FakeReply::data(json!({
                "me": if signed_in { current_user() } else { Value::Null },
                "activeCustomer": null,
                "activeOrder": null
            }))
        }
        Some("Register") => FakeReply::data(json!({
            "registerCustomerAccount": { "__typename": "Success", "success": true }
        })),
        Some("Verify") => FakeReply::data(json!({ "verifyCustomerAccount": current_user() }))
            .with_auth_token("tok-verified"),
        _ => FakeReply::errors(&["unexpected operation"]),
    }
}

// ============================================================================
// Gateway routes
// ============================================================================

#[tokio::test]
async fn test_login_route() {
    let vendure = FakeVendure::start(shop_api).await;
    let gateway = Gateway::start(&vendure.url()).await;

    let resp = gateway
        .post_json(
            "/api/auth/login",
            &json!({ "email": "ada@example.com", "password": "hunter22", "rememberMe": true }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        set_cookies(&resp),
        vec!["session=signed-in; Path=/; HttpOnly"]
    );
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["identifier"], "ada@example.com");
    assert_eq!(body["token"], "tok-1");

    assert_eq!(vendure.requests()[0].body["variables"]["rememberMe"], true);
}

#[tokio::test]
async fn test_login_route_accepts_username_field() {
    let vendure = FakeVendure::start(shop_api).await;
    let gateway = Gateway::start(&vendure.url()).await;

    let resp = gateway
        .post_json(
            "/api/auth/login",
            &json!({ "username": "ada@example.com", "password": "hunter22" }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_login_route_wrong_password() {
    let vendure = FakeVendure::start(shop_api).await;
    let gateway = Gateway::start(&vendure.url()).await;

    let resp = gateway
        .post_json(
            "/api/auth/login",
            &json!({ "email": "ada@example.com", "password": "nope" }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let envelope: Value = resp.json().await.unwrap();
    assert_eq!(envelope["code"], "AUTHENTICATION_ERROR");
    assert_eq!(envelope["error"], "The provided credentials are invalid");
}

#[tokio::test]
async fn test_login_route_requires_both_fields() {
    let vendure = FakeVendure::start(shop_api).await;
    let gateway = Gateway::start(&vendure.url()).await;

    let resp = gateway
        .post_json("/api/auth/login", &json!({ "email": "ada@example.com" }))
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(vendure.requests().is_empty());
}

#[tokio::test]
async fn test_logout_route() {
    let vendure = FakeVendure::start(shop_api).await;
    let gateway = Gateway::start(&vendure.url()).await;

    let resp = gateway.post_json("/api/auth/logout", &json!({})).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(set_cookies(&resp), vec!["session=; Max-Age=0; Path=/"]);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "success": true }));
}

#[tokio::test]
async fn test_register_route() {
    let vendure = FakeVendure::start(shop_api).await;
    let gateway = Gateway::start(&vendure.url()).await;

    let resp = gateway
        .post_json(
            "/api/auth/register",
            &json!({
                "email": " ada@example.com ",
                "password": "hunter22",
                "firstName": "Ada",
                "lastName": ""
            }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let input = &vendure.requests()[0].body["variables"]["input"];
    assert_eq!(
        *input,
        json!({
            "emailAddress": "ada@example.com",
            "password": "hunter22",
            "firstName": "Ada"
        })
    );
}

#[tokio::test]
async fn test_verify_route() {
    let vendure = FakeVendure::start(shop_api).await;
    let gateway = Gateway::start(&vendure.url()).await;

    let resp = gateway
        .post_json("/api/auth/verify", &json!({ "token": "email-token" }))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["user"]["id"], "1");
    assert_eq!(body["token"], "tok-verified");
}

// ============================================================================
// Client-side session
// ============================================================================

#[tokio::test]
async fn test_session_sends_stored_token_after_login() {
    let vendure = FakeVendure::start(shop_api).await;
    let session = ShopSession::new(vendure.client(), MemoryTokenStore::new());

    assert!(!session.auth_status().await.is_authenticated);

    let outcome = session
        .login("ada@example.com", "hunter22", false)
        .await
        .unwrap();
    assert!(matches!(outcome, MutationOutcome::Accepted(ref user) if user.id == "1"));
    assert_eq!(session.store().get_token(), Some(SessionToken::new("tok-1")));

    let status = session.auth_status().await;
    assert!(status.is_authenticated);

    let requests = vendure.requests();
    assert!(requests[0].header("authorization").is_none());
    assert_eq!(requests[2].header("authorization"), Some("Bearer tok-1"));
}

#[tokio::test]
async fn test_session_rejected_login_stores_nothing() {
    let vendure = FakeVendure::start(shop_api).await;
    let session = ShopSession::new(vendure.client(), MemoryTokenStore::new());

    let outcome = session
        .login("ada@example.com", "wrong", false)
        .await
        .unwrap();
    assert!(
        matches!(outcome, MutationOutcome::Rejected(ref r) if r.error_code == "INVALID_CREDENTIALS_ERROR")
    );
    assert!(session.store().get_token().is_none());
}

#[tokio::test]
async fn test_session_logout_clears_store() {
    let vendure = FakeVendure::start(shop_api).await;
    let dir = tempfile::tempdir().unwrap();
    let session = ShopSession::new(vendure.client(), FileTokenStore::in_dir(dir.path()));

    session
        .login("ada@example.com", "hunter22", true)
        .await
        .unwrap();
    assert!(session.store().path().exists());

    session.logout().await.unwrap();
    assert!(session.store().get_token().is_none());
    assert_eq!(
        vendure.requests()[1].header("authorization"),
        Some("Bearer tok-1")
    );
}

#[tokio::test]
async fn test_session_logout_clears_store_when_backend_is_down() {
    let store = MemoryTokenStore::new();
    store.set_token(&SessionToken::new("stale")).unwrap();
    let client = vendure_storefront::vendure::VendureClient::new(
        &vendure_storefront::config::VendureConfig::new(
            vendure_storefront_integration_tests::unreachable_url()
                .await
                .parse()
                .unwrap(),
        ),
    );
    let session = ShopSession::new(client, store);

    assert!(session.logout().await.is_err());
    assert!(session.store().get_token().is_none());
}
