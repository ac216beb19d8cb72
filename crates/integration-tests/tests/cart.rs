//! Cart routes against the active order.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use reqwest::StatusCode;
use serde_json::{Value, json};
use vendure_storefront_integration_tests::{
    FakeReply, FakeVendure, Gateway, set_cookies, unreachable_url,
};

fn order(quantity: u32) -> Value {
    json!({
        "__typename": "Order",
        "id": "99",
        "code": "ABC",
        "totalQuantity": quantity,
        "lines": [{ "id": "5", "quantity": quantity }]
    })
}

#[tokio::test]
async fn test_show_returns_active_order() {
    let vendure = FakeVendure::always(FakeReply::data(json!({ "activeOrder": order(2) }))).await;
    let gateway = Gateway::start(&vendure.url()).await;

    let resp = gateway.get("/api/cart").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["activeOrder"]["code"], "ABC");
}

#[tokio::test]
async fn test_show_without_order() {
    let vendure = FakeVendure::always(FakeReply::data(json!({ "activeOrder": null }))).await;
    let gateway = Gateway::start(&vendure.url()).await;

    let resp = gateway.get("/api/cart").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert!(body["activeOrder"].is_null());
}

#[tokio::test]
async fn test_graphql_errors_are_internal_errors() {
    let vendure = FakeVendure::always(
        FakeReply::errors(&["Order not found"]).with_cookie("session=abc; Path=/"),
    )
    .await;
    let gateway = Gateway::start(&vendure.url()).await;

    let resp = gateway.get("/api/cart").await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(set_cookies(&resp), vec!["session=abc; Path=/"]);
    assert_eq!(resp.headers().get("cache-control").unwrap(), "no-store");

    let envelope: Value = resp.json().await.unwrap();
    assert_eq!(envelope["success"], false);
    assert_eq!(envelope["code"], "INTERNAL_ERROR");
    assert!(envelope["error"].is_string());
    assert!(
        envelope["message"]
            .as_str()
            .unwrap()
            .contains("Order not found")
    );
}

#[tokio::test]
async fn test_transport_failure_is_internal_error() {
    let gateway = Gateway::start(&unreachable_url().await).await;

    let resp = gateway.get("/api/cart").await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let envelope: Value = resp.json().await.unwrap();
    assert_eq!(envelope["code"], "INTERNAL_ERROR");
}

#[tokio::test]
async fn test_add_item() {
    let vendure = FakeVendure::always(FakeReply::data(json!({ "addItemToOrder": order(3) }))).await;
    let gateway = Gateway::start(&vendure.url()).await;

    let resp = gateway
        .post_json(
            "/api/cart/add",
            &json!({ "productVariantId": "12", "quantity": 3 }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["activeOrder"]["totalQuantity"], 3);

    let requests = vendure.requests();
    assert_eq!(requests[0].operation_name(), Some("AddItemToOrder"));
    assert_eq!(
        requests[0].body["variables"],
        json!({ "productVariantId": "12", "quantity": 3 })
    );
}

#[tokio::test]
async fn test_add_item_rejected_by_backend() {
    let vendure = FakeVendure::always(FakeReply::data(json!({
        "addItemToOrder": {
            "__typename": "InsufficientStockError",
            "errorCode": "INSUFFICIENT_STOCK_ERROR",
            "message": "Only 2 items were added to the order due to insufficient stock"
        }
    })))
    .await;
    let gateway = Gateway::start(&vendure.url()).await;

    let resp = gateway
        .post_json("/api/cart/add", &json!({ "productVariantId": "12", "quantity": 5 }))
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let envelope: Value = resp.json().await.unwrap();
    assert_eq!(envelope["code"], "VALIDATION_ERROR");
    assert_eq!(envelope["message"], "INSUFFICIENT_STOCK_ERROR");
}

#[tokio::test]
async fn test_adjust_and_remove_lines() {
    let vendure = FakeVendure::start(|request| match request.operation_name() {
        Some("AdjustOrderLine") => FakeReply::data(json!({ "adjustOrderLine": order(4) })),
        Some("RemoveOrderLine") => FakeReply::data(json!({ "removeOrderLine": order(0) })),
        _ => FakeReply::errors(&["unexpected operation"]),
    })
    .await;
    let gateway = Gateway::start(&vendure.url()).await;

    let resp = gateway
        .post_json("/api/cart/adjust", &json!({ "orderLineId": "5", "quantity": 4 }))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = gateway
        .post_json("/api/cart/remove", &json!({ "orderLineId": "5" }))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let requests = vendure.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].body["variables"], json!({ "orderLineId": "5" }));
}

#[tokio::test]
async fn test_missing_line_id_is_rejected_without_backend_call() {
    let vendure = FakeVendure::always(FakeReply::data(json!({}))).await;
    let gateway = Gateway::start(&vendure.url()).await;

    let resp = gateway.post_json("/api/cart/remove", &json!({})).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(vendure.requests().is_empty());
}
