//! Cart route handlers.
//!
//! The cart is Vendure's active order for the current session. Every
//! response carries the order as Vendure returned it, under `activeOrder`.

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::instrument;

use super::{ApiJson, non_blank};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::state::AppState;
use crate::vendure::documents::{self, ActiveOrderData, Document, MutationOutcome};
use crate::vendure::UpstreamCredentials;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    #[serde(default)]
    pub product_variant_id: Option<String>,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustLineRequest {
    #[serde(default)]
    pub order_line_id: Option<String>,
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveLineRequest {
    #[serde(default)]
    pub order_line_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub success: bool,
    pub active_order: Option<Value>,
}

impl CartResponse {
    const fn new(active_order: Option<Value>) -> Self {
        Self {
            success: true,
            active_order,
        }
    }
}

const fn default_quantity() -> u32 {
    1
}

/// Return the active order, or `null` when the session has none.
///
/// Unlike the auth status route, failures here are real errors: the cart
/// page has nothing sensible to show without the order.
#[instrument(skip(state, credentials))]
pub async fn show(
    State(state): State<AppState>,
    credentials: UpstreamCredentials,
) -> Result<Response> {
    let mut reply = state
        .vendure()
        .execute(&documents::ACTIVE_ORDER, json!({}), &credentials)
        .await?;

    let cookies = reply.take_cookies();
    let result = reply
        .into_data::<ActiveOrderData>()
        .map(|data| Json(CartResponse::new(data.active_order)))
        .map_err(AppError::from);

    Ok((cookies, result).into_response())
}

/// Add a product variant to the active order, creating one if needed.
#[instrument(skip(state, credentials, body))]
pub async fn add(
    State(state): State<AppState>,
    credentials: UpstreamCredentials,
    ApiJson(body): ApiJson<AddToCartRequest>,
) -> Result<Response> {
    let Some(variant_id) = non_blank(body.product_variant_id) else {
        return Err(AppError::validation(
            "Product variant required",
            "The productVariantId field is required",
        ));
    };
    if body.quantity == 0 {
        return Err(AppError::validation(
            "Quantity must be at least 1",
            "The quantity field must be a positive integer",
        ));
    }

    add_breadcrumb("cart", "Add item");
    order_mutation(
        &state,
        &credentials,
        &documents::ADD_ITEM_TO_ORDER,
        "addItemToOrder",
        json!({ "productVariantId": variant_id, "quantity": body.quantity }),
    )
    .await
}

/// Set the quantity of an order line. Zero removes the line.
#[instrument(skip(state, credentials, body))]
pub async fn adjust(
    State(state): State<AppState>,
    credentials: UpstreamCredentials,
    ApiJson(body): ApiJson<AdjustLineRequest>,
) -> Result<Response> {
    let Some(line_id) = non_blank(body.order_line_id) else {
        return Err(AppError::validation(
            "Order line required",
            "The orderLineId field is required",
        ));
    };

    add_breadcrumb("cart", "Adjust line");
    order_mutation(
        &state,
        &credentials,
        &documents::ADJUST_ORDER_LINE,
        "adjustOrderLine",
        json!({ "orderLineId": line_id, "quantity": body.quantity }),
    )
    .await
}

/// Remove an order line.
#[instrument(skip(state, credentials, body))]
pub async fn remove(
    State(state): State<AppState>,
    credentials: UpstreamCredentials,
    ApiJson(body): ApiJson<RemoveLineRequest>,
) -> Result<Response> {
    let Some(line_id) = non_blank(body.order_line_id) else {
        return Err(AppError::validation(
            "Order line required",
            "The orderLineId field is required",
        ));
    };

    add_breadcrumb("cart", "Remove line");
    order_mutation(
        &state,
        &credentials,
        &documents::REMOVE_ORDER_LINE,
        "removeOrderLine",
        json!({ "orderLineId": line_id }),
    )
    .await
}

/// Run an order mutation and answer with the updated order.
///
/// Cookies are relayed whether the mutation was accepted or not.
async fn order_mutation(
    state: &AppState,
    credentials: &UpstreamCredentials,
    document: &Document,
    field: &str,
    variables: Value,
) -> Result<Response> {
    let mut reply = state
        .vendure()
        .execute(document, variables, credentials)
        .await?;

    let cookies = reply.take_cookies();
    let result = match reply.into_outcome::<Value>(field) {
        Ok(MutationOutcome::Accepted(order)) => Ok(Json(CartResponse::new(Some(order)))),
        Ok(MutationOutcome::Rejected(result)) => Err(AppError::from_error_result(result)),
        Err(e) => Err(AppError::from(e)),
    };

    Ok((cookies, result).into_response())
}
