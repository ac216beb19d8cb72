//! GraphQL documents sent to the Vendure Shop API, and the shapes of their
//! answers.
//!
//! Mutations in the Shop API return unions of a success type and
//! `ErrorResult` variants (`InvalidCredentialsError`, `NotVerifiedError`,
//! `OrderModificationError`, ...). [`MutationOutcome`] splits those apart.

use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;
use vendure_storefront_core::{CurrentUser, Customer};

/// A named GraphQL operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Document {
    pub operation_name: &'static str,
    pub source: &'static str,
}

macro_rules! active_order_fragment {
    () => {
        r"
fragment ActiveOrder on Order {
    id
    code
    state
    active
    totalQuantity
    subTotal
    subTotalWithTax
    shipping
    shippingWithTax
    total
    totalWithTax
    currencyCode
    couponCodes
    lines {
        id
        quantity
        unitPriceWithTax
        linePriceWithTax
        featuredAsset {
            id
            preview
        }
        productVariant {
            id
            name
            sku
            product {
                id
                name
                slug
            }
        }
    }
}
"
    };
}

/// `me`, `activeCustomer` and `activeOrder` in one round trip.
pub const AUTH_STATUS: Document = Document {
    operation_name: "AuthStatus",
    source: concat!(
        r"
query AuthStatus {
    me {
        id
        identifier
    }
    activeCustomer {
        id
        firstName
        lastName
        emailAddress
    }
    activeOrder {
        ...ActiveOrder
    }
}
",
        active_order_fragment!()
    ),
};

pub const ACTIVE_ORDER: Document = Document {
    operation_name: "ActiveOrder",
    source: concat!(
        r"
query ActiveOrder {
    activeOrder {
        ...ActiveOrder
    }
}
",
        active_order_fragment!()
    ),
};

pub const LOGIN: Document = Document {
    operation_name: "Login",
    source: r"
mutation Login($username: String!, $password: String!, $rememberMe: Boolean) {
    login(username: $username, password: $password, rememberMe: $rememberMe) {
        __typename
        ... on CurrentUser {
            id
            identifier
        }
        ... on ErrorResult {
            errorCode
            message
        }
    }
}
",
};

pub const LOGOUT: Document = Document {
    operation_name: "Logout",
    source: r"
mutation Logout {
    logout {
        success
    }
}
",
};

pub const REGISTER: Document = Document {
    operation_name: "Register",
    source: r"
mutation Register($input: RegisterCustomerInput!) {
    registerCustomerAccount(input: $input) {
        __typename
        ... on Success {
            success
        }
        ... on ErrorResult {
            errorCode
            message
        }
    }
}
",
};

pub const VERIFY: Document = Document {
    operation_name: "Verify",
    source: r"
mutation Verify($token: String!, $password: String) {
    verifyCustomerAccount(token: $token, password: $password) {
        __typename
        ... on CurrentUser {
            id
            identifier
        }
        ... on ErrorResult {
            errorCode
            message
        }
    }
}
",
};

pub const REFRESH_VERIFICATION: Document = Document {
    operation_name: "RefreshVerification",
    source: r"
mutation RefreshVerification($emailAddress: String!) {
    refreshCustomerVerification(emailAddress: $emailAddress) {
        __typename
        ... on Success {
            success
        }
        ... on ErrorResult {
            errorCode
            message
        }
    }
}
",
};

pub const ADD_ITEM_TO_ORDER: Document = Document {
    operation_name: "AddItemToOrder",
    source: concat!(
        r"
mutation AddItemToOrder($productVariantId: ID!, $quantity: Int!) {
    addItemToOrder(productVariantId: $productVariantId, quantity: $quantity) {
        __typename
        ...ActiveOrder
        ... on ErrorResult {
            errorCode
            message
        }
    }
}
",
        active_order_fragment!()
    ),
};

pub const ADJUST_ORDER_LINE: Document = Document {
    operation_name: "AdjustOrderLine",
    source: concat!(
        r"
mutation AdjustOrderLine($orderLineId: ID!, $quantity: Int!) {
    adjustOrderLine(orderLineId: $orderLineId, quantity: $quantity) {
        __typename
        ...ActiveOrder
        ... on ErrorResult {
            errorCode
            message
        }
    }
}
",
        active_order_fragment!()
    ),
};

pub const REMOVE_ORDER_LINE: Document = Document {
    operation_name: "RemoveOrderLine",
    source: concat!(
        r"
mutation RemoveOrderLine($orderLineId: ID!) {
    removeOrderLine(orderLineId: $orderLineId) {
        __typename
        ...ActiveOrder
        ... on ErrorResult {
            errorCode
            message
        }
    }
}
",
        active_order_fragment!()
    ),
};

// =============================================================================
// Response Shapes
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthStatusData {
    pub me: Option<CurrentUser>,
    pub active_customer: Option<Customer>,
    pub active_order: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveOrderData {
    pub active_order: Option<Value>,
}

/// `Success { success }` from account mutations.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Success {
    pub success: bool,
}

/// Any `ErrorResult` member of a Shop API union.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResult {
    #[serde(rename = "__typename", default)]
    pub typename: String,
    pub error_code: String,
    pub message: String,
}

impl ErrorResult {
    /// Whether the backend rejected the shopper's credentials or account
    /// state, as opposed to the request itself.
    #[must_use]
    pub fn is_authentication_failure(&self) -> bool {
        matches!(
            self.error_code.as_str(),
            "INVALID_CREDENTIALS_ERROR" | "NOT_VERIFIED_ERROR"
        )
    }
}

/// The two halves of a Shop API mutation union.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome<T> {
    Accepted(T),
    Rejected(ErrorResult),
}

impl<T: DeserializeOwned> MutationOutcome<T> {
    /// Split a union value on the presence of `errorCode`.
    ///
    /// # Errors
    ///
    /// Returns an error if the chosen half does not deserialize.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        if value.get("errorCode").is_some() {
            serde_json::from_value(value).map(Self::Rejected)
        } else {
            serde_json::from_value(value).map(Self::Accepted)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_fragment_is_appended() {
        assert!(AUTH_STATUS.source.contains("fragment ActiveOrder on Order"));
        assert!(ACTIVE_ORDER.source.contains("fragment ActiveOrder on Order"));
        assert!(ADD_ITEM_TO_ORDER.source.contains("...ActiveOrder"));
        assert!(!LOGIN.source.contains("fragment"));
    }

    #[test]
    fn test_operation_names_match_sources() {
        for doc in [
            AUTH_STATUS,
            ACTIVE_ORDER,
            LOGIN,
            LOGOUT,
            REGISTER,
            VERIFY,
            REFRESH_VERIFICATION,
            ADD_ITEM_TO_ORDER,
            ADJUST_ORDER_LINE,
            REMOVE_ORDER_LINE,
        ] {
            assert!(
                doc.source.contains(&format!(" {}", doc.operation_name)),
                "{} not declared in its source",
                doc.operation_name
            );
        }
    }

    #[test]
    fn test_outcome_accepted_user() {
        let outcome = MutationOutcome::<CurrentUser>::from_value(json!({
            "__typename": "CurrentUser",
            "id": "1",
            "identifier": "a@b.com",
        }))
        .unwrap();
        assert_eq!(
            outcome,
            MutationOutcome::Accepted(CurrentUser {
                id: "1".to_string(),
                identifier: "a@b.com".to_string(),
            })
        );
    }

    #[test]
    fn test_outcome_rejected() {
        let outcome = MutationOutcome::<CurrentUser>::from_value(json!({
            "__typename": "InvalidCredentialsError",
            "errorCode": "INVALID_CREDENTIALS_ERROR",
            "message": "The provided credentials are invalid",
        }))
        .unwrap();
        let MutationOutcome::Rejected(err) = outcome else {
            panic!("expected rejection");
        };
        assert_eq!(err.typename, "InvalidCredentialsError");
        assert!(err.is_authentication_failure());
    }

    #[test]
    fn test_order_error_is_not_authentication_failure() {
        let err = ErrorResult {
            typename: "OrderModificationError".to_string(),
            error_code: "ORDER_MODIFICATION_ERROR".to_string(),
            message: "Order cannot be modified".to_string(),
        };
        assert!(!err.is_authentication_failure());
    }

    #[test]
    fn test_outcome_accepted_order_keeps_raw_json() {
        let order = json!({"__typename": "Order", "id": "5", "totalQuantity": 2});
        let outcome = MutationOutcome::<Value>::from_value(order.clone()).unwrap();
        assert_eq!(outcome, MutationOutcome::Accepted(order));
    }
}
