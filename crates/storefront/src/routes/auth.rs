//! Authentication route handlers.
//!
//! Every handler forwards the browser's cookies to the Vendure Shop API and
//! relays the backend's `Set-Cookie` headers back, so the Vendure session
//! cookie keeps working across the gateway. Login and verification also
//! return the bearer token Vendure issues, for clients that keep the token
//! themselves.

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::instrument;
use vendure_storefront_core::{AuthStatus, CurrentUser, EmailAddress, SessionToken};

use super::{ApiJson, non_blank};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::state::AppState;
use crate::vendure::documents::{self, AuthStatusData, MutationOutcome, Success};
use crate::vendure::{ForwardedCookies, UpstreamCredentials};

/// Acknowledgement for verification resends, identical whether or not the
/// account exists.
pub const RESEND_VERIFICATION_MESSAGE: &str =
    "If your account exists and is not yet verified, a new verification email has been sent.";

const REGISTERED_MESSAGE: &str =
    "Account created. Please check your email to verify your account.";

// =============================================================================
// Request / Response Types
// =============================================================================

/// Kept as raw JSON: any present, non-empty value is acknowledged, and only
/// a usable string reaches the backend.
#[derive(Debug, Deserialize)]
pub struct ResendVerificationRequest {
    #[serde(default)]
    pub email: Option<Value>,
}

impl ResendVerificationRequest {
    /// Whether the field is absent or empty (`null`, `""`, `false`, `0`).
    fn is_missing(&self) -> bool {
        match &self.email {
            None | Some(Value::Null | Value::Bool(false)) => true,
            Some(Value::String(s)) => s.is_empty(),
            Some(Value::Number(n)) => n.as_f64() == Some(0.0),
            Some(_) => false,
        }
    }

    /// The address to send to Vendure, if the value is a non-blank string.
    fn address(&self) -> Option<&str> {
        self.email
            .as_ref()
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default, alias = "username")]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub remember_me: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// `RegisterCustomerInput` in the Shop API schema.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RegisterCustomerInput {
    email_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone_number: Option<String>,
}

/// Body returned after a successful login or verification.
#[derive(Debug, Serialize)]
pub struct SignedInResponse {
    pub success: bool,
    pub user: CurrentUser,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl SignedInResponse {
    fn new(user: CurrentUser, token: Option<&SessionToken>) -> Self {
        Self {
            success: true,
            user,
            token: token.map(|t| t.expose().to_string()),
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Report who is signed in, with their customer record and active order.
///
/// Always answers 200: the front end polls this route to decide navigation,
/// so a backend failure is folded into `{isAuthenticated:false, error}`.
#[instrument(skip(state, credentials))]
pub async fn status(State(state): State<AppState>, credentials: UpstreamCredentials) -> Response {
    let mut reply = match state
        .vendure()
        .execute(&documents::AUTH_STATUS, json!({}), &credentials)
        .await
    {
        Ok(reply) => reply,
        Err(mut e) => {
            tracing::warn!(error = %e, "Auth status check failed");
            let cookies = e.take_cookies();
            return (cookies, Json(AuthStatus::degraded(e.to_string()))).into_response();
        }
    };

    let cookies = reply.take_cookies();
    let status = match reply.into_data::<AuthStatusData>() {
        Ok(data) => AuthStatus::new(data.me, data.active_customer, data.active_order),
        Err(e) => {
            tracing::warn!(error = %e, "Auth status query returned errors");
            AuthStatus::degraded(e.to_string())
        }
    };

    (cookies, Json(status)).into_response()
}

/// Ask Vendure to send a fresh verification email.
///
/// Answers the same 200 acknowledgement whether or not the account exists,
/// is already verified, or the backend failed, so the route cannot be used
/// to discover accounts.
#[instrument(skip(state, credentials, body))]
pub async fn resend_verification(
    State(state): State<AppState>,
    credentials: UpstreamCredentials,
    ApiJson(body): ApiJson<ResendVerificationRequest>,
) -> Result<Response> {
    if body.is_missing() {
        return Err(AppError::validation(
            "Email required",
            "The email field is required",
        ));
    }

    let cookies = match body.address() {
        Some(email) => request_verification_email(&state, &credentials, email).await,
        None => {
            tracing::debug!("Verification resend skipped for non-address email value");
            ForwardedCookies::default()
        }
    };

    Ok((
        cookies,
        Json(json!({
            "success": true,
            "message": RESEND_VERIFICATION_MESSAGE,
        })),
    )
        .into_response())
}

/// Call `refreshCustomerVerification`, logging rather than returning any
/// failure. Returns the cookies to relay.
async fn request_verification_email(
    state: &AppState,
    credentials: &UpstreamCredentials,
    email: &str,
) -> ForwardedCookies {
    match state
        .vendure()
        .execute(
            &documents::REFRESH_VERIFICATION,
            json!({ "emailAddress": email }),
            credentials,
        )
        .await
    {
        Ok(mut reply) => {
            let cookies = reply.take_cookies();
            match reply.into_outcome::<Success>("refreshCustomerVerification") {
                Ok(MutationOutcome::Accepted(_)) => {}
                Ok(MutationOutcome::Rejected(result)) => {
                    tracing::debug!(error_code = %result.error_code, "Verification resend rejected");
                }
                Err(e) => tracing::warn!(error = %e, "Verification resend failed"),
            }
            cookies
        }
        Err(mut e) => {
            tracing::warn!(error = %e, "Verification resend failed");
            e.take_cookies()
        }
    }
}

/// Log in with email and password.
#[instrument(skip(state, credentials, body))]
pub async fn login(
    State(state): State<AppState>,
    credentials: UpstreamCredentials,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Response> {
    let (Some(email), Some(password)) = (non_blank(body.email), non_blank(body.password)) else {
        return Err(AppError::validation(
            "Email and password required",
            "Both the email and password fields are required",
        ));
    };

    let mut reply = state
        .vendure()
        .execute(
            &documents::LOGIN,
            json!({
                "username": email,
                "password": password,
                "rememberMe": body.remember_me,
            }),
            &credentials,
        )
        .await?;

    let cookies = reply.take_cookies();
    let token = reply.take_auth_token();
    let result = match reply.into_outcome::<CurrentUser>("login") {
        Ok(MutationOutcome::Accepted(user)) => {
            add_breadcrumb("auth", "Logged in");
            Ok(Json(SignedInResponse::new(user, token.as_ref())))
        }
        Ok(MutationOutcome::Rejected(result)) => Err(AppError::from_error_result(result)),
        Err(e) => Err(AppError::from(e)),
    };

    Ok((cookies, result).into_response())
}

/// End the Vendure session.
#[instrument(skip(state, credentials))]
pub async fn logout(
    State(state): State<AppState>,
    credentials: UpstreamCredentials,
) -> Result<Response> {
    let mut reply = state
        .vendure()
        .execute(&documents::LOGOUT, json!({}), &credentials)
        .await?;

    let cookies = reply.take_cookies();
    let result = reply
        .into_data::<Value>()
        .map(|_| {
            add_breadcrumb("auth", "Logged out");
            Json(json!({ "success": true }))
        })
        .map_err(AppError::from);

    Ok((cookies, result).into_response())
}

/// Register a customer account. Vendure emails a verification link.
#[instrument(skip(state, credentials, body))]
pub async fn register(
    State(state): State<AppState>,
    credentials: UpstreamCredentials,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> Result<Response> {
    let Some(raw_email) = non_blank(body.email) else {
        return Err(AppError::validation(
            "Email required",
            "The email field is required",
        ));
    };
    let email = EmailAddress::parse(&raw_email)
        .map_err(|e| AppError::validation("Please enter a valid email address", e.to_string()))?;

    let input = RegisterCustomerInput {
        email_address: email.to_string(),
        password: non_blank(body.password),
        first_name: non_blank(body.first_name),
        last_name: non_blank(body.last_name),
        phone_number: non_blank(body.phone_number),
    };

    let mut reply = state
        .vendure()
        .execute(&documents::REGISTER, json!({ "input": input }), &credentials)
        .await?;

    let cookies = reply.take_cookies();
    let result = match reply.into_outcome::<Success>("registerCustomerAccount") {
        Ok(MutationOutcome::Accepted(_)) => Ok(Json(json!({
            "success": true,
            "message": REGISTERED_MESSAGE,
        }))),
        Ok(MutationOutcome::Rejected(result)) => Err(AppError::from_error_result(result)),
        Err(e) => Err(AppError::from(e)),
    };

    Ok((cookies, result).into_response())
}

/// Verify an account with the token from the verification email.
///
/// A successful verification signs the customer in.
#[instrument(skip(state, credentials, body))]
pub async fn verify(
    State(state): State<AppState>,
    credentials: UpstreamCredentials,
    ApiJson(body): ApiJson<VerifyRequest>,
) -> Result<Response> {
    let Some(token) = non_blank(body.token) else {
        return Err(AppError::validation(
            "Verification token required",
            "The token field is required",
        ));
    };

    let mut reply = state
        .vendure()
        .execute(
            &documents::VERIFY,
            json!({
                "token": token,
                "password": non_blank(body.password),
            }),
            &credentials,
        )
        .await?;

    let cookies = reply.take_cookies();
    let session_token = reply.take_auth_token();
    let result = match reply.into_outcome::<CurrentUser>("verifyCustomerAccount") {
        Ok(MutationOutcome::Accepted(user)) => {
            add_breadcrumb("auth", "Verified account");
            Ok(Json(SignedInResponse::new(user, session_token.as_ref())))
        }
        Ok(MutationOutcome::Rejected(result)) => Err(AppError::from_error_result(result)),
        Err(e) => Err(AppError::from(e)),
    };

    Ok((cookies, result).into_response())
}
