//! Integration test support for the Vendure storefront gateway.
//!
//! Tests run the real gateway router against [`FakeVendure`], an axum server
//! on an ephemeral port that records every GraphQL request it receives and
//! answers with whatever the test scripted.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p vendure-storefront-integration-tests
//! ```

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use vendure_storefront::config::{StorefrontConfig, VendureConfig};
use vendure_storefront::state::AppState;
use vendure_storefront::vendure::VendureClient;

/// Path the fake serves the Shop API on.
pub const SHOP_API_PATH: &str = "/shop-api";

/// A scripted answer from the fake backend.
#[derive(Debug, Clone)]
pub struct FakeReply {
    pub status: StatusCode,
    pub body: String,
    pub set_cookies: Vec<String>,
    pub auth_token: Option<String>,
}

impl FakeReply {
    /// 200 with `{"data": data}`.
    #[must_use]
    pub fn data(data: Value) -> Self {
        Self::raw(StatusCode::OK, json!({ "data": data }).to_string())
    }

    /// 200 with an `errors` array and `data: null`.
    #[must_use]
    pub fn errors(messages: &[&str]) -> Self {
        let errors: Vec<Value> = messages
            .iter()
            .map(|m| json!({ "message": m, "extensions": { "code": "INTERNAL_SERVER_ERROR" } }))
            .collect();
        Self::raw(
            StatusCode::OK,
            json!({ "data": null, "errors": errors }).to_string(),
        )
    }

    /// Arbitrary status and body.
    #[must_use]
    pub fn raw(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            set_cookies: Vec::new(),
            auth_token: None,
        }
    }

    #[must_use]
    pub fn with_cookie(mut self, cookie: &str) -> Self {
        self.set_cookies.push(cookie.to_string());
        self
    }

    #[must_use]
    pub fn with_auth_token(mut self, token: &str) -> Self {
        self.auth_token = Some(token.to_string());
        self
    }
}

/// A GraphQL request as the fake backend received it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub headers: HeaderMap,
    pub body: Value,
}

impl RecordedRequest {
    #[must_use]
    pub fn operation_name(&self) -> Option<&str> {
        self.body.get("operationName").and_then(Value::as_str)
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

type Responder = dyn Fn(&RecordedRequest) -> FakeReply + Send + Sync;

struct FakeInner {
    responder: Box<Responder>,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// In-process stand-in for the Vendure Shop API.
#[derive(Clone)]
pub struct FakeVendure {
    addr: SocketAddr,
    inner: Arc<FakeInner>,
}

impl FakeVendure {
    /// Start a fake that answers every request with `responder`.
    pub async fn start(
        responder: impl Fn(&RecordedRequest) -> FakeReply + Send + Sync + 'static,
    ) -> Self {
        let inner = Arc::new(FakeInner {
            responder: Box::new(responder),
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route(SHOP_API_PATH, post(handle))
            .with_state(Arc::clone(&inner));
        let addr = serve(app).await;

        Self { addr, inner }
    }

    /// Start a fake that answers every request with the same reply.
    pub async fn always(reply: FakeReply) -> Self {
        Self::start(move |_| reply.clone()).await
    }

    /// Shop API endpoint URL.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}{SHOP_API_PATH}", self.addr)
    }

    /// Requests received so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.inner
            .requests
            .lock()
            .expect("fake request log poisoned")
            .clone()
    }

    /// A client configured for this fake.
    #[must_use]
    pub fn client(&self) -> VendureClient {
        VendureClient::new(&VendureConfig::new(
            self.url().parse().expect("fake url is valid"),
        ))
    }
}

async fn handle(
    State(inner): State<Arc<FakeInner>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let request = RecordedRequest { headers, body };
    let reply = (inner.responder)(&request);
    inner
        .requests
        .lock()
        .expect("fake request log poisoned")
        .push(request);

    let mut response = (reply.status, reply.body).into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    for cookie in &reply.set_cookies {
        headers.append(
            header::SET_COOKIE,
            HeaderValue::from_str(cookie).expect("scripted cookie is a valid header"),
        );
    }
    if let Some(token) = &reply.auth_token {
        headers.insert(
            "vendure-auth-token",
            HeaderValue::from_str(token).expect("scripted token is a valid header"),
        );
    }
    response
}

async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("listener has an address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server");
    });
    addr
}

/// A Shop API URL nothing listens on.
pub async fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("listener has an address");
    drop(listener);
    format!("http://{addr}{SHOP_API_PATH}")
}

/// A running gateway in front of some Shop API URL.
pub struct Gateway {
    addr: SocketAddr,
    pub http: reqwest::Client,
}

impl Gateway {
    /// Start the full gateway router against `vendure_url`.
    pub async fn start(vendure_url: &str) -> Self {
        let vendure_url = vendure_url.to_string();
        let config = StorefrontConfig::from_lookup(|key| match key {
            "VENDURE_API_URL" => Some(vendure_url.clone()),
            "SITE_URL" => Some("https://shop.example.com".to_string()),
            _ => None,
        })
        .expect("test configuration is valid");

        let addr = serve(vendure_storefront::app(AppState::new(config))).await;
        Self {
            addr,
            http: reqwest::Client::new(),
        }
    }

    /// Absolute URL for a gateway path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// POST a JSON body.
    pub async fn post_json(&self, path: &str, body: &Value) -> reqwest::Response {
        self.http
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("gateway request")
    }

    /// GET a path.
    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.http
            .get(self.url(path))
            .send()
            .await
            .expect("gateway request")
    }
}

/// All `Set-Cookie` values on a response, in order.
#[must_use]
pub fn set_cookies(response: &reqwest::Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect()
}
