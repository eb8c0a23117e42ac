#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use study_buddy::completion::CompletionService;
use study_buddy::config::Config;
use study_buddy::error::ServiceError;
use study_buddy::{router, AppState};

/// Completion service with a scripted reply and a call counter
pub struct StubCompletion {
    pub calls: AtomicUsize,
    reply: Result<String, ServiceError>,
}

impl StubCompletion {
    pub fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            reply: Ok(text.to_string()),
        })
    }

    pub fn failing(err: ServiceError) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            reply: Err(err),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionService for StubCompletion {
    async fn complete(&self, _prompt: &str) -> Result<String, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply.clone()
    }

    fn model(&self) -> &str {
        "stub"
    }
}

pub fn app(stub: Arc<StubCompletion>) -> Router {
    router(AppState::new(Config::default(), stub))
}

/// State kept by the caller so tests can inspect the session store
pub fn state_with(config: Config, stub: Arc<StubCompletion>) -> AppState {
    AppState::new(config, stub)
}

pub struct TestResponse {
    pub status: StatusCode,
    pub set_cookie: Option<String>,
    pub content_disposition: Option<String>,
    pub text: String,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.text).expect("response should be JSON")
    }
}

/// Browser-like client that keeps the session cookie between requests
pub struct Client {
    app: Router,
    cookie: Option<String>,
}

impl Client {
    pub fn new(app: Router) -> Self {
        Self { app, cookie: None }
    }

    pub fn cookie(&self) -> Option<&str> {
        self.cookie.as_deref()
    }

    pub async fn send(&mut self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(cookie) = &self.cookie {
            req = req.header(header::COOKIE, cookie);
        }
        let body = match body {
            Some(json) => {
                req = req.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let resp = self
            .app
            .clone()
            .oneshot(req.body(body).expect("request build should succeed"))
            .await
            .expect("router should respond");

        let header_str = |name: header::HeaderName| {
            resp.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let set_cookie = header_str(header::SET_COOKIE);
        let content_disposition = header_str(header::CONTENT_DISPOSITION);
        if let Some(set_cookie) = &set_cookie {
            let pair = set_cookie.split(';').next().unwrap_or_default().to_string();
            self.cookie = Some(pair);
        }

        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("body should be readable");

        TestResponse {
            status,
            set_cookie,
            content_disposition,
            text: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&mut self, uri: &str, body: Option<Value>) -> TestResponse {
        self.send(Method::POST, uri, body).await
    }

    pub async fn put(&mut self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&mut self, uri: &str) -> TestResponse {
        self.send(Method::DELETE, uri, None).await
    }
}
