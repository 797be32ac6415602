//! Router helpers shared by the handler tests.

use axum::{
    body::Body,
    extract::FromRef,
    http::{header, Method, Request, StatusCode},
};
use serde_json::Value;
use tower::ServiceExt;

use crate::{
    app::build_app,
    auth::dto::{JwtKeys, TokenKind},
    state::AppState,
};

/// Runs one request through the full router and decodes the JSON body (`Null` if empty).
pub async fn send(state: AppState, req: Request<Body>) -> (StatusCode, Value) {
    let resp = build_app(state).oneshot(req).await.expect("request");
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body");
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

pub fn bearer(state: &AppState, subject: &str) -> String {
    let token = JwtKeys::from_ref(state)
        .sign_with_kind(subject, TokenKind::Access)
        .expect("sign token");
    format!("Bearer {token}")
}

pub fn request(method: Method, uri: &str, auth: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request builds")
}
