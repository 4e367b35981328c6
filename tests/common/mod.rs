#![allow(dead_code)]

use axum::{Router, body::Body, http::Request};
use bearer_gate::{
    app,
    config::{AUDIENCE_KEY, Config, ISSUER_KEY, MapSource},
    services::auth::{
        issuer::IssuerIdentity,
        signing_key::{SECRET_KEY, Secret},
    },
};
use chrono::Utc;
use jsonwebtoken::Header;
use serde_json::Value;

pub const SECRET: &str = "integration-test-secret-with-at-least-32-bytes";
pub const ISSUER: &str = "workspace-api";
pub const AUDIENCE: &str = "workspace-web";

pub fn source() -> MapSource {
    MapSource::new()
        .with(SECRET_KEY, SECRET)
        .with(ISSUER_KEY, ISSUER)
        .with(AUDIENCE_KEY, AUDIENCE)
}

pub fn app_with(source: MapSource) -> Router {
    let config = Config::from_source(&source).expect("config");
    let state = app::build_state(&config).expect("state");
    app::build_router(state)
}

pub fn app() -> Router {
    app_with(source())
}

pub fn now() -> i64 {
    Utc::now().timestamp()
}

pub fn sign(claims: &Value) -> String {
    sign_with(SECRET, claims)
}

pub fn sign_with(secret: &str, claims: &Value) -> String {
    let identity = IssuerIdentity::from_secret(ISSUER, AUDIENCE, &Secret::new(secret))
        .expect("identity");
    let credentials = identity.credentials();
    jsonwebtoken::encode(
        &Header::new(credentials.algorithm()),
        claims,
        &credentials.encoding_key(),
    )
    .expect("encode")
}

pub fn get(uri: &str, authorization: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(value) = authorization {
        builder = builder.header("authorization", value);
    }
    builder.body(Body::empty()).expect("request builder should succeed")
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}
