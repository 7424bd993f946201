//! Shared fixtures for the HTTP tests.
#![allow(dead_code)]

use std::sync::Arc;

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::{test::TestRequest, web};
use serde_json::json;

use api_server::config::{AppConfig, AuthStrategy};
use api_server::middleware::auth::SESSION_COOKIE;
use api_server::state::{AppState, Repositories};
use cattery_infra::Argon2PasswordService;

pub const PASSWORD: &str = "correct horse battery";

/// Session auth over plain http, open cat writes.
pub fn config() -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.cookie_secure = false;
    config
}

pub fn jwt_config() -> AppConfig {
    let mut config = config();
    config.auth.strategy = AuthStrategy::Jwt;
    config
}

/// In-memory state with a cheap password hash.
pub fn state(config: AppConfig) -> web::Data<AppState> {
    state_with(config, Repositories::in_memory())
}

/// State over the given repositories, so tests can reach storage directly.
pub fn state_with(config: AppConfig, repos: Repositories) -> web::Data<AppState> {
    let passwords = Argon2PasswordService::with_cost(1024, 1).expect("valid argon2 params");
    web::Data::new(AppState::from_parts(config, repos, Arc::new(passwords)))
}

pub fn register(username: &str) -> TestRequest {
    TestRequest::post().uri("/auth/register").set_json(json!({
        "username": username,
        "email": format!("{}@example.com", username),
        "password": PASSWORD,
    }))
}

pub fn login(username: &str) -> TestRequest {
    TestRequest::post().uri("/auth/login").set_json(json!({
        "username": username,
        "password": PASSWORD,
    }))
}

pub fn new_cat(name: &str) -> TestRequest {
    TestRequest::post()
        .uri("/cats")
        .set_json(json!({ "name": name, "tag": "tabby" }))
}

/// The session cookie set by a response.
pub fn session_cookie<B>(res: &ServiceResponse<B>) -> Cookie<'static> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == SESSION_COOKIE)
        .map(|cookie| cookie.into_owned())
        .expect("response sets the session cookie")
}
