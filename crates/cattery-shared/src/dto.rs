//! Data Transfer Objects - request/response types for the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cattery_core::domain::{AdoptedCat, Cat, Pagination, UserIdentity};

/// Plain `{"message": "..."}` acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Response to a successful insert: `{"message": "...", "id": 1}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub message: String,
    pub id: i32,
}

/// Query string of `GET /cats`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl CatListQuery {
    /// Whether the caller asked for the paginated shape.
    pub fn is_paginated(&self) -> bool {
        self.page.is_some() || self.limit.is_some()
    }
}

/// Paginated cat listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatPage {
    pub cats: Vec<Cat>,
    pub pagination: Pagination,
}

/// Response to a successful login.
///
/// `token` is only present when bearer tokens are in use; session logins
/// carry their credential in a cookie instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub message: String,
    pub user: UserIdentity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// `GET /auth/me`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUserResponse {
    pub user: UserIdentity,
}

/// A cat id as it arrives in a body: JSON number or (form) numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdInput {
    Number(i64),
    Text(String),
}

impl IdInput {
    /// The id as a positive `i32`, if it is one.
    pub fn positive(&self) -> Option<i32> {
        let raw = match self {
            IdInput::Number(n) => *n,
            IdInput::Text(s) => s.trim().parse().ok()?,
        };
        i32::try_from(raw).ok().filter(|id| *id > 0)
    }
}

/// `POST /adoptions` body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdoptionRequest {
    #[serde(default)]
    pub cat_id: Option<IdInput>,
}

/// One adoption joined with its cat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdoptionResponse {
    pub id: i32,
    pub cat_id: i32,
    pub adopted_at: DateTime<Utc>,
    pub cat: Cat,
}

impl From<AdoptedCat> for AdoptionResponse {
    fn from(adopted: AdoptedCat) -> Self {
        Self {
            id: adopted.adoption.id,
            cat_id: adopted.adoption.cat_id,
            adopted_at: adopted.adoption.adopted_at,
            cat: adopted.cat,
        }
    }
}

/// `GET /adoptions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdoptionList {
    pub adoptions: Vec<AdoptionResponse>,
}

/// Response to a successful adoption.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdoptionCreated {
    pub message: String,
    pub id: i32,
    pub cat: Cat,
}

/// `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}
