//! Cat CRUD handlers.

use actix_web::{HttpResponse, web};
use serde_json::{Map, Value};

use cattery_core::domain::{CatDraft, CatPatch, PageRequest};
use cattery_core::services::CatListing;
use cattery_shared::dto::{CatListQuery, CatPage, CreatedResponse, MessageResponse};

use crate::extract::Body;
use crate::middleware::auth::WriteAccess;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /cats
///
/// Without `page`/`limit` the whole table is returned as a plain array.
pub async fn list_cats(
    state: web::Data<AppState>,
    query: web::Query<CatListQuery>,
) -> AppResult<HttpResponse> {
    let query = query.into_inner();
    let page = if query.is_paginated() {
        Some(PageRequest::new(query.page, query.limit)?)
    } else {
        None
    };

    Ok(match state.cats.list(page).await? {
        CatListing::All(cats) => HttpResponse::Ok().json(cats),
        CatListing::Page { cats, pagination } => {
            HttpResponse::Ok().json(CatPage { cats, pagination })
        }
    })
}

/// GET /cats/{id}
pub async fn get_cat(state: web::Data<AppState>, path: web::Path<i32>) -> AppResult<HttpResponse> {
    let cat = state.cats.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(cat))
}

/// POST /cats
pub async fn create_cat(
    state: web::Data<AppState>,
    access: WriteAccess,
    body: Body<CatDraft>,
) -> AppResult<HttpResponse> {
    let cat = state.cats.create(body.into_inner()).await?;
    tracing::debug!(cat_id = cat.id, user_id = ?access.user_id(), "Cat added");

    Ok(HttpResponse::Created().json(CreatedResponse {
        message: "Cat added successfully".to_string(),
        id: cat.id,
    }))
}

/// PUT /cats/{id}
///
/// Only `name`, `tag` and `pfp` are updatable; other keys are ignored.
pub async fn update_cat(
    state: web::Data<AppState>,
    access: WriteAccess,
    path: web::Path<i32>,
    body: Body<Map<String, Value>>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let patch = CatPatch::from_fields(&body.into_inner())?;

    state.cats.update(id, &patch).await?;
    tracing::debug!(cat_id = id, fields = patch.len(), user_id = ?access.user_id(), "Cat updated");

    Ok(HttpResponse::Ok().json(MessageResponse::new(format!(
        "Record Num: {} updated successfully",
        id
    ))))
}

/// DELETE /cats/{id}
pub async fn delete_cat(
    state: web::Data<AppState>,
    access: WriteAccess,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    state.cats.delete(id).await?;
    tracing::debug!(cat_id = id, user_id = ?access.user_id(), "Cat deleted");

    Ok(HttpResponse::Ok().json(MessageResponse::new(format!(
        "Record Num: {} deleted successfully",
        id
    ))))
}
