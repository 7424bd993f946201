//! Adoption handlers. Every route acts on the authenticated user's adoptions.

use actix_web::{HttpResponse, web};

use cattery_shared::dto::{
    AdoptionCreated, AdoptionList, AdoptionRequest, AdoptionResponse, MessageResponse,
};

use crate::extract::Body;
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /adoptions
pub async fn list_adoptions(
    state: web::Data<AppState>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let adoptions = state.adoptions.list(identity.user_id()).await?;

    Ok(HttpResponse::Ok().json(AdoptionList {
        adoptions: adoptions.into_iter().map(AdoptionResponse::from).collect(),
    }))
}

/// POST /adoptions
pub async fn adopt_cat(
    state: web::Data<AppState>,
    identity: Identity,
    body: Body<AdoptionRequest>,
) -> AppResult<HttpResponse> {
    let request = body.into_inner();
    let cat_id = match &request.cat_id {
        None => return Err(AppError::bad_request("cat_id is required")),
        Some(raw) => raw
            .positive()
            .ok_or_else(|| AppError::bad_request("cat_id must be a positive integer"))?,
    };

    let adopted = state.adoptions.adopt(identity.user_id(), cat_id).await?;

    Ok(HttpResponse::Created().json(AdoptionCreated {
        message: "Cat adopted successfully".to_string(),
        id: adopted.adoption.id,
        cat: adopted.cat,
    }))
}

/// DELETE /adoptions/{cat_id}
pub async fn release_cat(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    state
        .adoptions
        .release(identity.user_id(), path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("Adoption removed successfully")))
}
