//! Authentication handlers.

use actix_web::{HttpRequest, HttpResponse, web};
use chrono::Utc;

use cattery_core::domain::{LoginDraft, RegistrationDraft, UserIdentity};
use cattery_core::ports::CredentialKind;
use cattery_shared::dto::{CreatedResponse, CurrentUserResponse, LoginResponse, MessageResponse};

use crate::extract::Body;
use crate::middleware::auth::{Identity, presented_credentials, removal_cookie, session_cookie};
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /auth/register (alias: POST /users/signup)
pub async fn register(
    state: web::Data<AppState>,
    body: Body<RegistrationDraft>,
) -> AppResult<HttpResponse> {
    let user = state.auth.register(body.into_inner()).await?;

    Ok(HttpResponse::Created().json(CreatedResponse {
        message: "User registered successfully".to_string(),
        id: user.id,
    }))
}

/// POST /auth/login (alias: POST /users/login)
pub async fn login(
    state: web::Data<AppState>,
    body: Body<LoginDraft>,
) -> AppResult<HttpResponse> {
    let (user, credential) = state.auth.login(body.into_inner()).await?;
    let user = UserIdentity::from(&user);

    match credential.kind {
        CredentialKind::SessionCookie => {
            let max_age = (credential.expires_at - Utc::now()).num_seconds();
            let cookie = session_cookie(credential.value, state.config.auth.cookie_secure, max_age);

            Ok(HttpResponse::Ok().cookie(cookie).json(LoginResponse {
                message: "Login successful".to_string(),
                user,
                token: None,
            }))
        }
        CredentialKind::BearerToken => Ok(HttpResponse::Ok().json(LoginResponse {
            message: "Login successful".to_string(),
            user,
            token: Some(credential.value),
        })),
    }
}

/// POST /auth/logout
///
/// Always succeeds. Every presented session is deleted and the cookie cleared.
pub async fn logout(state: web::Data<AppState>, req: HttpRequest) -> AppResult<HttpResponse> {
    for (credential, _) in presented_credentials(&req) {
        state.auth.logout(Some(&credential)).await?;
    }

    let mut response = HttpResponse::Ok();
    if state.auth.credential_kind() == CredentialKind::SessionCookie {
        response.cookie(removal_cookie(state.config.auth.cookie_secure));
    }

    Ok(response.json(MessageResponse::new("Logged out successfully")))
}

/// GET /auth/me - Protected route
pub async fn me(identity: Identity) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(CurrentUserResponse { user: identity.0 }))
}
