//! Authentication extractors and session cookie helpers.

use actix_web::cookie::{Cookie, SameSite, time::Duration as CookieDuration};
use actix_web::{FromRequest, HttpRequest, HttpResponse, ResponseError, dev::Payload, http::header, web};
use futures::future::LocalBoxFuture;

use cattery_core::domain::UserIdentity;
use cattery_core::ports::AuthError;

use crate::middleware::error::AppError;
use crate::state::AppState;

/// Name of the cookie carrying the session id.
pub const SESSION_COOKIE: &str = "session_id";

/// Build the session cookie handed out at login.
pub fn session_cookie(value: String, secure: bool, max_age_secs: i64) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, value)
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::seconds(max_age_secs.max(0)))
        .finish()
}

/// A cookie that tells the browser to drop the session cookie.
pub fn removal_cookie(secure: bool) -> Cookie<'static> {
    let mut cookie = session_cookie(String::new(), secure, 0);
    cookie.make_removal();
    cookie
}

/// Where a presented credential came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    AuthorizationHeader,
    Cookie,
}

/// Every credential presented with a request: `Authorization: Bearer` first, then the cookie.
pub fn presented_credentials(req: &HttpRequest) -> Vec<(String, CredentialSource)> {
    let bearer = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| (token.to_string(), CredentialSource::AuthorizationHeader));

    let cookie = req
        .cookie(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
        .map(|value| (value, CredentialSource::Cookie));

    bearer.into_iter().chain(cookie).collect()
}

/// The credential used to authenticate a request.
pub fn presented_credential(req: &HttpRequest) -> Option<(String, CredentialSource)> {
    presented_credentials(req).into_iter().next()
}

/// Authenticated user identity extractor.
///
/// Use this in handlers to require authentication:
/// ```ignore
/// async fn protected_route(identity: Identity) -> impl Responder {
///     format!("Hello, {}!", identity.0.username)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Identity(pub UserIdentity);

impl Identity {
    pub fn user_id(&self) -> i32 {
        self.0.id
    }
}

/// Error type for authentication failures.
///
/// A rejected cookie is cleared in the same response.
#[derive(Debug)]
pub struct AuthenticationError {
    error: AppError,
    clear_cookie: Option<Cookie<'static>>,
}

impl AuthenticationError {
    fn new(error: AuthError, clear_cookie: Option<Cookie<'static>>) -> Self {
        Self {
            error: error.into(),
            clear_cookie,
        }
    }

    pub fn app_error(&self) -> &AppError {
        &self.error
    }
}

impl std::fmt::Display for AuthenticationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl ResponseError for AuthenticationError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        self.error.status_code()
    }

    fn error_response(&self) -> HttpResponse {
        let mut response = HttpResponse::build(self.status_code());
        if let Some(cookie) = &self.clear_cookie {
            response.cookie(cookie.clone());
        }
        response.json(self.error.body())
    }
}

impl FromRequest for Identity {
    type Error = AuthenticationError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<AppState>>().cloned();
        let credential = presented_credential(req);

        Box::pin(async move {
            let Some(state) = state else {
                tracing::error!("AppState not found in app data");
                return Err(AuthenticationError::new(
                    AuthError::Storage("Server configuration error".to_string()),
                    None,
                ));
            };

            let Some((credential, source)) = credential else {
                return Err(AuthenticationError::new(AuthError::MissingAuth, None));
            };

            match state.auth.authenticate(&credential).await {
                Ok(user) => Ok(Identity(user)),
                Err(e) => {
                    tracing::debug!(error = %e, ?source, "Credential rejected");
                    let clear = matches!(source, CredentialSource::Cookie)
                        && !matches!(e, AuthError::Storage(_) | AuthError::HashingError(_));
                    let cookie = clear.then(|| removal_cookie(state.config.auth.cookie_secure));
                    Err(AuthenticationError::new(e, cookie))
                }
            }
        })
    }
}

/// Identity for cat writes.
///
/// Demands a valid credential only when the deployment protects cat writes;
/// otherwise it records the caller when one is known.
pub struct WriteAccess(pub Option<Identity>);

impl WriteAccess {
    pub fn user_id(&self) -> Option<i32> {
        self.0.as_ref().map(Identity::user_id)
    }
}

impl FromRequest for WriteAccess {
    type Error = AuthenticationError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let required = req
            .app_data::<web::Data<AppState>>()
            .map(|state| state.config.cats.write_requires_auth)
            .unwrap_or(false);
        let identity = Identity::from_request(req, payload);

        Box::pin(async move {
            match identity.await {
                Ok(identity) => Ok(WriteAccess(Some(identity))),
                Err(e) if required => Err(e),
                Err(_) => Ok(WriteAccess(None)),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn bearer_header_wins_over_cookie() {
        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Bearer abc.def.ghi"))
            .cookie(Cookie::new(SESSION_COOKIE, "cafebabe"))
            .to_http_request();

        assert_eq!(
            presented_credential(&req),
            Some(("abc.def.ghi".to_string(), CredentialSource::AuthorizationHeader))
        );
    }

    #[test]
    fn falls_back_to_session_cookie() {
        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Basic dXNlcjpwYXNz"))
            .cookie(Cookie::new(SESSION_COOKIE, "cafebabe"))
            .to_http_request();

        assert_eq!(
            presented_credential(&req),
            Some(("cafebabe".to_string(), CredentialSource::Cookie))
        );
        assert_eq!(presented_credential(&TestRequest::default().to_http_request()), None);
    }

    #[test]
    fn lists_header_and_cookie_credentials() {
        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Bearer stale-token"))
            .cookie(Cookie::new(SESSION_COOKIE, "cafebabe"))
            .to_http_request();

        assert_eq!(
            presented_credentials(&req),
            vec![
                ("stale-token".to_string(), CredentialSource::AuthorizationHeader),
                ("cafebabe".to_string(), CredentialSource::Cookie),
            ]
        );
    }

    #[test]
    fn session_cookie_attributes() {
        let cookie = session_cookie("abc".into(), true, 7 * 24 * 3600);

        assert!(cookie.http_only().unwrap_or(false));
        assert!(cookie.secure().unwrap_or(false));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(CookieDuration::days(7)));

        let removal = removal_cookie(true);
        assert_eq!(removal.value(), "");
        assert_eq!(removal.max_age(), Some(CookieDuration::ZERO));
    }
}
