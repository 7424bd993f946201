//! Request body and parameter extraction with `{error}`-shaped rejections.

use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload, web};
use futures::future::LocalBoxFuture;
use serde::de::DeserializeOwned;

use crate::middleware::error::AppError;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Request body accepted as a url-encoded form or as JSON.
///
/// `application/x-www-form-urlencoded` bodies are parsed as forms; anything
/// else is parsed as JSON. Parse failures become 400 responses.
#[derive(Debug)]
pub struct Body<T>(pub T);

impl<T> Body<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> FromRequest for Body<T>
where
    T: DeserializeOwned + 'static,
{
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        if req.content_type() == FORM_CONTENT_TYPE {
            let form = web::Form::<T>::from_request(req, payload);
            Box::pin(async move {
                form.await
                    .map(|form| Body(form.into_inner()))
                    .map_err(|e| AppError::bad_request(format!("Invalid form body: {}", e)))
            })
        } else {
            let json = web::Json::<T>::from_request(req, payload);
            Box::pin(async move {
                json.await
                    .map(|json| Body(json.into_inner()))
                    .map_err(|e| AppError::bad_request(format!("Invalid JSON body: {}", e)))
            })
        }
    }
}

/// Malformed path segments (e.g. `/cats/abc`) are a 400.
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|err, _req| AppError::bad_request(format!("Invalid path: {}", err)).into())
}

/// Malformed query strings (e.g. `?page=abc`) are a 400.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| AppError::bad_request(format!("Invalid query: {}", err)).into())
}

/// JSON bodies are parsed regardless of a missing or odd content type.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().content_type_required(false)
}
