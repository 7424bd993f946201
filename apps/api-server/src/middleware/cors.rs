//! CORS middleware - reflects the caller's origin and answers preflights.

use actix_web::{
    Error, HttpResponse,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::{
        Method,
        header::{self, HeaderMap, HeaderValue},
    },
};
use std::future::{Future, Ready, ready};
use std::pin::Pin;
use std::rc::Rc;

const ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
const ALLOWED_HEADERS: &str = "Content-Type, Authorization";

/// Middleware adding CORS headers to every response.
///
/// An allowed `Origin` is echoed back together with
/// `Access-Control-Allow-Credentials: true`, so browsers send the session
/// cookie. An empty allow-list allows every origin; an origin outside a
/// non-empty list gets no CORS headers. Without an `Origin` header, `*` is
/// used. `OPTIONS` requests never reach the handlers and are answered with 200.
#[derive(Debug, Clone, Default)]
pub struct Cors {
    allowed_origins: Rc<[String]>,
}

impl Cors {
    pub fn new(allowed_origins: Vec<String>) -> Self {
        Self {
            allowed_origins: allowed_origins.into(),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for Cors
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = CorsService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(CorsService {
            service,
            allowed_origins: self.allowed_origins.clone(),
        }))
    }
}

pub struct CorsService<S> {
    service: S,
    allowed_origins: Rc<[String]>,
}

impl<S> CorsService<S> {
    fn permits(&self, origin: &HeaderValue) -> bool {
        self.allowed_origins.is_empty()
            || origin
                .to_str()
                .is_ok_and(|origin| self.allowed_origins.iter().any(|allowed| allowed == origin))
    }
}

impl<S, B> Service<ServiceRequest> for CorsService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let origin = match req.headers().get(header::ORIGIN) {
            None => Origin::Absent,
            Some(origin) if self.permits(origin) => Origin::Allowed(origin.clone()),
            Some(_) => Origin::Rejected,
        };

        if req.method() == Method::OPTIONS {
            let mut res = HttpResponse::Ok().finish();
            apply_cors_headers(res.headers_mut(), &origin);
            return Box::pin(ready(Ok(req.into_response(res).map_into_right_body())));
        }

        let fut = self.service.call(req);

        Box::pin(async move {
            let mut res = fut.await?;
            apply_cors_headers(res.headers_mut(), &origin);
            Ok(res.map_into_left_body())
        })
    }
}

enum Origin {
    Absent,
    Allowed(HeaderValue),
    Rejected,
}

fn apply_cors_headers(headers: &mut HeaderMap, origin: &Origin) {
    match origin {
        Origin::Rejected => {
            headers.insert(header::VARY, HeaderValue::from_static("Origin"));
            return;
        }
        Origin::Allowed(origin) => {
            headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
            headers.insert(
                header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
                HeaderValue::from_static("true"),
            );
            headers.insert(header::VARY, HeaderValue::from_static("Origin"));
        }
        Origin::Absent => {
            headers.insert(
                header::ACCESS_CONTROL_ALLOW_ORIGIN,
                HeaderValue::from_static("*"),
            );
        }
    }

    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOWED_HEADERS),
    );
}
