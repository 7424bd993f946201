//! HTTP handlers and route configuration.

mod adoptions;
mod auth;
mod cats;
mod health;

use actix_web::web;

use crate::extract;

/// Configure all application routes.
///
/// Every route is served at the root and mirrored under `/api`.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(extract::path_config())
        .app_data(extract::query_config())
        .app_data(extract::json_config())
        .service(web::scope("/api").configure(api_routes))
        .configure(api_routes);
}

fn api_routes(cfg: &mut web::ServiceConfig) {
    cfg
        // Public routes
        .route("/health", web::get().to(health::health_check))
        .service(
            web::resource("/cats")
                .route(web::get().to(cats::list_cats))
                .route(web::post().to(cats::create_cat)),
        )
        .service(
            web::resource("/cats/{id}")
                .route(web::get().to(cats::get_cat))
                .route(web::put().to(cats::update_cat))
                .route(web::delete().to(cats::delete_cat)),
        )
        // Auth routes
        .service(
            web::scope("/auth")
                .route("/register", web::post().to(auth::register))
                .route("/login", web::post().to(auth::login))
                .route("/logout", web::post().to(auth::logout))
                .route("/me", web::get().to(auth::me)),
        )
        .service(
            web::scope("/users")
                .route("/signup", web::post().to(auth::register))
                .route("/login", web::post().to(auth::login)),
        )
        // Per-user routes
        .service(
            web::resource("/adoptions")
                .route(web::get().to(adoptions::list_adoptions))
                .route(web::post().to(adoptions::adopt_cat)),
        )
        .route(
            "/adoptions/{cat_id}",
            web::delete().to(adoptions::release_cat),
        );
}
