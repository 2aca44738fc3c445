use axum::{http::Method, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod accounts;
pub mod admin;
pub mod airlines;
pub mod airports;
pub mod auth;
pub mod error;
pub mod flights;
pub mod health;
pub mod middleware;
pub mod orders;
pub mod params;
pub mod schedules;
pub mod state;
pub mod whitelist;

pub use state::{AppState, AuthConfig, Repositories};

pub fn app(state: AppState) -> Router {
    // CORS Middleware
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::USER_AGENT,
        ]);

    let api = Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(airlines::routes())
        .merge(airports::routes())
        .merge(schedules::routes())
        .merge(flights::routes())
        .merge(orders::routes())
        .merge(admin::routes())
        .merge(whitelist::routes());

    Router::new()
        .nest("/api", api)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::authenticate,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
