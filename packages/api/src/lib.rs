// ABOUTME: HTTP API layer for Procura providing REST endpoints and routing
// ABOUTME: Integration layer that depends on all domain packages

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

pub mod attachment_handlers;
pub mod auth;
pub mod auth_handlers;
pub mod error;
pub mod gate;
pub mod quote_handlers;
pub mod response;
pub mod rfq_handlers;
pub mod state;
pub mod subscription_handlers;
pub mod supplier_handlers;

pub use error::AppError;
pub use state::{AppState, AttachmentLimits};

/// Assemble the full API router with authentication and the subscription
/// gate applied to everything under `/api`.
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(subscription_handlers::health))
        .route("/auth/signup", post(auth_handlers::signup))
        .route("/auth/login", post(auth_handlers::login))
        .route("/auth/user-details", get(auth_handlers::user_details))
        .route(
            "/subscription-status",
            get(subscription_handlers::subscription_status),
        )
        .route("/suppliers", post(supplier_handlers::create_supplier))
        .route("/suppliers", get(supplier_handlers::list_suppliers))
        .route("/suppliers/categories", get(supplier_handlers::list_categories))
        .route("/suppliers/stats", get(supplier_handlers::supplier_stats))
        .route("/suppliers/import", post(supplier_handlers::import_suppliers))
        .route("/suppliers/{id}", put(supplier_handlers::update_supplier))
        .route("/suppliers/{id}", delete(supplier_handlers::delete_supplier))
        .route("/rfqs", post(rfq_handlers::create_rfq))
        .route("/rfqs", get(rfq_handlers::list_rfqs))
        .route("/rfqs/send-data-file", post(rfq_handlers::send_rfq_data_file))
        .route("/rfqs/uom", get(rfq_handlers::list_uoms))
        .route("/rfqs/products", get(rfq_handlers::list_products))
        .route("/rfqs/{id}/items", get(rfq_handlers::list_items))
        .route("/rfqs/{id}/metadata", get(rfq_handlers::rfq_metadata))
        .route("/rfqs/{id}/send-reminders", post(quote_handlers::send_reminders))
        .route(
            "/rfqs/items/{item_id}/quotes",
            get(quote_handlers::list_item_quotes),
        )
        .route(
            "/rfqs/items/{item_id}/place-order",
            post(quote_handlers::place_order),
        )
        .route(
            "/rfqs/items/{item_id}/unresponded",
            get(quote_handlers::unresponded_suppliers),
        )
        .route(
            "/rfqs/items/{item_id}/attachments",
            post(attachment_handlers::upload_attachment),
        )
        .route(
            "/rfqs/items/{item_id}/attachments",
            get(attachment_handlers::list_attachments),
        )
        .route(
            "/attachments/{id}/download",
            get(attachment_handlers::download_attachment),
        )
        .route("/attachments/{id}", delete(attachment_handlers::delete_attachment))
        .route(
            "/rfq-response/{rfq_id}/{supplier_id}",
            get(quote_handlers::response_page),
        )
        .route("/rfq-response", post(quote_handlers::submit_quote));

    // Layer order: auth resolves the identity first, then the gate reads it
    let body_limit = (state.limits.max_file_bytes as usize).saturating_add(64 * 1024);
    Router::new()
        .nest("/api", api)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            gate::subscription_gate,
        ))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
