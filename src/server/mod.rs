mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Extension, Json};
use axum::routing::{get, post, put};
use axum::Router;
use serde_json::{json, Value};

use crate::api::API;
use crate::auth::Tokens;
use crate::server::handlers::{auth, bids, insights, messages, shipments, trips};

pub type DynAPI = Arc<dyn API + Send + Sync>;

pub async fn serve<T: API + Sync + Send + 'static>(api: T, tokens: Tokens, addr: SocketAddr) {
    let api = Arc::new(api) as DynAPI;

    let app = Router::new()
        .route("/api/register", post(auth::register))
        .route("/api/login", post(auth::login))
        .route("/api/users/:id", put(auth::update_profile))
        .route("/api/shipments", post(shipments::create))
        .route("/api/shipments/available", get(shipments::available))
        .route("/api/shipments/user/:id", get(shipments::for_shipper))
        .route("/api/shipments/shipper/:id", get(insights::shipper_billing))
        .route("/api/shipments/:id/bids", get(bids::for_shipment))
        .route("/api/shipments/:id/rating", post(shipments::submit_rating))
        .route("/api/shipments/:id/payment", put(shipments::mark_paid))
        .route("/api/bids", post(bids::create))
        .route("/api/bids/driver/:id", get(bids::for_driver))
        .route("/api/bids/:id/accept", post(bids::accept))
        .route("/api/trips/driver/:id", get(trips::for_driver))
        .route("/api/trips/:id/status", put(trips::update_status))
        .route("/api/earnings/driver/:id", get(insights::driver_earnings))
        .route("/api/driver/:id/performance", get(insights::driver_performance))
        .route("/api/admin/migrate-payments", post(insights::migrate_payments))
        .route(
            "/api/messages/:shipment_id",
            get(messages::list).post(messages::create),
        )
        .route("/api/health", get(health))
        .layer(Extension(api))
        .layer(Extension(tokens));

    tracing::info!("listening on {}", addr);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await
        .unwrap();
}

async fn health() -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "server healthy",
    }))
}
