use axum::extract::{Extension, Json, Path};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::entities::NewShipment;
use crate::error::Error;
use crate::server::DynAPI;

#[derive(Serialize, Deserialize)]
pub struct RatingParams {
    rating: u8,
    review: Option<String>,
}

pub async fn create(
    Extension(api): Extension<DynAPI>,
    user: AuthUser,
    Json(params): Json<NewShipment>,
) -> Result<Json<Value>, Error> {
    let shipment = api.create_shipment(user, params).await?;

    Ok(Json(json!({
        "success": true,
        "message": "shipment created successfully",
        "shipment": shipment,
    })))
}

pub async fn available(
    Extension(api): Extension<DynAPI>,
    user: AuthUser,
) -> Result<Json<Value>, Error> {
    let shipments = api.available_shipments(user).await?;

    Ok(Json(json!({
        "success": true,
        "shipments": shipments,
    })))
}

pub async fn for_shipper(
    Extension(api): Extension<DynAPI>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, Error> {
    let shipments = api.shipments_for_shipper(user, id).await?;

    Ok(Json(json!({
        "success": true,
        "count": shipments.len(),
        "shipments": shipments,
    })))
}

pub async fn submit_rating(
    Extension(api): Extension<DynAPI>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(params): Json<RatingParams>,
) -> Result<Json<Value>, Error> {
    let shipment = api
        .submit_rating(user, id, params.rating, params.review)
        .await?;

    Ok(Json(json!({
        "success": true,
        "shipment": shipment,
    })))
}

pub async fn mark_paid(
    Extension(api): Extension<DynAPI>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, Error> {
    let shipment = api.mark_paid(user, id).await?;

    Ok(Json(json!({
        "success": true,
        "shipment": shipment,
    })))
}
