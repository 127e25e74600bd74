use axum::extract::{Extension, Json, Path};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::Error;
use crate::server::DynAPI;

#[derive(Serialize, Deserialize)]
pub struct PlaceBidParams {
    shipment_id: Uuid,
    bid_amount: i64,
    message: Option<String>,
}

pub async fn create(
    Extension(api): Extension<DynAPI>,
    user: AuthUser,
    Json(params): Json<PlaceBidParams>,
) -> Result<Json<Value>, Error> {
    let bid = api
        .submit_bid(
            user,
            params.shipment_id,
            params.bid_amount,
            params.message.unwrap_or_default(),
        )
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "bid placed successfully",
        "bid": bid,
    })))
}

pub async fn for_shipment(
    Extension(api): Extension<DynAPI>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, Error> {
    let bids = api.bids_for_shipment(user, id).await?;

    Ok(Json(json!({
        "success": true,
        "bids": bids,
    })))
}

pub async fn for_driver(
    Extension(api): Extension<DynAPI>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, Error> {
    let bids = api.bids_for_driver(user, id).await?;

    Ok(Json(json!({
        "success": true,
        "bids": bids,
    })))
}

pub async fn accept(
    Extension(api): Extension<DynAPI>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, Error> {
    let (bid, trip) = api.accept_bid(user, id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "bid accepted successfully",
        "bid": bid,
        "trip": trip,
    })))
}
