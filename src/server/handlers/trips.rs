use axum::extract::{Extension, Json, Path};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::entities::ShipmentStatus;
use crate::error::Error;
use crate::server::DynAPI;

#[derive(Serialize, Deserialize)]
pub struct UpdateStatusParams {
    status: ShipmentStatus,
}

pub async fn for_driver(
    Extension(api): Extension<DynAPI>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, Error> {
    let trips = api.trips_for_driver(user, id).await?;

    Ok(Json(json!({
        "success": true,
        "count": trips.len(),
        "trips": trips,
    })))
}

pub async fn update_status(
    Extension(api): Extension<DynAPI>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(params): Json<UpdateStatusParams>,
) -> Result<Json<Value>, Error> {
    let shipment = api.update_trip_status(user, id, params.status).await?;

    Ok(Json(json!({
        "success": true,
        "message": "status updated",
        "shipment": shipment,
    })))
}
