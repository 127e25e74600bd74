use axum::extract::{Extension, Json, Path};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::Error;
use crate::server::DynAPI;

#[derive(Serialize, Deserialize)]
pub struct SendMessageParams {
    message: String,
}

pub async fn list(
    Extension(api): Extension<DynAPI>,
    user: AuthUser,
    Path(shipment_id): Path<Uuid>,
) -> Result<Json<Value>, Error> {
    let messages = api.shipment_messages(user, shipment_id).await?;

    Ok(Json(json!({
        "success": true,
        "count": messages.len(),
        "messages": messages,
    })))
}

pub async fn create(
    Extension(api): Extension<DynAPI>,
    user: AuthUser,
    Path(shipment_id): Path<Uuid>,
    Json(params): Json<SendMessageParams>,
) -> Result<Json<Value>, Error> {
    let message = api.post_message(user, shipment_id, params.message).await?;

    Ok(Json(json!({
        "success": true,
        "message": "message sent successfully",
        "data": message,
    })))
}
