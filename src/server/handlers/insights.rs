use axum::extract::{Extension, Json, Path};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::Error;
use crate::server::DynAPI;

pub async fn driver_earnings(
    Extension(api): Extension<DynAPI>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, Error> {
    let report = api.driver_earnings(user, id).await?;

    Ok(Json(json!({
        "success": true,
        "earnings": report.earnings,
        "transactions": report.transactions,
    })))
}

pub async fn driver_performance(
    Extension(api): Extension<DynAPI>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, Error> {
    let report = api.driver_performance(user, id).await?;

    Ok(Json(json!({
        "success": true,
        "performance": report.performance,
        "reviews": report.reviews,
    })))
}

pub async fn shipper_billing(
    Extension(api): Extension<DynAPI>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, Error> {
    let report = api.shipper_billing(user, id).await?;

    Ok(Json(json!({
        "success": true,
        "count": report.summary.shipment_count,
        "summary": report.summary,
        "shipments": report.shipments,
    })))
}

pub async fn migrate_payments(
    Extension(api): Extension<DynAPI>,
    user: AuthUser,
) -> Result<Json<Value>, Error> {
    let modified = api.migrate_payments(user).await?;

    Ok(Json(json!({
        "success": true,
        "message": "updated completed shipments",
        "modified": modified,
    })))
}
