use axum::extract::{Extension, Json, Path};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::{AuthUser, Role};
use crate::entities::{ProfileUpdate, Registration};
use crate::error::Error;
use crate::server::DynAPI;

#[derive(Serialize, Deserialize)]
pub struct LoginParams {
    email: String,
    password: String,
    role: Role,
}

pub async fn register(
    Extension(api): Extension<DynAPI>,
    Json(params): Json<Registration>,
) -> Result<Json<Value>, Error> {
    let (user, token) = api.register(params).await?;

    Ok(Json(json!({
        "success": true,
        "message": "registration successful",
        "token": token,
        "user": user,
    })))
}

pub async fn login(
    Extension(api): Extension<DynAPI>,
    Json(params): Json<LoginParams>,
) -> Result<Json<Value>, Error> {
    let (user, token) = api.login(params.email, params.password, params.role).await?;

    Ok(Json(json!({
        "success": true,
        "message": "login successful",
        "token": token,
        "user": user,
    })))
}

pub async fn update_profile(
    Extension(api): Extension<DynAPI>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(changes): Json<ProfileUpdate>,
) -> Result<Json<Value>, Error> {
    let profile = api.update_profile(user, id, changes).await?;

    Ok(Json(json!({
        "success": true,
        "user": profile,
    })))
}
