use super::Database;

use sqlx::{types::Json, Executor, Row, Transaction};
use uuid::Uuid;

use crate::{
    entities::{Bid, Shipment, Trip, User},
    error::{not_found_error, Error},
};

#[tracing::instrument(skip(tx))]
pub async fn fetch_user_for_update(
    tx: &mut Transaction<'_, Database>,
    id: &Uuid,
) -> Result<User, Error> {
    let Json(user): Json<User> = tx
        .fetch_optional(sqlx::query("SELECT data FROM users WHERE id = $1 FOR UPDATE").bind(id))
        .await?
        .ok_or_else(not_found_error)?
        .try_get("data")?;

    Ok(user)
}

#[tracing::instrument(skip(tx))]
pub async fn fetch_shipment_for_update(
    tx: &mut Transaction<'_, Database>,
    id: &Uuid,
) -> Result<Shipment, Error> {
    let Json(shipment): Json<Shipment> = tx
        .fetch_optional(sqlx::query("SELECT data FROM shipments WHERE id = $1 FOR UPDATE").bind(id))
        .await?
        .ok_or_else(not_found_error)?
        .try_get("data")?;

    Ok(shipment)
}

#[tracing::instrument(skip(tx))]
pub async fn fetch_bid_for_update(
    tx: &mut Transaction<'_, Database>,
    id: &Uuid,
) -> Result<Bid, Error> {
    let Json(bid): Json<Bid> = tx
        .fetch_optional(sqlx::query("SELECT data FROM bids WHERE id = $1 FOR UPDATE").bind(id))
        .await?
        .ok_or_else(not_found_error)?
        .try_get("data")?;

    Ok(bid)
}

#[tracing::instrument(skip(tx))]
pub async fn fetch_trip_by_shipment_for_update(
    tx: &mut Transaction<'_, Database>,
    shipment_id: &Uuid,
) -> Result<Option<Trip>, Error> {
    let maybe_result = tx
        .fetch_optional(
            sqlx::query("SELECT data FROM trips WHERE shipment_id = $1 FOR UPDATE")
                .bind(shipment_id),
        )
        .await?;

    match maybe_result {
        Some(result) => {
            let Json(trip): Json<Trip> = result.try_get("data")?;
            Ok(Some(trip))
        }
        None => Ok(None),
    }
}

#[tracing::instrument(skip(tx))]
pub async fn update_user(tx: &mut Transaction<'_, Database>, user: &User) -> Result<(), Error> {
    tx.execute(
        sqlx::query("UPDATE users SET data = $2 WHERE id = $1")
            .bind(&user.id)
            .bind(Json(user)),
    )
    .await?;

    Ok(())
}

#[tracing::instrument(skip(tx))]
pub async fn update_shipment(
    tx: &mut Transaction<'_, Database>,
    shipment: &Shipment,
) -> Result<(), Error> {
    tx.execute(
        sqlx::query("UPDATE shipments SET status = $2, data = $3 WHERE id = $1")
            .bind(&shipment.id)
            .bind(shipment.status.name())
            .bind(Json(shipment)),
    )
    .await?;

    Ok(())
}

#[tracing::instrument(skip(tx))]
pub async fn update_bid(tx: &mut Transaction<'_, Database>, bid: &Bid) -> Result<(), Error> {
    tx.execute(
        sqlx::query("UPDATE bids SET status = $2, data = $3 WHERE id = $1")
            .bind(&bid.id)
            .bind(bid.status.name())
            .bind(Json(bid)),
    )
    .await?;

    Ok(())
}

#[tracing::instrument(skip(tx))]
pub async fn update_trip(tx: &mut Transaction<'_, Database>, trip: &Trip) -> Result<(), Error> {
    tx.execute(
        sqlx::query("UPDATE trips SET status = $2, data = $3 WHERE id = $1")
            .bind(&trip.id)
            .bind(trip.status.name())
            .bind(Json(trip)),
    )
    .await?;

    Ok(())
}

#[tracing::instrument(skip(tx))]
pub async fn insert_trip(tx: &mut Transaction<'_, Database>, trip: &Trip) -> Result<(), Error> {
    tx.execute(
        sqlx::query(
            "INSERT INTO trips (id, shipment_id, driver_id, status, data) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&trip.id)
        .bind(&trip.shipment_id)
        .bind(&trip.driver_id)
        .bind(trip.status.name())
        .bind(Json(trip)),
    )
    .await?;

    Ok(())
}
