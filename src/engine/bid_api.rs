use super::helpers::{fetch_bid_for_update, fetch_shipment_for_update, insert_trip, update_bid, update_shipment};
use super::Engine;

use async_trait::async_trait;
use sqlx::{types::Json, Acquire, Executor, Row};
use uuid::Uuid;

use crate::{
    api::BidAPI,
    auth::{AuthUser, Role},
    entities::{Bid, BidStatus, Trip, User},
    error::{forbidden_error, invalid_state_error, not_found_error, Error},
};

#[async_trait]
impl BidAPI for Engine {
    #[tracing::instrument(skip(self, message))]
    async fn submit_bid(
        &self,
        user: AuthUser,
        shipment_id: Uuid,
        amount: i64,
        message: String,
    ) -> Result<Bid, Error> {
        user.require_role(Role::Driver)?;

        let mut conn = self.pool.acquire().await?;

        let Json(driver): Json<User> = conn
            .fetch_optional(sqlx::query("SELECT data FROM users WHERE id = $1").bind(&user.id))
            .await?
            .ok_or_else(not_found_error)?
            .try_get("data")?;

        // lock the shipment so an acceptance running concurrently cannot
        // close bidding between the check and the insert
        let mut tx = conn.begin().await?;

        let shipment = fetch_shipment_for_update(&mut tx, &shipment_id).await?;

        if !shipment.is_pending_bids() {
            return Err(invalid_state_error());
        }

        let bid = Bid::new(shipment_id, &driver, amount, message)?;

        tx.execute(
            sqlx::query(
                "INSERT INTO bids (id, shipment_id, driver_id, status, data) VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(&bid.id)
            .bind(&bid.shipment_id)
            .bind(&bid.driver_id)
            .bind(bid.status.name())
            .bind(Json(&bid)),
        )
        .await?;

        tx.commit().await?;

        tracing::info!(bid = %bid.id, shipment = %shipment_id, amount, "bid placed");

        Ok(bid)
    }

    #[tracing::instrument(skip(self))]
    async fn bids_for_shipment(
        &self,
        _user: AuthUser,
        shipment_id: Uuid,
    ) -> Result<Vec<Bid>, Error> {
        let mut conn = self.pool.acquire().await?;

        let rows = conn
            .fetch_all(sqlx::query("SELECT data FROM bids WHERE shipment_id = $1").bind(&shipment_id))
            .await?;

        let mut bids = Vec::with_capacity(rows.len());
        for row in rows {
            let Json(bid): Json<Bid> = row.try_get("data")?;
            bids.push(bid);
        }

        // cheapest first, oldest breaking ties
        bids.sort_by(|a, b| {
            a.amount
                .cmp(&b.amount)
                .then_with(|| a.created_at.cmp(&b.created_at))
        });

        Ok(bids)
    }

    #[tracing::instrument(skip(self))]
    async fn bids_for_driver(&self, user: AuthUser, driver_id: Uuid) -> Result<Vec<Bid>, Error> {
        user.require_self(driver_id)?;

        let mut conn = self.pool.acquire().await?;

        let rows = conn
            .fetch_all(sqlx::query("SELECT data FROM bids WHERE driver_id = $1").bind(&driver_id))
            .await?;

        let mut bids = Vec::with_capacity(rows.len());
        for row in rows {
            let Json(bid): Json<Bid> = row.try_get("data")?;
            bids.push(bid);
        }

        bids.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(bids)
    }

    /// Accepts one bid and settles the whole auction in a single
    /// transaction: the chosen bid, its siblings, the shipment and the
    /// new trip either all commit or none do. The shipment's
    /// `pending_bids` precondition makes the operation safe to retry
    /// and rejects a second acceptance outright.
    #[tracing::instrument(skip(self))]
    async fn accept_bid(&self, user: AuthUser, id: Uuid) -> Result<(Bid, Trip), Error> {
        user.require_role(Role::Shipper)?;

        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await?;

        let mut bid = fetch_bid_for_update(&mut tx, &id).await?;
        let mut shipment = fetch_shipment_for_update(&mut tx, &bid.shipment_id).await?;

        // only the shipment's owner may decide its auction
        if shipment.shipper_id != user.id {
            return Err(forbidden_error());
        }

        bid.accept()?;
        shipment.assign_driver(bid.driver_id, bid.amount)?;

        update_bid(&mut tx, &bid).await?;
        update_shipment(&mut tx, &shipment).await?;

        let rows = tx
            .fetch_all(
                sqlx::query(
                    "SELECT data FROM bids WHERE shipment_id = $1 AND id <> $2 AND status = $3 FOR UPDATE",
                )
                .bind(&shipment.id)
                .bind(&bid.id)
                .bind(BidStatus::Pending.name()),
            )
            .await?;

        for row in rows {
            let Json(mut sibling): Json<Bid> = row.try_get("data")?;
            sibling.reject()?;

            update_bid(&mut tx, &sibling).await?;
        }

        let trip = Trip::new(shipment.id, bid.driver_id, shipment.shipper_id);
        insert_trip(&mut tx, &trip).await?;

        tx.commit().await?;

        tracing::info!(bid = %bid.id, trip = %trip.id, shipment = %shipment.id, "bid accepted");

        Ok((bid, trip))
    }
}
