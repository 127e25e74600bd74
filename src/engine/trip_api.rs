use super::helpers::{
    fetch_shipment_for_update, fetch_trip_by_shipment_for_update, fetch_user_for_update,
    insert_trip, update_shipment, update_trip, update_user,
};
use super::Engine;

use async_trait::async_trait;
use sqlx::{types::Json, Acquire, Executor, Row};
use uuid::Uuid;

use crate::{
    api::TripAPI,
    auth::AuthUser,
    entities::{Bid, BidStatus, DriverTrip, Shipment, ShipmentStatus, Trip},
    error::{forbidden_error, Error},
};

#[async_trait]
impl TripAPI for Engine {
    /// A driver's engagements are derived from their accepted bids, each
    /// joined with the shipment it won.
    #[tracing::instrument(skip(self))]
    async fn trips_for_driver(
        &self,
        user: AuthUser,
        driver_id: Uuid,
    ) -> Result<Vec<DriverTrip>, Error> {
        user.require_self(driver_id)?;

        let mut conn = self.pool.acquire().await?;

        let rows = conn
            .fetch_all(
                sqlx::query("SELECT data FROM bids WHERE driver_id = $1 AND status = $2")
                    .bind(&driver_id)
                    .bind(BidStatus::Accepted.name()),
            )
            .await?;

        let mut bids = Vec::with_capacity(rows.len());
        for row in rows {
            let Json(bid): Json<Bid> = row.try_get("data")?;
            bids.push(bid);
        }

        let mut trips = Vec::with_capacity(bids.len());
        for bid in bids {
            let maybe_result = conn
                .fetch_optional(
                    sqlx::query("SELECT data FROM shipments WHERE id = $1").bind(&bid.shipment_id),
                )
                .await?;

            // skip bids whose shipment has vanished
            if let Some(result) = maybe_result {
                let Json(shipment): Json<Shipment> = result.try_get("data")?;

                trips.push(DriverTrip {
                    shipment,
                    bid_id: bid.id,
                    bid_amount: bid.amount,
                });
            }
        }

        trips.sort_by(|a, b| b.shipment.created_at.cmp(&a.shipment.created_at));

        Ok(trips)
    }

    /// Moves a shipment along its delivery lifecycle. Completion also
    /// settles the engagement: the trip record flips to completed (it is
    /// recreated first if missing) and the driver's trip counter is
    /// incremented, all inside the same transaction as the status write.
    #[tracing::instrument(skip(self))]
    async fn update_trip_status(
        &self,
        user: AuthUser,
        shipment_id: Uuid,
        status: ShipmentStatus,
    ) -> Result<Shipment, Error> {
        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await?;

        let mut shipment = fetch_shipment_for_update(&mut tx, &shipment_id).await?;

        // participants only
        if user.id != shipment.shipper_id && Some(user.id) != shipment.selected_driver_id {
            return Err(forbidden_error());
        }

        shipment.advance(status)?;

        update_shipment(&mut tx, &shipment).await?;

        let maybe_trip = fetch_trip_by_shipment_for_update(&mut tx, &shipment_id).await?;

        match maybe_trip {
            Some(mut trip) => {
                match status {
                    ShipmentStatus::InTransit => trip.mark_in_transit()?,
                    ShipmentStatus::Completed => trip.complete()?,
                    ShipmentStatus::Cancelled => trip.cancel()?,
                    _ => {}
                }

                update_trip(&mut tx, &trip).await?;
            }
            None => {
                if status == ShipmentStatus::Completed {
                    if let Some(driver_id) = shipment.selected_driver_id {
                        let mut trip = Trip::new(shipment.id, driver_id, shipment.shipper_id);
                        trip.complete()?;

                        insert_trip(&mut tx, &trip).await?;
                    }
                }
            }
        }

        if status == ShipmentStatus::Completed {
            if let Some(driver_id) = shipment.selected_driver_id {
                let mut driver = fetch_user_for_update(&mut tx, &driver_id).await?;
                driver.record_completed_trip();

                update_user(&mut tx, &driver).await?;
            }
        }

        tx.commit().await?;

        tracing::info!(shipment = %shipment.id, status = %status.name(), "shipment status updated");

        Ok(shipment)
    }
}
