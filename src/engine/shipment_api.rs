use super::helpers::{fetch_shipment_for_update, fetch_user_for_update, update_shipment, update_user};
use super::Engine;

use async_trait::async_trait;
use futures::TryStreamExt;
use sqlx::{types::Json, Acquire, Executor, Row};
use uuid::Uuid;

use crate::{
    api::ShipmentAPI,
    auth::{AuthUser, Role},
    entities::{NewShipment, Shipment, ShipmentStatus},
    error::{forbidden_error, Error},
};

#[async_trait]
impl ShipmentAPI for Engine {
    #[tracing::instrument(skip(self, params))]
    async fn create_shipment(
        &self,
        user: AuthUser,
        params: NewShipment,
    ) -> Result<Shipment, Error> {
        user.require_role(Role::Shipper)?;

        let shipment = Shipment::new(user.id, params)?;

        let mut conn = self.pool.acquire().await?;

        conn.execute(
            sqlx::query(
                "INSERT INTO shipments (id, shipper_id, status, data) VALUES ($1, $2, $3, $4)",
            )
            .bind(&shipment.id)
            .bind(&shipment.shipper_id)
            .bind(shipment.status.name())
            .bind(Json(&shipment)),
        )
        .await?;

        tracing::info!(shipment = %shipment.id, "shipment created");

        Ok(shipment)
    }

    #[tracing::instrument(skip(self))]
    async fn available_shipments(&self, _user: AuthUser) -> Result<Vec<Shipment>, Error> {
        let mut conn = self.pool.acquire().await?;

        let mut results = conn.fetch(
            sqlx::query("SELECT data FROM shipments WHERE status = $1")
                .bind(ShipmentStatus::PendingBids.name()),
        );

        let mut shipments = Vec::new();
        while let Some(row) = results.try_next().await? {
            let Json(shipment): Json<Shipment> = row.try_get("data")?;
            shipments.push(shipment);
        }

        shipments.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(shipments)
    }

    #[tracing::instrument(skip(self))]
    async fn shipments_for_shipper(
        &self,
        user: AuthUser,
        shipper_id: Uuid,
    ) -> Result<Vec<Shipment>, Error> {
        user.require_self(shipper_id)?;

        let mut conn = self.pool.acquire().await?;

        let rows = conn
            .fetch_all(
                sqlx::query("SELECT data FROM shipments WHERE shipper_id = $1").bind(&shipper_id),
            )
            .await?;

        let mut shipments = Vec::with_capacity(rows.len());
        for row in rows {
            let Json(shipment): Json<Shipment> = row.try_get("data")?;
            shipments.push(shipment);
        }

        shipments.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(shipments)
    }

    #[tracing::instrument(skip(self, review))]
    async fn submit_rating(
        &self,
        user: AuthUser,
        shipment_id: Uuid,
        rating: u8,
        review: Option<String>,
    ) -> Result<Shipment, Error> {
        user.require_role(Role::Shipper)?;

        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await?;

        let mut shipment = fetch_shipment_for_update(&mut tx, &shipment_id).await?;

        if shipment.shipper_id != user.id {
            return Err(forbidden_error());
        }

        shipment.submit_rating(rating, review)?;

        update_shipment(&mut tx, &shipment).await?;

        // fold the rating into the driver's running average
        if let Some(driver_id) = shipment.selected_driver_id {
            let mut driver = fetch_user_for_update(&mut tx, &driver_id).await?;
            driver.record_rating(rating);

            update_user(&mut tx, &driver).await?;
        }

        tx.commit().await?;

        tracing::info!(shipment = %shipment.id, rating, "rating submitted");

        Ok(shipment)
    }

    #[tracing::instrument(skip(self))]
    async fn mark_paid(&self, user: AuthUser, shipment_id: Uuid) -> Result<Shipment, Error> {
        user.require_role(Role::Shipper)?;

        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await?;

        let mut shipment = fetch_shipment_for_update(&mut tx, &shipment_id).await?;

        if shipment.shipper_id != user.id {
            return Err(forbidden_error());
        }

        shipment.mark_paid()?;

        update_shipment(&mut tx, &shipment).await?;

        tx.commit().await?;

        tracing::info!(shipment = %shipment.id, "payment recorded");

        Ok(shipment)
    }
}
