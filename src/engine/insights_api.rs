use super::helpers::update_shipment;
use super::Engine;

use async_trait::async_trait;
use sqlx::{types::Json, Acquire, Executor, Row};
use uuid::Uuid;

use crate::{
    api::InsightsAPI,
    auth::AuthUser,
    entities::insights::{self, BillingReport, EarningsReport, PerformanceReport},
    entities::{Shipment, ShipmentStatus},
    error::Error,
};

impl Engine {
    /// All completed shipments assigned to a driver. The driver binding
    /// lives inside the document, so the scan filters on the JSONB field.
    async fn completed_shipments_for_driver(
        &self,
        driver_id: Uuid,
    ) -> Result<Vec<Shipment>, Error> {
        let mut conn = self.pool.acquire().await?;

        let rows = conn
            .fetch_all(
                sqlx::query(
                    "SELECT data FROM shipments WHERE status = $1 AND data->>'selected_driver_id' = $2",
                )
                .bind(ShipmentStatus::Completed.name())
                .bind(driver_id.to_string()),
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
}

#[async_trait]
impl InsightsAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn driver_earnings(
        &self,
        user: AuthUser,
        driver_id: Uuid,
    ) -> Result<EarningsReport, Error> {
        user.require_self(driver_id)?;

        let completed = self.completed_shipments_for_driver(driver_id).await?;

        let mut conn = self.pool.acquire().await?;

        let row = conn
            .fetch_one(
                sqlx::query(
                    "SELECT COUNT(*) AS n FROM shipments WHERE status IN ('active', 'in_transit', 'delivered') AND data->>'selected_driver_id' = $1",
                )
                .bind(driver_id.to_string()),
            )
            .await?;
        let active_trips: i64 = row.try_get("n")?;

        Ok(insights::driver_earnings(&completed, active_trips as usize))
    }

    #[tracing::instrument(skip(self))]
    async fn driver_performance(
        &self,
        _user: AuthUser,
        driver_id: Uuid,
    ) -> Result<PerformanceReport, Error> {
        let completed = self.completed_shipments_for_driver(driver_id).await?;

        Ok(insights::driver_performance(&completed))
    }

    #[tracing::instrument(skip(self))]
    async fn shipper_billing(
        &self,
        user: AuthUser,
        shipper_id: Uuid,
    ) -> Result<BillingReport, Error> {
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

        Ok(insights::shipper_billing(shipments))
    }

    /// One-off backfill: historical completed shipments that predate the
    /// explicit payment step are settled as paid.
    #[tracing::instrument(skip(self))]
    async fn migrate_payments(&self, _user: AuthUser) -> Result<u64, Error> {
        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await?;

        let rows = tx
            .fetch_all(sqlx::query(
                "SELECT data FROM shipments WHERE status = 'completed' AND data->>'payment_status' = 'pending' FOR UPDATE",
            ))
            .await?;

        let mut migrated = 0;
        for row in rows {
            let Json(mut shipment): Json<Shipment> = row.try_get("data")?;
            shipment.mark_paid()?;

            update_shipment(&mut tx, &shipment).await?;
            migrated += 1;
        }

        tx.commit().await?;

        tracing::info!(migrated, "payment migration finished");

        Ok(migrated)
    }
}
