mod auth_api;
mod bid_api;
mod helpers;
mod insights_api;
mod message_api;
mod shipment_api;
mod trip_api;

use sqlx::{Executor, Pool, Postgres};
use std::sync::Arc;

use crate::{api::API, auth::Tokens, error::Error, external::messages::MessageStore};

type Database = Postgres;

pub struct Engine {
    pool: Pool<Database>,
    tokens: Tokens,
    messages: Arc<dyn MessageStore>,
}

impl Engine {
    #[tracing::instrument(name = "Engine::new", skip_all)]
    pub async fn new(
        pool: Pool<Database>,
        tokens: Tokens,
        messages: Arc<dyn MessageStore>,
    ) -> Result<Self, Error> {
        pool.execute(
            "CREATE TABLE IF NOT EXISTS users (id UUID PRIMARY KEY, email VARCHAR NOT NULL UNIQUE, role VARCHAR NOT NULL, data JSONB NOT NULL)",
        )
        .await?;

        pool.execute(
            "CREATE TABLE IF NOT EXISTS shipments (id UUID PRIMARY KEY, shipper_id UUID NOT NULL, status VARCHAR NOT NULL, data JSONB NOT NULL)",
        )
        .await?;

        pool.execute(
            "CREATE TABLE IF NOT EXISTS bids (id UUID PRIMARY KEY, shipment_id UUID NOT NULL, driver_id UUID NOT NULL, status VARCHAR NOT NULL, data JSONB NOT NULL)",
        )
        .await?;

        // one trip per shipment, enforced by the key
        pool.execute(
            "CREATE TABLE IF NOT EXISTS trips (id UUID PRIMARY KEY, shipment_id UUID NOT NULL UNIQUE, driver_id UUID NOT NULL, status VARCHAR NOT NULL, data JSONB NOT NULL)",
        )
        .await?;

        Ok(Self {
            pool,
            tokens,
            messages,
        })
    }
}

impl API for Engine {}
