use super::Engine;

use async_trait::async_trait;
use sqlx::{types::Json, Executor, Row};
use uuid::Uuid;

use crate::{
    api::MessageAPI,
    auth::AuthUser,
    entities::{Message, Shipment},
    error::{forbidden_error, not_found_error, validation_error, Error},
};

impl Engine {
    /// Chat is restricted to the shipment's two parties.
    async fn require_participant(
        &self,
        user: &AuthUser,
        shipment_id: Uuid,
    ) -> Result<(), Error> {
        let mut conn = self.pool.acquire().await?;

        let Json(shipment): Json<Shipment> = conn
            .fetch_optional(sqlx::query("SELECT data FROM shipments WHERE id = $1").bind(&shipment_id))
            .await?
            .ok_or_else(not_found_error)?
            .try_get("data")?;

        if user.id == shipment.shipper_id || Some(user.id) == shipment.selected_driver_id {
            return Ok(());
        }

        Err(forbidden_error())
    }
}

#[async_trait]
impl MessageAPI for Engine {
    #[tracing::instrument(skip(self, body))]
    async fn post_message(
        &self,
        user: AuthUser,
        shipment_id: Uuid,
        body: String,
    ) -> Result<Message, Error> {
        if body.trim().is_empty() {
            return Err(validation_error("message is required"));
        }

        self.require_participant(&user, shipment_id).await?;

        // the sender's role comes from the token, not the request body
        let message = Message::new(shipment_id, user.role, body);

        self.messages.append(message).await
    }

    #[tracing::instrument(skip(self))]
    async fn shipment_messages(
        &self,
        user: AuthUser,
        shipment_id: Uuid,
    ) -> Result<Vec<Message>, Error> {
        self.require_participant(&user, shipment_id).await?;

        self.messages.list(shipment_id).await
    }
}
