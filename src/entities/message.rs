use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::Role;

/// One chat line between a shipment's shipper and driver.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub shipment_id: Uuid,
    pub sender_role: Role,
    pub body: String,
    pub sent_at: DateTime<Utc>,
}

impl Message {
    pub fn new(shipment_id: Uuid, sender_role: Role, body: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            shipment_id,
            sender_role,
            body,
            sent_at: Utc::now(),
        }
    }
}
