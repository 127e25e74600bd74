//! Shipment chat storage. The store is a collaborator behind a trait so
//! the in-process default can be swapped for a durable backend without
//! touching the engine; the contract is one ordered list per shipment.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::entities::Message;
use crate::error::Error;

#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn append(&self, message: Message) -> Result<Message, Error>;
    async fn list(&self, shipment_id: Uuid) -> Result<Vec<Message>, Error>;
}

/// Process-local store. Contents are lost on restart; polling clients
/// re-fetch the whole list, so arrival order is the only guarantee.
pub struct MemoryMessages {
    inner: RwLock<HashMap<Uuid, Vec<Message>>>,
}

impl MemoryMessages {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryMessages {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageStore for MemoryMessages {
    async fn append(&self, message: Message) -> Result<Message, Error> {
        let mut inner = self.inner.write().await;

        inner
            .entry(message.shipment_id)
            .or_default()
            .push(message.clone());

        Ok(message)
    }

    async fn list(&self, shipment_id: Uuid) -> Result<Vec<Message>, Error> {
        let inner = self.inner.read().await;

        Ok(inner.get(&shipment_id).cloned().unwrap_or_default())
    }
}

#[test]
fn messages_keep_arrival_order_per_shipment() {
    use crate::auth::Role;
    use tokio_test::block_on;

    let store = MemoryMessages::new();
    let shipment_id = Uuid::new_v4();
    let other_id = Uuid::new_v4();

    block_on(store.append(Message::new(shipment_id, Role::Driver, "picked up".into()))).unwrap();
    block_on(store.append(Message::new(shipment_id, Role::Shipper, "thanks".into()))).unwrap();
    block_on(store.append(Message::new(other_id, Role::Shipper, "hello?".into()))).unwrap();

    let messages = block_on(store.list(shipment_id)).unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].body, "picked up");
    assert_eq!(messages[1].body, "thanks");

    assert!(block_on(store.list(Uuid::new_v4())).unwrap().is_empty());
}
