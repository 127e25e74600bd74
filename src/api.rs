use async_trait::async_trait;
use uuid::Uuid;

use crate::auth::{AuthUser, Role};
use crate::entities::insights::{BillingReport, EarningsReport, PerformanceReport};
use crate::entities::{
    Bid, DriverTrip, Message, NewShipment, Profile, ProfileUpdate, Registration, Shipment,
    ShipmentStatus, Trip,
};
use crate::error::Error;

#[async_trait]
pub trait AuthAPI {
    async fn register(&self, params: Registration) -> Result<(Profile, String), Error>;

    async fn login(&self, email: String, password: String, role: Role)
        -> Result<(Profile, String), Error>;

    async fn update_profile(
        &self,
        user: AuthUser,
        id: Uuid,
        changes: ProfileUpdate,
    ) -> Result<Profile, Error>;
}

#[async_trait]
pub trait ShipmentAPI {
    async fn create_shipment(&self, user: AuthUser, params: NewShipment)
        -> Result<Shipment, Error>;

    async fn available_shipments(&self, user: AuthUser) -> Result<Vec<Shipment>, Error>;

    async fn shipments_for_shipper(
        &self,
        user: AuthUser,
        shipper_id: Uuid,
    ) -> Result<Vec<Shipment>, Error>;

    async fn submit_rating(
        &self,
        user: AuthUser,
        shipment_id: Uuid,
        rating: u8,
        review: Option<String>,
    ) -> Result<Shipment, Error>;

    async fn mark_paid(&self, user: AuthUser, shipment_id: Uuid) -> Result<Shipment, Error>;
}

#[async_trait]
pub trait BidAPI {
    async fn submit_bid(
        &self,
        user: AuthUser,
        shipment_id: Uuid,
        amount: i64,
        message: String,
    ) -> Result<Bid, Error>;

    async fn bids_for_shipment(&self, user: AuthUser, shipment_id: Uuid)
        -> Result<Vec<Bid>, Error>;

    async fn bids_for_driver(&self, user: AuthUser, driver_id: Uuid) -> Result<Vec<Bid>, Error>;

    async fn accept_bid(&self, user: AuthUser, id: Uuid) -> Result<(Bid, Trip), Error>;
}

#[async_trait]
pub trait TripAPI {
    async fn trips_for_driver(
        &self,
        user: AuthUser,
        driver_id: Uuid,
    ) -> Result<Vec<DriverTrip>, Error>;

    async fn update_trip_status(
        &self,
        user: AuthUser,
        shipment_id: Uuid,
        status: ShipmentStatus,
    ) -> Result<Shipment, Error>;
}

#[async_trait]
pub trait InsightsAPI {
    async fn driver_earnings(&self, user: AuthUser, driver_id: Uuid)
        -> Result<EarningsReport, Error>;

    async fn driver_performance(
        &self,
        user: AuthUser,
        driver_id: Uuid,
    ) -> Result<PerformanceReport, Error>;

    async fn shipper_billing(
        &self,
        user: AuthUser,
        shipper_id: Uuid,
    ) -> Result<BillingReport, Error>;

    async fn migrate_payments(&self, user: AuthUser) -> Result<u64, Error>;
}

#[async_trait]
pub trait MessageAPI {
    async fn post_message(
        &self,
        user: AuthUser,
        shipment_id: Uuid,
        body: String,
    ) -> Result<Message, Error>;

    async fn shipment_messages(
        &self,
        user: AuthUser,
        shipment_id: Uuid,
    ) -> Result<Vec<Message>, Error>;
}

pub trait API: AuthAPI + ShipmentAPI + BidAPI + TripAPI + InsightsAPI + MessageAPI {}
