use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{invalid_state_error, validation_error, Error};

/// A cargo-transport request and its full lifecycle record.
///
/// Amounts are whole currency units. `selected_driver_id` and
/// `final_amount` are written together, exactly once, by
/// [`Shipment::assign_driver`]; the rating fields are written at most
/// once by [`Shipment::submit_rating`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Shipment {
    pub id: Uuid,
    pub status: Status,
    pub shipper_id: Uuid,
    pub from_location: String,
    pub to_location: String,
    pub package_type: String,
    pub package_weight: f64,
    pub package_description: String,
    pub vehicle_type: String,
    pub pickup_date: String,
    pub special_instructions: String,
    pub selected_driver_id: Option<Uuid>,
    pub final_amount: Option<i64>,
    pub payment_status: PaymentStatus,
    pub payment_date: Option<DateTime<Utc>>,
    pub driver_rating: Option<u8>,
    pub driver_review: Option<String>,
    pub rated_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    PendingBids,
    Active,
    InTransit,
    Delivered,
    Completed,
    Cancelled,
}

impl Status {
    pub fn name(&self) -> String {
        match self {
            Self::PendingBids => "pending_bids".into(),
            Self::Active => "active".into(),
            Self::InTransit => "in_transit".into(),
            Self::Delivered => "delivered".into(),
            Self::Completed => "completed".into(),
            Self::Cancelled => "cancelled".into(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewShipment {
    pub from_location: String,
    pub to_location: String,
    pub package_type: String,
    pub package_weight: f64,
    pub package_description: String,
    pub vehicle_type: String,
    pub pickup_date: String,
    pub special_instructions: Option<String>,
}

impl Shipment {
    pub fn new(shipper_id: Uuid, params: NewShipment) -> Result<Self, Error> {
        if params.from_location.trim().is_empty() || params.to_location.trim().is_empty() {
            return Err(validation_error("pickup and delivery locations are required"));
        }

        if params.package_weight < 0.0 {
            return Err(validation_error("package weight must be positive"));
        }

        if params.package_description.trim().is_empty() {
            return Err(validation_error("package description is required"));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            status: Status::PendingBids,
            shipper_id,
            from_location: params.from_location.trim().into(),
            to_location: params.to_location.trim().into(),
            package_type: params.package_type,
            package_weight: params.package_weight,
            package_description: params.package_description.trim().into(),
            vehicle_type: params.vehicle_type,
            pickup_date: params.pickup_date,
            special_instructions: params.special_instructions.unwrap_or_default(),
            selected_driver_id: None,
            final_amount: None,
            payment_status: PaymentStatus::Pending,
            payment_date: None,
            driver_rating: None,
            driver_review: None,
            rated_at: None,
            completed_at: None,
            created_at: Utc::now(),
        })
    }

    pub fn is_pending_bids(&self) -> bool {
        self.status == Status::PendingBids
    }

    /// Promotes the shipment out of bidding. Only valid while bids are
    /// still open, which makes a second acceptance fail here regardless
    /// of what happened to the bids themselves.
    #[tracing::instrument]
    pub fn assign_driver(&mut self, driver_id: Uuid, amount: i64) -> Result<(), Error> {
        match self.status {
            Status::PendingBids => {
                self.status = Status::Active;
                self.selected_driver_id = Some(driver_id);
                self.final_amount = Some(amount);
                Ok(())
            }
            _ => Err(invalid_state_error()),
        }
    }

    #[tracing::instrument]
    pub fn advance(&mut self, next: Status) -> Result<(), Error> {
        let allowed = matches!(
            (self.status, next),
            (Status::Active, Status::InTransit)
                | (Status::InTransit, Status::Delivered)
                | (
                    Status::Active | Status::InTransit | Status::Delivered,
                    Status::Completed,
                )
                | (
                    Status::PendingBids | Status::Active | Status::InTransit,
                    Status::Cancelled,
                )
        );

        if !allowed {
            return Err(invalid_state_error());
        }

        self.status = next;

        if next == Status::Completed {
            self.completed_at = Some(Utc::now());
        }

        Ok(())
    }

    /// Payment is an explicit post-completion action; completion never
    /// implies it.
    #[tracing::instrument]
    pub fn mark_paid(&mut self) -> Result<(), Error> {
        if self.status != Status::Completed || self.payment_status != PaymentStatus::Pending {
            return Err(invalid_state_error());
        }

        self.payment_status = PaymentStatus::Paid;
        self.payment_date = Some(Utc::now());

        Ok(())
    }

    #[tracing::instrument]
    pub fn submit_rating(&mut self, rating: u8, review: Option<String>) -> Result<(), Error> {
        if !(1..=5).contains(&rating) {
            return Err(validation_error("rating must be between 1 and 5"));
        }

        if self.status != Status::Completed {
            return Err(invalid_state_error());
        }

        if self.driver_rating.is_some() {
            return Err(invalid_state_error());
        }

        self.driver_rating = Some(rating);
        self.driver_review = review;
        self.rated_at = Some(Utc::now());

        Ok(())
    }
}

#[cfg(test)]
pub fn test_shipment(shipper_id: Uuid) -> Shipment {
    Shipment::new(
        shipper_id,
        NewShipment {
            from_location: "Mumbai".into(),
            to_location: "Pune".into(),
            package_type: "electronics".into(),
            package_weight: 120.0,
            package_description: "two pallets of routers".into(),
            vehicle_type: "medium_truck".into(),
            pickup_date: "2026-08-10".into(),
            special_instructions: None,
        },
    )
    .unwrap()
}

#[test]
fn assign_driver_sets_amount_and_driver_once() {
    let mut shipment = test_shipment(Uuid::new_v4());
    let driver_id = Uuid::new_v4();

    shipment.assign_driver(driver_id, 400).unwrap();

    assert_eq!(shipment.status, Status::Active);
    assert_eq!(shipment.selected_driver_id, Some(driver_id));
    assert_eq!(shipment.final_amount, Some(400));

    // a second acceptance must not rebind the driver or the amount
    assert!(shipment.assign_driver(Uuid::new_v4(), 350).is_err());
    assert_eq!(shipment.selected_driver_id, Some(driver_id));
    assert_eq!(shipment.final_amount, Some(400));
}

#[test]
fn lifecycle_transitions() {
    let mut shipment = test_shipment(Uuid::new_v4());

    assert!(shipment.advance(Status::InTransit).is_err());

    shipment.assign_driver(Uuid::new_v4(), 500).unwrap();
    shipment.advance(Status::InTransit).unwrap();
    shipment.advance(Status::Delivered).unwrap();
    shipment.advance(Status::Completed).unwrap();

    assert!(shipment.completed_at.is_some());
    assert!(shipment.advance(Status::Cancelled).is_err());
    assert!(shipment.advance(Status::Completed).is_err());
}

#[test]
fn payment_requires_completion_and_is_one_way() {
    let mut shipment = test_shipment(Uuid::new_v4());
    shipment.assign_driver(Uuid::new_v4(), 500).unwrap();

    assert!(shipment.mark_paid().is_err());

    shipment.advance(Status::Completed).unwrap();
    assert_eq!(shipment.payment_status, PaymentStatus::Pending);

    shipment.mark_paid().unwrap();
    assert_eq!(shipment.payment_status, PaymentStatus::Paid);
    assert!(shipment.payment_date.is_some());

    // paid never reverts to pending
    assert!(shipment.mark_paid().is_err());
    assert_eq!(shipment.payment_status, PaymentStatus::Paid);
}

#[test]
fn rating_is_write_once() {
    let mut shipment = test_shipment(Uuid::new_v4());
    shipment.assign_driver(Uuid::new_v4(), 500).unwrap();

    assert!(shipment.submit_rating(4, None).is_err());

    shipment.advance(Status::Completed).unwrap();
    assert!(shipment.submit_rating(0, None).is_err());
    assert!(shipment.submit_rating(6, None).is_err());

    shipment
        .submit_rating(4, Some("Great driver".into()))
        .unwrap();
    assert_eq!(shipment.driver_rating, Some(4));
    assert!(shipment.rated_at.is_some());

    assert!(shipment.submit_rating(5, None).is_err());
    assert_eq!(shipment.driver_rating, Some(4));
}

#[test]
fn cancel_only_before_delivery() {
    let mut shipment = test_shipment(Uuid::new_v4());
    shipment.advance(Status::Cancelled).unwrap();
    assert_eq!(shipment.status, Status::Cancelled);

    let mut shipment = test_shipment(Uuid::new_v4());
    shipment.assign_driver(Uuid::new_v4(), 500).unwrap();
    shipment.advance(Status::InTransit).unwrap();
    shipment.advance(Status::Delivered).unwrap();
    assert!(shipment.advance(Status::Cancelled).is_err());
}
