use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::User;
use crate::error::{invalid_state_error, validation_error, Error};

const MAX_MESSAGE_LEN: usize = 500;

/// A driver's price offer against a shipment. The driver's profile is
/// snapshotted at submission so bid listings render without a join.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Bid {
    pub id: Uuid,
    pub status: Status,
    pub shipment_id: Uuid,
    pub driver_id: Uuid,
    pub amount: i64,
    pub message: String,
    pub driver_name: String,
    pub driver_rating: f64,
    pub vehicle_type: Option<String>,
    pub vehicle_number: Option<String>,
    pub license_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Pending,
    Accepted,
    Rejected,
}

impl Status {
    pub fn name(&self) -> String {
        match self {
            Self::Pending => "pending".into(),
            Self::Accepted => "accepted".into(),
            Self::Rejected => "rejected".into(),
        }
    }
}

impl Bid {
    pub fn new(
        shipment_id: Uuid,
        driver: &User,
        amount: i64,
        message: String,
    ) -> Result<Self, Error> {
        if amount < 0 {
            return Err(validation_error("bid amount must be positive"));
        }

        if message.len() > MAX_MESSAGE_LEN {
            return Err(validation_error("message cannot exceed 500 characters"));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            status: Status::Pending,
            shipment_id,
            driver_id: driver.id,
            amount,
            message,
            driver_name: driver.name.clone(),
            driver_rating: driver.rating,
            vehicle_type: driver.vehicle.as_ref().map(|v| v.vehicle_type.clone()),
            vehicle_number: driver.vehicle.as_ref().map(|v| v.vehicle_number.clone()),
            license_number: driver.vehicle.as_ref().map(|v| v.license_number.clone()),
            created_at: Utc::now(),
        })
    }

    pub fn is_pending(&self) -> bool {
        self.status == Status::Pending
    }

    #[tracing::instrument]
    pub fn accept(&mut self) -> Result<(), Error> {
        match self.status {
            Status::Pending => {
                self.status = Status::Accepted;
                Ok(())
            }
            _ => Err(invalid_state_error()),
        }
    }

    #[tracing::instrument]
    pub fn reject(&mut self) -> Result<(), Error> {
        match self.status {
            Status::Pending => {
                self.status = Status::Rejected;
                Ok(())
            }
            _ => Err(invalid_state_error()),
        }
    }
}

#[cfg(test)]
fn test_driver() -> User {
    use crate::auth::Role;
    use crate::entities::user::Registration;

    User::new(
        &Registration {
            name: "Ravi Kumar".into(),
            email: "ravi@example.com".into(),
            phone: "8888888888".into(),
            password: "secret1".into(),
            role: Role::Driver,
            license_number: Some("KA-01-2020-0001".into()),
            vehicle_type: Some("small_truck".into()),
            vehicle_number: Some("KA01XY9876".into()),
            vehicle_capacity: Some("2t".into()),
        },
        "hash".into(),
    )
    .unwrap()
}

#[test]
fn bid_snapshots_driver_profile() {
    let driver = test_driver();
    let bid = Bid::new(Uuid::new_v4(), &driver, 400, "".into()).unwrap();

    assert_eq!(bid.driver_id, driver.id);
    assert_eq!(bid.driver_name, "Ravi Kumar");
    assert_eq!(bid.vehicle_type.as_deref(), Some("small_truck"));
    assert!(bid.is_pending());
}

#[test]
fn bid_rejects_bad_input() {
    let driver = test_driver();

    assert!(Bid::new(Uuid::new_v4(), &driver, -1, "".into()).is_err());
    assert!(Bid::new(Uuid::new_v4(), &driver, 100, "x".repeat(501)).is_err());
}

#[test]
fn decided_bids_are_final() {
    let driver = test_driver();

    let mut bid = Bid::new(Uuid::new_v4(), &driver, 400, "".into()).unwrap();
    bid.accept().unwrap();
    assert_eq!(bid.status, Status::Accepted);
    assert!(bid.accept().is_err());
    assert!(bid.reject().is_err());

    let mut bid = Bid::new(Uuid::new_v4(), &driver, 500, "".into()).unwrap();
    bid.reject().unwrap();
    assert_eq!(bid.status, Status::Rejected);
    assert!(bid.accept().is_err());
}
