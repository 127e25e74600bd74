use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::Shipment;
use crate::error::{invalid_state_error, Error};

/// The operational record of an accepted bid being executed. Exactly one
/// exists per shipment; it is denormalized and safe to rebuild from the
/// shipment and its accepted bid.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Trip {
    pub id: Uuid,
    pub status: Status,
    pub shipment_id: Uuid,
    pub driver_id: Uuid,
    pub shipper_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Active,
    InTransit,
    Completed,
    Cancelled,
}

impl Status {
    pub fn name(&self) -> String {
        match self {
            Self::Active => "active".into(),
            Self::InTransit => "in_transit".into(),
            Self::Completed => "completed".into(),
            Self::Cancelled => "cancelled".into(),
        }
    }
}

/// A driver-dashboard row: the shipment joined with the winning bid.
#[derive(Clone, Debug, Serialize)]
pub struct DriverTrip {
    #[serde(flatten)]
    pub shipment: Shipment,
    pub bid_id: Uuid,
    pub bid_amount: i64,
}

impl Trip {
    pub fn new(shipment_id: Uuid, driver_id: Uuid, shipper_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            status: Status::Active,
            shipment_id,
            driver_id,
            shipper_id,
            started_at: Utc::now(),
            completed_at: None,
        }
    }

    #[tracing::instrument]
    pub fn mark_in_transit(&mut self) -> Result<(), Error> {
        match self.status {
            Status::Active => {
                self.status = Status::InTransit;
                Ok(())
            }
            _ => Err(invalid_state_error()),
        }
    }

    #[tracing::instrument]
    pub fn complete(&mut self) -> Result<(), Error> {
        match self.status {
            Status::Active | Status::InTransit => {
                self.status = Status::Completed;
                self.completed_at = Some(Utc::now());
                Ok(())
            }
            _ => Err(invalid_state_error()),
        }
    }

    #[tracing::instrument]
    pub fn cancel(&mut self) -> Result<(), Error> {
        match self.status {
            Status::Active | Status::InTransit => {
                self.status = Status::Cancelled;
                Ok(())
            }
            _ => Err(invalid_state_error()),
        }
    }
}

#[test]
fn trip_lifecycle() {
    let mut trip = Trip::new(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    assert_eq!(trip.status, Status::Active);

    trip.mark_in_transit().unwrap();
    trip.complete().unwrap();

    assert!(trip.completed_at.is_some());
    assert!(trip.complete().is_err());
    assert!(trip.cancel().is_err());
}

#[test]
fn cancelled_trip_is_terminal() {
    let mut trip = Trip::new(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    trip.cancel().unwrap();

    assert!(trip.mark_in_transit().is_err());
    assert!(trip.complete().is_err());
}
