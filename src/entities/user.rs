use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::Role;
use crate::error::{validation_error, Error};

/// A registered account. The argon2 hash is persisted with the entity but
/// never leaves the process: responses go through [`User::profile`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub status: Status,
    pub role: Role,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    pub vehicle: Option<Vehicle>,
    pub rating: f64,
    pub total_ratings: u32,
    pub total_trips: u32,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Active,
    Inactive,
    Blocked,
}

impl Status {
    pub fn name(&self) -> String {
        match self {
            Self::Active => "active".into(),
            Self::Inactive => "inactive".into(),
            Self::Blocked => "blocked".into(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Vehicle {
    pub license_number: String,
    pub vehicle_type: String,
    pub vehicle_number: String,
    pub vehicle_capacity: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub role: Role,
    pub license_number: Option<String>,
    pub vehicle_type: Option<String>,
    pub vehicle_number: Option<String>,
    pub vehicle_capacity: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub license_number: Option<String>,
    pub vehicle_type: Option<String>,
    pub vehicle_number: Option<String>,
    pub vehicle_capacity: Option<String>,
}

/// Public view of an account, returned at the API boundary.
#[derive(Clone, Debug, Serialize)]
pub struct Profile {
    pub id: Uuid,
    pub status: Status,
    pub role: Role,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_capacity: Option<String>,
    pub rating: f64,
    pub total_ratings: u32,
    pub total_trips: u32,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(params: &Registration, password_hash: String) -> Result<Self, Error> {
        if params.name.trim().len() < 2 {
            return Err(validation_error("name must be at least 2 characters"));
        }

        if !params.email.contains('@') {
            return Err(validation_error("invalid email address"));
        }

        if params.phone.trim().is_empty() {
            return Err(validation_error("phone number is required"));
        }

        let vehicle = match params.role {
            Role::Driver => Some(Vehicle {
                license_number: required(&params.license_number, "license_number")?,
                vehicle_type: required(&params.vehicle_type, "vehicle_type")?,
                vehicle_number: required(&params.vehicle_number, "vehicle_number")?,
                vehicle_capacity: required(&params.vehicle_capacity, "vehicle_capacity")?,
            }),
            Role::Shipper => None,
        };

        Ok(Self {
            id: Uuid::new_v4(),
            status: Status::Active,
            role: params.role,
            name: params.name.trim().into(),
            email: params.email.trim().to_lowercase(),
            phone: params.phone.trim().into(),
            password_hash,
            vehicle,
            rating: 0.0,
            total_ratings: 0,
            total_trips: 0,
            created_at: Utc::now(),
        })
    }

    pub fn apply_update(&mut self, changes: &ProfileUpdate) {
        if let Some(name) = &changes.name {
            if name.trim().len() >= 2 {
                self.name = name.trim().into();
            }
        }

        if let Some(phone) = &changes.phone {
            if !phone.trim().is_empty() {
                self.phone = phone.trim().into();
            }
        }

        if let Some(vehicle) = &mut self.vehicle {
            if let Some(license_number) = &changes.license_number {
                vehicle.license_number = license_number.clone();
            }
            if let Some(vehicle_type) = &changes.vehicle_type {
                vehicle.vehicle_type = vehicle_type.clone();
            }
            if let Some(vehicle_number) = &changes.vehicle_number {
                vehicle.vehicle_number = vehicle_number.clone();
            }
            if let Some(vehicle_capacity) = &changes.vehicle_capacity {
                vehicle.vehicle_capacity = vehicle_capacity.clone();
            }
        }
    }

    pub fn record_completed_trip(&mut self) {
        self.total_trips += 1;
    }

    /// Folds one more rating into the running average.
    pub fn record_rating(&mut self, rating: u8) {
        let total = self.rating * self.total_ratings as f64 + rating as f64;

        self.total_ratings += 1;
        self.rating = total / self.total_ratings as f64;
    }

    pub fn profile(&self) -> Profile {
        Profile {
            id: self.id,
            status: self.status,
            role: self.role,
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            license_number: self.vehicle.as_ref().map(|v| v.license_number.clone()),
            vehicle_type: self.vehicle.as_ref().map(|v| v.vehicle_type.clone()),
            vehicle_number: self.vehicle.as_ref().map(|v| v.vehicle_number.clone()),
            vehicle_capacity: self.vehicle.as_ref().map(|v| v.vehicle_capacity.clone()),
            rating: self.rating,
            total_ratings: self.total_ratings,
            total_trips: self.total_trips,
            created_at: self.created_at,
        }
    }
}

fn required(field: &Option<String>, name: &str) -> Result<String, Error> {
    match field {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().into()),
        _ => Err(validation_error(&format!("{} is required for drivers", name))),
    }
}

#[cfg(test)]
fn driver_registration() -> Registration {
    Registration {
        name: "Asha Verma".into(),
        email: "Asha@Example.com".into(),
        phone: "9999999999".into(),
        password: "secret1".into(),
        role: Role::Driver,
        license_number: Some("DL-0420110012345".into()),
        vehicle_type: Some("medium_truck".into()),
        vehicle_number: Some("MH12AB1234".into()),
        vehicle_capacity: Some("5t".into()),
    }
}

#[test]
fn driver_registration_requires_vehicle_fields() {
    let mut params = driver_registration();
    assert!(User::new(&params, "hash".into()).is_ok());

    params.vehicle_number = None;
    assert!(User::new(&params, "hash".into()).is_err());
}

#[test]
fn email_is_stored_lowercase() {
    let user = User::new(&driver_registration(), "hash".into()).unwrap();
    assert_eq!(user.email, "asha@example.com");
}

#[test]
fn shipper_registration_ignores_vehicle_fields() {
    let params = Registration {
        role: Role::Shipper,
        license_number: None,
        vehicle_type: None,
        vehicle_number: None,
        vehicle_capacity: None,
        ..driver_registration()
    };

    let user = User::new(&params, "hash".into()).unwrap();
    assert!(user.vehicle.is_none());
    assert!(user.profile().vehicle_type.is_none());
}

#[test]
fn rating_running_average() {
    let mut user = User::new(&driver_registration(), "hash".into()).unwrap();

    user.record_rating(4);
    user.record_rating(5);

    assert_eq!(user.total_ratings, 2);
    assert!((user.rating - 4.5).abs() < f64::EPSILON);
}

#[test]
fn completed_trips_counter() {
    let mut user = User::new(&driver_registration(), "hash".into()).unwrap();
    assert_eq!(user.total_trips, 0);

    user.record_completed_trip();
    assert_eq!(user.total_trips, 1);
}

#[test]
fn profile_omits_password_hash() {
    let user = User::new(&driver_registration(), "hash".into()).unwrap();
    let json = serde_json::to_value(user.profile()).unwrap();

    assert!(json.get("password_hash").is_none());
    assert_eq!(json["vehicle_type"], "medium_truck");
}
