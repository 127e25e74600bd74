pub mod insights;

mod bid;
mod message;
mod shipment;
mod trip;
mod user;

pub use bid::{Bid, Status as BidStatus};
pub use message::Message;
pub use shipment::{NewShipment, PaymentStatus, Shipment, Status as ShipmentStatus};
pub use trip::{DriverTrip, Status as TripStatus, Trip};
pub use user::{Profile, ProfileUpdate, Registration, User};
