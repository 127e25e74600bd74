pub mod auth;
pub mod bids;
pub mod insights;
pub mod messages;
pub mod shipments;
pub mod trips;
