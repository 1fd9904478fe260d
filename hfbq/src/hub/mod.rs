//! Dataset hub access.

mod base;
mod client;
mod model;

pub use base::DatasetHub;
pub use client::HubClient;
