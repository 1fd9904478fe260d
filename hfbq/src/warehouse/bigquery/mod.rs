//! Google BigQuery warehouse over the REST API.

mod auth;
mod client;
mod encoding;
mod model;

pub use client::BigQueryClient;
