//! Telemetry initialisation for the loader binaries.

pub mod tracing;
