pub mod config;
pub mod encoder;
pub mod error;
pub mod intake;
pub mod scoring;
pub mod telemetry;
