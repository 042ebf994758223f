pub mod auth;
pub mod board;
pub mod config;
pub mod error;
pub mod telemetry;
