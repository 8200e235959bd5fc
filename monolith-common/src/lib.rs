//! Monolith Common - Shared configuration and response types

pub mod config;
pub mod messages;

pub use config::*;
pub use messages::*;
