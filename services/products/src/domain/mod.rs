//! Domain layer
//!
//! The product entity and the store port it is persisted through.

pub mod entities;
pub mod repositories;

pub use entities::*;
pub use repositories::*;
