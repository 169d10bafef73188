//! catalog-common - shared types for catalog services

pub mod types;

pub use types::*;
