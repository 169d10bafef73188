//! Infrastructure layer

pub mod persistence;
