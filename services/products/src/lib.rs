//! products service - product catalog lifecycle over the message transport

pub mod api;
pub mod application;
pub mod domain;
pub mod infrastructure;
