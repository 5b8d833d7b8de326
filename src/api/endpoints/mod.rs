//! API endpoint handlers.
//!
//! Each module corresponds to a screen of the intake dashboard.
//! Handlers lock the store once and delegate to `crate::workflow`.

pub mod dashboard;
pub mod demo;
pub mod health;
pub mod intakes;
pub mod patients;
