//! Repository layer — entity-scoped database operations.
//!
//! Every function borrows the caller's `Connection`, so the same code runs
//! inside or outside a transaction and tests can hand in an in-memory store.

mod intake;
mod patient;

pub use intake::*;
pub use patient::*;

use uuid::Uuid;

use super::DatabaseError;

fn parse_stored_id(value: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(value).map_err(|_| DatabaseError::InvalidId {
        value: value.to_string(),
    })
}
