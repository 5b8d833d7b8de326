//! Shared types for the API layer.

use std::str::FromStr;
use std::sync::Arc;

use uuid::Uuid;

use crate::api::error::ApiError;
use crate::core_state::CoreState;
use crate::models::enums::IntakeStatus;

/// Shared context for all API routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self { core }
    }
}

/// Parse a path identifier, rejecting anything that is not a UUID.
pub fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest("Invalid ID format".into()))
}

/// Parse an optional `?status=` filter. Empty means no filter.
pub fn parse_status_filter(raw: Option<&str>) -> Result<Option<IntakeStatus>, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => IntakeStatus::from_str(s)
            .map(Some)
            .map_err(|_| ApiError::BadRequest(format!("Unknown status filter: {s}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_id_rejects_garbage() {
        assert!(parse_id("42").is_err());
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string()).unwrap(), id);
    }

    #[test]
    fn status_filter_parsing() {
        assert_eq!(parse_status_filter(None).unwrap(), None);
        assert_eq!(parse_status_filter(Some("")).unwrap(), None);
        assert_eq!(
            parse_status_filter(Some("flagged")).unwrap(),
            Some(IntakeStatus::Flagged)
        );
        assert!(parse_status_filter(Some("archived")).is_err());
    }
}
