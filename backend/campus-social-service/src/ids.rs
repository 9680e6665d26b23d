//! Identifier parsing.
//!
//! Every identifier arriving over HTTP is parsed into a [`Uuid`] before it reaches
//! a service, so membership checks always compare normalized values.

use crate::error::{AppError, Result};
use std::collections::HashSet;
use uuid::Uuid;

/// Parse a single identifier.
pub fn parse_object_id(raw: &str) -> Result<Uuid> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation("Identifier is required".to_string()));
    }
    Uuid::parse_str(trimmed)
        .map_err(|_| AppError::Validation(format!("Invalid identifier: '{}'", trimmed)))
}

/// Parse a comma-separated identifier batch.
///
/// Fails as a whole if any segment is empty or malformed. Duplicates are removed,
/// keeping first-seen order.
pub fn parse_id_list(raw: &str) -> Result<Vec<Uuid>> {
    if raw.trim().is_empty() {
        return Err(AppError::Validation(
            "At least one identifier is required".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    let mut ids = Vec::new();
    for segment in raw.split(',') {
        let id = parse_object_id(segment)?;
        if seen.insert(id) {
            ids.push(id);
        }
    }
    Ok(ids)
}
