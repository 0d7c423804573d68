//! Request DTOs for the front API
//!
//! Defines the structure of incoming query strings.

use serde::Deserialize;

/// Query for the lookup endpoint (GET /api?group=<group>&key=<key>)
///
/// # Fields
/// - `group`: The group to read from
/// - `key`: The cache key
#[derive(Debug, Clone, Deserialize)]
pub struct ApiQuery {
    /// The group name
    pub group: String,
    /// The cache key
    #[serde(default)]
    pub key: String,
}

impl ApiQuery {
    /// Validates the query
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.group.is_empty() {
            return Some("Group cannot be empty".to_string());
        }
        None
    }
}
