//! API models for request and response payloads

use serde::{Deserialize, Serialize};

pub mod contact;

pub use contact::{Contact, ContactPatch, NewContact, PayloadError};

/// Query parameters for contact listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactQuery {
    /// Case-insensitive name filter
    pub name: Option<String>,
}

/// Confirmation body for mutations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
