//! Contact form submissions.
//!
//! The server only validates and logs a submission. Delivery goes through the
//! public relay (`[contact].relay_url`), which the front end also uses
//! directly when `/api/contact` is unreachable.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reply text for an accepted submission.
pub const ACCEPTED_MESSAGE: &str = "Message received successfully";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContactError {
    #[error("All fields are required")]
    MissingFields,

    #[error("Invalid JSON body")]
    InvalidJson,

    #[error("Message too large (limit {limit} bytes)")]
    TooLarge { limit: usize },
}

impl ContactError {
    pub const fn status(&self) -> u16 {
        match self {
            Self::MissingFields | Self::InvalidJson => 400,
            Self::TooLarge { .. } => 413,
        }
    }
}

impl ContactForm {
    /// Trimmed copy; every field must be non-blank.
    pub fn validate(&self) -> Result<Self, ContactError> {
        let form = Self {
            name: self.name.trim().to_owned(),
            email: self.email.trim().to_owned(),
            message: self.message.trim().to_owned(),
        };
        if form.name.is_empty() || form.email.is_empty() || form.message.is_empty() {
            return Err(ContactError::MissingFields);
        }
        Ok(form)
    }

    /// Parse and validate a JSON request body of at most `max_bytes`.
    pub fn from_body(body: &[u8], max_bytes: usize) -> Result<Self, ContactError> {
        if body.len() > max_bytes {
            return Err(ContactError::TooLarge { limit: max_bytes });
        }
        let form: Self = serde_json::from_slice(body).map_err(|_| ContactError::InvalidJson)?;
        form.validate()
    }
}

/// `{ success, message }` body of `/api/contact`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactReply {
    pub success: bool,
    pub message: String,
}

impl ContactReply {
    pub fn accepted() -> Self {
        Self {
            success: true,
            message: ACCEPTED_MESSAGE.to_owned(),
        }
    }

    pub fn rejected(err: &ContactError) -> Self {
        Self {
            success: false,
            message: err.to_string(),
        }
    }
}
