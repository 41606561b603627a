//! Validation for track writes.

use super::models::{NewTrack, Track};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyField { field: &'static str },
    MalformedPayload { reason: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyField { field } => {
                write!(f, "Field '{}' is required but was empty", field)
            }
            ValidationError::MalformedPayload { reason } => {
                write!(f, "Malformed payload: {}", reason)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult<T> = Result<T, ValidationError>;

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map(str::trim).unwrap_or("").is_empty()
}

/// Checks the required fields of a creation payload.
pub fn validate_new_track(new_track: &NewTrack) -> ValidationResult<()> {
    if is_blank(&new_track.track_name) {
        return Err(ValidationError::EmptyField {
            field: "track_name",
        });
    }
    if is_blank(&new_track.artist) {
        return Err(ValidationError::EmptyField { field: "artist" });
    }
    Ok(())
}

/// Checks a full record, used after a patch has been applied.
pub fn validate_track(track: &Track) -> ValidationResult<()> {
    if track.id.trim().is_empty() {
        return Err(ValidationError::EmptyField { field: "id" });
    }
    if track.track_name.trim().is_empty() {
        return Err(ValidationError::EmptyField {
            field: "track_name",
        });
    }
    if track.artist.trim().is_empty() {
        return Err(ValidationError::EmptyField { field: "artist" });
    }
    Ok(())
}
