//! Client-side request validation

use thiserror::Error;

/// Largest width or height accepted by image generation
pub const MAX_IMAGE_DIMENSION: u32 = 2048;

/// Reason a request was rejected before being sent
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("field `{0}` must not be empty")]
    EmptyField(&'static str),

    #[error("field `{field}` must be between 1 and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: u32,
        max: u32,
    },

    #[error("garment strength must be 1, 2 or 3, got {0}")]
    InvalidGarmentStrength(u8),

    #[error("`{0}` is not a valid MIME type")]
    InvalidMimeType(String),
}

pub(crate) fn require_non_empty(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    Ok(())
}
