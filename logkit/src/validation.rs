//! Custom validation functions for [`LogConfig`](crate::LogConfig).

use validator::ValidationError;

use crate::encoding::Encoding;
use crate::level::Level;

/// Validate that the level names a known severity.
pub fn validate_level(level: &str) -> Result<(), ValidationError> {
    level
        .parse::<Level>()
        .map(|_| ())
        .map_err(|_| ValidationError::new("invalid_level"))
}

/// Validate that the format names a known encoder.
pub fn validate_format(format: &str) -> Result<(), ValidationError> {
    format
        .parse::<Encoding>()
        .map(|_| ())
        .map_err(|_| ValidationError::new("invalid_format"))
}
