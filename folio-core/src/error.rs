//! Error types for the Folio core.
//!
//! Every fallible constructor returns `FolioResult<T>`.

use thiserror::Error;

/// Unified error type for book construction.
#[derive(Debug, Error)]
pub enum FolioError {
    /// A page dimension is not strictly positive, or the segment count is
    /// zero or too large for 16-bit skin indices.
    #[error("Invalid dimension: {name} out of range (got {value})")]
    InvalidDimension { name: &'static str, value: f32 },

    /// A page record is missing a surface identifier.
    #[error("Invalid page data at index {index}: {reason}")]
    InvalidPageData { index: usize, reason: String },

    /// Geometry references a bone the skeleton does not have.
    #[error("Bone {bone} out of range for a skeleton of {count} bones")]
    BoneOutOfRange { bone: usize, count: usize },

    /// The page manifest could not be parsed.
    #[error("Manifest parse error on line {line}: {message}")]
    ManifestParse { line: usize, message: String },

    /// A color string is not `#rgb`, `#rrggbb` or a known name.
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// Configuration could not be deserialized.
    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for `Result<T, FolioError>`.
pub type FolioResult<T> = Result<T, FolioError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_message() {
        let err = FolioError::InvalidDimension {
            name: "width",
            value: -1.0,
        };
        assert_eq!(
            err.to_string(),
            "Invalid dimension: width out of range (got -1)"
        );
    }

    #[test]
    fn test_json_error_converts() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let err: FolioError = json_err.into();
        assert!(matches!(err, FolioError::Config(_)));
    }
}
