//! # Error Types
//!
//! Errors raised while interpreting profile and fixture data. Validation
//! findings are not errors: they travel as [`crate::ValidationResult`].

use thiserror::Error;

/// Errors from the core data model.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A string did not name one of the seven supported BACnet object types.
    #[error("unsupported BACnet object type: {0:?}")]
    UnknownObjectType(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_object_type_display() {
        let err = CoreError::UnknownObjectType("MultiStateValueObject".to_string());
        assert!(err.to_string().contains("MultiStateValueObject"));
    }
}
