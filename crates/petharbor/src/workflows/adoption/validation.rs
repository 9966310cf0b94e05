/// Raised when a record is missing a required field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} can't be blank")]
    MissingField { field: &'static str },
}

pub(crate) fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::MissingField { field })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_only_values_are_missing() {
        assert_eq!(
            require("city", "  \t"),
            Err(ValidationError::MissingField { field: "city" })
        );
        assert!(require("city", "Denver").is_ok());
    }

    #[test]
    fn message_names_the_field() {
        let err = ValidationError::MissingField { field: "zip_code" };
        assert_eq!(err.to_string(), "zip_code can't be blank");
    }
}
