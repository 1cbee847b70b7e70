//! Field rules shared by the `Validate` derives on request inputs.

use validator::{ValidationError, ValidationErrors};

use crate::services::ServiceError;

/// Rejects empty and whitespace-only text.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

/// First failing field in name order, so the reported message is stable.
pub fn first_message(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .find_map(|(field, errs)| {
            errs.first().map(|err| match &err.message {
                Some(message) => message.to_string(),
                None if err.code == "required" => {
                    format!("The {field} field is required.")
                }
                None => format!("The {field} field is invalid."),
            })
        })
        .unwrap_or_else(|| "The given data was invalid.".to_string())
}

impl From<ValidationErrors> for ServiceError {
    fn from(errors: ValidationErrors) -> Self {
        ServiceError::Validation(first_message(&errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Contact {
        #[validate(custom(function = "not_blank"))]
        name: String,
        #[validate(email(message = "The email must be a valid email address."))]
        email: String,
    }

    #[test]
    fn blank_text_is_required() {
        assert!(not_blank("  \t").is_err());
        assert!(not_blank(" x ").is_ok());
    }

    #[test]
    fn reports_first_field_by_name() {
        let contact = Contact {
            name: " ".into(),
            email: "nope".into(),
        };
        let err = ServiceError::from(contact.validate().unwrap_err());
        assert_eq!(
            err,
            ServiceError::Validation("The email must be a valid email address.".into())
        );
    }

    #[test]
    fn custom_rule_without_message_uses_field_name() {
        let contact = Contact {
            name: " ".into(),
            email: "noor@example.org".into(),
        };
        assert_eq!(
            first_message(&contact.validate().unwrap_err()),
            "The name field is required."
        );
    }
}
