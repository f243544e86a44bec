//! Input validation for case and agent payloads

use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::{AssignmentError, Result};
use crate::types::{NewAgent, NewCase};

/// Reject empty and whitespace-only strings
pub fn not_blank(value: &str) -> std::result::Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new("blank"))
    } else {
        Ok(())
    }
}

/// Turn validator output into a single message naming the offending fields
fn describe(errors: &ValidationErrors) -> String {
    let mut fields: Vec<String> = errors
        .field_errors()
        .keys()
        .map(|field| field.to_string())
        .collect();
    fields.sort();
    format!("missing or invalid fields: {}", fields.join(", "))
}

/// Validate a case creation request.
///
/// Must be called before any data store interaction.
pub fn validate_new_case(new_case: &NewCase) -> Result<()> {
    new_case
        .validate()
        .map_err(|errors| AssignmentError::validation(describe(&errors)))
}

/// Validate an agent registration request
pub fn validate_new_agent(new_agent: &NewAgent) -> Result<()> {
    new_agent
        .validate()
        .map_err(|errors| AssignmentError::validation(describe(&errors)))
}
