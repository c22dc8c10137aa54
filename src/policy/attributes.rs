use indexmap::IndexMap;
use thiserror::Error;

use crate::types::{Attribute, AttributeType};

pub const MAX_TEXT_LENGTH: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttributeError {
    #[error("Invalid Attribute {0}")]
    InvalidAttribute(String),

    #[error("Missing Required Attribute {0}")]
    MissingRequired(String),

    #[error("Text Too Long {0}")]
    TextTooLong(String),

    #[error("Invalid Choice Field {0}")]
    InvalidChoice(String),

    #[error("Field Required {0}")]
    FieldRequired(String),
}

/// Checks submitted attribute values against a manifest's schema.
/// The first failing check wins; unknown keys are reported in submission order.
pub fn has_valid_attributes(
    input: &IndexMap<String, String>,
    schema: &[Attribute],
) -> Result<(), AttributeError> {
    if let Some(unknown) = input
        .keys()
        .find(|key| !schema.iter().any(|a| &a.name == *key))
    {
        return Err(AttributeError::InvalidAttribute(unknown.clone()));
    }

    for attribute in schema {
        let Some(value) = input.get(&attribute.name) else {
            if !attribute.optional {
                return Err(AttributeError::MissingRequired(attribute.name.clone()));
            }
            continue;
        };

        if value.is_empty() {
            if !attribute.optional {
                return Err(AttributeError::FieldRequired(attribute.name.clone()));
            }
            continue;
        }

        match attribute.attribute_type {
            AttributeType::Text => {
                if value.chars().count() > MAX_TEXT_LENGTH {
                    return Err(AttributeError::TextTooLong(attribute.name.clone()));
                }
            }
            AttributeType::MultipleChoice => {
                if !attribute.choices().any(|choice| choice == value) {
                    return Err(AttributeError::InvalidChoice(attribute.name.clone()));
                }
            }
        }
    }

    Ok(())
}
