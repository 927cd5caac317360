// ── Core error types ──
//
// Two locally generated failures (validation, missing client) plus a
// transparent passthrough for transport errors. Remote business failures
// (`{code != 0}`) are not errors at all: they come back as `ApiResponse`.

use d42_api::ApiResponse;
use thiserror::Error;

use crate::model::EntityKind;

/// A precondition on an entity's fields was not met. Raised before any
/// request is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("required attribute \"{field}\" not set")]
    MissingRequired { field: &'static str },

    /// Every member of an "A or B" requirement group is unset.
    #[error("required {} not set", describe_alternatives(.fields))]
    MissingAlternative { fields: &'static [&'static str] },

    #[error("custom field is not bound to an entity type")]
    MissingTarget,
}

fn describe_alternatives(fields: &[&str]) -> String {
    fields
        .iter()
        .map(|field| format!("attribute \"{field}\""))
        .collect::<Vec<_>>()
        .join(" or ")
}

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{kind} has no API client attached")]
    NoClient { kind: EntityKind },

    /// Transport failure, passed through untouched.
    #[error(transparent)]
    Remote(#[from] d42_api::Error),

    /// A read returned something that cannot be hydrated into `kind`.
    /// The response is kept verbatim.
    #[error("unexpected {kind} response: {response:?}")]
    Unhydratable {
        kind: EntityKind,
        response: ApiResponse,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_required_message() {
        let err = ValidationError::MissingRequired { field: "name" };
        assert_eq!(err.to_string(), "required attribute \"name\" not set");
    }

    #[test]
    fn missing_alternative_names_every_member() {
        let err = ValidationError::MissingAlternative {
            fields: &["building_id", "building"],
        };
        assert_eq!(
            err.to_string(),
            "required attribute \"building_id\" or attribute \"building\" not set"
        );
    }

    #[test]
    fn validation_wraps_transparently() {
        let err = CoreError::from(ValidationError::MissingRequired { field: "size" });
        assert_eq!(err.to_string(), "required attribute \"size\" not set");
    }
}
