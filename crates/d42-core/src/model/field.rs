// Tri-state field marker
//
// A declared field is either a value (null included) or an unset marker that
// remembers whether the field is required. Unset fields never appear in a
// payload.

use serde_json::Value;

use super::schema::Presence;

#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    /// No value assigned yet.
    Unset { required: bool },
    /// A concrete value. `Value::Null` is a legitimate value.
    Set(Value),
}

impl Field {
    pub const fn required() -> Self {
        Self::Unset { required: true }
    }

    pub const fn optional() -> Self {
        Self::Unset { required: false }
    }

    pub const fn is_unset(&self) -> bool {
        matches!(self, Self::Unset { .. })
    }

    /// Unset *and* required: the only state that fails validation on its own.
    pub const fn is_missing(&self) -> bool {
        matches!(self, Self::Unset { required: true })
    }

    pub const fn value(&self) -> Option<&Value> {
        match self {
            Self::Set(value) => Some(value),
            Self::Unset { .. } => None,
        }
    }
}

impl From<Presence> for Field {
    fn from(presence: Presence) -> Self {
        match presence {
            Presence::Required => Self::required(),
            Presence::Optional => Self::optional(),
        }
    }
}

impl From<Value> for Field {
    fn from(value: Value) -> Self {
        Self::Set(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn markers_are_unset() {
        assert!(Field::required().is_unset());
        assert!(Field::optional().is_unset());
        assert!(Field::required().is_missing());
        assert!(!Field::optional().is_missing());
        assert_eq!(Field::required().value(), None);
    }

    #[test]
    fn null_is_a_value() {
        let field = Field::Set(Value::Null);
        assert!(!field.is_unset());
        assert_eq!(field.value(), Some(&Value::Null));
    }

    #[test]
    fn presence_maps_to_marker() {
        assert_eq!(Field::from(Presence::Required), Field::required());
        assert_eq!(Field::from(json!(42)), Field::Set(json!(42)));
    }
}
