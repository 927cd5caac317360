// Entity trait
//
// Shared surface of every entity type: construction (bare or hydrated),
// field access and the change-diff payload. Saves and loads are inherent
// async methods on each type because their paths differ.

use std::sync::Arc;

use d42_api::Device42Client;
use serde_json::{Map, Value};

use super::diff::Payload;
use super::entity_id::EntityId;
use super::record::{OwnerLink, Record};
use super::schema::{EntityKind, Schema};
use crate::error::ValidationError;

pub trait Entity: Sized {
    const SCHEMA: &'static Schema;

    /// Assemble the typed wrapper. `children` holds the raw values of the
    /// schema's child-collection keys (empty for a bare entity).
    fn from_parts(record: Record, children: Map<String, Value>) -> Self;

    fn record(&self) -> &Record;

    fn record_mut(&mut self) -> &mut Record;

    /// A bare entity: every declared field unset.
    fn new(client: Option<Arc<Device42Client>>) -> Self {
        Self::from_parts(Record::bare(Self::SCHEMA, client), Map::new())
    }

    /// An entity hydrated from decoded server data.
    fn hydrate(
        data: &Value,
        owner: Option<OwnerLink>,
        client: Option<Arc<Device42Client>>,
    ) -> Self {
        let (record, children) = Record::hydrate(Self::SCHEMA, data, owner, client);
        Self::from_parts(record, children)
    }

    fn kind(&self) -> EntityKind {
        Self::SCHEMA.kind
    }

    fn id(&self) -> Option<&EntityId> {
        self.record().id()
    }

    fn get(&self, name: &str) -> Option<&Value> {
        self.record().get(name)
    }

    fn text(&self, name: &str) -> Option<&str> {
        self.record().text(name)
    }

    fn name(&self) -> Option<&str> {
        self.text("name")
    }

    /// Assign a field. Chainable: `rack.set("name", "R1").set("size", 42)`.
    fn set(&mut self, name: &str, value: impl Into<Value>) -> &mut Self {
        self.record_mut().set(name, value.into());
        self
    }

    fn validate(&self) -> Result<(), ValidationError> {
        self.record().validate()
    }

    fn payload(&self) -> Result<Payload, ValidationError> {
        self.record().payload()
    }
}

/// Implements the accessor half of `Entity` for a wrapper whose record lives
/// in a `record` field and which has no child collections.
macro_rules! leaf_entity {
    ($ty:ident, $schema:expr) => {
        impl $crate::model::Entity for $ty {
            const SCHEMA: &'static $crate::model::Schema = &$schema;

            fn from_parts(
                record: $crate::model::Record,
                _children: ::serde_json::Map<String, ::serde_json::Value>,
            ) -> Self {
                Self { record }
            }

            fn record(&self) -> &$crate::model::Record {
                &self.record
            }

            fn record_mut(&mut self) -> &mut $crate::model::Record {
                &mut self.record
            }
        }
    };
}

pub(crate) use leaf_entity;

/// The items of a child collection, if the key was present. A value that is
/// not a list is logged and treated as absent.
pub(crate) fn child_items<'a>(
    children: &'a Map<String, Value>,
    key: &str,
    parent: EntityKind,
) -> Option<&'a [Value]> {
    match children.get(key)? {
        Value::Array(items) => Some(items),
        Value::Null => Some(&[]),
        other => {
            tracing::warn!(%parent, key, ?other, "child collection is not a list");
            None
        }
    }
}

/// Hydrate every item of a child collection as `T`, owned by `owner`.
pub(crate) fn hydrate_children<T: Entity>(
    children: &Map<String, Value>,
    key: &str,
    owner: &OwnerLink,
    client: Option<&Arc<Device42Client>>,
) -> Option<Vec<T>> {
    let items = child_items(children, key, owner.kind)?;
    Some(
        items
            .iter()
            .map(|item| T::hydrate(item, Some(owner.clone()), client.cloned()))
            .collect(),
    )
}
