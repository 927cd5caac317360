// ── Custom fields ──
//
// Key/value pairs attached to buildings, rooms, racks, assets, customers and
// devices. Saved with PUT to an endpoint chosen by the owning entity type.

use std::sync::Arc;

use d42_api::{ApiResponse, ApiVersion};
use serde_json::Value;
use strum::Display;

use super::entity::Entity;
use super::record::{Record, WriteMethod};
use super::schema::{EntityKind, Schema, optional, required};
use crate::error::{CoreError, ValidationError};

/// Entity types that accept custom fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum CustomFieldTarget {
    Building,
    Room,
    Rack,
    Asset,
    Customer,
    Device,
}

impl CustomFieldTarget {
    pub const fn for_kind(kind: EntityKind) -> Option<Self> {
        match kind {
            EntityKind::Building => Some(Self::Building),
            EntityKind::Room => Some(Self::Room),
            EntityKind::Rack => Some(Self::Rack),
            EntityKind::Asset => Some(Self::Asset),
            EntityKind::Customer => Some(Self::Customer),
            EntityKind::Device => Some(Self::Device),
            _ => None,
        }
    }

    /// Write endpoint. Devices use their own path.
    pub const fn resource(self) -> &'static str {
        match self {
            Self::Building => "custom_fields/building/",
            Self::Room => "custom_fields/room/",
            Self::Rack => "custom_fields/rack/",
            Self::Asset => "custom_fields/asset/",
            Self::Customer => "custom_fields/customer/",
            Self::Device => "device/custom_field/",
        }
    }

    /// Whether the endpoint identifies the owner by id as well as by name.
    pub const fn takes_id(self) -> bool {
        matches!(self, Self::Room | Self::Rack | Self::Asset)
    }
}

const SCHEMA: Schema = Schema {
    kind: EntityKind::CustomField,
    id_field: "custom_field_id",
    envelope: None,
    fields: &[
        required("name"),
        required("key"),
        optional("type"),
        optional("value"),
        optional("value2"),
        optional("notes"),
        optional("id"),
    ],
    alternatives: &[],
    aliases: &[],
    children: &[],
};

/// A custom field.
///
/// `name` is the owning entity's name, `key` the custom field's own name.
/// `type` defaults to text on the server; `number` and `date`
/// (`yyyy-mm-dd`) are also accepted.
#[derive(Debug, Clone)]
pub struct CustomField {
    record: Record,
    target: Option<CustomFieldTarget>,
}

impl Entity for CustomField {
    const SCHEMA: &'static Schema = &SCHEMA;

    fn from_parts(record: Record, _children: serde_json::Map<String, Value>) -> Self {
        Self {
            record,
            target: None,
        }
    }

    fn record(&self) -> &Record {
        &self.record
    }

    fn record_mut(&mut self) -> &mut Record {
        &mut self.record
    }
}

impl CustomField {
    pub const fn target(&self) -> Option<CustomFieldTarget> {
        self.target
    }

    pub fn set_target(&mut self, target: CustomFieldTarget) -> &mut Self {
        self.target = Some(target);
        self
    }

    /// Hydrate one item of an owner's `custom_fields` list.
    pub(crate) fn attached(data: &Value, owner: &Record) -> Self {
        let mut field = Self::hydrate(data, Some(owner.link()), owner.client().cloned());
        field.target = CustomFieldTarget::for_kind(owner.kind());
        field
    }

    /// Stamp the owner's name (and id where the endpoint takes it) and
    /// adopt its client when this field has none.
    pub(crate) fn bind(&mut self, owner: &Record) -> Result<(), ValidationError> {
        let target =
            CustomFieldTarget::for_kind(owner.kind()).ok_or(ValidationError::MissingTarget)?;
        self.target = Some(target);

        if let Some(name) = owner.get("name").filter(|v| !v.is_null()) {
            self.record.set("name", name.clone());
        }
        if let Some(id) = owner.id().filter(|_| target.takes_id()) {
            self.record.set("id", id.to_value());
        }
        if self.record.client().is_none() {
            if let Some(client) = owner.client() {
                self.record.attach(Arc::clone(client));
            }
        }
        self.record.set_owner(owner.link());
        Ok(())
    }

    /// `PUT custom_fields/<target>/` (`device/custom_field/` for devices).
    pub async fn save(&mut self) -> Result<ApiResponse, CoreError> {
        let target = self.target.ok_or(ValidationError::MissingTarget)?;
        self.record
            .write(WriteMethod::Put, ApiVersion::V1, target.resource())
            .await
    }
}
