// ── Customers and service levels ──

use std::fmt;

use d42_api::{ApiResponse, ApiVersion};

use super::custom_field::CustomField;
use super::entity::{Entity, leaf_entity};
use super::record::{Record, WriteMethod};
use super::schema::{EntityKind, Schema, optional, required};
use crate::error::CoreError;

const CUSTOMER_SCHEMA: Schema = Schema {
    kind: EntityKind::Customer,
    id_field: "customer_id",
    envelope: None,
    fields: &[
        required("name"),
        optional("contact_info"),
        optional("notes"),
        optional("type"),
        optional("customer"),
        optional("email"),
        optional("phone"),
        optional("address"),
    ],
    alternatives: &[],
    aliases: &[],
    children: &[],
};

/// A customer, or a customer contact when `customer` names the parent.
#[derive(Debug, Clone)]
pub struct Customer {
    record: Record,
}

leaf_entity!(Customer, CUSTOMER_SCHEMA);

impl Customer {
    /// `Contacts` as listed by the server.
    pub fn contacts(&self) -> &[serde_json::Value] {
        self.get("Contacts")
            .and_then(serde_json::Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// `POST customers/contacts/` when `customer` is set, `POST customers/`
    /// otherwise.
    pub async fn save(&mut self) -> Result<ApiResponse, CoreError> {
        let resource = if self.get("customer").is_some_and(|v| !v.is_null()) {
            "customers/contacts/"
        } else {
            "customers/"
        };
        self.record
            .write(WriteMethod::Post, ApiVersion::V1, resource)
            .await
    }

    pub async fn add_custom_field(&mut self, field: CustomField) -> Result<ApiResponse, CoreError> {
        self.record.add_custom_field(field).await
    }
}

impl fmt::Display for Customer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name().unwrap_or_default())
    }
}

// ── Service level (read-only) ───────────────────────────────────────

const SERVICE_LEVEL_SCHEMA: Schema = Schema {
    kind: EntityKind::ServiceLevel,
    id_field: "id",
    envelope: None,
    fields: &[],
    alternatives: &[],
    aliases: &[],
    children: &[],
};

#[derive(Debug, Clone)]
pub struct ServiceLevel {
    record: Record,
}

leaf_entity!(ServiceLevel, SERVICE_LEVEL_SCHEMA);

impl fmt::Display for ServiceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = self.id().map(ToString::to_string).unwrap_or_default();
        write!(f, "{}({id})", self.name().unwrap_or_default())
    }
}
