// ── Building ──

use std::fmt;

use d42_api::{ApiResponse, ApiVersion};

use super::custom_field::CustomField;
use super::entity::{Entity, leaf_entity};
use super::record::{Record, WriteMethod};
use super::schema::{EntityKind, Schema, optional, required};
use crate::error::CoreError;

const SCHEMA: Schema = Schema {
    kind: EntityKind::Building,
    id_field: "building_id",
    envelope: None,
    fields: &[
        required("name"),
        optional("address"),
        optional("contact_name"),
        optional("contact_phone"),
        optional("notes"),
    ],
    alternatives: &[],
    aliases: &[],
    children: &[],
};

#[derive(Debug, Clone)]
pub struct Building {
    record: Record,
}

leaf_entity!(Building, SCHEMA);

impl Building {
    /// `POST buildings/`
    pub async fn save(&mut self) -> Result<ApiResponse, CoreError> {
        self.record
            .write(WriteMethod::Post, ApiVersion::V1, "buildings/")
            .await
    }

    pub async fn add_custom_field(&mut self, field: CustomField) -> Result<ApiResponse, CoreError> {
        self.record.add_custom_field(field).await
    }
}

impl fmt::Display for Building {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}",
            self.name().unwrap_or_default(),
            self.text("address").unwrap_or_default()
        )
    }
}
