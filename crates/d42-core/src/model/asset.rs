// ── Asset ──
//
// Non-device inventory: patch panels, AC units, monitors and the like.

use d42_api::{ApiResponse, ApiVersion};

use super::custom_field::CustomField;
use super::entity::{Entity, leaf_entity};
use super::record::{Record, WriteMethod};
use super::schema::{EntityKind, Schema, optional, required};
use crate::error::CoreError;

/// Asset `type` used for patch panels.
pub const PATCH_PANEL_TYPE: &str = "Patch Panel";

const SCHEMA: Schema = Schema {
    kind: EntityKind::Asset,
    id_field: "asset_id",
    envelope: Some("asset"),
    fields: &[
        required("type"),
        optional("name"),
        optional("service_level"),
        optional("serial_no"),
        optional("asset_no"),
        optional("customer_id"),
        optional("location"),
        optional("notes"),
        optional("building"),
        optional("vendor"),
        optional("imagefile_id"),
        optional("contract_id"),
        optional("rack_id"),
        optional("room"),
        optional("rack"),
        optional("row"),
        optional("start_at"),
        optional("size"),
        optional("orientation"),
        optional("depth"),
        optional("patch_panel_model_id"),
        optional("numbering_start_from"),
    ],
    alternatives: &[],
    aliases: &[],
    children: &[],
};

#[derive(Debug, Clone)]
pub struct Asset {
    record: Record,
}

leaf_entity!(Asset, SCHEMA);

impl Asset {
    pub fn is_patch_panel(&self) -> bool {
        self.text("type") == Some(PATCH_PANEL_TYPE)
    }

    /// `POST assets/`
    pub async fn save(&mut self) -> Result<ApiResponse, CoreError> {
        self.record
            .write(WriteMethod::Post, ApiVersion::V1, "assets/")
            .await
    }

    /// `GET assets/{id}`
    pub async fn load(&mut self) -> Result<(), CoreError> {
        if let Some(data) = self.record.fetch(|id| format!("assets/{id}")).await? {
            self.record.absorb(&data);
        }
        Ok(())
    }

    pub async fn add_custom_field(&mut self, field: CustomField) -> Result<ApiResponse, CoreError> {
        self.record.add_custom_field(field).await
    }
}
