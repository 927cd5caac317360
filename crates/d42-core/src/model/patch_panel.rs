// ── Patch panels ──
//
// Patch panels themselves are assets (`type = "Patch Panel"`). Their ports
// and module models have dedicated endpoints.

use std::fmt;

use d42_api::{ApiResponse, ApiVersion};

use super::entity::{Entity, leaf_entity};
use super::record::{Record, WriteMethod};
use super::schema::{EntityKind, Schema, optional, required};
use crate::error::CoreError;

const PORT_SCHEMA: Schema = Schema {
    kind: EntityKind::PatchPanelPort,
    id_field: "patch_panel_port_id",
    envelope: None,
    fields: &[
        required("patch_panel_id"),
        required("number"),
        required("mac_id"),
        required("device"),
        required("device_id"),
        optional("switchport_id"),
        optional("switch"),
        optional("switchport"),
        optional("patch_panel_port_id"),
        optional("label"),
        optional("obj_label1"),
        optional("obj_label2"),
        optional("back_connection_id"),
        optional("back_switchport_id"),
        optional("back_switch"),
        optional("back_switchport"),
        optional("cable_type"),
    ],
    alternatives: &[&["mac_id", "device_id", "device"]],
    aliases: &[],
    children: &[],
};

/// One port of a patch panel, connected to a MAC address or a device.
#[derive(Debug, Clone)]
pub struct PatchPanelPort {
    record: Record,
}

leaf_entity!(PatchPanelPort, PORT_SCHEMA);

impl PatchPanelPort {
    /// `POST patch_panel_ports/`
    pub async fn save(&mut self) -> Result<ApiResponse, CoreError> {
        self.record
            .write(WriteMethod::Post, ApiVersion::V1, "patch_panel_ports/")
            .await
    }
}

// ── Patch panel module (read-only) ──────────────────────────────────

const MODULE_SCHEMA: Schema = Schema {
    kind: EntityKind::PatchPanelModule,
    id_field: "id",
    envelope: None,
    fields: &[],
    alternatives: &[],
    aliases: &[],
    children: &[],
};

#[derive(Debug, Clone)]
pub struct PatchPanelModule {
    record: Record,
}

leaf_entity!(PatchPanelModule, MODULE_SCHEMA);

impl fmt::Display for PatchPanelModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.record.snapshot().is_empty() {
            return Ok(());
        }
        let field = |name| {
            self.get(name)
                .map(|value| match value {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .unwrap_or_default()
        };
        write!(
            f,
            "{} {} port_type={} ports_in_row={} ports={}",
            field("name"),
            field("type"),
            field("port_type"),
            field("number_of_ports_in_row"),
            field("number_of_ports")
        )
    }
}
