// ── Power distribution ──

use std::fmt;

use d42_api::{ApiResponse, ApiVersion};
use serde_json::Value;

use super::entity::{Entity, leaf_entity};
use super::record::{Record, WriteMethod};
use super::schema::{EntityKind, Schema, optional, required};
use crate::error::CoreError;

const PDU_SCHEMA: Schema = Schema {
    kind: EntityKind::Pdu,
    id_field: "pdu_id",
    envelope: Some("pdu"),
    fields: &[
        required("name"),
        optional("pdu_id"),
        optional("rack_id"),
        optional("device"),
        optional("notes"),
        optional("where"),
        optional("start_at"),
        optional("orientation"),
    ],
    alternatives: &[],
    aliases: &[],
    children: &[],
};

/// A PDU. The PDU model must already exist on the server; there is no API
/// to create one. `where` is `left`, `right`, `above`, `below` or `mounted`.
#[derive(Debug, Clone)]
pub struct Pdu {
    record: Record,
}

leaf_entity!(Pdu, PDU_SCHEMA);

impl Pdu {
    /// `POST pdus/rack/` when `rack_id` is set, `POST pdus/` otherwise.
    pub async fn save(&mut self) -> Result<ApiResponse, CoreError> {
        let resource = if self.get("rack_id").is_some_and(|v| !v.is_null()) {
            "pdus/rack/"
        } else {
            "pdus/"
        };
        self.record
            .write(WriteMethod::Post, ApiVersion::V1, resource)
            .await
    }
}

// ── PDU model (read-only) ───────────────────────────────────────────

const PDU_MODEL_SCHEMA: Schema = Schema {
    kind: EntityKind::PduModel,
    id_field: "pdu_model_id",
    envelope: None,
    fields: &[],
    alternatives: &[],
    aliases: &[],
    children: &[],
};

#[derive(Debug, Clone)]
pub struct PduModel {
    record: Record,
}

leaf_entity!(PduModel, PDU_MODEL_SCHEMA);

impl PduModel {
    /// Port groups, as listed under `ports in pdu model`.
    pub fn ports(&self) -> &[Value] {
        self.get("ports in pdu model")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn port_count(&self) -> u64 {
        self.ports()
            .iter()
            .filter_map(|port| port.get("pdu_port_count").and_then(Value::as_u64))
            .sum()
    }

    pub fn port_types(&self) -> Vec<&str> {
        self.ports()
            .iter()
            .filter_map(|port| port.get("pdu_port_type").and_then(Value::as_str))
            .collect()
    }
}

impl fmt::Display for PduModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = self.id().map(ToString::to_string).unwrap_or_default();
        write!(
            f,
            "pdu_model {id} ports {} type {}",
            self.port_count(),
            self.port_types().join(",")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pdu_model_summary() {
        let model = PduModel::hydrate(
            &json!({
                "pdu_model_id": 1,
                "ports in pdu model": [
                    {"pdu_port_count": 8, "pdu_port_type": "NEMA 5-15R"},
                    {"pdu_port_count": 2, "pdu_port_type": "C13"}
                ]
            }),
            None,
            None,
        );
        assert_eq!(model.port_count(), 10);
        assert_eq!(model.to_string(), "pdu_model 1 ports 10 type NEMA 5-15R,C13");
    }

    #[test]
    fn pdu_envelope_unwrapped() {
        let pdu = Pdu::hydrate(
            &json!({"pdu": {"pdu_id": 4, "name": "PDU Test", "start_at": 1.0}}),
            None,
            None,
        );
        assert_eq!(pdu.id(), Some(&crate::model::EntityId::Numeric(4)));
        assert_eq!(pdu.name(), Some("PDU Test"));
    }
}
