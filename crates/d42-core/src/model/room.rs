// ── Room ──
//
// A room belongs to a building and contains racks, plus devices and assets
// placed directly in the room.

use std::fmt;

use d42_api::{ApiResponse, ApiVersion};
use serde_json::{Map, Value};

use super::asset::Asset;
use super::custom_field::CustomField;
use super::device::Device;
use super::entity::{Entity, hydrate_children};
use super::rack::Rack;
use super::record::{Record, WriteMethod};
use super::schema::{EntityKind, Schema, optional, required};
use crate::error::CoreError;

const SCHEMA: Schema = Schema {
    kind: EntityKind::Room,
    id_field: "room_id",
    envelope: None,
    fields: &[
        required("name"),
        required("building"),
        required("building_id"),
        optional("notes"),
    ],
    alternatives: &[&["building_id", "building"]],
    aliases: &[],
    children: &["racks", "devices", "assets"],
};

#[derive(Debug, Clone)]
pub struct Room {
    record: Record,
    racks: Vec<Rack>,
    devices: Vec<Device>,
    assets: Vec<Asset>,
}

impl Entity for Room {
    const SCHEMA: &'static Schema = &SCHEMA;

    fn from_parts(record: Record, children: Map<String, Value>) -> Self {
        let mut room = Self {
            record,
            racks: Vec::new(),
            devices: Vec::new(),
            assets: Vec::new(),
        };
        room.adopt(&children);
        room
    }

    fn record(&self) -> &Record {
        &self.record
    }

    fn record_mut(&mut self) -> &mut Record {
        &mut self.record
    }
}

impl Room {
    pub fn racks(&self) -> &[Rack] {
        &self.racks
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    fn adopt(&mut self, children: &Map<String, Value>) {
        let owner = self.record.link();
        let client = self.record.client();
        if let Some(racks) = hydrate_children(children, "racks", &owner, client) {
            self.racks = racks;
        }
        if let Some(devices) = hydrate_children(children, "devices", &owner, client) {
            self.devices = devices;
        }
        if let Some(assets) = hydrate_children(children, "assets", &owner, client) {
            self.assets = assets;
        }
    }

    /// `POST rooms/`
    pub async fn save(&mut self) -> Result<ApiResponse, CoreError> {
        self.record
            .write(WriteMethod::Post, ApiVersion::V1, "rooms/")
            .await
    }

    /// `GET rooms/{id}`, then load every contained rack, device and asset
    /// that carries an identifier.
    pub async fn load(&mut self) -> Result<(), CoreError> {
        let Some(data) = self.record.fetch(|id| format!("rooms/{id}")).await? else {
            return Ok(());
        };
        let children = self.record.absorb(&data);
        self.adopt(&children);

        for rack in self.racks.iter_mut().filter(|rack| rack.id().is_some()) {
            rack.load().await?;
        }
        for device in self.devices.iter_mut().filter(|device| device.id().is_some()) {
            device.load().await?;
        }
        for asset in self.assets.iter_mut().filter(|asset| asset.id().is_some()) {
            asset.load().await?;
        }
        Ok(())
    }

    pub async fn add_custom_field(&mut self, field: CustomField) -> Result<ApiResponse, CoreError> {
        self.record.add_custom_field(field).await
    }
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name().unwrap_or_default())
    }
}
