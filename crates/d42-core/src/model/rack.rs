// ── Rack ──
//
// Racks own devices and assets keyed by numeric mount slot (`start_at`).
// Slots may be fractional (half-U positions) and are totally ordered.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use d42_api::{ApiResponse, ApiVersion, Device42Client};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::asset::Asset;
use super::custom_field::CustomField;
use super::device::Device;
use super::diff::{FormValue, Payload};
use super::entity::{Entity, child_items};
use super::record::{OwnerLink, Record, WriteMethod};
use super::schema::{EntityKind, Schema, optional, required};
use crate::error::{CoreError, ValidationError};

// ── Mount slots ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct MountSlot(f64);

impl MountSlot {
    pub const fn new(slot: f64) -> Self {
        Self(slot)
    }

    pub const fn value(self) -> f64 {
        self.0
    }

    /// Numbers and numeric strings; non-finite values are rejected.
    pub fn from_value(value: &Value) -> Option<Self> {
        let slot = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };
        slot.filter(|slot| slot.is_finite()).map(Self)
    }
}

impl PartialEq for MountSlot {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for MountSlot {}

impl PartialOrd for MountSlot {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MountSlot {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl From<u32> for MountSlot {
    fn from(slot: u32) -> Self {
        Self(f64::from(slot))
    }
}

impl fmt::Display for MountSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where `add_device` should place a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountPosition {
    /// Next free slot, chosen by the server.
    Auto,
    Slot(MountSlot),
}

impl MountPosition {
    fn form_value(self) -> FormValue {
        match self {
            Self::Auto => FormValue::from("auto"),
            Self::Slot(slot) => FormValue::Text(slot.to_string()),
        }
    }
}

/// Iteration direction over mount slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountOrder {
    Ascending,
    Descending,
}

fn in_order<T>(
    mounted: &BTreeMap<MountSlot, T>,
    order: MountOrder,
) -> Box<dyn Iterator<Item = &T> + '_> {
    match order {
        MountOrder::Ascending => Box::new(mounted.values()),
        MountOrder::Descending => Box::new(mounted.values().rev()),
    }
}

/// Key a child collection by `start_at`. Two items on the same slot keep
/// the later one.
fn classify<T: Entity>(
    children: &Map<String, Value>,
    key: &str,
    owner: &OwnerLink,
    client: Option<&Arc<Device42Client>>,
) -> Option<BTreeMap<MountSlot, T>> {
    let items = child_items(children, key, EntityKind::Rack)?;
    let mut mounted = BTreeMap::new();
    for item in items {
        let Some(slot) = item.get("start_at").and_then(MountSlot::from_value) else {
            warn!(key, ?item, "rack child without a usable start_at, skipped");
            continue;
        };
        let child = T::hydrate(item, Some(owner.clone()), client.cloned());
        if mounted.insert(slot, child).is_some() {
            debug!(key, %slot, "mount slot reused, later entry wins");
        }
    }
    Some(mounted)
}

// ── Rack ────────────────────────────────────────────────────────────

const SCHEMA: Schema = Schema {
    kind: EntityKind::Rack,
    id_field: "rack_id",
    envelope: Some("rack"),
    fields: &[
        required("name"),
        required("size"),
        required("room"),
        optional("building"),
        required("room_id"),
        optional("numbering_start_from_bottom"),
        optional("first_number"),
        optional("row"),
        optional("manufacturer"),
        optional("notes"),
    ],
    alternatives: &[&["room", "room_id"]],
    aliases: &[],
    children: &["devices", "assets"],
};

#[derive(Debug, Clone)]
pub struct Rack {
    record: Record,
    devices: BTreeMap<MountSlot, Device>,
    assets: BTreeMap<MountSlot, Asset>,
}

impl Entity for Rack {
    const SCHEMA: &'static Schema = &SCHEMA;

    fn from_parts(record: Record, children: Map<String, Value>) -> Self {
        let mut rack = Self {
            record,
            devices: BTreeMap::new(),
            assets: BTreeMap::new(),
        };
        rack.adopt(&children);
        rack
    }

    fn record(&self) -> &Record {
        &self.record
    }

    fn record_mut(&mut self) -> &mut Record {
        &mut self.record
    }
}

impl Rack {
    /// Slot order that walks the rack top-down: ascending when numbering
    /// starts at the top (`numbering_start_from_bottom = "no"`), descending
    /// otherwise.
    pub fn mount_order(&self) -> MountOrder {
        match self.get("numbering_start_from_bottom") {
            Some(Value::String(flag)) if flag.eq_ignore_ascii_case("no") => MountOrder::Ascending,
            Some(Value::Bool(false)) => MountOrder::Ascending,
            _ => MountOrder::Descending,
        }
    }

    pub fn devices(&self) -> impl Iterator<Item = &Device> + '_ {
        in_order(&self.devices, self.mount_order())
    }

    pub fn assets(&self) -> impl Iterator<Item = &Asset> + '_ {
        in_order(&self.assets, self.mount_order())
    }

    pub fn devices_in(&self, order: MountOrder) -> impl Iterator<Item = &Device> + '_ {
        in_order(&self.devices, order)
    }

    pub fn assets_in(&self, order: MountOrder) -> impl Iterator<Item = &Asset> + '_ {
        in_order(&self.assets, order)
    }

    pub const fn mounted_devices(&self) -> &BTreeMap<MountSlot, Device> {
        &self.devices
    }

    pub const fn mounted_assets(&self) -> &BTreeMap<MountSlot, Asset> {
        &self.assets
    }

    pub fn device_at(&self, slot: MountSlot) -> Option<&Device> {
        self.devices.get(&slot)
    }

    pub fn asset_at(&self, slot: MountSlot) -> Option<&Asset> {
        self.assets.get(&slot)
    }

    /// Place a device locally, replacing whatever held the slot.
    pub fn mount_device(&mut self, slot: MountSlot, device: Device) -> Option<Device> {
        self.devices.insert(slot, device)
    }

    pub fn mount_asset(&mut self, slot: MountSlot, asset: Asset) -> Option<Asset> {
        self.assets.insert(slot, asset)
    }

    fn adopt(&mut self, children: &Map<String, Value>) {
        let owner = self.record.link();
        let client = self.record.client();
        if let Some(devices) = classify(children, "devices", &owner, client) {
            self.devices = devices;
        }
        if let Some(assets) = classify(children, "assets", &owner, client) {
            self.assets = assets;
        }
    }

    /// `POST racks/`
    pub async fn save(&mut self) -> Result<ApiResponse, CoreError> {
        self.record
            .write(WriteMethod::Post, ApiVersion::V1, "racks/")
            .await
    }

    /// `GET racks/{id}`, then load every mounted device and asset that
    /// carries an identifier.
    pub async fn load(&mut self) -> Result<(), CoreError> {
        let Some(data) = self.record.fetch(|id| format!("racks/{id}")).await? else {
            return Ok(());
        };
        let children = self.record.absorb(&data);
        self.adopt(&children);

        for device in self.devices.values_mut().filter(|device| device.id().is_some()) {
            device.load().await?;
        }
        for asset in self.assets.values_mut().filter(|asset| asset.id().is_some()) {
            asset.load().await?;
        }
        Ok(())
    }

    /// `POST device/rack/` with `{device, rack_id, start_at}`; reloads the
    /// rack when the server accepts the placement.
    pub async fn add_device(
        &mut self,
        device: &Device,
        start_at: MountPosition,
    ) -> Result<ApiResponse, CoreError> {
        let name = device
            .name()
            .ok_or(ValidationError::MissingRequired { field: "name" })?;
        let rack_id = self
            .record
            .id()
            .ok_or(ValidationError::MissingRequired { field: "rack_id" })?;
        let client = self.record.require_client()?;

        let mut body = Payload::new();
        body.insert("device", name);
        body.insert("rack_id", FormValue::from_json(&rack_id.to_value()));
        body.insert("start_at", start_at.form_value());

        debug!(device = name, %rack_id, "mounting device");
        let response = client.post(ApiVersion::V1, "device/rack/", &body).await?;
        if response.is_success() {
            self.load().await?;
        }
        Ok(response)
    }

    pub async fn add_custom_field(&mut self, field: CustomField) -> Result<ApiResponse, CoreError> {
        self.record.add_custom_field(field).await
    }
}

impl fmt::Display for Rack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name().unwrap_or_default())
    }
}
