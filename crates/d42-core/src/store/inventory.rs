// ── Inventory: cached repository over the list endpoints ──
//
// Buildings, rooms, racks, assets, customers, service levels and MAC
// addresses are listed once and memoized; every accessor takes an explicit
// `reload` flag that bypasses the cache. Everything else (devices, PDU
// models, patch panel modules, history) is fetched on each call.

use std::sync::Arc;

use d42_api::{ApiResponse, Device42Client};
use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, warn};

use super::collection::Collection;
use crate::config::ConnectionConfig;
use crate::error::CoreError;
use crate::model::{
    Asset, Building, Customer, Device, Entity, EntityId, EntityKind, History, MacAddress,
    PatchPanelModule, PduModel, Rack, Room, ServiceLevel, normalize_mac,
};

/// Criteria for `Inventory::racks_matching`. Unset criteria match anything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RackFilter<'a> {
    pub name: Option<&'a str>,
    pub building: Option<&'a str>,
    pub room: Option<&'a str>,
}

impl RackFilter<'_> {
    pub fn matches(&self, rack: &Rack) -> bool {
        [
            ("name", self.name),
            ("building", self.building),
            ("room", self.room),
        ]
        .into_iter()
        .all(|(field, wanted)| wanted.is_none_or(|wanted| rack.text(field) == Some(wanted)))
    }
}

pub struct Inventory {
    client: Arc<Device42Client>,
    buildings: Collection<Building>,
    rooms: Collection<Room>,
    racks: Collection<Rack>,
    assets: Collection<Asset>,
    customers: Collection<Customer>,
    service_levels: Collection<ServiceLevel>,
    mac_addresses: Collection<MacAddress>,
}

fn by_name<T: Entity>(entity: &T) -> Option<String> {
    entity.name().map(str::to_owned)
}

fn by_id<T: Entity>(entity: &T) -> Option<String> {
    entity.id().map(ToString::to_string)
}

fn by_mac(mac: &MacAddress) -> Option<String> {
    mac.address().map(normalize_mac)
}

/// Pair each entity with its lookup key; entities without one are skipped.
fn keyed<T: Entity>(
    entities: Vec<T>,
    key: impl Fn(&T) -> Option<String>,
) -> impl Iterator<Item = (String, T)> {
    entities.into_iter().filter_map(move |entity| {
        let Some(k) = key(&entity) else {
            warn!(kind = %T::SCHEMA.kind, "listed entity has no lookup key, skipped");
            return None;
        };
        Some((k, entity))
    })
}

/// Detach the list stored under `key` (or the body itself). The value is left
/// untouched when it is not a list.
fn take_list(value: &mut Value, key: Option<&str>) -> Option<Vec<Value>> {
    let list = match key {
        Some(key) => value.get_mut(key)?,
        None => value,
    };
    match list.take() {
        Value::Array(items) => Some(items),
        other => {
            *list = other;
            None
        }
    }
}

impl Inventory {
    pub fn new(client: Arc<Device42Client>) -> Self {
        Self {
            client,
            buildings: Collection::new(),
            rooms: Collection::new(),
            racks: Collection::new(),
            assets: Collection::new(),
            customers: Collection::new(),
            service_levels: Collection::new(),
            mac_addresses: Collection::new(),
        }
    }

    /// Build the transport from `config` and wrap it.
    pub fn connect(config: &ConnectionConfig) -> Result<Self, CoreError> {
        Ok(Self::new(config.connect()?))
    }

    pub fn client(&self) -> &Arc<Device42Client> {
        &self.client
    }

    // ── Fetch helpers ────────────────────────────────────────────────

    async fn fetch_list(
        &self,
        resource: &str,
        list_key: Option<&str>,
        kind: EntityKind,
    ) -> Result<Vec<Value>, CoreError> {
        let mut response = self.client.get(resource).await?;
        let items = match &mut response {
            ApiResponse::Json(value) => take_list(value, list_key),
            ApiResponse::Text(_) => None,
        };
        match items {
            Some(items) => {
                debug!(%kind, resource, count = items.len(), "listed");
                Ok(items)
            }
            None => Err(CoreError::Unhydratable { kind, response }),
        }
    }

    async fn fetch_entities<T: Entity>(
        &self,
        resource: &str,
        list_key: Option<&str>,
    ) -> Result<Vec<T>, CoreError> {
        let items = self.fetch_list(resource, list_key, T::SCHEMA.kind).await?;
        Ok(items
            .iter()
            .map(|item| T::hydrate(item, None, Some(Arc::clone(&self.client))))
            .collect())
    }

    // ── Buildings ────────────────────────────────────────────────────

    pub async fn buildings(
        &mut self,
        reload: bool,
    ) -> Result<&IndexMap<String, Building>, CoreError> {
        if self.buildings.needs_fetch(reload) {
            let buildings = self.fetch_entities::<Building>("buildings", Some("buildings")).await?;
            self.buildings.replace(keyed(buildings, by_name));
        }
        Ok(self.buildings.entries())
    }

    pub async fn building(
        &mut self,
        name: &str,
        reload: bool,
    ) -> Result<Option<&Building>, CoreError> {
        self.buildings(reload).await?;
        Ok(self.buildings.get(name))
    }

    // ── Rooms ────────────────────────────────────────────────────────

    pub async fn rooms(&mut self, reload: bool) -> Result<&IndexMap<String, Room>, CoreError> {
        if self.rooms.needs_fetch(reload) {
            let rooms = self.fetch_entities::<Room>("rooms", Some("rooms")).await?;
            self.rooms.replace(keyed(rooms, by_name));
        }
        Ok(self.rooms.entries())
    }

    pub async fn room(&mut self, name: &str, reload: bool) -> Result<Option<&Room>, CoreError> {
        self.rooms(reload).await?;
        Ok(self.rooms.get(name))
    }

    // ── Racks ────────────────────────────────────────────────────────

    /// Every rack, each fully loaded with its mounted devices and assets.
    pub async fn racks(&mut self, reload: bool) -> Result<&IndexMap<String, Rack>, CoreError> {
        if self.racks.needs_fetch(reload) {
            let mut racks: Vec<Rack> = self.fetch_entities("racks", Some("racks")).await?;
            for rack in racks.iter_mut().filter(|rack| rack.id().is_some()) {
                rack.load().await?;
            }
            self.racks.replace(keyed(racks, by_name));
        }
        Ok(self.racks.entries())
    }

    pub async fn rack(&mut self, name: &str, reload: bool) -> Result<Option<&Rack>, CoreError> {
        self.racks(reload).await?;
        Ok(self.racks.get(name))
    }

    pub async fn racks_matching(
        &mut self,
        filter: RackFilter<'_>,
        reload: bool,
    ) -> Result<Vec<&Rack>, CoreError> {
        let racks = self.racks(reload).await?;
        Ok(racks.values().filter(|rack| filter.matches(rack)).collect())
    }

    // ── Assets ───────────────────────────────────────────────────────

    /// Every asset keyed by identifier, each fully loaded.
    pub async fn assets(&mut self, reload: bool) -> Result<&IndexMap<String, Asset>, CoreError> {
        if self.assets.needs_fetch(reload) {
            let mut assets: Vec<Asset> = self.fetch_entities("assets", Some("assets")).await?;
            for asset in assets.iter_mut().filter(|asset| asset.id().is_some()) {
                asset.load().await?;
            }
            self.assets.replace(keyed(assets, by_id));
        }
        Ok(self.assets.entries())
    }

    pub async fn asset(
        &mut self,
        id: &EntityId,
        reload: bool,
    ) -> Result<Option<&Asset>, CoreError> {
        self.assets(reload).await?;
        Ok(self.assets.get(&id.to_string()))
    }

    /// Assets are not unique by name, so every match is returned.
    pub async fn assets_named(
        &mut self,
        name: &str,
        reload: bool,
    ) -> Result<Vec<&Asset>, CoreError> {
        let assets = self.assets(reload).await?;
        Ok(assets
            .values()
            .filter(|asset| asset.name() == Some(name))
            .collect())
    }

    /// Cached assets whose type is `Patch Panel`.
    pub async fn patch_panels(&mut self, reload: bool) -> Result<Vec<&Asset>, CoreError> {
        let assets = self.assets(reload).await?;
        Ok(assets.values().filter(|asset| asset.is_patch_panel()).collect())
    }

    // ── Customers ────────────────────────────────────────────────────

    pub async fn customers(
        &mut self,
        reload: bool,
    ) -> Result<&IndexMap<String, Customer>, CoreError> {
        if self.customers.needs_fetch(reload) {
            let customers = self.fetch_entities::<Customer>("customers", Some("Customers")).await?;
            self.customers.replace(keyed(customers, by_name));
        }
        Ok(self.customers.entries())
    }

    pub async fn customer(
        &mut self,
        name: &str,
        reload: bool,
    ) -> Result<Option<&Customer>, CoreError> {
        self.customers(reload).await?;
        Ok(self.customers.get(name))
    }

    // ── Service levels ───────────────────────────────────────────────

    pub async fn service_levels(
        &mut self,
        reload: bool,
    ) -> Result<&IndexMap<String, ServiceLevel>, CoreError> {
        if self.service_levels.needs_fetch(reload) {
            let levels = self.fetch_entities::<ServiceLevel>("service_level", None).await?;
            self.service_levels.replace(keyed(levels, by_name));
        }
        Ok(self.service_levels.entries())
    }

    pub async fn service_level(
        &mut self,
        name: &str,
        reload: bool,
    ) -> Result<Option<&ServiceLevel>, CoreError> {
        self.service_levels(reload).await?;
        Ok(self.service_levels.get(name))
    }

    // ── MAC addresses ────────────────────────────────────────────────

    /// Every MAC address keyed by its lowercase, colon-separated form.
    pub async fn mac_addresses(
        &mut self,
        reload: bool,
    ) -> Result<&IndexMap<String, MacAddress>, CoreError> {
        if self.mac_addresses.needs_fetch(reload) {
            let macs = self.fetch_entities::<MacAddress>("macs", Some("macaddresses")).await?;
            self.mac_addresses.replace(keyed(macs, by_mac));
        }
        Ok(self.mac_addresses.entries())
    }

    /// Look up a MAC address in any common notation.
    pub async fn mac_address(
        &mut self,
        address: &str,
        reload: bool,
    ) -> Result<Option<&MacAddress>, CoreError> {
        self.mac_addresses(reload).await?;
        Ok(self.mac_addresses.get(&normalize_mac(address)))
    }

    // ── Uncached listings ────────────────────────────────────────────

    pub async fn pdu_models(&self) -> Result<Vec<PduModel>, CoreError> {
        self.fetch_entities("pdu_models", Some("pdu_models")).await
    }

    pub async fn patch_panel_modules(&self) -> Result<Vec<PatchPanelModule>, CoreError> {
        self.fetch_entities("patch_panel_models", None).await
    }

    pub async fn history(&self) -> Result<Vec<History>, CoreError> {
        self.fetch_entities("history", None).await
    }

    // ── Devices ──────────────────────────────────────────────────────

    /// Load a device by identifier.
    pub async fn device_by_id(&self, id: impl Into<EntityId>) -> Result<Device, CoreError> {
        let mut device = Device::new(Some(Arc::clone(&self.client)));
        device.record_mut().set_id(id.into());
        device.load().await?;
        Ok(device)
    }

    /// Resolve a device name to an id, then load it. `None` when the server
    /// does not know the name.
    pub async fn device_by_name(&self, name: &str) -> Result<Option<Device>, CoreError> {
        self.device_lookup(&format!("devices/name/{name}")).await
    }

    pub async fn device_by_serial(&self, serial: &str) -> Result<Option<Device>, CoreError> {
        self.device_lookup(&format!("devices/serial/{serial}")).await
    }

    async fn device_lookup(&self, resource: &str) -> Result<Option<Device>, CoreError> {
        let response = self.client.get(resource).await?;
        let id = response.as_json().and_then(|body| {
            ["id", "device_id"]
                .iter()
                .find_map(|key| body.get(*key).and_then(EntityId::from_value))
        });
        match id {
            Some(id) => self.device_by_id(id).await.map(Some),
            None => {
                debug!(resource, "device lookup found nothing");
                Ok(None)
            }
        }
    }

    // ── Warm-up ──────────────────────────────────────────────────────

    /// Populate the building, customer, rack, room and service-level caches.
    pub async fn prefetch(&mut self) -> Result<(), CoreError> {
        self.buildings(false).await?;
        self.customers(false).await?;
        self.racks(false).await?;
        self.rooms(false).await?;
        self.service_levels(false).await?;
        Ok(())
    }
}
