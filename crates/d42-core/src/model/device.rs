// ── Devices and hardware models ──

use std::fmt;

use d42_api::{ApiResponse, ApiVersion};
use serde_json::{Map, Value};

use super::custom_field::CustomField;
use super::entity::{Entity, hydrate_children, leaf_entity};
use super::ipam::{IpAddress, MacAddress};
use super::record::{Record, WriteMethod};
use super::schema::{EntityKind, Schema, optional, required};
use crate::error::CoreError;

const SCHEMA: Schema = Schema {
    kind: EntityKind::Device,
    id_field: "device_id",
    envelope: Some("device"),
    fields: &[
        required("name"),
        optional("serial_no"),
        optional("asset_no"),
        optional("manufacturer"),
        optional("hardware"),
        optional("type"),
        optional("service_level"),
        optional("virtual_host"),
        optional("blade_host"),
        optional("slot_no"),
        optional("storage_room_id"),
        optional("storage_room"),
        optional("os"),
        optional("osver"),
        optional("memory"),
        optional("cpucount"),
        optional("cpupower"),
        optional("cpucore"),
        optional("hddcount"),
        optional("hddsize"),
        optional("hddraid"),
        optional("hddraid_type"),
        optional("devices_in_cluster"),
        optional("appcomps"),
        optional("customer"),
        optional("contract"),
        optional("aliases"),
        optional("notes"),
        optional("is_it_switch"),
        optional("is_it_virtual_host"),
        optional("is_it_blade_host"),
        optional("in_service"),
    ],
    alternatives: &[],
    aliases: &[("hw_model", "hardware")],
    children: &["mac_addresses", "ip_addresses"],
};

#[derive(Debug, Clone)]
pub struct Device {
    record: Record,
    mac_addresses: Vec<MacAddress>,
    ip_addresses: Vec<IpAddress>,
}

impl Entity for Device {
    const SCHEMA: &'static Schema = &SCHEMA;

    fn from_parts(record: Record, children: Map<String, Value>) -> Self {
        let mut device = Self {
            record,
            mac_addresses: Vec::new(),
            ip_addresses: Vec::new(),
        };
        device.adopt(&children);
        device
    }

    fn record(&self) -> &Record {
        &self.record
    }

    fn record_mut(&mut self) -> &mut Record {
        &mut self.record
    }
}

impl Device {
    pub fn mac_addresses(&self) -> &[MacAddress] {
        &self.mac_addresses
    }

    pub fn ip_addresses(&self) -> &[IpAddress] {
        &self.ip_addresses
    }

    fn adopt(&mut self, children: &Map<String, Value>) {
        let owner = self.record.link();
        let client = self.record.client();
        if let Some(macs) = hydrate_children(children, "mac_addresses", &owner, client) {
            self.mac_addresses = macs;
        }
        if let Some(ips) = hydrate_children(children, "ip_addresses", &owner, client) {
            self.ip_addresses = ips;
        }
    }

    /// `POST device/` on the unversioned API.
    pub async fn save(&mut self) -> Result<ApiResponse, CoreError> {
        self.record
            .write(WriteMethod::Post, ApiVersion::Unversioned, "device/")
            .await
    }

    /// `GET devices/id/{id}/`
    pub async fn load(&mut self) -> Result<(), CoreError> {
        let Some(data) = self.record.fetch(|id| format!("devices/id/{id}/")).await? else {
            return Ok(());
        };
        let children = self.record.absorb(&data);
        self.adopt(&children);
        Ok(())
    }

    /// Create a MAC address bound to this device; kept as a child when the
    /// server accepts it.
    pub async fn add_mac(
        &mut self,
        address: &str,
        port_name: Option<&str>,
    ) -> Result<ApiResponse, CoreError> {
        let mut mac = MacAddress::new(self.record.client().cloned());
        mac.set("macaddress", address);
        if let Some(port_name) = port_name {
            mac.set("port_name", port_name);
        }
        if let Some(name) = self.name() {
            mac.set("device", name);
        }
        mac.record_mut().set_owner(self.record.link());

        let response = mac.save().await?;
        if response.is_success() {
            self.mac_addresses.push(mac);
        }
        Ok(response)
    }

    /// Create a static IP bound to this device. Without an explicit MAC the
    /// device's only MAC address is used, if it has exactly one.
    pub async fn add_ip(
        &mut self,
        address: &str,
        mac: Option<&str>,
    ) -> Result<ApiResponse, CoreError> {
        let mut ip = IpAddress::new(self.record.client().cloned());
        ip.set("ipaddress", address);

        let mac = mac.or_else(|| match self.mac_addresses.as_slice() {
            [only] => only.address(),
            _ => None,
        });
        if let Some(mac) = mac {
            ip.set("macaddress", mac);
        }
        if let Some(name) = self.name() {
            ip.set("device", name);
        }
        ip.set("type", "static");
        ip.record_mut().set_owner(self.record.link());

        let response = ip.save().await?;
        if response.is_success() {
            self.ip_addresses.push(ip);
        }
        Ok(response)
    }

    /// Save A and PTR records for every IP address, named after the device's
    /// current name.
    pub async fn save_dns_records(
        &mut self,
        nameserver: Option<&str>,
        ttl: u32,
    ) -> Result<Vec<ApiResponse>, CoreError> {
        let owner = self.record.link();
        let mut responses = Vec::with_capacity(self.ip_addresses.len() * 2);
        for ip in &mut self.ip_addresses {
            ip.record_mut().set_owner(owner.clone());
            responses.extend(ip.save_dns_records(nameserver, ttl).await?);
        }
        Ok(responses)
    }

    pub async fn add_custom_field(&mut self, field: CustomField) -> Result<ApiResponse, CoreError> {
        self.record.add_custom_field(field).await
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name().unwrap_or_default())
    }
}

// ── Hardware model ──────────────────────────────────────────────────

const HARDWARE_SCHEMA: Schema = Schema {
    kind: EntityKind::Hardware,
    id_field: "hardware_id",
    envelope: None,
    fields: &[
        required("name"),
        optional("type"),
        optional("size"),
        optional("depth"),
        optional("blade_size"),
        optional("part_no"),
        optional("watts"),
        optional("spec_url"),
        optional("manufacturer"),
        optional("front_image_id"),
        optional("back_image_id"),
        optional("notes"),
    ],
    alternatives: &[],
    aliases: &[],
    children: &[],
};

/// A hardware model. `type`: 1 regular, 2 blade, 3 other. `depth`: 1 full,
/// 2 half.
#[derive(Debug, Clone)]
pub struct Hardware {
    record: Record,
}

leaf_entity!(Hardware, HARDWARE_SCHEMA);

impl Hardware {
    /// `POST hardwares/`
    pub async fn save(&mut self) -> Result<ApiResponse, CoreError> {
        self.record
            .write(WriteMethod::Post, ApiVersion::V1, "hardwares/")
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn hw_model_alias_fills_hardware() {
        let device = Device::hydrate(
            &json!({"device_id": 5, "name": "web01", "hw_model": "PowerEdge R640"}),
            None,
            None,
        );
        assert_eq!(device.text("hardware"), Some("PowerEdge R640"));
        assert!(device.payload().unwrap().is_empty());
    }

    #[test]
    fn envelope_and_children() {
        let device = Device::hydrate(
            &json!({"device": {
                "device_id": 5, "name": "web01",
                "mac_addresses": [{"mac": "00:11:22:33:44:55", "port_name": "eth0"}],
                "ip_addresses": [{"ip": "10.0.0.5", "label": ""}]
            }, "start_at": 4}),
            None,
            None,
        );

        assert_eq!(device.mac_addresses()[0].address(), Some("00:11:22:33:44:55"));
        assert_eq!(device.ip_addresses()[0].text("ipaddress"), Some("10.0.0.5"));
        assert_eq!(
            device.ip_addresses()[0].record().owner().and_then(|o| o.name.as_deref()),
            Some("web01")
        );
    }

    #[test]
    fn null_required_field_from_server_is_still_valid() {
        let device = Device::hydrate(
            &json!({"device_id": 4, "name": null, "os": "linux"}),
            None,
            None,
        );
        assert_eq!(device.get("name"), Some(&Value::Null));
        assert_eq!(device.validate(), Ok(()));
        assert!(device.payload().unwrap().is_empty());
    }

    #[test]
    fn renaming_sends_only_the_name() {
        let mut device = Device::hydrate(
            &json!({"device_id": 5, "name": "web01", "serial_no": "X1", "os": "linux"}),
            None,
            None,
        );
        device.set("name", "web01.example.com");
        let payload = device.payload().unwrap();
        assert_eq!(payload.keys().collect::<Vec<_>>(), vec!["name"]);
    }
}
