// ── IP address management ──
//
// MAC and IP addresses, subnets, VLANs, switches and switch ports, and DNS
// records. All are plain leaf entities; IP addresses additionally know how to
// publish forward and reverse DNS records for their owning device.

use std::sync::Arc;

use d42_api::{ApiResponse, ApiVersion, Device42Client};

use super::entity::{Entity, leaf_entity};
use super::record::{Record, WriteMethod};
use super::schema::{EntityKind, Schema, optional, required};
use crate::error::{CoreError, ValidationError};

/// Default DNS record TTL in seconds.
pub const DEFAULT_DNS_TTL: u32 = 86_400;

// ── MAC address ─────────────────────────────────────────────────────

const MAC_SCHEMA: Schema = Schema {
    kind: EntityKind::MacAddress,
    id_field: "macaddress_id",
    envelope: None,
    fields: &[
        required("macaddress"),
        optional("port_name"),
        optional("override"),
        optional("vlan_id"),
        optional("device"),
    ],
    alternatives: &[],
    aliases: &[("mac", "macaddress")],
    children: &[],
};

#[derive(Debug, Clone)]
pub struct MacAddress {
    record: Record,
}

leaf_entity!(MacAddress, MAC_SCHEMA);

impl MacAddress {
    pub fn address(&self) -> Option<&str> {
        self.text("macaddress")
    }

    /// `POST macs/`
    pub async fn save(&mut self) -> Result<ApiResponse, CoreError> {
        self.record
            .write(WriteMethod::Post, ApiVersion::V1, "macs/")
            .await
    }
}

// ── IP address ──────────────────────────────────────────────────────

const IP_SCHEMA: Schema = Schema {
    kind: EntityKind::IpAddress,
    id_field: "ip_id",
    envelope: None,
    fields: &[
        required("ipaddress"),
        optional("tag"),
        optional("subnet"),
        optional("macaddress"),
        optional("device"),
        optional("type"),
        optional("notes"),
        optional("vrf_group_id"),
        optional("vrf_group"),
        optional("available"),
        optional("clear_all"),
    ],
    alternatives: &[],
    aliases: &[("ip", "ipaddress")],
    children: &[],
};

/// An IP address. `type` is `static`, `dhcp` or `reserved`.
#[derive(Debug, Clone)]
pub struct IpAddress {
    record: Record,
}

leaf_entity!(IpAddress, IP_SCHEMA);

impl IpAddress {
    pub fn address(&self) -> Option<&str> {
        self.text("ipaddress")
    }

    /// `POST ip/` on the unversioned API.
    pub async fn save(&mut self) -> Result<ApiResponse, CoreError> {
        self.record
            .write(WriteMethod::Post, ApiVersion::Unversioned, "ip/")
            .await
    }

    /// Host name the DNS records point at: the owner's name, falling back
    /// to the `device` field.
    fn host_name(&self) -> Option<&str> {
        self.record
            .owner()
            .and_then(|owner| owner.name.as_deref())
            .or_else(|| self.text("device"))
    }

    /// Save an `A` record for the owning device and a matching `PTR` record.
    /// The DNS zones must already exist. Returns both responses, forward
    /// record first.
    pub async fn save_dns_records(
        &self,
        nameserver: Option<&str>,
        ttl: u32,
    ) -> Result<Vec<ApiResponse>, CoreError> {
        let host = self
            .host_name()
            .ok_or(ValidationError::MissingRequired { field: "device" })?;
        let address = self
            .address()
            .ok_or(ValidationError::MissingRequired { field: "ipaddress" })?;
        let client = self.record.client().cloned();

        let mut forward = DnsRecord::pointing(client.clone(), host, "A", address, nameserver, ttl);
        let reverse_name = reverse_pointer_name(address);
        let mut reverse = DnsRecord::pointing(client, &reverse_name, "PTR", host, nameserver, ttl);

        let forward = forward.save().await?;
        let reverse = reverse.save().await?;
        Ok(vec![forward, reverse])
    }
}

/// `1.2.3.4` becomes `4.3.2.1.in-addr.arpa`.
pub fn reverse_pointer_name(address: &str) -> String {
    let octets: Vec<&str> = address.split('.').rev().collect();
    format!("{}.in-addr.arpa", octets.join("."))
}

// ── Subnet ──────────────────────────────────────────────────────────

const SUBNET_SCHEMA: Schema = Schema {
    kind: EntityKind::Subnet,
    id_field: "subnet_id",
    envelope: None,
    fields: &[
        required("network"),
        required("mask_bits"),
        optional("vrf_group_id"),
        optional("name"),
        optional("description"),
        optional("number"),
        optional("gateway"),
        optional("range_begin"),
        optional("range_end"),
        optional("parent_vlan_id"),
        optional("customer_id"),
        optional("customer"),
        optional("notes"),
    ],
    alternatives: &[],
    aliases: &[],
    children: &[],
};

#[derive(Debug, Clone)]
pub struct Subnet {
    record: Record,
}

leaf_entity!(Subnet, SUBNET_SCHEMA);

impl Subnet {
    /// `POST subnets/`
    pub async fn save(&mut self) -> Result<ApiResponse, CoreError> {
        self.record
            .write(WriteMethod::Post, ApiVersion::V1, "subnets/")
            .await
    }
}

// ── VLAN ────────────────────────────────────────────────────────────

const VLAN_SCHEMA: Schema = Schema {
    kind: EntityKind::Vlan,
    id_field: "vlan_id",
    envelope: None,
    fields: &[
        required("number"),
        optional("name"),
        optional("description"),
        optional("switch_id"),
        optional("switches"),
        optional("notes"),
    ],
    alternatives: &[],
    aliases: &[],
    children: &[],
};

#[derive(Debug, Clone)]
pub struct Vlan {
    record: Record,
}

leaf_entity!(Vlan, VLAN_SCHEMA);

impl Vlan {
    /// `POST vlans/`
    pub async fn save(&mut self) -> Result<ApiResponse, CoreError> {
        self.record
            .write(WriteMethod::Post, ApiVersion::V1, "vlans/")
            .await
    }
}

// ── Switch port ─────────────────────────────────────────────────────

const SWITCHPORT_SCHEMA: Schema = Schema {
    kind: EntityKind::Switchport,
    id_field: "switchport_id",
    envelope: None,
    fields: &[
        required("port"),
        optional("switch"),
        optional("description"),
        optional("type"),
        optional("vlan_ids"),
        optional("up"),
        optional("up_admin"),
        optional("count"),
        optional("remote_port_id"),
        optional("remote_device"),
        optional("remote_port"),
        optional("notes"),
        optional("switchport_id"),
    ],
    alternatives: &[],
    aliases: &[],
    children: &[],
};

#[derive(Debug, Clone)]
pub struct Switchport {
    record: Record,
}

leaf_entity!(Switchport, SWITCHPORT_SCHEMA);

impl Switchport {
    /// `POST switchports/`
    pub async fn save(&mut self) -> Result<ApiResponse, CoreError> {
        self.record
            .write(WriteMethod::Post, ApiVersion::V1, "switchports/")
            .await
    }
}

// ── Switch ──────────────────────────────────────────────────────────

const SWITCH_SCHEMA: Schema = Schema {
    kind: EntityKind::Switch,
    id_field: "switch_id",
    envelope: None,
    fields: &[
        required("device"),
        required("switch_template_id"),
        optional("device_id"),
        optional("notes"),
    ],
    alternatives: &[],
    aliases: &[],
    children: &[],
};

#[derive(Debug, Clone)]
pub struct Switch {
    record: Record,
}

leaf_entity!(Switch, SWITCH_SCHEMA);

impl Switch {
    /// `POST switches/`
    pub async fn save(&mut self) -> Result<ApiResponse, CoreError> {
        self.record
            .write(WriteMethod::Post, ApiVersion::V1, "switches/")
            .await
    }
}

// ── DNS record ──────────────────────────────────────────────────────

const DNS_SCHEMA: Schema = Schema {
    kind: EntityKind::DnsRecord,
    id_field: "record_id",
    envelope: None,
    fields: &[
        required("domain"),
        required("type"),
        optional("nameserver"),
        optional("name"),
        optional("content"),
        optional("prio"),
        optional("ttl"),
    ],
    alternatives: &[],
    aliases: &[],
    children: &[],
};

#[derive(Debug, Clone)]
pub struct DnsRecord {
    record: Record,
}

leaf_entity!(DnsRecord, DNS_SCHEMA);

impl DnsRecord {
    /// A record named `name` in the zone formed by dropping its first label.
    pub fn pointing(
        client: Option<Arc<Device42Client>>,
        name: &str,
        record_type: &str,
        content: &str,
        nameserver: Option<&str>,
        ttl: u32,
    ) -> Self {
        let domain = name.split_once('.').map_or("", |(_, zone)| zone);
        let mut record = Self::new(client);
        record
            .set("name", name)
            .set("domain", domain)
            .set("type", record_type)
            .set("content", content)
            .set("ttl", ttl);
        if let Some(nameserver) = nameserver {
            record.set("nameserver", nameserver);
        }
        record
    }

    /// `POST dns/records/`
    pub async fn save(&mut self) -> Result<ApiResponse, CoreError> {
        self.record
            .write(WriteMethod::Post, ApiVersion::V1, "dns/records/")
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::diff::FormValue;
    use serde_json::json;

    #[test]
    fn reverse_pointer() {
        assert_eq!(reverse_pointer_name("10.1.2.3"), "3.2.1.10.in-addr.arpa");
    }

    #[test]
    fn dns_record_zone_from_name() {
        let record = DnsRecord::pointing(None, "web01.example.com", "A", "10.0.0.5", None, 300);
        let payload = record.payload().unwrap();
        assert_eq!(payload.get("domain"), Some(&FormValue::from("example.com")));
        assert_eq!(payload.get("ttl"), Some(&FormValue::from(300)));
        assert!(!payload.contains("nameserver"));
    }

    #[test]
    fn mac_alias_hydrates_address() {
        let mac = MacAddress::hydrate(
            &json!({"mac": "00:11:22:33:44:55", "macaddress_id": 3}),
            None,
            None,
        );
        assert_eq!(mac.address(), Some("00:11:22:33:44:55"));
        assert!(mac.payload().unwrap().is_empty());
    }

    #[test]
    fn switchport_id_mirrors_into_field() {
        let mut port = Switchport::new(None);
        port.set("port", "ge-0/0/1");
        port.record_mut().set_id(crate::model::EntityId::Numeric(17));
        assert_eq!(port.get("switchport_id"), Some(&json!(17)));
    }

    #[test]
    fn subnet_requires_mask_bits() {
        let mut subnet = Subnet::new(None);
        subnet.set("network", "10.0.0.0");
        assert_eq!(
            subnet.validate(),
            Err(ValidationError::MissingRequired { field: "mask_bits" })
        );
    }

    #[test]
    fn host_name_prefers_owner_link() {
        let ip = IpAddress::hydrate(
            &json!({"ip": "10.0.0.5", "device": "stale"}),
            Some(crate::model::OwnerLink {
                kind: EntityKind::Device,
                id: None,
                name: Some("web01.example.com".into()),
            }),
            None,
        );
        assert_eq!(ip.host_name(), Some("web01.example.com"));
    }
}
