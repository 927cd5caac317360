// ── Inventory domain model ──
//
// One declarative `Schema` per Device42 entity type drives a shared engine
// (`Record`): tri-state fields, snapshot-based change diffing, validation,
// hydration from server responses. Each typed wrapper adds only its write
// path, load path and child collections.

pub mod diff;
pub mod entity;
pub mod entity_id;
pub mod field;
pub mod record;
pub mod schema;

pub mod asset;
pub mod building;
pub mod custom_field;
pub mod customer;
pub mod device;
pub mod history;
pub mod ipam;
pub mod patch_panel;
pub mod power;
pub mod rack;
pub mod room;

// ── Re-exports ──────────────────────────────────────────────────────

// Engine
pub use diff::{FormValue, Payload};
pub use entity::Entity;
pub use entity_id::{EntityId, normalize_mac};
pub use field::Field;
pub use record::{OwnerLink, Record};
pub use schema::{EntityKind, FieldSpec, Presence, Schema};

// Locations
pub use building::Building;
pub use rack::{MountOrder, MountPosition, MountSlot, Rack};
pub use room::Room;

// Inventory
pub use asset::{Asset, PATCH_PANEL_TYPE};
pub use custom_field::{CustomField, CustomFieldTarget};
pub use customer::{Customer, ServiceLevel};
pub use device::{Device, Hardware};
pub use history::History;
pub use patch_panel::{PatchPanelModule, PatchPanelPort};
pub use power::{Pdu, PduModel};

// IPAM
pub use ipam::{
    DEFAULT_DNS_TTL, DnsRecord, IpAddress, MacAddress, Subnet, Switch, Switchport, Vlan,
    reverse_pointer_name,
};
