// d42-core: Device42 inventory model, change-diff engine and cached
// repository on top of d42-api.

pub mod config;
pub mod error;
pub mod model;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{ConnectionConfig, DEFAULT_PORT, TlsVerification};
pub use error::{CoreError, ValidationError};
pub use store::{Inventory, RackFilter};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    // Engine
    Entity, EntityId, EntityKind, Field, FormValue, OwnerLink, Payload, Record,
    // Locations
    Building, MountOrder, MountPosition, MountSlot, Rack, Room,
    // Inventory
    Asset, CustomField, CustomFieldTarget, Customer, Device, Hardware, History, PatchPanelModule,
    PatchPanelPort, Pdu, PduModel, ServiceLevel,
    // IPAM
    DnsRecord, IpAddress, MacAddress, Subnet, Switch, Switchport, Vlan,
};

pub use d42_api::ApiResponse;
