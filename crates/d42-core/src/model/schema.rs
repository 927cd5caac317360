// Static entity schemas
//
// Every entity type is described by one `Schema` constant: its declared
// fields in payload order, the "A or B" requirement groups, server-side key
// aliases, child-collection keys and the response envelope it may arrive in.

use strum::{Display, IntoStaticStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum EntityKind {
    Building,
    Room,
    Rack,
    Asset,
    Device,
    Hardware,
    Pdu,
    PatchPanelPort,
    MacAddress,
    IpAddress,
    Subnet,
    Vlan,
    Switchport,
    Switch,
    Customer,
    DnsRecord,
    CustomField,
    ServiceLevel,
    History,
    PduModel,
    PatchPanelModule,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Required,
    Optional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub presence: Presence,
}

pub const fn required(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        presence: Presence::Required,
    }
}

pub const fn optional(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        presence: Presence::Optional,
    }
}

#[derive(Debug)]
pub struct Schema {
    pub kind: EntityKind,
    /// Response key holding the server-assigned identifier.
    pub id_field: &'static str,
    /// Wrapper key single-entity responses may be nested under.
    pub envelope: Option<&'static str>,
    /// Declared fields, in payload order.
    pub fields: &'static [FieldSpec],
    /// Groups where at least one member must be set. Members are also
    /// declared `Required` so each stays in the payload when set.
    pub alternatives: &'static [&'static [&'static str]],
    /// `(server_key, field)` renames applied on hydration.
    pub aliases: &'static [(&'static str, &'static str)],
    /// Response keys holding nested entities.
    pub children: &'static [&'static str],
}

impl Schema {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|spec| spec.name == name)
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// The requirement group `name` belongs to, if any.
    pub fn alternatives_for(&self, name: &str) -> Option<&'static [&'static str]> {
        self.alternatives
            .iter()
            .copied()
            .find(|group| group.contains(&name))
    }

    pub fn alias_target(&self, server_key: &str) -> Option<&'static str> {
        self.aliases
            .iter()
            .find(|(key, _)| *key == server_key)
            .map(|(_, field)| *field)
    }

    pub fn is_child_collection(&self, key: &str) -> bool {
        self.children.contains(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: Schema = Schema {
        kind: EntityKind::Room,
        id_field: "room_id",
        envelope: None,
        fields: &[
            required("name"),
            required("building_id"),
            required("building"),
            optional("notes"),
        ],
        alternatives: &[&["building_id", "building"]],
        aliases: &[("bldg", "building")],
        children: &["racks"],
    };

    #[test]
    fn lookups() {
        assert!(SAMPLE.is_declared("notes"));
        assert!(!SAMPLE.is_declared("racks"));
        assert_eq!(SAMPLE.field("name").map(|f| f.presence), Some(Presence::Required));
        assert_eq!(SAMPLE.alternatives_for("building"), Some(&["building_id", "building"][..]));
        assert_eq!(SAMPLE.alternatives_for("name"), None);
        assert_eq!(SAMPLE.alias_target("bldg"), Some("building"));
        assert!(SAMPLE.is_child_collection("racks"));
    }

    #[test]
    fn kind_display_is_snake_case() {
        assert_eq!(EntityKind::PatchPanelPort.to_string(), "patch_panel_port");
        assert_eq!(EntityKind::Rack.to_string(), "rack");
    }
}
