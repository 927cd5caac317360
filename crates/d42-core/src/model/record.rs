// ── Generic entity engine ──
//
// One `Record` backs every entity type. It holds the declared fields (as
// tri-state markers), undeclared server keys, the snapshot taken at the last
// hydration, and the identifier. Type-specific behaviour (write paths,
// children) lives in the per-entity wrappers.

use std::sync::Arc;

use d42_api::{ApiResponse, ApiVersion, Device42Client};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::{debug, trace, warn};

use super::custom_field::CustomField;
use super::diff::{self, Payload};
use super::entity_id::EntityId;
use super::field::Field;
use super::schema::{EntityKind, Schema};
use crate::error::{CoreError, ValidationError};

/// Non-owning back-reference to the entity that constructed or loaded this
/// one. Only used for contextual operations (custom field binding, DNS
/// names), never for lifetime management.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerLink {
    pub kind: EntityKind,
    pub id: Option<EntityId>,
    pub name: Option<String>,
}

/// How a server `null` lands on a declared field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Nulls {
    /// Construction from data: `null` is a value like any other.
    Keep,
    /// Reload: `null` leaves the current field state alone.
    Skip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WriteMethod {
    Post,
    Put,
}

#[derive(Debug, Clone)]
pub struct Record {
    schema: &'static Schema,
    values: IndexMap<&'static str, Field>,
    extra: Map<String, Value>,
    snapshot: Map<String, Value>,
    id: Option<EntityId>,
    custom_fields: Vec<CustomField>,
    owner: Option<OwnerLink>,
    client: Option<Arc<Device42Client>>,
}

impl Record {
    /// Every declared field at its default marker, empty snapshot, no id.
    pub fn bare(schema: &'static Schema, client: Option<Arc<Device42Client>>) -> Self {
        let values = schema
            .fields
            .iter()
            .map(|spec| (spec.name, Field::from(spec.presence)))
            .collect();
        Self {
            schema,
            values,
            extra: Map::new(),
            snapshot: Map::new(),
            id: None,
            custom_fields: Vec::new(),
            owner: None,
            client,
        }
    }

    /// Build from server data. Returns the record plus the raw child
    /// collections the schema names, for the caller to classify.
    pub fn hydrate(
        schema: &'static Schema,
        data: &Value,
        owner: Option<OwnerLink>,
        client: Option<Arc<Device42Client>>,
    ) -> (Self, Map<String, Value>) {
        let mut record = Self::bare(schema, client);
        record.owner = owner;
        let children = record.merge(data, Nulls::Keep);
        (record, children)
    }

    /// Merge a reloaded server representation into this record and replace
    /// the snapshot with it.
    ///
    /// Declared keys overwrite the field unless the server sent `null`,
    /// undeclared keys land in `extra`, child-collection keys are handed
    /// back untouched and `custom_fields` items become nested custom fields.
    pub fn absorb(&mut self, data: &Value) -> Map<String, Value> {
        self.merge(data, Nulls::Skip)
    }

    fn merge(&mut self, data: &Value, nulls: Nulls) -> Map<String, Value> {
        let Some(object) = self.unwrap_envelope(data) else {
            warn!(kind = %self.kind(), "ignoring non-object entity data");
            return Map::new();
        };

        let mut snapshot = object.clone();
        let mut children = Map::new();
        let mut custom_fields = None;

        for (key, value) in object {
            if key == "custom_fields" {
                custom_fields = Some(value);
                continue;
            }
            if self.schema.is_child_collection(key) {
                children.insert(key.clone(), value.clone());
                continue;
            }
            self.assign(key, value, nulls);
            if let Some(target) = self
                .schema
                .alias_target(key)
                .filter(|target| !object.contains_key(*target))
            {
                self.assign(target, value, nulls);
                snapshot.insert(target.to_owned(), value.clone());
            }
        }

        if let Some(id) = self.identifier_in(object) {
            self.id = Some(id);
        }
        self.snapshot = snapshot;

        match custom_fields {
            Some(Value::Array(items)) => {
                let attached: Vec<CustomField> = items
                    .iter()
                    .map(|item| CustomField::attached(item, self))
                    .collect();
                self.custom_fields = attached;
            }
            Some(Value::Null) | None => {}
            Some(other) => warn!(kind = %self.kind(), ?other, "custom_fields is not a list"),
        }

        children
    }

    fn unwrap_envelope<'a>(&self, data: &'a Value) -> Option<&'a Map<String, Value>> {
        let object = data.as_object()?;
        match self.schema.envelope.and_then(|key| object.get(key)) {
            Some(Value::Object(inner)) => Some(inner),
            _ => Some(object),
        }
    }

    fn identifier_in(&self, object: &Map<String, Value>) -> Option<EntityId> {
        [self.schema.id_field, "id"]
            .iter()
            .find_map(|key| object.get(*key).and_then(EntityId::from_value))
    }

    fn assign(&mut self, key: &str, value: &Value, nulls: Nulls) {
        match self.values.get_mut(key) {
            Some(field) => {
                if !(value.is_null() && nulls == Nulls::Skip) {
                    *field = Field::Set(value.clone());
                }
            }
            None => {
                self.extra.insert(key.to_owned(), value.clone());
            }
        }
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub const fn schema(&self) -> &'static Schema {
        self.schema
    }

    pub const fn kind(&self) -> EntityKind {
        self.schema.kind
    }

    /// Current value of a declared field (if set) or an undeclared attribute.
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self.values.get(name) {
            Some(field) => field.value(),
            None => self.extra.get(name),
        }
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// The marker state of a declared field.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.values.get(name)
    }

    pub fn set(&mut self, name: &str, value: Value) {
        match self.values.get_mut(name) {
            Some(field) => *field = Field::Set(value),
            None => {
                self.extra.insert(name.to_owned(), value);
            }
        }
    }

    /// Return a declared field to its default marker, or drop an
    /// undeclared attribute.
    pub fn unset(&mut self, name: &str) {
        match self.schema.field(name) {
            Some(spec) => {
                self.values.insert(spec.name, Field::from(spec.presence));
            }
            None => {
                self.extra.remove(name);
            }
        }
    }

    pub const fn id(&self) -> Option<&EntityId> {
        self.id.as_ref()
    }

    /// Store the identifier; mirror it into the id field when that field is
    /// declared so the next write addresses the same record.
    pub fn set_id(&mut self, id: EntityId) {
        if self.schema.is_declared(self.schema.id_field) {
            self.set(self.schema.id_field, id.to_value());
        }
        self.id = Some(id);
    }

    pub const fn snapshot(&self) -> &Map<String, Value> {
        &self.snapshot
    }

    pub const fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    pub fn custom_fields(&self) -> &[CustomField] {
        &self.custom_fields
    }

    pub const fn owner(&self) -> Option<&OwnerLink> {
        self.owner.as_ref()
    }

    pub fn set_owner(&mut self, owner: OwnerLink) {
        self.owner = Some(owner);
    }

    pub const fn client(&self) -> Option<&Arc<Device42Client>> {
        self.client.as_ref()
    }

    pub fn attach(&mut self, client: Arc<Device42Client>) {
        self.client = Some(client);
    }

    /// A back-reference to this record for entities it constructs.
    pub fn link(&self) -> OwnerLink {
        OwnerLink {
            kind: self.kind(),
            id: self.id.clone(),
            name: self.text("name").map(str::to_owned),
        }
    }

    // ── Validation and diffing ───────────────────────────────────────

    /// Fail on the first required field left unset. A field that belongs to
    /// an alternative group only fails when every member is unset.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (name, field) in &self.values {
            if !field.is_missing() {
                continue;
            }
            let Some(group) = self.schema.alternatives_for(name) else {
                return Err(ValidationError::MissingRequired { field: *name });
            };
            let satisfied = group
                .iter()
                .any(|member| self.values.get(*member).is_some_and(|f| !f.is_unset()));
            if !satisfied {
                return Err(ValidationError::MissingAlternative { fields: group });
            }
        }
        Ok(())
    }

    pub fn payload(&self) -> Result<Payload, ValidationError> {
        self.validate()?;
        Ok(diff::changed_fields(&self.values, &self.extra, &self.snapshot))
    }

    // ── Remote operations ────────────────────────────────────────────

    pub(crate) fn require_client(&self) -> Result<Arc<Device42Client>, CoreError> {
        self.client
            .clone()
            .ok_or(CoreError::NoClient { kind: self.kind() })
    }

    /// Validate, diff and send. A success envelope stores the assigned id;
    /// any other response is returned untouched.
    pub(crate) async fn write(
        &mut self,
        method: WriteMethod,
        version: ApiVersion,
        resource: &str,
    ) -> Result<ApiResponse, CoreError> {
        let payload = self.payload()?;
        let client = self.require_client()?;

        debug!(kind = %self.kind(), resource, fields = payload.len(), "saving entity");
        trace!(?payload, "write payload");

        let response = match method {
            WriteMethod::Post => client.post(version, resource, &payload).await?,
            WriteMethod::Put => client.put(version, resource, &payload).await?,
        };
        self.record_write(&response);
        Ok(response)
    }

    fn record_write(&mut self, response: &ApiResponse) {
        match response.envelope() {
            Some(envelope) if envelope.is_success() => {
                if let Some(id) = envelope.assigned_id().and_then(EntityId::from_value) {
                    debug!(kind = %self.kind(), %id, "identifier assigned");
                    self.set_id(id);
                }
            }
            Some(envelope) => warn!(
                kind = %self.kind(),
                code = envelope.code,
                msg = envelope.description().unwrap_or_default(),
                "write rejected"
            ),
            None => warn!(kind = %self.kind(), "write answered without an envelope"),
        }
    }

    /// Bind `field` to this record, save it and keep it on success.
    pub(crate) async fn add_custom_field(
        &mut self,
        mut field: CustomField,
    ) -> Result<ApiResponse, CoreError> {
        field.bind(self)?;
        let response = field.save().await?;
        if response.is_success() {
            self.custom_fields.push(field);
        }
        Ok(response)
    }

    /// Fetch this record's current representation. `Ok(None)` when no client
    /// is attached.
    pub(crate) async fn fetch(
        &self,
        resource: impl FnOnce(&EntityId) -> String,
    ) -> Result<Option<Value>, CoreError> {
        let Some(client) = self.client.clone() else {
            debug!(kind = %self.kind(), "load skipped, no client attached");
            return Ok(None);
        };
        let id = self.id.as_ref().ok_or(ValidationError::MissingRequired {
            field: self.schema.id_field,
        })?;

        let path = resource(id);
        debug!(kind = %self.kind(), %id, "loading entity");
        match client.get(&path).await? {
            ApiResponse::Json(value) if value.is_object() => Ok(Some(value)),
            response => Err(CoreError::Unhydratable {
                kind: self.kind(),
                response,
            }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::schema::{optional, required};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const RACKISH: Schema = Schema {
        kind: EntityKind::Rack,
        id_field: "rack_id",
        envelope: Some("rack"),
        fields: &[
            required("name"),
            required("size"),
            required("room"),
            required("room_id"),
            optional("notes"),
        ],
        alternatives: &[&["room", "room_id"]],
        aliases: &[("rack_name", "name")],
        children: &["devices"],
    };

    const SWITCHPORTISH: Schema = Schema {
        kind: EntityKind::Switchport,
        id_field: "switchport_id",
        envelope: None,
        fields: &[required("port"), optional("switchport_id")],
        alternatives: &[],
        aliases: &[],
        children: &[],
    };

    #[test]
    fn bare_record_fails_on_first_missing_field() {
        let record = Record::bare(&RACKISH, None);
        assert_eq!(
            record.validate(),
            Err(ValidationError::MissingRequired { field: "name" })
        );
    }

    #[test]
    fn alternatives_accept_either_member() {
        let mut record = Record::bare(&RACKISH, None);
        record.set("name", json!("R1"));
        record.set("size", json!(42));
        assert_eq!(
            record.validate(),
            Err(ValidationError::MissingAlternative {
                fields: &["room", "room_id"]
            })
        );

        let mut only_room = record.clone();
        only_room.set("room", json!("Lab"));
        assert!(only_room.validate().is_ok());

        let mut only_id = record.clone();
        only_id.set("room_id", json!(3));
        assert!(only_id.validate().is_ok());

        let mut both = only_room.clone();
        both.set("room_id", json!(3));
        assert!(both.validate().is_ok());
    }

    #[test]
    fn hydrate_unwraps_envelope_and_splits_children() {
        let data = json!({"rack": {
            "rack_id": 9, "name": "R1", "size": 42, "room": "Lab",
            "row": "A", "devices": [{"device": {"name": "d"}, "start_at": 1}]
        }});
        let (record, children) = Record::hydrate(&RACKISH, &data, None, None);

        assert_eq!(record.id(), Some(&EntityId::Numeric(9)));
        assert_eq!(record.text("row"), Some("A"));
        assert!(children.contains_key("devices"));
        assert!(record.extra().get("devices").is_none());
        assert!(record.payload().unwrap().is_empty());
    }

    #[test]
    fn hydrated_null_counts_as_set() {
        let data = json!({"name": null, "size": 42, "room": "Lab", "notes": null});
        let (record, _) = Record::hydrate(&RACKISH, &data, None, None);

        assert_eq!(record.field("name"), Some(&Field::Set(Value::Null)));
        assert_eq!(record.snapshot().get("notes"), Some(&Value::Null));
        assert_eq!(record.payload(), Ok(Payload::new()));
    }

    #[test]
    fn reload_null_keeps_current_value() {
        let data = json!({"name": "R1", "size": 42, "room": "Lab", "notes": "old"});
        let (mut record, _) = Record::hydrate(&RACKISH, &data, None, None);

        record.absorb(&json!({"name": "R1", "size": 42, "room": "Lab", "notes": null}));

        assert_eq!(record.text("notes"), Some("old"));
        assert_eq!(record.snapshot().get("notes"), Some(&Value::Null));
    }

    #[test]
    fn alias_populates_target_and_snapshot() {
        let data = json!({"rack_name": "R1", "size": 42, "room": "Lab"});
        let (record, _) = Record::hydrate(&RACKISH, &data, None, None);

        assert_eq!(record.text("name"), Some("R1"));
        assert_eq!(record.snapshot().get("name"), Some(&json!("R1")));
        assert!(record.payload().unwrap().is_empty());
    }

    #[test]
    fn set_id_mirrors_declared_id_field() {
        let mut record = Record::bare(&SWITCHPORTISH, None);
        record.set_id(EntityId::Numeric(12));
        assert_eq!(record.get("switchport_id"), Some(&json!(12)));

        let mut undeclared = Record::bare(&RACKISH, None);
        undeclared.set_id(EntityId::Numeric(12));
        assert_eq!(undeclared.get("rack_id"), None);
        assert_eq!(undeclared.id(), Some(&EntityId::Numeric(12)));
    }

    #[test]
    fn unset_restores_marker() {
        let mut record = Record::bare(&RACKISH, None);
        record.set("notes", json!("x"));
        record.set("color", json!("red"));
        record.unset("notes");
        record.unset("color");
        assert_eq!(record.field("notes"), Some(&Field::optional()));
        assert_eq!(record.get("color"), None);
    }

    #[test]
    fn link_carries_name_and_id() {
        let data = json!({"rack_id": 4, "name": "R4", "size": 42, "room": "Lab"});
        let (record, _) = Record::hydrate(&RACKISH, &data, None, None);
        assert_eq!(
            record.link(),
            OwnerLink {
                kind: EntityKind::Rack,
                id: Some(EntityId::Numeric(4)),
                name: Some("R4".into()),
            }
        );
    }
}
