// ── Audit history (read-only) ──

use std::fmt;

use chrono::{DateTime, Utc};

use super::entity::{Entity, leaf_entity};
use super::record::Record;
use super::schema::{EntityKind, Schema};

const SCHEMA: Schema = Schema {
    kind: EntityKind::History,
    id_field: "id",
    envelope: None,
    fields: &[],
    alternatives: &[],
    aliases: &[],
    children: &[],
};

/// One audit-log entry.
#[derive(Debug, Clone)]
pub struct History {
    record: Record,
}

leaf_entity!(History, SCHEMA);

impl History {
    /// `action_time` parsed as RFC 3339, if it parses.
    pub fn action_time(&self) -> Option<DateTime<Utc>> {
        self.text("action_time")
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|time| time.with_timezone(&Utc))
    }

    pub fn action(&self) -> Option<&str> {
        self.text("action")
    }

    pub fn user(&self) -> Option<&str> {
        self.text("user")
    }

    pub fn content_type(&self) -> Option<&str> {
        self.text("content_type")
    }
}

impl fmt::Display for History {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.text("action_time").unwrap_or_default(),
            self.action().unwrap_or_default(),
            self.user().unwrap_or_default(),
            self.content_type().unwrap_or_default()
        )
    }
}
