use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::VentureLinkError;

/// Free-form named fields of a record.
pub type Fields = serde_json::Map<String, serde_json::Value>;

/// Keys owned by the store; values supplied for them by callers are dropped.
pub const RESERVED_KEYS: [&str; 3] = ["id", "created_at", "updated_at"];

/// Kinds of record the platform keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Investor,
    Fund,
    Startup,
    Notice,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Investor,
        EntityKind::Fund,
        EntityKind::Startup,
        EntityKind::Notice,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Investor => "investor",
            EntityKind::Fund => "fund",
            EntityKind::Startup => "startup",
            EntityKind::Notice => "notice",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = VentureLinkError;

    /// Accepts singular or plural names ("investor", "investors").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        let singular = name.strip_suffix('s').unwrap_or(&name);
        EntityKind::ALL
            .into_iter()
            .find(|k| k.as_str() == singular)
            .ok_or_else(|| VentureLinkError::InvalidInput {
                field: "kind".into(),
                reason: format!("Unknown entity kind '{s}'"),
            })
    }
}

/// A stored record: store-owned identity and timestamps around caller fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: Uuid,
    pub kind: EntityKind,
    pub fields: Fields,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record {
    pub(crate) fn new(kind: EntityKind, fields: Fields) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            kind,
            fields: strip_reserved(fields),
            created_at: now,
            updated_at: now,
        }
    }

    /// Shallow merge: keys in `fields` replace existing ones, others are kept.
    pub(crate) fn merge(&mut self, fields: Fields) {
        for (key, value) in strip_reserved(fields) {
            self.fields.insert(key, value);
        }
        self.updated_at = Utc::now();
    }

    /// String value of a field, if present and a string.
    pub fn field_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(|v| v.as_str())
    }
}

fn strip_reserved(mut fields: Fields) -> Fields {
    for key in RESERVED_KEYS {
        fields.remove(key);
    }
    fields
}
