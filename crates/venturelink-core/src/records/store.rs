use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;
use uuid::Uuid;

use crate::error::VentureLinkError;
use crate::VentureLinkResult;

use super::entity::{EntityKind, Fields, Record};

/// CRUD over flat named-field records, one table per [`EntityKind`].
pub trait RecordStore {
    fn create(&mut self, kind: EntityKind, fields: Fields) -> VentureLinkResult<Record>;

    /// All records of a kind. Notices come newest `date` first; everything
    /// else in insertion order.
    fn list(&self, kind: EntityKind) -> VentureLinkResult<Vec<Record>>;

    fn get(&self, kind: EntityKind, id: Uuid) -> VentureLinkResult<Record>;

    fn update(&mut self, kind: EntityKind, id: Uuid, fields: Fields) -> VentureLinkResult<Record>;

    fn delete(&mut self, kind: EntityKind, id: Uuid) -> VentureLinkResult<()>;

    fn count(&self, kind: EntityKind) -> VentureLinkResult<usize> {
        Ok(self.list(kind)?.len())
    }
}

/// Process-local store. Serialises to a JSON snapshot keyed by kind.
///
/// Every deserialisation path goes through [`Snapshot`] validation: records
/// must sit under the table of their own kind and ids are unique store-wide.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Snapshot")]
pub struct InMemoryRecordStore {
    tables: BTreeMap<EntityKind, Vec<Record>>,
}

/// Unchecked wire form of [`InMemoryRecordStore`].
#[derive(Deserialize)]
struct Snapshot {
    #[serde(default)]
    tables: BTreeMap<EntityKind, Vec<Record>>,
}

impl TryFrom<Snapshot> for InMemoryRecordStore {
    type Error = VentureLinkError;

    fn try_from(snapshot: Snapshot) -> Result<Self, Self::Error> {
        let mut seen = HashSet::new();
        for (table, records) in &snapshot.tables {
            for record in records {
                if record.kind != *table {
                    return Err(VentureLinkError::invalid(
                        "tables",
                        format!(
                            "{} record {} is filed under the {table} table",
                            record.kind, record.id
                        ),
                    ));
                }
                if !seen.insert(record.id) {
                    return Err(VentureLinkError::invalid(
                        "tables",
                        format!("record id {} appears more than once", record.id),
                    ));
                }
            }
        }
        Ok(Self {
            tables: snapshot.tables,
        })
    }
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a snapshot previously produced by [`InMemoryRecordStore::to_json`].
    pub fn from_json(json: &str) -> VentureLinkResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> VentureLinkResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn table(&self, kind: EntityKind) -> &[Record] {
        self.tables.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    fn position(&self, kind: EntityKind, id: Uuid) -> VentureLinkResult<usize> {
        self.table(kind)
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| not_found(kind, id))
    }
}

impl RecordStore for InMemoryRecordStore {
    fn create(&mut self, kind: EntityKind, fields: Fields) -> VentureLinkResult<Record> {
        let record = Record::new(kind, fields);
        debug!(%kind, id = %record.id, "record created");
        self.tables.entry(kind).or_default().push(record.clone());
        Ok(record)
    }

    fn list(&self, kind: EntityKind) -> VentureLinkResult<Vec<Record>> {
        let mut records = self.table(kind).to_vec();
        if kind == EntityKind::Notice {
            sort_newest_first(&mut records);
        }
        Ok(records)
    }

    fn get(&self, kind: EntityKind, id: Uuid) -> VentureLinkResult<Record> {
        let idx = self.position(kind, id)?;
        Ok(self.table(kind)[idx].clone())
    }

    fn update(&mut self, kind: EntityKind, id: Uuid, fields: Fields) -> VentureLinkResult<Record> {
        let idx = self.position(kind, id)?;
        let table = self.tables.entry(kind).or_default();
        let record = &mut table[idx];
        record.merge(fields);
        debug!(%kind, %id, "record updated");
        Ok(record.clone())
    }

    fn delete(&mut self, kind: EntityKind, id: Uuid) -> VentureLinkResult<()> {
        let idx = self.position(kind, id)?;
        self.tables.entry(kind).or_default().remove(idx);
        debug!(%kind, %id, "record deleted");
        Ok(())
    }

    fn count(&self, kind: EntityKind) -> VentureLinkResult<usize> {
        Ok(self.table(kind).len())
    }
}

fn not_found(kind: EntityKind, id: Uuid) -> VentureLinkError {
    VentureLinkError::RecordNotFound {
        kind: kind.to_string(),
        id: id.to_string(),
    }
}

/// Descending by the `date` field (ISO-8601 strings sort lexically).
/// Undated records go last, in their original order.
fn sort_newest_first(records: &mut [Record]) {
    records.sort_by(|a, b| match (a.field_str("date"), b.field_str("date")) {
        (Some(da), Some(db)) => db.cmp(da),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}
