use clap::{Args, Subcommand};
use serde_json::Value;

use venturelink_core::records::{
    dashboard_stats, handle_request, parse_fields, EntityKind, InMemoryRecordStore, Record,
    RecordRequest, RecordResponse, Uuid,
};

use crate::input;

/// Arguments for dashboard statistics
#[derive(Args)]
pub struct StatsArgs {
    /// Path to a record store snapshot (JSON/YAML); stdin is read when omitted
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for record operations against a snapshot
#[derive(Args)]
pub struct RecordsArgs {
    #[command(subcommand)]
    pub action: RecordAction,

    /// Path to a record store snapshot (JSON/YAML). Reads fall back to stdin;
    /// create, update and delete write the changed snapshot back to this file.
    #[arg(long, global = true)]
    pub input: Option<String>,
}

#[derive(Subcommand)]
pub enum RecordAction {
    /// List records of one kind (notices newest first)
    List {
        /// Entity kind: investor(s), fund(s), startup(s) or notice(s)
        kind: EntityKind,
    },
    /// Show one record
    Get { kind: EntityKind, id: Uuid },
    /// Create a record from a JSON object of fields
    Create {
        kind: EntityKind,
        #[arg(long, default_value = "{}")]
        fields: String,
    },
    /// Merge a JSON object of fields into a record
    Update {
        kind: EntityKind,
        id: Uuid,
        #[arg(long)]
        fields: String,
    },
    /// Delete a record
    Delete { kind: EntityKind, id: Uuid },
}

impl RecordAction {
    fn into_request(self) -> Result<RecordRequest, Box<dyn std::error::Error>> {
        Ok(match self {
            RecordAction::List { kind } => RecordRequest::List { kind },
            RecordAction::Get { kind, id } => RecordRequest::Get { kind, id },
            RecordAction::Create { kind, fields } => RecordRequest::Create {
                kind,
                fields: parse_fields(&fields)?,
            },
            RecordAction::Update { kind, id, fields } => RecordRequest::Update {
                kind,
                id,
                fields: parse_fields(&fields)?,
            },
            RecordAction::Delete { kind, id } => RecordRequest::Delete { kind, id },
        })
    }
}

fn load_store(path: Option<&str>) -> Result<InMemoryRecordStore, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        input::file::read_input(path)
    } else if let Some(data) = input::stdin::read_stdin()? {
        Ok(serde_json::from_value(data)?)
    } else {
        Err("--input snapshot file is required (or pipe one on stdin)".into())
    }
}

pub fn run_stats(args: StatsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let store = load_store(args.input.as_deref())?;
    let stats = dashboard_stats(&store)?;
    Ok(serde_json::to_value(stats)?)
}

pub fn run_records(args: RecordsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request = args.action.into_request()?;
    let mutation = request.is_mutation();
    let path = args.input.as_deref();
    if mutation && path.is_none() {
        return Err("--input snapshot file is required for create, update and delete".into());
    }

    let mut store = load_store(path)?;
    let response = handle_request(&mut store, request)?;
    if let (true, Some(path)) = (mutation, path) {
        input::file::write_output(path, &store)?;
    }

    Ok(match response {
        RecordResponse::Records(records) => Value::Array(records.into_iter().map(flatten).collect()),
        RecordResponse::Record(record) => flatten(record),
        deleted @ RecordResponse::Deleted { .. } => serde_json::to_value(deleted)?,
    })
}

/// One row per record: id, caller fields, then timestamps.
fn flatten(record: Record) -> Value {
    let mut row = serde_json::Map::new();
    row.insert("id".into(), Value::String(record.id.to_string()));
    row.extend(record.fields);
    row.insert(
        "created_at".into(),
        Value::String(record.created_at.to_rfc3339()),
    );
    row.insert(
        "updated_at".into(),
        Value::String(record.updated_at.to_rfc3339()),
    );
    Value::Object(row)
}
