use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;

use serde::Serialize;

use venturelink_core::records::{
    self, dashboard_stats, EntityKind, InMemoryRecordStore, RecordRequest, RecordResponse,
};
use venturelink_core::valuation::{self, DcfForm};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Valuation
// ---------------------------------------------------------------------------

/// Run the DCF calculator on a (possibly partial) form. Missing fields take
/// the calculator defaults.
#[napi]
pub fn calculate_dcf(form_json: String) -> NapiResult<String> {
    let form: DcfForm = serde_json::from_str(&form_json).map_err(to_napi_error)?;
    let input = form.into_input().map_err(to_napi_error)?;
    let output = valuation::calculate_dcf(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// The calculator's initial form values.
#[napi]
pub fn default_dcf_form() -> NapiResult<String> {
    serde_json::to_string(&DcfForm::default_values()).map_err(to_napi_error)
}

/// Format a won amount given as a decimal string (e.g. "967301254.69").
#[napi]
pub fn format_krw(amount: String) -> NapiResult<String> {
    let amount: Decimal = amount.trim().parse().map_err(to_napi_error)?;
    Ok(valuation::format_krw(amount))
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Dashboard counts for a record store snapshot.
#[napi(js_name = "dashboardStats")]
pub fn dashboard_stats_from_snapshot(snapshot_json: String) -> NapiResult<String> {
    let store = InMemoryRecordStore::from_json(&snapshot_json).map_err(to_napi_error)?;
    let stats = dashboard_stats(&store).map_err(to_napi_error)?;
    serde_json::to_string(&stats).map_err(to_napi_error)
}

/// Updated snapshot plus the operation's result, handed back to the caller so
/// it can persist the snapshot.
#[derive(Serialize)]
struct SnapshotReply {
    snapshot: InMemoryRecordStore,
    result: RecordResponse,
}

fn apply_to_snapshot(snapshot_json: &str, request: RecordRequest) -> NapiResult<String> {
    let mut store = InMemoryRecordStore::from_json(snapshot_json).map_err(to_napi_error)?;
    let result = records::handle_request(&mut store, request).map_err(to_napi_error)?;
    serde_json::to_string(&SnapshotReply {
        snapshot: store,
        result,
    })
    .map_err(to_napi_error)
}

fn parse_kind(kind: &str) -> NapiResult<EntityKind> {
    kind.parse::<EntityKind>().map_err(to_napi_error)
}

/// Records of one kind. Returns `{snapshot, result: [...]}`.
#[napi]
pub fn list_records(snapshot_json: String, kind: String) -> NapiResult<String> {
    let kind = parse_kind(&kind)?;
    apply_to_snapshot(&snapshot_json, RecordRequest::List { kind })
}

#[napi]
pub fn get_record(snapshot_json: String, kind: String, id: String) -> NapiResult<String> {
    let kind = parse_kind(&kind)?;
    let id = records::parse_record_id(&id).map_err(to_napi_error)?;
    apply_to_snapshot(&snapshot_json, RecordRequest::Get { kind, id })
}

/// Create a record from a JSON object of fields; reserved keys are ignored.
#[napi]
pub fn create_record(snapshot_json: String, kind: String, fields_json: String) -> NapiResult<String> {
    let kind = parse_kind(&kind)?;
    let fields = records::parse_fields(&fields_json).map_err(to_napi_error)?;
    apply_to_snapshot(&snapshot_json, RecordRequest::Create { kind, fields })
}

#[napi]
pub fn update_record(
    snapshot_json: String,
    kind: String,
    id: String,
    fields_json: String,
) -> NapiResult<String> {
    let kind = parse_kind(&kind)?;
    let id = records::parse_record_id(&id).map_err(to_napi_error)?;
    let fields = records::parse_fields(&fields_json).map_err(to_napi_error)?;
    apply_to_snapshot(&snapshot_json, RecordRequest::Update { kind, id, fields })
}

#[napi]
pub fn delete_record(snapshot_json: String, kind: String, id: String) -> NapiResult<String> {
    let kind = parse_kind(&kind)?;
    let id = records::parse_record_id(&id).map_err(to_napi_error)?;
    apply_to_snapshot(&snapshot_json, RecordRequest::Delete { kind, id })
}

/// Apply a request given as JSON, e.g. `{"op": "get", "kind": "fund", "id": "..."}`.
#[napi]
pub fn record_request(snapshot_json: String, request_json: String) -> NapiResult<String> {
    let request: RecordRequest = serde_json::from_str(&request_json).map_err(to_napi_error)?;
    apply_to_snapshot(&snapshot_json, request)
}
