use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::VentureLinkError;
use crate::VentureLinkResult;

use super::entity::{EntityKind, Fields, Record};
use super::store::RecordStore;

/// One record operation, as the web layer and the CLI issue it.
///
/// On the wire the operation is named by `op`:
/// `{"op": "update", "kind": "investor", "id": "...", "fields": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum RecordRequest {
    List {
        kind: EntityKind,
    },
    Get {
        kind: EntityKind,
        id: Uuid,
    },
    Create {
        kind: EntityKind,
        #[serde(default)]
        fields: Fields,
    },
    Update {
        kind: EntityKind,
        id: Uuid,
        #[serde(default)]
        fields: Fields,
    },
    Delete {
        kind: EntityKind,
        id: Uuid,
    },
}

impl RecordRequest {
    /// Whether applying the request changes the store.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            RecordRequest::Create { .. } | RecordRequest::Update { .. } | RecordRequest::Delete { .. }
        )
    }
}

/// Result of a [`RecordRequest`]. Serialises bare: an array for `list`, the
/// record for `get`/`create`/`update`, and `{"success": true}` for `delete`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RecordResponse {
    Records(Vec<Record>),
    Record(Record),
    Deleted { success: bool },
}

/// Apply one request to a store.
pub fn handle_request<S>(store: &mut S, request: RecordRequest) -> VentureLinkResult<RecordResponse>
where
    S: RecordStore + ?Sized,
{
    debug!(?request, "record request");
    let response = match request {
        RecordRequest::List { kind } => RecordResponse::Records(store.list(kind)?),
        RecordRequest::Get { kind, id } => RecordResponse::Record(store.get(kind, id)?),
        RecordRequest::Create { kind, fields } => RecordResponse::Record(store.create(kind, fields)?),
        RecordRequest::Update { kind, id, fields } => {
            RecordResponse::Record(store.update(kind, id, fields)?)
        }
        RecordRequest::Delete { kind, id } => {
            store.delete(kind, id)?;
            RecordResponse::Deleted { success: true }
        }
    };
    Ok(response)
}

/// Parse a record id from user text.
pub fn parse_record_id(id: &str) -> VentureLinkResult<Uuid> {
    Uuid::parse_str(id.trim())
        .map_err(|e| VentureLinkError::invalid("id", format!("'{id}' is not a record id: {e}")))
}

/// Parse caller fields; the payload must be a JSON object.
pub fn parse_fields(json: &str) -> VentureLinkResult<Fields> {
    match serde_json::from_str::<serde_json::Value>(json)? {
        serde_json::Value::Object(fields) => Ok(fields),
        other => Err(VentureLinkError::invalid(
            "fields",
            format!("Expected a JSON object, got {other}"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::InMemoryRecordStore;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn fields(value: serde_json::Value) -> Fields {
        value.as_object().cloned().unwrap()
    }

    fn created(response: RecordResponse) -> Record {
        match response {
            RecordResponse::Record(record) => record,
            other => panic!("expected a record, got {other:?}"),
        }
    }

    #[test]
    fn test_request_lifecycle() {
        let mut store = InMemoryRecordStore::new();
        let record = created(
            handle_request(
                &mut store,
                RecordRequest::Create {
                    kind: EntityKind::Investor,
                    fields: fields(json!({"name": "Kim", "aum": 5})),
                },
            )
            .unwrap(),
        );

        let updated = created(
            handle_request(
                &mut store,
                RecordRequest::Update {
                    kind: EntityKind::Investor,
                    id: record.id,
                    fields: fields(json!({"aum": 8})),
                },
            )
            .unwrap(),
        );
        assert_eq!(updated.fields, fields(json!({"name": "Kim", "aum": 8})));

        let listed = handle_request(&mut store, RecordRequest::List { kind: EntityKind::Investor })
            .unwrap();
        assert_eq!(listed, RecordResponse::Records(vec![updated]));

        let deleted = handle_request(
            &mut store,
            RecordRequest::Delete {
                kind: EntityKind::Investor,
                id: record.id,
            },
        )
        .unwrap();
        assert_eq!(serde_json::to_value(&deleted).unwrap(), json!({"success": true}));

        assert!(matches!(
            handle_request(
                &mut store,
                RecordRequest::Get {
                    kind: EntityKind::Investor,
                    id: record.id,
                },
            ),
            Err(VentureLinkError::RecordNotFound { .. })
        ));
    }

    #[test]
    fn test_request_wire_format() {
        let request: RecordRequest =
            serde_json::from_value(json!({"op": "create", "kind": "notice", "fields": {"title": "t"}}))
                .unwrap();
        assert!(request.is_mutation());
        assert_eq!(
            request,
            RecordRequest::Create {
                kind: EntityKind::Notice,
                fields: fields(json!({"title": "t"})),
            }
        );

        let list: RecordRequest = serde_json::from_value(json!({"op": "list", "kind": "fund"})).unwrap();
        assert!(!list.is_mutation());
    }

    #[test]
    fn test_parse_record_id() {
        let id = Uuid::now_v7();
        assert_eq!(parse_record_id(&format!(" {id} ")).unwrap(), id);
        assert!(matches!(
            parse_record_id("not-an-id"),
            Err(VentureLinkError::InvalidInput { ref field, .. }) if field == "id"
        ));
    }

    #[test]
    fn test_parse_fields_requires_object() {
        assert_eq!(parse_fields(r#"{"name": "Acme"}"#).unwrap(), fields(json!({"name": "Acme"})));
        assert!(matches!(
            parse_fields("[1, 2]"),
            Err(VentureLinkError::InvalidInput { ref field, .. }) if field == "fields"
        ));
        assert!(matches!(
            parse_fields("{"),
            Err(VentureLinkError::SerializationError(_))
        ));
    }
}
