pub mod entity;
pub mod request;
pub mod stats;
pub mod store;

pub use entity::{EntityKind, Fields, Record};
pub use request::{handle_request, parse_fields, parse_record_id, RecordRequest, RecordResponse};
pub use stats::{dashboard_stats, DashboardStats};
pub use store::{InMemoryRecordStore, RecordStore};
pub use uuid::Uuid;
