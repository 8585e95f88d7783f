use serde::{Deserialize, Serialize};

use crate::VentureLinkResult;

use super::entity::EntityKind;
use super::store::RecordStore;

/// Headline counts for the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_funds: usize,
    pub total_investors: usize,
    pub total_startups: usize,
    pub total_notices: usize,
}

pub fn dashboard_stats(store: &impl RecordStore) -> VentureLinkResult<DashboardStats> {
    Ok(DashboardStats {
        total_funds: store.count(EntityKind::Fund)?,
        total_investors: store.count(EntityKind::Investor)?,
        total_startups: store.count(EntityKind::Startup)?,
        total_notices: store.count(EntityKind::Notice)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{Fields, InMemoryRecordStore};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_store_counts_zero() {
        let stats = dashboard_stats(&InMemoryRecordStore::new()).unwrap();
        assert_eq!(stats, DashboardStats::default());
    }

    #[test]
    fn test_counts_per_kind() {
        let mut store = InMemoryRecordStore::new();
        for _ in 0..3 {
            store.create(EntityKind::Investor, Fields::new()).unwrap();
        }
        store.create(EntityKind::Fund, Fields::new()).unwrap();
        store.create(EntityKind::Startup, Fields::new()).unwrap();
        store.create(EntityKind::Startup, Fields::new()).unwrap();

        assert_eq!(
            dashboard_stats(&store).unwrap(),
            DashboardStats {
                total_funds: 1,
                total_investors: 3,
                total_startups: 2,
                total_notices: 0,
            }
        );
    }
}
