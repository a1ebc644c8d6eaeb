//! Policy Cache Regions
//!
//! The four regions in front of the record store and the invalidation sweep
//! each kind of write triggers.

use std::time::Duration;

use tracing::debug;

use crate::cache::{CacheRegion, CacheStats, Generation, RegionPolicy};
use crate::config::Config;
use crate::filter::FilterSignature;
use crate::models::{PolicyId, PolicyRecord};

/// Singleton key of the full-list region.
pub const ALL_POLICIES_KEY: &str = "all";

// == Mutation ==
/// A successful write, carrying what the invalidation sweep needs to know.
#[derive(Debug, Clone)]
pub enum Mutation {
    CreatedOne,
    CreatedMany,
    /// The stored record after the update, and the by-id generation seen
    /// before the update started
    Updated(PolicyId, PolicyRecord, Generation),
    Deleted(PolicyId),
}

// == Policy Caches ==
/// The four cache regions used by the policy service.
///
/// Each region serialises its own mutations. A sweep across several regions
/// is not atomic: a concurrent reader may see one region already cleared and
/// the next not yet.
#[derive(Debug)]
pub struct PolicyCaches {
    /// Single record by surrogate id
    pub by_id: CacheRegion<PolicyId, PolicyRecord>,
    /// Single record by policy number
    pub by_policy_number: CacheRegion<String, PolicyRecord>,
    /// Full listing under [`ALL_POLICIES_KEY`]
    pub all_policies: CacheRegion<&'static str, Vec<PolicyRecord>>,
    /// Filtered listings by filter signature
    pub filtered: CacheRegion<FilterSignature, Vec<PolicyRecord>>,
}

impl PolicyCaches {
    /// Creates the regions; only the filtered-list region is bounded.
    pub fn new(filtered_policy: RegionPolicy) -> Self {
        Self {
            by_id: CacheRegion::new("by-id", RegionPolicy::unbounded()),
            by_policy_number: CacheRegion::new("by-policy-number", RegionPolicy::unbounded()),
            all_policies: CacheRegion::new("all-policies", RegionPolicy::unbounded()),
            filtered: CacheRegion::new("filtered-policies", filtered_policy),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(RegionPolicy::bounded(
            config.filtered_max_entries,
            Duration::from_secs(config.filtered_ttl),
        ))
    }

    // == Invalidation Sweep ==
    /// Applies the invalidation rules for a successful write.
    ///
    /// | write       | by-id        | by-policy-number | all-policies | filtered |
    /// |-------------|--------------|------------------|--------------|----------|
    /// | created one | -            | -                | clear        | clear    |
    /// | created many| -            | clear            | clear        | clear    |
    /// | updated     | refresh      | clear            | clear        | clear    |
    /// | deleted     | drop the id  | clear            | clear        | clear    |
    pub async fn after(&self, mutation: Mutation) {
        match mutation {
            Mutation::CreatedOne => {}
            Mutation::CreatedMany => {
                self.by_policy_number.invalidate_all().await;
            }
            Mutation::Updated(id, record, seen) => {
                // A racing write got there first; its value may be newer
                if !self.by_id.put_if_fresh(id, record, seen).await {
                    self.by_id.invalidate(&id).await;
                }
                self.by_policy_number.invalidate_all().await;
            }
            Mutation::Deleted(id) => {
                self.by_id.invalidate(&id).await;
                self.by_policy_number.invalidate_all().await;
            }
        }

        // Every write can change any listing
        self.all_policies.invalidate_all().await;
        let dropped = self.filtered.invalidate_all().await;
        debug!(filtered_dropped = dropped, "Listing caches invalidated");
    }

    /// Empties every region. Returns the number of entries dropped.
    pub async fn clear(&self) -> usize {
        self.by_id.invalidate_all().await
            + self.by_policy_number.invalidate_all().await
            + self.all_policies.invalidate_all().await
            + self.filtered.invalidate_all().await
    }

    /// Drops expired entries from every region. Returns the number removed.
    pub async fn purge_expired(&self) -> usize {
        self.by_id.purge_expired().await
            + self.by_policy_number.purge_expired().await
            + self.all_policies.purge_expired().await
            + self.filtered.purge_expired().await
    }

    /// Counters of every region, keyed by region name.
    pub async fn stats(&self) -> Vec<(&'static str, CacheStats)> {
        vec![
            (self.by_id.name(), self.by_id.stats().await),
            (self.by_policy_number.name(), self.by_policy_number.stats().await),
            (self.all_policies.name(), self.all_policies.stats().await),
            (self.filtered.name(), self.filtered.stats().await),
        ]
    }
}

impl Default for PolicyCaches {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::PolicyFilter;
    use crate::models::policy::fixtures::record;
    use crate::models::PolicyStatus;

    async fn populated() -> PolicyCaches {
        let caches = PolicyCaches::default();
        let one = record(1, "AP-1");
        let two = record(2, "AP-2");

        caches.by_id.put(1, one.clone()).await;
        caches.by_id.put(2, two.clone()).await;
        caches.by_policy_number.put("AP-1".to_string(), one.clone()).await;
        caches.by_policy_number.put("AP-2".to_string(), two.clone()).await;
        caches
            .all_policies
            .put(ALL_POLICIES_KEY, vec![one.clone(), two.clone()])
            .await;
        caches
            .filtered
            .put(PolicyFilter::default().signature(), vec![one, two])
            .await;
        caches
    }

    #[tokio::test]
    async fn test_created_one_clears_listings_only() {
        let caches = populated().await;
        caches.after(Mutation::CreatedOne).await;

        assert_eq!(caches.by_id.len().await, 2);
        assert_eq!(caches.by_policy_number.len().await, 2);
        assert!(caches.all_policies.is_empty().await);
        assert!(caches.filtered.is_empty().await);
    }

    #[tokio::test]
    async fn test_created_many_also_clears_policy_numbers() {
        let caches = populated().await;
        caches.after(Mutation::CreatedMany).await;

        assert_eq!(caches.by_id.len().await, 2);
        assert!(caches.by_policy_number.is_empty().await);
        assert!(caches.all_policies.is_empty().await);
        assert!(caches.filtered.is_empty().await);
    }

    #[tokio::test]
    async fn test_updated_repopulates_by_id() {
        let caches = populated().await;
        let mut updated = record(1, "AP-1");
        updated.status = PolicyStatus::Cancelled;
        let seen = caches.by_id.generation().await;

        caches.after(Mutation::Updated(1, updated.clone(), seen)).await;

        assert_eq!(caches.by_id.get(&1).await, Some(updated));
        assert!(caches.by_id.get(&2).await.is_some());
        assert!(caches.by_policy_number.is_empty().await);
        assert!(caches.all_policies.is_empty().await);
        assert!(caches.filtered.is_empty().await);
    }

    #[tokio::test]
    async fn test_deleted_drops_only_that_id() {
        let caches = populated().await;
        caches.after(Mutation::Deleted(1)).await;

        assert!(caches.by_id.get(&1).await.is_none());
        assert!(caches.by_id.get(&2).await.is_some());
        assert!(caches.by_policy_number.is_empty().await);
        assert!(caches.all_policies.is_empty().await);
        assert!(caches.filtered.is_empty().await);
    }

    #[tokio::test]
    async fn test_clear_empties_every_region() {
        let caches = populated().await;
        assert_eq!(caches.clear().await, 6);

        for (_, stats) in caches.stats().await {
            assert_eq!(stats.total_entries, 0);
        }
    }

    #[tokio::test]
    async fn test_only_filtered_region_is_bounded() {
        let caches = PolicyCaches::default();
        assert_eq!(caches.by_id.policy(), RegionPolicy::unbounded());
        assert_eq!(caches.by_policy_number.policy(), RegionPolicy::unbounded());
        assert_eq!(caches.all_policies.policy(), RegionPolicy::unbounded());
        assert_eq!(
            caches.filtered.policy(),
            RegionPolicy::bounded(100, Duration::from_secs(600))
        );
    }

    #[tokio::test]
    async fn test_superseded_update_drops_by_id_entry() {
        let caches = populated().await;
        let seen = caches.by_id.generation().await;

        let mut newer = record(1, "AP-1");
        newer.status = PolicyStatus::Expired;
        caches.after(Mutation::Updated(1, newer, seen)).await;

        let mut older = record(1, "AP-1");
        older.status = PolicyStatus::Cancelled;
        caches.after(Mutation::Updated(1, older, seen)).await;

        assert_eq!(caches.by_id.get(&1).await, None);
        assert!(caches.by_id.get(&2).await.is_some());
    }
}
