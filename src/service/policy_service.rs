//! Policy Service
//!
//! Orchestrates the cache regions and the record store. Each call is
//! independent; the only shared state lives in the regions and the store.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::cache::{Lookup, Mutation, PolicyCaches, ALL_POLICIES_KEY};
use crate::error::{PolicyError, Result};
use crate::filter::PolicyFilter;
use crate::models::{NewPolicy, Page, PolicyId, PolicyPatch, PolicyRecord};
use crate::store::{PolicyStore, StoreError};

/// Largest page a paged listing may request.
pub const MAX_PAGE_SIZE: usize = 1000;

/// Cheap to clone; clones share the same store and regions.
#[derive(Clone)]
pub struct PolicyService {
    store: Arc<dyn PolicyStore>,
    caches: Arc<PolicyCaches>,
}

impl PolicyService {
    pub fn new(store: Arc<dyn PolicyStore>, caches: Arc<PolicyCaches>) -> Self {
        Self { store, caches }
    }

    pub fn caches(&self) -> &Arc<PolicyCaches> {
        &self.caches
    }

    // == Reads ==

    /// Looks a policy up by surrogate id, through the by-id region.
    ///
    /// Every read-through fill is conditional on the region generation seen
    /// at the miss, so a record read before a concurrent write finished its
    /// invalidation is returned to this caller but never cached.
    pub async fn get_policy(&self, id: PolicyId) -> Result<PolicyRecord> {
        let seen = match self.caches.by_id.lookup(&id).await {
            Lookup::Hit(hit) => {
                debug!(id, "by-id cache hit");
                return Ok(hit);
            }
            Lookup::Miss(generation) => generation,
        };
        debug!(id, "by-id cache miss");

        let record = self
            .store
            .find_by_id(id)
            .map_err(store_failure)?
            .ok_or_else(|| not_found_id(id))?;
        self.caches.by_id.put_if_fresh(id, record.clone(), seen).await;
        Ok(record)
    }

    /// Looks a policy up by policy number, through the by-policy-number region.
    pub async fn get_policy_by_number(&self, policy_number: &str) -> Result<PolicyRecord> {
        if policy_number.trim().is_empty() {
            return Err(PolicyError::InvalidArgument(
                "Policy number cannot be empty".to_string(),
            ));
        }

        let key = policy_number.to_string();
        let seen = match self.caches.by_policy_number.lookup(&key).await {
            Lookup::Hit(hit) => {
                debug!(policy_number, "by-policy-number cache hit");
                return Ok(hit);
            }
            Lookup::Miss(generation) => generation,
        };
        debug!(policy_number, "by-policy-number cache miss");

        let record = self
            .store
            .find_by_policy_number(policy_number)
            .map_err(store_failure)?
            .ok_or_else(|| {
                PolicyError::NotFound(format!(
                    "Auto policy with policy number {} not found",
                    policy_number
                ))
            })?;
        self.caches
            .by_policy_number
            .put_if_fresh(key, record.clone(), seen)
            .await;
        Ok(record)
    }

    /// Every policy ordered by id, through the full-list region.
    ///
    /// An empty store is `NotFound`; nothing is cached in that case.
    pub async fn get_all_policies(&self) -> Result<Vec<PolicyRecord>> {
        let seen = match self.caches.all_policies.lookup(&ALL_POLICIES_KEY).await {
            Lookup::Hit(hit) => {
                debug!(count = hit.len(), "all-policies cache hit");
                return Ok(hit);
            }
            Lookup::Miss(generation) => generation,
        };
        debug!("all-policies cache miss");

        let policies = self.store.find_all().map_err(store_failure)?;
        if policies.is_empty() {
            return Err(PolicyError::NotFound(
                "No auto policies found in the system.".to_string(),
            ));
        }
        self.caches
            .all_policies
            .put_if_fresh(ALL_POLICIES_KEY, policies.clone(), seen)
            .await;
        Ok(policies)
    }

    /// One page of the full listing. An empty store yields an empty page.
    pub async fn get_policies_page(&self, page: usize, size: usize) -> Result<Page<PolicyRecord>> {
        if size == 0 || size > MAX_PAGE_SIZE {
            return Err(PolicyError::InvalidArgument(format!(
                "Page size must be between 1 and {}, got {}",
                MAX_PAGE_SIZE, size
            )));
        }

        match self.get_all_policies().await {
            Ok(policies) => Ok(Page::slice(&policies, page, size)),
            Err(PolicyError::NotFound(_)) => Ok(Page::slice(&[], page, size)),
            Err(err) => Err(err),
        }
    }

    /// Policies matching `filter`, through the filtered-list region keyed by
    /// the filter's signature. Zero matches is an empty list, not an error.
    pub async fn find_policies(&self, filter: &PolicyFilter) -> Result<Vec<PolicyRecord>> {
        let signature = filter.signature();
        let seen = match self.caches.filtered.lookup(&signature).await {
            Lookup::Hit(hit) => {
                debug!(%signature, count = hit.len(), "filtered cache hit");
                return Ok(hit);
            }
            Lookup::Miss(generation) => generation,
        };
        debug!(%signature, "filtered cache miss");

        let policies = self
            .store
            .scan(&filter.predicates())
            .map_err(store_failure)?;
        self.caches
            .filtered
            .put_if_fresh(signature, policies.clone(), seen)
            .await;
        Ok(policies)
    }

    // == Writes ==

    /// Creates one policy.
    pub async fn create_policy(&self, policy: NewPolicy) -> Result<PolicyRecord> {
        let record = policy.into_record()?;

        let saved = self.store.save(record).map_err(store_failure)?;
        self.caches.after(Mutation::CreatedOne).await;

        info!(id = ?saved.id, policy_number = %saved.policy_number, "Policy created");
        Ok(saved)
    }

    /// Creates a batch of policies, all or none.
    pub async fn create_policies(&self, policies: Vec<NewPolicy>) -> Result<Vec<PolicyRecord>> {
        let records = policies
            .into_iter()
            .map(NewPolicy::into_record)
            .collect::<Result<Vec<_>>>()?;

        let saved = self.store.save_all(records).map_err(store_failure)?;
        self.caches.after(Mutation::CreatedMany).await;

        info!(count = saved.len(), "Policies created in batch");
        Ok(saved)
    }

    /// Merges `patch` into the stored policy. Absent fields keep their value.
    pub async fn update_policy(&self, id: PolicyId, patch: PolicyPatch) -> Result<PolicyRecord> {
        patch.validate()?;
        let seen = self.caches.by_id.generation().await;

        let existing = self
            .store
            .find_by_id(id)
            .map_err(store_failure)?
            .ok_or_else(|| not_found_id(id))?;
        let merged = patch.apply_to(existing)?;

        let saved = self.store.save(merged).map_err(store_failure)?;
        self.caches.after(Mutation::Updated(id, saved.clone(), seen)).await;

        info!(id, "Policy updated");
        Ok(saved)
    }

    /// Deletes a policy.
    pub async fn delete_policy(&self, id: PolicyId) -> Result<()> {
        if !self.store.exists_by_id(id).map_err(store_failure)? {
            return Err(not_found_id(id));
        }

        self.store.delete_by_id(id).map_err(store_failure)?;
        self.caches.after(Mutation::Deleted(id)).await;

        info!(id, "Policy deleted");
        Ok(())
    }

    // == Administration ==

    /// Empties every cache region. Returns the number of entries dropped.
    pub async fn clear_caches(&self) -> usize {
        let cleared = self.caches.clear().await;
        info!(cleared, "All cache regions cleared");
        cleared
    }
}

fn not_found_id(id: PolicyId) -> PolicyError {
    PolicyError::NotFound(format!("Auto policy not found with ID: {}", id))
}

fn store_failure(err: StoreError) -> PolicyError {
    warn!(error = %err, "Record store call failed");
    err.into()
}
