//! In-memory record store
//!
//! Rows ordered by id with a unique policy-number index.

use std::collections::{BTreeMap, HashMap, HashSet};

use parking_lot::RwLock;

use crate::filter::PredicateSet;
use crate::models::{PolicyId, PolicyRecord};
use crate::store::{PolicyStore, StoreError, StoreResult};

#[derive(Debug, Default)]
struct Tables {
    next_id: PolicyId,
    rows: BTreeMap<PolicyId, PolicyRecord>,
    by_number: HashMap<String, PolicyId>,
}

impl Tables {
    /// Rejects a write that would break id or policy-number constraints.
    fn check_constraints(&self, record: &PolicyRecord) -> StoreResult<()> {
        if let Some(id) = record.id {
            if !self.rows.contains_key(&id) {
                return Err(StoreError::MissingRecord(id));
            }
        }
        match self.by_number.get(&record.policy_number) {
            Some(owner) if Some(*owner) != record.id => Err(StoreError::DuplicatePolicyNumber(
                record.policy_number.clone(),
            )),
            _ => Ok(()),
        }
    }

    /// Writes a record that already passed `check_constraints`.
    fn insert_row(&mut self, mut record: PolicyRecord) -> PolicyRecord {
        let id = match record.id {
            Some(id) => id,
            None => {
                self.next_id += 1;
                self.next_id
            }
        };
        record.id = Some(id);

        if let Some(previous) = self.rows.insert(id, record.clone()) {
            if previous.policy_number != record.policy_number {
                self.by_number.remove(&previous.policy_number);
            }
        }
        self.by_number.insert(record.policy_number.clone(), id);
        record
    }
}

/// Thread-safe store kept entirely in memory.
#[derive(Debug, Default)]
pub struct InMemoryPolicyStore {
    tables: RwLock<Tables>,
}

impl InMemoryPolicyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tables.read().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.read().rows.is_empty()
    }
}

impl PolicyStore for InMemoryPolicyStore {
    fn find_by_id(&self, id: PolicyId) -> StoreResult<Option<PolicyRecord>> {
        Ok(self.tables.read().rows.get(&id).cloned())
    }

    fn find_by_policy_number(&self, policy_number: &str) -> StoreResult<Option<PolicyRecord>> {
        let tables = self.tables.read();
        Ok(tables
            .by_number
            .get(policy_number)
            .and_then(|id| tables.rows.get(id))
            .cloned())
    }

    fn find_all(&self) -> StoreResult<Vec<PolicyRecord>> {
        Ok(self.tables.read().rows.values().cloned().collect())
    }

    fn save(&self, record: PolicyRecord) -> StoreResult<PolicyRecord> {
        let mut tables = self.tables.write();
        tables.check_constraints(&record)?;
        Ok(tables.insert_row(record))
    }

    fn save_all(&self, records: Vec<PolicyRecord>) -> StoreResult<Vec<PolicyRecord>> {
        let mut tables = self.tables.write();

        {
            let mut batch_numbers = HashSet::new();
            for record in &records {
                tables.check_constraints(record)?;
                if !batch_numbers.insert(record.policy_number.as_str()) {
                    return Err(StoreError::DuplicatePolicyNumber(
                        record.policy_number.clone(),
                    ));
                }
            }
        }

        Ok(records
            .into_iter()
            .map(|record| tables.insert_row(record))
            .collect())
    }

    fn exists_by_id(&self, id: PolicyId) -> StoreResult<bool> {
        Ok(self.tables.read().rows.contains_key(&id))
    }

    fn delete_by_id(&self, id: PolicyId) -> StoreResult<()> {
        let mut tables = self.tables.write();
        if let Some(removed) = tables.rows.remove(&id) {
            tables.by_number.remove(&removed.policy_number);
        }
        Ok(())
    }

    fn scan(&self, predicates: &PredicateSet) -> StoreResult<Vec<PolicyRecord>> {
        Ok(self
            .tables
            .read()
            .rows
            .values()
            .filter(|record| predicates.matches(record))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Clause;
    use crate::models::policy::fixtures::new_policy;
    use crate::models::PolicyStatus;

    fn unsaved(number: &str) -> PolicyRecord {
        new_policy(number).into_record().unwrap()
    }

    #[test]
    fn test_save_assigns_sequential_ids() {
        let store = InMemoryPolicyStore::new();
        let a = store.save(unsaved("AP-1")).unwrap();
        let b = store.save(unsaved("AP-2")).unwrap();

        assert_eq!(a.id, Some(1));
        assert_eq!(b.id, Some(2));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_find_by_id_and_number() {
        let store = InMemoryPolicyStore::new();
        let saved = store.save(unsaved("AP-1")).unwrap();

        assert_eq!(store.find_by_id(1).unwrap(), Some(saved.clone()));
        assert_eq!(store.find_by_policy_number("AP-1").unwrap(), Some(saved));
        assert_eq!(store.find_by_id(9).unwrap(), None);
        assert_eq!(store.find_by_policy_number("AP-9").unwrap(), None);
    }

    #[test]
    fn test_save_rejects_duplicate_number() {
        let store = InMemoryPolicyStore::new();
        store.save(unsaved("AP-1")).unwrap();

        assert_eq!(
            store.save(unsaved("AP-1")),
            Err(StoreError::DuplicatePolicyNumber("AP-1".to_string()))
        );
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_save_with_id_updates_in_place() {
        let store = InMemoryPolicyStore::new();
        let mut saved = store.save(unsaved("AP-1")).unwrap();
        saved.status = PolicyStatus::Cancelled;

        let updated = store.save(saved.clone()).unwrap();
        assert_eq!(updated, saved);
        assert_eq!(store.len(), 1);
        assert_eq!(
            store.find_by_policy_number("AP-1").unwrap().unwrap().status,
            PolicyStatus::Cancelled
        );
    }

    #[test]
    fn test_save_with_unknown_id_fails() {
        let store = InMemoryPolicyStore::new();
        let mut record = unsaved("AP-1");
        record.id = Some(5);
        assert_eq!(store.save(record), Err(StoreError::MissingRecord(5)));
    }

    #[test]
    fn test_save_all_is_all_or_nothing() {
        let store = InMemoryPolicyStore::new();
        store.save(unsaved("AP-1")).unwrap();

        let result = store.save_all(vec![unsaved("AP-2"), unsaved("AP-1")]);
        assert!(matches!(result, Err(StoreError::DuplicatePolicyNumber(_))));
        assert_eq!(store.len(), 1);

        let result = store.save_all(vec![unsaved("AP-3"), unsaved("AP-3")]);
        assert!(result.is_err());
        assert_eq!(store.len(), 1);

        let saved = store.save_all(vec![unsaved("AP-2"), unsaved("AP-3")]).unwrap();
        assert_eq!(saved.len(), 2);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_delete_frees_policy_number() {
        let store = InMemoryPolicyStore::new();
        store.save(unsaved("AP-1")).unwrap();

        store.delete_by_id(1).unwrap();
        assert!(!store.exists_by_id(1).unwrap());
        assert_eq!(store.find_by_policy_number("AP-1").unwrap(), None);
        assert!(store.save(unsaved("AP-1")).is_ok());
    }

    #[test]
    fn test_scan_applies_predicates() {
        let store = InMemoryPolicyStore::new();
        store.save(unsaved("AP-1")).unwrap();
        let mut cancelled = unsaved("AP-2");
        cancelled.status = PolicyStatus::Cancelled;
        store.save(cancelled).unwrap();

        let all = store.scan(&PredicateSet::match_all()).unwrap();
        assert_eq!(all.len(), 2);

        let active = store
            .scan(&PredicateSet::match_all().and(Clause::StatusIs(PolicyStatus::Active)))
            .unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].policy_number, "AP-1");
    }
}
