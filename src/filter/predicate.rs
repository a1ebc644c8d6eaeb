//! Predicate clauses
//!
//! A `PredicateSet` is the conjunction of zero or more `Clause`s and is what
//! the record store's scan operation consumes.

use chrono::NaiveDate;

use crate::models::{PolicyRecord, PolicyStatus, PolicyType};

// == Clause ==
/// One constraint on a policy record.
///
/// Text clauses hold an already lower-cased needle.
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    StartsOnOrAfter(NaiveDate),
    EndsOnOrBefore(NaiveDate),
    StatusIs(PolicyStatus),
    TypeIs(PolicyType),
    VehicleMakeContains(String),
    FirstNameContains(String),
    LastNameContains(String),
    PremiumAtLeast(f64),
    PremiumAtMost(f64),
}

impl Clause {
    /// Returns true if `record` satisfies this clause.
    pub fn matches(&self, record: &PolicyRecord) -> bool {
        match self {
            Clause::StartsOnOrAfter(date) => record.start_date >= *date,
            Clause::EndsOnOrBefore(date) => record.end_date <= *date,
            Clause::StatusIs(status) => record.status == *status,
            Clause::TypeIs(policy_type) => record.policy_type == *policy_type,
            Clause::VehicleMakeContains(needle) => contains_ignore_case(&record.vehicle_make, needle),
            Clause::FirstNameContains(needle) => contains_ignore_case(&record.first_name, needle),
            Clause::LastNameContains(needle) => contains_ignore_case(&record.last_name, needle),
            Clause::PremiumAtLeast(min) => record.premium_amount >= *min,
            Clause::PremiumAtMost(max) => record.premium_amount <= *max,
        }
    }
}

fn contains_ignore_case(haystack: &str, lowered_needle: &str) -> bool {
    haystack.to_lowercase().contains(lowered_needle)
}

// == Predicate Set ==
/// Conjunction of clauses. An empty set matches every record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredicateSet {
    clauses: Vec<Clause>,
}

impl PredicateSet {
    /// The empty conjunction, equivalent to a full scan.
    pub fn match_all() -> Self {
        Self::default()
    }

    /// Adds one more clause to the conjunction.
    pub fn and(mut self, clause: Clause) -> Self {
        self.clauses.push(clause);
        self
    }

    /// Returns true if `record` satisfies every clause.
    pub fn matches(&self, record: &PolicyRecord) -> bool {
        self.clauses.iter().all(|clause| clause.matches(record))
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }
}
