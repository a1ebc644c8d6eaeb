//! Filter Module
//!
//! Composes up to nine optional constraints into a `PredicateSet` for the
//! record store and, separately, into a `FilterSignature` for the
//! filtered-list cache region.

mod predicate;
mod signature;

#[cfg(test)]
mod property_tests;

pub use predicate::{Clause, PredicateSet};
pub use signature::{FilterSignature, ABSENT};

use chrono::NaiveDate;

use crate::error::{PolicyError, Result};
use crate::models::policy::validate_premium;
use crate::models::{PolicyStatus, PolicyType};
use signature::SignatureWriter;

// == Policy Filter ==
/// A validated combination of optional policy filters.
///
/// Built through [`PolicyFilter::builder`]. Text fields are stored
/// lower-cased and empty text counts as absent, so logically identical
/// requests produce equal filters and equal signatures.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolicyFilter {
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    status: Option<PolicyStatus>,
    policy_type: Option<PolicyType>,
    vehicle_make: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    min_premium: Option<f64>,
    max_premium: Option<f64>,
}

impl PolicyFilter {
    pub fn builder() -> PolicyFilterBuilder {
        PolicyFilterBuilder::default()
    }

    /// True when no field is present; such a filter matches every record.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.start_date
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.end_date
    }

    pub fn status(&self) -> Option<PolicyStatus> {
        self.status
    }

    pub fn policy_type(&self) -> Option<PolicyType> {
        self.policy_type
    }

    pub fn vehicle_make(&self) -> Option<&str> {
        self.vehicle_make.as_deref()
    }

    pub fn first_name(&self) -> Option<&str> {
        self.first_name.as_deref()
    }

    pub fn last_name(&self) -> Option<&str> {
        self.last_name.as_deref()
    }

    pub fn min_premium(&self) -> Option<f64> {
        self.min_premium
    }

    pub fn max_premium(&self) -> Option<f64> {
        self.max_premium
    }

    /// Folds the present fields into a conjunction of clauses.
    pub fn predicates(&self) -> PredicateSet {
        [
            self.start_date.map(Clause::StartsOnOrAfter),
            self.end_date.map(Clause::EndsOnOrBefore),
            self.status.map(Clause::StatusIs),
            self.policy_type.map(Clause::TypeIs),
            self.vehicle_make.clone().map(Clause::VehicleMakeContains),
            self.first_name.clone().map(Clause::FirstNameContains),
            self.last_name.clone().map(Clause::LastNameContains),
            self.min_premium.map(Clause::PremiumAtLeast),
            self.max_premium.map(Clause::PremiumAtMost),
        ]
        .into_iter()
        .flatten()
        .fold(PredicateSet::match_all(), PredicateSet::and)
    }

    /// Canonical cache key over all nine fields.
    pub fn signature(&self) -> FilterSignature {
        SignatureWriter::new()
            .plain("startDate", self.start_date)
            .plain("endDate", self.end_date)
            .plain("status", self.status)
            .plain("type", self.policy_type)
            .text("vehicleMake", self.vehicle_make.as_deref())
            .text("firstName", self.first_name.as_deref())
            .text("lastName", self.last_name.as_deref())
            .amount("minPremium", self.min_premium)
            .amount("maxPremium", self.max_premium)
            .finish()
    }
}

// == Builder ==
/// Collects filter fields in any order. Setting a field twice keeps the last value.
#[derive(Debug, Clone, Default)]
pub struct PolicyFilterBuilder {
    inner: PolicyFilter,
}

impl PolicyFilterBuilder {
    pub fn start_date(mut self, date: NaiveDate) -> Self {
        self.inner.start_date = Some(date);
        self
    }

    pub fn end_date(mut self, date: NaiveDate) -> Self {
        self.inner.end_date = Some(date);
        self
    }

    pub fn status(mut self, status: PolicyStatus) -> Self {
        self.inner.status = Some(status);
        self
    }

    pub fn policy_type(mut self, policy_type: PolicyType) -> Self {
        self.inner.policy_type = Some(policy_type);
        self
    }

    pub fn vehicle_make(mut self, make: impl Into<String>) -> Self {
        self.inner.vehicle_make = normalize_text(make.into());
        self
    }

    pub fn first_name(mut self, name: impl Into<String>) -> Self {
        self.inner.first_name = normalize_text(name.into());
        self
    }

    pub fn last_name(mut self, name: impl Into<String>) -> Self {
        self.inner.last_name = normalize_text(name.into());
        self
    }

    pub fn min_premium(mut self, amount: f64) -> Self {
        self.inner.min_premium = Some(amount);
        self
    }

    pub fn max_premium(mut self, amount: f64) -> Self {
        self.inner.max_premium = Some(amount);
        self
    }

    /// Validates the combination.
    ///
    /// Fails with `InvalidArgument` on negative or non-finite amounts and on
    /// inverted premium or date ranges, which no record could satisfy.
    pub fn build(self) -> Result<PolicyFilter> {
        let filter = self.inner;

        if let Some(min) = filter.min_premium {
            validate_premium("minPremium", min)?;
        }
        if let Some(max) = filter.max_premium {
            validate_premium("maxPremium", max)?;
        }
        if let (Some(min), Some(max)) = (filter.min_premium, filter.max_premium) {
            if min > max {
                return Err(PolicyError::InvalidArgument(format!(
                    "minPremium {} is greater than maxPremium {}",
                    min, max
                )));
            }
        }
        if let (Some(start), Some(end)) = (filter.start_date, filter.end_date) {
            if start > end {
                return Err(PolicyError::InvalidArgument(format!(
                    "startDate {} is after endDate {}",
                    start, end
                )));
            }
        }

        Ok(filter)
    }
}

fn normalize_text(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_lowercase())
    }
}
