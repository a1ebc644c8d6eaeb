//! Request DTOs for the policy API
//!
//! Query-string shapes. Values arrive as raw strings so that a bad date or
//! enum code becomes an `InvalidArgument` with a useful message.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::{PolicyError, Result};
use crate::filter::PolicyFilter;

/// Query parameters of `GET /api/v1/policies/filter`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub policy_type: Option<String>,
    pub vehicle_make: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub min_premium: Option<String>,
    pub max_premium: Option<String>,
}

impl FilterQuery {
    /// Parses every present parameter and builds a validated filter.
    pub fn into_filter(self) -> Result<PolicyFilter> {
        let mut builder = PolicyFilter::builder();

        if let Some(date) = self.start_date.as_deref().map(|v| parse_date("startDate", v)) {
            builder = builder.start_date(date?);
        }
        if let Some(date) = self.end_date.as_deref().map(|v| parse_date("endDate", v)) {
            builder = builder.end_date(date?);
        }
        if let Some(status) = self.status {
            builder = builder.status(status.parse()?);
        }
        if let Some(policy_type) = self.policy_type {
            builder = builder.policy_type(policy_type.parse()?);
        }
        if let Some(make) = self.vehicle_make {
            builder = builder.vehicle_make(make);
        }
        if let Some(first) = self.first_name {
            builder = builder.first_name(first);
        }
        if let Some(last) = self.last_name {
            builder = builder.last_name(last);
        }
        if let Some(amount) = self.min_premium.as_deref().map(|v| parse_amount("minPremium", v)) {
            builder = builder.min_premium(amount?);
        }
        if let Some(amount) = self.max_premium.as_deref().map(|v| parse_amount("maxPremium", v)) {
            builder = builder.max_premium(amount?);
        }

        builder.build()
    }
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate> {
    value.parse().map_err(|_| {
        PolicyError::InvalidArgument(format!(
            "{} must be an ISO date (YYYY-MM-DD), got '{}'",
            field, value
        ))
    })
}

fn parse_amount(field: &str, value: &str) -> Result<f64> {
    value.trim().parse().map_err(|_| {
        PolicyError::InvalidArgument(format!("{} must be a number, got '{}'", field, value))
    })
}

/// Query parameters of the paged listing `GET /api/v1/policies`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    /// Zero-based page index
    pub page: Option<usize>,
    /// Page size (uses the configured default if not specified)
    pub size: Option<usize>,
}
