//! Policy domain types
//!
//! The canonical policy record, its enumerations, and the payloads used to
//! create and patch records.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{PolicyError, Result};

/// Surrogate id assigned by the store.
pub type PolicyId = u64;

// == Policy Status ==
/// Lifecycle status of a policy. Travels as `ACT`, `EXP` or `CAN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolicyStatus {
    Active,
    Expired,
    Cancelled,
}

impl PolicyStatus {
    pub const ALL: [PolicyStatus; 3] = [Self::Active, Self::Expired, Self::Cancelled];

    pub fn code(&self) -> &'static str {
        match self {
            PolicyStatus::Active => "ACT",
            PolicyStatus::Expired => "EXP",
            PolicyStatus::Cancelled => "CAN",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            PolicyStatus::Active => "Active Policy",
            PolicyStatus::Expired => "Expired Policy",
            PolicyStatus::Cancelled => "Cancelled Policy",
        }
    }
}

impl FromStr for PolicyStatus {
    type Err = PolicyError;

    fn from_str(code: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.code().eq_ignore_ascii_case(code))
            .ok_or_else(|| PolicyError::InvalidArgument(format!("Invalid policy status code: {}", code)))
    }
}

// == Policy Type ==
/// Coverage type. Travels as `LIAB`, `COLL` or `COMP`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolicyType {
    Liability,
    Collision,
    Comprehensive,
}

impl PolicyType {
    pub const ALL: [PolicyType; 3] = [Self::Liability, Self::Collision, Self::Comprehensive];

    pub fn code(&self) -> &'static str {
        match self {
            PolicyType::Liability => "LIAB",
            PolicyType::Collision => "COLL",
            PolicyType::Comprehensive => "COMP",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            PolicyType::Liability => "Covers damages to others caused by the insured driver",
            PolicyType::Collision => "Covers damages to the insured's vehicle from a collision",
            PolicyType::Comprehensive => "Covers non-collision damages (e.g., theft, fire, vandalism)",
        }
    }
}

impl FromStr for PolicyType {
    type Err = PolicyError;

    fn from_str(code: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.code().eq_ignore_ascii_case(code))
            .ok_or_else(|| PolicyError::InvalidArgument(format!("Invalid policy type code: {}", code)))
    }
}

macro_rules! code_serde {
    ($ty:ty) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.code())
            }
        }

        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                serializer.serialize_str(self.code())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
                let code = String::deserialize(deserializer)?;
                code.parse().map_err(de::Error::custom)
            }
        }
    };
}

code_serde!(PolicyStatus);
code_serde!(PolicyType);

// == Policy Record ==
/// A stored insurance policy.
///
/// `id` is `None` only for a record that has not been saved yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyRecord {
    pub id: Option<PolicyId>,
    pub policy_number: String,
    pub status: PolicyStatus,
    pub policy_type: PolicyType,
    pub vehicle_make: String,
    pub vehicle_model: String,
    pub vehicle_year: String,
    pub first_name: String,
    pub last_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub premium_amount: f64,
}

impl PolicyRecord {
    /// Checks the record-level invariants the store relies on.
    pub fn validate(&self) -> Result<()> {
        if self.policy_number.trim().is_empty() {
            return Err(PolicyError::InvalidArgument(
                "Policy number cannot be empty".to_string(),
            ));
        }
        if self.start_date > self.end_date {
            return Err(PolicyError::InvalidArgument(format!(
                "Start date {} is after end date {}",
                self.start_date, self.end_date
            )));
        }
        validate_premium("premiumAmount", self.premium_amount)
    }
}

/// Rejects NaN, infinite and negative amounts.
pub(crate) fn validate_premium(field: &str, amount: f64) -> Result<()> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(PolicyError::InvalidArgument(format!(
            "{} must be a non-negative amount, got {}",
            field, amount
        )));
    }
    Ok(())
}

// == New Policy ==
/// Payload for creating a policy. The store assigns the id.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPolicy {
    pub policy_number: String,
    pub status: PolicyStatus,
    pub policy_type: PolicyType,
    #[serde(default)]
    pub vehicle_make: String,
    #[serde(default)]
    pub vehicle_model: String,
    #[serde(default)]
    pub vehicle_year: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub premium_amount: f64,
}

impl NewPolicy {
    /// Converts into an unsaved record, validating it on the way.
    pub fn into_record(self) -> Result<PolicyRecord> {
        let record = PolicyRecord {
            id: None,
            policy_number: self.policy_number,
            status: self.status,
            policy_type: self.policy_type,
            vehicle_make: self.vehicle_make,
            vehicle_model: self.vehicle_model,
            vehicle_year: self.vehicle_year,
            first_name: self.first_name,
            last_name: self.last_name,
            start_date: self.start_date,
            end_date: self.end_date,
            premium_amount: self.premium_amount,
        };
        record.validate()?;
        Ok(record)
    }
}

// == Policy Patch ==
/// Partial update. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyPatch {
    pub policy_number: Option<String>,
    pub status: Option<PolicyStatus>,
    pub policy_type: Option<PolicyType>,
    pub vehicle_make: Option<String>,
    pub vehicle_model: Option<String>,
    pub vehicle_year: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub premium_amount: Option<f64>,
}

impl PolicyPatch {
    /// Checks the fields that can be judged without the stored record.
    pub fn validate(&self) -> Result<()> {
        if let Some(number) = &self.policy_number {
            if number.trim().is_empty() {
                return Err(PolicyError::InvalidArgument(
                    "Policy number cannot be empty".to_string(),
                ));
            }
        }
        if let Some(amount) = self.premium_amount {
            validate_premium("premiumAmount", amount)?;
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(PolicyError::InvalidArgument(format!(
                    "Start date {} is after end date {}",
                    start, end
                )));
            }
        }
        Ok(())
    }

    /// Applies the patch onto a stored record and validates the result.
    ///
    /// The policy number is the natural key and cannot be reassigned.
    pub fn apply_to(self, mut record: PolicyRecord) -> Result<PolicyRecord> {
        if let Some(number) = self.policy_number {
            if number != record.policy_number {
                return Err(PolicyError::InvalidArgument(format!(
                    "Policy number is immutable: cannot change '{}' to '{}'",
                    record.policy_number, number
                )));
            }
        }

        if let Some(status) = self.status {
            record.status = status;
        }
        if let Some(policy_type) = self.policy_type {
            record.policy_type = policy_type;
        }
        if let Some(make) = self.vehicle_make {
            record.vehicle_make = make;
        }
        if let Some(model) = self.vehicle_model {
            record.vehicle_model = model;
        }
        if let Some(year) = self.vehicle_year {
            record.vehicle_year = year;
        }
        if let Some(first) = self.first_name {
            record.first_name = first;
        }
        if let Some(last) = self.last_name {
            record.last_name = last;
        }
        if let Some(start) = self.start_date {
            record.start_date = start;
        }
        if let Some(end) = self.end_date {
            record.end_date = end;
        }
        if let Some(amount) = self.premium_amount {
            record.premium_amount = amount;
        }

        record.validate()?;
        Ok(record)
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_status_codes_parse_case_insensitively() {
        assert_eq!("ACT".parse::<PolicyStatus>().unwrap(), PolicyStatus::Active);
        assert_eq!("exp".parse::<PolicyStatus>().unwrap(), PolicyStatus::Expired);
        assert_eq!("Can".parse::<PolicyStatus>().unwrap(), PolicyStatus::Cancelled);
        assert!(matches!(
            "ACTIVE".parse::<PolicyStatus>(),
            Err(PolicyError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_type_codes_parse_case_insensitively() {
        assert_eq!("liab".parse::<PolicyType>().unwrap(), PolicyType::Liability);
        assert_eq!("COLL".parse::<PolicyType>().unwrap(), PolicyType::Collision);
        assert_eq!("comp".parse::<PolicyType>().unwrap(), PolicyType::Comprehensive);
        assert!("XYZ".parse::<PolicyType>().is_err());
    }

    #[test]
    fn test_record_serializes_with_codes() {
        let json = serde_json::to_value(record(1, "AP-1")).unwrap();
        assert_eq!(json["policyNumber"], "AP-1");
        assert_eq!(json["status"], "ACT");
        assert_eq!(json["policyType"], "COLL");
        assert_eq!(json["startDate"], "2023-01-01");
    }

    #[test]
    fn test_new_policy_deserialize_rejects_unknown_code() {
        let json = r#"{"policyNumber":"AP-1","status":"NOPE","policyType":"COLL",
            "startDate":"2023-01-01","endDate":"2023-12-31","premiumAmount":700.0}"#;
        let result: std::result::Result<NewPolicy, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_new_policy_validation() {
        let mut policy = new_policy("AP-1");
        policy.end_date = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
        assert!(matches!(policy.into_record(), Err(PolicyError::InvalidArgument(_))));

        let mut policy = new_policy("AP-1");
        policy.premium_amount = -1.0;
        assert!(policy.into_record().is_err());

        let mut policy = new_policy("  ");
        policy.premium_amount = 1.0;
        assert!(policy.into_record().is_err());
    }

    #[test]
    fn test_patch_keeps_absent_fields() {
        let patch = PolicyPatch {
            status: Some(PolicyStatus::Cancelled),
            ..Default::default()
        };
        let updated = patch.apply_to(record(1, "AP-1")).unwrap();
        assert_eq!(updated.status, PolicyStatus::Cancelled);
        assert_eq!(updated.vehicle_make, "Ford");
        assert_eq!(updated.premium_amount, 700.0);
        assert_eq!(updated.id, Some(1));
    }

    #[test]
    fn test_patch_rejects_policy_number_change() {
        let patch = PolicyPatch {
            policy_number: Some("AP-2".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            patch.apply_to(record(1, "AP-1")),
            Err(PolicyError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_patch_validates_merged_dates() {
        let patch = PolicyPatch {
            start_date: NaiveDate::from_ymd_opt(2024, 6, 1),
            ..Default::default()
        };
        assert!(patch.validate().is_ok());
        assert!(patch.apply_to(record(1, "AP-1")).is_err());
    }
}
