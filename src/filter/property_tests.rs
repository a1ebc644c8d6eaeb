//! Property-Based Tests for Filter Module
//!
//! Uses proptest to check signature determinism and injectivity.

use chrono::NaiveDate;
use proptest::prelude::*;

use crate::filter::{PolicyFilter, PolicyFilterBuilder};
use crate::models::{PolicyStatus, PolicyType};

// == Strategies ==
/// One builder call.
#[derive(Debug, Clone)]
enum FieldOp {
    StartDate(NaiveDate),
    EndDate(NaiveDate),
    Status(PolicyStatus),
    Type(PolicyType),
    VehicleMake(String),
    FirstName(String),
    LastName(String),
    MinPremium(f64),
    MaxPremium(f64),
}

impl FieldOp {
    fn apply(self, builder: PolicyFilterBuilder) -> PolicyFilterBuilder {
        match self {
            FieldOp::StartDate(d) => builder.start_date(d),
            FieldOp::EndDate(d) => builder.end_date(d),
            FieldOp::Status(s) => builder.status(s),
            FieldOp::Type(t) => builder.policy_type(t),
            FieldOp::VehicleMake(v) => builder.vehicle_make(v),
            FieldOp::FirstName(v) => builder.first_name(v),
            FieldOp::LastName(v) => builder.last_name(v),
            FieldOp::MinPremium(v) => builder.min_premium(v),
            FieldOp::MaxPremium(v) => builder.max_premium(v),
        }
    }
}

fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (0i64..3650).prop_map(|days| {
        NaiveDate::from_ymd_opt(2020, 1, 1).unwrap() + chrono::Duration::days(days)
    })
}

fn text_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z~;=\" ]{0,8}"
}

fn amount_strategy() -> impl Strategy<Value = f64> {
    (0u32..100_000).prop_map(|cents| f64::from(cents) / 100.0)
}

/// Up to nine field operations, at most one per field.
fn field_ops_strategy() -> impl Strategy<Value = Vec<FieldOp>> {
    (
        prop::option::of(date_strategy()),
        prop::option::of(date_strategy()),
        prop::option::of(prop::sample::select(PolicyStatus::ALL.to_vec())),
        prop::option::of(prop::sample::select(PolicyType::ALL.to_vec())),
        prop::option::of(text_strategy()),
        prop::option::of(text_strategy()),
        prop::option::of(text_strategy()),
        prop::option::of(amount_strategy()),
        prop::option::of(amount_strategy()),
    )
        .prop_map(|(start, end, status, kind, make, first, last, min, max)| {
            [
                start.map(FieldOp::StartDate),
                end.map(FieldOp::EndDate),
                status.map(FieldOp::Status),
                kind.map(FieldOp::Type),
                make.map(FieldOp::VehicleMake),
                first.map(FieldOp::FirstName),
                last.map(FieldOp::LastName),
                min.map(FieldOp::MinPremium),
                max.map(FieldOp::MaxPremium),
            ]
            .into_iter()
            .flatten()
            .collect()
        })
}

/// Applies the operations without validation so that every combination,
/// including inverted ranges, can be compared.
fn raw_filter(ops: Vec<FieldOp>) -> PolicyFilter {
    ops.into_iter()
        .fold(PolicyFilter::builder(), |builder, op| op.apply(builder))
        .inner
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // Two calls with identical field values, in any construction order,
    // produce identical signatures.
    #[test]
    fn prop_signature_ignores_field_order(
        (ops, shuffled) in field_ops_strategy().prop_flat_map(|ops| {
            let shuffled = Just(ops.clone()).prop_shuffle();
            (Just(ops), shuffled)
        })
    ) {
        let a = raw_filter(ops);
        let b = raw_filter(shuffled);
        prop_assert_eq!(a.signature(), b.signature());
    }

    // Signatures collide exactly when the normalised filters are equal.
    #[test]
    fn prop_signature_is_injective(a in field_ops_strategy(), b in field_ops_strategy()) {
        let a = raw_filter(a);
        let b = raw_filter(b);
        prop_assert_eq!(a == b, a.signature() == b.signature());
    }

    // The predicate set holds exactly one clause per present field.
    #[test]
    fn prop_one_clause_per_present_field(ops in field_ops_strategy()) {
        let filter = raw_filter(ops);
        let present = [
            filter.start_date().is_some(),
            filter.end_date().is_some(),
            filter.status().is_some(),
            filter.policy_type().is_some(),
            filter.vehicle_make().is_some(),
            filter.first_name().is_some(),
            filter.last_name().is_some(),
            filter.min_premium().is_some(),
            filter.max_premium().is_some(),
        ]
        .into_iter()
        .filter(|p| *p)
        .count();
        prop_assert_eq!(filter.predicates().len(), present);
    }
}
