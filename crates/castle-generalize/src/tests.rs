//! Tests across the three generalizer families.
//!
//! Each family is exercised through `dyn Generalizer`, the same way a
//! cluster dispatches to them.

use castle_types::{
    AttributeRule, Family, Hierarchy, HierarchyNode, NumericDomain, Record, RuleSet, Value,
};

use crate::{
    AggregationGeneralizer, Generalizer, HierarchyGeneralizer, ReductionGeneralizer,
};

// ============================================================================
// Test Helpers
// ============================================================================

/// age, zip, sex
fn test_rules() -> RuleSet {
    let sexes = Hierarchy::new(HierarchyNode::new(
        "Person",
        vec![HierarchyNode::leaf("M"), HierarchyNode::leaf("F")],
    ))
    .expect("valid hierarchy");

    RuleSet::new(vec![
        AttributeRule::aggregation(NumericDomain::new(0.0, 120.0)),
        AttributeRule::reduction(),
        AttributeRule::non_numerical(sexes),
    ])
}

fn person(age: i64, zip: &str, sex: &str) -> Record {
    Record::new(vec![Value::Int(age), Value::text(zip), Value::text(sex)])
}

fn all_families(rules: &RuleSet) -> Vec<Box<dyn Generalizer>> {
    vec![
        Box::new(AggregationGeneralizer::new(rules)),
        Box::new(ReductionGeneralizer::new(rules)),
        Box::new(HierarchyGeneralizer::new(rules)),
    ]
}

// ============================================================================
// Contract Tests
// ============================================================================

#[test]
fn each_family_owns_its_attribute() {
    let rules = test_rules();
    let families = all_families(&rules);
    let records = [person(30, "4711", "M"), person(42, "4719", "F")];
    let refs: Vec<&Record> = records.iter().collect();

    for (attribute, generalizer) in families.iter().enumerate() {
        assert!(generalizer.evaluate(&refs, attribute).is_ok());
        for other in (0..3).filter(|&a| a != attribute) {
            assert!(
                generalizer.evaluate(&refs, other).is_err(),
                "{} should not answer for attribute {other}",
                generalizer.family()
            );
        }
    }
}

#[test]
fn families_report_their_tag() {
    let rules = test_rules();
    let tags: Vec<Family> = all_families(&rules).iter().map(|g| g.family()).collect();
    assert_eq!(tags, vec![Family::Aggregation, Family::Reduction, Family::Hierarchy]);
}

#[test]
fn observed_state_matches_explicit_evaluation() {
    // Folding records in through observe() and passing them explicitly to
    // evaluate() must agree for a freshly built generalizer.
    let rules = test_rules();
    let records = [
        person(25, "80331", "F"),
        person(61, "80335", "F"),
        person(47, "80999", "M"),
    ];
    let refs: Vec<&Record> = records.iter().collect();

    let mut observed = all_families(&rules);
    for generalizer in &mut observed {
        for record in &records {
            generalizer.observe(record);
        }
    }
    let fresh = all_families(&rules);

    for attribute in [0, 2] {
        let stateful = observed[attribute].evaluate(&[], attribute).unwrap();
        let explicit = fresh[attribute].evaluate(&refs, attribute).unwrap();
        assert_eq!(stateful, explicit);
    }

    let reduced = observed[1].evaluate(&refs, 1).unwrap();
    assert_eq!(reduced.value, Value::text("80***"));
}

#[test]
fn evaluation_is_repeatable() {
    let rules = test_rules();
    let mut families = all_families(&rules);
    let record = person(33, "10115", "M");
    for generalizer in &mut families {
        generalizer.observe(&record);
    }

    let candidate = person(70, "10999", "F");
    for (attribute, generalizer) in families.iter().enumerate() {
        let first = generalizer.evaluate(&[&record, &candidate], attribute).unwrap();
        let second = generalizer.evaluate(&[&record, &candidate], attribute).unwrap();
        assert_eq!(first, second);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn arb_person() -> impl Strategy<Value = Record> {
        (0i64..=120, "[0-9]{5}", prop::sample::select(vec!["M", "F"]))
            .prop_map(|(age, zip, sex)| person(age, &zip, sex))
    }

    proptest! {
        #[test]
        fn loss_stays_normalized(records in prop::collection::vec(arb_person(), 1..8)) {
            let rules = test_rules();
            let refs: Vec<&Record> = records.iter().collect();
            for (attribute, generalizer) in all_families(&rules).iter().enumerate() {
                let loss = generalizer.evaluate(&refs, attribute).unwrap().loss;
                prop_assert!((0.0..=1.0).contains(&loss), "{} loss {loss}", generalizer.family());
            }
        }

        #[test]
        fn more_records_never_lose_less(
            records in prop::collection::vec(arb_person(), 1..8),
            extra in arb_person(),
        ) {
            let rules = test_rules();
            let refs: Vec<&Record> = records.iter().collect();
            let mut widened = refs.clone();
            widened.push(&extra);

            for (attribute, generalizer) in all_families(&rules).iter().enumerate() {
                let before = generalizer.evaluate(&refs, attribute).unwrap().loss;
                let after = generalizer.evaluate(&widened, attribute).unwrap().loss;
                prop_assert!(after >= before, "{}: {after} < {before}", generalizer.family());
            }
        }
    }
}
