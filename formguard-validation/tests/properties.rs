//! Property tests for evaluation totality and wildcard expansion

use formguard_validation::*;
use proptest::prelude::*;
use serde_json::{Value, json};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "[ a-zA-Z0-9@._-]{0,12}".prop_map(Value::from),
    ]
}

fn field_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        scalar(),
        prop::collection::vec(scalar(), 0..4).prop_map(Value::from),
    ]
}

const SPECS: &[&str] = &[
    "required",
    "required|email|max:100",
    "nullable|string|min:2",
    "numeric|between:1,10",
    "bail|alpha|uppercase",
    "in:a,b,c",
    "sometimes|boolean",
    "array|size:2",
];

proptest! {
    #[test]
    fn passes_is_negation_of_fails(
        values in prop::collection::vec(prop::option::of(field_value()), 3),
        picks in prop::collection::vec(0..SPECS.len(), 3),
    ) {
        let names = ["username", "password", "code"];
        let mut document = Document::new();
        for (name, value) in names.iter().zip(&values) {
            if let Some(value) = value {
                document = document.with(name, value.clone());
            }
        }
        let rules: RuleSet = names.iter().zip(&picks).map(|(name, pick)| (*name, SPECS[*pick])).collect();

        let results = Evaluator::default().make(&document, &rules).evaluate().unwrap();
        prop_assert_eq!(results.passes(), results.is_empty());
        prop_assert_eq!(results.fails(), !results.passes());
    }

    #[test]
    fn wildcard_runs_once_per_element(count in 0usize..12) {
        let items: Vec<Value> = (0..count).map(|i| json!({"field": i})).collect();
        let document = Document::from_value(json!({"list": items})).unwrap();

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let rules = RuleSet::new().field(
            "list.*.field",
            RuleSpec::new().closure(move |_, _, _| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }),
        );

        Evaluator::default().make(&document, &rules).evaluate().unwrap();
        prop_assert_eq!(calls.load(Ordering::SeqCst), count);
    }
}
