use docgate::{
    FilterValue, MAX_LIMIT, MIN_LIMIT, Operator, QueryParams, Scalar, coerce, is_reserved,
    translate,
};
use proptest::prelude::*;

fn arb_key() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("limit".to_string()),
        Just("offset".to_string()),
        Just("order_by".to_string()),
        Just("fields".to_string()),
        "[a-z_]{0,12}",
        "[a-z]{1,6}_(gte|lte|gt|lt|in)",
        ".{0,16}",
    ]
}

fn arb_value() -> impl Strategy<Value = String> {
    prop_oneof![
        "-?[0-9]{1,22}",
        "-?[0-9]{0,6}\\.[0-9]{0,6}",
        "[a-z0-9,.\\- ]{0,20}",
        ".{0,24}",
    ]
}

proptest! {
    #[test]
    fn translation_is_total(pairs in prop::collection::vec((arb_key(), arb_value()), 0..12)) {
        let params = QueryParams::new(pairs);
        match translate(&params) {
            Ok(plan) => {
                prop_assert!((MIN_LIMIT..=MAX_LIMIT).contains(&plan.limit));
                let expected = params.iter().filter(|(k, _)| !is_reserved(k)).count();
                prop_assert_eq!(plan.predicates.len(), expected);
                for predicate in &plan.predicates {
                    match (&predicate.op, &predicate.value) {
                        (Operator::In, FilterValue::List(items)) => prop_assert!(!items.is_empty()),
                        (Operator::In, FilterValue::Scalar(_)) => prop_assert!(false, "in without list"),
                        (_, FilterValue::List(_)) => prop_assert!(false, "list without in"),
                        _ => {}
                    }
                }
            }
            Err(err) => {
                prop_assert!(matches!(err.parameter(), "limit" | "offset"));
            }
        }
    }

    #[test]
    fn coercion_is_deterministic(raw in ".{0,24}") {
        prop_assert_eq!(coerce(&raw), coerce(&raw));
    }

    #[test]
    fn integers_survive_coercion(n in any::<i64>()) {
        prop_assert_eq!(coerce(&n.to_string()), Scalar::Int(n));
    }

    #[test]
    fn non_numeric_strings_are_untouched(raw in "[a-z][a-z ]{0,10}") {
        prop_assert_eq!(coerce(&raw), Scalar::Str(raw.clone()));
    }
}
