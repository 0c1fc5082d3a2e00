use docgate::{MAX_LIMIT, QueryError, QueryParams, translate};

fn translate_pairs(pairs: &[(&str, &str)]) -> Result<docgate::QueryPlan, QueryError> {
    translate(&QueryParams::new(pairs.iter().copied()))
}

#[test]
fn zero_limit_is_rejected() {
    let result = translate_pairs(&[("limit", "0")]);
    assert!(matches!(
        result,
        Err(QueryError::LimitOutOfRange { value: 0, .. })
    ));
}

#[test]
fn limit_above_maximum_is_rejected_not_clamped() {
    let result = translate_pairs(&[("limit", "1001")]);
    assert!(matches!(
        result,
        Err(QueryError::LimitOutOfRange { value: 1001, .. })
    ));
}

#[test]
fn non_integer_limit_is_rejected() {
    let result = translate_pairs(&[("limit", "abc")]);
    assert_eq!(result, Err(QueryError::InvalidLimit("abc".into())));
    assert_eq!(
        result.unwrap_err().to_string(),
        "Limit must be an integer"
    );
}

#[test]
fn maximum_limit_is_accepted() {
    let plan = translate_pairs(&[("limit", "1000")]).expect("limit=1000 is valid");
    assert_eq!(plan.limit, MAX_LIMIT);
}

#[test]
fn negative_offset_is_rejected() {
    let result = translate_pairs(&[("offset", "-5")]);
    assert_eq!(result, Err(QueryError::NegativeOffset(-5)));
    assert_eq!(result.unwrap_err().to_string(), "Offset must be >= 0");
}

#[test]
fn non_integer_offset_is_rejected() {
    let result = translate_pairs(&[("offset", "1.5")]);
    assert!(matches!(result, Err(QueryError::InvalidOffset(_))));
}

#[test]
fn limit_is_validated_before_offset() {
    let result = translate_pairs(&[("offset", "bad"), ("limit", "bad")]);
    assert!(matches!(result, Err(QueryError::InvalidLimit(_))));
}

#[test]
fn unknown_fields_are_accepted() {
    let plan = translate_pairs(&[("no_such_field", "x"), ("", "y")]).expect("accepted");
    assert_eq!(plan.predicates.len(), 2);
    assert_eq!(plan.predicates[1].field, "");
}
