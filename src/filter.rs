//! Predicate construction from query-string keys.
//!
//! Every non-reserved key becomes one [`Predicate`]. The operator is read from
//! an exact trailing suffix on the key (`price_gte=10` → `price >= 10`), and
//! the value goes through best-effort [`coerce`]ion so numeric filters compare
//! as numbers in the store.
//!
//! ```
//! use docgate::{build_predicates, FilterValue, Operator, QueryParams, Scalar};
//!
//! let params = QueryParams::new([("price_gte", "10"), ("status_in", "new,paid")]);
//! let predicates = build_predicates(&params);
//!
//! assert_eq!(predicates[0].field, "price");
//! assert_eq!(predicates[0].op, Operator::Gte);
//! assert_eq!(predicates[0].value, FilterValue::Scalar(Scalar::Int(10)));
//! assert_eq!(predicates[1].op, Operator::In);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::params::QueryParams;

/// Keys handled by dedicated rules rather than turned into predicates.
pub const RESERVED_KEYS: [&str; 5] = ["limit", "offset", "order_by", "fields", "include_parent"];

/// Keys with this prefix belong to the nested-collection query mode.
pub const SUBCOLLECTION_PREFIX: &str = "subcollection_";

/// Keys with this prefix scope parent filters in the nested-collection query mode.
pub const COLLECTION_PREFIX: &str = "collection_";

/// Comparison operators understood by the document store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = "<=")]
    Lte,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "in")]
    In,
}

/// Suffixes in match priority. `_gte` must be tried before `_gt`.
const SUFFIXES: [(&str, Operator); 5] = [
    ("_gte", Operator::Gte),
    ("_lte", Operator::Lte),
    ("_gt", Operator::Gt),
    ("_lt", Operator::Lt),
    ("_in", Operator::In),
];

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "==",
            Operator::Gte => ">=",
            Operator::Lte => "<=",
            Operator::Gt => ">",
            Operator::Lt => "<",
            Operator::In => "in",
        }
    }

    /// True for the four ordering comparisons.
    pub fn is_range(&self) -> bool {
        matches!(
            self,
            Operator::Gte | Operator::Lte | Operator::Gt | Operator::Lt
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single typed filter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Str(String),
}

impl Scalar {
    /// JSON form used when comparing against stored documents.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Scalar::Int(n) => serde_json::Value::from(*n),
            Scalar::Float(f) => serde_json::Value::from(*f),
            Scalar::Str(s) => serde_json::Value::from(s.as_str()),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(n) => write!(f, "{n}"),
            Scalar::Float(x) => write!(f, "{x:?}"),
            Scalar::Str(s) => write!(f, "{s:?}"),
        }
    }
}

/// Right-hand side of a predicate. `In` always carries a non-empty list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Scalar(Scalar),
    List(Vec<Scalar>),
}

impl FilterValue {
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            FilterValue::Scalar(s) => s.to_json(),
            FilterValue::List(items) => {
                serde_json::Value::Array(items.iter().map(Scalar::to_json).collect())
            }
        }
    }
}

/// One conjunctive filter condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    pub field: String,
    pub op: Operator,
    pub value: FilterValue,
}

impl Predicate {
    pub fn new(field: impl Into<String>, op: Operator, value: FilterValue) -> Self {
        Self {
            field: field.into(),
            op,
            value,
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            FilterValue::Scalar(s) => write!(f, "{} {} {}", self.field, self.op, s),
            FilterValue::List(items) => {
                write!(f, "{} {} [", self.field, self.op)?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Best-effort typing of a raw query-string value.
///
/// Integer first, then float when the text contains a `.`, otherwise the
/// original string untouched. Lossy on purpose: `"007"` becomes `7`, while
/// `"1.0.0"` and `"1e3"` stay strings.
pub fn coerce(raw: &str) -> Scalar {
    let trimmed = raw.trim_matches(|c: char| c.is_ascii_whitespace());
    if let Ok(n) = trimmed.parse::<i64>() {
        return Scalar::Int(n);
    }
    if trimmed.contains('.') {
        if let Ok(x) = trimmed.parse::<f64>() {
            if x.is_finite() {
                return Scalar::Float(x);
            }
        }
    }
    Scalar::Str(raw.to_string())
}

/// Whether `key` is consumed by sort/pagination/projection or the nested mode.
pub fn is_reserved(key: &str) -> bool {
    RESERVED_KEYS.contains(&key) || key.starts_with(SUBCOLLECTION_PREFIX)
}

/// Split `key` into `(field, operator)` using the first matching suffix.
pub fn split_operator(key: &str) -> (&str, Operator) {
    SUFFIXES
        .iter()
        .find_map(|(suffix, op)| key.strip_suffix(suffix).map(|field| (field, *op)))
        .unwrap_or((key, Operator::Eq))
}

/// Build predicates for every non-reserved parameter, in parameter order.
pub fn build_predicates(params: &QueryParams) -> Vec<Predicate> {
    params
        .iter()
        .filter(|(key, _)| !is_reserved(key))
        .map(|(key, raw)| {
            let (field, op) = split_operator(key);
            let value = match op {
                Operator::In => FilterValue::List(raw.split(',').map(coerce).collect()),
                _ => FilterValue::Scalar(coerce(raw)),
            };
            Predicate::new(field, op, value)
        })
        .collect()
}
