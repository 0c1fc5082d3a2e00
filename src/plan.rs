//! Query plan: predicates plus sort, pagination and projection directives.

use std::num::IntErrorKind;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::QueryError;
use crate::filter::{Predicate, build_predicates};
use crate::params::QueryParams;

pub const DEFAULT_LIMIT: usize = 20;
pub const MIN_LIMIT: usize = 1;
pub const MAX_LIMIT: usize = 1000;

/// Identifier key merged into every document payload.
pub const ID_FIELD: &str = "id";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub field: String,
    pub direction: Direction,
}

/// Field whitelist applied to response documents. `id` always survives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Projection {
    fields: Vec<String>,
}

impl Projection {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn contains(&self, field: &str) -> bool {
        field == ID_FIELD || self.fields.iter().any(|f| f == field)
    }

    /// Drop every top-level key not in the projection, then set `id`.
    pub fn apply(&self, id: &str, mut fields: Map<String, Value>) -> Map<String, Value> {
        fields.retain(|key, _| self.contains(key));
        fields.insert(ID_FIELD.to_string(), Value::from(id));
        fields
    }
}

/// Fully resolved request for one list query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryPlan {
    pub predicates: Vec<Predicate>,
    pub sort: Vec<SortKey>,
    pub limit: usize,
    pub offset: usize,
    pub projection: Option<Projection>,
}

impl QueryPlan {
    /// How many documents to request from the store.
    ///
    /// With `legacy_offset_slicing` the store is asked for `limit` items only
    /// and the offset is applied afterwards, so any `offset >= limit` yields an
    /// empty page. Without it the store is asked for enough items to cover the
    /// offset.
    pub fn fetch_size(&self, legacy_offset_slicing: bool) -> usize {
        if legacy_offset_slicing {
            self.limit
        } else {
            self.offset.saturating_add(self.limit)
        }
    }

    /// Slice `[offset, offset + limit)` out of the store's result.
    pub fn window<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset)
            .take(self.limit)
            .collect()
    }

    /// Shape one stored document for the response: merge `id` and project.
    pub fn render(&self, id: &str, fields: Map<String, Value>) -> Map<String, Value> {
        match &self.projection {
            Some(projection) => projection.apply(id, fields),
            None => {
                let mut fields = fields;
                fields.insert(ID_FIELD.to_string(), Value::from(id));
                fields
            }
        }
    }
}

/// Parse `order_by`: comma separated, leading `-` for descending.
pub fn parse_order_by(raw: &str) -> Vec<SortKey> {
    raw.split(',')
        .map(str::trim)
        .filter_map(|part| {
            let field = part.trim_start_matches('-');
            if field.is_empty() {
                return None;
            }
            let direction = if part.starts_with('-') {
                Direction::Descending
            } else {
                Direction::Ascending
            };
            Some(SortKey {
                field: field.to_string(),
                direction,
            })
        })
        .collect()
}

/// Parse `fields` into a projection. Blank entries are ignored.
pub fn parse_projection(raw: &str) -> Projection {
    Projection::new(
        raw.split(',')
            .map(str::trim)
            .filter(|f| !f.is_empty()),
    )
}

/// Integer parse that saturates on overflow, so huge values are range errors
/// rather than "not an integer".
fn parse_int(raw: &str) -> Option<i128> {
    match raw
        .trim_matches(|c: char| c.is_ascii_whitespace())
        .parse::<i128>()
    {
        Ok(value) => Some(value),
        Err(err) => match err.kind() {
            IntErrorKind::PosOverflow => Some(i128::MAX),
            IntErrorKind::NegOverflow => Some(i128::MIN),
            _ => None,
        },
    }
}

pub fn parse_limit(raw: Option<&str>) -> Result<usize, QueryError> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_LIMIT);
    };
    let value = parse_int(raw).ok_or_else(|| QueryError::InvalidLimit(raw.to_string()))?;
    match usize::try_from(value) {
        Ok(limit) if (MIN_LIMIT..=MAX_LIMIT).contains(&limit) => Ok(limit),
        _ => Err(QueryError::LimitOutOfRange {
            value,
            min: MIN_LIMIT,
            max: MAX_LIMIT,
        }),
    }
}

pub fn parse_offset(raw: Option<&str>) -> Result<usize, QueryError> {
    let Some(raw) = raw else {
        return Ok(0);
    };
    let value = parse_int(raw).ok_or_else(|| QueryError::InvalidOffset(raw.to_string()))?;
    if value < 0 {
        return Err(QueryError::NegativeOffset(value));
    }
    // Past the end of any result set either way.
    Ok(usize::try_from(value).unwrap_or(usize::MAX))
}

/// Translate one request's parameters into a [`QueryPlan`].
///
/// Pure and total: any input yields either a plan or a [`QueryError`].
pub fn translate(params: &QueryParams) -> Result<QueryPlan, QueryError> {
    let limit = parse_limit(params.get("limit"))?;
    let offset = parse_offset(params.get("offset"))?;
    let sort = params.get("order_by").map(parse_order_by).unwrap_or_default();
    // `fields=` with nothing usable in it means no projection.
    let projection = params
        .get("fields")
        .map(parse_projection)
        .filter(|p| !p.fields().is_empty());
    let predicates = build_predicates(params);

    tracing::debug!(
        predicates = predicates.len(),
        sort_keys = sort.len(),
        limit,
        offset,
        projected = projection.is_some(),
        "translated query parameters"
    );

    Ok(QueryPlan {
        predicates,
        sort,
        limit,
        offset,
        projection,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{FilterValue, Operator, Scalar};
    use serde_json::json;

    fn plan(pairs: &[(&str, &str)]) -> Result<QueryPlan, QueryError> {
        translate(&QueryParams::new(pairs.iter().copied()))
    }

    #[test]
    fn test_defaults() {
        let plan = plan(&[]).unwrap();
        assert_eq!(plan.limit, DEFAULT_LIMIT);
        assert_eq!(plan.offset, 0);
        assert!(plan.sort.is_empty());
        assert!(plan.predicates.is_empty());
        assert!(plan.projection.is_none());
    }

    #[test]
    fn test_limit_bounds() {
        for bad in ["0", "1001", "-1"] {
            assert!(
                matches!(plan(&[("limit", bad)]), Err(QueryError::LimitOutOfRange { .. })),
                "limit={bad}"
            );
        }
        for bad in ["abc", "", "1.5", "10x"] {
            assert!(
                matches!(plan(&[("limit", bad)]), Err(QueryError::InvalidLimit(_))),
                "limit={bad}"
            );
        }
        assert_eq!(plan(&[("limit", "1000")]).unwrap().limit, 1000);
        assert_eq!(plan(&[("limit", "1")]).unwrap().limit, 1);
        assert_eq!(plan(&[("limit", " 50 ")]).unwrap().limit, 50);
    }

    #[test]
    fn test_offset_bounds() {
        assert_eq!(plan(&[("offset", "-1")]), Err(QueryError::NegativeOffset(-1)));
        assert!(matches!(
            plan(&[("offset", "two")]),
            Err(QueryError::InvalidOffset(_))
        ));
        assert_eq!(plan(&[("offset", "0")]).unwrap().offset, 0);
        assert_eq!(plan(&[("offset", "250")]).unwrap().offset, 250);
    }

    #[test]
    fn test_oversized_integers_are_range_checked() {
        let plan_ok = plan(&[("offset", "99999999999999999999")]).unwrap();
        assert_eq!(plan_ok.offset, usize::MAX);
        assert!(plan_ok.window((0..10).collect::<Vec<u32>>()).is_empty());
        assert_eq!(plan_ok.fetch_size(false), usize::MAX);

        assert!(matches!(
            plan(&[("offset", "-99999999999999999999999999999999999999999")]),
            Err(QueryError::NegativeOffset(_))
        ));
        assert!(matches!(
            plan(&[("limit", "99999999999999999999")]),
            Err(QueryError::LimitOutOfRange { .. })
        ));
    }

    #[test]
    fn test_blank_fields_mean_no_projection() {
        for blank in ["", " ", ",,", " , "] {
            let plan = plan(&[("fields", blank)]).unwrap();
            assert!(plan.projection.is_none(), "fields={blank:?}");
        }
    }

    #[test]
    fn test_order_by() {
        let keys = parse_order_by("-created,name, -score");
        assert_eq!(
            keys,
            vec![
                SortKey {
                    field: "created".into(),
                    direction: Direction::Descending
                },
                SortKey {
                    field: "name".into(),
                    direction: Direction::Ascending
                },
                SortKey {
                    field: "score".into(),
                    direction: Direction::Descending
                },
            ]
        );
        assert!(parse_order_by("").is_empty());
        assert!(parse_order_by("-,,").is_empty());
    }

    #[test]
    fn test_projection_keeps_id() {
        let projection = parse_projection(" name , total ,,");
        assert_eq!(projection.fields(), ["name".to_string(), "total".to_string()]);

        let doc = json!({"name": "a", "total": 3, "secret": true});
        let Value::Object(fields) = doc else {
            panic!("object expected");
        };
        let shaped = projection.apply("o1", fields);
        assert_eq!(
            Value::Object(shaped),
            json!({"id": "o1", "name": "a", "total": 3})
        );
    }

    #[test]
    fn test_render_without_projection_merges_id() {
        let plan = plan(&[]).unwrap();
        let Value::Object(fields) = json!({"status": "new"}) else {
            panic!("object expected");
        };
        assert_eq!(
            Value::Object(plan.render("o1", fields)),
            json!({"id": "o1", "status": "new"})
        );
    }

    #[test]
    fn test_legacy_window_empties_when_offset_reaches_limit() {
        let plan = plan(&[("limit", "3"), ("offset", "3")]).unwrap();
        let backend: Vec<u32> = (0..plan.fetch_size(true) as u32).collect();
        assert_eq!(backend.len(), 3);
        assert!(plan.window(backend).is_empty());
    }

    #[test]
    fn test_corrected_window_returns_next_page() {
        let plan = plan(&[("limit", "3"), ("offset", "3")]).unwrap();
        assert_eq!(plan.fetch_size(false), 6);
        let backend: Vec<u32> = (0..6).collect();
        assert_eq!(plan.window(backend), vec![3, 4, 5]);
    }

    #[test]
    fn test_full_translation() {
        let plan = plan(&[
            ("price_gte", "10"),
            ("status_in", "new,paid"),
            ("order_by", "-price"),
            ("limit", "5"),
            ("fields", "price"),
        ])
        .unwrap();
        assert_eq!(plan.predicates.len(), 2);
        assert_eq!(plan.predicates[0].field, "price");
        assert_eq!(plan.predicates[0].op, Operator::Gte);
        assert_eq!(
            plan.predicates[0].value,
            FilterValue::Scalar(Scalar::Int(10))
        );
        assert_eq!(plan.sort[0].direction, Direction::Descending);
        assert_eq!(plan.limit, 5);
        assert!(plan.projection.is_some());
    }
}
