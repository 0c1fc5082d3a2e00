//! Query translation core for the docgate document adapter.
//!
//! HTTP clients describe list queries with plain query-string parameters:
//!
//! ```text
//! GET /documents/orders?status_in=new,paid&total_gte=100&order_by=-created&limit=50&fields=total
//! ```
//!
//! This crate turns those untyped pairs into a [`QueryPlan`] the document
//! store can execute. Translation is pure and total: any parameter list yields
//! either a plan or a [`QueryError`] describing the bad `limit`/`offset`.
//!
//! ## What we do here
//!
//! - **Predicates** - every non-reserved key becomes `(field, operator, value)`.
//!   Operators come from exact key suffixes (`_gte`, `_lte`, `_gt`, `_lt`,
//!   `_in`), defaulting to equality.
//! - **Coercion** - values are typed best-effort: integer, then float, then the
//!   raw string. See [`coerce`].
//! - **Sort** - `order_by=-a,b` sorts by `a` descending, then `b` ascending.
//! - **Pagination** - `limit` (default 20, `1..=1000`) and `offset` (default 0).
//! - **Projection** - `fields=a,b` keeps only those keys plus `id`.
//!
//! ## Example
//!
//! ```
//! use docgate::{translate, Direction, Operator, QueryParams};
//!
//! let params = QueryParams::new([
//!     ("total_gte", "100"),
//!     ("order_by", "-created"),
//!     ("limit", "50"),
//! ]);
//! let plan = translate(&params).unwrap();
//!
//! assert_eq!(plan.predicates[0].op, Operator::Gte);
//! assert_eq!(plan.sort[0].direction, Direction::Descending);
//! assert_eq!(plan.limit, 50);
//! assert_eq!(plan.offset, 0);
//! ```

mod error;
mod filter;
mod params;
mod plan;

pub use crate::error::QueryError;
pub use crate::filter::{
    COLLECTION_PREFIX, FilterValue, Operator, Predicate, RESERVED_KEYS, SUBCOLLECTION_PREFIX,
    Scalar, build_predicates, coerce, is_reserved, split_operator,
};
pub use crate::params::QueryParams;
pub use crate::plan::{
    DEFAULT_LIMIT, Direction, ID_FIELD, MAX_LIMIT, MIN_LIMIT, Projection, QueryPlan, SortKey,
    parse_limit, parse_offset, parse_order_by, parse_projection, translate,
};
