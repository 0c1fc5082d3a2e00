use crate::error::ServerResult;
use crate::routes::documents::query_params;
use crate::state::ServerState;
use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use docgate::{COLLECTION_PREFIX, SUBCOLLECTION_PREFIX, build_predicates};
use serde_json::{Value, json};
use std::sync::Arc;

/// `GET /collections/{collection}/subcollections/{subcollection}`
///
/// `collection_*` parameters filter parents, `subcollection_*` parameters
/// filter children. Anything else is ignored.
pub async fn query_with_subcollection(
    State(state): State<Arc<ServerState>>,
    Path((collection, subcollection)): Path<(String, String)>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> ServerResult<impl IntoResponse> {
    let params = query_params(query)?;
    let parent_filters = build_predicates(&params.scoped(COLLECTION_PREFIX));
    let child_filters = build_predicates(&params.scoped(SUBCOLLECTION_PREFIX));

    let results = state
        .store
        .query_with_subcollection(&collection, &subcollection, &parent_filters, &child_filters)
        .await?;

    let data: Vec<Value> = results
        .into_iter()
        .map(|nested| nested.into_json(&subcollection))
        .collect();

    tracing::debug!(
        collection = %collection,
        subcollection = %subcollection,
        parents = data.len(),
        "queried nested collection"
    );

    Ok(Json(json!({
        "status": "success",
        "count": data.len(),
        "collection": collection,
        "subcollection": subcollection,
        "data": data,
    })))
}
