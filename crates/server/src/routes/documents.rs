use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use docgate::{QueryParams, translate};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::sync::Arc;

/// Query string of `POST /documents/{collection}`
#[derive(Debug, Default, Deserialize)]
pub struct CreateQuery {
    #[serde(default)]
    pub doc_id: Option<String>,
}

/// Response of the list endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct ListResponse {
    pub status: String,
    pub data: Vec<Value>,
    pub limit: usize,
    pub offset: usize,
    pub count: usize,
}

/// Raw query string as ordered pairs; duplicates resolved by `QueryParams`.
pub(crate) fn query_params(
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> ServerResult<QueryParams> {
    let Query(pairs) = query.map_err(|rejection| ServerError::BadRequest(rejection.body_text()))?;
    Ok(QueryParams::new(pairs))
}

/// Request body must be a JSON object.
fn object_body(body: Result<Json<Value>, JsonRejection>) -> ServerResult<Map<String, Value>> {
    let Json(value) = body.map_err(|rejection| ServerError::BadRequest(rejection.body_text()))?;
    match value {
        Value::Object(map) => Ok(map),
        other => Err(ServerError::BadRequest(format!(
            "request body must be a JSON object, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// `GET /documents/{collection}`: filtered, sorted, paged, projected listing
pub async fn list_documents(
    State(state): State<Arc<ServerState>>,
    Path(collection): Path<String>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> ServerResult<impl IntoResponse> {
    let params = query_params(query)?;
    let plan = translate(&params)?;
    let legacy = state.config.legacy_offset_slicing;

    let documents = state
        .store
        .query(
            &collection,
            &plan.predicates,
            &plan.sort,
            plan.fetch_size(legacy),
        )
        .await?;

    let data: Vec<Value> = plan
        .window(documents)
        .into_iter()
        .map(|doc| Value::Object(plan.render(&doc.id, doc.fields)))
        .collect();

    tracing::debug!(
        collection = %collection,
        predicates = plan.predicates.len(),
        returned = data.len(),
        "listed documents"
    );

    Ok(Json(ListResponse {
        status: "success".to_string(),
        count: data.len(),
        limit: plan.limit,
        offset: plan.offset,
        data,
    }))
}

/// `POST /documents/{collection}`, optional `?doc_id=`
pub async fn create_document(
    State(state): State<Arc<ServerState>>,
    Path(collection): Path<String>,
    query: Result<Query<CreateQuery>, QueryRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> ServerResult<impl IntoResponse> {
    let Query(create) =
        query.map_err(|rejection| ServerError::BadRequest(rejection.body_text()))?;
    let fields = object_body(body)?;
    store_new_document(&state, &collection, fields, create.doc_id).await
}

/// `POST /documents/{collection}/{id}`
pub async fn create_document_with_id(
    State(state): State<Arc<ServerState>>,
    Path((collection, doc_id)): Path<(String, String)>,
    body: Result<Json<Value>, JsonRejection>,
) -> ServerResult<impl IntoResponse> {
    let fields = object_body(body)?;
    store_new_document(&state, &collection, fields, Some(doc_id)).await
}

async fn store_new_document(
    state: &ServerState,
    collection: &str,
    fields: Map<String, Value>,
    doc_id: Option<String>,
) -> ServerResult<(StatusCode, Json<Value>)> {
    let document = state.store.create(collection, fields, doc_id).await?;
    tracing::info!(collection = %collection, doc_id = %document.id, "created document");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "status": "success", "data": document.into_json() })),
    ))
}

/// `GET /documents/{collection}/{id}`
pub async fn read_document(
    State(state): State<Arc<ServerState>>,
    Path((collection, doc_id)): Path<(String, String)>,
) -> ServerResult<impl IntoResponse> {
    let document = state
        .store
        .read(&collection, &doc_id)
        .await?
        .ok_or(ServerError::DocumentNotFound)?;
    Ok(Json(json!({ "status": "success", "data": document.into_json() })))
}

/// `PUT /documents/{collection}/{id}`: shallow merge of top-level keys
pub async fn update_document(
    State(state): State<Arc<ServerState>>,
    Path((collection, doc_id)): Path<(String, String)>,
    body: Result<Json<Value>, JsonRejection>,
) -> ServerResult<impl IntoResponse> {
    let partial = object_body(body)?;
    let document = state.store.update(&collection, &doc_id, partial).await?;
    tracing::info!(collection = %collection, doc_id = %doc_id, "updated document");
    Ok(Json(json!({ "status": "success", "data": document.into_json() })))
}

/// `DELETE /documents/{collection}/{id}`
pub async fn delete_document(
    State(state): State<Arc<ServerState>>,
    Path((collection, doc_id)): Path<(String, String)>,
) -> ServerResult<impl IntoResponse> {
    state.store.delete(&collection, &doc_id).await?;
    tracing::info!(collection = %collection, doc_id = %doc_id, "deleted document");
    Ok(Json(json!({ "status": "success", "data": { "id": doc_id } })))
}
