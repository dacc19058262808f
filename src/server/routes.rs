use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::entity::EntityKind;
use crate::model::Record;
use crate::query::{QueryCatalog, Report};
use crate::server::error::ApiError;
use crate::server::AppState;
use crate::storage::ClubStore;

#[derive(Deserialize)]
pub struct ReportParams {
    pub limit: Option<usize>,
}

#[derive(Serialize)]
pub struct ReportInfo {
    pub name: &'static str,
    pub description: &'static str,
}

/// Run repository work off the async runtime
async fn blocking<T, F>(state: &AppState, op: F) -> Result<T, ApiError>
where
    F: FnOnce(ClubStore) -> T + Send + 'static,
    T: Send + 'static,
{
    let store = state.store.clone();
    tokio::task::spawn_blocking(move || op(store))
        .await
        .map_err(|e| ApiError::Internal { message: e.to_string() })
}

fn entity_kind(entity: &str) -> Result<EntityKind, ApiError> {
    entity
        .parse::<EntityKind>()
        .map_err(|_| ApiError::not_found(format!("unknown entity: {}", entity)))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn create_record(
    State(state): State<Arc<AppState>>,
    Path(entity): Path<String>,
    Json(body): Json<Value>,
) -> Result<Response, ApiError> {
    let kind = entity_kind(&entity)?;

    match body {
        Value::Object(record) => {
            let outcome = blocking(&state, move |store| store.insert_one(kind, &record)).await?;
            if !outcome.ok {
                return Err(outcome.into());
            }
            Ok((StatusCode::CREATED, Json(outcome)).into_response())
        }
        Value::Array(items) => {
            let rows = items
                .into_iter()
                .enumerate()
                .map(|(i, item)| match item {
                    Value::Object(record) => Ok(record),
                    _ => Err(ApiError::bad_request(format!("row {}: expected a JSON object", i + 1))),
                })
                .collect::<Result<Vec<Record>, ApiError>>()?;

            let outcome = blocking(&state, move |store| store.insert_many(kind, &rows)).await?;
            if !outcome.ok {
                return Err(outcome.into());
            }
            Ok((StatusCode::CREATED, Json(outcome)).into_response())
        }
        _ => Err(ApiError::bad_request("expected a JSON object or an array of objects")),
    }
}

pub async fn list_records(
    State(state): State<Arc<AppState>>,
    Path(entity): Path<String>,
) -> Result<Json<Vec<Record>>, ApiError> {
    let kind = entity_kind(&entity)?;
    let rows = blocking(&state, move |store| store.get_all(kind)).await?;

    if rows.is_empty() {
        return Err(ApiError::not_found(format!("no {} found", kind.plural())));
    }
    Ok(Json(rows))
}

pub async fn get_record(
    State(state): State<Arc<AppState>>,
    Path((entity, id)): Path<(String, i64)>,
) -> Result<Json<Record>, ApiError> {
    let kind = entity_kind(&entity)?;

    blocking(&state, move |store| store.get_by_id(kind, id))
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("{} {} not found", kind.label(), id)))
}

pub async fn list_reports() -> Json<Vec<ReportInfo>> {
    Json(
        Report::all()
            .iter()
            .map(|r| ReportInfo { name: r.as_str(), description: r.description() })
            .collect(),
    )
}

pub async fn run_report(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Query(params): Query<ReportParams>,
) -> Result<Json<Vec<Record>>, ApiError> {
    let report = name
        .parse::<Report>()
        .map_err(|_| ApiError::not_found(format!("unknown report: {}", name)))?;

    let rows = blocking(&state, move |store| {
        QueryCatalog::new(store.database()).run(report, params.limit)
    })
    .await?;
    Ok(Json(rows))
}

pub async fn player_stats(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Record>, ApiError> {
    blocking(&state, move |store| QueryCatalog::new(store.database()).player_summary(id))
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Player {} not found", id)))
}
