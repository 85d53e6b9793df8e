use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{Map, Value};

use backend_application::commands::record_commands;
use backend_application::dtos::{AssignCodesResult, FlagUpdateRequest};
use backend_application::queries::record_queries;
use backend_application::AppState;
use backend_domain::{NewRecord, Record, RecordPatch};

use crate::error::HttpError;

pub async fn create_record(
    State(state): State<AppState>,
    Json(payload): Json<NewRecord>,
) -> Result<Json<Record>, HttpError> {
    let record = record_commands::create_record(&state, payload).await?;
    Ok(Json(record))
}

pub async fn list_records(State(state): State<AppState>) -> Result<Json<Vec<Record>>, HttpError> {
    let records = record_queries::list_all_records(&state).await?;
    Ok(Json(records))
}

pub async fn list_event_records(
    State(state): State<AppState>,
    Path(event_name): Path<String>,
) -> Result<Json<Vec<Record>>, HttpError> {
    let records = record_queries::list_records_by_event(&state, &event_name).await?;
    Ok(Json(records))
}

pub async fn get_record(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<Map<String, Value>>, HttpError> {
    let record = record_queries::get_flattened_record(&state, &code).await?;
    Ok(Json(record))
}

pub async fn get_record_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Record>, HttpError> {
    let record = record_queries::get_record_by_id(&state, id).await?;
    Ok(Json(record))
}

pub async fn update_record(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(patch): Json<RecordPatch>,
) -> Result<Json<Record>, HttpError> {
    let record = record_commands::update_record(&state, &code, patch).await?;
    Ok(Json(record))
}

pub async fn update_status(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(payload): Json<FlagUpdateRequest>,
) -> Result<Json<Record>, HttpError> {
    let record = record_commands::update_flag(&state, &code, &payload.flag, payload.value).await?;
    Ok(Json(record))
}

pub async fn delete_record(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<StatusCode, HttpError> {
    record_commands::delete_record(&state, &code).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn update_codes(
    State(state): State<AppState>,
) -> Result<Json<AssignCodesResult>, HttpError> {
    let updated = record_commands::assign_codes(&state).await?;
    Ok(Json(AssignCodesResult { updated }))
}
