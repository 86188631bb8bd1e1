use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

use crate::client::RecordStore;
use crate::server::AppState;
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt, StoreResultExt};
use crate::server::validation::validate_payload;
use crate::types::CrewMemberPayload;

pub async fn list_crewmates(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let members = state
        .records
        .list_all()
        .await
        .api_err("Failed to list crewmates")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(members)))
}

pub async fn create_crewmate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CrewMemberPayload>, JsonRejection>,
) -> impl IntoResponse {
    let Json(payload) = payload?;
    validate_payload(&payload)?;

    let member = state
        .records
        .insert(&payload)
        .await
        .api_err("Failed to create crewmate")?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(member))))
}

pub async fn get_crewmate(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let member = state
        .records
        .get_by_id(&id)
        .await
        .api_err("Failed to get crewmate")?
        .or_not_found("Crewmate not found")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(member)))
}

pub async fn update_crewmate(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<CrewMemberPayload>, JsonRejection>,
) -> impl IntoResponse {
    let Json(payload) = payload?;
    validate_payload(&payload)?;

    let member = state
        .records
        .update(&id, &payload)
        .await
        .api_err("Failed to update crewmate")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(member)))
}

pub async fn delete_crewmate(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    state
        .records
        .delete(&id)
        .await
        .api_err("Failed to delete crewmate")?;

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}
