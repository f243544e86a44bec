//! Request handlers

use assignment_core::{Agent, AgentId, AgentLoad, Case, CaseId, CaseStatus, NewAgent, NewCase};
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::error::ApiError;
use super::ApiState;

type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityUpdate {
    pub online: bool,
}

pub async fn create_case(
    State(state): State<ApiState>,
    payload: Result<Json<NewCase>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Case>)> {
    let Json(new_case) = payload?;
    let case = state.assigner.create_case_with_assignment(new_case).await?;
    Ok((StatusCode::CREATED, Json(case)))
}

pub async fn get_case(
    State(state): State<ApiState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Case>> {
    let Path(case_id) = path?;
    Ok(Json(state.assigner.get_case(CaseId(case_id)).await?))
}

pub async fn update_case_status(
    State(state): State<ApiState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<StatusUpdate>, JsonRejection>,
) -> ApiResult<Json<Case>> {
    let Path(case_id) = path?;
    let Json(update) = payload?;
    let status: CaseStatus = update.status.parse()?;
    Ok(Json(state.assigner.update_case_status(CaseId(case_id), status).await?))
}

pub async fn list_agents(State(state): State<ApiState>) -> ApiResult<Json<Vec<Agent>>> {
    Ok(Json(state.assigner.list_agents().await?))
}

pub async fn agent_loads(State(state): State<ApiState>) -> ApiResult<Json<Vec<AgentLoad>>> {
    Ok(Json(state.assigner.agent_loads().await?))
}

pub async fn register_agent(
    State(state): State<ApiState>,
    payload: Result<Json<NewAgent>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Agent>)> {
    let Json(new_agent) = payload?;
    let agent = state.assigner.register_agent(new_agent).await?;
    Ok((StatusCode::CREATED, Json(agent)))
}

pub async fn set_agent_online(
    State(state): State<ApiState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<AvailabilityUpdate>, JsonRejection>,
) -> ApiResult<Json<Agent>> {
    let Path(agent_id) = path?;
    let Json(update) = payload?;
    Ok(Json(state.assigner.set_agent_online(AgentId(agent_id), update.online).await?))
}
