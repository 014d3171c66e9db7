use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::error_status;
use crate::database::entities::generation_jobs;
use crate::database::entities::projects::Entity as Projects;
use sea_orm::EntityTrait;
use crate::server::app::AppState;
use crate::services::generation::GenerationOutcome;
use crate::services::queue::GenerationRequest;

/// Optional body for the generate endpoints; the triggering user defaults to
/// the project owner.
#[derive(Serialize, Deserialize, Default)]
pub struct GenerateRequest {
    pub user_id: Option<i32>,
}

async fn resolve_trigger(
    state: &AppState,
    project_id: i32,
    requested: Option<i32>,
) -> Result<i32, StatusCode> {
    let project = Projects::find_by_id(project_id)
        .one(&state.db)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;
    Ok(requested.unwrap_or(project.owner_user_id))
}

pub async fn generate_queued(
    State(state): State<AppState>,
    Path(project_id): Path<i32>,
    payload: Option<Json<GenerateRequest>>,
) -> Result<(StatusCode, Json<Value>), StatusCode> {
    let requested = payload.and_then(|Json(p)| p.user_id);
    let user_id = resolve_trigger(&state, project_id, requested).await?;

    state
        .queue
        .enqueue(GenerationRequest {
            project_id,
            user_id,
        })
        .await
        .map_err(|err| error_status(&err))?;

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({ "project_id": project_id, "status": "queued" })),
    ))
}

pub async fn generate_durable(
    State(state): State<AppState>,
    Path(project_id): Path<i32>,
    payload: Option<Json<GenerateRequest>>,
) -> Result<(StatusCode, Json<Value>), StatusCode> {
    let requested = payload.and_then(|Json(p)| p.user_id);
    let user_id = resolve_trigger(&state, project_id, requested).await?;

    let job_id = state
        .jobs
        .run_generation(project_id, user_id)
        .await
        .map_err(|err| error_status(&err))?;

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({ "project_id": project_id, "job_id": job_id, "status": "processing" })),
    ))
}

pub async fn generate_sync(
    State(state): State<AppState>,
    Path(project_id): Path<i32>,
    payload: Option<Json<GenerateRequest>>,
) -> Result<Json<GenerationOutcome>, StatusCode> {
    let requested = payload.and_then(|Json(p)| p.user_id);
    let user_id = resolve_trigger(&state, project_id, requested).await?;

    let outcome = state
        .generation
        .generate(project_id, user_id)
        .await
        .map_err(|err| error_status(&err))?;

    Ok(Json(outcome))
}

pub async fn generation_status(
    State(state): State<AppState>,
    Path(project_id): Path<i32>,
) -> Result<Json<Value>, StatusCode> {
    let project = Projects::find_by_id(project_id)
        .one(&state.db)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(json!({
        "project_id": project.id,
        "status": project.status,
        "generated_at": project.generated_at,
        "artifact_path": project.artifact_path(),
    })))
}

pub async fn list_jobs(
    State(state): State<AppState>,
    Path(project_id): Path<i32>,
) -> Result<Json<Vec<generation_jobs::Model>>, StatusCode> {
    let exists = Projects::find_by_id(project_id)
        .one(&state.db)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .is_some();
    if !exists {
        return Err(StatusCode::NOT_FOUND);
    }

    let jobs = state
        .jobs
        .jobs_for_project(project_id)
        .await
        .map_err(|err| error_status(&err))?;
    Ok(Json(jobs))
}

pub async fn retry_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<(StatusCode, Json<Value>), StatusCode> {
    state
        .jobs
        .retry(&job_id)
        .await
        .map_err(|err| error_status(&err))?;

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({ "job_id": job_id, "status": "processing" })),
    ))
}
