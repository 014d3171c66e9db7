use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::database::entities::projects::{self, Entity as Projects, ProjectStatus};
use crate::database::entities::users::Entity as Users;
use crate::schema::{is_identifier, DbEngine};
use crate::server::app::AppState;

#[derive(Serialize, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    pub description: Option<String>,
    pub owner_user_id: i32,
    pub db_engine: String,
}

#[derive(Serialize, Deserialize)]
pub struct UpdateProjectRequest {
    pub name: String,
    pub description: Option<String>,
    pub db_engine: String,
}

pub async fn list_projects(
    State(state): State<AppState>,
) -> Result<Json<Vec<projects::Model>>, StatusCode> {
    let projects = Projects::find()
        .all(&state.db)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(projects))
}

pub async fn create_project(
    State(state): State<AppState>,
    Json(payload): Json<CreateProjectRequest>,
) -> Result<Json<projects::Model>, StatusCode> {
    if !is_identifier(&payload.name) || DbEngine::parse(&payload.db_engine).is_err() {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }
    let owner = Users::find_by_id(payload.owner_user_id)
        .one(&state.db)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    if owner.is_none() {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }

    let now = Utc::now();
    let project = projects::ActiveModel {
        name: Set(payload.name),
        description: Set(payload.description),
        owner_user_id: Set(payload.owner_user_id),
        db_engine: Set(payload.db_engine),
        status: Set(ProjectStatus::Draft.into()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let project = project.insert(&state.db).await.map_err(|err| {
        error!(error = %err, "failed to create project");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(project))
}

pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<projects::Model>, StatusCode> {
    let project = Projects::find_by_id(id)
        .one(&state.db)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(project))
}

pub async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateProjectRequest>,
) -> Result<Json<projects::Model>, StatusCode> {
    if !is_identifier(&payload.name) || DbEngine::parse(&payload.db_engine).is_err() {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }
    let project = Projects::find_by_id(id)
        .one(&state.db)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;

    let mut project: projects::ActiveModel = project.into();
    project.name = Set(payload.name);
    project.description = Set(payload.description);
    project.db_engine = Set(payload.db_engine);
    project.updated_at = Set(Utc::now());

    let project = project
        .update(&state.db)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(project))
}

pub async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, StatusCode> {
    let result = Projects::delete_by_id(id)
        .exec(&state.db)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    if result.rows_affected == 0 {
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Administrative move, allowed from any non-Draft state.
pub async fn archive_project(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<projects::Model>, StatusCode> {
    let project = Projects::find_by_id(id)
        .one(&state.db)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;

    if !project.can_archive() {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }

    let mut project: projects::ActiveModel = project.into();
    project.status = Set(ProjectStatus::Archived.into());
    project.updated_at = Set(Utc::now());

    let project = project
        .update(&state.db)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(project))
}
