use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::database::entities::{users, users::Entity as Users};
use crate::server::app::AppState;

#[derive(Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub display_name: Option<String>,
}

pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<Vec<users::Model>>, StatusCode> {
    let users = Users::find()
        .all(&state.db)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(users))
}

pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<Json<users::Model>, StatusCode> {
    if payload.username.trim().is_empty() {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }

    let user = users::ActiveModel {
        username: Set(payload.username),
        display_name: Set(payload.display_name),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    let user = user.insert(&state.db).await.map_err(|err| {
        error!(error = %err, "failed to create user");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(user))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<users::Model>, StatusCode> {
    let user = Users::find_by_id(id)
        .one(&state.db)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(user))
}
