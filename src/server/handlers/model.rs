//! Schema-editing surface: entities, fields and custom queries for a project.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};

use crate::database::entities::{custom_queries, model_entities, model_fields};
use crate::schema::{is_identifier, FieldType};
use crate::server::app::AppState;

#[derive(Serialize, Deserialize)]
pub struct EntityRequest {
    pub name: String,
    pub table_name: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct FieldRequest {
    pub name: String,
    pub data_type: String,
    #[serde(default)]
    pub is_nullable: bool,
    #[serde(default)]
    pub is_primary_key: bool,
    pub max_length: Option<i32>,
}

#[derive(Serialize, Deserialize)]
pub struct QueryRequest {
    pub name: String,
    pub sql: String,
    pub user_id: Option<i32>,
    pub result_schema: Option<String>,
}

/// Entity with its fields, the shape the listing endpoint returns.
#[derive(Serialize)]
pub struct EntityWithFields {
    #[serde(flatten)]
    pub entity: model_entities::Model,
    pub fields: Vec<model_fields::Model>,
}

async fn project_exists(state: &AppState, project_id: i32) -> Result<(), StatusCode> {
    use crate::database::entities::projects::Entity as Projects;
    let found = Projects::find_by_id(project_id)
        .one(&state.db)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    if found.is_none() {
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(())
}

pub async fn list_entities(
    State(state): State<AppState>,
    Path(project_id): Path<i32>,
) -> Result<Json<Vec<EntityWithFields>>, StatusCode> {
    project_exists(&state, project_id).await?;

    let rows = model_entities::Entity::find()
        .filter(model_entities::Column::ProjectId.eq(project_id))
        .order_by_asc(model_entities::Column::Name)
        .find_with_related(model_fields::Entity)
        .all(&state.db)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(
        rows.into_iter()
            .map(|(entity, fields)| EntityWithFields { entity, fields })
            .collect(),
    ))
}

pub async fn create_entity(
    State(state): State<AppState>,
    Path(project_id): Path<i32>,
    Json(payload): Json<EntityRequest>,
) -> Result<Json<model_entities::Model>, StatusCode> {
    project_exists(&state, project_id).await?;
    if !is_identifier(&payload.name) {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }

    let entity = model_entities::ActiveModel {
        project_id: Set(project_id),
        name: Set(payload.name),
        table_name: Set(payload.table_name),
        ..Default::default()
    };

    let entity = entity
        .insert(&state.db)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(entity))
}

pub async fn update_entity(
    State(state): State<AppState>,
    Path((project_id, entity_id)): Path<(i32, i32)>,
    Json(payload): Json<EntityRequest>,
) -> Result<Json<model_entities::Model>, StatusCode> {
    if !is_identifier(&payload.name) {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }
    let entity = find_project_entity(&state, project_id, entity_id).await?;

    let mut entity: model_entities::ActiveModel = entity.into();
    entity.name = Set(payload.name);
    entity.table_name = Set(payload.table_name);

    let entity = entity
        .update(&state.db)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(entity))
}

pub async fn delete_entity(
    State(state): State<AppState>,
    Path((project_id, entity_id)): Path<(i32, i32)>,
) -> Result<StatusCode, StatusCode> {
    let entity = find_project_entity(&state, project_id, entity_id).await?;
    let entity: model_entities::ActiveModel = entity.into();
    entity
        .delete(&state.db)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_field(
    State(state): State<AppState>,
    Path((project_id, entity_id)): Path<(i32, i32)>,
    Json(payload): Json<FieldRequest>,
) -> Result<Json<model_fields::Model>, StatusCode> {
    find_project_entity(&state, project_id, entity_id).await?;
    if !is_identifier(&payload.name) || FieldType::parse(&payload.data_type).is_err() {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }

    let field = model_fields::ActiveModel {
        entity_id: Set(entity_id),
        name: Set(payload.name),
        data_type: Set(payload.data_type),
        is_nullable: Set(payload.is_nullable),
        is_primary_key: Set(payload.is_primary_key),
        max_length: Set(payload.max_length),
        ..Default::default()
    };

    let field = field
        .insert(&state.db)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(field))
}

pub async fn update_field(
    State(state): State<AppState>,
    Path((_project_id, field_id)): Path<(i32, i32)>,
    Json(payload): Json<FieldRequest>,
) -> Result<Json<model_fields::Model>, StatusCode> {
    if !is_identifier(&payload.name) || FieldType::parse(&payload.data_type).is_err() {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }
    let field = model_fields::Entity::find_by_id(field_id)
        .one(&state.db)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;

    let mut field: model_fields::ActiveModel = field.into();
    field.name = Set(payload.name);
    field.data_type = Set(payload.data_type);
    field.is_nullable = Set(payload.is_nullable);
    field.is_primary_key = Set(payload.is_primary_key);
    field.max_length = Set(payload.max_length);

    let field = field
        .update(&state.db)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(field))
}

pub async fn delete_field(
    State(state): State<AppState>,
    Path((_project_id, field_id)): Path<(i32, i32)>,
) -> Result<StatusCode, StatusCode> {
    let result = model_fields::Entity::delete_by_id(field_id)
        .exec(&state.db)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    if result.rows_affected == 0 {
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_queries(
    State(state): State<AppState>,
    Path(project_id): Path<i32>,
) -> Result<Json<Vec<custom_queries::Model>>, StatusCode> {
    project_exists(&state, project_id).await?;

    let queries = custom_queries::Entity::find()
        .filter(custom_queries::Column::ProjectId.eq(project_id))
        .order_by_asc(custom_queries::Column::Name)
        .all(&state.db)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(queries))
}

pub async fn create_query(
    State(state): State<AppState>,
    Path(project_id): Path<i32>,
    Json(payload): Json<QueryRequest>,
) -> Result<Json<custom_queries::Model>, StatusCode> {
    project_exists(&state, project_id).await?;
    if !is_identifier(&payload.name) || payload.sql.trim().is_empty() {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }

    let query = custom_queries::ActiveModel {
        project_id: Set(project_id),
        user_id: Set(payload.user_id),
        name: Set(payload.name),
        sql: Set(payload.sql),
        result_schema: Set(payload.result_schema),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    let query = query
        .insert(&state.db)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(query))
}

pub async fn update_query(
    State(state): State<AppState>,
    Path((project_id, query_id)): Path<(i32, i32)>,
    Json(payload): Json<QueryRequest>,
) -> Result<Json<custom_queries::Model>, StatusCode> {
    if !is_identifier(&payload.name) || payload.sql.trim().is_empty() {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }
    let query = custom_queries::Entity::find_by_id(query_id)
        .filter(custom_queries::Column::ProjectId.eq(project_id))
        .one(&state.db)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;

    let mut query: custom_queries::ActiveModel = query.into();
    query.name = Set(payload.name);
    query.sql = Set(payload.sql);
    query.user_id = Set(payload.user_id);
    query.result_schema = Set(payload.result_schema);

    let query = query
        .update(&state.db)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(query))
}

pub async fn delete_query(
    State(state): State<AppState>,
    Path((project_id, query_id)): Path<(i32, i32)>,
) -> Result<StatusCode, StatusCode> {
    let result = custom_queries::Entity::delete_many()
        .filter(custom_queries::Column::Id.eq(query_id))
        .filter(custom_queries::Column::ProjectId.eq(project_id))
        .exec(&state.db)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    if result.rows_affected == 0 {
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn find_project_entity(
    state: &AppState,
    project_id: i32,
    entity_id: i32,
) -> Result<model_entities::Model, StatusCode> {
    model_entities::Entity::find_by_id(entity_id)
        .filter(model_entities::Column::ProjectId.eq(project_id))
        .one(&state.db)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)
}
