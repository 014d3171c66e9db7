use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::error_status;
use crate::server::app::AppState;
use crate::services::viewer::FileNode;

#[derive(Deserialize)]
pub struct ContentQuery {
    pub path: String,
}

pub async fn file_tree(
    State(state): State<AppState>,
    Path(project_id): Path<i32>,
) -> Result<Json<Vec<FileNode>>, StatusCode> {
    let tree = state
        .viewer
        .file_tree(project_id)
        .await
        .map_err(|err| error_status(&err))?;
    Ok(Json(tree))
}

pub async fn file_content(
    State(state): State<AppState>,
    Path(project_id): Path<i32>,
    Query(query): Query<ContentQuery>,
) -> Result<Json<Value>, StatusCode> {
    let content = state
        .viewer
        .file_content(project_id, &query.path)
        .await
        .map_err(|err| error_status(&err))?;
    Ok(Json(json!({ "path": query.path, "content": content })))
}
