//! REST API integration tests
//!
//! Exercises the administrative surface: users, projects, schema editing and
//! the validation failures each endpoint rejects.

use anyhow::Result;
use axum::http::StatusCode;
use axum_test::TestServer;
use schemaforge::database::connection::setup_database;
use schemaforge::server::app::{create_app, AppState};
use sea_orm::Database;
use serde_json::{json, Value};
use tempfile::{NamedTempFile, TempDir};

struct TestContext {
    server: TestServer,
    state: AppState,
    _shutdown: tokio::sync::watch::Sender<bool>,
    _root: TempDir,
    _db_file: NamedTempFile,
}

/// Test server over a temp sqlite file, with the worker loop running.
async fn setup_test_server() -> Result<TestContext> {
    let db_file = NamedTempFile::new()?;
    let db_url = format!("sqlite://{}?mode=rwc", db_file.path().display());
    let db = Database::connect(&db_url).await?;
    setup_database(&db).await?;

    let root = TempDir::new()?;
    let (state, receiver) = AppState::build(db, root.path().to_path_buf(), 100);

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let worker = schemaforge::services::queue::GenerationWorker::new(
        state.generation.clone(),
        receiver,
        shutdown_rx,
    );
    tokio::spawn(worker.run());

    let app = create_app(state.clone(), Some("*")).await?;
    let server = TestServer::new(app)?;

    Ok(TestContext {
        server,
        state,
        _shutdown: shutdown_tx,
        _root: root,
        _db_file: db_file,
    })
}

async fn create_user(server: &TestServer, username: &str) -> i64 {
    let response = server
        .post("/api/v1/users")
        .json(&json!({ "username": username }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let user: Value = response.json();
    user["id"].as_i64().unwrap()
}

async fn create_project(server: &TestServer, owner_id: i64, name: &str) -> i64 {
    let response = server
        .post("/api/v1/projects")
        .json(&json!({
            "name": name,
            "description": "test project",
            "owner_user_id": owner_id,
            "db_engine": "postgresql"
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let project: Value = response.json();
    project["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_health_endpoint() -> Result<()> {
    let ctx = setup_test_server().await?;

    let response = ctx.server.get("/health").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["service"], "schemaforge");
    assert_eq!(body["status"], "healthy");
    assert!(body["version"].is_string());

    Ok(())
}

#[tokio::test]
async fn test_users_api() -> Result<()> {
    let ctx = setup_test_server().await?;

    let user_id = create_user(&ctx.server, "ada").await;

    let response = ctx.server.get(&format!("/api/v1/users/{}", user_id)).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let user: Value = response.json();
    assert_eq!(user["username"], "ada");

    let response = ctx.server.get("/api/v1/users").await;
    let users: Vec<Value> = response.json();
    assert_eq!(users.len(), 1);

    // blank usernames are rejected
    let response = ctx
        .server
        .post("/api/v1/users")
        .json(&json!({ "username": "  " }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = ctx.server.get("/api/v1/users/9999").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_projects_crud_api() -> Result<()> {
    let ctx = setup_test_server().await?;
    let user_id = create_user(&ctx.server, "ada").await;

    let project_id = create_project(&ctx.server, user_id, "Blog").await;

    let response = ctx.server.get("/api/v1/projects").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let projects: Vec<Value> = response.json();
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0]["status"], "draft");

    let response = ctx
        .server
        .get(&format!("/api/v1/projects/{}", project_id))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let project: Value = response.json();
    assert_eq!(project["name"], "Blog");
    assert_eq!(project["db_engine"], "postgresql");

    let response = ctx
        .server
        .put(&format!("/api/v1/projects/{}", project_id))
        .json(&json!({
            "name": "Weblog",
            "description": "renamed",
            "db_engine": "sqlite"
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let updated: Value = response.json();
    assert_eq!(updated["name"], "Weblog");
    assert_eq!(updated["db_engine"], "sqlite");

    let response = ctx
        .server
        .delete(&format!("/api/v1/projects/{}", project_id))
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

    let response = ctx
        .server
        .get(&format!("/api/v1/projects/{}", project_id))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_project_validation() -> Result<()> {
    let ctx = setup_test_server().await?;
    let user_id = create_user(&ctx.server, "ada").await;

    // project names must be identifiers
    let response = ctx
        .server
        .post("/api/v1/projects")
        .json(&json!({
            "name": "../escape",
            "owner_user_id": user_id,
            "db_engine": "postgresql"
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

    // unknown engine tags are rejected
    let response = ctx
        .server
        .post("/api/v1/projects")
        .json(&json!({
            "name": "Blog",
            "owner_user_id": user_id,
            "db_engine": "oracle"
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

    // unknown owners are rejected
    let response = ctx
        .server
        .post("/api/v1/projects")
        .json(&json!({
            "name": "Blog",
            "owner_user_id": 9999,
            "db_engine": "postgresql"
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

    Ok(())
}

#[tokio::test]
async fn test_archive_project() -> Result<()> {
    use sea_orm::{ActiveModelTrait, Set};

    let ctx = setup_test_server().await?;
    let user_id = create_user(&ctx.server, "ada").await;
    let project_id = create_project(&ctx.server, user_id, "Blog").await;

    // draft projects cannot be archived
    let response = ctx
        .server
        .post(&format!("/api/v1/projects/{}/archive", project_id))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

    let update = schemaforge::database::entities::projects::ActiveModel {
        id: Set(project_id as i32),
        status: Set("generated".to_string()),
        ..Default::default()
    };
    update.update(&ctx.state.db).await?;

    let response = ctx
        .server
        .post(&format!("/api/v1/projects/{}/archive", project_id))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let archived: Value = response.json();
    assert_eq!(archived["status"], "archived");

    Ok(())
}

#[tokio::test]
async fn test_entities_and_fields_api() -> Result<()> {
    let ctx = setup_test_server().await?;
    let user_id = create_user(&ctx.server, "ada").await;
    let project_id = create_project(&ctx.server, user_id, "Blog").await;

    let response = ctx
        .server
        .post(&format!("/api/v1/projects/{}/entities", project_id))
        .json(&json!({ "name": "Post" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let entity: Value = response.json();
    let entity_id = entity["id"].as_i64().unwrap();

    let response = ctx
        .server
        .post(&format!(
            "/api/v1/projects/{}/entities/{}/fields",
            project_id, entity_id
        ))
        .json(&json!({ "name": "Title", "data_type": "string" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let field: Value = response.json();
    let field_id = field["id"].as_i64().unwrap();

    // unknown data types are rejected
    let response = ctx
        .server
        .post(&format!(
            "/api/v1/projects/{}/entities/{}/fields",
            project_id, entity_id
        ))
        .json(&json!({ "name": "Price", "data_type": "money" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = ctx
        .server
        .get(&format!("/api/v1/projects/{}/entities", project_id))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let entities: Vec<Value> = response.json();
    assert_eq!(entities.len(), 1);
    assert_eq!(entities[0]["name"], "Post");
    assert_eq!(entities[0]["fields"][0]["name"], "Title");

    let response = ctx
        .server
        .put(&format!(
            "/api/v1/projects/{}/fields/{}",
            project_id, field_id
        ))
        .json(&json!({ "name": "Headline", "data_type": "string", "is_nullable": true }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let updated: Value = response.json();
    assert_eq!(updated["name"], "Headline");
    assert_eq!(updated["is_nullable"], true);

    let response = ctx
        .server
        .delete(&format!(
            "/api/v1/projects/{}/entities/{}",
            project_id, entity_id
        ))
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

    let response = ctx
        .server
        .get(&format!("/api/v1/projects/{}/entities", project_id))
        .await;
    let entities: Vec<Value> = response.json();
    assert!(entities.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_custom_queries_api() -> Result<()> {
    let ctx = setup_test_server().await?;
    let user_id = create_user(&ctx.server, "ada").await;
    let project_id = create_project(&ctx.server, user_id, "Blog").await;

    let response = ctx
        .server
        .post(&format!("/api/v1/projects/{}/queries", project_id))
        .json(&json!({ "name": "TopPosts", "sql": "SELECT * FROM Post LIMIT 10" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let query: Value = response.json();
    let query_id = query["id"].as_i64().unwrap();

    // query names must be identifiers
    let response = ctx
        .server
        .post(&format!("/api/v1/projects/{}/queries", project_id))
        .json(&json!({ "name": "top posts", "sql": "SELECT 1" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = ctx
        .server
        .put(&format!(
            "/api/v1/projects/{}/queries/{}",
            project_id, query_id
        ))
        .json(&json!({ "name": "RecentPosts", "sql": "SELECT * FROM Post ORDER BY Id" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let response = ctx
        .server
        .get(&format!("/api/v1/projects/{}/queries", project_id))
        .await;
    let queries: Vec<Value> = response.json();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0]["name"], "RecentPosts");

    let response = ctx
        .server
        .delete(&format!(
            "/api/v1/projects/{}/queries/{}",
            project_id, query_id
        ))
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

    Ok(())
}
