use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use sea_orm::DatabaseConnection;
use tokio::sync::mpsc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};

use super::handlers::{events, files, generation, health, model, projects, users};
use crate::services::generation::GenerationService;
use crate::services::jobs::DurableJobService;
use crate::services::notify::BroadcastPublisher;
use crate::services::queue::{GenerationRequest, JobQueue};
use crate::services::viewer::ViewerService;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub queue: JobQueue,
    pub generation: GenerationService,
    pub jobs: DurableJobService,
    pub viewer: ViewerService,
    pub events: Arc<BroadcastPublisher>,
}

impl AppState {
    /// Wire the service graph. The returned receiver belongs to the worker
    /// loop; the caller decides where that loop runs.
    pub fn build(
        db: DatabaseConnection,
        generation_root: PathBuf,
        queue_capacity: usize,
    ) -> (Self, mpsc::Receiver<GenerationRequest>) {
        let events = Arc::new(BroadcastPublisher::new(64));
        let generation =
            GenerationService::new(db.clone(), generation_root.clone(), events.clone());
        let jobs = DurableJobService::new(db.clone(), generation.clone());
        let viewer = ViewerService::new(db.clone(), generation_root);
        let (queue, receiver) = JobQueue::new(queue_capacity);

        let state = Self {
            db,
            queue,
            generation,
            jobs,
            viewer,
            events,
        };
        (state, receiver)
    }
}

pub async fn create_app(state: AppState, cors_origin: Option<&str>) -> Result<Router> {
    let cors = match cors_origin {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin.parse::<axum::http::HeaderValue>()?)
            .allow_methods(Any)
            .allow_headers(Any),
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    };

    let app = Router::new()
        .route("/health", get(health::health_check))
        .nest("/api/v1", api_v1_routes())
        .layer(ServiceBuilder::new().layer(cors))
        .with_state(state);

    Ok(app)
}

fn api_v1_routes() -> Router<AppState> {
    Router::new()
        // User routes
        .route("/users", get(users::list_users))
        .route("/users", post(users::create_user))
        .route("/users/:id", get(users::get_user))
        // Project routes
        .route("/projects", get(projects::list_projects))
        .route("/projects", post(projects::create_project))
        .route("/projects/:id", get(projects::get_project))
        .route("/projects/:id", put(projects::update_project))
        .route("/projects/:id", delete(projects::delete_project))
        .route("/projects/:id/archive", post(projects::archive_project))
        // Schema editing routes
        .route("/projects/:id/entities", get(model::list_entities))
        .route("/projects/:id/entities", post(model::create_entity))
        .route("/projects/:id/entities/:entity_id", put(model::update_entity))
        .route("/projects/:id/entities/:entity_id", delete(model::delete_entity))
        .route("/projects/:id/entities/:entity_id/fields", post(model::create_field))
        .route("/projects/:id/fields/:field_id", put(model::update_field))
        .route("/projects/:id/fields/:field_id", delete(model::delete_field))
        .route("/projects/:id/queries", get(model::list_queries))
        .route("/projects/:id/queries", post(model::create_query))
        .route("/projects/:id/queries/:query_id", put(model::update_query))
        .route("/projects/:id/queries/:query_id", delete(model::delete_query))
        // Generation routes
        .route("/projects/:id/generate", post(generation::generate_queued))
        .route("/projects/:id/generate/durable", post(generation::generate_durable))
        .route("/projects/:id/generate/sync", post(generation::generate_sync))
        .route("/projects/:id/generation", get(generation::generation_status))
        .route("/projects/:id/jobs", get(generation::list_jobs))
        .route("/jobs/:job_id/retry", post(generation::retry_job))
        // Generated output routes
        .route("/projects/:id/files", get(files::file_tree))
        .route("/projects/:id/files/content", get(files::file_content))
        // Event stream
        .route("/events", get(events::event_stream))
}
