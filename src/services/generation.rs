//! Generation orchestrator.
//!
//! One entry point drives the whole lifecycle regardless of how the run was
//! triggered: resolve the project, flip it to InProgress, load and validate the
//! schema, synthesize the tree, then write + pack + persist under a per-project
//! lock so two concurrent runs for the same project cannot interleave their
//! filesystem output. Any failure after the InProgress flip lands the project
//! in Failed, on the queued path just as on the synchronous one.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::artifact::{self, ProjectPaths};
use crate::database::entities::projects::{self, ProjectStatus};
use crate::database::entities::users;
use crate::errors::{GenerationError, GenerationResult};
use crate::schema::{DbEngine, SchemaStore};
use crate::services::notify::NotificationPublisher;
use crate::synth;

/// What a successful run produced.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationOutcome {
    pub project_id: i32,
    pub artifact_path: String,
    pub file_count: usize,
}

type LockMap = HashMap<i32, Arc<tokio::sync::Mutex<()>>>;

#[derive(Clone)]
pub struct GenerationService {
    db: DatabaseConnection,
    root: PathBuf,
    publisher: Arc<dyn NotificationPublisher>,
    locks: Arc<tokio::sync::Mutex<LockMap>>,
}

impl GenerationService {
    pub fn new(
        db: DatabaseConnection,
        root: PathBuf,
        publisher: Arc<dyn NotificationPublisher>,
    ) -> Self {
        Self {
            db,
            root,
            publisher,
            locks: Arc::new(tokio::sync::Mutex::new(HashMap::new())),
        }
    }

    pub async fn generate(
        &self,
        project_id: i32,
        user_id: i32,
    ) -> GenerationResult<GenerationOutcome> {
        let project = projects::Entity::find_by_id(project_id)
            .one(&self.db)
            .await?
            .ok_or(GenerationError::ProjectNotFound(project_id))?;
        let owner = users::Entity::find_by_id(project.owner_user_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| {
                GenerationError::NotFound(format!("user {}", project.owner_user_id))
            })?;

        info!(project_id, user_id, project = %project.name, "generation started");
        self.set_status(project_id, ProjectStatus::InProgress).await?;

        match self.run(&project, &owner).await {
            Ok(outcome) => {
                info!(
                    project_id,
                    files = outcome.file_count,
                    artifact = %outcome.artifact_path,
                    "generation finished"
                );
                self.publisher.project_updated(project_id).await;
                Ok(outcome)
            }
            Err(err) => {
                warn!(
                    project_id,
                    pre_write = err.is_pre_write(),
                    error = %err,
                    "generation failed"
                );
                if let Err(status_err) = self.set_status(project_id, ProjectStatus::Failed).await {
                    error!(project_id, error = %status_err, "failed to record failure status");
                }
                self.publisher.project_updated(project_id).await;
                Err(err)
            }
        }
    }

    async fn run(
        &self,
        project: &projects::Model,
        owner: &users::Model,
    ) -> GenerationResult<GenerationOutcome> {
        let engine = DbEngine::parse(&project.db_engine)?;
        let schema = SchemaStore::new(self.db.clone()).load(project.id).await?;
        let tree = synth::synthesize(&project.name, &schema.entities, &schema.queries, engine)?;

        let paths = ProjectPaths::new(&self.root, owner.id, &owner.folder_name(), &project.name);
        let _guard = self.project_lock(project.id).await;

        artifact::write_tree(&paths.backend_dir, &tree)?;
        artifact::pack(&paths.backend_dir, &paths.archive_path)?;

        let artifact_path = paths.archive_path.to_string_lossy().to_string();
        let meta = serde_json::json!({ "artifact_zip": artifact_path }).to_string();
        let now = Utc::now();
        let update = projects::ActiveModel {
            id: Set(project.id),
            status: Set(ProjectStatus::Generated.into()),
            generation_meta: Set(Some(meta)),
            generated_at: Set(Some(now)),
            updated_at: Set(now),
            ..Default::default()
        };
        update.update(&self.db).await?;

        Ok(GenerationOutcome {
            project_id: project.id,
            artifact_path,
            file_count: tree.len(),
        })
    }

    async fn set_status(&self, project_id: i32, status: ProjectStatus) -> GenerationResult<()> {
        let update = projects::ActiveModel {
            id: Set(project_id),
            status: Set(status.into()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };
        update.update(&self.db).await?;
        Ok(())
    }

    /// Serializes write/pack/persist per project. The map only ever grows by
    /// one entry per project id, which is bounded by the projects table.
    async fn project_lock(&self, project_id: i32) -> tokio::sync::OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.locks.lock().await;
            map.entry(project_id)
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}
