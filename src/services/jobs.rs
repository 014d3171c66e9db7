//! Durable generation jobs.
//!
//! Every run on this path leaves a `generation_jobs` row behind: callers get a
//! job id back immediately and poll the row for the outcome. Rows survive a
//! restart, back the external retry surface, and are reaped by a periodic
//! retention sweep once finished.

use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::database::entities::generation_jobs::{self, JobStatus};
use crate::database::entities::projects;
use crate::errors::{GenerationError, GenerationResult};
use crate::services::generation::GenerationService;

#[derive(Clone)]
pub struct DurableJobService {
    db: DatabaseConnection,
    generation: GenerationService,
}

impl DurableJobService {
    pub fn new(db: DatabaseConnection, generation: GenerationService) -> Self {
        Self { db, generation }
    }

    /// Record a job row and run generation in the background. Returns the
    /// externally visible job id as soon as the row exists.
    pub async fn run_generation(&self, project_id: i32, user_id: i32) -> GenerationResult<String> {
        let exists = projects::Entity::find_by_id(project_id)
            .one(&self.db)
            .await?
            .is_some();
        if !exists {
            return Err(GenerationError::ProjectNotFound(project_id));
        }

        let job_id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let row = generation_jobs::ActiveModel {
            job_id: Set(job_id.clone()),
            project_id: Set(project_id),
            triggered_by_user_id: Set(user_id),
            status: Set(JobStatus::Processing.into()),
            attempts: Set(1),
            started_at: Set(Some(now)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let inserted = row.insert(&self.db).await?;

        info!(project_id, job_id = %job_id, "durable generation job scheduled");
        self.spawn_run(inserted.id, project_id, user_id);
        Ok(job_id)
    }

    /// Re-run a failed job under the same job id.
    pub async fn retry(&self, job_id: &str) -> GenerationResult<()> {
        let job = generation_jobs::Entity::find()
            .filter(generation_jobs::Column::JobId.eq(job_id))
            .one(&self.db)
            .await?
            .ok_or_else(|| GenerationError::NotFound(format!("job {}", job_id)))?;

        if job.get_status() != JobStatus::Failed {
            return Err(GenerationError::Validation(format!(
                "job {} is {} and cannot be retried",
                job_id, job.status
            )));
        }

        let now = Utc::now();
        let update = generation_jobs::ActiveModel {
            id: Set(job.id),
            status: Set(JobStatus::Processing.into()),
            attempts: Set(job.attempts + 1),
            last_error: Set(None),
            started_at: Set(Some(now)),
            completed_at: Set(None),
            updated_at: Set(now),
            ..Default::default()
        };
        update.update(&self.db).await?;

        info!(job_id = %job_id, attempt = job.attempts + 1, "durable job retry scheduled");
        self.spawn_run(job.id, job.project_id, job.triggered_by_user_id);
        Ok(())
    }

    pub async fn jobs_for_project(
        &self,
        project_id: i32,
    ) -> GenerationResult<Vec<generation_jobs::Model>> {
        Ok(generation_jobs::Entity::find()
            .filter(generation_jobs::Column::ProjectId.eq(project_id))
            .order_by_desc(generation_jobs::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    fn spawn_run(&self, row_id: i32, project_id: i32, user_id: i32) {
        let db = self.db.clone();
        let generation = self.generation.clone();
        tokio::spawn(async move {
            let result = generation.generate(project_id, user_id).await;
            let now = Utc::now();
            let update = match &result {
                Ok(_) => generation_jobs::ActiveModel {
                    id: Set(row_id),
                    status: Set(JobStatus::Completed.into()),
                    completed_at: Set(Some(now)),
                    updated_at: Set(now),
                    ..Default::default()
                },
                Err(err) => {
                    warn!(project_id, error = %err, "durable generation job failed");
                    generation_jobs::ActiveModel {
                        id: Set(row_id),
                        status: Set(JobStatus::Failed.into()),
                        last_error: Set(Some(err.to_string())),
                        completed_at: Set(Some(now)),
                        updated_at: Set(now),
                        ..Default::default()
                    }
                }
            };
            if let Err(db_err) = update.update(&db).await {
                error!(project_id, error = %db_err, "failed to record job outcome");
            }
        });
    }

    /// Periodically delete finished job rows older than the retention window.
    pub fn spawn_retention_sweep(
        &self,
        every: std::time::Duration,
        retention: Duration,
    ) -> tokio::task::JoinHandle<()> {
        let db = self.db.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let cutoff = Utc::now() - retention;
                let finished: Vec<String> =
                    vec![JobStatus::Completed.into(), JobStatus::Failed.into()];
                match generation_jobs::Entity::delete_many()
                    .filter(generation_jobs::Column::Status.is_in(finished))
                    .filter(generation_jobs::Column::UpdatedAt.lt(cutoff))
                    .exec(&db)
                    .await
                {
                    Ok(res) if res.rows_affected > 0 => {
                        info!(deleted = res.rows_affected, "swept finished generation jobs");
                    }
                    Ok(_) => {}
                    Err(err) => warn!(error = %err, "job retention sweep failed"),
                }
            }
        })
    }
}
