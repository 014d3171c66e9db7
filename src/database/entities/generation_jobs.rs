use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Durable audit record for one background generation run.
///
/// Unlike the in-process queue, these rows survive restarts and back the
/// external retry surface.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "generation_jobs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Externally visible identifier
    pub job_id: String,
    pub project_id: i32,
    pub triggered_by_user_id: i32,
    pub status: String,
    pub attempts: i32,
    pub last_error: Option<String>,
    pub started_at: Option<ChronoDateTimeUtc>,
    pub completed_at: Option<ChronoDateTimeUtc>,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::projects::Entity",
        from = "Column::ProjectId",
        to = "super::projects::Column::Id"
    )]
    Projects,
}

impl Related<super::projects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Projects.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl From<JobStatus> for String {
    fn from(status: JobStatus) -> Self {
        match status {
            JobStatus::Pending => "pending".to_string(),
            JobStatus::Processing => "processing".to_string(),
            JobStatus::Completed => "completed".to_string(),
            JobStatus::Failed => "failed".to_string(),
        }
    }
}

impl From<String> for JobStatus {
    fn from(status: String) -> Self {
        match status.as_str() {
            "pending" => JobStatus::Pending,
            "processing" => JobStatus::Processing,
            "completed" => JobStatus::Completed,
            "failed" => JobStatus::Failed,
            _ => JobStatus::Pending,
        }
    }
}

impl Model {
    pub fn get_status(&self) -> JobStatus {
        JobStatus::from(self.status.clone())
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.get_status(), JobStatus::Completed | JobStatus::Failed)
    }

    pub fn duration_seconds(&self) -> Option<i64> {
        if let (Some(started), Some(completed)) = (&self.started_at, &self.completed_at) {
            Some((completed.timestamp() - started.timestamp()).abs())
        } else {
            None
        }
    }
}
