use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "projects")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub owner_user_id: i32,
    pub db_engine: String,
    pub status: String,
    /// Opaque generation metadata blob (JSON), e.g. the artifact location.
    pub generation_meta: Option<String>,
    pub generated_at: Option<ChronoDateTimeUtc>,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::OwnerUserId",
        to = "super::users::Column::Id"
    )]
    Users,
    #[sea_orm(has_many = "super::model_entities::Entity")]
    ModelEntities,
    #[sea_orm(has_many = "super::custom_queries::Entity")]
    CustomQueries,
    #[sea_orm(has_many = "super::generation_jobs::Entity")]
    GenerationJobs,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::model_entities::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ModelEntities.def()
    }
}

impl Related<super::custom_queries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CustomQueries.def()
    }
}

impl Related<super::generation_jobs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GenerationJobs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Project generation lifecycle.
///
/// Draft -> InProgress -> Generated -> (optionally) Deployed. Failed is
/// reachable from InProgress; Archived administratively from any non-Draft
/// state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectStatus {
    Draft,
    InProgress,
    Generated,
    Deployed,
    Failed,
    Archived,
}

impl From<ProjectStatus> for String {
    fn from(status: ProjectStatus) -> Self {
        match status {
            ProjectStatus::Draft => "draft".to_string(),
            ProjectStatus::InProgress => "in_progress".to_string(),
            ProjectStatus::Generated => "generated".to_string(),
            ProjectStatus::Deployed => "deployed".to_string(),
            ProjectStatus::Failed => "failed".to_string(),
            ProjectStatus::Archived => "archived".to_string(),
        }
    }
}

impl From<String> for ProjectStatus {
    fn from(status: String) -> Self {
        match status.as_str() {
            "draft" => ProjectStatus::Draft,
            "in_progress" => ProjectStatus::InProgress,
            "generated" => ProjectStatus::Generated,
            "deployed" => ProjectStatus::Deployed,
            "failed" => ProjectStatus::Failed,
            "archived" => ProjectStatus::Archived,
            _ => ProjectStatus::Draft,
        }
    }
}

impl Model {
    pub fn get_status(&self) -> ProjectStatus {
        ProjectStatus::from(self.status.clone())
    }

    /// Archiving is an administrative move allowed from any non-Draft state.
    pub fn can_archive(&self) -> bool {
        !matches!(self.get_status(), ProjectStatus::Draft)
    }

    /// Artifact path recorded by the last successful generation run, if any.
    pub fn artifact_path(&self) -> Option<String> {
        let meta = self.generation_meta.as_deref()?;
        let value: serde_json::Value = serde_json::from_str(meta).ok()?;
        value
            .get("artifact_zip")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            ProjectStatus::Draft,
            ProjectStatus::InProgress,
            ProjectStatus::Generated,
            ProjectStatus::Deployed,
            ProjectStatus::Failed,
            ProjectStatus::Archived,
        ] {
            let text: String = status.into();
            assert_eq!(ProjectStatus::from(text), status);
        }
    }

    #[test]
    fn unknown_status_falls_back_to_draft() {
        assert_eq!(ProjectStatus::from("bogus".to_string()), ProjectStatus::Draft);
    }
}
