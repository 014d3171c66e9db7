use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "model_relations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub project_id: i32,
    pub source_entity_id: i32,
    pub target_entity_id: i32,
    /// one_to_one, one_to_many or many_to_many
    pub kind: String,
    pub foreign_key: String,
    pub navigation: String,
    /// Join table name, many-to-many only
    pub join_table: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::projects::Entity",
        from = "Column::ProjectId",
        to = "super::projects::Column::Id"
    )]
    Projects,
    #[sea_orm(
        belongs_to = "super::model_entities::Entity",
        from = "Column::SourceEntityId",
        to = "super::model_entities::Column::Id"
    )]
    SourceEntity,
    #[sea_orm(
        belongs_to = "super::model_entities::Entity",
        from = "Column::TargetEntityId",
        to = "super::model_entities::Column::Id"
    )]
    TargetEntity,
}

impl Related<super::projects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Projects.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
