use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "model_entities")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub project_id: i32,
    pub name: String,
    pub table_name: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::projects::Entity",
        from = "Column::ProjectId",
        to = "super::projects::Column::Id"
    )]
    Projects,
    #[sea_orm(has_many = "super::model_fields::Entity")]
    ModelFields,
}

impl Related<super::projects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Projects.def()
    }
}

impl Related<super::model_fields::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ModelFields.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Table name defaults to the entity name when not set explicitly.
    pub fn actual_table_name(&self) -> String {
        match self.table_name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => self.name.clone(),
        }
    }
}
