use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "model_fields")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub entity_id: i32,
    pub name: String,
    pub data_type: String,
    pub is_nullable: bool,
    pub is_primary_key: bool,
    pub max_length: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::model_entities::Entity",
        from = "Column::EntityId",
        to = "super::model_entities::Column::Id"
    )]
    ModelEntities,
}

impl Related<super::model_entities::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ModelEntities.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
