use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Username).text().not_null())
                    .col(ColumnDef::new(Users::DisplayName).text())
                    .col(ColumnDef::new(Users::CreatedAt).text().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Projects::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Projects::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Projects::Name).text().not_null())
                    .col(ColumnDef::new(Projects::Description).text())
                    .col(ColumnDef::new(Projects::OwnerUserId).integer().not_null())
                    .col(
                        ColumnDef::new(Projects::DbEngine)
                            .text()
                            .not_null()
                            .default("sqlserver"),
                    )
                    .col(
                        ColumnDef::new(Projects::Status)
                            .text()
                            .not_null()
                            .default("draft"),
                    )
                    .col(ColumnDef::new(Projects::GenerationMeta).text())
                    .col(ColumnDef::new(Projects::GeneratedAt).text())
                    .col(ColumnDef::new(Projects::CreatedAt).text().not_null())
                    .col(ColumnDef::new(Projects::UpdatedAt).text().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_projects_owner_user_id")
                            .from(Projects::Table, Projects::OwnerUserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ModelEntities::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ModelEntities::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ModelEntities::ProjectId).integer().not_null())
                    .col(ColumnDef::new(ModelEntities::Name).text().not_null())
                    .col(ColumnDef::new(ModelEntities::TableName).text())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_model_entities_project_id")
                            .from(ModelEntities::Table, ModelEntities::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ModelFields::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ModelFields::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ModelFields::EntityId).integer().not_null())
                    .col(ColumnDef::new(ModelFields::Name).text().not_null())
                    .col(
                        ColumnDef::new(ModelFields::DataType)
                            .text()
                            .not_null()
                            .default("string"),
                    )
                    .col(
                        ColumnDef::new(ModelFields::IsNullable)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(ModelFields::IsPrimaryKey)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(ModelFields::MaxLength).integer())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_model_fields_entity_id")
                            .from(ModelFields::Table, ModelFields::EntityId)
                            .to(ModelEntities::Table, ModelEntities::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ModelRelations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ModelRelations::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ModelRelations::ProjectId).integer().not_null())
                    .col(
                        ColumnDef::new(ModelRelations::SourceEntityId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ModelRelations::TargetEntityId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ModelRelations::Kind)
                            .text()
                            .not_null()
                            .default("one_to_many"),
                    )
                    .col(ColumnDef::new(ModelRelations::ForeignKey).text().not_null())
                    .col(ColumnDef::new(ModelRelations::Navigation).text().not_null())
                    .col(ColumnDef::new(ModelRelations::JoinTable).text())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_model_relations_project_id")
                            .from(ModelRelations::Table, ModelRelations::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CustomQueries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CustomQueries::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CustomQueries::ProjectId).integer().not_null())
                    .col(ColumnDef::new(CustomQueries::UserId).integer())
                    .col(ColumnDef::new(CustomQueries::Name).text().not_null())
                    .col(ColumnDef::new(CustomQueries::Sql).text().not_null())
                    .col(ColumnDef::new(CustomQueries::ResultSchema).text())
                    .col(ColumnDef::new(CustomQueries::CreatedAt).text().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_custom_queries_project_id")
                            .from(CustomQueries::Table, CustomQueries::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_model_entities_project_id")
                    .table(ModelEntities::Table)
                    .col(ModelEntities::ProjectId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_model_fields_entity_id")
                    .table(ModelFields::Table)
                    .col(ModelFields::EntityId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_custom_queries_project_id")
                    .table(CustomQueries::Table)
                    .col(CustomQueries::ProjectId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CustomQueries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ModelRelations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ModelFields::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ModelEntities::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Projects::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    DisplayName,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Projects {
    Table,
    Id,
    Name,
    Description,
    OwnerUserId,
    DbEngine,
    Status,
    GenerationMeta,
    GeneratedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ModelEntities {
    Table,
    Id,
    ProjectId,
    Name,
    TableName,
}

#[derive(DeriveIden)]
enum ModelFields {
    Table,
    Id,
    EntityId,
    Name,
    DataType,
    IsNullable,
    IsPrimaryKey,
    MaxLength,
}

#[derive(DeriveIden)]
enum ModelRelations {
    Table,
    Id,
    ProjectId,
    SourceEntityId,
    TargetEntityId,
    Kind,
    ForeignKey,
    Navigation,
    JoinTable,
}

#[derive(DeriveIden)]
enum CustomQueries {
    Table,
    Id,
    ProjectId,
    UserId,
    Name,
    Sql,
    ResultSchema,
    CreatedAt,
}
