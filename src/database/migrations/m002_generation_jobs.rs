use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(GenerationJobs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GenerationJobs::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GenerationJobs::JobId).text().not_null())
                    .col(ColumnDef::new(GenerationJobs::ProjectId).integer().not_null())
                    .col(
                        ColumnDef::new(GenerationJobs::TriggeredByUserId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GenerationJobs::Status)
                            .text()
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(GenerationJobs::Attempts)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(GenerationJobs::LastError).text())
                    .col(ColumnDef::new(GenerationJobs::StartedAt).text())
                    .col(ColumnDef::new(GenerationJobs::CompletedAt).text())
                    .col(ColumnDef::new(GenerationJobs::CreatedAt).text().not_null())
                    .col(ColumnDef::new(GenerationJobs::UpdatedAt).text().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_generation_jobs_project_id")
                            .from(GenerationJobs::Table, GenerationJobs::ProjectId)
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
                    .name("idx_generation_jobs_job_id")
                    .table(GenerationJobs::Table)
                    .col(GenerationJobs::JobId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_generation_jobs_project_id")
                    .table(GenerationJobs::Table)
                    .col(GenerationJobs::ProjectId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(GenerationJobs::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum GenerationJobs {
    Table,
    Id,
    JobId,
    ProjectId,
    TriggeredByUserId,
    Status,
    Attempts,
    LastError,
    StartedAt,
    CompletedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Projects {
    Table,
    Id,
}
