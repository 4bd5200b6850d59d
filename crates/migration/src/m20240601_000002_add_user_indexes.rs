use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Default listing order is create_time desc
        manager
            .create_index(
                Index::create()
                    .name("idx_user_create_time")
                    .table(User::Table)
                    .col(User::CreateTime)
                    .to_owned(),
            )
            .await?;

        // Keyword search probes email and phone next to username
        manager
            .create_index(
                Index::create()
                    .name("idx_user_email")
                    .table(User::Table)
                    .col(User::Email)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_user_phone")
                    .table(User::Table)
                    .col(User::Phone)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_user_create_time").table(User::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_user_email").table(User::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_user_phone").table(User::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum User { Table, Email, Phone, CreateTime }
