//! Create `user` table.
//!
//! One row per account; `username` is unique, `password` holds an Argon2 PHC string.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(pk_auto(User::Id))
                    .col(string_len(User::Username, 32).unique_key())
                    .col(string_len(User::Password, 255))
                    .col(string_len_null(User::Email, 255))
                    .col(string_len_null(User::Phone, 32))
                    .col(string_len_null(User::Nickname, 64))
                    .col(string_len_null(User::Avatar, 512))
                    .col(small_integer(User::Status).default(1))
                    .col(timestamp_with_time_zone(User::CreateTime))
                    .col(timestamp_with_time_zone(User::UpdateTime))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(User::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum User { Table, Id, Username, Password, Email, Phone, Nickname, Avatar, Status, CreateTime, UpdateTime }
