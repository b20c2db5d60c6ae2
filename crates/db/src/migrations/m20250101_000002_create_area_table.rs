//! Create area table.

use sea_orm_migration::prelude::*;

use super::m20250101_000001_create_event_table::Event;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Area::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Area::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Area::EventId).integer().not_null())
                    .col(ColumnDef::new(Area::Code).string_len(64).not_null())
                    .col(ColumnDef::new(Area::Name).string_len(128).not_null())
                    .col(
                        ColumnDef::new(Area::MaxQuota)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_area_event")
                            .from(Area::Table, Area::EventId)
                            .to(Event::Table, Event::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_area_event_code")
                    .table(Area::Table)
                    .col(Area::EventId)
                    .col(Area::Code)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Area::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Area {
    Table,
    Id,
    EventId,
    Code,
    Name,
    MaxQuota,
}
