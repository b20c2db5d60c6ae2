//! Create zone table.

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
                    .table(Zone::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Zone::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Zone::EventId).integer().not_null())
                    .col(ColumnDef::new(Zone::Name).string_len(128).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_zone_event")
                            .from(Zone::Table, Zone::EventId)
                            .to(Event::Table, Event::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_zone_event_id")
                    .table(Zone::Table)
                    .col(Zone::EventId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Zone::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Zone {
    Table,
    Id,
    EventId,
    Name,
}
