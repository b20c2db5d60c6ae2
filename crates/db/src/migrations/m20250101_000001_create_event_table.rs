//! Create event table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Event::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Event::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Event::Name).string_len(256).not_null())
                    .col(ColumnDef::new(Event::Description).text())
                    .col(ColumnDef::new(Event::EventDate).string_len(128))
                    .col(ColumnDef::new(Event::Venue).string_len(256))
                    .col(
                        ColumnDef::new(Event::IsActive)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Event::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Active event lookup
        manager
            .create_index(
                Index::create()
                    .name("idx_event_is_active")
                    .table(Event::Table)
                    .col(Event::IsActive)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Event::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Event {
    Table,
    Id,
    Name,
    Description,
    EventDate,
    Venue,
    IsActive,
    CreatedAt,
}
