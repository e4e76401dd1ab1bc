use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum PeriodSummaries {
    Table,
    Id,
    LineId,
    SummaryDate,
    TotalIncomeMinor,
    TotalExpenseMinor,
    TotalBalanceMinor,
    CreatedAt,
    UpdatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PeriodSummaries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PeriodSummaries::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PeriodSummaries::LineId).string().not_null())
                    .col(
                        ColumnDef::new(PeriodSummaries::SummaryDate)
                            .date()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PeriodSummaries::TotalIncomeMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PeriodSummaries::TotalExpenseMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PeriodSummaries::TotalBalanceMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PeriodSummaries::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PeriodSummaries::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq-period_summaries-line_id-summary_date")
                    .table(PeriodSummaries::Table)
                    .col(PeriodSummaries::LineId)
                    .col(PeriodSummaries::SummaryDate)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PeriodSummaries::Table).to_owned())
            .await
    }
}
