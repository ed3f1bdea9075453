use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create companies table
        manager
            .create_table(
                Table::create()
                    .table(Companies::Table)
                    .if_not_exists()
                    .col(pk_auto(Companies::Id))
                    .col(string(Companies::Name).unique_key())
                    .to_owned(),
            )
            .await?;

        // Create financial_accounts table
        manager
            .create_table(
                Table::create()
                    .table(FinancialAccounts::Table)
                    .if_not_exists()
                    .col(pk_auto(FinancialAccounts::Id))
                    .col(integer(FinancialAccounts::CompanyId))
                    .col(string(FinancialAccounts::Name))
                    .col(string_null(FinancialAccounts::AccountType))
                    .col(timestamp(FinancialAccounts::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_financial_account_company")
                            .from(FinancialAccounts::Table, FinancialAccounts::CompanyId)
                            .to(Companies::Table, Companies::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create counterparties table
        manager
            .create_table(
                Table::create()
                    .table(Counterparties::Table)
                    .if_not_exists()
                    .col(pk_auto(Counterparties::Id))
                    .col(integer(Counterparties::CompanyId))
                    .col(string(Counterparties::Name))
                    .col(string(Counterparties::Kind))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_counterparty_company")
                            .from(Counterparties::Table, Counterparties::CompanyId)
                            .to(Companies::Table, Companies::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create categories table
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(pk_auto(Categories::Id))
                    .col(integer(Categories::CompanyId))
                    .col(string(Categories::Name))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_category_company")
                            .from(Categories::Table, Categories::CompanyId)
                            .to(Companies::Table, Companies::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create financial_transactions table
        manager
            .create_table(
                Table::create()
                    .table(FinancialTransactions::Table)
                    .if_not_exists()
                    .col(pk_auto(FinancialTransactions::Id))
                    .col(integer(FinancialTransactions::CompanyId))
                    .col(string(FinancialTransactions::TransactionType))
                    .col(string(FinancialTransactions::Description))
                    .col(decimal(FinancialTransactions::Value).decimal_len(16, 4))
                    .col(decimal_null(FinancialTransactions::PaidAmount).decimal_len(16, 4))
                    .col(string_null(FinancialTransactions::PaymentMethod))
                    .col(date(FinancialTransactions::DueDate))
                    .col(date_null(FinancialTransactions::DateOfIssue))
                    .col(string(FinancialTransactions::Occurrence))
                    .col(small_integer_null(FinancialTransactions::DayOfWeek))
                    .col(small_integer_null(FinancialTransactions::DayOfMonth))
                    .col(integer_null(FinancialTransactions::InstallmentCount))
                    .col(small_integer_null(FinancialTransactions::InstallmentDay))
                    .col(integer_null(FinancialTransactions::SeriesId))
                    .col(string(FinancialTransactions::Status))
                    .col(date_null(FinancialTransactions::PaymentDate))
                    .col(integer_null(FinancialTransactions::FinancialAccountId))
                    .col(string(FinancialTransactions::CreatedBySide))
                    .col(boolean(FinancialTransactions::Validated).default(false))
                    .col(timestamp_null(FinancialTransactions::ValidatedAt))
                    .col(string_null(FinancialTransactions::ValidatedBy))
                    .col(boolean(FinancialTransactions::Rejected).default(false))
                    .col(timestamp_null(FinancialTransactions::RejectedAt))
                    .col(string_null(FinancialTransactions::RejectedBy))
                    .col(string_null(FinancialTransactions::RejectionReason))
                    .col(integer_null(FinancialTransactions::CounterpartyId))
                    .col(integer_null(FinancialTransactions::CategoryId))
                    .col(string_null(FinancialTransactions::DocumentNumber))
                    .col(string_null(FinancialTransactions::Notes))
                    .col(timestamp(FinancialTransactions::CreatedAt))
                    .col(timestamp(FinancialTransactions::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_financial_transaction_company")
                            .from(
                                FinancialTransactions::Table,
                                FinancialTransactions::CompanyId,
                            )
                            .to(Companies::Table, Companies::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_financial_transaction_account")
                            .from(
                                FinancialTransactions::Table,
                                FinancialTransactions::FinancialAccountId,
                            )
                            .to(FinancialAccounts::Table, FinancialAccounts::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_financial_transaction_counterparty")
                            .from(
                                FinancialTransactions::Table,
                                FinancialTransactions::CounterpartyId,
                            )
                            .to(Counterparties::Table, Counterparties::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_financial_transaction_category")
                            .from(
                                FinancialTransactions::Table,
                                FinancialTransactions::CategoryId,
                            )
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Series siblings and tenant-scoped listings are the hot queries.
        manager
            .create_index(
                Index::create()
                    .name("idx_financial_transactions_series")
                    .table(FinancialTransactions::Table)
                    .col(FinancialTransactions::SeriesId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_financial_transactions_company_type_due")
                    .table(FinancialTransactions::Table)
                    .col(FinancialTransactions::CompanyId)
                    .col(FinancialTransactions::TransactionType)
                    .col(FinancialTransactions::DueDate)
                    .to_owned(),
            )
            .await?;

        // Create cash_movements table
        manager
            .create_table(
                Table::create()
                    .table(CashMovements::Table)
                    .if_not_exists()
                    .col(pk_auto(CashMovements::Id))
                    .col(integer(CashMovements::CompanyId))
                    .col(integer(CashMovements::FinancialAccountId))
                    .col(decimal(CashMovements::Amount).decimal_len(16, 4))
                    .col(string(CashMovements::MovementType))
                    .col(string(CashMovements::Description))
                    .col(string(CashMovements::ReferenceType))
                    .col(integer_null(CashMovements::ReferenceId))
                    .col(date(CashMovements::Date))
                    .col(timestamp(CashMovements::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cash_movement_company")
                            .from(CashMovements::Table, CashMovements::CompanyId)
                            .to(Companies::Table, Companies::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cash_movement_account")
                            .from(CashMovements::Table, CashMovements::FinancialAccountId)
                            .to(FinancialAccounts::Table, FinancialAccounts::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Reversal deletes by (reference_type, reference_id).
        manager
            .create_index(
                Index::create()
                    .name("idx_cash_movements_reference")
                    .table(CashMovements::Table)
                    .col(CashMovements::ReferenceType)
                    .col(CashMovements::ReferenceId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CashMovements::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FinancialTransactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Counterparties::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FinancialAccounts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Companies::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Companies {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
enum FinancialAccounts {
    Table,
    Id,
    CompanyId,
    Name,
    AccountType,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Counterparties {
    Table,
    Id,
    CompanyId,
    Name,
    Kind,
}

#[derive(DeriveIden)]
enum Categories {
    Table,
    Id,
    CompanyId,
    Name,
}

#[derive(DeriveIden)]
enum FinancialTransactions {
    Table,
    Id,
    CompanyId,
    TransactionType,
    Description,
    Value,
    PaidAmount,
    PaymentMethod,
    DueDate,
    DateOfIssue,
    Occurrence,
    DayOfWeek,
    DayOfMonth,
    InstallmentCount,
    InstallmentDay,
    SeriesId,
    Status,
    PaymentDate,
    FinancialAccountId,
    CreatedBySide,
    Validated,
    ValidatedAt,
    ValidatedBy,
    Rejected,
    RejectedAt,
    RejectedBy,
    RejectionReason,
    CounterpartyId,
    CategoryId,
    DocumentNumber,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum CashMovements {
    Table,
    Id,
    CompanyId,
    FinancialAccountId,
    Amount,
    MovementType,
    Description,
    ReferenceType,
    ReferenceId,
    Date,
    CreatedAt,
}
