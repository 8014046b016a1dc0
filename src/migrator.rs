use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_vendors_table::Migration),
            Box::new(m20250101_000002_create_users_table::Migration),
            Box::new(m20250101_000003_create_purchase_requisitions_table::Migration),
            Box::new(m20250101_000004_create_purchase_orders_table::Migration),
            Box::new(m20250101_000005_create_approval_history_table::Migration),
            Box::new(m20250101_000006_create_email_logs_table::Migration),
            Box::new(m20250101_000007_create_report_logs_table::Migration),
        ]
    }
}

// Migration implementations

mod m20250101_000001_create_vendors_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000001_create_vendors_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Vendors::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Vendors::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Vendors::Name).string().not_null())
                        .col(ColumnDef::new(Vendors::ContactEmail).string().not_null())
                        .col(
                            ColumnDef::new(Vendors::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Vendors::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Vendors::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Vendors {
        Table,
        Id,
        Name,
        ContactEmail,
        IsActive,
        CreatedAt,
    }
}

mod m20250101_000002_create_users_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000002_create_users_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Users::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Users::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Users::Name).string().not_null())
                        .col(ColumnDef::new(Users::Email).string().not_null())
                        .col(ColumnDef::new(Users::Role).string().not_null())
                        .col(
                            ColumnDef::new(Users::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Users {
        Table,
        Id,
        Name,
        Email,
        Role,
        CreatedAt,
    }
}

mod m20250101_000003_create_purchase_requisitions_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000003_create_purchase_requisitions_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(PurchaseRequisitions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PurchaseRequisitions::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseRequisitions::PrNumber)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(PurchaseRequisitions::VendorId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseRequisitions::RequesterId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseRequisitions::Status)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseRequisitions::Items)
                                .json()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseRequisitions::Quantities)
                                .json()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseRequisitions::UnitAmounts)
                                .json()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseRequisitions::TotalAmount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(PurchaseRequisitions::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseRequisitions::UpdatedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseRequisitions::Version)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_purchase_requisitions_status")
                        .table(PurchaseRequisitions::Table)
                        .col(PurchaseRequisitions::Status)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PurchaseRequisitions::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum PurchaseRequisitions {
        Table,
        Id,
        PrNumber,
        VendorId,
        RequesterId,
        Status,
        Items,
        Quantities,
        UnitAmounts,
        TotalAmount,
        CreatedAt,
        UpdatedAt,
        Version,
    }
}

mod m20250101_000004_create_purchase_orders_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000004_create_purchase_orders_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(PurchaseOrders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PurchaseOrders::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::PoNumber)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(PurchaseOrders::PrId).uuid().not_null())
                        .col(ColumnDef::new(PurchaseOrders::Status).string().not_null())
                        .col(
                            ColumnDef::new(PurchaseOrders::BaseAmount)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::CgstPercent)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::SgstPercent)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::IgstPercent)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::CgstAmount)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::SgstAmount)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::IgstAmount)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::TotalGstAmount)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::TotalAmount)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::TotalQuantity)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::DeliveredQuantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::UpdatedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::Version)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_purchase_orders_pr_id")
                        .table(PurchaseOrders::Table)
                        .col(PurchaseOrders::PrId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PurchaseOrders::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum PurchaseOrders {
        Table,
        Id,
        PoNumber,
        PrId,
        Status,
        BaseAmount,
        CgstPercent,
        SgstPercent,
        IgstPercent,
        CgstAmount,
        SgstAmount,
        IgstAmount,
        TotalGstAmount,
        TotalAmount,
        TotalQuantity,
        DeliveredQuantity,
        CreatedAt,
        UpdatedAt,
        Version,
    }
}

mod m20250101_000005_create_approval_history_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000005_create_approval_history_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ApprovalHistory::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ApprovalHistory::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ApprovalHistory::PrId).uuid().not_null())
                        .col(
                            ColumnDef::new(ApprovalHistory::ApproverId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ApprovalHistory::Action).string().not_null())
                        .col(ColumnDef::new(ApprovalHistory::Comments).string().null())
                        .col(
                            ColumnDef::new(ApprovalHistory::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_approval_history_pr_id")
                        .table(ApprovalHistory::Table)
                        .col(ApprovalHistory::PrId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ApprovalHistory::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum ApprovalHistory {
        Table,
        Id,
        PrId,
        ApproverId,
        Action,
        Comments,
        CreatedAt,
    }
}

mod m20250101_000006_create_email_logs_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000006_create_email_logs_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(EmailLogs::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(EmailLogs::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(EmailLogs::Recipient).string().not_null())
                        .col(ColumnDef::new(EmailLogs::Subject).string().not_null())
                        .col(ColumnDef::new(EmailLogs::Body).text().not_null())
                        .col(ColumnDef::new(EmailLogs::Status).string().not_null())
                        .col(
                            ColumnDef::new(EmailLogs::RetryCount)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(EmailLogs::LastAttempt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(EmailLogs::ErrorMessage).string().null())
                        .to_owned(),
                )
                .await?;

            // The retry sweep selects on (status, retry_count).
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_email_logs_status_retry")
                        .table(EmailLogs::Table)
                        .col(EmailLogs::Status)
                        .col(EmailLogs::RetryCount)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(EmailLogs::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum EmailLogs {
        Table,
        Id,
        Recipient,
        Subject,
        Body,
        Status,
        RetryCount,
        LastAttempt,
        ErrorMessage,
    }
}

mod m20250101_000007_create_report_logs_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000007_create_report_logs_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ReportLogs::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ReportLogs::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ReportLogs::ReportType).string().not_null())
                        .col(ColumnDef::new(ReportLogs::Status).string().not_null())
                        .col(
                            ColumnDef::new(ReportLogs::GeneratedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ReportLogs::RetryCount)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(ReportLogs::ErrorMessage).string().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_report_logs_status_retry")
                        .table(ReportLogs::Table)
                        .col(ReportLogs::Status)
                        .col(ReportLogs::RetryCount)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ReportLogs::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum ReportLogs {
        Table,
        Id,
        ReportType,
        Status,
        GeneratedAt,
        RetryCount,
        ErrorMessage,
    }
}
