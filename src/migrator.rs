use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_customers_table::Migration),
            Box::new(m20240101_000002_create_daily_variations_table::Migration),
        ]
    }
}

mod m20240101_000001_create_customers_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_customers_table"
        }
    }

    #[allow(elided_lifetimes_in_paths)]
    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Customers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Customers::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Customers::Name).string().not_null())
                        .col(
                            ColumnDef::new(Customers::Address)
                                .string()
                                .not_null()
                                .default(""),
                        )
                        .col(
                            ColumnDef::new(Customers::PhoneNumber)
                                .string()
                                .not_null()
                                .default(""),
                        )
                        .col(
                            ColumnDef::new(Customers::DefaultMilkMorning)
                                .double()
                                .not_null()
                                .default(0.0),
                        )
                        .col(
                            ColumnDef::new(Customers::DefaultMilkEvening)
                                .double()
                                .not_null()
                                .default(0.0),
                        )
                        .col(
                            ColumnDef::new(Customers::PricePerLiter)
                                .double()
                                .not_null()
                                .default(60.0),
                        )
                        .col(
                            ColumnDef::new(Customers::CreatedAt)
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
                        .name("idx_customers_name")
                        .table(Customers::Table)
                        .col(Customers::Name)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Customers::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Customers {
        Table,
        Id,
        Name,
        Address,
        PhoneNumber,
        DefaultMilkMorning,
        DefaultMilkEvening,
        PricePerLiter,
        CreatedAt,
    }
}

mod m20240101_000002_create_daily_variations_table {
    use super::m20240101_000001_create_customers_table::Customers;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_daily_variations_table"
        }
    }

    #[allow(elided_lifetimes_in_paths)]
    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(DailyVariations::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(DailyVariations::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(DailyVariations::CustomerId).uuid().not_null())
                        .col(ColumnDef::new(DailyVariations::Date).date().not_null())
                        .col(
                            ColumnDef::new(DailyVariations::MorningQuantity)
                                .double()
                                .not_null()
                                .default(0.0),
                        )
                        .col(
                            ColumnDef::new(DailyVariations::EveningQuantity)
                                .double()
                                .not_null()
                                .default(0.0),
                        )
                        .col(
                            ColumnDef::new(DailyVariations::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_daily_variations_customer")
                                .from(DailyVariations::Table, DailyVariations::CustomerId)
                                .to(Customers::Table, Customers::Id),
                        )
                        .to_owned(),
                )
                .await?;

            // Backs the (customer_id, date) upsert.
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_daily_variations_customer_date")
                        .table(DailyVariations::Table)
                        .col(DailyVariations::CustomerId)
                        .col(DailyVariations::Date)
                        .unique()
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(DailyVariations::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum DailyVariations {
        Table,
        Id,
        CustomerId,
        Date,
        MorningQuantity,
        EveningQuantity,
        UpdatedAt,
    }
}
