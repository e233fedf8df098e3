use crate::{
    billing::{MonthlySheet, VariationSummaryItem},
    errors::ServiceError,
    services::{AppServices, CreateCustomerInput, CustomerView, RecordVariationInput},
    types::CustomerId,
};
use async_trait::async_trait;

/// Operations the assistant needs from the dairy service.
///
/// Implemented in-process by [`AppServices`] and over HTTP by
/// [`crate::client::DairyClient`].
#[async_trait]
pub trait DairyBackend: Send + Sync {
    async fn list_customers(&self) -> Result<Vec<CustomerView>, ServiceError>;

    async fn create_customer(
        &self,
        input: CreateCustomerInput,
    ) -> Result<CustomerView, ServiceError>;

    async fn record_variation(&self, input: RecordVariationInput) -> Result<(), ServiceError>;

    async fn monthly_sheet(
        &self,
        customer_id: CustomerId,
        month: u32,
        year: i32,
    ) -> Result<MonthlySheet, ServiceError>;

    async fn variations_summary(
        &self,
        customer_id: CustomerId,
        month: u32,
        year: i32,
    ) -> Result<Vec<VariationSummaryItem>, ServiceError>;
}

#[async_trait]
impl DairyBackend for AppServices {
    async fn list_customers(&self) -> Result<Vec<CustomerView>, ServiceError> {
        self.customers.list_customers().await
    }

    async fn create_customer(
        &self,
        input: CreateCustomerInput,
    ) -> Result<CustomerView, ServiceError> {
        self.customers.create_customer(input).await
    }

    async fn record_variation(&self, input: RecordVariationInput) -> Result<(), ServiceError> {
        self.variations.record_variation(input).await
    }

    async fn monthly_sheet(
        &self,
        customer_id: CustomerId,
        month: u32,
        year: i32,
    ) -> Result<MonthlySheet, ServiceError> {
        self.billing.monthly_sheet(customer_id, month, year).await
    }

    async fn variations_summary(
        &self,
        customer_id: CustomerId,
        month: u32,
        year: i32,
    ) -> Result<Vec<VariationSummaryItem>, ServiceError> {
        self.billing.variations_summary(customer_id, month, year).await
    }
}
