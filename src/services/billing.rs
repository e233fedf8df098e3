use crate::{
    billing::{
        self, BillingPeriod, MonthlyBill, MonthlySheet, Quantities, StandingOrder,
        VariationLedger, VariationSummaryItem,
    },
    entities::customer,
    errors::ServiceError,
    services::{customers::CustomerService, variations::VariationService},
    types::CustomerId,
};
use chrono::{Local, NaiveDate};
use tracing::instrument;

/// Month-level reads: sheets, bills and variation summaries
#[derive(Clone)]
pub struct BillingService {
    customers: CustomerService,
    variations: VariationService,
    today: Option<NaiveDate>,
}

impl BillingService {
    pub fn new(customers: CustomerService, variations: VariationService) -> Self {
        Self {
            customers,
            variations,
            today: None,
        }
    }

    /// Pins "today" instead of reading the local clock
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    #[instrument(skip(self))]
    pub async fn monthly_sheet(
        &self,
        customer_id: CustomerId,
        month: u32,
        year: i32,
    ) -> Result<MonthlySheet, ServiceError> {
        let (order, ledger, period) = self.load_month(customer_id, month, year).await?;
        billing::monthly_sheet(&order, &ledger, period, self.today())
    }

    #[instrument(skip(self))]
    pub async fn monthly_bill(
        &self,
        customer_id: CustomerId,
        month: u32,
        year: i32,
    ) -> Result<MonthlyBill, ServiceError> {
        let (order, ledger, period) = self.load_month(customer_id, month, year).await?;
        billing::monthly_bill(&order, &ledger, period)
    }

    #[instrument(skip(self))]
    pub async fn variations_summary(
        &self,
        customer_id: CustomerId,
        month: u32,
        year: i32,
    ) -> Result<Vec<VariationSummaryItem>, ServiceError> {
        let (order, ledger, period) = self.load_month(customer_id, month, year).await?;
        Ok(billing::summarize_variations(&order, &ledger, period))
    }

    async fn load_month(
        &self,
        customer_id: CustomerId,
        month: u32,
        year: i32,
    ) -> Result<(StandingOrder, VariationLedger, BillingPeriod), ServiceError> {
        let period = BillingPeriod::new(month, year)?;
        let customer = self.customers.get_customer(customer_id).await?;
        let ledger = self.variations.ledger_for(customer_id, period).await?;
        Ok((standing_order(&customer), ledger, period))
    }
}

fn standing_order(customer: &customer::Model) -> StandingOrder {
    StandingOrder {
        customer_name: customer.name.clone(),
        defaults: Quantities::new(customer.default_milk_morning, customer.default_milk_evening),
        price_per_liter: customer.price_per_liter,
    }
}
