//! Chat-style command interpreter.
//!
//! [`Interpreter::respond`] takes one free-text message and always produces a
//! plain-text reply. Parse failures, unknown customers and backend errors all
//! become guidance or error text; nothing is returned as `Err`.

pub mod analysis;
pub mod backend;
pub mod dates;
pub mod intent;
pub mod session;

use crate::{
    billing::BillingPeriod,
    errors::ServiceError,
    services::{CreateCustomerInput, CustomerView, RecordVariationInput},
};
use chrono::{Local, NaiveDate};
use tracing::{debug, instrument, warn};

pub use analysis::ConsumptionReport;
pub use backend::DairyBackend;
pub use dates::{parse_dates, DateParseError};
pub use intent::{AnalysisFocus, Intent, NewCustomer};
pub use session::ChatSession;

const CONNECTION_ERROR: &str = "❌ Connection error: could not reach the dairy service.";

pub struct Interpreter<B> {
    backend: B,
    today: Option<NaiveDate>,
}

impl<B: DairyBackend> Interpreter<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            today: None,
        }
    }

    /// Pins "today" instead of reading the local clock.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    #[instrument(skip(self))]
    pub async fn respond(&self, message: &str) -> String {
        let command = message.to_lowercase();

        if NewCustomer::is_requested(&command) {
            return self.add_customer(&command).await;
        }

        let customers = match self.backend.list_customers().await {
            Ok(customers) => customers,
            Err(e) if e.is_connectivity() => return CONNECTION_ERROR.to_string(),
            Err(e) => {
                warn!(error = %e, "could not load customers");
                return "❌ Could not load the customer list.".to_string();
            }
        };

        let Some(customer) = intent::find_customer(&command, &customers) else {
            return "Please mention a valid customer's name in your request.".to_string();
        };

        let intent = Intent::detect(&command);
        debug!(?intent, customer = %customer.name, "command classified");

        match intent {
            Intent::LogVariation => self.log_variation(&command, customer).await,
            Intent::Bill => self.report_bill(customer).await,
            Intent::Analysis => self.analyze(&command, customer).await,
            Intent::Unknown => "Sorry, I can't do that yet. Please try rephrasing.".to_string(),
        }
    }

    async fn add_customer(&self, command: &str) -> String {
        let Some(new_customer) = NewCustomer::parse(command) else {
            return "Couldn't find a name. Use 'add new customer [name]...'".to_string();
        };

        let input = CreateCustomerInput::named(
            new_customer.name.clone(),
            new_customer.morning,
            new_customer.evening,
        );
        match self.backend.create_customer(input).await {
            Ok(_) => format!(
                "✅ Success! Customer '{}' added with {:?}L morning and {:?}L evening default milk.",
                new_customer.name, new_customer.morning, new_customer.evening
            ),
            Err(e) => failure_reply(&e),
        }
    }

    async fn log_variation(&self, command: &str, customer: &CustomerView) -> String {
        let quantities = match intent::parse_log_quantities(command) {
            Ok(q) => q,
            Err(guidance) => return guidance.to_string(),
        };

        let dates = match parse_dates(command, self.today()) {
            Ok(dates) => dates,
            Err(e) => {
                return format!(
                    "Couldn't understand the date: {}. Use D-M-YYYY, e.g. 5-3-2024.",
                    e
                )
            }
        };

        let mut logged = 0;
        for date in dates {
            let input = RecordVariationInput::new(customer.id, date, quantities);
            match self.backend.record_variation(input).await {
                Ok(()) => logged += 1,
                Err(e) if e.is_connectivity() => return CONNECTION_ERROR.to_string(),
                Err(e) => warn!(error = %e, %date, "variation not recorded"),
            }
        }

        format!(
            "✅ Success! Logged variation for '{}' for {} day(s).",
            customer.name, logged
        )
    }

    async fn report_bill(&self, customer: &CustomerView) -> String {
        let period = BillingPeriod::containing(self.today());
        match self
            .backend
            .monthly_sheet(customer.id, period.month(), period.year())
            .await
        {
            Ok(sheet) => format!(
                "💰 The total bill for {} for {}/{} is ₹ {:.2}.",
                customer.name,
                period.month(),
                period.year(),
                sheet.totals.amount_due
            ),
            Err(e) => {
                warn!(error = %e, "bill lookup failed");
                "❌ Error fetching the bill.".to_string()
            }
        }
    }

    async fn analyze(&self, command: &str, customer: &CustomerView) -> String {
        let period = BillingPeriod::containing(self.today());
        let summary = match self
            .backend
            .variations_summary(customer.id, period.month(), period.year())
            .await
        {
            Ok(summary) => summary,
            Err(e) => {
                warn!(error = %e, "variation summary lookup failed");
                return "❌ Could not retrieve variation data.".to_string();
            }
        };

        if summary.is_empty() {
            return format!("No variations were logged for {} this month.", customer.name);
        }

        ConsumptionReport::classify(&summary).render(AnalysisFocus::from_command(command))
    }
}

fn failure_reply(error: &ServiceError) -> String {
    if error.is_connectivity() {
        CONNECTION_ERROR.to_string()
    } else {
        format!("❌ Error: {}", error.response_message())
    }
}
