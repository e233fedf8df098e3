pub mod billing;
pub mod customers;
pub mod variations;

use crate::config::AppConfig;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

pub use billing::BillingService;
pub use customers::{CreateCustomerInput, CustomerService, CustomerView};
pub use variations::{RecordVariationInput, VariationService};

/// The services shared by the HTTP handlers and the in-process assistant
#[derive(Clone)]
pub struct AppServices {
    pub customers: CustomerService,
    pub variations: VariationService,
    pub billing: BillingService,
}

impl AppServices {
    pub fn new(db: Arc<DatabaseConnection>, config: &AppConfig) -> Self {
        let customers =
            CustomerService::new(db.clone()).with_default_price(config.default_price_per_liter);
        let variations = VariationService::new(db);
        let billing = BillingService::new(customers.clone(), variations.clone());
        Self {
            customers,
            variations,
            billing,
        }
    }
}
