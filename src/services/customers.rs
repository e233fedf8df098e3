use crate::{
    billing::{MAX_LITERS_PER_SLOT, MAX_PRICE_PER_LITER},
    config::DEFAULT_PRICE_PER_LITER,
    entities::{customer, Customer},
    errors::ServiceError,
    types::CustomerId,
};
use chrono::Utc;
use metrics::counter;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// Customer service for managing delivery customers
#[derive(Clone)]
pub struct CustomerService {
    db: Arc<DatabaseConnection>,
    default_price_per_liter: f64,
}

impl CustomerService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            db,
            default_price_per_liter: DEFAULT_PRICE_PER_LITER,
        }
    }

    /// Price applied when a create request omits `price_per_liter`
    pub fn with_default_price(mut self, price: f64) -> Self {
        self.default_price_per_liter = price;
        self
    }

    /// List all customers, oldest first
    #[instrument(skip(self))]
    pub async fn list_customers(&self) -> Result<Vec<CustomerView>, ServiceError> {
        let customers = Customer::find()
            .order_by_asc(customer::Column::CreatedAt)
            .all(&*self.db)
            .await?;
        Ok(customers.into_iter().map(CustomerView::from).collect())
    }

    /// Create a new customer
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_customer(
        &self,
        input: CreateCustomerInput,
    ) -> Result<CustomerView, ServiceError> {
        input.validate()?;

        let customer_id = CustomerId::new();
        let customer = customer::ActiveModel {
            id: Set(customer_id.as_uuid()),
            name: Set(input.name.trim().to_string()),
            address: Set(input.address),
            phone_number: Set(input.phone_number),
            default_milk_morning: Set(input.default_milk_morning),
            default_milk_evening: Set(input.default_milk_evening),
            price_per_liter: Set(input
                .price_per_liter
                .unwrap_or(self.default_price_per_liter)),
            created_at: Set(Utc::now()),
        };

        let customer = customer.insert(&*self.db).await?;
        counter!("dairy.customers.created", 1);

        info!("Customer created: {}", customer_id);
        Ok(customer.into())
    }

    /// Get customer by ID
    #[instrument(skip(self))]
    pub async fn get_customer(&self, customer_id: CustomerId) -> Result<customer::Model, ServiceError> {
        Customer::find_by_id(customer_id.as_uuid())
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Customer not found".to_string()))
    }
}

/// Body of `POST /customers`
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateCustomerInput {
    #[validate(custom = "validate_name")]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    #[validate(custom = "validate_quantity")]
    pub default_milk_morning: f64,
    #[serde(default)]
    #[validate(custom = "validate_quantity")]
    pub default_milk_evening: f64,
    #[validate(custom = "validate_price")]
    pub price_per_liter: Option<f64>,
}

impl CreateCustomerInput {
    /// Minimal customer with only a name and standing order
    pub fn named(name: impl Into<String>, morning: f64, evening: f64) -> Self {
        Self {
            name: name.into(),
            address: String::new(),
            phone_number: String::new(),
            default_milk_morning: morning,
            default_milk_evening: evening,
            price_per_liter: None,
        }
    }
}

/// Customer as exposed over HTTP; the id travels as `_id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CustomerView {
    #[serde(rename = "_id")]
    #[schema(value_type = String, example = "6f1c2a5e-8d51-4f4e-9a7e-2b9a1f0c3d11")]
    pub id: CustomerId,
    pub name: String,
    pub address: String,
    pub phone_number: String,
    pub default_milk_morning: f64,
    pub default_milk_evening: f64,
    pub price_per_liter: f64,
}

impl From<customer::Model> for CustomerView {
    fn from(model: customer::Model) -> Self {
        Self {
            id: model.id.into(),
            name: model.name,
            address: model.address,
            phone_number: model.phone_number,
            default_milk_morning: model.default_milk_morning,
            default_milk_evening: model.default_milk_evening,
            price_per_liter: model.price_per_liter,
        }
    }
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        let mut err = ValidationError::new("name");
        err.message = Some("name must not be empty".into());
        return Err(err);
    }
    Ok(())
}

pub(crate) fn validate_quantity(quantity: f64) -> Result<(), ValidationError> {
    if !quantity.is_finite() || quantity < 0.0 || quantity > MAX_LITERS_PER_SLOT {
        let mut err = ValidationError::new("quantity");
        err.message = Some(
            format!("quantities must be between 0 and {} liters", MAX_LITERS_PER_SLOT).into(),
        );
        return Err(err);
    }
    Ok(())
}

fn validate_price(price: f64) -> Result<(), ValidationError> {
    if !price.is_finite() || price < 0.0 || price > MAX_PRICE_PER_LITER {
        let mut err = ValidationError::new("price_per_liter");
        err.message = Some(
            format!("price_per_liter must be between 0 and {}", MAX_PRICE_PER_LITER).into(),
        );
        return Err(err);
    }
    Ok(())
}
