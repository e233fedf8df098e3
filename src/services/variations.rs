use crate::{
    billing::{BillingPeriod, Quantities, VariationLedger},
    entities::{daily_variation, Customer, DailyVariation},
    errors::ServiceError,
    services::customers::validate_quantity,
    types::CustomerId,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use metrics::counter;
use sea_orm::{
    sea_query::OnConflict, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Stores per-day overrides of a customer's standing order
#[derive(Clone)]
pub struct VariationService {
    db: Arc<DatabaseConnection>,
}

impl VariationService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Creates or replaces the variation for `(customer_id, date)`.
    ///
    /// The write is a single `INSERT .. ON CONFLICT DO UPDATE`, so concurrent
    /// writers to the same day resolve as last-writer-wins.
    #[instrument(skip(self, input), fields(customer_id = %input.customer_id, date = %input.date))]
    pub async fn record_variation(&self, input: RecordVariationInput) -> Result<(), ServiceError> {
        input.validate()?;
        let customer_id = CustomerId::parse(&input.customer_id)?;

        let exists = Customer::find_by_id(customer_id.as_uuid())
            .one(&*self.db)
            .await?
            .is_some();
        if !exists {
            return Err(ServiceError::NotFound("Customer not found".to_string()));
        }

        let variation = daily_variation::ActiveModel {
            id: Set(Uuid::new_v4()),
            customer_id: Set(customer_id.as_uuid()),
            date: Set(input.date),
            morning_quantity: Set(input.morning_quantity),
            evening_quantity: Set(input.evening_quantity),
            updated_at: Set(Utc::now()),
        };

        DailyVariation::insert(variation)
            .on_conflict(
                OnConflict::columns([
                    daily_variation::Column::CustomerId,
                    daily_variation::Column::Date,
                ])
                .update_columns([
                    daily_variation::Column::MorningQuantity,
                    daily_variation::Column::EveningQuantity,
                    daily_variation::Column::UpdatedAt,
                ])
                .to_owned(),
            )
            .exec_without_returning(&*self.db)
            .await?;

        counter!("dairy.variations.recorded", 1);
        info!("Variation recorded");
        Ok(())
    }

    /// Loads every variation of `customer_id` dated inside `period`
    #[instrument(skip(self))]
    pub async fn ledger_for(
        &self,
        customer_id: CustomerId,
        period: BillingPeriod,
    ) -> Result<VariationLedger, ServiceError> {
        let rows = DailyVariation::find()
            .filter(daily_variation::Column::CustomerId.eq(customer_id.as_uuid()))
            .filter(daily_variation::Column::Date.gte(period.first_day()))
            .filter(daily_variation::Column::Date.lte(period.last_day()))
            .order_by_asc(daily_variation::Column::Date)
            .all(&*self.db)
            .await?;

        debug!("Loaded {} variations", rows.len());
        Ok(rows
            .into_iter()
            .map(|row| {
                (
                    row.date,
                    Quantities::new(row.morning_quantity, row.evening_quantity),
                )
            })
            .collect())
    }
}

/// Body of `POST /variations`
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RecordVariationInput {
    pub customer_id: String,
    /// ISO date; a full timestamp is accepted and truncated to its date
    #[serde(deserialize_with = "deserialize_day")]
    #[schema(value_type = String, example = "2024-03-05")]
    pub date: NaiveDate,
    #[validate(custom = "validate_quantity")]
    pub morning_quantity: f64,
    #[validate(custom = "validate_quantity")]
    pub evening_quantity: f64,
}

impl RecordVariationInput {
    pub fn new(customer_id: CustomerId, date: NaiveDate, quantities: Quantities) -> Self {
        Self {
            customer_id: customer_id.to_string(),
            date,
            morning_quantity: quantities.morning,
            evening_quantity: quantities.evening,
        }
    }
}

fn deserialize_day<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_day(&raw).ok_or_else(|| {
        serde::de::Error::custom(format!("invalid date '{}', expected YYYY-MM-DD", raw))
    })
}

fn parse_day(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|dt| dt.date())
        })
}
