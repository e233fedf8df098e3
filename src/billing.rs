//! Monthly resolution engine.
//!
//! Pure functions over a customer's standing order and the variations logged
//! for one calendar month. Every calendar day resolves to the variation
//! recorded for that exact date, or to the customer's defaults when there is
//! none. A variation of `(0, 0)` is a skipped delivery, not missing data.
//!
//! Sums are accumulated as [`Decimal`] and rounded to two places on output so
//! that e.g. ten deliveries of 0.1L total exactly 1.0L.

use crate::errors::ServiceError;
use chrono::{Datelike, NaiveDate};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// Largest quantity accepted for one delivery slot.
pub const MAX_LITERS_PER_SLOT: f64 = 10_000.0;

/// Largest accepted price per liter.
pub const MAX_PRICE_PER_LITER: f64 = 1_000_000.0;

/// Morning and evening liters for one day.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Quantities {
    pub morning: f64,
    pub evening: f64,
}

impl Quantities {
    pub fn new(morning: f64, evening: f64) -> Self {
        Self { morning, evening }
    }

    pub fn total(&self) -> f64 {
        exact_sum(self.morning, self.evening)
    }

    /// Both slots are zero.
    pub fn is_skipped(&self) -> bool {
        self.morning == 0.0 && self.evening == 0.0
    }
}

/// The billing-relevant part of a customer record.
#[derive(Debug, Clone, PartialEq)]
pub struct StandingOrder {
    pub customer_name: String,
    pub defaults: Quantities,
    pub price_per_liter: f64,
}

/// Variations for one customer, keyed by date.
pub type VariationLedger = BTreeMap<NaiveDate, Quantities>;

/// A validated calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BillingPeriod {
    year: i32,
    month: u32,
}

impl BillingPeriod {
    pub fn new(month: u32, year: i32) -> Result<Self, ServiceError> {
        if !(1..=12).contains(&month) {
            return Err(ServiceError::InvalidInput(format!(
                "month must be between 1 and 12, got {}",
                month
            )));
        }
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(ServiceError::InvalidInput(format!(
                "year {} is out of range",
                year
            )));
        }
        Ok(Self { year, month })
    }

    /// The month containing `date`.
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn first_day(&self) -> NaiveDate {
        self.day(1)
    }

    pub fn last_day(&self) -> NaiveDate {
        self.day(self.days_in_month())
    }

    pub fn days_in_month(&self) -> u32 {
        let (next_year, next_month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(next_year, next_month, 1)
            .and_then(|d| d.pred_opt())
            .map(|d| d.day())
            .unwrap_or(31)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// Every day of the month, in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        (1..=self.days_in_month()).map(move |d| self.day(d))
    }

    /// Days shown on the monthly sheet: the whole month, except that the
    /// current month stops at `today`.
    pub fn days_through(&self, today: NaiveDate) -> impl Iterator<Item = NaiveDate> + '_ {
        let last = if self.contains(today) {
            today.day()
        } else {
            self.days_in_month()
        };
        (1..=last).map(move |d| self.day(d))
    }

    fn day(&self, day: u32) -> NaiveDate {
        // `new` guarantees the first of the month exists, so every in-range day does too.
        NaiveDate::from_ymd_opt(self.year, self.month, day).unwrap_or(NaiveDate::MIN)
    }
}

/// One resolved day of the monthly sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SheetRow {
    #[serde(rename = "Date")]
    #[schema(value_type = String, example = "2024-03-01")]
    pub date: NaiveDate,
    #[serde(rename = "Morning (L)")]
    pub morning: f64,
    #[serde(rename = "Evening (L)")]
    pub evening: f64,
    #[serde(rename = "Daily Total (L)")]
    pub daily_total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SheetTotals {
    pub total_morning: f64,
    pub total_evening: f64,
    pub grand_total_liters: f64,
    pub amount_due: f64,
}

/// Day-by-day ledger for one month plus its totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MonthlySheet {
    pub sheet_data: Vec<SheetRow>,
    pub totals: SheetTotals,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MonthlyBill {
    pub customer_name: String,
    pub month: u32,
    pub year: i32,
    pub total_liters: f64,
    pub amount_due: f64,
}

/// A day carrying an explicit variation, next to the defaults it replaced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct VariationSummaryItem {
    #[schema(value_type = String, example = "2024-03-05")]
    pub date: NaiveDate,
    pub morning: f64,
    pub evening: f64,
    pub total: f64,
    pub default_morning: f64,
    pub default_evening: f64,
}

impl VariationSummaryItem {
    pub fn morning_diff(&self) -> f64 {
        exact_diff(self.morning, self.default_morning)
    }

    pub fn evening_diff(&self) -> f64 {
        exact_diff(self.evening, self.default_evening)
    }
}

/// Effective quantities for `date`.
pub fn resolve_day(order: &StandingOrder, ledger: &VariationLedger, date: NaiveDate) -> Quantities {
    ledger.get(&date).copied().unwrap_or(order.defaults)
}

/// Builds the monthly sheet, truncated at `today` for the current month.
///
/// Fails with `InvalidInput` when a quantity or the price cannot be summed
/// within [`Decimal`]'s range.
pub fn monthly_sheet(
    order: &StandingOrder,
    ledger: &VariationLedger,
    period: BillingPeriod,
    today: NaiveDate,
) -> Result<MonthlySheet, ServiceError> {
    let mut total_morning = Decimal::ZERO;
    let mut total_evening = Decimal::ZERO;
    let mut sheet_data = Vec::with_capacity(period.days_in_month() as usize);

    for date in period.days_through(today) {
        let q = resolve_day(order, ledger, date);
        total_morning = checked_add(total_morning, to_decimal(q.morning)?)?;
        total_evening = checked_add(total_evening, to_decimal(q.evening)?)?;
        sheet_data.push(SheetRow {
            date,
            morning: q.morning,
            evening: q.evening,
            daily_total: q.total(),
        });
    }

    let grand_total = checked_add(total_morning, total_evening)?;
    Ok(MonthlySheet {
        sheet_data,
        totals: SheetTotals {
            total_morning: round2(total_morning),
            total_evening: round2(total_evening),
            grand_total_liters: round2(grand_total),
            amount_due: round2(charge(grand_total, order.price_per_liter)?),
        },
    })
}

/// Bills every day of the month, regardless of today's date.
pub fn monthly_bill(
    order: &StandingOrder,
    ledger: &VariationLedger,
    period: BillingPeriod,
) -> Result<MonthlyBill, ServiceError> {
    let mut total = Decimal::ZERO;
    for date in period.days() {
        let q = resolve_day(order, ledger, date);
        total = checked_add(total, to_decimal(q.morning)?)?;
        total = checked_add(total, to_decimal(q.evening)?)?;
    }

    Ok(MonthlyBill {
        customer_name: order.customer_name.clone(),
        month: period.month(),
        year: period.year(),
        total_liters: round2(total),
        amount_due: round2(charge(total, order.price_per_liter)?),
    })
}

/// Lists the days of `period` that carry a variation, oldest first.
pub fn summarize_variations(
    order: &StandingOrder,
    ledger: &VariationLedger,
    period: BillingPeriod,
) -> Vec<VariationSummaryItem> {
    // BTreeMap iteration is already date-ordered.
    ledger
        .range(period.first_day()..=period.last_day())
        .map(|(date, q)| VariationSummaryItem {
            date: *date,
            morning: q.morning,
            evening: q.evening,
            total: q.total(),
            default_morning: order.defaults.morning,
            default_evening: order.defaults.evening,
        })
        .collect()
}

fn out_of_range() -> ServiceError {
    ServiceError::InvalidInput("Quantities or price are too large to bill".to_string())
}

fn to_decimal(value: f64) -> Result<Decimal, ServiceError> {
    Decimal::from_f64(value).ok_or_else(out_of_range)
}

fn checked_add(a: Decimal, b: Decimal) -> Result<Decimal, ServiceError> {
    a.checked_add(b).ok_or_else(out_of_range)
}

fn charge(liters: Decimal, price_per_liter: f64) -> Result<Decimal, ServiceError> {
    liters
        .checked_mul(to_decimal(price_per_liter)?)
        .ok_or_else(out_of_range)
}

/// `a + b` through [`Decimal`]; plain float addition when either side is
/// outside its range.
fn exact_sum(a: f64, b: f64) -> f64 {
    match (Decimal::from_f64(a), Decimal::from_f64(b)) {
        (Some(x), Some(y)) => x.checked_add(y).and_then(|v| v.to_f64()).unwrap_or(a + b),
        _ => a + b,
    }
}

fn exact_diff(a: f64, b: f64) -> f64 {
    match (Decimal::from_f64(a), Decimal::from_f64(b)) {
        (Some(x), Some(y)) => x.checked_sub(y).and_then(|v| v.to_f64()).unwrap_or(a - b),
        _ => a - b,
    }
}

fn round2(value: Decimal) -> f64 {
    value.round_dp(2).to_f64().unwrap_or(0.0)
}
