use super::MonthQuery;
use crate::{
    billing::{MonthlyBill, MonthlySheet, VariationSummaryItem},
    errors::ServiceError,
    types::CustomerId,
    AppState,
};
use axum::{
    extract::{Path, Query, State},
    Json,
};

#[utoipa::path(
    get,
    path = "/customers/{id}/monthly_sheet",
    summary = "Monthly sheet",
    description = "Day-by-day resolved quantities with totals. The current month stops at today.",
    params(("id" = String, Path, description = "Customer id"), MonthQuery),
    responses(
        (status = 200, description = "Monthly sheet", body = MonthlySheet),
        (status = 400, description = "Invalid id or month", body = crate::errors::ErrorResponse),
        (status = 404, description = "Customer not found", body = crate::errors::ErrorResponse),
    ),
    tag = "Billing"
)]
pub async fn monthly_sheet(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<MonthlySheet>, ServiceError> {
    let customer_id = CustomerId::parse(&id)?;
    let sheet = state
        .services
        .billing
        .monthly_sheet(customer_id, query.month, query.year)
        .await?;
    Ok(Json(sheet))
}

#[utoipa::path(
    get,
    path = "/customers/{id}/variations_summary",
    summary = "Variation days",
    description = "Only the days with an explicit variation, oldest first",
    params(("id" = String, Path, description = "Customer id"), MonthQuery),
    responses(
        (status = 200, description = "Variation days", body = [VariationSummaryItem]),
        (status = 400, description = "Invalid id or month", body = crate::errors::ErrorResponse),
        (status = 404, description = "Customer not found", body = crate::errors::ErrorResponse),
    ),
    tag = "Billing"
)]
pub async fn variations_summary(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<Vec<VariationSummaryItem>>, ServiceError> {
    let customer_id = CustomerId::parse(&id)?;
    let summary = state
        .services
        .billing
        .variations_summary(customer_id, query.month, query.year)
        .await?;
    Ok(Json(summary))
}

#[utoipa::path(
    get,
    path = "/customers/{id}/bill",
    summary = "Monthly bill",
    description = "Bills every day of the month",
    params(("id" = String, Path, description = "Customer id"), MonthQuery),
    responses(
        (status = 200, description = "Bill", body = MonthlyBill),
        (status = 400, description = "Invalid id or month", body = crate::errors::ErrorResponse),
        (status = 404, description = "Customer not found", body = crate::errors::ErrorResponse),
    ),
    tag = "Billing"
)]
pub async fn monthly_bill(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<MonthlyBill>, ServiceError> {
    let customer_id = CustomerId::parse(&id)?;
    let bill = state
        .services
        .billing
        .monthly_bill(customer_id, query.month, query.year)
        .await?;
    Ok(Json(bill))
}
