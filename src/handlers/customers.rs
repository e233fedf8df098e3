use crate::{
    errors::ServiceError,
    services::{CreateCustomerInput, CustomerView},
    types::CustomerId,
    AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

#[utoipa::path(
    get,
    path = "/customers",
    summary = "List customers",
    responses(
        (status = 200, description = "All customers", body = [CustomerView]),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    tag = "Customers"
)]
pub async fn list_customers(
    State(state): State<AppState>,
) -> Result<Json<Vec<CustomerView>>, ServiceError> {
    let customers = state.services.customers.list_customers().await?;
    Ok(Json(customers))
}

#[utoipa::path(
    post,
    path = "/customers",
    summary = "Create customer",
    request_body = CreateCustomerInput,
    responses(
        (status = 201, description = "Customer created", body = CustomerView),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    tag = "Customers"
)]
pub async fn create_customer(
    State(state): State<AppState>,
    Json(payload): Json<CreateCustomerInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = state.services.customers.create_customer(payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/customers/{id}",
    summary = "Get customer",
    params(("id" = String, Path, description = "Customer id")),
    responses(
        (status = 200, description = "Customer found", body = CustomerView),
        (status = 400, description = "Invalid Customer ID format", body = crate::errors::ErrorResponse),
        (status = 404, description = "Customer not found", body = crate::errors::ErrorResponse),
    ),
    tag = "Customers"
)]
pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CustomerView>, ServiceError> {
    let customer_id = CustomerId::parse(&id)?;
    let customer = state.services.customers.get_customer(customer_id).await?;
    Ok(Json(customer.into()))
}
