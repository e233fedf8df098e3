use crate::{errors::ServiceError, services::RecordVariationInput, AppState};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[utoipa::path(
    post,
    path = "/variations",
    summary = "Record a daily variation",
    description = "Creates or replaces the variation for the customer and date",
    request_body = RecordVariationInput,
    responses(
        (status = 201, description = "Variation recorded", body = MessageResponse),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 404, description = "Customer not found", body = crate::errors::ErrorResponse),
    ),
    tag = "Variations"
)]
pub async fn record_variation(
    State(state): State<AppState>,
    Json(payload): Json<RecordVariationInput>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.variations.record_variation(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Variation recorded successfully".to_string(),
        }),
    ))
}
