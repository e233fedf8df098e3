use crate::{assistant::Interpreter, errors::ServiceError, AppState};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct AssistantRequest {
    #[validate(length(min = 1, max = 1000))]
    #[schema(example = "log 2 liters morning for Raj today")]
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AssistantReply {
    pub reply: String,
}

#[utoipa::path(
    post,
    path = "/assistant",
    summary = "Run a free-text command",
    description = "Interprets the message and replies in plain text. Commands that cannot be understood get guidance text, not an error status.",
    request_body = AssistantRequest,
    responses(
        (status = 200, description = "Assistant reply", body = AssistantReply),
        (status = 400, description = "Empty or oversized message", body = crate::errors::ErrorResponse),
    ),
    tag = "Assistant"
)]
pub async fn ask(
    State(state): State<AppState>,
    Json(payload): Json<AssistantRequest>,
) -> Result<Json<AssistantReply>, ServiceError> {
    payload.validate()?;
    let today = state.services.billing.today();
    let interpreter = Interpreter::new(state.services.clone()).with_today(today);
    let reply = interpreter.respond(&payload.message).await;
    Ok(Json(AssistantReply { reply }))
}
