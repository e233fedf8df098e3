use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Dairy Ledger API",
        version = "0.1.0",
        description = r#"
# Dairy Ledger API

Customers, day-by-day milk variations and monthly billing for a dairy delivery round.

- A customer has a standing order: default morning and evening liters.
- A **variation** replaces the standing order for one date. Posting again for the same
  customer and date overwrites it. A variation of 0 / 0 marks a skipped delivery.
- Monthly sheets resolve every day to its variation or the defaults. The sheet for the
  current month stops at today; the bill always covers the whole month.

Errors use the body `{"error", "message", "request_id", "timestamp"}`.
        "#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers((url = "http://127.0.0.1:8000", description = "Local development")),
    tags(
        (name = "Status", description = "Welcome and health endpoints"),
        (name = "Customers", description = "Customer records"),
        (name = "Variations", description = "Per-day overrides of the standing order"),
        (name = "Billing", description = "Monthly sheets, bills and variation summaries"),
        (name = "Assistant", description = "Free-text command interpreter")
    ),
    paths(
        crate::root,
        crate::health_check,
        crate::handlers::customers::list_customers,
        crate::handlers::customers::create_customer,
        crate::handlers::customers::get_customer,
        crate::handlers::variations::record_variation,
        crate::handlers::billing::monthly_sheet,
        crate::handlers::billing::variations_summary,
        crate::handlers::billing::monthly_bill,
        crate::handlers::assistant::ask,
    ),
    components(
        schemas(
            crate::WelcomeResponse,
            crate::services::CustomerView,
            crate::services::CreateCustomerInput,
            crate::services::RecordVariationInput,
            crate::handlers::variations::MessageResponse,
            crate::billing::MonthlySheet,
            crate::billing::SheetRow,
            crate::billing::SheetTotals,
            crate::billing::MonthlyBill,
            crate::billing::VariationSummaryItem,
            crate::handlers::assistant::AssistantRequest,
            crate::handlers::assistant::AssistantReply,
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDoc;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}
