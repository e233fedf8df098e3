//! HTTP client for the dairy API, used by `dairy-cli`.

use crate::{
    assistant::DairyBackend,
    billing::{MonthlyBill, MonthlySheet, VariationSummaryItem},
    errors::{ErrorResponse, ServiceError},
    services::{CreateCustomerInput, CustomerView, RecordVariationInput},
    types::CustomerId,
};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
struct AssistantRequest<'a> {
    message: &'a str,
}

#[derive(Debug, Deserialize)]
struct AssistantReply {
    reply: String,
}

#[derive(Clone)]
pub struct DairyClient {
    http: Client,
    base_url: String,
}

impl DairyClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ServiceError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::InternalError(format!("HTTP client setup failed: {}", e)))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    #[instrument(skip(self))]
    pub async fn get_customer(&self, customer_id: CustomerId) -> Result<CustomerView, ServiceError> {
        let response = self
            .http
            .get(self.url(&format!("/customers/{}", customer_id)))
            .send()
            .await
            .map_err(transport_error)?;
        read_json(response).await
    }

    #[instrument(skip(self))]
    pub async fn monthly_bill(
        &self,
        customer_id: CustomerId,
        month: u32,
        year: i32,
    ) -> Result<MonthlyBill, ServiceError> {
        self.get_month(customer_id, "bill", month, year).await
    }

    /// Runs a free-text command through the server-side assistant.
    #[instrument(skip(self))]
    pub async fn ask(&self, message: &str) -> Result<String, ServiceError> {
        let response = self
            .http
            .post(self.url("/assistant"))
            .json(&AssistantRequest { message })
            .send()
            .await
            .map_err(transport_error)?;
        let reply: AssistantReply = read_json(response).await?;
        Ok(reply.reply)
    }

    async fn get_month<T: DeserializeOwned>(
        &self,
        customer_id: CustomerId,
        report: &str,
        month: u32,
        year: i32,
    ) -> Result<T, ServiceError> {
        let response = self
            .http
            .get(self.url(&format!("/customers/{}/{}", customer_id, report)))
            .query(&[("month", month.to_string()), ("year", year.to_string())])
            .send()
            .await
            .map_err(transport_error)?;
        read_json(response).await
    }
}

#[async_trait]
impl DairyBackend for DairyClient {
    #[instrument(skip(self))]
    async fn list_customers(&self) -> Result<Vec<CustomerView>, ServiceError> {
        let response = self
            .http
            .get(self.url("/customers"))
            .send()
            .await
            .map_err(transport_error)?;
        read_json(response).await
    }

    #[instrument(skip(self, input))]
    async fn create_customer(
        &self,
        input: CreateCustomerInput,
    ) -> Result<CustomerView, ServiceError> {
        let response = self
            .http
            .post(self.url("/customers"))
            .json(&input)
            .send()
            .await
            .map_err(transport_error)?;
        read_json(response).await
    }

    #[instrument(skip(self, input))]
    async fn record_variation(&self, input: RecordVariationInput) -> Result<(), ServiceError> {
        let response = self
            .http
            .post(self.url("/variations"))
            .json(&input)
            .send()
            .await
            .map_err(transport_error)?;
        check_status(response).await.map(|_| ())
    }

    async fn monthly_sheet(
        &self,
        customer_id: CustomerId,
        month: u32,
        year: i32,
    ) -> Result<MonthlySheet, ServiceError> {
        self.get_month(customer_id, "monthly_sheet", month, year)
            .await
    }

    async fn variations_summary(
        &self,
        customer_id: CustomerId,
        month: u32,
        year: i32,
    ) -> Result<Vec<VariationSummaryItem>, ServiceError> {
        self.get_month(customer_id, "variations_summary", month, year)
            .await
    }
}

fn transport_error(err: reqwest::Error) -> ServiceError {
    if err.is_connect() || err.is_timeout() {
        ServiceError::ServiceUnavailable(format!("Connection error: {}", err))
    } else {
        ServiceError::ExternalApiError(err.to_string())
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ServiceError> {
    check_status(response)
        .await?
        .json::<T>()
        .await
        .map_err(|e| ServiceError::ExternalApiError(format!("unexpected response body: {}", e)))
}

/// Passes successful responses through and turns the rest into errors.
async fn check_status(response: Response) -> Result<Response, ServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|e| e.message)
        .unwrap_or(body);
    debug!(status = status.as_u16(), %message, "API returned an error");

    Err(match status {
        StatusCode::NOT_FOUND => ServiceError::NotFound(
            message
                .strip_prefix("Not found: ")
                .unwrap_or(&message)
                .to_string(),
        ),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            ServiceError::BadRequest(message)
        }
        StatusCode::SERVICE_UNAVAILABLE => ServiceError::ServiceUnavailable(message),
        _ => ServiceError::ExternalApiError(format!("{}: {}", status, message)),
    })
}
