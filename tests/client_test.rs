mod common;

use assert_matches::assert_matches;
use chrono::NaiveDate;
use common::{today, TestApp};
use dairy_ledger::{
    assistant::{DairyBackend, Interpreter},
    billing::Quantities,
    client::DairyClient,
    errors::ServiceError,
    services::{CreateCustomerInput, RecordVariationInput},
    types::CustomerId,
};
use serde_json::json;
use std::time::Duration;
use wiremock::{
    matchers::{body_partial_json, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

fn client_for(url: &str) -> DairyClient {
    DairyClient::new(url, Duration::from_secs(2)).expect("client builds")
}

#[tokio::test]
async fn lists_and_creates_customers() {
    let server = MockServer::start().await;
    let id = CustomerId::new();
    let raj = json!({
        "_id": id.to_string(),
        "name": "Raj",
        "address": "",
        "phone_number": "",
        "default_milk_morning": 1.0,
        "default_milk_evening": 2.0,
        "price_per_liter": 60.0,
    });

    Mock::given(method("GET"))
        .and(path("/customers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([raj.clone()])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/customers"))
        .and(body_partial_json(json!({"name": "Raj", "default_milk_evening": 2.0})))
        .respond_with(ResponseTemplate::new(201).set_body_json(raj))
        .expect(1)
        .mount(&server)
        .await;

    // trailing slash is tolerated
    let client = client_for(&format!("{}/", server.uri()));

    let customers = client.list_customers().await.unwrap();
    assert_eq!(customers.len(), 1);
    assert_eq!(customers[0].id, id);

    let created = client
        .create_customer(CreateCustomerInput::named("Raj", 1.0, 2.0))
        .await
        .unwrap();
    assert_eq!(created.name, "Raj");
}

#[tokio::test]
async fn month_reports_send_query_parameters() {
    let server = MockServer::start().await;
    let id = CustomerId::new();

    Mock::given(method("GET"))
        .and(path(format!("/customers/{}/bill", id)))
        .and(query_param("month", "2"))
        .and(query_param("year", "2024"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "customer_name": "Raj",
            "month": 2,
            "year": 2024,
            "total_liters": 87.0,
            "amount_due": 5220.0,
        })))
        .mount(&server)
        .await;

    let bill = client_for(&server.uri()).monthly_bill(id, 2, 2024).await.unwrap();
    assert_eq!(bill.amount_due, 5220.0);
}

#[tokio::test]
async fn error_statuses_are_mapped() {
    let server = MockServer::start().await;
    let missing = CustomerId::new();
    let broken = CustomerId::new();

    Mock::given(method("GET"))
        .and(path(format!("/customers/{}", missing)))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": "Not Found",
            "message": "Not found: Customer not found",
            "timestamp": "2024-03-15T00:00:00Z",
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/customers/{}", broken)))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/variations"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "Bad Request",
            "message": "Validation error: morning_quantity",
            "timestamp": "2024-03-15T00:00:00Z",
        })))
        .mount(&server)
        .await;

    let client = client_for(&server.uri());

    let err = client.get_customer(missing).await.unwrap_err();
    assert_matches!(err, ServiceError::NotFound(ref m) if m == "Customer not found");

    let err = client.get_customer(broken).await.unwrap_err();
    assert_matches!(err, ServiceError::ExternalApiError(_));
    assert!(!err.is_connectivity());

    let input = RecordVariationInput::new(
        CustomerId::new(),
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        Quantities::new(-1.0, 0.0),
    );
    let err = client.record_variation(input).await.unwrap_err();
    assert_matches!(err, ServiceError::BadRequest(_));
}

#[tokio::test]
async fn unreachable_server_is_a_connectivity_error() {
    // Bind then drop to get a port nobody listens on.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client_for(&format!("http://{}", addr));
    let err = client.list_customers().await.unwrap_err();
    assert!(err.is_connectivity(), "unexpected error: {:?}", err);

    let reply = Interpreter::new(client).respond("bill for raj").await;
    assert_eq!(reply, "❌ Connection error: could not reach the dairy service.");
}

#[tokio::test]
async fn interpreter_drives_a_live_server_over_http() {
    let app = TestApp::new().await;
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = dairy_ledger::build_router(app.state.clone());
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    let client = client_for(&format!("http://{}", addr));
    let interpreter = Interpreter::new(client.clone()).with_today(today());

    assert_eq!(
        interpreter
            .respond("add new customer meena with 2 morning")
            .await,
        "✅ Success! Customer 'Meena' added with 2.0L morning and 0.0L evening default milk."
    );
    assert_eq!(
        interpreter
            .respond("log 0 both for meena from 1-3-2024 to 2-3-2024")
            .await,
        "✅ Success! Logged variation for 'Meena' for 2 day(s)."
    );

    // 13 default days of 2L up to the pinned date
    assert_eq!(
        interpreter.respond("bill for meena").await,
        "💰 The total bill for Meena for 3/2024 is ₹ 1560.00."
    );

    let remote = client.ask("did meena skip").await.unwrap();
    assert_eq!(
        remote,
        "Here are the days they **skipped** delivery:\n- On **2024-03-01**\n- On **2024-03-02**"
    );
}
