mod common;

use axum::http::{Method, StatusCode};
use common::{response_json, TestApp};
use dairy_ledger::entities::DailyVariation;
use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn root_and_health() {
    let app = TestApp::new().await;

    let (status, body) = app.json(Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Welcome to the Dairy Project API");

    let (status, body) = app.json(Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["checks"]["database"], "healthy");
}

#[tokio::test]
async fn create_and_list_customers() {
    let app = TestApp::new().await;
    let raj = app.create_customer("Raj", 1.0, 2.0).await;
    app.create_customer("Asha", 0.5, 0.0).await;

    let (status, body) = app.json(Method::GET, "/customers", None).await;
    assert_eq!(status, StatusCode::OK);
    let customers = body.as_array().expect("array");
    assert_eq!(customers.len(), 2);

    let first = customers
        .iter()
        .find(|c| c["_id"] == raj.as_str())
        .expect("Raj listed");
    assert_eq!(first["name"], "Raj");
    assert_eq!(first["address"], "12 Dairy Lane");
    assert_eq!(first["phone_number"], "555-0100");
    assert_eq!(first["default_milk_morning"], 1.0);
    assert_eq!(first["default_milk_evening"], 2.0);
    assert_eq!(first["price_per_liter"], 60.0);
}

#[tokio::test]
async fn create_customer_honours_explicit_price_and_rejects_bad_input() {
    let app = TestApp::new().await;

    let (status, body) = app
        .json(
            Method::POST,
            "/customers",
            Some(json!({"name": "Meena", "address": "", "phone_number": "", "price_per_liter": 72.5})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["price_per_liter"], 72.5);
    assert_eq!(body["default_milk_morning"], 0.0);

    let (status, body) = app
        .json(
            Method::POST,
            "/customers",
            Some(json!({"name": "   ", "default_milk_morning": -1.0})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Bad Request");
}

#[tokio::test]
async fn get_customer_by_id() {
    let app = TestApp::new().await;
    let id = app.create_customer("Raj", 1.0, 2.0).await;

    let (status, body) = app.json(Method::GET, &format!("/customers/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Raj");

    let (status, body) = app.json(Method::GET, "/customers/not-an-id", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid input: Invalid Customer ID format");

    let (status, body) = app
        .json(Method::GET, &format!("/customers/{}", Uuid::new_v4()), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Not found: Customer not found");
}

#[tokio::test]
async fn variation_upsert_keeps_one_record_with_latest_values() {
    let app = TestApp::new().await;
    let id = app.create_customer("Raj", 1.0, 2.0).await;

    let (status, body) = app
        .json(
            Method::POST,
            "/variations",
            Some(json!({
                "customer_id": id,
                "date": "2024-02-10",
                "morning_quantity": 3.0,
                "evening_quantity": 0.0,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Variation recorded successfully");

    app.log_variation(&id, "2024-02-10T00:00:00", 0.5, 0.5).await;

    let stored = DailyVariation::find()
        .count(app.state.db.as_ref())
        .await
        .expect("count");
    assert_eq!(stored, 1);

    let (_, summary) = app
        .json(
            Method::GET,
            &format!("/customers/{}/variations_summary?month=2&year=2024", id),
            None,
        )
        .await;
    assert_eq!(
        summary,
        json!([{
            "date": "2024-02-10",
            "morning": 0.5,
            "evening": 0.5,
            "total": 1.0,
            "default_morning": 1.0,
            "default_evening": 2.0,
        }])
    );
}

#[tokio::test]
async fn variation_errors() {
    let app = TestApp::new().await;
    let id = app.create_customer("Raj", 1.0, 2.0).await;

    let body = |customer_id: String, morning: f64| {
        json!({
            "customer_id": customer_id,
            "date": "2024-03-01",
            "morning_quantity": morning,
            "evening_quantity": 0.0,
        })
    };

    let (status, _) = app
        .json(Method::POST, "/variations", Some(body(Uuid::new_v4().to_string(), 1.0)))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, err) = app
        .json(Method::POST, "/variations", Some(body("abc".into(), 1.0)))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["message"], "Invalid input: Invalid Customer ID format");

    let (status, _) = app
        .json(Method::POST, "/variations", Some(body(id, -2.0)))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn oversized_quantities_and_prices_are_rejected() {
    let app = TestApp::new().await;
    let id = app.create_customer("Raj", 1.0, 2.0).await;

    for body in [
        json!({"name": "Whale", "default_milk_morning": 1e27, "price_per_liter": 1000.0}),
        json!({"name": "Whale", "default_milk_evening": 10_000.5}),
        json!({"name": "Whale", "price_per_liter": 1e9}),
    ] {
        let (status, _) = app.json(Method::POST, "/customers", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    let (status, _) = app
        .json(
            Method::POST,
            "/variations",
            Some(json!({
                "customer_id": id,
                "date": "2024-02-10",
                "morning_quantity": 1e27,
                "evening_quantity": 0.0,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // the cap itself is accepted and bills without overflow
    app.log_variation(&id, "2024-02-10", 10_000.0, 10_000.0).await;
    let (status, bill) = app
        .json(
            Method::GET,
            &format!("/customers/{}/bill?month=2&year=2024", id),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bill["total_liters"], 20_084.0);
}

#[tokio::test]
async fn unreachable_database_is_reported_as_unavailable() {
    let app = TestApp::unreachable_database().await;

    let (status, body) = app.json(Method::GET, "/customers", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["message"], "Service unavailable: Database unavailable");

    let (status, _) = app.json(Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn monthly_sheet_for_a_past_month() {
    let app = TestApp::new().await;
    let id = app.create_customer("Raj", 1.0, 2.0).await;
    app.log_variation(&id, "2024-02-02", 0.0, 0.0).await;
    app.log_variation(&id, "2024-02-03", 2.5, 2.0).await;

    let (status, body) = app
        .json(
            Method::GET,
            &format!("/customers/{}/monthly_sheet?month=2&year=2024", id),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let rows = body["sheet_data"].as_array().expect("rows");
    assert_eq!(rows.len(), 29);
    assert_eq!(
        rows[0],
        json!({"Date": "2024-02-01", "Morning (L)": 1.0, "Evening (L)": 2.0, "Daily Total (L)": 3.0})
    );
    assert_eq!(rows[1]["Daily Total (L)"], 0.0);
    assert_eq!(rows[2]["Daily Total (L)"], 4.5);

    // 27 default days of 3L plus 0 and 4.5
    assert_eq!(
        body["totals"],
        json!({
            "total_morning": 29.5,
            "total_evening": 56.0,
            "grand_total_liters": 85.5,
            "amount_due": 5130.0,
        })
    );
}

#[tokio::test]
async fn current_month_sheet_stops_at_today_but_bill_does_not() {
    let app = TestApp::new().await;
    let id = app.create_customer("Raj", 1.0, 1.0).await;

    let (_, sheet) = app
        .json(
            Method::GET,
            &format!("/customers/{}/monthly_sheet?month=3&year=2024", id),
            None,
        )
        .await;
    assert_eq!(sheet["sheet_data"].as_array().expect("rows").len(), 15);
    assert_eq!(sheet["totals"]["grand_total_liters"], 30.0);
    assert_eq!(sheet["totals"]["amount_due"], 1800.0);

    let (status, bill) = app
        .json(
            Method::GET,
            &format!("/customers/{}/bill?month=3&year=2024", id),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        bill,
        json!({
            "customer_name": "Raj",
            "month": 3,
            "year": 2024,
            "total_liters": 62.0,
            "amount_due": 3720.0,
        })
    );
}

#[tokio::test]
async fn summary_lists_only_variation_days_of_the_month() {
    let app = TestApp::new().await;
    let id = app.create_customer("Raj", 1.0, 2.0).await;
    app.log_variation(&id, "2024-03-20", 2.0, 2.0).await;
    app.log_variation(&id, "2024-03-05", 0.0, 0.0).await;
    app.log_variation(&id, "2024-04-01", 9.0, 9.0).await;

    let (status, body) = app
        .json(
            Method::GET,
            &format!("/customers/{}/variations_summary?month=3&year=2024", id),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let dates: Vec<_> = body
        .as_array()
        .expect("array")
        .iter()
        .map(|item| item["date"].as_str().expect("date").to_string())
        .collect();
    assert_eq!(dates, vec!["2024-03-05", "2024-03-20"]);
}

#[tokio::test]
async fn report_queries_are_validated() {
    let app = TestApp::new().await;
    let id = app.create_customer("Raj", 1.0, 2.0).await;

    let (status, _) = app
        .json(
            Method::GET,
            &format!("/customers/{}/bill?month=13&year=2024", id),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let response = app
        .request(Method::GET, &format!("/customers/{}/bill", id), None)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let (status, _) = app
        .json(
            Method::GET,
            &format!("/customers/{}/monthly_sheet?month=1&year=2024", Uuid::new_v4()),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn errors_echo_the_request_id() {
    let app = TestApp::new().await;

    let response = app
        .request_with_headers(
            Method::GET,
            &format!("/customers/{}", Uuid::new_v4()),
            None,
            &[("x-request-id", "req-dairy-1")],
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok()),
        Some("req-dairy-1")
    );

    let body = response_json(response).await;
    assert_eq!(body["request_id"], "req-dairy-1");
    assert!(body["timestamp"].is_string());

    let mut keys: Vec<_> = body.as_object().expect("object").keys().cloned().collect();
    keys.sort();
    assert_eq!(keys, ["error", "message", "request_id", "timestamp"]);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = TestApp::new().await;
    let (status, body) = app.json(Method::GET, "/api-docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/customers/{id}/monthly_sheet"].is_object());
}
