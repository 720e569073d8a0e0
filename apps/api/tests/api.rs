//! End-to-end tests of the HTTP layer against an in-memory database.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use tally_api::{build_router, ApiConfig, AppState};
use tally_db::{Database, DbConfig};

async fn app() -> Router {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    build_router(Arc::new(AppState::new(db, ApiConfig::default())))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn upload(app: &Router, uri: &str, csv: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "text/csv")
        .body(Body::from(csv.to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn id(value: &Value) -> String {
    value["id"].as_str().unwrap().to_string()
}

struct Fixture {
    doc_type_id: String,
    pos_id: String,
    client_id: String,
    method_id: String,
    term_id: String,
}

/// Company, current year 2024 and one of each master record.
async fn fixture(app: &Router) -> Fixture {
    let (status, _) = send(
        app,
        Method::POST,
        "/api/company",
        Some(json!({
            "tax_number": "30111111118",
            "name": "Tally Test SA",
            "address": "Main St 100",
            "email": "office@tally.test",
            "phone": "1144445555",
            "creation_date": "2020-03-01",
            "closing_date": "2020-12-31"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(
        app,
        Method::POST,
        "/api/years",
        Some(json!({ "year": "2024", "current": true })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, doc_type) = send(
        app,
        Method::POST,
        "/api/document_types",
        Some(json!({ "code": "1", "type": "FA", "description": "Factura A", "hide": false })),
    )
    .await;
    let (_, pos) = send(
        app,
        Method::POST,
        "/api/points_of_sell",
        Some(json!({ "pos_number": "1" })),
    )
    .await;
    let (_, client) = send(
        app,
        Method::POST,
        "/api/clients",
        Some(json!({
            "tax_number": "20111111112",
            "name": "Acme",
            "address": "Side St 5",
            "email": "contact@acme.test",
            "phone": "1155556666"
        })),
    )
    .await;
    let (_, methods) = send(
        app,
        Method::POST,
        "/api/payment_conditions/methods",
        Some(json!({ "name": "Cash" })),
    )
    .await;
    let (_, terms) = send(
        app,
        Method::POST,
        "/api/payment_conditions/terms",
        Some(json!([{ "days": "30" }, { "days": "60" }])),
    )
    .await;
    assert_eq!(terms.as_array().unwrap().len(), 2);

    Fixture {
        doc_type_id: id(&doc_type),
        pos_id: id(&pos),
        client_id: id(&client),
        method_id: id(&methods[0]),
        term_id: id(&terms[0]),
    }
}

fn invoice_body(fx: &Fixture, number: &str, issue_date: &str, taxable: i64) -> Value {
    json!({
        "issue_date": issue_date,
        "doc_type_id": fx.doc_type_id,
        "point_of_sale_id": fx.pos_id,
        "number": number,
        "recipient_id": fx.client_id,
        "payment_method_id": fx.method_id,
        "payment_term_id": fx.term_id,
        "lines": [{ "description": "Consulting", "taxable_cents": taxable, "vat_cents": 0 }]
    })
}

#[tokio::test]
async fn test_health() {
    let app = app().await;
    let (status, body) = send(&app, Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_company_is_a_singleton() {
    let app = app().await;
    let (status, body) = send(&app, Method::GET, "/api/company", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    fixture(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/company",
        Some(json!({
            "tax_number": "30222222229",
            "name": "Other SA",
            "address": "Elsewhere 1",
            "email": "other@tally.test",
            "phone": "1100000000",
            "creation_date": "2021-01-01",
            "closing_date": "2021-12-31"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "An instance of Company already exists");

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/company/periods?kind=calendar&year=2024",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["current"]["start"], "2024-01-01");
    assert_eq!(body["previous"]["end"], "2023-12-31");
}

#[tokio::test]
async fn test_client_crud_and_conflicts() {
    let app = app().await;
    fixture(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/clients",
        Some(json!({
            "tax_number": "20111111112",
            "name": "Acme again",
            "address": "Side St 6",
            "email": "again@acme.test",
            "phone": "1155557777"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "DUPLICATE");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/clients",
        Some(json!({ "tax_number": "20-333", "name": "Bad", "email": "nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|e| e["field"].as_str())
        .collect();
    assert!(fields.contains(&"tax_number"));
    assert!(fields.contains(&"email"));

    let (_, list) = send(&app, Method::GET, "/api/clients?search=acm", None).await;
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, body) = send(&app, Method::DELETE, "/api/clients", Some(json!({ "ids": [] }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No IDs provided");

    let (status, _) = send(&app, Method::GET, "/api/suppliers/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invoice_and_receipt_flow() {
    let app = app().await;
    let fx = fixture(&app).await;

    let (status, invoice) = send(
        &app,
        Method::POST,
        "/api/sale_invoices",
        Some(invoice_body(&fx, "1", "2024-03-10", 10_000)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(invoice["number"], "00000001");
    let invoice_id = id(&invoice);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/sale_invoices",
        Some(invoice_body(&fx, "2", "2024-03-01", 5_000)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Issue date can't be older than previous invoice.");

    let uri = format!(
        "/api/sale_invoices/next_number?doc_type_id={}&point_of_sale_id={}",
        fx.doc_type_id, fx.pos_id
    );
    let (_, next) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(next["number"], "00000002");

    let (status, list) = send(
        &app,
        Method::GET,
        "/api/sale_invoices?collected=uncollected&fields=id,label",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list, json!([{ "id": invoice_id, "label": "FA 00001-00000001" }]));

    let receipt = |number: &str, total: i64| {
        json!({
            "issue_date": "2024-03-15",
            "point_of_sale_id": fx.pos_id,
            "number": number,
            "related_invoice_id": invoice_id,
            "total_cents": total
        })
    };

    let (status, body) = send(&app, Method::POST, "/api/sale_receipts", Some(receipt("1", 20_000))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Receipt total amount cannot be higher than invoice total amount."
    );

    let (status, created) = send(&app, Method::POST, "/api/sale_receipts", Some(receipt("1", 10_000))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["recipient_id"], fx.client_id.as_str());

    let (_, detail) = send(&app, Method::GET, &format!("/api/sale_invoices/{}", invoice_id), None).await;
    assert_eq!(detail["collected"], true);

    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/api/sale_invoices/{}", invoice_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body["message"],
        "The invoice you're trying to delete has related receipts."
    );

    let (_, dashboard) = send(&app, Method::GET, "/api/dashboard", None).await;
    assert_eq!(dashboard["amount_to_collect_cents"], 0);
    assert_eq!(dashboard["last_receipt"]["label"], "00001-00000001");

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/sale_receipts/{}", id(&created)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, account) = send(
        &app,
        Method::GET,
        &format!("/api/clients/{}/account", fx.client_id),
        None,
    )
    .await;
    assert_eq!(account["balance_cents"], 10_000);
}

#[tokio::test]
async fn test_huge_invoice_amount_is_a_validation_error() {
    let app = app().await;
    let fx = fixture(&app).await;

    let mut body = invoice_body(&fx, "1", "2024-03-01", 0);
    body["lines"] = json!([
        { "description": "Huge", "taxable_cents": i64::MAX, "vat_cents": 1 }
    ]);
    let (status, body) = send(&app, Method::POST, "/api/sale_invoices", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["errors"][0]["field"], "taxable_amount");

    let (_, list) = send(&app, Method::GET, "/api/sale_invoices", None).await;
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_import_is_all_or_nothing() {
    let app = app().await;
    fixture(&app).await;

    let csv = "tax_number,name,address,email,phone\n\
               20444444445,Globex,Road 1,info@globex.test,1133334444\n\
               20111111112,Acme twin,Road 2,twin@acme.test,1133335555\n";
    let (status, body) = upload(&app, "/api/import/clients?filename=clients.csv", csv).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "IMPORT_REJECTED");
    assert_eq!(body["errors"].as_array().unwrap().len(), 1);

    let (_, list) = send(&app, Method::GET, "/api/clients", None).await;
    assert_eq!(list.as_array().unwrap().len(), 1);

    let csv = "tax_number,name,address,email,phone\n\
               20444444445,Globex,Road 1,info@globex.test,1133334444\n";
    let (status, summary) = upload(&app, "/api/import/clients?filename=clients.csv", csv).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(summary["kind"], "clients");
    assert_eq!(summary["created"], 1);

    let (status, body) = upload(&app, "/api/import/clients?filename=clients.xlsx", csv).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "clients.xlsx is a spreadsheet workbook; export it as CSV and upload it again."
    );
}

#[tokio::test]
async fn test_journal_entry_must_balance() {
    let app = app().await;

    let (_, category) = send(
        &app,
        Method::POST,
        "/api/bookkeeping/categories",
        Some(json!({ "code": "1", "name": "Assets" })),
    )
    .await;
    let mut accounts = Vec::new();
    for (code, name) in [("101", "Cash"), ("102", "Banks")] {
        let (status, account) = send(
            &app,
            Method::POST,
            "/api/bookkeeping/accounts",
            Some(json!({ "code": code, "name": name, "category_id": id(&category) })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        accounts.push(id(&account));
    }

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/bookkeeping/entries",
        Some(json!({
            "date": "2024-05-02",
            "lines": [
                { "account_id": accounts[0], "debit_cents": 1_000 },
                { "account_id": accounts[1], "credit_cents": 1_000 }
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["errors"][0]["field"], "description");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/bookkeeping/entries",
        Some(json!({
            "date": "2024-05-02",
            "description": "Deposit",
            "lines": [
                { "account_id": accounts[0], "debit_cents": 1_000 },
                { "account_id": accounts[1], "credit_cents": 900 }
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Debit must be equal to credit");

    let (status, entry) = send(
        &app,
        Method::POST,
        "/api/bookkeeping/entries",
        Some(json!({
            "date": "2024-05-02",
            "description": "Deposit",
            "lines": [
                { "account_id": accounts[1], "debit_cents": 1_000 },
                { "account_id": accounts[0], "credit_cents": 1_000 }
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(entry["number"], 1);
    assert_eq!(entry["locked"], true);
}
