//! # Route Table
//!
//! ```text
//! /api
//! ├── /health
//! ├── /company                 GET POST PUT, /periods
//! ├── /years                   list create, /current, /:id
//! ├── /clients, /suppliers     list create bulk-delete, /:id, /:id/account
//! ├── /payment_conditions      /methods, /terms
//! ├── /points_of_sell          list create, /:id
//! ├── /document_types          list create, /:id
//! ├── /sale_invoices           list create, /next_number, /:id
//! ├── /sale_receipts           list create, /next_number, /:id
//! ├── /purchase_invoices       list create, /:id
//! ├── /purchase_receipts       list create, /:id
//! ├── /bookkeeping             /categories, /accounts, /entries
//! ├── /import/:kind            POST raw CSV body
//! └── /dashboard
//! ```

pub mod bookkeeping;
pub mod company;
pub mod dashboard;
pub mod document_types;
pub mod health;
pub mod import;
pub mod payment_conditions;
pub mod persons;
pub mod points_of_sell;
pub mod purchases;
pub mod sale_invoices;
pub mod sale_receipts;
pub mod years;

use axum::routing::get;
use axum::Router;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tally_core::PersonKind;

use crate::error::{ApiError, ApiResult};

/// Every route under `/api`.
pub fn api_router() -> Router {
    Router::new()
        .route("/health", get(health::healthcheck))
        .nest("/company", company::router())
        .nest("/years", years::router())
        .nest("/clients", persons::router(PersonKind::Client))
        .nest("/suppliers", persons::router(PersonKind::Supplier))
        .nest("/payment_conditions", payment_conditions::router())
        .nest("/points_of_sell", points_of_sell::router())
        .nest("/document_types", document_types::router())
        .nest("/sale_invoices", sale_invoices::router())
        .nest("/sale_receipts", sale_receipts::router())
        .nest("/purchase_invoices", purchases::invoice_router())
        .nest("/purchase_receipts", purchases::receipt_router())
        .nest("/bookkeeping", bookkeeping::router())
        .nest("/import", import::router())
        .route("/dashboard", get(dashboard::summary))
}

/// Turns a repository `Option` into a 404.
pub(crate) fn found<T>(value: Option<T>, entity: &str, id: &str) -> ApiResult<T> {
    value.ok_or_else(|| ApiError::not_found(entity, id))
}

/// Body of bulk deletes.
#[derive(Debug, Deserialize)]
pub struct IdList {
    #[serde(default)]
    pub ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub deleted: usize,
}

/// `?fields=a,b` keeps only the named keys of each object.
#[derive(Debug, Default, Deserialize)]
pub struct Projection {
    pub fields: Option<String>,
}

impl Projection {
    pub fn apply<T: Serialize>(&self, value: &T) -> ApiResult<Value> {
        let value = serde_json::to_value(value)
            .map_err(|e| ApiError::internal(format!("Serialization failed: {}", e)))?;

        let fields: Vec<&str> = match self.fields.as_deref() {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .collect(),
            None => return Ok(value),
        };
        if fields.is_empty() {
            return Ok(value);
        }

        Ok(match value {
            Value::Array(items) => Value::Array(
                items
                    .into_iter()
                    .map(|item| keep_fields(item, &fields))
                    .collect(),
            ),
            other => keep_fields(other, &fields),
        })
    }
}

fn keep_fields(value: Value, fields: &[&str]) -> Value {
    match value {
        Value::Object(mut map) => {
            map.retain(|key, _| fields.contains(&key.as_str()));
            Value::Object(map)
        }
        other => other,
    }
}

/// One object or an array of them in the same request body.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}
