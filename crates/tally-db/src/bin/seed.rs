//! # Seed Data Generator
//!
//! Populates an empty database with a demo ledger for development.
//!
//! ## Usage
//! ```bash
//! # 20 clients with invoices and receipts (default)
//! cargo run -p tally-db --bin seed
//!
//! # Custom amount
//! cargo run -p tally-db --bin seed -- --clients 200
//!
//! # Specify database path
//! cargo run -p tally-db --bin seed -- --db ./data/tally.db
//! ```
//!
//! ## Generated Records
//! - Company, and the current calendar year as current financial year
//! - Document types FA/FB/NC, points of sale 1 and 2
//! - Payment methods and terms
//! - Clients and suppliers
//! - One invoice per client, receipts settling every other invoice
//! - A small chart of accounts

use anyhow::Context;
use chrono::{Datelike, NaiveDate, Utc};
use std::env;
use tracing_subscriber::EnvFilter;

use tally_core::{
    ChartAccountInput, ChartCategoryInput, CompanyInput, DocumentTypeInput, FinancialYearInput,
    InvoiceLineInput, PaymentMethodInput, PaymentTermInput, PersonInput, PointOfSaleInput,
    SaleInvoiceInput, SaleReceiptInput,
};
use tally_db::{Database, DbConfig};

const DOCUMENT_TYPES: &[(&str, &str, &str)] = &[
    ("1", "FA", "Factura A"),
    ("6", "FB", "Factura B"),
    ("3", "NC", "Nota de credito A"),
];

const PAYMENT_METHODS: &[&str] = &["Cash", "Bank transfer", "Cheque", "Credit card"];

const PAYMENT_TERMS: &[&str] = &["0", "15", "30", "60"];

const COMPANY_NAMES: &[&str] = &[
    "Acme", "Globex", "Initech", "Umbrella", "Hooli", "Stark", "Wayne", "Wonka", "Tyrell",
    "Cyberdyne",
];

const CHART: &[(&str, &str, &[(&str, &str)])] = &[
    ("1", "Assets", &[("101", "Cash"), ("102", "Banks"), ("110", "Receivables")]),
    ("2", "Liabilities", &[("201", "Payables"), ("210", "Taxes payable")]),
    ("4", "Income", &[("401", "Sales")]),
    ("5", "Expenses", &[("501", "Purchases"), ("510", "Rent")]),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Repository debug output with RUST_LOG=tally_db=debug
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();

    let mut clients: usize = 20;
    let mut db_path = String::from("./data/tally.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--clients" | "-c" => {
                if i + 1 < args.len() {
                    clients = args[i + 1].parse().unwrap_or(20);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Tally Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --clients <N>  Number of clients to generate (default: 20)");
                println!("  -d, --db <PATH>    Database file path (default: ./data/tally.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Tally Seed Data Generator");
    println!("=========================");
    println!("Database: {}", db_path);
    println!("Clients:  {}", clients);
    println!();

    let db = Database::new(DbConfig::new(&db_path))
        .await
        .with_context(|| format!("opening {}", db_path))?;
    println!("✓ Connected to database, migrations applied");

    if db.company().get().await?.is_some() {
        println!("⚠ The database already has a company.");
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let year = Utc::now().year();
    let company = db
        .company()
        .create(CompanyInput {
            tax_number: "30712345671".to_string(),
            name: "Tally Demo SA".to_string(),
            address: "Av. Corrientes 1234".to_string(),
            email: "admin@tally.demo".to_string(),
            phone: "1140001000".to_string(),
            creation_date: date(2015, 1, 1)?,
            closing_date: date(2015, 12, 31)?,
        })
        .await?;
    db.years()
        .create(FinancialYearInput {
            year: year.to_string(),
            current: true,
        })
        .await?;
    println!("✓ Company {} and financial year {}", company.name, year);

    let mut doc_types = Vec::new();
    for (code, doc_type, description) in DOCUMENT_TYPES {
        let created = db
            .document_types()
            .create(DocumentTypeInput {
                code: code.to_string(),
                doc_type: doc_type.to_string(),
                description: description.to_string(),
                hide: false,
            })
            .await?;
        doc_types.push(created);
    }

    let mut points = Vec::new();
    for number in ["1", "2"] {
        let point = db
            .points_of_sale()
            .create(PointOfSaleInput {
                pos_number: number.to_string(),
                disabled: false,
            })
            .await?;
        points.push(point);
    }

    let methods = db
        .payment_conditions()
        .create_methods(
            PAYMENT_METHODS
                .iter()
                .map(|name| PaymentMethodInput {
                    name: name.to_string(),
                })
                .collect(),
        )
        .await?;
    let terms = db
        .payment_conditions()
        .create_terms(
            PAYMENT_TERMS
                .iter()
                .map(|days| PaymentTermInput {
                    days: days.to_string(),
                })
                .collect(),
        )
        .await?;
    println!("✓ Document types, points of sale, payment conditions");

    for (category_code, category_name, accounts) in CHART {
        let category = db
            .bookkeeping()
            .create_category(ChartCategoryInput {
                code: category_code.to_string(),
                name: category_name.to_string(),
            })
            .await?;
        for (code, name) in accounts.iter() {
            db.bookkeeping()
                .create_account(ChartAccountInput {
                    code: code.to_string(),
                    name: name.to_string(),
                    category_id: category.id.clone(),
                    allocable: true,
                })
                .await?;
        }
    }
    println!("✓ Chart of accounts");

    for (index, name) in COMPANY_NAMES.iter().enumerate() {
        db.suppliers()
            .create(person(index, "27", &format!("{} Supplies", name)))
            .await?;
    }

    let start = std::time::Instant::now();
    let mut invoices = 0;
    let mut receipts = 0;

    for index in 0..clients {
        let name = format!(
            "{} {}",
            COMPANY_NAMES[index % COMPANY_NAMES.len()],
            index / COMPANY_NAMES.len() + 1
        );
        let client = db.clients().create(person(index, "20", &name)).await?;

        // One invoice per day from January 1st keeps the numbering in date order.
        let issue_date = NaiveDate::from_ymd_opt(year, 1, 1)
            .and_then(|d| d.checked_add_days(chrono::Days::new((index / 2) as u64)))
            .context("issue date out of range")?;
        let point = &points[index % points.len()];

        let taxable = 10_000 + (index as i64 * 1_731) % 90_000;
        let invoice = db
            .sale_invoices()
            .create(SaleInvoiceInput {
                issue_date,
                doc_type_id: doc_types[0].id.clone(),
                point_of_sale_id: point.id.clone(),
                number: (index / points.len() + 1).to_string(),
                recipient_id: client.id.clone(),
                payment_method_id: methods[index % methods.len()].id.clone(),
                payment_term_id: terms[index % terms.len()].id.clone(),
                lines: vec![InvoiceLineInput {
                    description: "Professional services".to_string(),
                    taxable_cents: taxable,
                    not_taxable_cents: 0,
                    vat_cents: taxable * 21 / 100,
                }],
            })
            .await?;
        invoices += 1;

        // Even indexes land on the first point of sale.
        if index % 2 == 0 {
            db.sale_receipts()
                .create(SaleReceiptInput {
                    issue_date,
                    point_of_sale_id: point.id.clone(),
                    number: (index / 2 + 1).to_string(),
                    related_invoice_id: invoice.id.clone(),
                    recipient_id: None,
                    description: "Payment in full".to_string(),
                    total_cents: invoice.total().cents(),
                })
                .await?;
            receipts += 1;
        }
    }

    println!(
        "✓ {} clients, {} invoices, {} receipts in {:?}",
        clients,
        invoices,
        receipts,
        start.elapsed()
    );

    let dashboard = db.dashboard().summary().await?;
    println!(
        "  Amount to collect: {}",
        tally_core::Money::from_cents(dashboard.amount_to_collect_cents)
    );

    println!();
    println!("✓ Seed complete!");
    Ok(())
}

fn date(year: i32, month: u32, day: u32) -> anyhow::Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day).context("invalid date")
}

fn person(index: usize, prefix: &str, name: &str) -> PersonInput {
    PersonInput {
        tax_number: format!("{}{:08}{}", prefix, 10_000_000 + index, index % 10),
        name: name.to_string(),
        address: format!("Calle {} {}", index + 1, 100 + index),
        email: format!("contact{}@example.com", index),
        phone: format!("11{:08}", 40_000_000 + index),
    }
}
