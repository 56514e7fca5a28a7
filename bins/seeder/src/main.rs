//! Database seeder for ProBill development and testing.
//!
//! Seeds a demo user, company, units, GST taxes and the current financial
//! year for local development. Safe to re-run: existing records are
//! skipped.
//!
//! Usage: cargo run --bin seeder

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use probill_core::auth::hash_password;
use probill_core::context::RequestContext;
use probill_db::repositories::company::{CompanyRepository, CreateCompanyInput};
use probill_db::repositories::financial_year::{
    CreateFinancialYearInput, FinancialYearRepository,
};
use probill_db::repositories::tax::{TaxInput, TaxRepository};
use probill_db::repositories::uom::{UomInput, UomRepository};
use probill_db::repositories::user::UserRepository;
use probill_shared::types::ListQuery;

const SEED_ACTOR: &str = "seeder@probill.dev";
const DEMO_COMPANY_CODE: &str = "DEMO";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = probill_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    let ctx = RequestContext::new(SEED_ACTOR);

    println!("Seeding demo user...");
    seed_user(&db).await;

    println!("Seeding demo company...");
    let company_id = seed_company(&db, &ctx).await;

    println!("Seeding units of measure...");
    seed_uoms(&db, &ctx, company_id).await;

    println!("Seeding GST taxes...");
    seed_taxes(&db, &ctx, company_id).await;

    println!("Seeding financial year...");
    seed_financial_year(&db, &ctx, company_id).await;

    println!("Seeding complete!");
}

async fn seed_user(db: &sea_orm::DatabaseConnection) {
    let repo = UserRepository::new(db.clone());

    if repo
        .find_by_email("demo@probill.dev")
        .await
        .expect("Failed to query users")
        .is_some()
    {
        println!("  Demo user already exists, skipping...");
        return;
    }

    let password_hash = hash_password("probill-demo").expect("Failed to hash password");
    repo.create(
        "demo@probill.dev".to_string(),
        password_hash,
        "Demo User".to_string(),
    )
    .await
    .expect("Failed to seed user");
    println!("  Created demo user: demo@probill.dev / probill-demo");
}

async fn seed_company(
    db: &sea_orm::DatabaseConnection,
    ctx: &RequestContext,
) -> i64 {
    let repo = CompanyRepository::new(db.clone());

    let (_, existing) = repo
        .list(ListQuery::default())
        .await
        .expect("Failed to list companies");
    if let Some(company) = existing.iter().find(|c| c.code == DEMO_COMPANY_CODE) {
        println!("  Demo company already exists, skipping...");
        return company.id;
    }

    let company = repo
        .create(
            ctx,
            CreateCompanyInput {
                name: "Demo Trading Co.".to_string(),
                code: DEMO_COMPANY_CODE.to_string(),
                address: Some("42 Market Street, Mumbai".to_string()),
                phone: Some("+91-22-5550-1234".to_string()),
                email: Some("accounts@demo-trading.example".to_string()),
                contact_person: Some("A. Merchant".to_string()),
                gst_no: Some("27AAAPL1234C1ZV".to_string()),
                currency_id: None,
            },
        )
        .await
        .expect("Failed to seed company");
    company.id
}

async fn seed_uoms(db: &sea_orm::DatabaseConnection, ctx: &RequestContext, company_id: i64) {
    let repo = UomRepository::new(db.clone());

    for (name, code) in [("Piece", "PCS"), ("Kilogram", "KG"), ("Litre", "LTR")] {
        let result = repo
            .create(
                ctx,
                UomInput {
                    company_id,
                    name: name.to_string(),
                    code: code.to_string(),
                    is_active: true,
                },
            )
            .await;

        match result {
            Ok(_) => println!("  Created UOM {code}"),
            Err(probill_db::repositories::uom::UomError::DuplicateCode(_)) => {
                println!("  UOM {code} already exists, skipping...");
            }
            Err(e) => panic!("Failed to seed UOM {code}: {e}"),
        }
    }
}

async fn seed_taxes(db: &sea_orm::DatabaseConnection, ctx: &RequestContext, company_id: i64) {
    let repo = TaxRepository::new(db.clone());

    for (name, rate) in [
        ("GST 5", dec!(5)),
        ("GST 12", dec!(12)),
        ("GST 18", dec!(18)),
        ("GST 28", dec!(28)),
    ] {
        let result = repo
            .create(
                ctx,
                TaxInput {
                    company_id,
                    tax_type: "GST".to_string(),
                    name: name.to_string(),
                    rate,
                    is_active: true,
                },
            )
            .await;

        match result {
            Ok(_) => println!("  Created tax {name}"),
            Err(probill_db::repositories::tax::TaxError::DuplicateName(_)) => {
                println!("  Tax {name} already exists, skipping...");
            }
            Err(e) => panic!("Failed to seed tax {name}: {e}"),
        }
    }
}

async fn seed_financial_year(
    db: &sea_orm::DatabaseConnection,
    ctx: &RequestContext,
    company_id: i64,
) {
    let repo = FinancialYearRepository::new(db.clone());

    let result = repo
        .create(
            ctx,
            CreateFinancialYearInput {
                company_id,
                name: "FY 2025-26".to_string(),
                start_date: NaiveDate::from_ymd_opt(2025, 4, 1).expect("valid date"),
                end_date: None,
            },
        )
        .await;

    match result {
        Ok(created) => println!("  Created FY 2025-26 with {} periods", created.periods.len()),
        Err(probill_db::repositories::financial_year::FinancialYearError::OverlappingYear(_)) => {
            println!("  FY 2025-26 already exists, skipping...");
        }
        Err(e) => panic!("Failed to seed financial year: {e}"),
    }
}
