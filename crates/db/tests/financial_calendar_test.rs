//! Integration tests for the financial calendar repository.

mod common;

use chrono::NaiveDate;
use probill_db::repositories::financial_year::{
    CreateFinancialYearInput, FinancialYearError, FinancialYearRepository,
    UpdateFinancialYearInput,
};

use common::{connect, create_company, ctx, unique};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn test_create_year_generates_monthly_periods() {
    let db = connect().await;
    let company_id = create_company(&db).await;
    let repo = FinancialYearRepository::new(db.clone());

    let created = repo
        .create(
            &ctx(),
            CreateFinancialYearInput {
                company_id,
                name: unique("FY 2024-25"),
                start_date: date(2024, 4, 1),
                end_date: Some(date(2025, 3, 31)),
            },
        )
        .await
        .expect("Failed to create financial year");

    assert_eq!(created.periods.len(), 12);
    assert_eq!(created.periods[0].name, "April 2024");
    assert_eq!(created.periods[0].period_no, 1);
    assert_eq!(created.periods[0].start_date, date(2024, 4, 1));
    assert_eq!(created.periods[0].end_date, date(2024, 4, 30));
    assert_eq!(created.periods[11].name, "March 2025");
    assert_eq!(created.periods[11].end_date, date(2025, 3, 31));
}

#[tokio::test]
async fn test_overlapping_year_rejected() {
    let db = connect().await;
    let company_id = create_company(&db).await;
    let repo = FinancialYearRepository::new(db.clone());

    repo.create(
        &ctx(),
        CreateFinancialYearInput {
            company_id,
            name: unique("FY 2024-25"),
            start_date: date(2024, 4, 1),
            end_date: Some(date(2025, 3, 31)),
        },
    )
    .await
    .expect("Failed to create financial year");

    // A range fully inside the existing year must be rejected.
    let result = repo
        .create(
            &ctx(),
            CreateFinancialYearInput {
                company_id,
                name: unique("FY overlap"),
                start_date: date(2024, 10, 1),
                end_date: Some(date(2025, 1, 1)),
            },
        )
        .await;

    assert!(matches!(
        result,
        Err(FinancialYearError::OverlappingYear(_))
    ));
}

#[tokio::test]
async fn test_overlap_is_scoped_to_company() {
    let db = connect().await;
    let company_a = create_company(&db).await;
    let company_b = create_company(&db).await;
    let repo = FinancialYearRepository::new(db.clone());

    let input = |company_id| CreateFinancialYearInput {
        company_id,
        name: unique("FY 2024-25"),
        start_date: date(2024, 4, 1),
        end_date: Some(date(2025, 3, 31)),
    };

    repo.create(&ctx(), input(company_a))
        .await
        .expect("Failed to create year for company A");

    // The identical range is fine for another company.
    repo.create(&ctx(), input(company_b))
        .await
        .expect("Same range must be allowed for a different company");
}

#[tokio::test]
async fn test_invalid_range_rejected() {
    let db = connect().await;
    let company_id = create_company(&db).await;
    let repo = FinancialYearRepository::new(db.clone());

    let result = repo
        .create(
            &ctx(),
            CreateFinancialYearInput {
                company_id,
                name: unique("FY bad"),
                start_date: date(2025, 3, 31),
                end_date: Some(date(2024, 4, 1)),
            },
        )
        .await;

    assert!(matches!(result, Err(FinancialYearError::InvalidDateRange)));
}

#[tokio::test]
async fn test_date_change_regenerates_periods() {
    let db = connect().await;
    let company_id = create_company(&db).await;
    let repo = FinancialYearRepository::new(db.clone());

    let created = repo
        .create(
            &ctx(),
            CreateFinancialYearInput {
                company_id,
                name: unique("FY 2024-25"),
                start_date: date(2024, 4, 1),
                end_date: Some(date(2025, 3, 31)),
            },
        )
        .await
        .expect("Failed to create financial year");
    let old_period_ids: Vec<i64> = created.periods.iter().map(|p| p.id).collect();

    // Shrink the year to six months; periods must be rebuilt.
    let updated = repo
        .update(
            &ctx(),
            created.year.id,
            UpdateFinancialYearInput {
                end_date: Some(date(2024, 9, 30)),
                ..Default::default()
            },
        )
        .await
        .expect("Failed to update financial year");

    assert_eq!(updated.periods.len(), 6);
    assert_eq!(updated.periods[5].name, "September 2024");
    for period in &updated.periods {
        assert!(
            !old_period_ids.contains(&period.id),
            "old periods must be deleted, not reused"
        );
    }
}

#[tokio::test]
async fn test_name_only_update_keeps_periods() {
    let db = connect().await;
    let company_id = create_company(&db).await;
    let repo = FinancialYearRepository::new(db.clone());

    let created = repo
        .create(
            &ctx(),
            CreateFinancialYearInput {
                company_id,
                name: unique("FY 2024-25"),
                start_date: date(2024, 4, 1),
                end_date: Some(date(2025, 3, 31)),
            },
        )
        .await
        .expect("Failed to create financial year");
    let old_period_ids: Vec<i64> = created.periods.iter().map(|p| p.id).collect();

    let updated = repo
        .update(
            &ctx(),
            created.year.id,
            UpdateFinancialYearInput {
                name: Some(unique("FY renamed")),
                ..Default::default()
            },
        )
        .await
        .expect("Failed to update financial year");

    let new_period_ids: Vec<i64> = updated.periods.iter().map(|p| p.id).collect();
    assert_eq!(old_period_ids, new_period_ids);
}

#[tokio::test]
async fn test_update_missing_year_not_found() {
    let db = connect().await;
    let repo = FinancialYearRepository::new(db.clone());

    let result = repo
        .update(&ctx(), i64::MAX, UpdateFinancialYearInput::default())
        .await;

    assert!(matches!(result, Err(FinancialYearError::NotFound(_))));
}

#[tokio::test]
async fn test_delete_year_cascades_periods() {
    let db = connect().await;
    let company_id = create_company(&db).await;
    let repo = FinancialYearRepository::new(db.clone());

    let created = repo
        .create(
            &ctx(),
            CreateFinancialYearInput {
                company_id,
                name: unique("FY 2024-25"),
                start_date: date(2024, 4, 1),
                end_date: Some(date(2025, 3, 31)),
            },
        )
        .await
        .expect("Failed to create financial year");

    repo.delete(created.year.id)
        .await
        .expect("Failed to delete financial year");

    assert!(repo.find_by_id(created.year.id).await.unwrap().is_none());
    assert!(matches!(
        repo.delete(created.year.id).await,
        Err(FinancialYearError::NotFound(_))
    ));
}
