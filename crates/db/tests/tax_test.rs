//! Integration tests for the tax master repository.

mod common;

use probill_db::entities::sea_orm_active_enums::SupplyScope;
use probill_db::repositories::tax::{TaxError, TaxInput, TaxRepository};
use rust_decimal_macros::dec;

use common::{connect, create_company, ctx, unique};

#[tokio::test]
async fn test_create_gst_derives_three_slabs() {
    let db = connect().await;
    let company_id = create_company(&db).await;
    let repo = TaxRepository::new(db.clone());

    let created = repo
        .create(
            &ctx(),
            TaxInput {
                company_id,
                tax_type: "GST".to_string(),
                name: unique("GST 18"),
                rate: dec!(18),
                is_active: true,
            },
        )
        .await
        .expect("Failed to create tax");

    assert_eq!(created.details.len(), 3);
    assert_eq!(created.details[0].supply, SupplyScope::Inter);
    assert_eq!(created.details[0].slab_name, "IGST 18%");
    assert_eq!(created.details[0].rate, dec!(18));
    assert_eq!(created.details[1].supply, SupplyScope::Intra);
    assert_eq!(created.details[1].rate, dec!(9));
    assert_eq!(created.details[2].supply, SupplyScope::Intra);
    assert_eq!(created.details[2].rate, dec!(9));
}

#[tokio::test]
async fn test_duplicate_name_rejected_per_company() {
    let db = connect().await;
    let company_id = create_company(&db).await;
    let other_company = create_company(&db).await;
    let repo = TaxRepository::new(db.clone());

    let name = unique("GST 12");
    let input = |company_id| TaxInput {
        company_id,
        tax_type: "GST".to_string(),
        name: name.clone(),
        rate: dec!(12),
        is_active: true,
    };

    repo.create(&ctx(), input(company_id))
        .await
        .expect("Failed to create tax");

    let result = repo.create(&ctx(), input(company_id)).await;
    assert!(matches!(result, Err(TaxError::DuplicateName(_))));

    // The same name is fine for a different company.
    repo.create(&ctx(), input(other_company))
        .await
        .expect("Same name must be allowed for a different company");
}

#[tokio::test]
async fn test_rate_update_regenerates_details() {
    let db = connect().await;
    let company_id = create_company(&db).await;
    let repo = TaxRepository::new(db.clone());

    let created = repo
        .create(
            &ctx(),
            TaxInput {
                company_id,
                tax_type: "GST".to_string(),
                name: unique("GST 18"),
                rate: dec!(18),
                is_active: true,
            },
        )
        .await
        .expect("Failed to create tax");
    let old_detail_ids: Vec<i64> = created.details.iter().map(|d| d.id).collect();

    let updated = repo
        .update(
            &ctx(),
            created.header.id,
            TaxInput {
                company_id,
                tax_type: "GST".to_string(),
                name: created.header.name.clone(),
                rate: dec!(12),
                is_active: true,
            },
        )
        .await
        .expect("Failed to update tax");

    assert_eq!(updated.details.len(), 3);
    assert_eq!(updated.details[0].slab_name, "IGST 12%");
    assert_eq!(updated.details[0].rate, dec!(12));
    assert_eq!(updated.details[1].rate, dec!(6));
    assert_eq!(updated.details[2].rate, dec!(6));
    for detail in &updated.details {
        assert!(
            !old_detail_ids.contains(&detail.id),
            "old 18/9/9 rows must be gone"
        );
    }
}

#[tokio::test]
async fn test_non_gst_type_has_no_details() {
    let db = connect().await;
    let company_id = create_company(&db).await;
    let repo = TaxRepository::new(db.clone());

    let created = repo
        .create(
            &ctx(),
            TaxInput {
                company_id,
                tax_type: "VAT".to_string(),
                name: unique("VAT 5"),
                rate: dec!(5),
                is_active: true,
            },
        )
        .await
        .expect("Failed to create tax");

    assert!(created.details.is_empty());
}

#[tokio::test]
async fn test_delete_tax_removes_details() {
    let db = connect().await;
    let company_id = create_company(&db).await;
    let repo = TaxRepository::new(db.clone());

    let created = repo
        .create(
            &ctx(),
            TaxInput {
                company_id,
                tax_type: "GST".to_string(),
                name: unique("GST 28"),
                rate: dec!(28),
                is_active: true,
            },
        )
        .await
        .expect("Failed to create tax");

    repo.delete(created.header.id)
        .await
        .expect("Failed to delete tax");

    assert!(repo.find_by_id(created.header.id).await.unwrap().is_none());
    assert!(matches!(
        repo.delete(created.header.id).await,
        Err(TaxError::NotFound(_))
    ));
}
