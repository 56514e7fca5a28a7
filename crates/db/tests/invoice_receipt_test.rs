//! Integration tests for invoice numbering, invoice CRUD, and receipt
//! allocation balance maintenance.

mod common;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use probill_db::entities::sea_orm_active_enums::SupplyScope;
use probill_db::repositories::invoice::{
    InvoiceHeaderInput, InvoiceLineInput, InvoiceRepository,
};
use probill_db::repositories::receipt::{
    AllocationInput, ReceiptError, ReceiptHeaderInput, ReceiptRepository,
};
use sea_orm::DatabaseConnection;

use common::{
    connect, create_company, create_customer, create_tax, create_uom, ctx, seeded_currency,
    unique,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn header_input(
    company_id: i64,
    customer_id: i64,
    currency_id: i64,
    invoice_date: NaiveDate,
    net_amount: Decimal,
) -> InvoiceHeaderInput {
    InvoiceHeaderInput {
        company_id,
        customer_id,
        invoice_date,
        reference_no: None,
        reference_date: None,
        currency_id,
        exchange_rate: dec!(1),
        supply_type: SupplyScope::Intra,
        remarks: None,
        gross_amount: net_amount,
        cgst_amount: Decimal::ZERO,
        sgst_amount: Decimal::ZERO,
        igst_amount: Decimal::ZERO,
        discount_amount: Decimal::ZERO,
        other_charges_added: Decimal::ZERO,
        other_charges_deducted: Decimal::ZERO,
        rounded_off: Decimal::ZERO,
        net_amount,
    }
}

fn line_input(product_id: i64, uom_id: i64, amount: Decimal) -> InvoiceLineInput {
    InvoiceLineInput {
        id: None,
        row_no: 1,
        product_id,
        uom_id,
        quantity: dec!(1),
        rate: amount,
        amount,
        discount_type: None,
        discount_value: Decimal::ZERO,
        tax_header_id: None,
        tax_rate: Decimal::ZERO,
        cgst_rate: Decimal::ZERO,
        sgst_rate: Decimal::ZERO,
        igst_rate: Decimal::ZERO,
        cgst_amount: Decimal::ZERO,
        sgst_amount: Decimal::ZERO,
        igst_amount: Decimal::ZERO,
        tax_amount: Decimal::ZERO,
        net_amount: amount,
    }
}

fn allocation_input(
    invoice_id: i64,
    invoice_date: NaiveDate,
    currency_id: i64,
    amount: Decimal,
) -> AllocationInput {
    AllocationInput {
        id: None,
        row_no: 1,
        invoice_header_id: invoice_id,
        invoice_date,
        invoice_amount: amount,
        currency_id,
        exchange_rate: dec!(1),
        allocated_amount: amount,
        commission_amount: Decimal::ZERO,
        tds_amount: Decimal::ZERO,
        net_amount: amount,
    }
}

fn receipt_input(
    company_id: i64,
    customer_id: i64,
    currency_id: i64,
    receipt_date: NaiveDate,
    amount: Decimal,
) -> ReceiptHeaderInput {
    ReceiptHeaderInput {
        company_id,
        customer_id,
        receipt_date,
        receipt_type: "Against Invoice".to_string(),
        payment_mode: "Bank".to_string(),
        currency_id,
        exchange_rate: dec!(1),
        receipt_amount: amount,
        total_receipt_amount: amount,
        transaction_no: None,
        transaction_date: None,
        cheque_no: None,
        cheque_date: None,
        remarks: None,
    }
}

async fn create_product(db: &DatabaseConnection, company_id: i64, uom_id: i64, tax_id: i64) -> i64 {
    use probill_db::repositories::product::{ProductInput, ProductRepository};

    let repo = ProductRepository::new(db.clone());
    let product = repo
        .create(
            &ctx(),
            ProductInput {
                company_id,
                code: unique("PR"),
                name: unique("Widget"),
                specification: None,
                selling_uom_id: uom_id,
                purchase_uom_id: uom_id,
                selling_price: dec!(100),
                cost_price: dec!(60),
                hsn_code: None,
                tax_header_id: tax_id,
                tax_rate: dec!(18),
                is_active: true,
            },
        )
        .await
        .expect("Failed to create product");
    product.id
}

#[tokio::test]
async fn test_sequential_numbers_within_company_and_year() {
    let db = connect().await;
    let company_id = create_company(&db).await;
    let customer_id = create_customer(&db, company_id).await;
    let currency_id = seeded_currency(&db).await;
    let repo = InvoiceRepository::new(db.clone());

    let mut numbers = Vec::new();
    for _ in 0..3 {
        let created = repo
            .create(
                &ctx(),
                header_input(company_id, customer_id, currency_id, date(2025, 7, 1), dec!(100)),
                vec![],
            )
            .await
            .expect("Failed to create invoice");
        numbers.push(created.header.invoice_no);
    }

    assert_eq!(numbers[0], "INV/2025-26-0001");
    assert_eq!(numbers[1], "INV/2025-26-0002");
    assert_eq!(numbers[2], "INV/2025-26-0003");
}

#[tokio::test]
async fn test_numbering_scoped_by_financial_year() {
    let db = connect().await;
    let company_id = create_company(&db).await;
    let customer_id = create_customer(&db, company_id).await;
    let currency_id = seeded_currency(&db).await;
    let repo = InvoiceRepository::new(db.clone());

    // March 31 belongs to the previous financial year; April 1 starts fresh.
    let before = repo
        .create(
            &ctx(),
            header_input(company_id, customer_id, currency_id, date(2025, 3, 31), dec!(10)),
            vec![],
        )
        .await
        .expect("Failed to create invoice");
    let after = repo
        .create(
            &ctx(),
            header_input(company_id, customer_id, currency_id, date(2025, 4, 1), dec!(10)),
            vec![],
        )
        .await
        .expect("Failed to create invoice");

    assert_eq!(before.header.invoice_no, "INV/2024-25-0001");
    assert_eq!(after.header.invoice_no, "INV/2025-26-0001");
}

#[tokio::test]
async fn test_invoice_create_with_lines_and_get() {
    let db = connect().await;
    let company_id = create_company(&db).await;
    let customer_id = create_customer(&db, company_id).await;
    let currency_id = seeded_currency(&db).await;
    let uom_id = create_uom(&db, company_id).await;
    let tax_id = create_tax(&db, company_id, dec!(18)).await;
    let product_id = create_product(&db, company_id, uom_id, tax_id).await;
    let repo = InvoiceRepository::new(db.clone());

    let created = repo
        .create(
            &ctx(),
            header_input(company_id, customer_id, currency_id, date(2025, 7, 1), dec!(118)),
            vec![line_input(product_id, uom_id, dec!(100))],
        )
        .await
        .expect("Failed to create invoice");

    let fetched = repo
        .find_by_id(created.header.id)
        .await
        .expect("Failed to fetch invoice")
        .expect("Invoice must exist");

    assert_eq!(fetched.lines.len(), 1);
    assert_eq!(fetched.lines[0].amount, dec!(100));
    assert_eq!(fetched.header.received_amount, Decimal::ZERO);
}

#[tokio::test]
async fn test_header_only_update_leaves_lines_untouched() {
    let db = connect().await;
    let company_id = create_company(&db).await;
    let customer_id = create_customer(&db, company_id).await;
    let currency_id = seeded_currency(&db).await;
    let uom_id = create_uom(&db, company_id).await;
    let tax_id = create_tax(&db, company_id, dec!(18)).await;
    let product_id = create_product(&db, company_id, uom_id, tax_id).await;
    let repo = InvoiceRepository::new(db.clone());

    let created = repo
        .create(
            &ctx(),
            header_input(company_id, customer_id, currency_id, date(2025, 7, 1), dec!(200)),
            vec![
                line_input(product_id, uom_id, dec!(100)),
                line_input(product_id, uom_id, dec!(100)),
            ],
        )
        .await
        .expect("Failed to create invoice");
    let original_lines = created.lines.clone();

    let mut header = header_input(company_id, customer_id, currency_id, date(2025, 7, 1), dec!(200));
    header.remarks = Some("updated remarks".to_string());

    let updated = repo
        .update(&ctx(), created.header.id, header, None)
        .await
        .expect("Failed to update invoice");

    assert_eq!(updated.header.remarks.as_deref(), Some("updated remarks"));
    assert_eq!(updated.lines.len(), original_lines.len());
    for (before, after) in original_lines.iter().zip(updated.lines.iter()) {
        assert_eq!(before.id, after.id);
        assert_eq!(before.amount, after.amount);
    }
}

#[tokio::test]
async fn test_line_diff_sync_deletes_absent_lines() {
    let db = connect().await;
    let company_id = create_company(&db).await;
    let customer_id = create_customer(&db, company_id).await;
    let currency_id = seeded_currency(&db).await;
    let uom_id = create_uom(&db, company_id).await;
    let tax_id = create_tax(&db, company_id, dec!(18)).await;
    let product_id = create_product(&db, company_id, uom_id, tax_id).await;
    let repo = InvoiceRepository::new(db.clone());

    let created = repo
        .create(
            &ctx(),
            header_input(company_id, customer_id, currency_id, date(2025, 7, 1), dec!(200)),
            vec![
                line_input(product_id, uom_id, dec!(100)),
                line_input(product_id, uom_id, dec!(100)),
            ],
        )
        .await
        .expect("Failed to create invoice");

    // Keep the first line (amended), drop the second, add a third.
    let kept = InvoiceLineInput {
        id: Some(created.lines[0].id),
        amount: dec!(150),
        net_amount: dec!(150),
        ..line_input(product_id, uom_id, dec!(150))
    };
    let added = line_input(product_id, uom_id, dec!(50));

    let updated = repo
        .update(
            &ctx(),
            created.header.id,
            header_input(company_id, customer_id, currency_id, date(2025, 7, 1), dec!(200)),
            Some(vec![kept, added]),
        )
        .await
        .expect("Failed to update invoice");

    assert_eq!(updated.lines.len(), 2);
    assert!(updated.lines.iter().any(|l| l.id == created.lines[0].id && l.amount == dec!(150)));
    assert!(updated.lines.iter().all(|l| l.id != created.lines[1].id));
}

#[tokio::test]
async fn test_receipt_allocation_updates_invoice_balance() {
    let db = connect().await;
    let company_id = create_company(&db).await;
    let customer_id = create_customer(&db, company_id).await;
    let currency_id = seeded_currency(&db).await;
    let invoice_repo = InvoiceRepository::new(db.clone());
    let receipt_repo = ReceiptRepository::new(db.clone());

    let invoice = invoice_repo
        .create(
            &ctx(),
            header_input(company_id, customer_id, currency_id, date(2025, 7, 1), dec!(100)),
            vec![],
        )
        .await
        .expect("Failed to create invoice");

    let receipt = receipt_repo
        .create(
            &ctx(),
            receipt_input(company_id, customer_id, currency_id, date(2025, 7, 10), dec!(100)),
            vec![allocation_input(invoice.header.id, date(2025, 7, 1), currency_id, dec!(100))],
        )
        .await
        .expect("Failed to create receipt");

    assert_eq!(receipt.header.receipt_no.split('/').next(), Some("REC"));

    let after_create = invoice_repo
        .find_by_id(invoice.header.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after_create.header.received_amount, dec!(100));

    // Deleting the receipt restores the invoice balance.
    receipt_repo
        .delete(receipt.header.id)
        .await
        .expect("Failed to delete receipt");

    let after_delete = invoice_repo
        .find_by_id(invoice.header.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after_delete.header.received_amount, Decimal::ZERO);
}

#[tokio::test]
async fn test_cancelled_receipt_excluded_from_balance() {
    let db = connect().await;
    let company_id = create_company(&db).await;
    let customer_id = create_customer(&db, company_id).await;
    let currency_id = seeded_currency(&db).await;
    let invoice_repo = InvoiceRepository::new(db.clone());
    let receipt_repo = ReceiptRepository::new(db.clone());

    let invoice = invoice_repo
        .create(
            &ctx(),
            header_input(company_id, customer_id, currency_id, date(2025, 7, 1), dec!(100)),
            vec![],
        )
        .await
        .expect("Failed to create invoice");

    let receipt = receipt_repo
        .create(
            &ctx(),
            receipt_input(company_id, customer_id, currency_id, date(2025, 7, 10), dec!(60)),
            vec![allocation_input(invoice.header.id, date(2025, 7, 1), currency_id, dec!(60))],
        )
        .await
        .expect("Failed to create receipt");

    receipt_repo
        .set_cancelled(&ctx(), receipt.header.id, true)
        .await
        .expect("Failed to cancel receipt");

    let after_cancel = invoice_repo
        .find_by_id(invoice.header.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after_cancel.header.received_amount, Decimal::ZERO);

    receipt_repo
        .set_cancelled(&ctx(), receipt.header.id, false)
        .await
        .expect("Failed to reinstate receipt");

    let after_reinstate = invoice_repo
        .find_by_id(invoice.header.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after_reinstate.header.received_amount, dec!(60));
}

#[tokio::test]
async fn test_receipt_update_recomputes_dropped_invoice() {
    let db = connect().await;
    let company_id = create_company(&db).await;
    let customer_id = create_customer(&db, company_id).await;
    let currency_id = seeded_currency(&db).await;
    let invoice_repo = InvoiceRepository::new(db.clone());
    let receipt_repo = ReceiptRepository::new(db.clone());

    let invoice_a = invoice_repo
        .create(
            &ctx(),
            header_input(company_id, customer_id, currency_id, date(2025, 7, 1), dec!(100)),
            vec![],
        )
        .await
        .expect("Failed to create invoice A");
    let invoice_b = invoice_repo
        .create(
            &ctx(),
            header_input(company_id, customer_id, currency_id, date(2025, 7, 2), dec!(50)),
            vec![],
        )
        .await
        .expect("Failed to create invoice B");

    let receipt = receipt_repo
        .create(
            &ctx(),
            receipt_input(company_id, customer_id, currency_id, date(2025, 7, 10), dec!(150)),
            vec![
                allocation_input(invoice_a.header.id, date(2025, 7, 1), currency_id, dec!(100)),
                allocation_input(invoice_b.header.id, date(2025, 7, 2), currency_id, dec!(50)),
            ],
        )
        .await
        .expect("Failed to create receipt");

    // Re-point the whole receipt at invoice B only.
    receipt_repo
        .update(
            &ctx(),
            receipt.header.id,
            receipt_input(company_id, customer_id, currency_id, date(2025, 7, 10), dec!(50)),
            Some(vec![allocation_input(
                invoice_b.header.id,
                date(2025, 7, 2),
                currency_id,
                dec!(50),
            )]),
        )
        .await
        .expect("Failed to update receipt");

    let a = invoice_repo.find_by_id(invoice_a.header.id).await.unwrap().unwrap();
    let b = invoice_repo.find_by_id(invoice_b.header.id).await.unwrap().unwrap();
    assert_eq!(a.header.received_amount, Decimal::ZERO, "dropped invoice resets");
    assert_eq!(b.header.received_amount, dec!(50));
}

#[tokio::test]
async fn test_allocation_against_missing_invoice_rejected() {
    let db = connect().await;
    let company_id = create_company(&db).await;
    let customer_id = create_customer(&db, company_id).await;
    let currency_id = seeded_currency(&db).await;
    let receipt_repo = ReceiptRepository::new(db.clone());

    let result = receipt_repo
        .create(
            &ctx(),
            receipt_input(company_id, customer_id, currency_id, date(2025, 7, 10), dec!(10)),
            vec![allocation_input(i64::MAX, date(2025, 7, 1), currency_id, dec!(10))],
        )
        .await;

    assert!(matches!(result, Err(ReceiptError::InvoiceNotFound(_))));
}
