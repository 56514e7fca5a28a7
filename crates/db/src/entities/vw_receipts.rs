//! `SeaORM` Entity over the vw_receipts reporting view.
//!
//! Read-only projection joining receipt headers to company, customer and
//! currency names. Never written through.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vw_receipts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    pub company_id: i64,
    pub company_name: String,
    pub customer_id: i64,
    pub customer_name: String,
    pub currency_id: i64,
    pub currency_code: String,
    pub receipt_no: String,
    pub receipt_date: Date,
    pub receipt_type: String,
    pub payment_mode: String,
    pub exchange_rate: Decimal,
    pub receipt_amount: Decimal,
    pub total_receipt_amount: Decimal,
    pub is_cancelled: bool,
    pub created_by: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_by: String,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
