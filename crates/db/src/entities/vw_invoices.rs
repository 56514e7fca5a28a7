//! `SeaORM` Entity over the vw_invoices reporting view.
//!
//! Read-only projection joining invoice headers to company, customer and
//! currency names. Never written through.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vw_invoices")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    pub company_id: i64,
    pub company_name: String,
    pub customer_id: i64,
    pub customer_name: String,
    pub currency_id: i64,
    pub currency_code: String,
    pub invoice_no: String,
    pub invoice_date: Date,
    pub reference_no: Option<String>,
    pub exchange_rate: Decimal,
    pub supply_type: String,
    pub gross_amount: Decimal,
    pub tax_amount: Decimal,
    pub net_amount: Decimal,
    pub received_amount: Decimal,
    pub is_cancelled: bool,
    pub created_by: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_by: String,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
