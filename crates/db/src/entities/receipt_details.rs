//! `SeaORM` Entity for the receipt_details table.
//!
//! Each row allocates part of a receipt against exactly one invoice, in the
//! invoice's currency with its own exchange rate.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "receipt_details")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub receipt_header_id: i64,
    pub row_no: i32,
    pub invoice_header_id: i64,
    pub invoice_date: Date,
    pub invoice_amount: Decimal,
    pub currency_id: i64,
    pub exchange_rate: Decimal,
    pub allocated_amount: Decimal,
    pub commission_amount: Decimal,
    pub tds_amount: Decimal,
    pub net_amount: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::receipt_headers::Entity",
        from = "Column::ReceiptHeaderId",
        to = "super::receipt_headers::Column::Id"
    )]
    ReceiptHeaders,
    #[sea_orm(
        belongs_to = "super::invoice_headers::Entity",
        from = "Column::InvoiceHeaderId",
        to = "super::invoice_headers::Column::Id"
    )]
    InvoiceHeaders,
}

impl Related<super::receipt_headers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReceiptHeaders.def()
    }
}

impl Related<super::invoice_headers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InvoiceHeaders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
