//! `SeaORM` Entity for the invoice_details table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "invoice_details")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub invoice_header_id: i64,
    pub row_no: i32,
    pub product_id: i64,
    pub uom_id: i64,
    pub quantity: Decimal,
    pub rate: Decimal,
    pub amount: Decimal,
    pub discount_type: Option<String>,
    pub discount_value: Decimal,
    pub tax_header_id: Option<i64>,
    pub tax_rate: Decimal,
    pub cgst_rate: Decimal,
    pub sgst_rate: Decimal,
    pub igst_rate: Decimal,
    pub cgst_amount: Decimal,
    pub sgst_amount: Decimal,
    pub igst_amount: Decimal,
    pub tax_amount: Decimal,
    pub net_amount: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::invoice_headers::Entity",
        from = "Column::InvoiceHeaderId",
        to = "super::invoice_headers::Column::Id"
    )]
    InvoiceHeaders,
    #[sea_orm(
        belongs_to = "super::products::Entity",
        from = "Column::ProductId",
        to = "super::products::Column::Id"
    )]
    Products,
}

impl Related<super::invoice_headers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InvoiceHeaders.def()
    }
}

impl Related<super::products::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Products.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
