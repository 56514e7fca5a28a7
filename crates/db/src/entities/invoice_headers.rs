//! `SeaORM` Entity for the invoice_headers table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::SupplyScope;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "invoice_headers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub company_id: i64,
    pub customer_id: i64,
    pub invoice_no: String,
    pub invoice_date: Date,
    pub reference_no: Option<String>,
    pub reference_date: Option<Date>,
    pub currency_id: i64,
    pub exchange_rate: Decimal,
    pub supply_type: SupplyScope,
    pub remarks: Option<String>,
    pub gross_amount: Decimal,
    pub cgst_amount: Decimal,
    pub sgst_amount: Decimal,
    pub igst_amount: Decimal,
    pub discount_amount: Decimal,
    pub other_charges_added: Decimal,
    pub other_charges_deducted: Decimal,
    pub rounded_off: Decimal,
    pub net_amount: Decimal,
    /// Sum of non-cancelled receipt allocations; maintained by the receipts
    /// subsystem, never set directly.
    pub received_amount: Decimal,
    pub is_cancelled: bool,
    pub created_by: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_by: String,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::companies::Entity",
        from = "Column::CompanyId",
        to = "super::companies::Column::Id"
    )]
    Companies,
    #[sea_orm(
        belongs_to = "super::customers::Entity",
        from = "Column::CustomerId",
        to = "super::customers::Column::Id"
    )]
    Customers,
    #[sea_orm(has_many = "super::invoice_details::Entity")]
    InvoiceDetails,
}

impl Related<super::companies::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Companies.def()
    }
}

impl Related<super::customers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customers.def()
    }
}

impl Related<super::invoice_details::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InvoiceDetails.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
