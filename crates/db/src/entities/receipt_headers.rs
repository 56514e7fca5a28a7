//! `SeaORM` Entity for the receipt_headers table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "receipt_headers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub company_id: i64,
    pub customer_id: i64,
    pub receipt_no: String,
    pub receipt_date: Date,
    pub receipt_type: String,
    pub payment_mode: String,
    pub currency_id: i64,
    pub exchange_rate: Decimal,
    pub receipt_amount: Decimal,
    pub total_receipt_amount: Decimal,
    pub transaction_no: Option<String>,
    pub transaction_date: Option<Date>,
    pub cheque_no: Option<String>,
    pub cheque_date: Option<Date>,
    pub remarks: Option<String>,
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
    #[sea_orm(has_many = "super::receipt_details::Entity")]
    ReceiptDetails,
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

impl Related<super::receipt_details::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReceiptDetails.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
