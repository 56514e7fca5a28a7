//! `SeaORM` Entity for the products table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub company_id: i64,
    pub code: String,
    pub name: String,
    pub specification: Option<String>,
    pub selling_uom_id: i64,
    pub purchase_uom_id: i64,
    pub selling_price: Decimal,
    pub cost_price: Decimal,
    pub hsn_code: Option<String>,
    pub tax_header_id: i64,
    pub tax_rate: Decimal,
    pub is_active: bool,
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
        belongs_to = "super::tax_headers::Entity",
        from = "Column::TaxHeaderId",
        to = "super::tax_headers::Column::Id"
    )]
    TaxHeaders,
}

impl Related<super::companies::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Companies.def()
    }
}

impl Related<super::tax_headers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TaxHeaders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
