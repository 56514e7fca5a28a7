//! `SeaORM` Entity for the tax_headers table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tax_headers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub company_id: i64,
    pub tax_type: String,
    pub name: String,
    pub rate: Decimal,
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
    #[sea_orm(has_many = "super::tax_details::Entity")]
    TaxDetails,
}

impl Related<super::companies::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Companies.def()
    }
}

impl Related<super::tax_details::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TaxDetails.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
