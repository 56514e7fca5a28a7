//! `SeaORM` Entity for the tax_details table.
//!
//! Rows are derived from the header's (type, rate) and regenerated on every
//! header update; they are never edited independently.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::SupplyScope;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tax_details")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub tax_header_id: i64,
    pub row_no: i32,
    pub supply: SupplyScope,
    pub slab_name: String,
    pub rate: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tax_headers::Entity",
        from = "Column::TaxHeaderId",
        to = "super::tax_headers::Column::Id"
    )]
    TaxHeaders,
}

impl Related<super::tax_headers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TaxHeaders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
