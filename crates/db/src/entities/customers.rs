//! `SeaORM` Entity for the customers table.
//!
//! Geography references are plain integer fields checked for existence at
//! write time; they carry no ownership.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "customers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub company_id: i64,
    pub name: String,
    pub code: String,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub city_id: Option<i64>,
    pub state_id: Option<i64>,
    pub country_id: Option<i64>,
    pub gst_no: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub currency_id: Option<i64>,
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
}

impl Related<super::companies::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Companies.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
