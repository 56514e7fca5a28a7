//! `SeaORM` Entity for the financial_periods table.
//!
//! Periods are derived data: regenerated whenever the owning year's dates
//! change.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::PeriodStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "financial_periods")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub financial_year_id: i64,
    pub period_no: i32,
    pub name: String,
    pub start_date: Date,
    pub end_date: Date,
    pub status: PeriodStatus,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::financial_years::Entity",
        from = "Column::FinancialYearId",
        to = "super::financial_years::Column::Id"
    )]
    FinancialYears,
}

impl Related<super::financial_years::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FinancialYears.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
