//! Postgres enum mappings.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Status of a financial period.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "period_status")]
pub enum PeriodStatus {
    /// Period is open for postings.
    #[sea_orm(string_value = "Open")]
    Open,
    /// Period is closed.
    #[sea_orm(string_value = "Closed")]
    Closed,
}

/// Inter-state vs intra-state supply.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "supply_scope")]
pub enum SupplyScope {
    /// Supply across state borders (IGST applies).
    #[sea_orm(string_value = "Inter")]
    Inter,
    /// Supply within a state (CGST + SGST apply).
    #[sea_orm(string_value = "Intra")]
    Intra,
}

impl From<probill_core::tax::SupplyScope> for SupplyScope {
    fn from(scope: probill_core::tax::SupplyScope) -> Self {
        match scope {
            probill_core::tax::SupplyScope::Inter => Self::Inter,
            probill_core::tax::SupplyScope::Intra => Self::Intra,
        }
    }
}

impl From<probill_core::calendar::PeriodStatus> for PeriodStatus {
    fn from(status: probill_core::calendar::PeriodStatus) -> Self {
        match status {
            probill_core::calendar::PeriodStatus::Open => Self::Open,
            probill_core::calendar::PeriodStatus::Closed => Self::Closed,
        }
    }
}
