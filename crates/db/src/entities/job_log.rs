//! Job log entity: a rolling record of scheduled-job runs.
//!
//! Only the most recent 100 entries are kept; the repository prunes older
//! rows on insert.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Outcome of one job run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
#[serde(rename_all = "snake_case")]
pub enum JobOutcome {
    #[sea_orm(string_value = "ok")]
    Ok,
    #[sea_orm(string_value = "error")]
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "job_log")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Job name (e.g. `weekly_rotation`).
    pub job: String,

    pub outcome: JobOutcome,

    /// Error message or summary line.
    #[sea_orm(nullable)]
    pub detail: Option<String>,

    /// Rows affected by this run.
    pub items: i64,

    #[sea_orm(indexed)]
    pub ran_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
