//! Contest winner entity.
//!
//! At most one winner exists per contest poll; the unique index on `poll_id`
//! makes the invariant a hard constraint, so a racing second announcement
//! fails at insert time.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Winner record status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum WinnerStatus {
    /// Winner drawn and recorded.
    #[sea_orm(string_value = "announced")]
    Announced,
    /// Winner notification delivered.
    #[sea_orm(string_value = "notified")]
    Notified,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contest_winner")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Contest poll; unique, one winner per contest.
    #[sea_orm(unique)]
    pub poll_id: String,

    /// Winning voter.
    pub user_id: String,

    /// Prize description at announcement time.
    pub prize: String,

    /// Winning option index.
    pub winning_choice: i32,

    /// Vote count of the winning option at announcement time.
    pub winning_votes: i32,

    pub status: WinnerStatus,

    pub announced_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::poll::Entity",
        from = "Column::PollId",
        to = "super::poll::Column::Id",
        on_delete = "Cascade"
    )]
    Poll,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::poll::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Poll.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
