//! Poll entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Poll lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum PollStatus {
    /// Open for voting and publicly visible.
    #[sea_orm(string_value = "active")]
    Active,
    /// Voting closed (contest end or manual close).
    #[sea_orm(string_value = "ended")]
    Ended,
    /// Retired from rotation, kept for history.
    #[sea_orm(string_value = "archived")]
    Archived,
    /// Soft-deleted; hidden from public reads, kept for audit.
    #[sea_orm(string_value = "deleted")]
    Deleted,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "poll")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Owning user.
    #[sea_orm(indexed)]
    pub user_id: String,

    /// Question text (max 255 chars).
    pub question: String,

    /// Ordered option labels (JSON array of strings, 2..=10 entries).
    #[sea_orm(column_type = "Json")]
    pub options: JsonValue,

    /// Optional illustration URL.
    #[sea_orm(nullable)]
    pub image_url: Option<String>,

    /// Whether this is the featured weekly poll.
    pub is_weekly: bool,

    /// Whether this poll is a contest with a prize.
    pub is_contest: bool,

    /// Prize description for contest polls.
    #[sea_orm(nullable)]
    pub contest_prize: Option<String>,

    /// When the contest closes (null for non-contests).
    #[sea_orm(nullable)]
    pub contest_ends_at: Option<DateTimeWithTimeZone>,

    pub status: PollStatus,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

impl Model {
    /// Decode the option labels from their JSON representation.
    pub fn option_labels(&self) -> Result<Vec<String>, serde_json::Error> {
        serde_json::from_value(self.options.clone())
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,

    #[sea_orm(has_many = "super::vote::Entity")]
    Votes,

    #[sea_orm(has_many = "super::share::Entity")]
    Shares,

    #[sea_orm(has_one = "super::contest_winner::Entity")]
    Winner,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::vote::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Votes.def()
    }
}

impl Related<super::share::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shares.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
