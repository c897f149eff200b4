//! User entity.
//!
//! A deliberately small account model: versus authenticates by API token and
//! carries one custom role besides the admin flag. Credential management is
//! out of scope.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Owner of system-created rows (auto-created weekly polls, imports).
pub const SYSTEM_USER_ID: &str = "system";

/// Assignable roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Can manage polls and view results, but not plugin settings.
    #[sea_orm(string_value = "poll_manager")]
    PollManager,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub username: String,

    #[sea_orm(nullable)]
    pub email: Option<String>,

    /// API bearer token.
    #[sea_orm(nullable)]
    pub token: Option<String>,

    pub is_admin: bool,

    #[sea_orm(nullable)]
    pub role: Option<UserRole>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::poll::Entity")]
    Polls,
}

impl Related<super::poll::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Polls.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
