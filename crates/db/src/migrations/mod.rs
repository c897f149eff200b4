//! Database migrations.
//!
//! Schema migrations for the database.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20250601_000001_create_user_table;
mod m20250601_000002_create_poll_table;
mod m20250601_000003_create_vote_table;
mod m20250601_000004_create_share_table;
mod m20250601_000005_create_contest_winner_table;
mod m20250601_000006_create_pending_notification_table;
mod m20250601_000007_create_manager_invitation_table;
mod m20250601_000008_create_popup_dismissal_table;
mod m20250601_000009_create_app_settings_table;
mod m20250601_000010_create_job_log_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_000001_create_user_table::Migration),
            Box::new(m20250601_000002_create_poll_table::Migration),
            Box::new(m20250601_000003_create_vote_table::Migration),
            Box::new(m20250601_000004_create_share_table::Migration),
            Box::new(m20250601_000005_create_contest_winner_table::Migration),
            Box::new(m20250601_000006_create_pending_notification_table::Migration),
            Box::new(m20250601_000007_create_manager_invitation_table::Migration),
            Box::new(m20250601_000008_create_popup_dismissal_table::Migration),
            Box::new(m20250601_000009_create_app_settings_table::Migration),
            Box::new(m20250601_000010_create_job_log_table::Migration),
        ]
    }
}
