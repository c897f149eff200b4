//! Service layer: business logic over the repository layer.

#![allow(missing_docs)]

pub mod contest;
pub mod email;
pub mod notification;
pub mod poll;
pub mod popup;
pub mod role;
pub mod settings;
pub mod share;
pub mod transfer;
pub mod vote;

pub use contest::ContestService;
pub use email::EmailService;
pub use notification::{FlushStats, NotificationService, MAX_RETRY_COUNT};
pub use poll::{BulkPollAction, CreatePollInput, PollService, UpdatePollInput};
pub use popup::PopupService;
pub use role::{Capability, RoleService, INVITATION_VALIDITY_DAYS};
pub use settings::{PoolQuestion, SettingsService, UpdateSettingsInput};
pub use share::ShareService;
pub use transfer::{ExportFormat, ImportMode, ImportOutcome, TransferService};
pub use vote::{PollResults, VoteService, Voter};
