//! Transfer service: export and import of polls, votes, and settings.

use chrono::{DateTime, Utc};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use serde_json::json;
use versus_common::{AppError, AppResult, IdGenerator};
use versus_db::{
    entities::{poll, poll::PollStatus, user::SYSTEM_USER_ID, vote},
    repositories::{PollRepository, VoteRepository},
};

use crate::services::settings::{SettingsService, UpdateSettingsInput};

/// Supported transfer formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Json,
    Csv,
    Xml,
}

impl ExportFormat {
    /// Stable tag used in settings allow-lists and API payloads.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Xml => "xml",
        }
    }

    /// Parse a format tag.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "json" => Some(Self::Json),
            "csv" => Some(Self::Csv),
            "xml" => Some(Self::Xml),
            _ => None,
        }
    }

    /// MIME type of the exported payload.
    #[must_use]
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Csv => "text/csv",
            Self::Xml => "application/xml",
        }
    }
}

/// Import modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportMode {
    /// Insert imported polls alongside existing ones.
    Merge,
    /// Drop all existing polls first.
    Replace,
}

/// Result of an import run.
#[derive(Debug, Clone, Serialize)]
pub struct ImportOutcome {
    pub polls_imported: u64,
    pub votes_imported: u64,
    pub polls_replaced: u64,
    /// Pre-import JSON export, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup: Option<String>,
}

/// One exported vote.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ExportVote {
    voter_key: String,
    choice: i32,
    voter_ip: String,
    created_at: DateTime<Utc>,
}

/// One exported poll with its votes.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ExportPoll {
    question: String,
    options: Vec<String>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    is_weekly: bool,
    #[serde(default)]
    is_contest: bool,
    #[serde(default)]
    contest_prize: Option<String>,
    #[serde(default)]
    contest_ends_at: Option<DateTime<Utc>>,
    status: PollStatus,
    created_at: DateTime<Utc>,
    #[serde(default)]
    votes: Vec<ExportVote>,
}

/// The full transfer payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ExportData {
    polls: Vec<ExportPoll>,
    #[serde(default)]
    settings: UpdateSettingsInput,
}

/// Flat per-poll record for the CSV format.
///
/// CSV cannot carry the nested vote log; it round-trips polls (options
/// joined by `|`) and aggregate totals only. JSON and XML carry full
/// fidelity.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CsvPollRecord {
    question: String,
    options: String,
    status: String,
    is_weekly: bool,
    is_contest: bool,
    total_votes: i64,
}

/// Transfer service for business logic.
#[derive(Clone)]
pub struct TransferService {
    poll_repo: PollRepository,
    vote_repo: VoteRepository,
    settings: SettingsService,
    id_gen: IdGenerator,
}

impl TransferService {
    /// Create a new transfer service.
    #[must_use]
    pub const fn new(
        poll_repo: PollRepository,
        vote_repo: VoteRepository,
        settings: SettingsService,
    ) -> Self {
        Self {
            poll_repo,
            vote_repo,
            settings,
            id_gen: IdGenerator::new(),
        }
    }

    async fn check_format_allowed(&self, format: ExportFormat) -> AppResult<()> {
        let allowed = self.settings.export_formats().await?;
        if allowed.iter().any(|tag| tag == format.tag()) {
            Ok(())
        } else {
            Err(AppError::BadRequest(format!(
                "Export format {} is not enabled",
                format.tag()
            )))
        }
    }

    async fn gather(&self) -> AppResult<ExportData> {
        let polls = self.poll_repo.find_all().await?;

        let mut exported = Vec::with_capacity(polls.len());
        for poll in polls {
            let options = poll
                .option_labels()
                .map_err(|e| AppError::Internal(format!("Invalid poll options: {e}")))?;
            let votes = self.vote_repo.find_by_poll(&poll.id).await?;
            exported.push(ExportPoll {
                question: poll.question,
                options,
                image_url: poll.image_url,
                is_weekly: poll.is_weekly,
                is_contest: poll.is_contest,
                contest_prize: poll.contest_prize,
                contest_ends_at: poll.contest_ends_at.map(|t| t.with_timezone(&Utc)),
                status: poll.status,
                created_at: poll.created_at.with_timezone(&Utc),
                votes: votes
                    .into_iter()
                    .map(|v| ExportVote {
                        voter_key: v.voter_key,
                        choice: v.choice,
                        voter_ip: v.voter_ip,
                        created_at: v.created_at.with_timezone(&Utc),
                    })
                    .collect(),
            });
        }

        let settings = self.settings.get().await?;
        let settings = UpdateSettingsInput {
            popup_auto_show: Some(settings.popup_auto_show),
            popup_delay_secs: Some(settings.popup_delay_secs),
            // `None` rather than `Some(None)`: exports never carry
            // explicit nulls, which keeps the XML encoding simple.
            brand_color: settings.brand_color.map(Some),
            enabled_platforms: serde_json::from_value(settings.enabled_platforms).ok(),
            weekly_auto_create: Some(settings.weekly_auto_create),
            weekly_day: Some(settings.weekly_day),
            weekly_hour: Some(settings.weekly_hour),
            weekly_timezone: Some(settings.weekly_timezone),
            weekly_question_pool: serde_json::from_value(settings.weekly_question_pool).ok(),
            contest_default_duration_days: Some(settings.contest_default_duration_days),
            contest_auto_announce: Some(settings.contest_auto_announce),
            notifications_enabled: Some(settings.notifications_enabled),
            notification_recipient: settings.notification_recipient.map(Some),
            retention_days: Some(settings.retention_days),
            cache_enabled: Some(settings.cache_enabled),
            cache_duration_secs: Some(settings.cache_duration_secs),
            captcha_site_key: settings.captcha_site_key.map(Some),
            captcha_secret: settings.captcha_secret.map(Some),
            export_formats: serde_json::from_value(settings.export_formats).ok(),
        };

        Ok(ExportData {
            polls: exported,
            settings,
        })
    }

    /// Export all polls, votes, and settings in the given format.
    ///
    /// Returns the payload and its content type.
    pub async fn export(&self, format: ExportFormat) -> AppResult<(String, &'static str)> {
        self.check_format_allowed(format).await?;
        let data = self.gather().await?;
        let payload = encode(&data, format)?;
        Ok((payload, format.content_type()))
    }

    /// Import a payload.
    ///
    /// `Replace` drops all existing polls first (votes, shares, and winners
    /// cascade). With `backup` a pre-import JSON export is returned in the
    /// outcome. Settings travel with the payload but are applied only in
    /// `Replace` mode; a merge never clobbers live configuration.
    pub async fn import(
        &self,
        payload: &str,
        format: ExportFormat,
        mode: ImportMode,
        backup: bool,
    ) -> AppResult<ImportOutcome> {
        let data = decode(payload, format)?;

        for poll in &data.polls {
            if poll.question.trim().is_empty() {
                return Err(AppError::Validation(
                    "Imported poll has an empty question".to_string(),
                ));
            }
            if poll.options.len() < 2 {
                return Err(AppError::Validation(format!(
                    "Imported poll '{}' has fewer than 2 options",
                    poll.question
                )));
            }
        }

        let backup = if backup {
            let current = self.gather().await?;
            Some(encode(&current, ExportFormat::Json)?)
        } else {
            None
        };

        let polls_replaced = match mode {
            ImportMode::Replace => self.poll_repo.delete_all().await?,
            ImportMode::Merge => 0,
        };

        let mut polls_imported = 0;
        let mut votes_imported = 0;

        for entry in data.polls {
            // Fresh ids on import; exported ids may collide with live rows.
            let poll_id = self.id_gen.generate();
            let model = poll::ActiveModel {
                id: Set(poll_id.clone()),
                // Imported polls belong to the system user until re-assigned.
                user_id: Set(SYSTEM_USER_ID.to_string()),
                question: Set(entry.question),
                options: Set(json!(entry.options)),
                image_url: Set(entry.image_url),
                is_weekly: Set(false),
                is_contest: Set(entry.is_contest),
                contest_prize: Set(entry.contest_prize),
                contest_ends_at: Set(entry.contest_ends_at.map(Into::into)),
                status: Set(entry.status),
                created_at: Set(entry.created_at.into()),
                updated_at: Set(None),
            };
            self.poll_repo.create(model).await?;
            polls_imported += 1;

            for v in entry.votes {
                // Imported votes are detached from user accounts; the
                // voter_key alone preserves tallies and deduplication.
                let model = vote::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    poll_id: Set(poll_id.clone()),
                    user_id: Set(None),
                    voter_key: Set(v.voter_key),
                    choice: Set(v.choice),
                    voter_ip: Set(v.voter_ip),
                    user_agent: Set(None),
                    created_at: Set(v.created_at.into()),
                };
                match self.vote_repo.create(model).await {
                    Ok(_) => votes_imported += 1,
                    // Duplicate voter keys within a payload are skipped.
                    Err(AppError::AlreadyVoted) => {}
                    Err(e) => return Err(e),
                }
            }
        }

        if mode == ImportMode::Replace {
            self.settings.update(data.settings).await?;
        }

        Ok(ImportOutcome {
            polls_imported,
            votes_imported,
            polls_replaced,
            backup,
        })
    }
}

fn encode(data: &ExportData, format: ExportFormat) -> AppResult<String> {
    match format {
        ExportFormat::Json => serde_json::to_string_pretty(data)
            .map_err(|e| AppError::Internal(format!("JSON encode failed: {e}"))),
        ExportFormat::Xml => quick_xml::se::to_string(data)
            .map_err(|e| AppError::Internal(format!("XML encode failed: {e}"))),
        ExportFormat::Csv => {
            let mut writer = csv::Writer::from_writer(Vec::new());
            for poll in &data.polls {
                let record = CsvPollRecord {
                    question: poll.question.clone(),
                    options: poll.options.join("|"),
                    status: format!("{:?}", poll.status).to_lowercase(),
                    is_weekly: poll.is_weekly,
                    is_contest: poll.is_contest,
                    total_votes: poll.votes.len() as i64,
                };
                writer
                    .serialize(record)
                    .map_err(|e| AppError::Internal(format!("CSV encode failed: {e}")))?;
            }
            let bytes = writer
                .into_inner()
                .map_err(|e| AppError::Internal(format!("CSV encode failed: {e}")))?;
            String::from_utf8(bytes)
                .map_err(|e| AppError::Internal(format!("CSV encode failed: {e}")))
        }
    }
}

fn decode(payload: &str, format: ExportFormat) -> AppResult<ExportData> {
    match format {
        ExportFormat::Json => serde_json::from_str(payload)
            .map_err(|e| AppError::Validation(format!("Invalid JSON payload: {e}"))),
        ExportFormat::Xml => quick_xml::de::from_str(payload)
            .map_err(|e| AppError::Validation(format!("Invalid XML payload: {e}"))),
        ExportFormat::Csv => {
            let mut reader = csv::Reader::from_reader(payload.as_bytes());
            let mut polls = Vec::new();
            for record in reader.deserialize::<CsvPollRecord>() {
                let record = record
                    .map_err(|e| AppError::Validation(format!("Invalid CSV payload: {e}")))?;
                polls.push(ExportPoll {
                    question: record.question,
                    options: record.options.split('|').map(ToString::to_string).collect(),
                    image_url: None,
                    is_weekly: false,
                    is_contest: record.is_contest,
                    contest_prize: None,
                    contest_ends_at: None,
                    status: parse_status(&record.status)?,
                    created_at: Utc::now(),
                    votes: Vec::new(),
                });
            }
            Ok(ExportData {
                polls,
                settings: UpdateSettingsInput::default(),
            })
        }
    }
}

fn parse_status(tag: &str) -> AppResult<PollStatus> {
    match tag {
        "active" => Ok(PollStatus::Active),
        "ended" => Ok(PollStatus::Ended),
        "archived" => Ok(PollStatus::Archived),
        "deleted" => Ok(PollStatus::Deleted),
        _ => Err(AppError::Validation(format!("Unknown poll status: {tag}"))),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_data() -> ExportData {
        ExportData {
            polls: vec![ExportPoll {
                question: "Coffee or tea?".to_string(),
                options: vec!["Coffee".to_string(), "Tea".to_string()],
                image_url: None,
                is_weekly: false,
                is_contest: false,
                contest_prize: None,
                contest_ends_at: None,
                status: PollStatus::Active,
                created_at: Utc::now(),
                votes: vec![ExportVote {
                    voter_key: "u1".to_string(),
                    choice: 0,
                    voter_ip: "10.0.0.1".to_string(),
                    created_at: Utc::now(),
                }],
            }],
            settings: UpdateSettingsInput::default(),
        }
    }

    #[test]
    fn test_json_round_trip() {
        let data = sample_data();
        let encoded = encode(&data, ExportFormat::Json).unwrap();
        let decoded = decode(&encoded, ExportFormat::Json).unwrap();

        assert_eq!(decoded.polls.len(), 1);
        assert_eq!(decoded.polls[0].question, "Coffee or tea?");
        assert_eq!(decoded.polls[0].votes.len(), 1);
    }

    #[test]
    fn test_xml_round_trip() {
        let data = sample_data();
        let encoded = encode(&data, ExportFormat::Xml).unwrap();
        let decoded = decode(&encoded, ExportFormat::Xml).unwrap();

        assert_eq!(decoded.polls.len(), 1);
        assert_eq!(decoded.polls[0].options, vec!["Coffee", "Tea"]);
    }

    #[test]
    fn test_csv_flattens_polls() {
        let data = sample_data();
        let encoded = encode(&data, ExportFormat::Csv).unwrap();

        assert!(encoded.contains("Coffee or tea?"));
        assert!(encoded.contains("Coffee|Tea"));

        let decoded = decode(&encoded, ExportFormat::Csv).unwrap();
        assert_eq!(decoded.polls.len(), 1);
        assert_eq!(decoded.polls[0].options.len(), 2);
        // CSV drops the vote log
        assert!(decoded.polls[0].votes.is_empty());
    }

    #[test]
    fn test_decode_rejects_garbage_json() {
        let result = decode("not json", ExportFormat::Json);
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_format_tags() {
        assert_eq!(ExportFormat::from_tag("json"), Some(ExportFormat::Json));
        assert_eq!(ExportFormat::from_tag("yaml"), None);
        assert_eq!(ExportFormat::Csv.content_type(), "text/csv");
    }
}
