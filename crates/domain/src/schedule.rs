use crate::shared::entity::{Entity, ID};
use crate::shared::metadata::Metadata;
use chrono::{TimeZone, Timelike};
use chrono_tz::Tz;
use serde::Serialize;

const MINUTES_PER_DAY: i64 = 60 * 24;

/// A `Schedule` is a durable recurring notification intent for one employee.
/// The recurrence itself is owned by the external cron dispatcher: one
/// `Schedule` maps to exactly one external job, identified by
/// `external_job_id` which is derived from the `Schedule` id so that
/// registering the same schedule twice can never create a second job.
#[derive(Debug, Clone)]
pub struct Schedule {
    pub id: ID,
    pub employee_id: ID,
    pub title: String,
    pub body: String,
    pub url: Option<String>,
    pub every_minutes: i64,
    pub start_at: i64,
    pub stop_at: i64,
    /// Display timezone for the daily cron encoding, not used for window math
    pub timezone: Tz,
    pub external_job_id: String,
    pub active: bool,
    pub created_by: ID,
    pub metadata: Metadata,
}

/// How the recurrence is encoded towards the external dispatcher
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Recurrence {
    /// Fire every N minutes between `start_at` and `stop_at`
    #[serde(rename_all = "camelCase")]
    EveryMinutes {
        every_minutes: i64,
        start_at: i64,
        stop_at: i64,
    },
    /// A fixed daily cron expression pinned to a timezone
    #[serde(rename_all = "camelCase")]
    Daily { expression: String, timezone: String },
}

impl Schedule {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        employee_id: ID,
        created_by: ID,
        title: String,
        body: String,
        url: Option<String>,
        every_minutes: i64,
        start_at: i64,
        stop_at: i64,
        timezone: &Tz,
    ) -> Self {
        let id = ID::new();
        let external_job_id = Self::external_job_id_for(&id);
        Self {
            id,
            employee_id,
            title,
            body,
            url,
            every_minutes,
            start_at,
            stop_at,
            timezone: timezone.to_owned(),
            external_job_id,
            active: true,
            created_by,
            metadata: Default::default(),
        }
    }

    /// Stable external job identifier so that re-registration is idempotent
    pub fn external_job_id_for(schedule_id: &ID) -> String {
        format!("nudge-{}", schedule_id)
    }

    pub fn is_within_window(&self, now: i64) -> bool {
        self.start_at <= now && now <= self.stop_at
    }

    pub fn recurrence(&self) -> Recurrence {
        if self.every_minutes == MINUTES_PER_DAY {
            // Once a day, pin the firing to the local time of day of start_at
            if let Some(start) = self.timezone.timestamp_millis_opt(self.start_at).single() {
                return Recurrence::Daily {
                    expression: format!("{} {} * * *", start.minute(), start.hour()),
                    timezone: self.timezone.to_string(),
                };
            }
        }
        Recurrence::EveryMinutes {
            every_minutes: self.every_minutes,
            start_at: self.start_at,
            stop_at: self.stop_at,
        }
    }
}

impl Entity for Schedule {
    fn id(&self) -> &ID {
        &self.id
    }
}

/// Deep links and push endpoints must be http(s) URLs
pub fn validate_http_url(url: &str) -> bool {
    match url::Url::parse(url) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https"),
        Err(_) => false,
    }
}
