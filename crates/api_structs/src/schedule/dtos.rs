use nudge_domain::{Metadata, Schedule, ID};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleDTO {
    pub id: ID,
    pub employee_id: ID,
    pub title: String,
    pub body: String,
    pub url: Option<String>,
    pub every_minutes: i64,
    pub start_at: i64,
    pub stop_at: i64,
    pub timezone: String,
    pub external_job_id: String,
    pub active: bool,
    pub metadata: Metadata,
}

impl ScheduleDTO {
    pub fn new(schedule: Schedule) -> Self {
        Self {
            id: schedule.id.clone(),
            employee_id: schedule.employee_id.clone(),
            title: schedule.title,
            body: schedule.body,
            url: schedule.url,
            every_minutes: schedule.every_minutes,
            start_at: schedule.start_at,
            stop_at: schedule.stop_at,
            timezone: schedule.timezone.to_string(),
            external_job_id: schedule.external_job_id,
            active: schedule.active,
            metadata: schedule.metadata,
        }
    }
}
