use crate::dtos::ScheduleDTO;
use nudge_domain::{Schedule, ID};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleResponse {
    pub schedule: ScheduleDTO,
}

impl ScheduleResponse {
    pub fn new(schedule: Schedule) -> Self {
        Self {
            schedule: ScheduleDTO::new(schedule),
        }
    }
}

pub mod create_schedule {
    use super::*;
    use nudge_domain::Metadata;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub employee_id: ID,
        pub title: String,
        pub body: String,
        pub url: Option<String>,
        pub every_minutes: i64,
        pub start_at: i64,
        pub stop_at: i64,
        pub timezone: String,
        pub metadata: Option<Metadata>,
    }

    pub type APIResponse = ScheduleResponse;
}

pub mod delete_schedule {
    use super::*;

    #[derive(Debug, Deserialize)]
    pub struct PathParams {
        pub schedule_id: ID,
    }

    pub type APIResponse = ScheduleResponse;
}

pub mod get_schedule_stats {
    use super::*;

    #[derive(Debug, Deserialize)]
    pub struct PathParams {
        pub schedule_id: ID,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub schedule_id: ID,
        pub sent: i64,
        pub acked: i64,
        pub expired: i64,
        pub ack_rate: f64,
    }
}

pub mod tick_schedule {
    use super::*;

    #[derive(Debug, Deserialize)]
    pub struct PathParams {
        pub schedule_id: ID,
    }

    /// Message overrides the dispatcher may attach to a single firing
    #[derive(Debug, Serialize, Deserialize, Default)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub title: Option<String>,
        pub body: Option<String>,
        pub url: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        /// `sent` or `skipped`
        pub status: String,
        pub delivery_id: Option<ID>,
    }
}
