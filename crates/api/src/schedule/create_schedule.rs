use crate::error::NudgeError;
use crate::shared::{
    auth::{protect_admin_route, Actor},
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpResponse};
use chrono_tz::Tz;
use nudge_api_structs::create_schedule::*;
use nudge_domain::{validate_http_url, Metadata, MetadataSizeError, Schedule, ID};
use nudge_infra::{CronJobRequest, NudgeContext};
use std::collections::HashMap;
use tracing::error;

pub async fn create_schedule_admin_controller(
    http_req: actix_web::HttpRequest,
    body_params: web::Json<RequestBody>,
    ctx: web::Data<NudgeContext>,
) -> Result<HttpResponse, NudgeError> {
    let actor = protect_admin_route(&http_req, &ctx)?;

    let body = body_params.0;
    let usecase = CreateScheduleUseCase {
        employee_id: body.employee_id,
        title: body.title,
        body: body.body,
        url: body.url,
        every_minutes: body.every_minutes,
        start_at: body.start_at,
        stop_at: body.stop_at,
        tzid: body.timezone,
        metadata: body.metadata,
        actor,
    };

    execute(usecase, &ctx)
        .await
        .map(|res| HttpResponse::Created().json(APIResponse::new(res.schedule)))
        .map_err(NudgeError::from)
}

#[derive(Debug)]
pub struct CreateScheduleUseCase {
    pub employee_id: ID,
    pub title: String,
    pub body: String,
    pub url: Option<String>,
    pub every_minutes: i64,
    pub start_at: i64,
    pub stop_at: i64,
    pub tzid: String,
    pub metadata: Option<Metadata>,
    pub actor: Actor,
}

#[derive(Debug)]
pub enum UseCaseError {
    InvalidTimezone(String),
    InvalidWindow(i64, i64),
    InvalidInterval(i64),
    InvalidURL(String),
    InvalidMetadata(MetadataSizeError),
    DispatcherRejected(String),
    Storage,
}

impl From<UseCaseError> for NudgeError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::InvalidTimezone(tzid) => Self::BadClientData(format!(
                "Invalid timezone: {}. It should be a valid IANA TimeZone.",
                tzid
            )),
            UseCaseError::InvalidWindow(start_at, stop_at) => Self::BadClientData(format!(
                "Invalid schedule window, startAt: {} must be before stopAt: {}.",
                start_at, stop_at
            )),
            UseCaseError::InvalidInterval(every_minutes) => Self::BadClientData(format!(
                "Invalid recurrence, everyMinutes: {} must be at least 1.",
                every_minutes
            )),
            UseCaseError::InvalidURL(url) => {
                Self::BadClientData(format!("Invalid URL provided: {}", url))
            }
            UseCaseError::InvalidMetadata(e) => Self::BadClientData(format!("{}", e)),
            UseCaseError::DispatcherRejected(msg) => Self::UpstreamError(format!(
                "The cron dispatcher did not accept the schedule: {}",
                msg
            )),
            UseCaseError::Storage => Self::InternalError,
        }
    }
}

#[derive(Debug)]
pub struct UseCaseRes {
    pub schedule: Schedule,
}

#[async_trait::async_trait(?Send)]
impl UseCase for CreateScheduleUseCase {
    type Response = UseCaseRes;

    type Error = UseCaseError;

    const NAME: &'static str = "CreateSchedule";

    async fn execute(&mut self, ctx: &NudgeContext) -> Result<Self::Response, Self::Error> {
        if self.start_at >= self.stop_at {
            return Err(UseCaseError::InvalidWindow(self.start_at, self.stop_at));
        }
        if self.every_minutes < 1 {
            return Err(UseCaseError::InvalidInterval(self.every_minutes));
        }
        let tz: Tz = match self.tzid.parse() {
            Ok(tz) => tz,
            Err(_) => return Err(UseCaseError::InvalidTimezone(self.tzid.to_string())),
        };
        if let Some(url) = &self.url {
            if !validate_http_url(url) {
                return Err(UseCaseError::InvalidURL(url.clone()));
            }
        }

        let mut schedule = Schedule::new(
            self.employee_id.clone(),
            self.actor.id().clone(),
            self.title.clone(),
            self.body.clone(),
            self.url.clone(),
            self.every_minutes,
            self.start_at,
            self.stop_at,
            &tz,
        );
        if let Some(metadata) = &self.metadata {
            metadata
                .validate()
                .map_err(UseCaseError::InvalidMetadata)?;
            schedule.metadata = metadata.clone();
        }

        // Register with the dispatcher before writing locally so that a
        // dispatcher failure leaves no durable side effect. The job id is
        // derived from the schedule id, so a retry reuses the same job.
        let job = CronJobRequest {
            job_id: schedule.external_job_id.clone(),
            destination_url: format!(
                "{}/api/v1/schedule/{}/tick",
                ctx.config.api_base_url, schedule.id
            ),
            recurrence: schedule.recurrence(),
            forwarded_headers: HashMap::from([(
                crate::shared::auth::WEBHOOK_SECRET_HEADER.to_string(),
                ctx.config.webhook_secret.clone(),
            )]),
        };
        ctx.services
            .dispatcher
            .create_job(&job)
            .await
            .map_err(|e| UseCaseError::DispatcherRejected(format!("{}", e)))?;

        if ctx.repos.schedules.insert(&schedule).await.is_err() {
            // The external job exists but the schedule does not. Clean up so
            // the dispatcher does not keep firing at an unknown schedule.
            if let Err(e) = ctx
                .services
                .dispatcher
                .delete_job(&schedule.external_job_id)
                .await
            {
                error!(
                    "Could not clean up external job: {} after storage failure: {:?}",
                    schedule.external_job_id, e
                );
            }
            return Err(UseCaseError::Storage);
        }

        Ok(UseCaseRes { schedule })
    }
}
