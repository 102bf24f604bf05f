use crate::delivery::send_notification::SendNotificationUseCase;
use crate::error::NudgeError;
use crate::shared::{
    auth::protect_tick_route,
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpResponse};
use nudge_api_structs::tick_schedule::*;
use nudge_domain::{Delivery, ID};
use nudge_infra::NudgeContext;
use tracing::info;

pub async fn tick_schedule_controller(
    http_req: actix_web::HttpRequest,
    path: web::Path<PathParams>,
    body_params: Option<web::Json<RequestBody>>,
    ctx: web::Data<NudgeContext>,
) -> Result<HttpResponse, NudgeError> {
    protect_tick_route(&http_req, &ctx)?;

    let body = body_params.map(|b| b.0).unwrap_or_default();
    let usecase = TickScheduleUseCase {
        schedule_id: path.schedule_id.clone(),
        title: body.title,
        body: body.body,
        url: body.url,
    };

    execute(usecase, &ctx)
        .await
        .map(|outcome| {
            let res = match outcome {
                TickOutcome::Sent(delivery) => APIResponse {
                    status: "sent".into(),
                    delivery_id: Some(delivery.id),
                },
                TickOutcome::Skipped => APIResponse {
                    status: "skipped".into(),
                    delivery_id: None,
                },
            };
            HttpResponse::Ok().json(res)
        })
        .map_err(NudgeError::from)
}

/// One firing of the external cron job. A tick outside the schedule window
/// is answered with a skip, never an error: the dispatcher would otherwise
/// retry a firing that must not produce a notification.
#[derive(Debug)]
pub struct TickScheduleUseCase {
    pub schedule_id: ID,
    pub title: Option<String>,
    pub body: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug)]
pub enum TickOutcome {
    Sent(Delivery),
    Skipped,
}

#[derive(Debug)]
pub enum UseCaseError {
    NotFound(ID),
    SendFailed(crate::delivery::send_notification::UseCaseError),
    Storage,
}

impl From<UseCaseError> for NudgeError {
    fn from(e: UseCaseError) -> Self {
        match e {
            // A terminal answer: the dispatcher should drop the job rather
            // than retry against a schedule that no longer exists
            UseCaseError::NotFound(schedule_id) => Self::NotFound(format!(
                "The schedule with id: {}, was not found.",
                schedule_id
            )),
            UseCaseError::SendFailed(e) => e.into(),
            UseCaseError::Storage => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for TickScheduleUseCase {
    type Response = TickOutcome;

    type Error = UseCaseError;

    const NAME: &'static str = "TickSchedule";

    async fn execute(&mut self, ctx: &NudgeContext) -> Result<Self::Response, Self::Error> {
        let mut schedule = match ctx.repos.schedules.find(&self.schedule_id).await {
            Ok(Some(schedule)) => schedule,
            Ok(None) => return Err(UseCaseError::NotFound(self.schedule_id.clone())),
            Err(_) => return Err(UseCaseError::Storage),
        };

        let now = ctx.sys.get_timestamp_millis();

        // Self heal: a tick arriving after the window closed flips the
        // schedule off, covering jobs the dispatcher kept firing past their
        // stop time.
        if now > schedule.stop_at && schedule.active {
            schedule.active = false;
            if ctx.repos.schedules.save(&schedule).await.is_err() {
                return Err(UseCaseError::Storage);
            }
            info!(
                "Deactivated schedule: {} on tick past its stop time",
                schedule.id
            );
        }

        if !schedule.active || !schedule.is_within_window(now) {
            return Ok(TickOutcome::Skipped);
        }

        let mut send = SendNotificationUseCase {
            employee_id: schedule.employee_id.clone(),
            schedule_id: Some(schedule.id.clone()),
            title: self.title.clone().unwrap_or_else(|| schedule.title.clone()),
            body: self.body.clone().unwrap_or_else(|| schedule.body.clone()),
            url: self.url.clone().or_else(|| schedule.url.clone()),
            metadata: Some(schedule.metadata.clone()),
        };
        let res = send.execute(ctx).await.map_err(UseCaseError::SendFailed)?;

        Ok(TickOutcome::Sent(res.delivery))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono_tz::UTC;
    use nudge_domain::Schedule;
    use nudge_infra::{setup_test_context, StaticTimeSys};
    use std::sync::Arc;

    fn schedule_with_window(start_at: i64, stop_at: i64) -> Schedule {
        Schedule::new(
            ID::new(),
            ID::new(),
            "Back to work".into(),
            "Confirm you are back from lunch".into(),
            None,
            60,
            start_at,
            stop_at,
            &UTC,
        )
    }

    fn tick_for(schedule: &Schedule) -> TickScheduleUseCase {
        TickScheduleUseCase {
            schedule_id: schedule.id.clone(),
            title: None,
            body: None,
            url: None,
        }
    }

    #[actix_web::main]
    #[test]
    async fn it_reports_unknown_schedule() {
        let (ctx, _) = setup_test_context();
        let mut usecase = TickScheduleUseCase {
            schedule_id: ID::new(),
            title: None,
            body: None,
            url: None,
        };
        assert!(matches!(
            usecase.execute(&ctx).await,
            Err(UseCaseError::NotFound(_))
        ));
    }

    #[actix_web::main]
    #[test]
    async fn tick_inside_window_creates_a_delivery() {
        let (mut ctx, _) = setup_test_context();
        ctx.sys = Arc::new(StaticTimeSys(1500));

        let schedule = schedule_with_window(1000, 2000);
        ctx.repos.schedules.insert(&schedule).await.unwrap();

        let outcome = tick_for(&schedule).execute(&ctx).await.unwrap();
        let delivery = match outcome {
            TickOutcome::Sent(delivery) => delivery,
            TickOutcome::Skipped => panic!("expected a delivery"),
        };
        assert_eq!(delivery.schedule_id, Some(schedule.id.clone()));
        assert_eq!(delivery.employee_id, schedule.employee_id);
        assert_eq!(delivery.title, schedule.title);
        assert_eq!(delivery.sent_at, 1500);
    }

    #[actix_web::main]
    #[test]
    async fn tick_before_window_is_skipped() {
        let (mut ctx, _) = setup_test_context();
        ctx.sys = Arc::new(StaticTimeSys(500));

        let schedule = schedule_with_window(1000, 2000);
        ctx.repos.schedules.insert(&schedule).await.unwrap();

        assert!(matches!(
            tick_for(&schedule).execute(&ctx).await.unwrap(),
            TickOutcome::Skipped
        ));
        assert!(ctx
            .repos
            .deliveries
            .find_by_employee(&schedule.employee_id, 10)
            .await
            .is_empty());
    }

    #[actix_web::main]
    #[test]
    async fn tick_past_stop_time_deactivates_the_schedule() {
        let (mut ctx, _) = setup_test_context();
        ctx.sys = Arc::new(StaticTimeSys(3000));

        let schedule = schedule_with_window(1000, 2000);
        ctx.repos.schedules.insert(&schedule).await.unwrap();

        assert!(matches!(
            tick_for(&schedule).execute(&ctx).await.unwrap(),
            TickOutcome::Skipped
        ));
        let stored = ctx.repos.schedules.find(&schedule.id).await.unwrap().unwrap();
        assert!(!stored.active);
    }

    struct UnavailableScheduleRepo;

    #[async_trait::async_trait]
    impl nudge_infra::IScheduleRepo for UnavailableScheduleRepo {
        async fn insert(&self, _schedule: &Schedule) -> anyhow::Result<()> {
            anyhow::bail!("schedule storage is offline")
        }
        async fn save(&self, _schedule: &Schedule) -> anyhow::Result<()> {
            anyhow::bail!("schedule storage is offline")
        }
        async fn find(&self, _schedule_id: &ID) -> anyhow::Result<Option<Schedule>> {
            anyhow::bail!("schedule storage is offline")
        }
        async fn find_by_employee(&self, _employee_id: &ID) -> Vec<Schedule> {
            Vec::new()
        }
    }

    // The not-found answer tells the dispatcher to drop the job, so a
    // storage failure must never be mistaken for an absent schedule
    #[actix_web::main]
    #[test]
    async fn storage_failure_is_not_reported_as_missing_schedule() {
        let (mut ctx, _) = setup_test_context();
        ctx.repos.schedules = Arc::new(UnavailableScheduleRepo);

        let mut usecase = TickScheduleUseCase {
            schedule_id: ID::new(),
            title: None,
            body: None,
            url: None,
        };
        assert!(matches!(
            usecase.execute(&ctx).await,
            Err(UseCaseError::Storage)
        ));
    }

    #[actix_web::main]
    #[test]
    async fn tick_applies_message_overrides() {
        let (mut ctx, _) = setup_test_context();
        ctx.sys = Arc::new(StaticTimeSys(1500));

        let schedule = schedule_with_window(1000, 2000);
        ctx.repos.schedules.insert(&schedule).await.unwrap();

        let mut usecase = tick_for(&schedule);
        usecase.title = Some("Final call".into());
        let outcome = usecase.execute(&ctx).await.unwrap();
        match outcome {
            TickOutcome::Sent(delivery) => {
                assert_eq!(delivery.title, "Final call");
                assert_eq!(delivery.body, schedule.body);
            }
            TickOutcome::Skipped => panic!("expected a delivery"),
        }
    }
}
