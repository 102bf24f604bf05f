use crate::error::NudgeError;
use crate::shared::{
    auth::protect_admin_route,
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpResponse};
use nudge_api_structs::delete_schedule::*;
use nudge_domain::{Schedule, ID};
use nudge_infra::NudgeContext;
use tracing::warn;

pub async fn delete_schedule_admin_controller(
    http_req: actix_web::HttpRequest,
    path: web::Path<PathParams>,
    ctx: web::Data<NudgeContext>,
) -> Result<HttpResponse, NudgeError> {
    protect_admin_route(&http_req, &ctx)?;

    let usecase = DeleteScheduleUseCase {
        schedule_id: path.schedule_id.clone(),
    };

    execute(usecase, &ctx)
        .await
        .map(|schedule| HttpResponse::Ok().json(APIResponse::new(schedule)))
        .map_err(NudgeError::from)
}

#[derive(Debug)]
pub struct DeleteScheduleUseCase {
    pub schedule_id: ID,
}

#[derive(Debug)]
pub enum UseCaseError {
    NotFound(ID),
    Storage,
}

impl From<UseCaseError> for NudgeError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NotFound(schedule_id) => Self::NotFound(format!(
                "The schedule with id: {}, was not found.",
                schedule_id
            )),
            UseCaseError::Storage => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for DeleteScheduleUseCase {
    type Response = Schedule;

    type Error = UseCaseError;

    const NAME: &'static str = "DeleteSchedule";

    async fn execute(&mut self, ctx: &NudgeContext) -> Result<Self::Response, Self::Error> {
        let mut schedule = match ctx.repos.schedules.find(&self.schedule_id).await {
            Ok(Some(schedule)) => schedule,
            Ok(None) => return Err(UseCaseError::NotFound(self.schedule_id.clone())),
            Err(_) => return Err(UseCaseError::Storage),
        };

        // Best effort towards the dispatcher. The job being gone already is
        // fine, the local schedule still gets deactivated.
        if let Err(e) = ctx
            .services
            .dispatcher
            .delete_job(&schedule.external_job_id)
            .await
        {
            warn!(
                "Could not delete external job: {}: {:?}",
                schedule.external_job_id, e
            );
        }

        // Historical deliveries keep referencing the schedule, so it is
        // deactivated rather than deleted.
        schedule.active = false;
        if ctx.repos.schedules.save(&schedule).await.is_err() {
            return Err(UseCaseError::Storage);
        }

        Ok(schedule)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::schedule::create_schedule::CreateScheduleUseCase;
    use crate::shared::auth::Actor;
    use nudge_infra::setup_test_context;

    async fn created_schedule(ctx: &NudgeContext) -> Schedule {
        let mut usecase = CreateScheduleUseCase {
            employee_id: ID::new(),
            title: "Back to work".into(),
            body: "Confirm that you are back from lunch".into(),
            url: None,
            every_minutes: 60,
            start_at: 1000,
            stop_at: 2000,
            tzid: "UTC".into(),
            metadata: None,
            actor: Actor::Admin(ID::new()),
        };
        usecase.execute(ctx).await.unwrap().schedule
    }

    #[actix_web::main]
    #[test]
    async fn it_reports_unknown_schedule() {
        let (ctx, _) = setup_test_context();
        let mut usecase = DeleteScheduleUseCase {
            schedule_id: ID::new(),
        };
        assert!(matches!(
            usecase.execute(&ctx).await,
            Err(UseCaseError::NotFound(_))
        ));
    }

    #[actix_web::main]
    #[test]
    async fn it_deactivates_and_removes_external_job() {
        let (ctx, collaborators) = setup_test_context();
        let schedule = created_schedule(&ctx).await;
        assert_eq!(collaborators.dispatcher.job_count(), 1);

        let mut usecase = DeleteScheduleUseCase {
            schedule_id: schedule.id.clone(),
        };
        let deleted = usecase.execute(&ctx).await.unwrap();
        assert!(!deleted.active);
        assert_eq!(collaborators.dispatcher.job_count(), 0);

        // The schedule is deactivated, not destroyed
        assert!(ctx.repos.schedules.find(&schedule.id).await.unwrap().is_some());
    }

    #[actix_web::main]
    #[test]
    async fn it_deactivates_even_when_external_job_is_already_gone() {
        let (ctx, collaborators) = setup_test_context();
        let schedule = created_schedule(&ctx).await;
        // Job removed out-of-band
        collaborators.dispatcher.jobs.lock().unwrap().clear();

        let mut usecase = DeleteScheduleUseCase {
            schedule_id: schedule.id.clone(),
        };
        let deleted = usecase.execute(&ctx).await.unwrap();
        assert!(!deleted.active);
    }
}
