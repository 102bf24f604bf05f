use crate::error::NudgeError;
use crate::shared::{
    auth::protect_admin_route,
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpResponse};
use nudge_api_structs::get_schedule_stats::*;
use nudge_domain::ID;
use nudge_infra::{DeliveryStats, NudgeContext};

pub async fn get_schedule_stats_admin_controller(
    http_req: actix_web::HttpRequest,
    path: web::Path<PathParams>,
    ctx: web::Data<NudgeContext>,
) -> Result<HttpResponse, NudgeError> {
    protect_admin_route(&http_req, &ctx)?;

    let usecase = GetScheduleStatsUseCase {
        schedule_id: path.schedule_id.clone(),
    };

    execute(usecase, &ctx)
        .await
        .map(|res| {
            HttpResponse::Ok().json(APIResponse {
                schedule_id: res.schedule_id,
                sent: res.stats.sent,
                acked: res.stats.acked,
                expired: res.stats.expired,
                ack_rate: res.stats.ack_rate(),
            })
        })
        .map_err(NudgeError::from)
}

#[derive(Debug)]
pub struct GetScheduleStatsUseCase {
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

#[derive(Debug)]
pub struct UseCaseRes {
    pub schedule_id: ID,
    pub stats: DeliveryStats,
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetScheduleStatsUseCase {
    type Response = UseCaseRes;

    type Error = UseCaseError;

    const NAME: &'static str = "GetScheduleStats";

    async fn execute(&mut self, ctx: &NudgeContext) -> Result<Self::Response, Self::Error> {
        // Stats are reported for inactive schedules too, the ledger outlives
        // the registration.
        match ctx.repos.schedules.find(&self.schedule_id).await {
            Ok(Some(_)) => {}
            Ok(None) => return Err(UseCaseError::NotFound(self.schedule_id.clone())),
            Err(_) => return Err(UseCaseError::Storage),
        }

        let stats = ctx.repos.deliveries.stats_by_schedule(&self.schedule_id).await;

        Ok(UseCaseRes {
            schedule_id: self.schedule_id.clone(),
            stats,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use nudge_domain::{Delivery, Schedule};
    use nudge_infra::setup_test_context;

    #[actix_web::main]
    #[test]
    async fn it_reports_unknown_schedule() {
        let (ctx, _) = setup_test_context();
        let mut usecase = GetScheduleStatsUseCase {
            schedule_id: ID::new(),
        };
        assert!(matches!(
            usecase.execute(&ctx).await,
            Err(UseCaseError::NotFound(_))
        ));
    }

    #[actix_web::main]
    #[test]
    async fn it_counts_only_rows_of_the_given_schedule() {
        let (ctx, _) = setup_test_context();
        let schedule = Schedule::new(
            ID::new(),
            ID::new(),
            "Back to work".into(),
            "Confirm".into(),
            None,
            60,
            0,
            1000,
            &chrono_tz::UTC,
        );
        ctx.repos.schedules.insert(&schedule).await.unwrap();

        let mut acked = Delivery::new(
            schedule.employee_id.clone(),
            Some(schedule.id.clone()),
            "t".into(),
            "b".into(),
            None,
            0,
        );
        acked.status = nudge_domain::DeliveryStatus::Acked;
        ctx.repos.deliveries.insert(&acked).await.unwrap();

        let sent = Delivery::new(
            schedule.employee_id.clone(),
            Some(schedule.id.clone()),
            "t".into(),
            "b".into(),
            None,
            0,
        );
        ctx.repos.deliveries.insert(&sent).await.unwrap();

        // Ad hoc delivery without a schedule should not be counted
        let ad_hoc = Delivery::new(schedule.employee_id.clone(), None, "t".into(), "b".into(), None, 0);
        ctx.repos.deliveries.insert(&ad_hoc).await.unwrap();

        let mut usecase = GetScheduleStatsUseCase {
            schedule_id: schedule.id.clone(),
        };
        let res = usecase.execute(&ctx).await.unwrap();
        assert_eq!(res.stats.sent, 1);
        assert_eq!(res.stats.acked, 1);
        assert_eq!(res.stats.expired, 0);
        assert!((res.stats.ack_rate() - 0.5).abs() < f64::EPSILON);
    }
}
