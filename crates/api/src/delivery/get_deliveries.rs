use crate::error::NudgeError;
use crate::shared::{
    auth::{protect_employee_route, Actor},
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpResponse};
use nudge_api_structs::get_deliveries::*;
use nudge_domain::Delivery;
use nudge_infra::NudgeContext;

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 200;

pub async fn get_deliveries_controller(
    http_req: actix_web::HttpRequest,
    query: web::Query<QueryParams>,
    ctx: web::Data<NudgeContext>,
) -> Result<HttpResponse, NudgeError> {
    let actor = protect_employee_route(&http_req)?;

    let usecase = GetDeliveriesUseCase {
        actor,
        limit: query.0.limit,
    };

    execute(usecase, &ctx)
        .await
        .map(|deliveries| HttpResponse::Ok().json(APIResponse::new(deliveries)))
        .map_err(NudgeError::from)
}

/// Recent deliveries for the calling employee, newest first
#[derive(Debug)]
pub struct GetDeliveriesUseCase {
    pub actor: Actor,
    pub limit: Option<i64>,
}

#[derive(Debug)]
pub enum UseCaseError {
    InvalidLimit(i64),
}

impl From<UseCaseError> for NudgeError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::InvalidLimit(limit) => Self::BadClientData(format!(
                "Invalid limit: {}. It must be between 1 and {}.",
                limit, MAX_LIMIT
            )),
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetDeliveriesUseCase {
    type Response = Vec<Delivery>;

    type Error = UseCaseError;

    const NAME: &'static str = "GetDeliveries";

    async fn execute(&mut self, ctx: &NudgeContext) -> Result<Self::Response, Self::Error> {
        let limit = self.limit.unwrap_or(DEFAULT_LIMIT);
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(UseCaseError::InvalidLimit(limit));
        }

        Ok(ctx
            .repos
            .deliveries
            .find_by_employee(self.actor.id(), limit)
            .await)
    }
}
