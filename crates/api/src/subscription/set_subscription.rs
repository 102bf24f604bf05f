use crate::error::NudgeError;
use crate::shared::{
    auth::{protect_employee_route, Actor},
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpResponse};
use nudge_api_structs::set_subscription::*;
use nudge_domain::{validate_http_url, Subscription, SubscriptionKeys};
use nudge_infra::NudgeContext;

pub async fn set_subscription_controller(
    http_req: actix_web::HttpRequest,
    body_params: web::Json<RequestBody>,
    ctx: web::Data<NudgeContext>,
) -> Result<HttpResponse, NudgeError> {
    let actor = protect_employee_route(&http_req)?;

    let body = body_params.0;
    let usecase = SetSubscriptionUseCase {
        actor,
        endpoint: body.endpoint,
        keys: body.keys,
    };

    execute(usecase, &ctx)
        .await
        .map(|subscription| HttpResponse::Ok().json(APIResponse::new(subscription)))
        .map_err(NudgeError::from)
}

/// Registers or refreshes a push subscription. The endpoint is the key: a
/// browser rotating its subscription for the same device re-registers under
/// a new endpoint, and an endpoint handed to a different employee moves
/// over to them.
#[derive(Debug)]
pub struct SetSubscriptionUseCase {
    pub actor: Actor,
    pub endpoint: String,
    pub keys: SubscriptionKeys,
}

#[derive(Debug)]
pub enum UseCaseError {
    InvalidEndpoint(String),
    Storage,
}

impl From<UseCaseError> for NudgeError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::InvalidEndpoint(endpoint) => {
                Self::BadClientData(format!("Invalid push endpoint: {}", endpoint))
            }
            UseCaseError::Storage => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for SetSubscriptionUseCase {
    type Response = Subscription;

    type Error = UseCaseError;

    const NAME: &'static str = "SetSubscription";

    async fn execute(&mut self, ctx: &NudgeContext) -> Result<Self::Response, Self::Error> {
        if !validate_http_url(&self.endpoint) {
            return Err(UseCaseError::InvalidEndpoint(self.endpoint.clone()));
        }

        let subscription = Subscription {
            employee_id: self.actor.id().clone(),
            endpoint: self.endpoint.clone(),
            keys: self.keys.clone(),
        };
        ctx.repos
            .subscriptions
            .upsert(&subscription)
            .await
            .map_err(|_| UseCaseError::Storage)?;

        Ok(subscription)
    }
}
