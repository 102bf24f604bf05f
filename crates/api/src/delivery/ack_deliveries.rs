use crate::error::NudgeError;
use crate::shared::{
    auth::{protect_employee_route, Actor},
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpResponse};
use nudge_api_structs::ack_deliveries::*;
use nudge_domain::ID;
use nudge_infra::{NudgeContext, UpdateResult};

pub async fn ack_deliveries_controller(
    http_req: actix_web::HttpRequest,
    body_params: web::Json<RequestBody>,
    ctx: web::Data<NudgeContext>,
) -> Result<HttpResponse, NudgeError> {
    let actor = protect_employee_route(&http_req)?;

    let usecase = AckDeliveriesUseCase {
        delivery_ids: body_params.0.delivery_ids,
        actor,
    };

    execute(usecase, &ctx)
        .await
        .map(|res| {
            HttpResponse::Ok().json(APIResponse {
                matched: res.matched,
                modified: res.modified,
            })
        })
        .map_err(NudgeError::from)
}

/// Acknowledges a batch of deliveries for the calling employee. The write is
/// guarded on the `sent` status, so rows that already expired, or that were
/// acked in a concurrent request, quietly stay as they are. The caller sees
/// the difference between `matched` and `modified` instead of an error.
#[derive(Debug)]
pub struct AckDeliveriesUseCase {
    pub delivery_ids: Vec<ID>,
    pub actor: Actor,
}

#[derive(Debug)]
pub enum UseCaseError {
    EmptyBatch,
    Storage,
}

impl From<UseCaseError> for NudgeError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::EmptyBatch => {
                Self::BadClientData("deliveryIds cannot be empty.".into())
            }
            UseCaseError::Storage => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for AckDeliveriesUseCase {
    type Response = UpdateResult;

    type Error = UseCaseError;

    const NAME: &'static str = "AckDeliveries";

    async fn execute(&mut self, ctx: &NudgeContext) -> Result<Self::Response, Self::Error> {
        if self.delivery_ids.is_empty() {
            return Err(UseCaseError::EmptyBatch);
        }

        let now = ctx.sys.get_timestamp_millis();
        ctx.repos
            .deliveries
            .ack(&self.delivery_ids, self.actor.employee_scope(), now)
            .await
            .map_err(|_| UseCaseError::Storage)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use nudge_domain::{Delivery, DeliveryStatus, ACK_WINDOW_MILLIS};
    use nudge_infra::{setup_test_context, StaticTimeSys};
    use std::sync::Arc;

    async fn sent_delivery(ctx: &NudgeContext, employee_id: &ID, sent_at: i64) -> Delivery {
        let delivery = Delivery::new(
            employee_id.clone(),
            None,
            "Back to work".into(),
            "Tap to confirm".into(),
            None,
            sent_at,
        );
        ctx.repos.deliveries.insert(&delivery).await.unwrap();
        delivery
    }

    #[actix_web::main]
    #[test]
    async fn it_rejects_an_empty_batch() {
        let (ctx, _) = setup_test_context();
        let mut usecase = AckDeliveriesUseCase {
            delivery_ids: Vec::new(),
            actor: Actor::Employee(ID::new()),
        };
        assert!(matches!(
            usecase.execute(&ctx).await,
            Err(UseCaseError::EmptyBatch)
        ));
    }

    #[actix_web::main]
    #[test]
    async fn it_acks_own_sent_deliveries() {
        let (mut ctx, _) = setup_test_context();
        let now = 1000;
        ctx.sys = Arc::new(StaticTimeSys(now));

        let employee_id = ID::new();
        let delivery = sent_delivery(&ctx, &employee_id, 0).await;

        let mut usecase = AckDeliveriesUseCase {
            delivery_ids: vec![delivery.id.clone()],
            actor: Actor::Employee(employee_id),
        };
        let res = usecase.execute(&ctx).await.unwrap();
        assert_eq!(res.matched, 1);
        assert_eq!(res.modified, 1);

        let stored = ctx.repos.deliveries.find(&delivery.id).await.unwrap();
        assert_eq!(stored.status, DeliveryStatus::Acked);
        assert_eq!(stored.acked_at, Some(now));
    }

    #[actix_web::main]
    #[test]
    async fn another_employees_delivery_is_not_matched() {
        let (ctx, _) = setup_test_context();
        let delivery = sent_delivery(&ctx, &ID::new(), 0).await;

        let mut usecase = AckDeliveriesUseCase {
            delivery_ids: vec![delivery.id.clone()],
            actor: Actor::Employee(ID::new()),
        };
        let res = usecase.execute(&ctx).await.unwrap();
        assert_eq!(res.matched, 0);
        assert_eq!(res.modified, 0);

        let stored = ctx.repos.deliveries.find(&delivery.id).await.unwrap();
        assert_eq!(stored.status, DeliveryStatus::Sent);
    }

    #[actix_web::main]
    #[test]
    async fn ack_after_expiry_is_a_noop() {
        let (mut ctx, _) = setup_test_context();
        ctx.sys = Arc::new(StaticTimeSys(ACK_WINDOW_MILLIS + 1));

        let employee_id = ID::new();
        let delivery = sent_delivery(&ctx, &employee_id, 0).await;
        assert!(ctx.repos.deliveries.expire(&delivery.id).await.unwrap());

        let mut usecase = AckDeliveriesUseCase {
            delivery_ids: vec![delivery.id.clone()],
            actor: Actor::Employee(employee_id),
        };
        let res = usecase.execute(&ctx).await.unwrap();
        assert_eq!(res.matched, 1);
        assert_eq!(res.modified, 0);

        let stored = ctx.repos.deliveries.find(&delivery.id).await.unwrap();
        assert_eq!(stored.status, DeliveryStatus::Expired);
        assert!(stored.acked_at.is_none());
    }

    #[actix_web::main]
    #[test]
    async fn second_ack_matches_but_modifies_nothing() {
        let (ctx, _) = setup_test_context();
        let employee_id = ID::new();
        let delivery = sent_delivery(&ctx, &employee_id, 0).await;

        let mut usecase = AckDeliveriesUseCase {
            delivery_ids: vec![delivery.id.clone()],
            actor: Actor::Employee(employee_id),
        };
        let first = usecase.execute(&ctx).await.unwrap();
        assert_eq!(first.modified, 1);
        let second = usecase.execute(&ctx).await.unwrap();
        assert_eq!(second.matched, 1);
        assert_eq!(second.modified, 0);
    }
}
