use crate::error::NudgeError;
use crate::shared::{
    auth::protect_admin_route,
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpResponse};
use nudge_api_structs::send_notification::*;
use nudge_domain::{validate_http_url, Delivery, Metadata, MetadataSizeError, ID};
use nudge_infra::{NudgeContext, PushPayload};
use tracing::warn;

pub async fn send_notification_admin_controller(
    http_req: actix_web::HttpRequest,
    body_params: web::Json<RequestBody>,
    ctx: web::Data<NudgeContext>,
) -> Result<HttpResponse, NudgeError> {
    protect_admin_route(&http_req, &ctx)?;

    let body = body_params.0;
    let usecase = SendNotificationUseCase {
        employee_id: body.employee_id,
        schedule_id: None,
        title: body.title,
        body: body.body,
        url: body.url,
        metadata: body.metadata,
    };

    execute(usecase, &ctx)
        .await
        .map(|res| {
            HttpResponse::Created().json(APIResponse::new(
                res.delivery,
                res.pushed,
                res.push_failures,
            ))
        })
        .map_err(NudgeError::from)
}

/// Creates the ledger row and fans the payload out to every push
/// subscription of the employee. The row is written first: a notification
/// that reached nobody still expires and still gets enforced.
#[derive(Debug)]
pub struct SendNotificationUseCase {
    pub employee_id: ID,
    pub schedule_id: Option<ID>,
    pub title: String,
    pub body: String,
    pub url: Option<String>,
    pub metadata: Option<Metadata>,
}

#[derive(Debug)]
pub enum UseCaseError {
    InvalidURL(String),
    InvalidMetadata(MetadataSizeError),
    Storage,
}

impl From<UseCaseError> for NudgeError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::InvalidURL(url) => {
                Self::BadClientData(format!("Invalid URL provided: {}", url))
            }
            UseCaseError::InvalidMetadata(e) => Self::BadClientData(format!("{}", e)),
            UseCaseError::Storage => Self::InternalError,
        }
    }
}

#[derive(Debug)]
pub struct UseCaseRes {
    pub delivery: Delivery,
    pub pushed: usize,
    pub push_failures: usize,
}

#[async_trait::async_trait(?Send)]
impl UseCase for SendNotificationUseCase {
    type Response = UseCaseRes;

    type Error = UseCaseError;

    const NAME: &'static str = "SendNotification";

    async fn execute(&mut self, ctx: &NudgeContext) -> Result<Self::Response, Self::Error> {
        if let Some(url) = &self.url {
            if !validate_http_url(url) {
                return Err(UseCaseError::InvalidURL(url.clone()));
            }
        }

        let now = ctx.sys.get_timestamp_millis();
        let mut delivery = Delivery::new(
            self.employee_id.clone(),
            self.schedule_id.clone(),
            self.title.clone(),
            self.body.clone(),
            self.url.clone(),
            now,
        );
        if let Some(metadata) = &self.metadata {
            metadata
                .validate()
                .map_err(UseCaseError::InvalidMetadata)?;
            delivery.metadata = metadata.clone();
        }

        if ctx.repos.deliveries.insert(&delivery).await.is_err() {
            return Err(UseCaseError::Storage);
        }

        // The delivery id doubles as the notification tag so that the client
        // can ack the exact row it is showing
        let payload = PushPayload {
            title: delivery.title.clone(),
            body: delivery.body.clone(),
            url: delivery.url.clone(),
            tag: Some(delivery.id.as_string()),
        };

        let subscriptions = ctx
            .repos
            .subscriptions
            .find_by_employee(&self.employee_id)
            .await;

        let mut pushed = 0;
        let mut push_failures = 0;
        for subscription in &subscriptions {
            match ctx.services.push.dispatch(subscription, &payload).await {
                Ok(_) => pushed += 1,
                Err(e) => {
                    push_failures += 1;
                    warn!(
                        "Push dispatch to endpoint: {} failed for delivery: {}: {:?}",
                        subscription.endpoint, delivery.id, e
                    );
                }
            }
        }

        Ok(UseCaseRes {
            delivery,
            pushed,
            push_failures,
        })
    }
}
