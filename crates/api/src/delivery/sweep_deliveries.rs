use crate::error::NudgeError;
use crate::shared::{
    auth::protect_admin_route,
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpResponse};
use nudge_api_structs::sweep_deliveries::*;
use nudge_domain::{Delivery, FORCED_CHECKOUT_REASON};
use nudge_infra::NudgeContext;
use tracing::{error, warn};

pub async fn sweep_deliveries_admin_controller(
    http_req: actix_web::HttpRequest,
    ctx: web::Data<NudgeContext>,
) -> Result<HttpResponse, NudgeError> {
    protect_admin_route(&http_req, &ctx)?;

    execute(SweepDeliveriesUseCase {}, &ctx)
        .await
        .map(|res| {
            HttpResponse::Ok().json(APIResponse {
                checked: res.checked,
                forced: res.forced,
                skipped: res.skipped,
            })
        })
        .map_err(NudgeError::from)
}

/// Expires overdue `sent` rows and forces a checkout for each one. The
/// sweep is built to be safe to run from several instances at once: the
/// `sent -> expired` transition is a guarded write with a single winner,
/// and only the winner calls the attendance service.
///
/// Enforcement is confirmed by `forced_checkout_at`. Rows that expired in a
/// previous run without that confirmation are retried first, before the
/// current batch, so a freshly expired row that fails enforcement is not
/// retried within the same run.
#[derive(Debug)]
pub struct SweepDeliveriesUseCase {}

#[derive(Debug)]
pub enum UseCaseError {
    Storage,
}

impl From<UseCaseError> for NudgeError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::Storage => Self::InternalError,
        }
    }
}

#[derive(Debug, Default)]
pub struct UseCaseRes {
    pub checked: i64,
    pub forced: i64,
    pub skipped: i64,
}

#[async_trait::async_trait(?Send)]
impl UseCase for SweepDeliveriesUseCase {
    type Response = UseCaseRes;

    type Error = UseCaseError;

    const NAME: &'static str = "SweepDeliveries";

    async fn execute(&mut self, ctx: &NudgeContext) -> Result<Self::Response, Self::Error> {
        let now = ctx.sys.get_timestamp_millis();
        let mut res = UseCaseRes::default();

        // Retry pass: expired rows whose enforcement was never confirmed
        for delivery in ctx.repos.deliveries.find_expired_unforced().await {
            res.checked += 1;
            if enforce(ctx, &delivery, now).await {
                res.forced += 1;
            } else {
                res.skipped += 1;
            }
        }

        // Expiry pass over the current batch of overdue rows
        for delivery in ctx.repos.deliveries.find_expirable(now).await {
            res.checked += 1;
            let won = ctx
                .repos
                .deliveries
                .expire(&delivery.id)
                .await
                .map_err(|_| UseCaseError::Storage)?;
            if !won {
                // Lost to a concurrent ack or another sweep instance
                res.skipped += 1;
                continue;
            }
            if enforce(ctx, &delivery, now).await {
                res.forced += 1;
            } else {
                res.skipped += 1;
            }
        }

        Ok(res)
    }
}

/// Calls the attendance service and records the confirmation. Returns
/// whether enforcement was confirmed; an unconfirmed row is picked up by
/// the retry pass of a later sweep.
async fn enforce(ctx: &NudgeContext, delivery: &Delivery, now: i64) -> bool {
    if let Err(e) = ctx
        .services
        .checkout
        .force_checkout(&delivery.employee_id, FORCED_CHECKOUT_REASON, &delivery.id)
        .await
    {
        warn!(
            "Forced checkout for delivery: {} could not be confirmed: {:?}",
            delivery.id, e
        );
        return false;
    }
    if let Err(e) = ctx
        .repos
        .deliveries
        .set_forced_checkout(&delivery.id, now)
        .await
    {
        // The checkout ran but the confirmation write failed. A later sweep
        // retries the call, which the attendance service deduplicates by
        // delivery id.
        error!(
            "Could not record forced checkout for delivery: {}: {:?}",
            delivery.id, e
        );
        return false;
    }
    true
}
