mod checkout;
mod cron_dispatcher;
mod push_gateway;

use crate::config::Config;
pub use checkout::{
    CheckoutCall, HttpCheckoutService, ICheckoutService, InMemoryCheckoutService,
};
pub use cron_dispatcher::{
    CronJobRequest, HttpCronDispatcherService, ICronDispatcherService,
    InMemoryCronDispatcherService,
};
pub use push_gateway::{HttpPushGateway, IPushGateway, InMemoryPushGateway, PushPayload};
use std::sync::Arc;

/// The genuine external collaborators of this core. Everything else that
/// looks like a side effect is an in-process function call.
#[derive(Clone)]
pub struct Services {
    pub dispatcher: Arc<dyn ICronDispatcherService>,
    pub push: Arc<dyn IPushGateway>,
    pub checkout: Arc<dyn ICheckoutService>,
}

impl Services {
    pub fn create_http(config: &Config) -> Self {
        Self {
            dispatcher: Arc::new(HttpCronDispatcherService::new(
                config.cron_dispatcher_url.clone(),
                config.cron_dispatcher_api_key.clone(),
            )),
            push: Arc::new(HttpPushGateway::new()),
            checkout: Arc::new(HttpCheckoutService::new(config.attendance_api_url.clone())),
        }
    }
}
