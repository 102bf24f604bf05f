mod config;
mod repos;
mod services;
mod system;

pub use config::Config;
pub use repos::{
    DeliveryStats, IDeliveryRepo, IScheduleRepo, ISubscriptionRepo, Repos, UpdateResult,
};
pub use services::*;
use sqlx::migrate::MigrateError;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
pub use system::{ISys, RealSys, StaticTimeSys};

#[derive(Clone)]
pub struct NudgeContext {
    pub repos: Repos,
    pub services: Services,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
}

struct ContextParams {
    pub postgres_connection_string: String,
}

impl NudgeContext {
    async fn create(params: ContextParams) -> Self {
        let repos = Repos::create_postgres(&params.postgres_connection_string)
            .await
            .expect("Postgres credentials must be set and valid");
        let config = Config::new();
        let services = Services::create_http(&config);
        Self {
            repos,
            services,
            config,
            sys: Arc::new(RealSys {}),
        }
    }
}

/// Will setup the infrastructure context given the environment
pub async fn setup_context() -> NudgeContext {
    NudgeContext::create(ContextParams {
        postgres_connection_string: get_psql_connection_string(),
    })
    .await
}

/// Concrete fakes behind the test context, so that tests can inspect what
/// left the building
pub struct TestCollaborators {
    pub dispatcher: Arc<InMemoryCronDispatcherService>,
    pub push: Arc<InMemoryPushGateway>,
    pub checkout: Arc<InMemoryCheckoutService>,
}

/// Context backed by inmemory repos and recording collaborator fakes
pub fn setup_test_context() -> (NudgeContext, TestCollaborators) {
    let dispatcher = Arc::new(InMemoryCronDispatcherService::new());
    let push = Arc::new(InMemoryPushGateway::new());
    let checkout = Arc::new(InMemoryCheckoutService::new());

    let ctx = NudgeContext {
        repos: Repos::create_inmemory(),
        services: Services {
            dispatcher: dispatcher.clone(),
            push: push.clone(),
            checkout: checkout.clone(),
        },
        config: Config::new(),
        sys: Arc::new(RealSys {}),
    };

    (
        ctx,
        TestCollaborators {
            dispatcher,
            push,
            checkout,
        },
    )
}

fn get_psql_connection_string() -> String {
    const PSQL_CONNECTION_STRING: &str = "DATABASE_URL";

    std::env::var(PSQL_CONNECTION_STRING)
        .unwrap_or_else(|_| panic!("{} env var to be present.", PSQL_CONNECTION_STRING))
}

pub async fn run_migration() -> Result<(), MigrateError> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&get_psql_connection_string())
        .await
        .expect("TO CONNECT TO POSTGRES");

    sqlx::migrate!().run(&pool).await
}
