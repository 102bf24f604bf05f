use nudge_utils::create_random_secret;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the application to run on
    pub port: usize,
    /// Public base url of this server, used as the destination for the
    /// tick callbacks registered with the external cron dispatcher
    pub api_base_url: String,
    /// Shared secret identifying the office admin
    pub admin_api_key: String,
    /// Secret forwarded to the cron dispatcher at registration and echoed
    /// back on every tick callback
    pub webhook_secret: String,
    /// Base url of the external cron dispatcher API
    pub cron_dispatcher_url: String,
    /// API key for the external cron dispatcher
    pub cron_dispatcher_api_key: String,
    /// Base url of the attendance service that performs forced checkouts
    pub attendance_api_url: String,
}

fn env_or_generated_secret(var: &str) -> String {
    match std::env::var(var) {
        Ok(secret) => secret,
        Err(_) => {
            info!("Did not find {} environment variable. Going to create one.", var);
            let secret = create_random_secret(30);
            info!("{} was generated and set to: {}", var, secret);
            secret
        }
    }
}

impl Config {
    pub fn new() -> Self {
        let default_port = "5000";
        let port = std::env::var("PORT").unwrap_or_else(|_| default_port.into());
        let port = match port.parse::<usize>() {
            Ok(port) => port,
            Err(_) => {
                warn!(
                    "The given PORT: {} is not valid, falling back to the default port: {}.",
                    port, default_port
                );
                default_port.parse::<usize>().unwrap()
            }
        };
        let api_base_url = std::env::var("API_BASE_URL")
            .unwrap_or_else(|_| format!("http://localhost:{}", port));

        Self {
            port,
            api_base_url,
            admin_api_key: env_or_generated_secret("ADMIN_API_KEY"),
            webhook_secret: env_or_generated_secret("WEBHOOK_SECRET"),
            cron_dispatcher_url: std::env::var("CRON_DISPATCHER_URL")
                .unwrap_or_else(|_| "http://localhost:7000".into()),
            cron_dispatcher_api_key: std::env::var("CRON_DISPATCHER_API_KEY")
                .unwrap_or_default(),
            attendance_api_url: std::env::var("ATTENDANCE_API_URL")
                .unwrap_or_else(|_| "http://localhost:8000".into()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
